use std::env;
use std::path::PathBuf;

use compio::io::{AsyncReadExt, AsyncWriteExt};
use compio::net::UnixStream;
use compio::process::Command;
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, trace};

use crate::tree::SnapshotRecord;
use crate::wm::WmLink;

/// Every i3 IPC frame starts with this magic string.
const MAGIC: &[u8; 6] = b"i3-ipc";
/// Magic + u32 payload length + u32 message type, all native-endian.
const HEADER_LEN: usize = 14;

const MSG_RUN_COMMAND: u32 = 0;
const MSG_GET_TREE: u32 = 4;

/// i3 IPC client over the window manager's Unix socket.
pub struct I3Ipc {
    stream: UnixStream,
}

impl I3Ipc {
    /// Connects to the running i3 instance, resolving the socket path
    /// from `$I3SOCK` or, failing that, `i3 --get-socketpath`.
    pub async fn connect() -> Result<Self, IpcError> {
        let path = socket_path().await?;
        debug!("Connecting to i3 socket at {}", path.display());
        let stream = UnixStream::connect(&path)
            .await
            .context(ConnectSnafu { path })?;
        Ok(Self { stream })
    }

    /// One request/reply round-trip; returns the reply payload.
    async fn roundtrip(&mut self, kind: u32, payload: &[u8]) -> Result<Vec<u8>, IpcError> {
        trace!("Sending IPC message type {kind} ({} payload bytes)", payload.len());
        let res = self.stream.write_all(encode_frame(kind, payload)).await;
        res.0.context(SendSnafu)?;

        let res = self.stream.read_exact(Vec::with_capacity(HEADER_LEN)).await;
        res.0.context(ReceiveSnafu)?;
        let (len, reply_kind) = decode_header(&res.1)?;
        trace!("IPC reply type {reply_kind}, {len} payload bytes");

        let res = self.stream.read_exact(Vec::with_capacity(len)).await;
        res.0.context(ReceiveSnafu)?;
        Ok(res.1)
    }
}

impl WmLink for I3Ipc {
    async fn get_tree(&mut self) -> Result<SnapshotRecord, IpcError> {
        let payload = self.roundtrip(MSG_GET_TREE, &[]).await?;
        serde_json::from_slice(&payload).context(DecodeSnafu)
    }

    async fn command(&mut self, verb: &str, arg: &str) -> Result<(), IpcError> {
        debug!("i3 command: {verb} {arg}");
        let line = format!("{verb} {arg}");
        // The reply carries per-command success flags; commands are
        // fire-and-forget at this seam, so it is read and dropped.
        self.roundtrip(MSG_RUN_COMMAND, line.as_bytes()).await?;
        Ok(())
    }
}

async fn socket_path() -> Result<PathBuf, IpcError> {
    if let Ok(path) = env::var("I3SOCK") {
        return Ok(PathBuf::from(path));
    }

    let mut cmd = Command::new("i3");
    cmd.arg("--get-socketpath");
    let output = cmd.output().await.context(SocketPathQuerySnafu)?;
    ensure!(output.status.success(), SocketPathUnavailableSnafu);

    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    ensure!(!path.is_empty(), SocketPathUnavailableSnafu);
    Ok(PathBuf::from(path))
}

/// Frames a payload as `"i3-ipc" + length + type + payload`. i3 reads
/// the two u32 fields in native byte order.
fn encode_frame(kind: u32, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(MAGIC);
    frame.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
    frame.extend_from_slice(&kind.to_ne_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Splits a reply header into (payload length, message type).
fn decode_header(header: &[u8]) -> Result<(usize, u32), IpcError> {
    ensure!(
        header.len() == HEADER_LEN && &header[..MAGIC.len()] == MAGIC,
        MalformedReplySnafu
    );

    let mut field = [0u8; 4];
    field.copy_from_slice(&header[6..10]);
    let len = u32::from_ne_bytes(field) as usize;
    field.copy_from_slice(&header[10..14]);
    let kind = u32::from_ne_bytes(field);

    Ok((len, kind))
}

#[derive(Debug, Snafu)]
pub enum IpcError {
    #[snafu(display("Failed to connect to the i3 socket at '{}'", path.display()))]
    ConnectError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to run 'i3 --get-socketpath'"))]
    SocketPathQueryError { source: std::io::Error },
    #[snafu(display("i3 did not report a socket path; is i3 running?"))]
    SocketPathUnavailable,
    #[snafu(display("Failed to send an IPC message"))]
    SendError { source: std::io::Error },
    #[snafu(display("Failed to read an IPC reply"))]
    ReceiveError { source: std::io::Error },
    #[snafu(display("IPC reply did not start with the i3-ipc magic"))]
    MalformedReply,
    #[snafu(display("Failed to decode the layout tree reply"))]
    DecodeError { source: serde_json::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_carry_magic_length_and_type() {
        let frame = encode_frame(MSG_RUN_COMMAND, b"workspace 2");

        assert_eq!(&frame[..6], b"i3-ipc");
        assert_eq!(frame[6..10], 11u32.to_ne_bytes());
        assert_eq!(frame[10..14], MSG_RUN_COMMAND.to_ne_bytes());
        assert_eq!(&frame[14..], b"workspace 2");
    }

    #[test]
    fn header_round_trips_through_decode() {
        let frame = encode_frame(MSG_GET_TREE, b"{}");
        let (len, kind) = decode_header(&frame[..HEADER_LEN]).unwrap();

        assert_eq!(len, 2);
        assert_eq!(kind, MSG_GET_TREE);
    }

    #[test]
    fn rejects_a_header_without_the_magic() {
        let result = decode_header(b"not-i3-header!");
        assert!(matches!(result, Err(IpcError::MalformedReply)));
    }

    #[test]
    fn rejects_a_truncated_header() {
        let result = decode_header(b"i3-ipc");
        assert!(matches!(result, Err(IpcError::MalformedReply)));
    }
}
