use compio::process::Command;
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::debug;

/// Resolves the process identity behind an X11 window handle. Separated
/// out so capture can be exercised without a running X server.
pub trait WindowClassResolver {
    /// Returns the owning process's class as a normalized lowercase
    /// token.
    async fn resolve(&self, window: u64) -> Result<String, WindowClassError>;
}

/// Production resolver backed by `xprop WM_CLASS -id <window>`.
pub struct XpropResolver;

impl WindowClassResolver for XpropResolver {
    async fn resolve(&self, window: u64) -> Result<String, WindowClassError> {
        debug!("Querying WM_CLASS for window {window}");
        let mut cmd = Command::new("xprop");
        cmd.arg("WM_CLASS").arg("-id").arg(window.to_string());

        let output = cmd.output().await.context(SpawnSnafu { window })?;
        ensure!(
            output.status.success(),
            UnsuccessfulExecutionSnafu {
                window,
                status: output.status.code().unwrap_or(-1),
            }
        );

        parse_wm_class(&String::from_utf8_lossy(&output.stdout))
            .context(MalformedOutputSnafu { window })
    }
}

/// Extracts the class token from xprop's reply, which looks like
/// `WM_CLASS(STRING) = "instance", "Class"`. The class (second value)
/// wins over the instance, lowercased for stable matching.
fn parse_wm_class(output: &str) -> Option<String> {
    let token = output.split_whitespace().nth(3)?;
    let class = token.trim_matches(|c| c == '"' || c == ',');
    if class.is_empty() {
        None
    } else {
        Some(class.to_lowercase())
    }
}

#[derive(Debug, Snafu)]
pub enum WindowClassError {
    #[snafu(display("Failed to run xprop for window {window}"))]
    SpawnError {
        window: u64,
        source: std::io::Error,
    },
    #[snafu(display("xprop exited with status {status} for window {window}"))]
    UnsuccessfulExecution { window: u64, status: i32 },
    #[snafu(display("Could not parse WM_CLASS output for window {window}"))]
    MalformedOutput { window: u64 },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(r#"WM_CLASS(STRING) = "irssi", "URxvt""#, "urxvt")]
    #[case(r#"WM_CLASS(STRING) = "Navigator", "Firefox""#, "firefox")]
    #[case("WM_CLASS(STRING) = \"gvim\", \"Gvim\"\n", "gvim")]
    fn parses_the_class_token_lowercased(#[case] output: &str, #[case] expected: &str) {
        assert_eq!(parse_wm_class(output).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("WM_CLASS: not found.")]
    #[case(r#"WM_CLASS(STRING) = "a", """#)]
    fn rejects_output_without_a_class_token(#[case] output: &str) {
        assert_eq!(parse_wm_class(output), None);
    }
}
