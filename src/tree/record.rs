use derive_more::Display;
use serde::{Deserialize, Serialize};

/// One node of a captured layout tree, mirroring i3's own JSON tree at a
/// point in time. Only the fields needed for replay survive
/// deserialization; everything else i3 reports (geometry, percents,
/// focus stacks) is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// i3's own container id. Unique within one snapshot, but generated
    /// by the live instance at capture time and meaningless after a
    /// restore.
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// Split direction this container applies to newly created children.
    #[serde(default)]
    pub orientation: Orientation,
    /// Workspace number. Present only on workspace records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<i32>,
    /// X11 window handle of the client backing this record, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<u64>,
    /// Child records in layout order; the order defines the replay
    /// sequence. `Some(vec![])` and `None` are distinct on purpose, see
    /// [`SnapshotRecord::has_children`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<SnapshotRecord>>,
    /// Owning-process class token, attached during capture annotation.
    /// Lowercase. Never present on records i3 hands out directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
}

impl SnapshotRecord {
    /// Whether the record carries a child sequence at all. An empty
    /// sequence still counts: i3 always reports the `nodes` key, so the
    /// key can only go missing on records that never passed through i3.
    pub fn has_children(&self) -> bool {
        self.nodes.is_some()
    }
}

/// Split direction of a container, as i3 spells it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[display("horizontal")]
    Horizontal,
    #[display("vertical")]
    Vertical,
    #[default]
    #[display("none")]
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_an_i3_tree_payload() {
        // Trimmed-down i3 GET_TREE output: extra keys must be ignored,
        // null names tolerated.
        let json = r#"{
            "id": 94238443,
            "name": null,
            "type": "root",
            "orientation": "horizontal",
            "percent": null,
            "nodes": [
                {
                    "id": 94238501,
                    "name": "1",
                    "num": 1,
                    "orientation": "none",
                    "window": null,
                    "nodes": []
                }
            ]
        }"#;

        let record: SnapshotRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 94238443);
        assert_eq!(record.name, None);
        assert_eq!(record.orientation, Orientation::Horizontal);
        assert_eq!(record.num, None);
        assert_eq!(record.process, None);

        let workspace = &record.nodes.unwrap()[0];
        assert_eq!(workspace.num, Some(1));
        assert_eq!(workspace.orientation, Orientation::None);
        assert_eq!(workspace.window, None);
        assert_eq!(workspace.nodes, Some(vec![]));
    }

    #[test]
    fn missing_orientation_defaults_to_none() {
        let record: SnapshotRecord = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(record.orientation, Orientation::None);
    }

    #[test]
    fn empty_child_list_still_counts_as_children() {
        let with_key: SnapshotRecord =
            serde_json::from_str(r#"{"id": 1, "nodes": []}"#).unwrap();
        let without_key: SnapshotRecord = serde_json::from_str(r#"{"id": 2}"#).unwrap();

        assert!(with_key.has_children());
        assert!(!without_key.has_children());
    }

    #[test]
    fn json_round_trip_preserves_value_equality() {
        let record = SnapshotRecord {
            id: 42,
            name: Some("2".into()),
            orientation: Orientation::Vertical,
            num: Some(2),
            window: None,
            nodes: Some(vec![SnapshotRecord {
                id: 43,
                name: Some("editor".into()),
                orientation: Orientation::None,
                num: None,
                window: Some(0x1c0000a),
                nodes: Some(vec![]),
                process: Some("gvim".into()),
            }]),
            process: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: SnapshotRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn orientation_displays_in_i3_command_form() {
        assert_eq!(Orientation::Horizontal.to_string(), "horizontal");
        assert_eq!(Orientation::Vertical.to_string(), "vertical");
        assert_eq!(Orientation::None.to_string(), "none");
    }
}
