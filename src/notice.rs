//! Purpose: Non-fatal stderr notices about the record file.
//! Exports: `Notice`, `NoticeKind`, `notice_json`.
//! Invariants: Notices never change stdout payloads or the exit code.
use std::path::Path;

use serde::Serialize;
use serde_json::{Value, json};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A record was appended whose roll number is already stored.
    DuplicateId,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub time: String,
    pub cmd: String,
    pub store: String,
    pub id: String,
    pub message: String,
}

impl Notice {
    pub fn duplicate_id(cmd: &str, store: &Path, id: &str, time: String) -> Self {
        Self {
            kind: NoticeKind::DuplicateId,
            time,
            cmd: cmd.to_string(),
            store: store.display().to_string(),
            id: id.to_string(),
            message: format!("roll number {id} already exists; adding another record with it"),
        }
    }
}

pub fn notice_json(notice: &Notice) -> Value {
    json!({ "notice": notice })
}

#[cfg(test)]
mod tests {
    use super::{Notice, NoticeKind, notice_json};
    use std::path::Path;

    #[test]
    fn duplicate_id_notice_names_the_roll_number() {
        let notice = Notice::duplicate_id(
            "add",
            Path::new("hostel_data.txt"),
            "R-7",
            "2026-02-01T00:00:00Z".to_string(),
        );
        assert_eq!(notice.kind, NoticeKind::DuplicateId);

        let value = notice_json(&notice);
        let obj = &value["notice"];
        assert_eq!(obj["kind"], "duplicate_id");
        assert_eq!(obj["time"], "2026-02-01T00:00:00Z");
        assert_eq!(obj["cmd"], "add");
        assert_eq!(obj["store"], "hostel_data.txt");
        assert_eq!(obj["id"], "R-7");
        assert!(obj["message"].as_str().expect("message").contains("R-7"));
    }
}
