//! Song records as served by the catalog

use serde::{Deserialize, Serialize};

/// One track in the catalog.
///
/// Records are never edited client-side; an updated copy from the server
/// replaces the old one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub play_count: u32,
    #[serde(rename = "duration", default)]
    pub duration_seconds: u32,
}

impl Song {
    pub fn duration_label(&self) -> String {
        format_duration(u64::from(self.duration_seconds))
    }
}

/// Format whole seconds as `MM:SS`.
pub fn format_duration(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
