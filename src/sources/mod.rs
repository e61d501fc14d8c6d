pub mod notion;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Substituted for any task field the remote record does not carry.
pub const PLACEHOLDER: &str = "-";

/// A task as shown on the display. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub status: String,
    pub assignee: String,
    pub is_past_due: bool,
}

/// Names of the remote properties each task field is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub name: String,
    pub status: String,
    pub assignee: String,
    pub due_date: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            status: "Status".to_string(),
            assignee: "Assignee".to_string(),
            due_date: "Due".to_string(),
        }
    }
}

/// Everything a single fetch cycle needs. Built fresh for every cycle.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub notion_token: String,
    pub data_source_id: String,
    pub fields: FieldMapping,
    pub done_statuses: Vec<String>,
    /// Reference date (`YYYY-MM-DD`) used by both the remote filter and the
    /// local past-due flag.
    pub today: String,
}

impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequest")
            .field("notion_token", &"<redacted>")
            .field("data_source_id", &self.data_source_id)
            .field("fields", &self.fields)
            .field("done_statuses", &self.done_statuses)
            .field("today", &self.today)
            .finish()
    }
}

/// Payload handed back to the display after a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub tasks: Vec<Task>,
}

pub trait TaskSource: Send + Sync {
    /// Query the remote service and normalize every returned record.
    fn fetch_tasks(&self, request: &FetchRequest) -> Result<Vec<Task>>;
}
