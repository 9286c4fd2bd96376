//! Task record model.
//!
//! The serialized form of this struct is the cache Record payload; identifiers
//! are assignment-ordered, which is what makes them usable as both cursor and
//! ordered-index score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub status: String,
    pub title: String,
    pub description: String,
    pub creator_id: i64,
    pub created_at: DateTime<Utc>,
    pub assignee_id: Option<i64>,
    pub team_id: i64,
}

impl Task {
    /// Convenience constructor used by tests and fixtures.
    pub fn new(id: i64, team_id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            status: "open".to_string(),
            title: title.into(),
            description: String::new(),
            creator_id: 0,
            created_at: Utc::now(),
            assignee_id: None,
            team_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_round_trips_through_json() {
        let task = Task::new(42, 5, "write release notes");
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_unassigned_task_serializes_null_assignee() {
        let task = Task::new(1, 1, "triage");
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"assignee_id\":null"));
    }
}
