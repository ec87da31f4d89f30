use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SweepJobStatus {
    Pending,
    Completed,
    Failed,
}

impl SweepJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepJobStatus::Pending => "PENDING",
            SweepJobStatus::Completed => "COMPLETED",
            SweepJobStatus::Failed => "FAILED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(SweepJobStatus::Pending),
            "COMPLETED" => Some(SweepJobStatus::Completed),
            "FAILED" => Some(SweepJobStatus::Failed),
            _ => None,
        }
    }
}

impl Display for SweepJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
