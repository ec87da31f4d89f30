use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Cached review progress on the user row.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApprovalStatus {
    #[default]
    None,
    Pending,
    Approved,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::None => "NONE",
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "NONE" => Some(ApprovalStatus::None),
            "PENDING" => Some(ApprovalStatus::Pending),
            "APPROVED" => Some(ApprovalStatus::Approved),
            _ => None,
        }
    }
}

impl Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
