use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Cached payment progress on the user row. Flipped by submission and review flows.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    #[default]
    None,
    Verifying,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::None => "NONE",
            PaymentStatus::Verifying => "VERIFYING",
            PaymentStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "NONE" => Some(PaymentStatus::None),
            "VERIFYING" => Some(PaymentStatus::Verifying),
            "COMPLETED" => Some(PaymentStatus::Completed),
            _ => None,
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
