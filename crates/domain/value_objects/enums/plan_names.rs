use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Known membership tiers. Catalog rows may carry other names, but quota
/// fallbacks only exist for these three.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanName {
    Basic,
    Pro,
    Vip,
}

impl PlanName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanName::Basic => "BASIC",
            PlanName::Pro => "PRO",
            PlanName::Vip => "VIP",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "BASIC" => Some(PlanName::Basic),
            "PRO" => Some(PlanName::Pro),
            "VIP" => Some(PlanName::Vip),
            _ => None,
        }
    }

    /// Monthly one-on-one consult quota when the plan snapshot does not
    /// override it. None means unlimited.
    pub fn default_consult_limit(&self) -> Option<u32> {
        match self {
            PlanName::Basic => Some(2),
            PlanName::Pro => Some(4),
            PlanName::Vip => None,
        }
    }
}

impl Display for PlanName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
