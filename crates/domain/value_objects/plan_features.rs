use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FEATURE_SIGNAL_CHARTS: &str = "SIGNAL_CHARTS";
pub const FEATURE_TELEGRAM_BASIC: &str = "TELEGRAM_BASIC";
pub const FEATURE_MARTINGALE_EA: &str = "MARTINGALE_EA";
pub const FEATURE_TELEGRAM_PRO: &str = "TELEGRAM_PRO";
pub const FEATURE_TELEGRAM_VIP: &str = "TELEGRAM_VIP";
pub const FEATURE_CONSULT_1ON1: &str = "CONSULT_1ON1";

/// Numeric override for the monthly consult quota. Not an access flag.
pub const FEATURE_CONSULT_LIMIT: &str = "CONSULT_LIMIT";

/// Flags and limits attached to a plan row or frozen into a grant snapshot.
/// Stored as JSONB. Keys stay open so new flags can ship without a migration;
/// only the entitlement resolver pins a recognized set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PlanFeatures(pub BTreeMap<String, Value>);

impl PlanFeatures {
    /// Parses the JSONB column. Anything that is not a JSON object collapses
    /// to an empty map, which reads as all flags off.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// A flag is granted only by a literal JSON `true`. Strings, numbers and
    /// missing keys all read as off.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Bool(true)))
    }

    pub fn consult_limit_override(&self) -> Option<u32> {
        self.0
            .get(FEATURE_CONSULT_LIMIT)
            .and_then(Value::as_u64)
            .and_then(|limit| u32::try_from(limit).ok())
    }
}
