use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    BankTransfer,
    Card,
    Crypto,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Crypto => "CRYPTO",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "BANK_TRANSFER" => Some(PaymentMethod::BankTransfer),
            "CARD" => Some(PaymentMethod::Card),
            "CRYPTO" => Some(PaymentMethod::Crypto),
            _ => None,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
