use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    VirtualAccount,
    Qris,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::VirtualAccount => "virtual_account",
            PaymentMethod::Qris => "qris",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "virtual_account" => Some(PaymentMethod::VirtualAccount),
            "qris" => Some(PaymentMethod::Qris),
            _ => None,
        }
    }

    /// Payment channel names understood by the gateway's invoice API.
    pub fn gateway_channels(&self, bank_code: Option<&str>) -> Vec<String> {
        match self {
            PaymentMethod::VirtualAccount => {
                let mut channels = vec!["BANK_TRANSFER".to_string()];
                if let Some(bank) = bank_code.map(str::trim).filter(|bank| !bank.is_empty()) {
                    channels.push(bank.to_ascii_uppercase());
                }
                channels
            }
            PaymentMethod::Qris => vec!["QRIS".to_string()],
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_account_includes_bank_when_given() {
        assert_eq!(
            PaymentMethod::VirtualAccount.gateway_channels(Some("bca")),
            vec!["BANK_TRANSFER".to_string(), "BCA".to_string()]
        );
        assert_eq!(
            PaymentMethod::VirtualAccount.gateway_channels(Some("  ")),
            vec!["BANK_TRANSFER".to_string()]
        );
    }

    #[test]
    fn qris_ignores_bank_code() {
        assert_eq!(
            PaymentMethod::Qris.gateway_channels(Some("BNI")),
            vec!["QRIS".to_string()]
        );
    }
}
