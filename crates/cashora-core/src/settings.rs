//! Platform-wide settings edited from the admin console
//!
//! The values are stored and shown back; the wallet forms keep their own
//! fee rates from the configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::notice::Notice;

/// Settings form as submitted, numbers still as typed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDraft {
    pub min_withdrawal: String,
    pub max_withdrawal: String,
    pub min_send: String,
    pub max_send: String,
    pub default_fee_percentage: String,
    pub email_notifications: bool,
    pub maintenance_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSettings {
    #[serde(with = "rust_decimal::serde::str")]
    pub min_withdrawal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub max_withdrawal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub min_send: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub max_send: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub default_fee_percentage: Decimal,
    pub email_notifications: bool,
    pub maintenance_mode: bool,
}

fn non_negative(label: &str, input: &str) -> CoreResult<Decimal> {
    match input.trim().parse::<Decimal>() {
        Ok(value) if value >= Decimal::ZERO => Ok(value),
        _ => Err(CoreError::ValidationError {
            message: format!("{} must be a number of zero or more.", label),
        }),
    }
}

fn ordered(kind: &str, min: Decimal, max: Decimal) -> CoreResult<()> {
    if min > max {
        return Err(CoreError::ValidationError {
            message: format!("Minimum {} cannot be above the maximum.", kind),
        });
    }
    Ok(())
}

impl PlatformSettings {
    /// Replace every value at once; a refused form changes nothing
    pub fn update(&mut self, draft: &SettingsDraft) -> CoreResult<Notice> {
        let min_withdrawal = non_negative("Minimum withdrawal", &draft.min_withdrawal)?;
        let max_withdrawal = non_negative("Maximum withdrawal", &draft.max_withdrawal)?;
        let min_send = non_negative("Minimum send amount", &draft.min_send)?;
        let max_send = non_negative("Maximum send amount", &draft.max_send)?;
        let fee = non_negative("Default fee percentage", &draft.default_fee_percentage)?;

        ordered("withdrawal", min_withdrawal, max_withdrawal)?;
        ordered("send amount", min_send, max_send)?;
        if fee > Decimal::ONE_HUNDRED {
            return Err(CoreError::ValidationError {
                message: "Default fee percentage cannot be above 100.".to_string(),
            });
        }

        *self = Self {
            min_withdrawal,
            max_withdrawal,
            min_send,
            max_send,
            default_fee_percentage: fee,
            email_notifications: draft.email_notifications,
            maintenance_mode: draft.maintenance_mode,
        };
        log::info!(
            "Platform settings saved (maintenance mode {})",
            if self.maintenance_mode { "on" } else { "off" }
        );

        Ok(Notice::new(
            "Settings Saved",
            "Your settings have been updated successfully.",
        ))
    }
}
