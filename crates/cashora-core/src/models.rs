//! Core data models for the screens' record lists

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{FeeType, Role, Status, TransactionKind};

/// Destination of a withdrawal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    /// Bank name (e.g., "Awash Bank")
    pub name: String,
    /// Account number at that bank
    pub account_number: String,
}

impl BankDetails {
    pub fn new(name: &str, account_number: &str) -> Self {
        Self {
            name: name.to_string(),
            account_number: account_number.to_string(),
        }
    }
}

/// Transaction information
///
/// One shape for every list: the admin history, the three request queues
/// and the user's own deposit/withdraw/send histories. Optional fields are
/// only filled where the screen that owns the list has them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier, unique within its list
    pub id: String,
    /// Deposit, withdrawal or send
    pub kind: TransactionKind,
    /// Non-negative amount
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// Review status
    pub status: Status,
    /// Booking date
    pub date: NaiveDate,
    /// Account holder (admin lists)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    /// Recipient of a send
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    /// Receipt reference attached to a deposit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    /// Withdrawal destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankDetails>,
    /// Fee charged at submission
    #[serde(default, with = "rust_decimal::serde::str_option", skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,
}

impl Transaction {
    /// Create a pending record with no optional fields
    pub fn new(id: &str, kind: TransactionKind, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            kind,
            amount,
            status: Status::Pending,
            date,
            holder: None,
            counterparty: None,
            receipt: None,
            bank: None,
            fee: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_holder(mut self, holder: &str) -> Self {
        self.holder = Some(holder.to_string());
        self
    }

    pub fn with_counterparty(mut self, counterparty: &str) -> Self {
        self.counterparty = Some(counterparty.to_string());
        self
    }

    pub fn with_receipt(mut self, receipt: &str) -> Self {
        self.receipt = Some(receipt.to_string());
        self
    }

    pub fn with_bank(mut self, bank: BankDetails) -> Self {
        self.bank = Some(bank);
        self
    }

    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Shortest decimal text of the amount: `1000`, `200.5`
    pub fn amount_text(&self) -> String {
        self.amount.normalize().to_string()
    }

    /// Amount plus fee, what actually leaves the balance
    pub fn total_deduction(&self) -> Decimal {
        self.amount + self.fee.unwrap_or(Decimal::ZERO)
    }

    /// Check if the record still awaits a decision
    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }
}

/// Weekly / monthly / yearly caps; `None` means unlimited
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub weekly: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub monthly: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub yearly: Option<Decimal>,
}

impl Limits {
    pub fn new(weekly: Decimal, monthly: Decimal, yearly: Decimal) -> Self {
        Self {
            weekly: Some(weekly),
            monthly: Some(monthly),
            yearly: Some(yearly),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.weekly.is_none() && self.monthly.is_none() && self.yearly.is_none()
    }
}

/// Platform user as managed from the admin console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub place_of_birth: String,
    #[serde(default)]
    pub residence: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub id_card: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: Status,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    #[serde(default)]
    pub withdrawal_limit: Limits,
    #[serde(default)]
    pub sending_limit: Limits,
    #[serde(default)]
    pub fee_type: FeeType,
    #[serde(with = "rust_decimal::serde::str")]
    pub fee_amount: Decimal,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Fee the user pays on a transfer of `amount`
    pub fn fee_for(&self, amount: Decimal) -> Decimal {
        match self.fee_type {
            FeeType::Fixed => self.fee_amount,
            FeeType::Percentage => amount * self.fee_amount / Decimal::ONE_HUNDRED,
        }
    }
}

/// Editable part of a user, as submitted by the add/edit forms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: String,
    pub residence: String,
    pub nationality: String,
    pub id_card: String,
    pub role: Role,
    pub withdrawal_limit: Option<Limits>,
    pub sending_limit: Option<Limits>,
    pub fee_type: Option<FeeType>,
    pub fee_amount: Option<Decimal>,
}

/// Bank known to the platform, with the users allowed to withdraw to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub user_ids: Vec<String>,
    pub date_added: NaiveDate,
}

/// Bank account the signed-in user may withdraw to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedBank {
    pub id: String,
    pub name: String,
    pub account_number: String,
}

impl AssignedBank {
    pub fn details(&self) -> BankDetails {
        BankDetails::new(&self.name, &self.account_number)
    }
}
