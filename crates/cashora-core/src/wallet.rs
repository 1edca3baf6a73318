//! User dashboard forms: deposit, withdraw, send
//!
//! Each form owns its own history list. Submitting prepends a pending
//! record; nothing is ever approved from here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use cashora_config::WalletConfig;
use cashora_utils::format_money;

use crate::error::{CoreError, CoreResult};
use crate::models::{AssignedBank, BankDetails, Transaction};
use crate::notice::Notice;
use crate::types::TransactionKind;

/// Parse a form amount; anything that is not a number above zero is refused
pub fn parse_amount(input: &str) -> CoreResult<Decimal> {
    let trimmed = input.trim();
    match trimmed.parse::<Decimal>() {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(CoreError::InvalidAmount {
            input: trimmed.to_string(),
        }),
    }
}

/// What the confirmation dialog shows before a withdrawal or send is booked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub kind: TransactionKind,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub fee: Decimal,
    /// Withdrawal destination
    pub bank: Option<BankDetails>,
    /// Send recipient
    pub recipient: Option<String>,
}

impl Quote {
    /// Amount plus fee
    pub fn total(&self) -> Decimal {
        self.amount + self.fee
    }
}

/// The signed-in user's wallet
#[derive(Debug, Clone)]
pub struct Wallet {
    balance: Decimal,
    currency_symbol: String,
    withdrawal_fee_rate: Decimal,
    send_fee_rate: Decimal,
    banks: Vec<AssignedBank>,
    deposits: Vec<Transaction>,
    withdrawals: Vec<Transaction>,
    sends: Vec<Transaction>,
}

impl Wallet {
    pub fn new(config: &WalletConfig, banks: Vec<AssignedBank>) -> Self {
        Self {
            balance: config.opening_balance,
            currency_symbol: config.currency_symbol.clone(),
            withdrawal_fee_rate: config.withdrawal_fee_rate,
            send_fee_rate: config.send_fee_rate,
            banks,
            deposits: Vec::new(),
            withdrawals: Vec::new(),
            sends: Vec::new(),
        }
    }

    /// Replace the three histories
    pub fn with_history(
        mut self,
        deposits: Vec<Transaction>,
        withdrawals: Vec<Transaction>,
        sends: Vec<Transaction>,
    ) -> Self {
        self.deposits = deposits;
        self.withdrawals = withdrawals;
        self.sends = sends;
        self
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn banks(&self) -> &[AssignedBank] {
        &self.banks
    }

    pub fn deposits(&self) -> &[Transaction] {
        &self.deposits
    }

    pub fn withdrawals(&self) -> &[Transaction] {
        &self.withdrawals
    }

    pub fn sends(&self) -> &[Transaction] {
        &self.sends
    }

    pub fn withdrawal_fee(&self, amount: Decimal) -> Decimal {
        amount * self.withdrawal_fee_rate
    }

    pub fn send_fee(&self, amount: Decimal) -> Decimal {
        amount * self.send_fee_rate
    }

    fn money(&self, amount: Decimal) -> String {
        format_money(&self.currency_symbol, amount)
    }

    /// Book a pending deposit at the top of the deposit history
    pub fn submit_deposit(
        &mut self,
        amount: &str,
        full_name: Option<&str>,
        receipt: Option<&str>,
        today: NaiveDate,
    ) -> CoreResult<Notice> {
        let amount = parse_amount(amount)?;
        let id = (self.deposits.len() + 1).to_string();

        let mut record = Transaction::new(&id, TransactionKind::Deposit, amount, today);
        if let Some(name) = full_name.map(str::trim).filter(|n| !n.is_empty()) {
            record = record.with_holder(name);
        }
        if let Some(receipt) = receipt.map(str::trim).filter(|r| !r.is_empty()) {
            record = record.with_receipt(receipt);
        }
        self.deposits.insert(0, record);

        log::info!("Deposit {} submitted for {}", id, amount);
        Ok(Notice::new(
            "Deposit Request Submitted",
            format!(
                "Your deposit request for {} has been submitted and is pending approval.",
                self.money(amount)
            ),
        ))
    }

    /// Validate a withdrawal and compute its fee
    ///
    /// The account number defaults to the one on file for the chosen bank.
    pub fn quote_withdrawal(
        &self,
        amount: &str,
        bank_id: Option<&str>,
        account_number: Option<&str>,
    ) -> CoreResult<Quote> {
        let bank = bank_id
            .and_then(|id| self.banks.iter().find(|b| b.id == id))
            .ok_or(CoreError::NoBankSelected)?;
        let amount = parse_amount(amount)?;

        let mut details = bank.details();
        if let Some(number) = account_number.map(str::trim).filter(|n| !n.is_empty()) {
            details.account_number = number.to_string();
        }

        Ok(Quote {
            kind: TransactionKind::Withdrawal,
            amount,
            fee: self.withdrawal_fee(amount),
            bank: Some(details),
            recipient: None,
        })
    }

    /// Book a pending withdrawal from a confirmed quote
    pub fn confirm_withdrawal(
        &mut self,
        amount: &str,
        bank_id: Option<&str>,
        account_number: Option<&str>,
        today: NaiveDate,
    ) -> CoreResult<Notice> {
        let quote = self.quote_withdrawal(amount, bank_id, account_number)?;
        let id = (self.withdrawals.len() + 1).to_string();

        let mut record = Transaction::new(&id, TransactionKind::Withdrawal, quote.amount, today)
            .with_fee(quote.fee);
        if let Some(bank) = quote.bank {
            record = record.with_bank(bank);
        }
        self.withdrawals.insert(0, record);

        log::info!("Withdrawal {} submitted for {}", id, quote.amount);
        Ok(Notice::new(
            "Withdrawal Request Submitted",
            format!(
                "Your withdrawal request for {} has been submitted and is pending approval.",
                self.money(quote.amount)
            ),
        ))
    }

    /// Validate a transfer against the balance and compute its fee
    pub fn quote_send(&self, amount: &str, recipient: &str) -> CoreResult<Quote> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(CoreError::ValidationError {
                message: "Please enter a recipient username or email.".to_string(),
            });
        }
        let amount = parse_amount(amount)?;
        if amount > self.balance {
            return Err(CoreError::InsufficientBalance {
                balance: self.balance,
                requested: amount,
            });
        }

        Ok(Quote {
            kind: TransactionKind::Send,
            amount,
            fee: self.send_fee(amount),
            bank: None,
            recipient: Some(recipient.to_string()),
        })
    }

    /// Book a pending transfer and take amount plus fee off the balance
    pub fn confirm_send(&mut self, amount: &str, recipient: &str, today: NaiveDate) -> CoreResult<Notice> {
        let quote = self.quote_send(amount, recipient)?;
        let recipient = quote.recipient.clone().unwrap_or_default();
        let id = (self.sends.len() + 1).to_string();

        let record = Transaction::new(&id, TransactionKind::Send, quote.amount, today)
            .with_counterparty(&recipient)
            .with_fee(quote.fee);
        self.sends.insert(0, record);
        self.balance -= quote.total();

        log::info!(
            "Transfer {} of {} to {} submitted, balance now {}",
            id,
            quote.amount,
            recipient,
            self.balance
        );
        Ok(Notice::new(
            "Money Transfer Initiated",
            format!(
                "Your transfer of {} to {} has been initiated and is pending approval.",
                self.money(quote.amount),
                recipient
            ),
        ))
    }
}
