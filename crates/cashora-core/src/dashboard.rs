//! Read-only summaries for the two overview pages

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Transaction;
use crate::types::{Status, TransactionKind};
use crate::Workspace;

/// Admin overview cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminOverview {
    pub total_users: usize,
    pub pending_users: usize,
    pub pending_deposits: usize,
    pub pending_withdrawals: usize,
    pub pending_sends: usize,
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit_volume: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub withdrawal_volume: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub send_volume: Decimal,
    pub recent: Vec<Transaction>,
}

impl AdminOverview {
    /// Requests waiting for a decision across the three queues
    pub fn pending_requests(&self) -> usize {
        self.pending_deposits + self.pending_withdrawals + self.pending_sends
    }

    /// Completed volume of every kind
    pub fn completed_volume(&self) -> Decimal {
        self.deposit_volume + self.withdrawal_volume + self.send_volume
    }
}

/// User overview cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOverview {
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    pub pending_requests: usize,
    pub recent: Vec<Transaction>,
}

/// Summaries over a workspace
pub trait Overview {
    fn admin_overview(&self, recent: usize) -> AdminOverview;
    fn user_overview(&self, recent: usize) -> UserOverview;
}

/// Sum of completed amounts of one kind
pub fn completed_volume(records: &[Transaction], kind: TransactionKind) -> Decimal {
    records
        .iter()
        .filter(|r| r.kind == kind && r.status == Status::Completed)
        .map(|r| r.amount)
        .sum()
}

fn pending(records: &[Transaction]) -> usize {
    records.iter().filter(|r| r.is_pending()).count()
}

impl Overview for Workspace {
    fn admin_overview(&self, recent: usize) -> AdminOverview {
        AdminOverview {
            total_users: self.users.users().len(),
            pending_users: self.users.pending_count(),
            pending_deposits: self.deposit_requests.pending_count(),
            pending_withdrawals: self.withdrawal_requests.pending_count(),
            pending_sends: self.send_requests.pending_count(),
            deposit_volume: completed_volume(&self.transactions, TransactionKind::Deposit),
            withdrawal_volume: completed_volume(&self.transactions, TransactionKind::Withdrawal),
            send_volume: completed_volume(&self.transactions, TransactionKind::Send),
            recent: self.transactions.iter().take(recent).cloned().collect(),
        }
    }

    fn user_overview(&self, recent: usize) -> UserOverview {
        UserOverview {
            balance: self.wallet.balance(),
            pending_requests: pending(self.wallet.deposits())
                + pending(self.wallet.withdrawals())
                + pending(self.wallet.sends()),
            recent: self.activity.iter().take(recent).cloned().collect(),
        }
    }
}
