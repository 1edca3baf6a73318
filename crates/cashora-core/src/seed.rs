//! Sample records every screen starts with
//!
//! Each function returns a fresh copy, so screens never share a list.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::directory::BankMember;
use crate::models::{AssignedBank, Bank, BankDetails, Limits, Transaction, User};
use crate::profile::{AdminProfile, UserProfile};
use crate::settings::PlatformSettings;
use crate::types::{FeeType, Role, Status, TransactionKind};

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap_or_default()
}

fn amount(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

/// Admin transaction history
pub fn admin_transactions() -> Vec<Transaction> {
    vec![
        Transaction::new("1", TransactionKind::Deposit, amount(1000), jan(15))
            .with_status(Status::Completed)
            .with_holder("John Doe"),
        Transaction::new("2", TransactionKind::Withdrawal, amount(500), jan(16))
            .with_holder("Jane Smith"),
        Transaction::new("3", TransactionKind::Send, amount(200), jan(17))
            .with_status(Status::Completed)
            .with_holder("Alice Johnson")
            .with_counterparty("Bob Williams"),
    ]
}

/// The user's recent activity panel
pub fn user_transactions() -> Vec<Transaction> {
    vec![
        Transaction::new("1", TransactionKind::Deposit, amount(1000), jan(15))
            .with_status(Status::Completed)
            .with_receipt("/mock-receipt.jpg"),
        Transaction::new("2", TransactionKind::Withdrawal, amount(500), jan(16)),
        Transaction::new("3", TransactionKind::Send, amount(200), jan(17))
            .with_status(Status::Completed)
            .with_counterparty("john@example.com"),
    ]
}

pub fn deposit_requests() -> Vec<Transaction> {
    vec![
        Transaction::new("1", TransactionKind::Deposit, amount(1000), jan(15))
            .with_holder("John Doe")
            .with_receipt("/mock-receipt.jpg"),
        Transaction::new("2", TransactionKind::Deposit, amount(1500), jan(16))
            .with_holder("Jane Smith")
            .with_receipt("/mock-receipt-2.jpg"),
    ]
}

pub fn withdrawal_requests() -> Vec<Transaction> {
    vec![
        Transaction::new("1", TransactionKind::Withdrawal, amount(500), jan(15))
            .with_holder("John Doe")
            .with_bank(BankDetails::new("ABC Bank", "1234567890")),
        Transaction::new("2", TransactionKind::Withdrawal, amount(1000), jan(16))
            .with_holder("Jane Smith")
            .with_bank(BankDetails::new("XYZ Bank", "0987654321")),
    ]
}

pub fn send_requests() -> Vec<Transaction> {
    vec![
        Transaction::new("1", TransactionKind::Send, amount(500), jan(15))
            .with_holder("John Doe")
            .with_counterparty("Alice Johnson"),
        Transaction::new("2", TransactionKind::Send, amount(750), jan(16))
            .with_holder("Jane Smith")
            .with_counterparty("Bob Williams"),
    ]
}

pub fn user_deposits() -> Vec<Transaction> {
    vec![
        Transaction::new("1", TransactionKind::Deposit, amount(1000), jan(15))
            .with_status(Status::Completed)
            .with_receipt("/mock-receipt.jpg"),
        Transaction::new("2", TransactionKind::Deposit, amount(500), jan(16)),
        Transaction::new("3", TransactionKind::Deposit, amount(750), jan(17))
            .with_status(Status::Rejected),
    ]
}

pub fn user_withdrawals() -> Vec<Transaction> {
    vec![
        Transaction::new("1", TransactionKind::Withdrawal, amount(500), jan(15))
            .with_status(Status::Completed)
            .with_bank(BankDetails::new("Commercial Bank Of Ethiopia", "1234567890")),
        Transaction::new("2", TransactionKind::Withdrawal, amount(750), jan(16))
            .with_bank(BankDetails::new("Awash Bank", "0987654321")),
    ]
}

pub fn user_sends() -> Vec<Transaction> {
    vec![
        Transaction::new("1", TransactionKind::Send, amount(200), jan(15))
            .with_status(Status::Completed)
            .with_counterparty("john@example.com"),
        Transaction::new("2", TransactionKind::Send, amount(300), jan(16))
            .with_counterparty("jane@example.com"),
        Transaction::new("3", TransactionKind::Send, amount(150), jan(17))
            .with_status(Status::Rejected)
            .with_counterparty("bob@example.com"),
    ]
}

/// Banks the signed-in user may withdraw to
pub fn assigned_banks() -> Vec<AssignedBank> {
    vec![
        AssignedBank {
            id: "1".to_string(),
            name: "Commercial Bank Of Ethiopia".to_string(),
            account_number: "1234567890".to_string(),
        },
        AssignedBank {
            id: "2".to_string(),
            name: "Awash Bank".to_string(),
            account_number: "0987654321".to_string(),
        },
    ]
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: "1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            username: "johndoe".to_string(),
            email: "john@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
            place_of_birth: "New York".to_string(),
            residence: "Los Angeles".to_string(),
            nationality: "USA".to_string(),
            id_card: "ID12345".to_string(),
            role: Role::User,
            status: Status::Completed,
            balance: amount(1000),
            withdrawal_limit: Limits::new(amount(500), amount(2000), amount(20000)),
            sending_limit: Limits::new(amount(1000), amount(4000), amount(40000)),
            fee_type: FeeType::Percentage,
            fee_amount: amount(2),
        },
        User {
            id: "2".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            username: "janesmith".to_string(),
            email: "jane@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1992, 5, 15),
            place_of_birth: "London".to_string(),
            residence: "Manchester".to_string(),
            nationality: "UK".to_string(),
            id_card: "ID67890".to_string(),
            role: Role::User,
            status: Status::Pending,
            balance: Decimal::ZERO,
            withdrawal_limit: Limits::default(),
            sending_limit: Limits::default(),
            fee_type: FeeType::Fixed,
            fee_amount: amount(5),
        },
    ]
}

pub fn banks() -> Vec<Bank> {
    vec![
        Bank {
            id: "1".to_string(),
            name: "Commercial Bank Of Ethiopia".to_string(),
            user_ids: vec!["1".to_string(), "2".to_string()],
            date_added: jan(15),
        },
        Bank {
            id: "2".to_string(),
            name: "Awash Bank".to_string(),
            user_ids: vec!["3".to_string()],
            date_added: jan(20),
        },
    ]
}

/// People listed in the bank assignment dialog
pub fn bank_members() -> Vec<BankMember> {
    [
        ("1", "John Doe", "john@example.com"),
        ("2", "Jane Smith", "jane@example.com"),
        ("3", "Bob Johnson", "bob@example.com"),
    ]
    .iter()
    .map(|(id, name, email)| BankMember {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
    })
    .collect()
}

/// The signed-in user's profile card
pub fn user_profile() -> UserProfile {
    UserProfile {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        phone_number: "+1234567890".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default(),
        address: "123 Main St, Anytown, USA".to_string(),
        avatar: "/placeholder-avatar.jpg".to_string(),
    }
}

pub fn admin_profile() -> AdminProfile {
    AdminProfile {
        name: "Admin User".to_string(),
        email: "admin@cashora.com".to_string(),
        role: "Super Admin".to_string(),
        bio: "Experienced administrator managing the Cashora platform.".to_string(),
        avatar: "/placeholder-avatar.jpg".to_string(),
    }
}

pub fn platform_settings() -> PlatformSettings {
    PlatformSettings {
        min_withdrawal: amount(10),
        max_withdrawal: amount(1000),
        min_send: amount(5),
        max_send: amount(500),
        default_fee_percentage: Decimal::new(25, 1),
        email_notifications: true,
        maintenance_mode: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unique_ids(records: &[Transaction]) -> bool {
        let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        ids.len() == records.len()
    }

    #[test]
    fn test_ids_unique_per_list() {
        for list in [
            admin_transactions(),
            user_transactions(),
            deposit_requests(),
            withdrawal_requests(),
            send_requests(),
            user_deposits(),
            user_withdrawals(),
            user_sends(),
        ] {
            assert!(unique_ids(&list));
        }
    }

    #[test]
    fn test_request_queues_start_pending() {
        for list in [deposit_requests(), withdrawal_requests(), send_requests()] {
            assert!(list.iter().all(|r| r.status == Status::Pending));
        }
    }

    #[test]
    fn test_admin_history_matches_sample() {
        let list = admin_transactions();
        assert_eq!(list[0].amount, amount(1000));
        assert_eq!(list[1].kind, TransactionKind::Withdrawal);
        assert_eq!(list[2].counterparty.as_deref(), Some("Bob Williams"));
        assert_eq!(list[2].date.to_string(), "2024-01-17");
    }

    #[test]
    fn test_copies_are_independent() {
        let mut first = admin_transactions();
        first[1].status = Status::Completed;
        assert_eq!(admin_transactions()[1].status, Status::Pending);
    }
}
