//! User and bank management for the admin console

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{Bank, Limits, User, UserDraft};
use crate::notice::Notice;
use crate::review::{ReviewLabels, ReviewQueue};
use crate::types::{FeeType, Role, Status};
use crate::view::{parse_filter, Record, SortKey};

static EMAIL_REGEX: OnceCell<Regex> = OnceCell::new();

/// Loose shape check: something@something.tld
pub fn looks_like_email(email: &str) -> bool {
    let re = EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
    re.is_match(email.trim())
}

/// Next numeric id: one above the largest id in use
fn next_id<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let max = ids.filter_map(|id| id.parse::<u64>().ok()).max().unwrap_or(0);
    (max + 1).to_string()
}

fn validate_draft(draft: &UserDraft) -> CoreResult<()> {
    let missing: Vec<&str> = [
        ("First name", draft.first_name.as_str()),
        ("Last name", draft.last_name.as_str()),
        ("Email", draft.email.as_str()),
    ]
    .iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(label, _)| *label)
    .collect();

    if !missing.is_empty() {
        return Err(CoreError::ValidationError {
            message: format!("{} required.", missing.join(", ")),
        });
    }
    if !looks_like_email(&draft.email) {
        return Err(CoreError::ValidationError {
            message: format!("'{}' is not a valid email address.", draft.email.trim()),
        });
    }
    Ok(())
}

// ==================== Users ====================

/// Sortable user columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Id,
    Name,
    Email,
    Status,
    Balance,
}

impl FromStr for UserField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(UserField::Id),
            "name" => Ok(UserField::Name),
            "email" => Ok(UserField::Email),
            "status" => Ok(UserField::Status),
            "balance" => Ok(UserField::Balance),
            _ => Err(format!("Invalid sort field: {}", s)),
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserField::Id => write!(f, "id"),
            UserField::Name => write!(f, "name"),
            UserField::Email => write!(f, "email"),
            UserField::Status => write!(f, "status"),
            UserField::Balance => write!(f, "balance"),
        }
    }
}

/// Status restriction of the user list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub status: Option<Status>,
}

impl UserFilter {
    pub fn parse(status: Option<&str>) -> Self {
        Self {
            status: parse_filter(status),
        }
    }
}

impl Record for User {
    type Field = UserField;
    type Filter = UserFilter;

    fn haystack(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.full_name(),
            self.username.clone(),
            self.email.clone(),
        ]
    }

    fn passes(&self, filter: &UserFilter) -> bool {
        filter.status.map_or(true, |s| self.status == s)
    }

    fn sort_key(&self, field: UserField) -> SortKey {
        match field {
            UserField::Id => SortKey::text(&self.id),
            UserField::Name => SortKey::Text(self.full_name()),
            UserField::Email => SortKey::text(&self.email),
            UserField::Status => SortKey::text(self.status.as_str()),
            UserField::Balance => SortKey::Number(self.balance),
        }
    }
}

/// The admin console's user list
#[derive(Debug, Clone)]
pub struct UserDirectory {
    queue: ReviewQueue<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            queue: ReviewQueue::new(ReviewLabels::new("User", "The user"), users),
        }
    }

    pub fn users(&self) -> &[User] {
        self.queue.records()
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.queue.get(id)
    }

    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    /// Refuse an email another user already has
    fn ensure_email_free(&self, email: &str, except: Option<&str>) -> CoreResult<()> {
        let email = email.trim();
        let taken = self
            .users()
            .iter()
            .any(|u| Some(u.id.as_str()) != except && u.email.eq_ignore_ascii_case(email));
        if taken {
            return Err(CoreError::DuplicateEntry { entry: email.to_string() });
        }
        Ok(())
    }

    /// Create a pending user with zero balance, appended to the list
    pub fn add(&mut self, draft: UserDraft) -> CoreResult<Notice> {
        validate_draft(&draft)?;
        self.ensure_email_free(&draft.email, None)?;
        let id = next_id(self.users().iter().map(|u| u.id.as_str()));

        let user = User {
            id: id.clone(),
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            username: draft.username.trim().to_string(),
            email: draft.email.trim().to_string(),
            date_of_birth: draft.date_of_birth,
            place_of_birth: draft.place_of_birth,
            residence: draft.residence,
            nationality: draft.nationality,
            id_card: draft.id_card,
            role: draft.role,
            status: Status::Pending,
            balance: Decimal::ZERO,
            withdrawal_limit: Limits::default(),
            sending_limit: Limits::default(),
            fee_type: FeeType::Percentage,
            fee_amount: Decimal::ZERO,
        };
        let notice = Notice::new(
            "User Added",
            format!("{} has been added successfully.", user.full_name()),
        );
        log::info!("User {} added ({})", id, user.email);
        self.queue.records_mut().push(user);
        Ok(notice)
    }

    /// Self-service account request: always a plain user, pending review
    pub fn sign_up(&mut self, mut draft: UserDraft) -> CoreResult<Notice> {
        draft.role = Role::User;
        draft.withdrawal_limit = None;
        draft.sending_limit = None;
        draft.fee_type = None;
        draft.fee_amount = None;
        self.add(draft)?;
        Ok(Notice::new(
            "Account Created",
            "Your account has been created and is waiting for approval.",
        ))
    }

    /// Overwrite the editable fields of a user; unknown ids change nothing
    pub fn update(&mut self, id: &str, draft: UserDraft) -> CoreResult<Notice> {
        validate_draft(&draft)?;
        self.ensure_email_free(&draft.email, Some(id))?;

        if let Some(user) = self.queue.records_mut().iter_mut().find(|u| u.id == id) {
            user.first_name = draft.first_name.trim().to_string();
            user.last_name = draft.last_name.trim().to_string();
            user.username = draft.username.trim().to_string();
            user.email = draft.email.trim().to_string();
            user.date_of_birth = draft.date_of_birth;
            user.place_of_birth = draft.place_of_birth;
            user.residence = draft.residence;
            user.nationality = draft.nationality;
            user.id_card = draft.id_card;
            user.role = draft.role;
            if let Some(limits) = draft.withdrawal_limit {
                user.withdrawal_limit = limits;
            }
            if let Some(limits) = draft.sending_limit {
                user.sending_limit = limits;
            }
            if let Some(fee_type) = draft.fee_type {
                user.fee_type = fee_type;
            }
            if let Some(fee_amount) = draft.fee_amount {
                user.fee_amount = fee_amount;
            }
            log::info!("User {} updated", id);
        }

        Ok(Notice::new(
            "User Updated",
            "User information has been updated successfully.",
        ))
    }

    pub fn delete(&mut self, id: &str) -> Notice {
        let users = self.queue.records_mut();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() < before {
            log::info!("User {} deleted", id);
        }
        Notice::destructive("User Deleted", "The user has been deleted successfully.")
    }

    pub fn approve(&mut self, id: &str) -> Notice {
        self.queue.approve(id)
    }

    pub fn reject(&mut self, id: &str, reason: &str) -> CoreResult<Notice> {
        self.queue.reject_with(id, reason)
    }
}

// ==================== Banks ====================

/// A user as listed in the bank assignment dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankMember {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Who a bank should be assigned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    All,
    Only(Vec<String>),
}

/// The admin console's bank list
#[derive(Debug, Clone)]
pub struct BankDirectory {
    banks: Vec<Bank>,
    members: Vec<BankMember>,
}

impl BankDirectory {
    pub fn new(banks: Vec<Bank>, members: Vec<BankMember>) -> Self {
        Self { banks, members }
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn members(&self) -> &[BankMember] {
        &self.members
    }

    pub fn get(&self, id: &str) -> Option<&Bank> {
        self.banks.iter().find(|b| b.id == id)
    }

    /// Members assigned to a bank, in member-list order
    pub fn members_of(&self, bank: &Bank) -> Vec<&BankMember> {
        self.members
            .iter()
            .filter(|m| bank.user_ids.contains(&m.id))
            .collect()
    }

    fn require_name(name: &str) -> CoreResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError {
                message: "Please enter a bank name.".to_string(),
            });
        }
        Ok(name.to_string())
    }

    pub fn add(&mut self, name: &str, today: NaiveDate) -> CoreResult<Notice> {
        let name = Self::require_name(name)?;
        let id = next_id(self.banks.iter().map(|b| b.id.as_str()));
        log::info!("Bank {} added: {}", id, name);
        let notice = Notice::new("Bank Added", format!("{} has been added successfully.", name));
        self.banks.push(Bank {
            id,
            name,
            user_ids: Vec::new(),
            date_added: today,
        });
        Ok(notice)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> CoreResult<Notice> {
        let name = Self::require_name(name)?;
        if let Some(bank) = self.banks.iter_mut().find(|b| b.id == id) {
            log::info!("Bank {} renamed from {} to {}", id, bank.name, name);
            bank.name = name;
        }
        Ok(Notice::new("Bank Updated", "Bank name has been updated successfully."))
    }

    pub fn delete(&mut self, id: &str) -> Notice {
        self.banks.retain(|b| b.id != id);
        Notice::destructive("Bank Deleted", "The bank has been deleted successfully.")
    }

    /// Replace the bank's member list
    ///
    /// Ids that are not in the member list are dropped.
    pub fn assign(&mut self, id: &str, assignment: Assignment) -> Notice {
        let user_ids: Vec<String> = match assignment {
            Assignment::All => self.members.iter().map(|m| m.id.clone()).collect(),
            Assignment::Only(ids) => ids
                .into_iter()
                .filter(|id| self.members.iter().any(|m| &m.id == id))
                .collect(),
        };

        match self.banks.iter_mut().find(|b| b.id == id) {
            Some(bank) => {
                log::info!("Bank {} assigned to {} users", id, user_ids.len());
                bank.user_ids = user_ids;
                Notice::new(
                    "Users Assigned",
                    format!("Users have been assigned to {} successfully.", bank.name),
                )
            }
            None => Notice::new("Users Assigned", "Users have been assigned successfully."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{project, ViewQuery};
    use rust_decimal::dec;

    fn user(id: &str, first: &str, last: &str, status: Status) -> User {
        User {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            username: format!("{}{}", first, last).to_lowercase(),
            email: format!("{}@example.com", first.to_lowercase()),
            date_of_birth: None,
            place_of_birth: String::new(),
            residence: String::new(),
            nationality: String::new(),
            id_card: String::new(),
            role: Default::default(),
            status,
            balance: dec!(0),
            withdrawal_limit: Limits::default(),
            sending_limit: Limits::default(),
            fee_type: FeeType::Percentage,
            fee_amount: dec!(0),
        }
    }

    fn directory() -> UserDirectory {
        UserDirectory::new(vec![
            user("1", "John", "Doe", Status::Completed),
            user("2", "Jane", "Smith", Status::Pending),
        ])
    }

    fn draft(first: &str, last: &str, email: &str) -> UserDraft {
        UserDraft {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("john@example.com"));
        assert!(!looks_like_email("john@example"));
        assert!(!looks_like_email("john example.com"));
        assert!(!looks_like_email(""));
    }

    #[test]
    fn test_add_user_pending_with_zero_balance() {
        let mut dir = directory();
        let notice = dir.add(draft("Alice", "Johnson", "alice@example.com")).unwrap();
        let added = dir.get("3").unwrap();
        assert_eq!(added.status, Status::Pending);
        assert_eq!(added.balance, Decimal::ZERO);
        assert_eq!(notice.description, "Alice Johnson has been added successfully.");
    }

    #[test]
    fn test_add_requires_names_and_email() {
        let mut dir = directory();
        let err = dir.add(draft("", "Johnson", "")).unwrap_err();
        match err {
            CoreError::ValidationError { message } => {
                assert_eq!(message, "First name, Email required.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(dir.add(draft("Alice", "Johnson", "not-an-email")).is_err());
        assert_eq!(dir.users().len(), 2);
    }

    #[test]
    fn test_taken_email_refused() {
        let mut dir = directory();
        let err = dir.add(draft("Johnny", "Doe", " JOHN@example.com")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEntry { ref entry } if entry == "JOHN@example.com"));
        assert_eq!(err.title(), "Already Exists");
        assert_eq!(dir.users().len(), 2);

        assert!(dir.update("2", draft("Jane", "Smith", "john@example.com")).is_err());
        assert_eq!(dir.get("2").unwrap().email, "jane@example.com");
        assert!(dir.update("1", draft("John", "Doe", "john@example.com")).is_ok());
    }

    #[test]
    fn test_sign_up_is_pending_plain_user() {
        let mut dir = directory();
        let mut request = draft("Alice", "Johnson", "alice@example.com");
        request.role = Role::Admin;
        let notice = dir.sign_up(request).unwrap();
        assert_eq!(notice.title, "Account Created");
        let added = dir.get("3").unwrap();
        assert_eq!(added.role, Role::User);
        assert_eq!(added.status, Status::Pending);

        assert!(dir.sign_up(draft("Al", "J", "alice@example.com")).is_err());
        assert_eq!(dir.users().len(), 3);
    }

    #[test]
    fn test_ids_do_not_collide_after_delete() {
        let mut dir = directory();
        dir.delete("1");
        dir.add(draft("Alice", "Johnson", "alice@example.com")).unwrap();
        let ids: Vec<&str> = dir.users().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_update_keeps_status_and_balance() {
        let mut dir = directory();
        let mut change = draft("Johnny", "Doe", "johnny@example.com");
        change.fee_type = Some(FeeType::Fixed);
        change.fee_amount = Some(dec!(5));
        dir.update("1", change).unwrap();
        let john = dir.get("1").unwrap();
        assert_eq!(john.first_name, "Johnny");
        assert_eq!(john.status, Status::Completed);
        assert_eq!(john.fee_type, FeeType::Fixed);
    }

    #[test]
    fn test_user_review() {
        let mut dir = directory();
        assert_eq!(dir.pending_count(), 1);
        assert!(dir.reject("2", "").is_err());
        assert_eq!(dir.get("2").unwrap().status, Status::Pending);
        let notice = dir.reject("2", "ID card unreadable").unwrap();
        assert_eq!(notice.title, "User Rejected");
        assert_eq!(dir.get("2").unwrap().status, Status::Rejected);
        dir.approve("2");
        assert_eq!(dir.get("2").unwrap().status, Status::Completed);
    }

    #[test]
    fn test_status_filter_over_users() {
        let dir = directory();
        let query = ViewQuery::<User>::default().with_filter(UserFilter::parse(Some("approved")));
        let rows = project(dir.users(), &query);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "1");
        let all = project(dir.users(), &ViewQuery::default().with_filter(UserFilter::parse(Some("all"))));
        assert_eq!(all.len(), 2);
    }

    fn banks() -> BankDirectory {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        BankDirectory::new(
            vec![Bank {
                id: "1".to_string(),
                name: "Commercial Bank Of Ethiopia".to_string(),
                user_ids: vec!["1".to_string()],
                date_added: date,
            }],
            vec![
                BankMember { id: "1".to_string(), name: "John Doe".to_string(), email: "john@example.com".to_string() },
                BankMember { id: "2".to_string(), name: "Jane Smith".to_string(), email: "jane@example.com".to_string() },
            ],
        )
    }

    #[test]
    fn test_bank_add_and_rename() {
        let mut dir = banks();
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(dir.add("   ", today).is_err());
        dir.add("Awash Bank", today).unwrap();
        assert_eq!(dir.get("2").unwrap().date_added, today);
        assert!(dir.rename("2", "").is_err());
        dir.rename("2", "Awash International Bank").unwrap();
        assert_eq!(dir.get("2").unwrap().name, "Awash International Bank");
    }

    #[test]
    fn test_bank_delete_is_destructive_notice() {
        let mut dir = banks();
        let notice = dir.delete("1");
        assert!(notice.is_destructive());
        assert!(dir.banks().is_empty());
    }

    #[test]
    fn test_bank_assignment() {
        let mut dir = banks();
        dir.assign("1", Assignment::All);
        assert_eq!(dir.get("1").unwrap().user_ids, vec!["1", "2"]);

        let notice = dir.assign("1", Assignment::Only(vec!["2".to_string(), "99".to_string()]));
        assert_eq!(dir.get("1").unwrap().user_ids, vec!["2"]);
        assert!(notice.description.contains("Commercial Bank Of Ethiopia"));

        let bank = dir.get("1").unwrap().clone();
        let names: Vec<&str> = dir.members_of(&bank).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Jane Smith"]);
    }
}
