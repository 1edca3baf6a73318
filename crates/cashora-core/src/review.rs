//! Approve/reject workflow shared by the request queues and the user list

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::{Transaction, User};
use crate::notice::Notice;
use crate::types::Status;

/// A record an admin can approve or reject
pub trait Reviewable {
    fn id(&self) -> &str;
    fn status(&self) -> Status;
    fn set_status(&mut self, status: Status);
}

impl Reviewable for Transaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

impl Reviewable for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

/// Overwrite the status of every record with this id
///
/// The current status is not checked: a rejected record can be approved
/// and vice versa. Returns how many records changed.
pub fn set_status<R: Reviewable>(records: &mut [R], id: &str, status: Status) -> usize {
    let mut changed = 0;
    for record in records.iter_mut().filter(|r| r.id() == id) {
        record.set_status(status);
        changed += 1;
    }
    changed
}

/// Wording used in a queue's notices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLabels {
    /// Toast title prefix: "Deposit" gives "Deposit Approved"
    pub title: String,
    /// Sentence subject: "Deposit request" gives "Deposit request has been approved."
    pub subject: String,
}

impl ReviewLabels {
    pub fn new(title: &str, subject: &str) -> Self {
        Self {
            title: title.to_string(),
            subject: subject.to_string(),
        }
    }
}

/// A reviewable list plus the rejection reason being typed for it
#[derive(Debug, Clone)]
pub struct ReviewQueue<R> {
    labels: ReviewLabels,
    records: Vec<R>,
    reason: String,
}

impl<R: Reviewable> ReviewQueue<R> {
    pub fn new(labels: ReviewLabels, records: Vec<R>) -> Self {
        Self {
            labels,
            records,
            reason: String::new(),
        }
    }

    pub fn labels(&self) -> &ReviewLabels {
        &self.labels
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<R> {
        &mut self.records
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Number of records still waiting for a decision
    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|r| r.status() == Status::Pending).count()
    }

    /// Rejection reason draft
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_reason(&mut self, reason: &str) {
        self.reason = reason.to_string();
    }

    /// Mark the record completed
    ///
    /// An unknown id changes nothing; the confirmation is produced anyway.
    pub fn approve(&mut self, id: &str) -> Notice {
        let changed = set_status(&mut self.records, id, Status::Completed);
        self.log_transition(id, Status::Completed, changed);
        Notice::new(
            &format!("{} Approved", self.labels.title),
            format!("{} has been approved.", self.labels.subject),
        )
    }

    /// Mark the record rejected, using the current reason draft
    pub fn reject(&mut self, id: &str) -> CoreResult<Notice> {
        let reason = self.reason.trim().to_string();
        if reason.is_empty() {
            let error = CoreError::MissingReason;
            let context = ErrorContext::new(format!("reject {}", self.labels.subject))
                .with_data("id", serde_json::json!(id));
            DefaultErrorLogger.log_refusal(&error, &context);
            return Err(error);
        }

        let changed = set_status(&mut self.records, id, Status::Rejected);
        self.log_transition(id, Status::Rejected, changed);
        self.reason.clear();

        Ok(Notice::destructive(
            &format!("{} Rejected", self.labels.title),
            format!("{} has been rejected. Reason: {}", self.labels.subject, reason),
        ))
    }

    /// Set the reason draft and reject in one step
    pub fn reject_with(&mut self, id: &str, reason: &str) -> CoreResult<Notice> {
        self.set_reason(reason);
        self.reject(id)
    }

    /// Add a record at the top of the list
    pub fn push_front(&mut self, record: R) {
        self.records.insert(0, record);
    }

    fn log_transition(&self, id: &str, status: Status, changed: usize) {
        if changed == 0 {
            log::debug!("{} {}: no record to mark {}", self.labels.subject, id, status);
        } else {
            log::info!("{} {} marked {}", self.labels.subject, id, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionKind;
    use chrono::NaiveDate;
    use rust_decimal::dec;

    fn queue() -> ReviewQueue<Transaction> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        ReviewQueue::new(
            ReviewLabels::new("Deposit", "Deposit request"),
            vec![
                Transaction::new("1", TransactionKind::Deposit, dec!(1000), date),
                Transaction::new("2", TransactionKind::Deposit, dec!(1500), date),
                Transaction::new("3", TransactionKind::Deposit, dec!(200), date),
            ],
        )
    }

    fn statuses(queue: &ReviewQueue<Transaction>) -> Vec<Status> {
        queue.records().iter().map(|r| r.status).collect()
    }

    #[test]
    fn test_approve_changes_only_target() {
        let mut queue = queue();
        let notice = queue.approve("2");
        assert_eq!(statuses(&queue), vec![Status::Pending, Status::Completed, Status::Pending]);
        assert_eq!(notice.title, "Deposit Approved");
        assert_eq!(notice.description, "Deposit request has been approved.");
    }

    #[test]
    fn test_blank_reason_refused_without_change() {
        let mut queue = queue();
        let before = statuses(&queue);
        let err = queue.reject_with("2", "   ").unwrap_err();
        assert!(matches!(err, CoreError::MissingReason));
        assert_eq!(statuses(&queue), before);

        let notice = Notice::from(&err);
        assert!(notice.is_destructive());
        assert_eq!(notice.title, "Rejection Failed");
    }

    #[test]
    fn test_reject_includes_reason_and_clears_draft() {
        let mut queue = queue();
        queue.set_reason("insufficient proof");
        let notice = queue.reject("2").unwrap();
        assert_eq!(queue.get("2").unwrap().status, Status::Rejected);
        assert_eq!(notice.title, "Deposit Rejected");
        assert!(notice.is_destructive());
        assert!(notice.description.ends_with("Reason: insufficient proof"));
        assert_eq!(queue.reason(), "");
    }

    #[test]
    fn test_approve_overwrites_rejection() {
        let mut queue = queue();
        queue.reject_with("2", "insufficient proof").unwrap();
        queue.approve("2");
        assert_eq!(queue.get("2").unwrap().status, Status::Completed);
    }

    #[test]
    fn test_unknown_id_is_silent_noop() {
        let mut queue = queue();
        let before = statuses(&queue);
        let notice = queue.approve("99");
        assert_eq!(statuses(&queue), before);
        assert!(!notice.is_destructive());
        assert!(queue.reject_with("99", "duplicate").is_ok());
        assert_eq!(statuses(&queue), before);
    }

    #[test]
    fn test_pending_count() {
        let mut queue = queue();
        assert_eq!(queue.pending_count(), 3);
        queue.approve("1");
        queue.reject_with("3", "wrong amount").unwrap();
        assert_eq!(queue.pending_count(), 1);
    }

    #[test]
    fn test_set_status_counts_changes() {
        let mut records = queue().records().to_vec();
        assert_eq!(set_status(&mut records, "1", Status::Rejected), 1);
        assert_eq!(set_status(&mut records, "nope", Status::Rejected), 0);
    }
}
