//! Email composer of the admin console
//!
//! Nothing leaves the process: a sent email is logged and kept in the
//! outbox so the page can list it.

use chrono::NaiveDate;
use serde::Serialize;

use crate::directory::{Assignment, UserDirectory};
use crate::error::{CoreError, CoreResult};
use crate::notice::Notice;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentEmail {
    pub id: String,
    /// Recipient addresses
    pub recipients: Vec<String>,
    pub subject: String,
    pub message: String,
    pub sent_on: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct Outbox {
    sent: Vec<SentEmail>,
}

impl Outbox {
    /// Sent emails, newest first
    pub fn sent(&self) -> &[SentEmail] {
        &self.sent
    }

    /// Addresses an email goes to; picking nobody means every user
    pub fn recipients(users: &UserDirectory, to: &Assignment) -> Vec<String> {
        let everyone = || -> Vec<String> { users.users().iter().map(|u| u.email.clone()).collect() };
        match to {
            Assignment::All => everyone(),
            Assignment::Only(ids) if ids.is_empty() => everyone(),
            Assignment::Only(ids) => users
                .users()
                .iter()
                .filter(|u| ids.contains(&u.id))
                .map(|u| u.email.clone())
                .collect(),
        }
    }

    pub fn send(
        &mut self,
        users: &UserDirectory,
        to: &Assignment,
        subject: &str,
        message: &str,
        today: NaiveDate,
    ) -> CoreResult<Notice> {
        let (subject, message) = (subject.trim(), message.trim());
        if subject.is_empty() || message.is_empty() {
            return Err(CoreError::ValidationError {
                message: "Please enter a subject and a message.".to_string(),
            });
        }
        let recipients = Self::recipients(users, to);
        if recipients.is_empty() {
            return Err(CoreError::ValidationError {
                message: "There is nobody to send this email to.".to_string(),
            });
        }

        log::info!("Email '{}' sent to {} recipients", subject, recipients.len());
        self.sent.insert(
            0,
            SentEmail {
                id: (self.sent.len() + 1).to_string(),
                recipients,
                subject: subject.to_string(),
                message: message.to_string(),
                sent_on: today,
            },
        );

        Ok(Notice::new("Email Sent", "Your email has been sent successfully."))
    }
}
