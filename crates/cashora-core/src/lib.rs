//! Record stores, list view-model and review workflow
//!
//! Everything here is in memory. A [`Workspace`] holds one independently
//! seeded list per screen; reviewing a request on one screen never touches
//! the list another screen shows.

pub mod chat;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod models;
pub mod notice;
pub mod outbox;
pub mod profile;
pub mod review;
pub mod seed;
pub mod session;
pub mod settings;
pub mod types;
pub mod view;
pub mod wallet;

use cashora_config::WalletConfig;

pub use chat::{CannedResponder, ChatMessage, ChatScheduler, Responder, Sender};
pub use dashboard::{AdminOverview, Overview, UserOverview};
pub use directory::{Assignment, BankDirectory, BankMember, UserDirectory, UserField, UserFilter};
pub use error::{CoreError, CoreResult, ErrorSeverity};
pub use models::{AssignedBank, Bank, BankDetails, Limits, Transaction, User, UserDraft};
pub use notice::{Notice, NoticeVariant};
pub use outbox::{Outbox, SentEmail};
pub use profile::{AdminProfile, AdminProfileDraft, UserProfile};
pub use review::{ReviewLabels, ReviewQueue, Reviewable};
pub use session::{Session, SessionStore};
pub use settings::{PlatformSettings, SettingsDraft};
pub use types::{FeeType, Role, Status, TransactionKind};
pub use view::{project, toggle_sort, Record, SortDirection, SortKey, SortSpec, TransactionField, TransactionFilter, ViewQuery};
pub use wallet::{Quote, Wallet};

/// All screen state of one running server
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Admin transaction history
    pub transactions: Vec<Transaction>,
    pub deposit_requests: ReviewQueue<Transaction>,
    pub withdrawal_requests: ReviewQueue<Transaction>,
    pub send_requests: ReviewQueue<Transaction>,
    pub users: UserDirectory,
    pub banks: BankDirectory,
    /// The signed-in user's forms and histories
    pub wallet: Wallet,
    /// The user's recent activity panel
    pub activity: Vec<Transaction>,
    pub user_profile: UserProfile,
    pub admin_profile: AdminProfile,
    pub settings: PlatformSettings,
    /// Emails sent from the admin composer
    pub outbox: Outbox,
}

impl Workspace {
    /// Workspace with the sample records on every screen
    pub fn seeded(wallet: &WalletConfig) -> Self {
        Self {
            transactions: seed::admin_transactions(),
            deposit_requests: ReviewQueue::new(
                ReviewLabels::new("Deposit", "Deposit request"),
                seed::deposit_requests(),
            ),
            withdrawal_requests: ReviewQueue::new(
                ReviewLabels::new("Withdrawal", "Withdrawal request"),
                seed::withdrawal_requests(),
            ),
            send_requests: ReviewQueue::new(
                ReviewLabels::new("Send Request", "Send request"),
                seed::send_requests(),
            ),
            users: UserDirectory::new(seed::users()),
            banks: BankDirectory::new(seed::banks(), seed::bank_members()),
            wallet: Wallet::new(wallet, seed::assigned_banks()).with_history(
                seed::user_deposits(),
                seed::user_withdrawals(),
                seed::user_sends(),
            ),
            activity: seed::user_transactions(),
            user_profile: seed::user_profile(),
            admin_profile: seed::admin_profile(),
            settings: seed::platform_settings(),
            outbox: Outbox::default(),
        }
    }

    /// Request queue of one kind
    pub fn queue(&self, kind: TransactionKind) -> &ReviewQueue<Transaction> {
        match kind {
            TransactionKind::Deposit => &self.deposit_requests,
            TransactionKind::Withdrawal => &self.withdrawal_requests,
            TransactionKind::Send => &self.send_requests,
        }
    }

    pub fn queue_mut(&mut self, kind: TransactionKind) -> &mut ReviewQueue<Transaction> {
        match kind {
            TransactionKind::Deposit => &mut self.deposit_requests,
            TransactionKind::Withdrawal => &mut self.withdrawal_requests,
            TransactionKind::Send => &mut self.send_requests,
        }
    }

    /// Look up a record of the admin history
    pub fn transaction(&self, id: &str) -> CoreResult<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::RecordNotFound { id: id.to_string() })
    }

    /// Project the admin history
    pub fn admin_view(&self, query: &ViewQuery<Transaction>) -> Vec<Transaction> {
        project(&self.transactions, query)
    }

    /// Project the user's activity panel
    pub fn activity_view(&self, query: &ViewQuery<Transaction>) -> Vec<Transaction> {
        project(&self.activity, query)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        Workspace::seeded(&WalletConfig::default())
    }

    #[test]
    fn test_example_scenario() {
        let ws = workspace();
        let ids = |rows: Vec<Transaction>| rows.into_iter().map(|t| t.id).collect::<Vec<_>>();

        let query = ViewQuery::default().with_search("500");
        assert_eq!(ids(ws.admin_view(&query)), vec!["2"]);

        let query = ViewQuery::default().with_filter(TransactionFilter::parse(Some("send"), None));
        assert_eq!(ids(ws.admin_view(&query)), vec!["3"]);

        let query = ViewQuery::default().click(TransactionField::Amount);
        assert_eq!(ids(ws.admin_view(&query)), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_screens_are_independent() {
        let mut ws = workspace();
        ws.withdrawal_requests.approve("2");
        // the admin history has its own record "2"
        assert_eq!(ws.transactions[1].status, Status::Pending);
        assert_eq!(ws.activity[1].status, Status::Pending);
    }

    #[test]
    fn test_queue_by_kind() {
        let mut ws = workspace();
        assert_eq!(ws.queue(TransactionKind::Send).labels().title, "Send Request");
        let notice = ws.queue_mut(TransactionKind::Send).approve("1");
        assert_eq!(notice.title, "Send Request Approved");
        assert_eq!(ws.send_requests.get("1").map(|r| r.status), Some(Status::Completed));
    }

    #[test]
    fn test_transaction_lookup() {
        let ws = workspace();
        assert_eq!(ws.transaction("3").unwrap().kind, TransactionKind::Send);
        assert!(matches!(ws.transaction("9"), Err(CoreError::RecordNotFound { .. })));
    }

    #[test]
    fn test_activity_view_searches_recipient() {
        let ws = workspace();
        let rows = ws.activity_view(&ViewQuery::default().with_search("john@"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "3");
    }
}
