//! Support chat with delayed canned replies
//!
//! A reply is a tokio task that sleeps for the configured delay, asks the
//! [`Responder`] for text and appends it to the conversation. Each
//! conversation has at most one pending reply: a new message aborts the
//! previous task before scheduling its own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use cashora_config::ChatConfig;
use cashora_utils::generate_id;

use crate::error::{CoreError, CoreResult};

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(text: &str, sender: Sender) -> Self {
        Self {
            id: generate_id(),
            text: text.to_string(),
            sender,
            sent_at: Utc::now(),
        }
    }
}

/// Source of bot replies
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, message: &str) -> String;
}

/// Keyword-matched answers about the dashboard pages
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedResponder;

impl CannedResponder {
    pub fn reply_for(message: &str) -> &'static str {
        let lower = message.to_lowercase();
        if lower.contains("deposit") {
            "To make a deposit, go to the Deposit page in your dashboard and follow the instructions. You'll need to enter the amount and upload a receipt."
        } else if lower.contains("withdraw") {
            "For withdrawals, visit the Withdraw page. Enter the amount, your bank details, and submit the request. Please note that withdrawals are subject to approval."
        } else if lower.contains("send money") {
            "To send money, use the Send Money page. Enter the recipient's email or username and the amount you want to send. The transaction will be processed after approval."
        } else if lower.contains("balance") {
            "Your current balance is displayed on your dashboard and profile page. If you have any discrepancies, please contact our support team."
        } else {
            "I'm sorry, I couldn't understand your query. Could you please rephrase or ask about deposits, withdrawals, sending money, or checking your balance?"
        }
    }
}

#[async_trait]
impl Responder for CannedResponder {
    async fn respond(&self, message: &str) -> String {
        Self::reply_for(message).to_string()
    }
}

type Conversations = Arc<RwLock<HashMap<String, Vec<ChatMessage>>>>;
type PendingReplies = Arc<Mutex<HashMap<String, (u64, JoinHandle<()>)>>>;

/// Conversation logs plus the pending reply of each conversation
pub struct ChatScheduler {
    responder: Arc<dyn Responder>,
    delay: Duration,
    greeting: String,
    conversations: Conversations,
    pending: PendingReplies,
    generation: AtomicU64,
}

impl ChatScheduler {
    pub fn new(config: &ChatConfig, responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            delay: Duration::from_millis(config.reply_delay_ms),
            greeting: config.greeting.clone(),
            conversations: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Scheduler answering with [`CannedResponder`]
    pub fn canned(config: &ChatConfig) -> Self {
        Self::new(config, Arc::new(CannedResponder))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Messages of a conversation, starting with the greeting
    pub fn messages(&self, conversation: &str) -> Vec<ChatMessage> {
        let mut logs = self.conversations.write().unwrap_or_else(|e| e.into_inner());
        logs.entry(conversation.to_string())
            .or_insert_with(|| vec![ChatMessage::new(&self.greeting, Sender::Bot)])
            .clone()
    }

    /// Record the user's message and schedule the bot's reply
    ///
    /// Must be called from within a tokio runtime.
    pub fn send(&self, conversation: &str, text: &str) -> CoreResult<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::ValidationError {
                message: "Please type a message.".to_string(),
            });
        }

        let message = ChatMessage::new(text, Sender::User);
        {
            let mut logs = self.conversations.write().unwrap_or_else(|e| e.into_inner());
            logs.entry(conversation.to_string())
                .or_insert_with(|| vec![ChatMessage::new(&self.greeting, Sender::Bot)])
                .push(message.clone());
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());

        let handle = {
            let responder = Arc::clone(&self.responder);
            let conversations = Arc::clone(&self.conversations);
            let pending = Arc::clone(&self.pending);
            let delay = self.delay;
            let key = conversation.to_string();
            let text = text.to_string();

            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let reply = responder.respond(&text).await;

                // an ended conversation stays gone
                if let Some(log) = conversations
                    .write()
                    .unwrap_or_else(|e| e.into_inner())
                    .get_mut(&key)
                {
                    log.push(ChatMessage::new(&reply, Sender::Bot));
                }

                let mut pending = pending.lock().unwrap_or_else(|e| e.into_inner());
                if matches!(pending.get(&key), Some((g, _)) if *g == generation) {
                    pending.remove(&key);
                }
                log::debug!("Chat reply delivered to conversation {}", key);
            })
        };

        if let Some((_, previous)) = pending.insert(conversation.to_string(), (generation, handle)) {
            previous.abort();
            log::debug!("Superseded pending chat reply in conversation {}", conversation);
        }
        log::debug!(
            "Chat reply scheduled for conversation {} in {:?}",
            conversation,
            self.delay
        );

        Ok(message)
    }

    /// Check if a reply is still waiting to be delivered
    pub fn has_pending(&self, conversation: &str) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(conversation)
            .map_or(false, |(_, handle)| !handle.is_finished())
    }

    /// Abort the pending reply of a conversation, if any
    pub fn cancel(&self, conversation: &str) -> bool {
        let removed = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(conversation);
        match removed {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Close a conversation: abort its pending reply and drop its log
    pub fn end(&self, conversation: &str) -> bool {
        let cancelled = self.cancel(conversation);
        let removed = self
            .conversations
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(conversation)
            .is_some();
        if removed || cancelled {
            log::debug!("Chat conversation {} ended", conversation);
        }
        removed || cancelled
    }

    /// Conversations with a log in memory
    pub fn conversation_count(&self) -> usize {
        self.conversations.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for ChatScheduler {
    fn drop(&mut self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        for (_, (_, handle)) in pending.drain() {
            handle.abort();
        }
    }
}
