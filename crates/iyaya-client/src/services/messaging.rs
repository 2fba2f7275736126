//! Messaging façade: conversations, messages, and polling subscriptions.
//!
//! The backend offers no push transport to this layer, so "real time" is a
//! polling loop. [`MessagingService::subscribe`] returns an explicit
//! [`Subscription`] handle; dropping it (or calling
//! [`Subscription::unsubscribe`]) stops the loop. Ordering across calls is
//! the caller's job — send-then-mark-read is caller-sequenced.

use std::time::Duration;

use iyaya_core::{Conversation, Message, Result};
use serde_json::json;
use tokio::sync::mpsc;

use crate::http::{RequestOptions, SharedClient};
use crate::normalize;
use crate::retry::RetryPolicy;
use crate::services::read_policy;

/// Handle for an active message-polling subscription.
///
/// The poll task stops when this handle is dropped or unsubscribed.
pub struct Subscription {
    handle: tokio::task::JoinHandle<()>,
}

impl Subscription {
    /// Stops the polling task.
    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Clone)]
pub struct MessagingService {
    client: SharedClient,
}

impl MessagingService {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Lists the user's conversations.
    ///
    /// Non-critical read: the inbox screen prefers an empty list over an
    /// error, so failures resolve to `[]`.
    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        let ttl = self.client.config().cache.messages_ttl;
        let outcome = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    "messages/conversations",
                    RequestOptions::get().cached("messages/conversations", ttl),
                )
            })
            .await;
        match outcome {
            Ok(value) => normalize::conversations(&value),
            Err(err) => {
                tracing::warn!(error = %err, "conversation list failed, serving empty list");
                Ok(Vec::new())
            }
        }
    }

    /// Fetches the messages of one conversation, newest last.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let ttl = self.client.config().cache.messages_ttl;
        let key = format!("messages/{conversation_id}");
        let path = format!("messages/conversation/{conversation_id}");
        let value = read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::get().cached(key.clone(), ttl),
                )
            })
            .await?;
        normalize::messages(&value)
    }

    /// Sends a message. Zero retries: a retried send would duplicate the
    /// message in the thread.
    ///
    /// # Errors
    ///
    /// Surfaces the first failure directly.
    pub async fn send(&self, conversation_id: &str, text: &str) -> Result<Message> {
        let body = json!({ "conversationId": conversation_id, "text": text });
        let value = RetryPolicy::none()
            .run(|| {
                self.client.request(
                    "messages",
                    RequestOptions::post(body.clone())
                        .with_idempotency_key(uuid::Uuid::new_v4().to_string())
                        .invalidating("messages"),
                )
            })
            .await?;
        normalize::entity(&value)
    }

    /// Marks a conversation read. Callers sequence this after `send` when
    /// they need that ordering.
    ///
    /// # Errors
    ///
    /// Propagates the classified error.
    pub async fn mark_read(&self, conversation_id: &str) -> Result<()> {
        let path = format!("messages/conversation/{conversation_id}/read");
        read_policy(&self.client)
            .run(|| {
                self.client.request(
                    &path,
                    RequestOptions::patch(json!({})).invalidating("messages"),
                )
            })
            .await?;
        Ok(())
    }

    /// Polls a conversation and emits the full message list whenever the
    /// newest message changes. Poll failures are logged and the loop keeps
    /// going; the channel closes only when the subscription ends.
    pub fn subscribe(
        &self,
        conversation_id: &str,
        interval: Duration,
    ) -> (mpsc::Receiver<Vec<Message>>, Subscription) {
        let (tx, rx) = mpsc::channel(8);
        let service = self.clone();
        let conversation_id = conversation_id.to_string();

        let handle = tokio::spawn(async move {
            let mut last_seen: Option<String> = None;
            loop {
                match service.messages(&conversation_id).await {
                    Ok(messages) => {
                        let newest = messages.last().map(|m| m.id.clone());
                        if newest != last_seen {
                            last_seen = newest;
                            if tx.send(messages).await.is_err() {
                                // Receiver gone; nothing left to notify.
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            conversation = %conversation_id,
                            error = %err,
                            "message poll failed"
                        );
                    }
                }
                tokio::time::sleep(interval).await;
            }
        });

        (rx, Subscription { handle })
    }
}
