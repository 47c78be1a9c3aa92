//! Best-effort chat-history recording
//!
//! Persistence failures never affect the foreground result: each append is
//! attempted at most once against the backing store, and on failure the
//! message lands in a local in-memory transcript instead.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::model::ChatMessage;
use crate::stores::{ChatHistoryStore, ChatSession};

/// Records conversation turns, falling back to a local transcript when the
/// history store is absent or failing.
pub struct HistoryRecorder {
    store: Option<Arc<dyn ChatHistoryStore>>,
    session: Option<ChatSession>,
    local: Mutex<Vec<ChatMessage>>,
}

impl HistoryRecorder {
    /// A recorder with no backing store; everything stays local.
    pub fn local_only() -> Self {
        Self {
            store: None,
            session: None,
            local: Mutex::new(Vec::new()),
        }
    }

    /// Open a session against the backing store. If session creation fails
    /// the recorder degrades to local-only.
    pub async fn start(store: Arc<dyn ChatHistoryStore>, user_id: &str) -> Self {
        match store.create_session(user_id).await {
            Ok(session) => Self {
                store: Some(store),
                session: Some(session),
                local: Mutex::new(Vec::new()),
            },
            Err(e) => {
                tracing::warn!(error = %e, "chat history unavailable, falling back to local transcript");
                Self::local_only()
            }
        }
    }

    /// Append one message. At most one store attempt, no retry; failure
    /// degrades to the local transcript.
    pub async fn record(&self, message: &ChatMessage) {
        if let (Some(store), Some(session)) = (&self.store, &self.session) {
            match store.append_message(&session.id, message).await {
                Ok(()) => {
                    if let Err(e) = store.touch(&session.id).await {
                        tracing::warn!(error = %e, "failed to touch chat session");
                    }
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to persist chat message, keeping it locally");
                }
            }
        }
        self.local.lock().await.push(message.clone());
    }

    /// Messages that could not be persisted (or all messages, when running
    /// local-only).
    pub async fn local_transcript(&self) -> Vec<ChatMessage> {
        self.local.lock().await.clone()
    }

    /// Load prior messages from the backing session, if one exists.
    pub async fn load(&self) -> Vec<ChatMessage> {
        if let (Some(store), Some(session)) = (&self.store, &self.session) {
            match store.load_messages(&session.id).await {
                Ok(messages) => return messages,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load chat history");
                }
            }
        }
        self.local_transcript().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::StoreError;
    use async_trait::async_trait;
    use chrono::Utc;

    struct DownHistoryStore;

    #[async_trait]
    impl ChatHistoryStore for DownHistoryStore {
        async fn create_session(&self, _: &str) -> Result<ChatSession, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
        async fn load_messages(&self, _: &str) -> Result<Vec<ChatMessage>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
        async fn append_message(&self, _: &str, _: &ChatMessage) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
        async fn touch(&self, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    struct FlakyHistoryStore;

    #[async_trait]
    impl ChatHistoryStore for FlakyHistoryStore {
        async fn create_session(&self, user_id: &str) -> Result<ChatSession, StoreError> {
            Ok(ChatSession {
                id: "s1".to_string(),
                user_id: user_id.to_string(),
                created_at: Utc::now(),
                last_active: Utc::now(),
            })
        }
        async fn load_messages(&self, _: &str) -> Result<Vec<ChatMessage>, StoreError> {
            Ok(vec![])
        }
        async fn append_message(&self, _: &str, _: &ChatMessage) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("write timeout".to_string()))
        }
        async fn touch(&self, _: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_session_failure_degrades_to_local() {
        let recorder = HistoryRecorder::start(Arc::new(DownHistoryStore), "alice").await;
        recorder.record(&ChatMessage::user("hello")).await;
        assert_eq!(recorder.local_transcript().await.len(), 1);
    }

    #[tokio::test]
    async fn test_append_failure_keeps_message_locally_without_retry() {
        let recorder = HistoryRecorder::start(Arc::new(FlakyHistoryStore), "alice").await;
        recorder.record(&ChatMessage::user("hello")).await;
        recorder.record(&ChatMessage::assistant("hi", vec![])).await;
        assert_eq!(recorder.local_transcript().await.len(), 2);
    }

    #[tokio::test]
    async fn test_local_only_recorder_collects_everything() {
        let recorder = HistoryRecorder::local_only();
        recorder.record(&ChatMessage::user("a")).await;
        assert_eq!(recorder.load().await.len(), 1);
    }
}
