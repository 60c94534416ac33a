//! Room-scoped translation notifications.

use crate::classifier::{FailureCategory, FailureCode};
use crate::error::PipelineResult;
use async_trait::async_trait;
use parley_queue::MessageId;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Event sent to everyone in a message's room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum TranslationEvent {
    #[serde(rename = "translationCompleted", rename_all = "camelCase")]
    Completed {
        message_id: MessageId,
        translations: BTreeMap<String, String>,
    },
    #[serde(rename = "translationFailed", rename_all = "camelCase")]
    Failed {
        message_id: MessageId,
        failure_category: FailureCategory,
        failure_code: FailureCode,
        safe_message: String,
    },
}

impl TranslationEvent {
    /// Event name on the real-time transport.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "translationCompleted",
            Self::Failed { .. } => "translationFailed",
        }
    }

    pub fn message_id(&self) -> &MessageId {
        match self {
            Self::Completed { message_id, .. } | Self::Failed { message_id, .. } => message_id,
        }
    }

    /// camelCase JSON body of the event.
    pub fn payload(&self) -> Value {
        match self {
            Self::Completed {
                message_id,
                translations,
            } => json!({
                "messageId": message_id,
                "translations": translations,
            }),
            Self::Failed {
                message_id,
                failure_category,
                failure_code,
                safe_message,
            } => json!({
                "messageId": message_id,
                "failureCategory": failure_category,
                "failureCode": failure_code,
                "safeMessage": safe_message,
            }),
        }
    }
}

/// Broadcasts events to the members of a room.
#[async_trait]
pub trait TranslationNotifier: Send + Sync {
    async fn notify_room(&self, room_name: &str, event: &TranslationEvent) -> PipelineResult<()>;
}

/// Answers whether a user belongs to a room.
#[async_trait]
pub trait RoomMembership: Send + Sync {
    async fn is_member(&self, user_id: &str, room_name: &str) -> PipelineResult<bool>;
}
