use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A like or dislike recorded against a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub content_id: u64,
    pub liked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub content_id: u64,
    pub liked: bool,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl From<NewFeedback> for Feedback {
    fn from(input: NewFeedback) -> Self {
        Feedback {
            id: Uuid::new_v4(),
            content_id: input.content_id,
            liked: input.liked,
            user_id: input.user_id,
            timestamp: Utc::now(),
        }
    }
}
