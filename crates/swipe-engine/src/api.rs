//! Remote preference service contract.
//!
//! The engine treats the backend as an opaque request/response API. Any
//! transport can implement [`PreferenceService`].

use crate::error::ServiceError;
use crate::types::{CardId, ProductId, ProductRef, SessionId, SessionType, SwipeDirection, Vec2};
use serde::{Deserialize, Serialize};

/// Parameters for `create_session`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_type: SessionType,
    pub category_focus: Option<String>,
    pub target_recipient: Option<String>,
    #[serde(default)]
    pub context: serde_json::Value,
}

impl SessionRequest {
    #[inline]
    #[must_use]
    pub fn new(session_type: SessionType) -> Self {
        Self {
            session_type,
            category_focus: None,
            target_recipient: None,
            context: serde_json::Value::Null,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category_focus = Some(category.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.target_recipient = Some(recipient.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

impl Default for SessionRequest {
    fn default() -> Self {
        Self::new(SessionType::Discovery)
    }
}

/// Backend acknowledgement of a new session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSession {
    pub id: SessionId,
}

/// Parameters for `get_candidates`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateQuery {
    pub session_id: SessionId,
    pub limit: u32,
    pub exclude_seen: bool,
    pub category: Option<String>,
}

/// Body of `record_decision`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPayload {
    pub product_id: ProductId,
    pub direction: SwipeDirection,
    pub content_type: String,
    pub context: DecisionContext,
}

/// Quality-metric context attached to every recorded decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub card_id: CardId,
    pub queue_position: usize,
    pub swipe_index: u32,
    pub gesture_duration_ms: u64,
    pub velocity: Vec2,
    pub offset: Vec2,
    pub session_elapsed_ms: u64,
}

/// Remote preference/recommendation store
#[async_trait::async_trait]
pub trait PreferenceService: Send + Sync {
    /// Create a session and obtain its server-assigned id
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CreatedSession, ServiceError>;

    /// Fetch up to `query.limit` candidate products
    async fn get_candidates(&self, query: &CandidateQuery) -> Result<Vec<ProductRef>, ServiceError>;

    /// Persist one decision. Must be idempotent per card.
    async fn record_decision(
        &self,
        session_id: &SessionId,
        payload: &DecisionPayload,
    ) -> Result<(), ServiceError>;
}
