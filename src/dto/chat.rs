use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ChatMessage, Conversation};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenConversationRequest {
    pub seller_id: Uuid,
    pub pet_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub body: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ConversationList {
    #[schema(value_type = Vec<Conversation>)]
    pub items: Vec<Conversation>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MessageList {
    #[schema(value_type = Vec<ChatMessage>)]
    pub items: Vec<ChatMessage>,
}
