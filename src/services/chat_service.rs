use uuid::Uuid;

use crate::{
    chat::ChatEvent,
    dto::chat::{ConversationList, MessageList, OpenConversationRequest, SendMessageRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ChatMessage, Conversation},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Open a conversation with a seller, optionally pinned to one of their pets.
/// Reopening the same (customer, seller, pet) triple returns the existing
/// conversation instead of creating a duplicate.
pub async fn open_conversation(
    state: &AppState,
    user: &AuthUser,
    payload: OpenConversationRequest,
) -> AppResult<ApiResponse<Conversation>> {
    if payload.seller_id == user.user_id {
        return Err(AppError::BadRequest(
            "Cannot open a conversation with yourself".into(),
        ));
    }

    let seller: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE id = $1 AND role = 'seller'")
            .bind(payload.seller_id)
            .fetch_optional(&state.pool)
            .await?;
    if seller.is_none() {
        return Err(AppError::BadRequest("Seller not found".into()));
    }

    if let Some(pet_id) = payload.pet_id {
        let pet: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM pets WHERE id = $1 AND seller_id = $2")
                .bind(pet_id)
                .bind(payload.seller_id)
                .fetch_optional(&state.pool)
                .await?;
        if pet.is_none() {
            return Err(AppError::BadRequest("Pet not found for this seller".into()));
        }
    }

    let existing: Option<Conversation> = sqlx::query_as(
        r#"
        SELECT * FROM chat_conversations
        WHERE customer_id = $1 AND seller_id = $2 AND pet_id IS NOT DISTINCT FROM $3
        "#,
    )
    .bind(user.user_id)
    .bind(payload.seller_id)
    .bind(payload.pet_id)
    .fetch_optional(&state.pool)
    .await?;

    let conversation = if let Some(conversation) = existing {
        conversation
    } else {
        sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO chat_conversations (id, customer_id, seller_id, pet_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(payload.seller_id)
        .bind(payload.pet_id)
        .fetch_one(&state.pool)
        .await?
    };

    Ok(ApiResponse::success("Conversation", conversation, None))
}

pub async fn list_conversations(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ConversationList>> {
    let (page, limit, offset) = pagination.normalize();
    let items = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT * FROM chat_conversations
        WHERE customer_id = $1 OR seller_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM chat_conversations WHERE customer_id = $1 OR seller_id = $1",
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Conversations",
        ConversationList { items },
        Some(meta),
    ))
}

pub async fn list_messages(
    state: &AppState,
    user: &AuthUser,
    conversation_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<MessageList>> {
    ensure_member(state, user, conversation_id).await?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT * FROM chat_messages
        WHERE conversation_id = $1
        ORDER BY created_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(conversation_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM chat_messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .fetch_one(&state.pool)
            .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Messages",
        MessageList { items },
        Some(meta),
    ))
}

/// Persist a message, then relay it to everyone connected to the
/// conversation's channel.
pub async fn send_message(
    state: &AppState,
    user: &AuthUser,
    conversation_id: Uuid,
    payload: SendMessageRequest,
) -> AppResult<ApiResponse<ChatMessage>> {
    let body = payload.body.trim();
    if body.is_empty() {
        return Err(AppError::BadRequest("Message body is empty".into()));
    }
    ensure_member(state, user, conversation_id).await?;

    let message = sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages (id, conversation_id, sender_id, body)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(conversation_id)
    .bind(user.user_id)
    .bind(body)
    .fetch_one(&state.pool)
    .await?;

    state
        .chat
        .publish(
            conversation_id,
            ChatEvent::Message {
                message: message.clone(),
            },
        )
        .await;

    Ok(ApiResponse::success("Message sent", message, None))
}

pub async fn is_member(
    state: &AppState,
    user: &AuthUser,
    conversation_id: Uuid,
) -> AppResult<bool> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id FROM chat_conversations
        WHERE id = $1 AND (customer_id = $2 OR seller_id = $2)
        "#,
    )
    .bind(conversation_id)
    .bind(user.user_id)
    .fetch_optional(&state.pool)
    .await?;
    Ok(row.is_some())
}

async fn ensure_member(state: &AppState, user: &AuthUser, conversation_id: Uuid) -> AppResult<()> {
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM chat_conversations WHERE id = $1")
            .bind(conversation_id)
            .fetch_optional(&state.pool)
            .await?;
    if exists.is_none() {
        return Err(AppError::NotFound);
    }
    if !is_member(state, user, conversation_id).await? {
        return Err(AppError::Forbidden);
    }
    Ok(())
}
