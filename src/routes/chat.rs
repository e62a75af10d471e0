use axum::{
    Json, Router,
    extract::{
        Path, Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use serde::Deserialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    chat::ChatEvent,
    dto::chat::{ConversationList, MessageList, OpenConversationRequest, SendMessageRequest},
    error::AppResult,
    middleware::auth::{AuthUser, decode_token},
    models::{ChatMessage, Conversation},
    response::ApiResponse,
    routes::params::Pagination,
    services::chat_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(list_conversations).post(open_conversation))
        .route(
            "/conversations/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/ws", get(ws_handler))
}

#[utoipa::path(
    get,
    path = "/api/chat/conversations",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Conversations the user takes part in", body = ApiResponse<ConversationList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ConversationList>>> {
    let resp = chat_service::list_conversations(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/chat/conversations",
    request_body = OpenConversationRequest,
    responses(
        (status = 200, description = "Open or return the existing conversation", body = ApiResponse<Conversation>),
        (status = 400, description = "Unknown seller or pet"),
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn open_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<OpenConversationRequest>,
) -> AppResult<Json<ApiResponse<Conversation>>> {
    let resp = chat_service::open_conversation(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/chat/conversations/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Conversation ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Message history, oldest first", body = ApiResponse<MessageList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn list_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<MessageList>>> {
    let resp = chat_service::list_messages(&state, &user, id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/chat/conversations/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Conversation ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message persisted and relayed", body = ApiResponse<ChatMessage>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<ChatMessage>>> {
    let resp = chat_service::send_message(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// Events a connected client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientEvent {
    Join { conversation_id: Uuid },
    Message { conversation_id: Uuid, body: String },
}

// Browsers cannot set headers on a websocket upgrade, so the bearer token
// rides a query parameter here instead of the Authorization header.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let user = decode_token(&query.token)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(state, user, socket)))
}

async fn handle_socket(state: AppState, user: AuthUser, mut socket: WebSocket) {
    let mut rx: Option<broadcast::Receiver<ChatEvent>> = None;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(message)) = incoming else { break };
                let Message::Text(text) = message else { continue };

                match serde_json::from_str::<ClientEvent>(text.as_str()) {
                    Ok(ClientEvent::Join { conversation_id }) => {
                        match chat_service::is_member(&state, &user, conversation_id).await {
                            Ok(true) => {
                                rx = Some(state.chat.subscribe(conversation_id).await);
                                if send_event(&mut socket, &ChatEvent::Joined { conversation_id })
                                    .await
                                    .is_err()
                                {
                                    break;
                                }
                            }
                            Ok(false) => {
                                let event = ChatEvent::Error {
                                    message: "Not a member of this conversation".into(),
                                };
                                if send_event(&mut socket, &event).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "chat join failed");
                                break;
                            }
                        }
                    }
                    Ok(ClientEvent::Message { conversation_id, body }) => {
                        let payload = SendMessageRequest { body };
                        if let Err(err) =
                            chat_service::send_message(&state, &user, conversation_id, payload).await
                        {
                            let event = ChatEvent::Error {
                                message: err.to_string(),
                            };
                            if send_event(&mut socket, &event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(_) => {
                        let event = ChatEvent::Error {
                            message: "Malformed event".into(),
                        };
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                }
            }
            event = next_event(&mut rx) => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &ChatEvent) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "chat event serialization failed");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await
}

/// The next broadcast event, pending forever while no conversation is joined.
/// Lagged receivers skip ahead; a closed channel parks until the next join.
async fn next_event(rx: &mut Option<broadcast::Receiver<ChatEvent>>) -> ChatEvent {
    loop {
        match rx {
            Some(receiver) => match receiver.recv().await {
                Ok(event) => return event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    *rx = None;
                }
            },
            None => std::future::pending::<()>().await,
        }
    }
}
