//! Chat Routes
//!
//! Reconciled conversation views, message sends, inboxes, and the sync
//! status/backup controls.
//!
//! - GET  /api/v1/chat/:a/:b - merged conversation
//! - POST /api/v1/chat - send a message
//! - POST /api/v1/chat/:a/:b/read - mark read
//! - GET  /api/v1/inbox/:address
//! - GET  /api/v1/chat/status
//! - POST /api/v1/chat/backup - trigger a cloud backup cycle

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ConversationResponse, MarkReadRequest, SendMessageRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::chat::{conversation_id, BackupStatus, ChatSyncState, InboxEntry};
use crate::websocket::WsEvent;

use super::parse_addr;

/// Message content cap; chat is for coordination, not documents
const MAX_CONTENT_LEN: usize = 4096;

/// GET /api/v1/chat/:a/:b
///
/// The reconciled view across local cache and cloud snapshot. A failing
/// source degrades the status flag instead of this response.
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path((a, b)): Path<(String, String)>,
) -> ApiResult<Json<ConversationResponse>> {
    parse_addr(&a)?;
    parse_addr(&b)?;

    let messages = state.chat.conversation(&a, &b).await;

    Ok(Json(ConversationResponse {
        conversation: conversation_id(&a, &b),
        messages,
    }))
}

/// POST /api/v1/chat
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<ConversationResponse>)> {
    let from = parse_addr(&req.from)?;
    let to = parse_addr(&req.to)?;
    if from == to {
        return Err(ApiError::Validation("Cannot message yourself".to_string()));
    }
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("Message content must not be empty".to_string()));
    }
    if req.content.len() > MAX_CONTENT_LEN {
        return Err(ApiError::Validation(format!(
            "Message content exceeds {MAX_CONTENT_LEN} bytes"
        )));
    }

    let envelope = state.chat.send(&req.from, &req.to, req.content.trim()).await?;

    // Live delivery to subscribed dashboards
    state.ws_hub.publish(WsEvent::chat(
        &envelope.conversation,
        envelope.message.clone(),
    ));

    Ok((
        StatusCode::CREATED,
        Json(ConversationResponse {
            conversation: envelope.conversation,
            messages: vec![envelope.message],
        }),
    ))
}

/// POST /api/v1/chat/:a/:b/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path((a, b)): Path<(String, String)>,
    Json(req): Json<MarkReadRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    parse_addr(&a)?;
    parse_addr(&b)?;
    parse_addr(&req.owner)?;

    let marked = state.chat.mark_read(&a, &b, &req.owner)?;
    Ok(Json(serde_json::json!({ "marked": marked })))
}

/// GET /api/v1/inbox/:address
pub async fn get_inbox(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<Vec<InboxEntry>>> {
    parse_addr(&address)?;
    Ok(Json(state.chat.inbox(&address)?))
}

/// GET /api/v1/chat/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ChatSyncState> {
    Json(state.chat.state().await)
}

/// POST /api/v1/chat/backup
pub async fn trigger_backup(State(state): State<Arc<AppState>>) -> ApiResult<Json<BackupStatus>> {
    if !state.chat.has_cloud() {
        return Err(ApiError::ServiceUnavailable(
            "No pinning service configured for chat backup".to_string(),
        ));
    }

    let status = state.chat.backup().await;
    tracing::info!(
        conversations = status.conversations_pinned,
        inboxes = status.inboxes_pinned,
        failures = status.failures,
        "Manual chat backup completed"
    );

    Ok(Json(status))
}
