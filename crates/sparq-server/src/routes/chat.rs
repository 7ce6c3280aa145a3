//! Chat endpoint: relays the conversation loop over SSE.

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::post,
    Json, Router,
};
use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use sparq_core::agent::{ConversationOrchestrator, LoopEvent};
use sparq_core::ai::types::ModelMessage;
use sparq_core::tools::CallerId;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::types::{ChatRequest, StreamEvent};
use crate::AppState;

const SSE_CHANNEL_BUFFER: usize = 256;
const MISSING_FIELDS: &str = "Missing required fields: message, athlete_user_id";

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(chat))
}

async fn chat(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let Json(req) = payload?;
    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(MISSING_FIELDS.to_string()))?;

    let caller = user
        .and_then(|u| u.0.caller_id)
        .or_else(|| req.athlete_user_id.and_then(CallerId::new))
        .ok_or_else(|| AppError::BadRequest(MISSING_FIELDS.to_string()))?;

    let provider = state.provider.clone().ok_or_else(|| {
        AppError::Unavailable("No model provider configured; set ANTHROPIC_API_KEY".to_string())
    })?;

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id, caller = %caller, model = provider.model());
    span.in_scope(|| {
        tracing::info!(history = req.history.len(), "Chat request accepted");
    });

    let mut history: Vec<ModelMessage> = req.history.into_iter().map(Into::into).collect();
    history.push(ModelMessage::user_text(message));

    let orchestrator = ConversationOrchestrator::new(
        provider,
        state.tool_registry.clone(),
        (*state.agent_config).clone(),
    );
    let (loop_rx, cancel) = orchestrator.run(history, caller);

    let (sse_tx, sse_rx) = mpsc::channel::<Result<Event, Infallible>>(SSE_CHANNEL_BUFFER);

    tokio::spawn(
        async move {
            // Dropping the guard cancels the loop if the client went away.
            let _cancel = cancel.drop_guard();
            relay(loop_rx, &sse_tx).await;
        }
        .instrument(span),
    );

    let stream = ReceiverStream::new(sse_rx);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Forward orchestrator events until a terminal event or client disconnect.
async fn relay(
    mut loop_rx: mpsc::UnboundedReceiver<LoopEvent>,
    sse_tx: &mpsc::Sender<Result<Event, Infallible>>,
) {
    let start = StreamEvent::Start {
        message: "Agent thinking...".to_string(),
    };
    if !send_event(sse_tx, start).await {
        tracing::info!("Client disconnected before start");
        return;
    }

    loop {
        let event = tokio::select! {
            _ = sse_tx.closed() => {
                tracing::info!("Client disconnected; cancelling conversation");
                return;
            }
            event = loop_rx.recv() => event,
        };
        let Some(event) = event else {
            break;
        };
        let Some(wire) = StreamEvent::from_loop_event(event) else {
            continue;
        };
        let terminal = wire.is_terminal();

        if !send_event(sse_tx, wire).await {
            tracing::info!("Client disconnected; cancelling conversation");
            return;
        }
        if terminal {
            return;
        }
    }

    tracing::warn!("Conversation ended without a terminal event");
}

async fn send_event(sse_tx: &mpsc::Sender<Result<Event, Infallible>>, event: StreamEvent) -> bool {
    let sse_event = Event::default()
        .event(event.event_name())
        .json_data(&event)
        .unwrap_or_else(|_| Event::default().data("error"));
    sse_tx.send(Ok(sse_event)).await.is_ok()
}
