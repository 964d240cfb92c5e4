//! WebSocket dialogue endpoint
//!
//! One connection carries one dialogue session at a time. The session is
//! dropped once a destination is confirmed; the next frame on the same
//! connection starts over.

use super::types::{ClientFrame, ServerFrame};
use super::AppState;
use crate::prompts;
use crate::runtime::SpeechTranscriber;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Outbound frames buffered per connection
const OUTBOUND_BUFFER: usize = 32;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sender, receiver) = socket.split();
    let session_id = Uuid::new_v4().to_string();
    run_connection(sender, receiver, state, &session_id).await;
}

/// Greet, run every text frame as a turn until the client closes, then drop
/// the session.
pub(super) async fn run_connection<Tx, Rx, E>(
    mut sender: Tx,
    mut receiver: Rx,
    state: AppState,
    session_id: &str,
) where
    Tx: Sink<Message> + Unpin + Send + 'static,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
{
    tracing::info!(session_id = %session_id, "Client connected");

    let (tx, mut rx) = mpsc::channel::<ServerFrame>(OUTBOUND_BUFFER);

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize frame");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(ServerFrame::message(prompts::GREETING)).await;

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                for frame in handle_frame(&state, session_id, &text).await {
                    if tx.send(frame).await.is_err() {
                        break;
                    }
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.sessions.remove(session_id).await;
    drop(tx);
    let _ = send_task.await;
    tracing::info!(session_id = %session_id, "Client disconnected");
}

/// Run one inbound frame through the session's dialogue
pub(super) async fn handle_frame(state: &AppState, session_id: &str, text: &str) -> Vec<ServerFrame> {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "Malformed client frame");
            return vec![ServerFrame::error(format!("Invalid message: {e}"))];
        }
    };

    let utterance = resolve_utterance(frame, state.transcriber.as_ref()).await;
    tracing::info!(session_id = %session_id, utterance = %utterance, "User utterance");

    let session = state.sessions.get_or_create(session_id).await;
    let outcome = session.lock().await.handle_turn(&utterance).await;

    match outcome {
        Ok(outcome) => {
            let mut frames = vec![ServerFrame::message(outcome.reply)];
            if let Some(destination) = outcome.final_destination.filter(|_| outcome.done) {
                frames.push(ServerFrame::destination(destination));
                state.sessions.remove(session_id).await;
            }
            frames
        }
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "Turn rejected");
            vec![ServerFrame::error(e.to_string())]
        }
    }
}

/// Text for this turn. Audio wins over `message`; any audio failure is an
/// empty utterance.
pub(super) async fn resolve_utterance(frame: ClientFrame, transcriber: &dyn SpeechTranscriber) -> String {
    let Some(audio) = frame.audio_data else {
        return frame.message.unwrap_or_default();
    };

    let pcm = match STANDARD.decode(audio.trim()) {
        Ok(pcm) => pcm,
        Err(e) => {
            tracing::warn!(error = %e, "Audio payload is not valid base64");
            return String::new();
        }
    };

    match transcriber.transcribe(&pcm).await {
        Ok(transcript) => transcript,
        Err(e) => {
            tracing::warn!(error = %e, "Transcription failed");
            String::new()
        }
    }
}
