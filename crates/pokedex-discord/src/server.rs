//! HTTP interactions endpoint.
//!
//! Discord POSTs every interaction to a single URL and expects the callback
//! in the response body within three seconds. Requests are verified before
//! the body is parsed.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use pokedex_interaction::Dispatcher;
use pokedex_interaction::types::Interaction;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::error::{DiscordResult, VerifyError};
use crate::verify::{RequestVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// Endpoint settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Route path, e.g. `/interactions`.
    pub path: String,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            path: "/interactions".to_owned(),
            max_body_bytes: 65_536,
        }
    }
}

#[derive(Clone)]
struct AppState {
    dispatcher: Dispatcher,
    verifier: Arc<RequestVerifier>,
}

/// Build the interactions router.
pub fn router(dispatcher: Dispatcher, verifier: RequestVerifier, config: &ServerConfig) -> Router {
    let state = AppState {
        dispatcher,
        verifier: Arc::new(verifier),
    };
    Router::new()
        .route(&config.path, post(interactions))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish.
///
/// # Errors
///
/// Returns an IO error if the server fails.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> DiscordResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!(?addr, "interactions endpoint listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("interactions endpoint stopped");
    Ok(())
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, VerifyError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(VerifyError::MissingHeader(name))
}

fn check_signature(
    verifier: &RequestVerifier,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), VerifyError> {
    let signature = header(headers, SIGNATURE_HEADER)?;
    let timestamp = header(headers, TIMESTAMP_HEADER)?;
    verifier.verify(signature, timestamp, body)
}

async fn interactions(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(e) = check_signature(&state.verifier, &headers, &body) {
        warn!(error = %e, "rejected interaction request");
        return (StatusCode::UNAUTHORIZED, "invalid request signature").into_response();
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(i) => i,
        Err(e) => {
            warn!(error = %e, "malformed interaction payload");
            return (StatusCode::BAD_REQUEST, "malformed interaction").into_response();
        },
    };

    match state.dispatcher.dispatch(&interaction).await {
        Some(response) => Json(response).into_response(),
        None => {
            debug!(id = %interaction.id, "no callback for interaction");
            StatusCode::NO_CONTENT.into_response()
        },
    }
}
