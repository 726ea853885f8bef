//! HTTP entry point. WebSocket upgrades go to the relay; any other request
//! gets a plain-text banner on the same port.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::connection::handle_connection;
use crate::hub::Hub;

/// Transport settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub outbox_capacity: usize,
    pub banner: Arc<str>,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            outbox_capacity: 256,
            banner: Arc::from("Mythos signaling server is running."),
        }
    }
}

#[derive(Clone)]
struct AppState {
    hub: Hub,
    options: ServeOptions,
}

/// Build the router. Every path answers, as clients connect to `/` or
/// to whatever path their signaling URL carries.
pub fn router(hub: Hub, options: ServeOptions) -> Router {
    Router::new()
        .route("/", get(entry))
        .fallback(entry)
        .with_state(AppState { hub, options })
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, hub: Hub, options: ServeOptions) -> std::io::Result<()> {
    let app = router(hub, options);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

async fn entry(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    match ws {
        Ok(ws) => {
            let capacity = state.options.outbox_capacity;
            ws.on_upgrade(move |socket| handle_connection(socket, addr, state.hub, capacity))
        }
        Err(_) => state.options.banner.to_string().into_response(),
    }
}
