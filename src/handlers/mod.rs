//! Request handlers for different server endpoints

pub mod websocket;

use std::convert::Infallible;
use warp::Filter;

use crate::constants::WS_PATH;
use crate::core::registry::RoomRegistry;

// Re-export the websocket handler
pub use websocket::handle_ws_client;

/// All HTTP routes: WebSocket upgrade on `/ws` and `/`, health on `/health`
pub fn routes(
    registry: RoomRegistry,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let ws_path = warp::path(WS_PATH)
        .and(warp::path::end())
        .or(warp::path::end())
        .unify();

    let ws_route = ws_path
        .and(warp::ws())
        .and(with_registry(registry))
        .map(|ws: warp::ws::Ws, registry: RoomRegistry| {
            log::debug!("New websocket connection");
            ws.on_upgrade(move |socket| handle_ws_client(socket, registry))
        });

    let health_route = warp::path("health").and(warp::path::end()).map(|| "OK");

    health_route.or(ws_route)
}

// Helper function to include the registry in request
fn with_registry(
    registry: RoomRegistry,
) -> impl Filter<Extract = (RoomRegistry,), Error = Infallible> + Clone {
    warp::any().map(move || registry.clone())
}
