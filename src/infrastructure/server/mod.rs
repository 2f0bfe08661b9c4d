mod error;
mod router;
mod state;

pub use error::ServerError;
pub(crate) use state::ServerState;

use crate::application::router::ProtocolRouter;
use crate::config::ServerSettings;
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn serve(
    router: Arc<ProtocolRouter>,
    settings: ServerSettings,
    addr: SocketAddr,
) -> Result<(), ServerError> {
    let state = Arc::new(ServerState::new(router, settings));
    router::serve(state, addr).await
}

/// The HTTP application without a listener, for embedding and tests.
pub fn app(
    router: Arc<ProtocolRouter>,
    settings: ServerSettings,
) -> Result<axum::Router, ServerError> {
    router::build_app(Arc::new(ServerState::new(router, settings)))
}
