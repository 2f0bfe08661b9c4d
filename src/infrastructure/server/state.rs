use crate::application::router::ProtocolRouter;
use crate::config::ServerSettings;
use std::sync::Arc;

pub(crate) struct ServerState {
    router: Arc<ProtocolRouter>,
    settings: ServerSettings,
}

impl ServerState {
    pub(crate) fn new(router: Arc<ProtocolRouter>, settings: ServerSettings) -> Self {
        Self { router, settings }
    }

    pub(crate) fn router(&self) -> Arc<ProtocolRouter> {
        Arc::clone(&self.router)
    }

    pub(crate) fn settings(&self) -> &ServerSettings {
        &self.settings
    }
}
