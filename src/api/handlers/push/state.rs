use std::sync::Arc;

use super::storage::BookingDirectory;
use crate::gateway::PushGateway;

pub struct PushState {
    directory: Arc<dyn BookingDirectory>,
    gateway: Arc<dyn PushGateway>,
}

impl PushState {
    #[must_use]
    pub fn new(directory: Arc<dyn BookingDirectory>, gateway: Arc<dyn PushGateway>) -> Self {
        Self { directory, gateway }
    }

    pub(super) fn directory(&self) -> &dyn BookingDirectory {
        self.directory.as_ref()
    }

    pub(super) fn gateway(&self) -> &dyn PushGateway {
        self.gateway.as_ref()
    }
}
