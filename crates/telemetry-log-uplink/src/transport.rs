//! Interface boundary to the transport and multiplexing layer.
//!
//! The collector never sends bytes itself. When the decision policy asks for
//! an upload, the collector looks up the sync handler registered for the
//! logging service and fires it. The trigger is fire-and-forget: no result is
//! observed and a missing handler is silently ignored.

use std::sync::Arc;

/// Client services multiplexed over the device connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Profile,
    Configuration,
    Notification,
    Logging,
}

/// Callable that initiates a synchronization pass for a set of services.
pub trait SyncHandler: Send + Sync {
    /// Requests a sync cycle covering `services`. Synchronous request to
    /// start the cycle, not an awaited operation.
    fn request_sync(&self, services: &[ServiceKind]);
}

/// By-kind lookup of the currently registered sync handlers.
pub trait TransportRegistry: Send + Sync {
    /// Handler registered for `service`, if any.
    fn sync_handler(&self, service: ServiceKind) -> Option<Arc<dyn SyncHandler>>;
}

/// Registry with no handlers; every upload trigger is dropped.
#[derive(Debug, Default)]
pub struct NoopTransportRegistry;

impl TransportRegistry for NoopTransportRegistry {
    fn sync_handler(&self, _service: ServiceKind) -> Option<Arc<dyn SyncHandler>> {
        None
    }
}
