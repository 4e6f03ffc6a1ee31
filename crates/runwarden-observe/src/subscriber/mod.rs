mod journal;
pub use journal::Journal;

mod view;
pub use view::{View, log_event, message_for};

use async_trait::async_trait;
use runwarden_model::Event;

/// Receiver of controller events.
///
/// Each subscriber is driven by its own worker with a bounded queue of
/// `queue_capacity()` events; a slow subscriber loses events instead of
/// stalling admission or GC.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    async fn on_event(&self, event: &Event);

    fn name(&self) -> &'static str;

    fn queue_capacity(&self) -> usize {
        1024
    }
}
