//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging snapshot consumers into a
//! program. Each subscriber is driven by a dedicated worker loop fed by a bounded
//! queue that is owned by the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they do **not** block the
//!   scheduler nor other subscribers.
//! - Each subscriber may **declare** its queue capacity via
//!   [`Subscribe::queue_capacity`]; `0` means "use the program default"
//!   (`ProgramConfig::snapshot_queue_capacity`). On overflow, messages for that
//!   subscriber are **dropped** (warn).

use async_trait::async_trait;

use crate::snapshot::SnapshotMessage;

/// Contract for snapshot subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single snapshot message.
    async fn on_snapshot(&self, msg: &SnapshotMessage);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue (`0` = program default).
    fn queue_capacity(&self) -> usize {
        0
    }
}
