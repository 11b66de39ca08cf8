//! Snapshot persistence.
//!
//! The whole snapshot is read once when a run starts and written back in
//! full when it ends; there is no incremental update.
//!
//! ```text
//! gift_card_data.json
//! {
//!   "https://shop/a": [ { "name", "price", "savePercent", "quantity" }, ... ],
//!   ...
//! }
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::JsonFileStore;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot; an absent store yields an empty snapshot.
    async fn load(&self) -> Result<Snapshot>;

    /// Replace the stored snapshot with `snapshot`.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}
