//! Persistence: JSON document codec and checksummed snapshots.

pub mod codec;
pub mod snapshot;

pub use codec::{SerializedRecord, StoreDocument};
pub use snapshot::{Manifest, SnapshotManager};
