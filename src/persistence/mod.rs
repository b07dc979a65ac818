pub mod batch;
pub mod point;
pub mod snapshot_store;

pub use batch::ExportBatch;
pub use point::ExportPoint;
pub use snapshot_store::SnapshotStore;
