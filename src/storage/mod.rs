pub mod archive;
pub mod classify;
pub mod namespace;
mod paths;
mod store;

pub use classify::{ContentPolicy, ViewMode, classify};
pub use namespace::{Caps, Namespace, ServiceTier};
pub use paths::resolve_name;
pub use store::{FileStore, StagedUpload, StoredFile, MAX_FILE_SIZE};
