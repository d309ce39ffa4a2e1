use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::storage::local::LocalBlobStore;
use crate::storage::BlobStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub storage: Arc<dyn BlobStore>,
    /// Serves signed download links minted by the filesystem store.
    pub local_files: LocalBlobStore,
}
