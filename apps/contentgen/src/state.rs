use anyhow::{Context, Result};
use tracing::warn;

use crate::config::Config;
use crate::layout::PageGeometry;
use crate::llm_client::LlmClient;
use crate::store::{self, FsStore, KeyValueStore, MemStore, StoreError};

/// Everything a command needs, owned by the command loop.
///
/// The LLM client (and with it the key rotation cursor) lives here for the
/// whole process, so a rotation found by one request carries into the next.
pub struct AppState {
    pub llm: LlmClient,
    pub store: Box<dyn KeyValueStore>,
    pub config: Config,
    /// Page geometry for PDF and image export. A4 with 20mm margins.
    pub geometry: PageGeometry,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let llm = LlmClient::from_config(&config).context("Failed to build LLM client")?;
        let store = store_or_memory(FsStore::open(config.data_dir.clone()))
            .context("Failed to open the local store")?;

        Ok(Self {
            llm,
            store,
            config,
            geometry: PageGeometry::default(),
        })
    }
}

/// Falls back to an in-memory store when the platform has no data directory.
/// Any other failure is returned.
fn store_or_memory(opened: store::Result<FsStore>) -> store::Result<Box<dyn KeyValueStore>> {
    match opened {
        Ok(fs) => Ok(Box::new(fs)),
        Err(StoreError::NoDataDir) => {
            warn!("No data directory found; saved prompts last for this run only");
            Ok(Box::new(MemStore::new()))
        }
        Err(e) => Err(e),
    }
}
