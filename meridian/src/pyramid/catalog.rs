use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::Pyramid;
use crate::error::MeridianError;

/// Provides the pyramids available for a data source.
///
/// This is the backing store boundary of the engine. A failure to return pyramids is the only
/// error that aborts a whole render call.
#[async_trait]
pub trait PyramidCatalog: Send + Sync {
    /// Returns all pyramids of the data source. Fails with
    /// [`MeridianError::CatalogUnavailable`] if the backing store cannot be reached.
    async fn get_pyramids(&self, source: &str) -> Result<Vec<Arc<Pyramid>>, MeridianError>;
}

/// Catalog that keeps the pyramids in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    pyramids: RwLock<HashMap<String, Vec<Arc<Pyramid>>>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pyramid to the data source. Sources are created on first insert.
    pub fn insert(&self, source: impl Into<String>, pyramid: Pyramid) {
        self.pyramids
            .write()
            .entry(source.into())
            .or_default()
            .push(Arc::new(pyramid));
    }
}

#[async_trait]
impl PyramidCatalog for InMemoryCatalog {
    async fn get_pyramids(&self, source: &str) -> Result<Vec<Arc<Pyramid>>, MeridianError> {
        self.pyramids
            .read()
            .get(source)
            .cloned()
            .ok_or_else(|| MeridianError::CatalogUnavailable(format!("unknown source {source}")))
    }
}
