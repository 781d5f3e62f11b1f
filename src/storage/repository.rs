//! Saved schemas, kept as one JSON array under the configured key.
//!
//! Every operation fails soft: a broken or unreadable blob reads as "no
//! schemas" and a failed write is dropped after logging.
use super::backend::StorageBackend;
use super::config::StorageConfig;
use super::error::StorageResult;
use crate::store::FormSchema;
use tracing::{debug, error};

#[derive(Debug)]
pub struct SchemaRepository<B: StorageBackend> {
    backend: B,
    config: StorageConfig,
}

impl<B: StorageBackend> SchemaRepository<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, StorageConfig::default())
    }

    pub fn with_config(backend: B, config: StorageConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn load_schemas(&self) -> Vec<FormSchema> {
        match self.try_load() {
            Ok(schemas) => schemas,
            Err(e) => {
                error!(key = %self.config.key, error = %e, "failed to load saved forms");
                Vec::new()
            }
        }
    }

    pub fn save_schemas(&self, schemas: &[FormSchema]) {
        if let Err(e) = self.try_save(schemas) {
            error!(key = %self.config.key, error = %e, "failed to save forms");
        }
    }

    /// Appends `schema` to the saved list.
    pub fn add_schema(&self, schema: FormSchema) {
        let mut schemas = self.load_for_update();
        debug!(id = %schema.id, name = %schema.name, "saving form");
        schemas.push(schema);
        self.save_schemas(&schemas);
    }

    /// Removes the schema with `id`. Returns whether one was removed.
    pub fn delete_schema(&self, id: &str) -> bool {
        let mut schemas = self.load_for_update();
        let before = schemas.len();
        schemas.retain(|s| s.id != id);
        if schemas.len() == before {
            return false;
        }
        self.save_schemas(&schemas);
        true
    }

    pub fn find_schema(&self, id: &str) -> Option<FormSchema> {
        self.load_schemas().into_iter().find(|s| s.id == id)
    }

    /// Like `load_schemas`, for callers that write the list back. Unreadable
    /// data is replaced by that write.
    fn load_for_update(&self) -> Vec<FormSchema> {
        match self.try_load() {
            Ok(schemas) => schemas,
            Err(e) => {
                error!(key = %self.config.key, error = %e, "failed to load saved forms");
                debug!(key = %self.config.key, "unreadable saved forms will be overwritten");
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> StorageResult<Vec<FormSchema>> {
        match self.backend.get_item(&self.config.key)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(Vec::new()),
        }
    }

    fn try_save(&self, schemas: &[FormSchema]) -> StorageResult<()> {
        let blob = serde_json::to_string(schemas)?;
        self.backend.set_item(&self.config.key, &blob)
    }
}
