//! Schema Registry for Version Management
//!
//! Schemas are registered under a qualified name of the form
//! `{base}_v{n}` (`water_reading_v1`). The registry tracks every version of
//! a base name so readers can ask for the newest one.

use std::collections::HashMap;

use apache_avro::Schema;

use crate::{schemas, SchemaError};

/// Registry entry details
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaMetadata {
    /// Base name (e.g., "water_reading")
    pub name: String,

    /// Version number parsed from the `_v{n}` suffix
    pub version: u32,

    /// Name the schema is registered under (e.g., "water_reading_v1")
    pub qualified_name: String,

    /// Whether new data should stop using this schema
    pub deprecated: bool,

    /// Replacement schema if deprecated
    pub replacement: Option<String>,
}

/// Schemas indexed by qualified name
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: HashMap<String, (Schema, SchemaMetadata)>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema; names without a `_v{n}` suffix are version 1
    pub fn register(&mut self, name: &str, schema: Schema) -> Result<(), SchemaError> {
        if self.entries.contains_key(name) {
            return Err(SchemaError::ValidationError(format!(
                "Schema {} already registered",
                name
            )));
        }

        let (base, version) = split_version(name);
        let metadata = SchemaMetadata {
            name: base.to_string(),
            version,
            qualified_name: name.to_string(),
            deprecated: false,
            replacement: None,
        };

        log::debug!("Registered schema {} (version {})", name, version);
        self.entries.insert(name.to_string(), (schema, metadata));
        Ok(())
    }

    /// Get a schema by qualified name
    pub fn get(&self, name: &str) -> Result<Schema, SchemaError> {
        self.entries
            .get(name)
            .map(|(schema, _)| schema.clone())
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    /// Highest registered version of a base name
    pub fn get_latest(&self, base_name: &str) -> Result<Schema, SchemaError> {
        self.entries
            .values()
            .filter(|(_, meta)| meta.name == base_name)
            .max_by_key(|(_, meta)| meta.version)
            .map(|(schema, _)| schema.clone())
            .ok_or_else(|| SchemaError::NotFound(format!("No versions of {}", base_name)))
    }

    /// All registered versions of a base name, ascending
    pub fn versions(&self, base_name: &str) -> Vec<u32> {
        let mut versions: Vec<u32> = self
            .entries
            .values()
            .filter(|(_, meta)| meta.name == base_name)
            .map(|(_, meta)| meta.version)
            .collect();
        versions.sort_unstable();
        versions
    }

    pub fn metadata(&self, name: &str) -> Result<&SchemaMetadata, SchemaError> {
        self.entries
            .get(name)
            .map(|(_, meta)| meta)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    /// Mark a schema as deprecated
    pub fn deprecate(&mut self, name: &str, replacement: Option<String>) -> Result<(), SchemaError> {
        let (_, metadata) = self
            .entries
            .get_mut(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        metadata.deprecated = true;
        metadata.replacement = replacement;
        Ok(())
    }

    /// Load all default AquaGuard schemas
    pub fn load_defaults(&mut self) -> Result<(), SchemaError> {
        self.register(schemas::WATER_READING_V1, schemas::water_reading_v1()?)
    }
}

fn split_version(name: &str) -> (&str, u32) {
    if let Some(pos) = name.rfind("_v") {
        if let Ok(version) = name[pos + 2..].parse() {
            return (&name[..pos], version);
        }
    }
    (name, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_retrieve() {
        let mut registry = SchemaRegistry::new();
        let schema = schemas::water_reading_v1().unwrap();

        registry.register("test_schema_v1", schema.clone()).unwrap();

        let retrieved = registry.get("test_schema_v1").unwrap();
        assert_eq!(schema.name(), retrieved.name());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.load_defaults().unwrap();
        assert!(matches!(registry.load_defaults(), Err(SchemaError::ValidationError(_))));
    }

    #[test]
    fn version_tracking() {
        let mut registry = SchemaRegistry::new();
        let schema = schemas::water_reading_v1().unwrap();

        registry.register("reading_v10", schema.clone()).unwrap();
        registry.register("reading_v2", schema.clone()).unwrap();
        registry.register("reading", schema).unwrap();

        assert_eq!(registry.versions("reading"), vec![1, 2, 10]);
        assert_eq!(registry.metadata("reading_v10").unwrap().version, 10);
        assert!(registry.get_latest("reading").is_ok());
        assert!(registry.get_latest("missing").is_err());
    }

    #[test]
    fn deprecation() {
        let mut registry = SchemaRegistry::new();
        registry.load_defaults().unwrap();
        registry
            .deprecate(schemas::WATER_READING_V1, Some("water_reading_v2".to_string()))
            .unwrap();

        let metadata = registry.metadata(schemas::WATER_READING_V1).unwrap();
        assert!(metadata.deprecated);
        assert_eq!(metadata.replacement.as_deref(), Some("water_reading_v2"));
        assert!(registry.deprecate("nope_v1", None).is_err());
    }
}
