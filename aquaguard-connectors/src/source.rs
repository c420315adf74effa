//! Reading sources
//!
//! A source returns readings in stored order; sorting and duplicate
//! handling happen when the caller assembles a `ReadingSequence`.

use std::fs;
use std::path::{Path, PathBuf};

use aquaguard_core::Reading;
use aquaguard_schemas::{avro, decode_export, schemas::water_reading_v1};

use crate::ConnectorError;

#[cfg(feature = "http")]
use crate::http::{HttpClient, HttpConfig};

/// Where a run's readings come from
pub trait ReadingSource {
    fn fetch(&self) -> Result<Vec<Reading>, ConnectorError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

impl<S: ReadingSource + ?Sized> ReadingSource for Box<S> {
    fn fetch(&self) -> Result<Vec<Reading>, ConnectorError> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Readings held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    readings: Vec<Reading>,
}

impl MemorySource {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }
}

impl ReadingSource for MemorySource {
    fn fetch(&self) -> Result<Vec<Reading>, ConnectorError> {
        Ok(self.readings.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} readings)", self.readings.len())
    }
}

/// Store export on disk: a JSON array of store documents
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadingSource for JsonFileSource {
    fn fetch(&self) -> Result<Vec<Reading>, ConnectorError> {
        let text = fs::read_to_string(&self.path).map_err(|source| ConnectorError::Io {
            path: self.path.clone(),
            source,
        })?;
        let readings = decode_export(&text)?;
        log::debug!("Read {} readings from {}", readings.len(), self.path.display());
        Ok(readings)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Avro archive written by `aquaguard_schemas::avro::encode_readings`
#[derive(Debug, Clone)]
pub struct AvroFileSource {
    path: PathBuf,
}

impl AvroFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReadingSource for AvroFileSource {
    fn fetch(&self) -> Result<Vec<Reading>, ConnectorError> {
        let bytes = fs::read(&self.path).map_err(|source| ConnectorError::Io {
            path: self.path.clone(),
            source,
        })?;
        let schema = water_reading_v1()?;
        Ok(avro::decode_readings(&schema, &bytes)?)
    }

    fn describe(&self) -> String {
        format!("avro {}", self.path.display())
    }
}

/// Store export served over HTTP
#[cfg(feature = "http")]
pub struct HttpReadingSource {
    client: HttpClient,
}

#[cfg(feature = "http")]
impl HttpReadingSource {
    /// `url` is the full address of the export
    pub fn new(url: impl Into<String>) -> Result<Self, ConnectorError> {
        Self::with_config(HttpConfig::new(url))
    }

    pub fn with_config(config: HttpConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }
}

#[cfg(feature = "http")]
impl ReadingSource for HttpReadingSource {
    fn fetch(&self) -> Result<Vec<Reading>, ConnectorError> {
        let text = self.client.get_text("", &[])?;
        Ok(decode_export(&text)?)
    }

    fn describe(&self) -> String {
        format!("http {}", self.client.config().base_url)
    }
}

/// Source for a location: an http(s) URL, an `.avro` archive or a JSON export
pub fn source_for(location: &str) -> Result<Box<dyn ReadingSource>, ConnectorError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        #[cfg(feature = "http")]
        return Ok(Box::new(HttpReadingSource::new(location)?));
        #[cfg(not(feature = "http"))]
        return Err(ConnectorError::Config(format!(
            "{} needs the http feature",
            location
        )));
    }

    if location.ends_with(".avro") {
        Ok(Box::new(AvroFileSource::new(location)))
    } else {
        Ok(Box::new(JsonFileSource::new(location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_returns_readings() {
        let source = MemorySource::new(vec![Reading::new(0, [1.0, 2.0, 3.0, 4.0])]);
        assert_eq!(source.fetch().unwrap().len(), 1);
        assert_eq!(source.describe(), "memory (1 readings)");
    }

    #[test]
    fn missing_file_is_io_error() {
        let source = JsonFileSource::new("/definitely/not/here.json");
        assert!(matches!(source.fetch(), Err(ConnectorError::Io { .. })));
    }

    #[test]
    fn location_dispatch() {
        assert!(source_for("readings.json").unwrap().describe().starts_with("file"));
        assert!(source_for("archive.avro").unwrap().describe().starts_with("avro"));
        #[cfg(feature = "http")]
        assert!(source_for("https://store.example.com/export").unwrap().describe().starts_with("http"));
    }
}
