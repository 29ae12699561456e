//! MaxMind GeoIP Lookup
//!
//! Implements GeoLookup using a MaxMind GeoLite2/GeoIP2 database.

use crate::domain::entities::GeoRecord;
use crate::domain::errors::LookupError;
use crate::domain::ports::GeoLookup;
use maxminddb::{MaxMindDBError, Reader};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// MaxMind GeoIP lookup.
///
/// Works with City databases (all seven fields) and Country databases
/// (city and location fields stay empty). The reader is immutable and
/// shared across requests.
#[derive(Clone)]
pub struct MaxMindGeoLookup {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindGeoLookup {
    /// Load a database from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Load a database already held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> anyhow::Result<Self> {
        let reader = Reader::from_source(bytes)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Database type recorded in the metadata (e.g. "GeoLite2-City").
    pub fn database_type(&self) -> &str {
        &self.reader.metadata.database_type
    }
}

impl GeoLookup for MaxMindGeoLookup {
    fn lookup(&self, ip: IpAddr) -> Result<GeoRecord, LookupError> {
        self.reader.lookup::<GeoRecord>(ip).map_err(|e| match e {
            MaxMindDBError::AddressNotFoundError(_) => LookupError::NotFound(ip),
            other => LookupError::Database(other.to_string()),
        })
    }
}
