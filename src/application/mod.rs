//! Application Layer
//!
//! Use cases that orchestrate the domain and its ports.

mod enrichment_service;

pub use enrichment_service::GeoEnrichmentService;
