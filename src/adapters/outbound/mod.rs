mod dashmap_geo_lookup;
mod maxmind_geo_lookup;

pub use dashmap_geo_lookup::DashMapGeoLookup;
pub use maxmind_geo_lookup::MaxMindGeoLookup;
