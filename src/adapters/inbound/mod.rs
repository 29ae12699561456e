mod geoip_layer;

pub use geoip_layer::{GeoIpLayer, GeoIpService, RemoteAddr};
