pub mod client_ip;

pub use client_ip::{resolve_client_ip, split_host_port, FORWARDED_FOR};
