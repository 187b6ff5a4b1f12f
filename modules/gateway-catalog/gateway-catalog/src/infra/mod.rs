//! Outbound infrastructure.

pub mod http_client;
