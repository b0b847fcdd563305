//! HTTP API helpers shared by REST modules.

pub mod error_layer;
pub mod json_body;
pub mod problem;
