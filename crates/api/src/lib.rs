//! HTTP API: auth endpoints, role-gated routing, and error mapping.

pub mod app;
pub mod middleware;
