//! Promo code administration for the Seoul Mirage dashboard.
//!
//! Promo codes belong to a hub. Their effective status is derived when they
//! are read, never stored, and new codes can be generated on demand.

pub mod domain;
pub mod forms;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

pub const SERVICE_ACCESS_ROLE: &str = "admin";
