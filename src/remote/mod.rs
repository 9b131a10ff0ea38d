//! Remote Service layer: REST client and wire bodies.
//!
//! All endpoints live under the configured base URL (by default
//! `http://localhost:8080/api/v1`).

pub mod client;
pub mod dto;

pub use client::{Confirmation, RemoteClient};
