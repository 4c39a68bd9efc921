// src/services/mod.rs
//! Host-facing services.
//!
//! The registry core is synchronous and single-writer; these services make
//! it usable from the HTTP host by serializing calls behind one mutex and
//! supplying the caller identity and time counter per request.

pub mod api_server;
pub mod registry_service;
