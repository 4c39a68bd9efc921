// src/main.rs

//! # Skill Certification Registry - Main Entry Point
//!
//! Initializes the certification registry and starts the HTTP API server
//! that hosts it.
//!
//! ## Architecture Overview
//! 1. **Registry Core**: in-memory certification state machine with issuer
//!    authorization, delegation, disputes, and auxiliary metadata
//! 2. **Services Layer**: mutex-serialized registry access and the HTTP API
//! 3. **Host Responsibilities**: the API layer supplies the caller identity
//!    (from the `x-identity` header) and the time counter for every call
//!
//! ## Environment Variables
//! - `REGISTRY_OWNER`: identity allowed to manage the issuer allow-list (required)
//! - `BIND_ADDR`: (optional) socket address to listen on (default: 127.0.0.1:3000)
//! - `STRICT_DELEGATE_RENEWAL`: (optional) require a delegate's delegator to
//!   match a certification's issuer when renewing on delegated authority
//! - `RUST_LOG`: (optional) log filter, e.g. `info`

use crate::models::credential::Identity;
use crate::services::api_server::ApiServer;
use crate::services::registry_service::RegistryService;
use anyhow::Context;
use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;

// Module declarations (organized by functional domain)
mod models; // Data structures
mod registry; // Certification state machine and authorization
mod services; // Serialized registry access and HTTP API

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    let owner = std::env::var("REGISTRY_OWNER")
        .expect("REGISTRY_OWNER must be set in .env");
    let strict_delegate_renewal = std::env::var("STRICT_DELEGATE_RENEWAL")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .context("BIND_ADDR must be a valid socket address")?;

    let registry = RegistryService::new(Identity::new(owner), strict_delegate_renewal);
    let api_server = ApiServer::new(registry);

    info!("certification registry API running at http://{}", addr);
    if strict_delegate_renewal {
        info!("strict delegate renewal enabled");
    }

    api_server.run(addr).await
}
