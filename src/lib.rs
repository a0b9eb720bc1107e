//! Sonarr provider plugin
//!
//! An infrastructure-as-code provider that manages series in a
//! [Sonarr](https://sonarr.tv) instance, plus the standalone HTTP client it
//! is built on.
//!
//! # Overview
//!
//! - [`sonarr`]: typed client for the Sonarr v3 REST API
//! - [`provider`]: the `sonarr` provider with the `sonarr_series` resource
//!   and the `sonarr_series`, `sonarr_series_lookup` and
//!   `sonarr_system_status` data sources
//! - [`schema`], [`validation`], [`plan`]: schema-driven config checks and
//!   planning
//! - [`server`]: the gRPC plugin server and the [`ProviderService`] trait
//! - [`testing`]: a harness for driving a provider without gRPC
//!
//! # Quick Start
//!
//! ```no_run
//! use sonarr_provider::{init_logging, serve, provider::SonarrProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!     serve(SonarrProvider::new(env!("CARGO_PKG_VERSION"))).await
//! }
//! ```
//!
//! # Handshake Protocol
//!
//! When the plugin starts via [`serve`], it prints one line to stdout:
//!
//! ```text
//! PROVIDER_PLUGIN|1|127.0.0.1:50051
//! ```
//!
//! Format: `PROVIDER_PLUGIN|<protocol_version>|<address>`. The host then
//! connects over gRPC (`provider.v1.Provider`). Everything else, logs
//! included, goes to stderr.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod schema;
pub mod server;
pub mod sonarr;
pub mod testing;
pub mod types;
pub mod validation;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use plan::plan_resource_change;
pub use schema::ProviderSchema;
pub use server::{
    serve, serve_on, serve_on_with_options, serve_with_options, ProviderService, ServeOptions,
};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};
pub use validation::{validate, validate_result};

pub use async_trait::async_trait;
