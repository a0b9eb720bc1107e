//! HTTP client for the Sonarr v3 REST API.
//!
//! This module is independent of the provider plugin and can be used on its
//! own (the `sonarrctl` binary does exactly that).
//!
//! # Example
//!
//! ```no_run
//! use sonarr_provider::sonarr::SonarrClient;
//!
//! # async fn run() -> Result<(), sonarr_provider::sonarr::ClientError> {
//! let client = SonarrClient::new("http://localhost:8989", "api-key")?;
//! let status = client.get_system_status().await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;
mod series;
mod system;

pub use client::{SonarrClient, SonarrClientBuilder, API_KEY_HEADER, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result};
pub use models::{AddOptions, Season, Series, SeriesLookup, SeriesStatistics, SystemStatus};
