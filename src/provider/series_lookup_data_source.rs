//! The `sonarr_series_lookup` data source: search TVDB through Sonarr.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::DataSourceHandler;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::sonarr::{SeriesLookup, SonarrClient};

/// Looks up series information before a series is added.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeriesLookupDataSource;

#[derive(Debug, Deserialize)]
struct Config {
    term: String,
}

/// An exact (case-insensitive) title match if there is one, else the first
/// result.
fn best_match<'a>(results: &'a [SeriesLookup], term: &str) -> Option<&'a SeriesLookup> {
    let wanted = term.to_lowercase();
    results
        .iter()
        .find(|r| r.title.to_lowercase() == wanted)
        .or_else(|| results.first())
}

#[async_trait::async_trait]
impl DataSourceHandler for SeriesLookupDataSource {
    fn type_name(&self) -> &'static str {
        "sonarr_series_lookup"
    }

    fn schema(&self) -> Schema {
        let computed = |description: &str| Attribute::computed_string().with_description(description);
        let computed_int = |description: &str| Attribute::computed_int32().with_description(description);

        Schema::v0()
            .with_description(
                "Data source for looking up series information from TVDB via Sonarr. Use this to find series details before adding them.",
            )
            .with_attribute(
                "term",
                Attribute::required_string()
                    .with_description("Search term to find the series (searches TVDB)"),
            )
            .with_attribute("title", computed("Title of the series"))
            .with_attribute("sort_title", computed("Sort title of the series"))
            .with_attribute("status", computed("Status of the series (continuing, ended, etc.)"))
            .with_attribute("overview", computed("Overview/description of the series"))
            .with_attribute("network", computed("Network the series airs on"))
            .with_attribute("year", computed_int("Year the series started"))
            .with_attribute("tvdb_id", computed_int("TVDB ID of the series"))
            .with_attribute("imdb_id", computed("IMDB ID of the series"))
            .with_attribute("runtime", computed_int("Runtime of episodes in minutes"))
            .with_attribute("season_count", computed_int("Number of seasons"))
    }

    async fn read(&self, client: &SonarrClient, config: Value) -> Result<Value, ProviderError> {
        let config: Config = serde_json::from_value(config)?;
        let results = client
            .lookup_series(&config.term)
            .await
            .map_err(ProviderError::client("Unable to lookup series"))?;
        debug!(count = results.len(), term = %config.term, "Series lookup returned");

        let found = best_match(&results, &config.term).ok_or_else(|| {
            ProviderError::not_found(
                "Series not found",
                format!("No series found matching: {}", config.term),
            )
        })?;

        Ok(json!({
            "term": config.term,
            "title": found.title,
            "sort_title": found.sort_title,
            "status": found.status,
            "overview": found.overview,
            "network": found.network,
            "year": found.year,
            "tvdb_id": found.tvdb_id,
            "imdb_id": found.imdb_id,
            "runtime": found.runtime,
            "season_count": found.season_count(),
        }))
    }
}
