//! Series endpoints: `/api/v3/series` and `/api/v3/series/lookup`.

use reqwest::{Method, StatusCode};
use tracing::{debug, info};

use super::client::{api_error, decode, SonarrClient};
use super::error::Result;
use super::models::{Series, SeriesLookup};

impl SonarrClient {
    /// List every series in the library.
    pub async fn get_all_series(&self) -> Result<Vec<Series>> {
        let url = self.endpoint(&["series"])?;
        let response = self.send(self.request(Method::GET, url)).await?;

        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }
        decode(response).await
    }

    /// Fetch a series by id. Returns `Ok(None)` if Sonarr does not know it.
    pub async fn get_series(&self, id: i32) -> Result<Option<Series>> {
        let url = self.endpoint(&["series", id.to_string().as_str()])?;
        let response = self.send(self.request(Method::GET, url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(id, "Series not found");
                Ok(None)
            }
            StatusCode::OK => decode(response).await.map(Some),
            _ => Err(api_error(response).await),
        }
    }

    /// Add a series to the library.
    pub async fn create_series(&self, series: &Series) -> Result<Series> {
        let url = self.endpoint(&["series"])?;
        let request = self.request(Method::POST, url).json(series);
        let response = self.send(request).await?;

        if response.status() != StatusCode::CREATED {
            return Err(api_error(response).await);
        }
        let created: Series = decode(response).await?;
        info!(id = created.id, title = %created.title, "Series created");
        Ok(created)
    }

    /// Replace a series. An empty response body yields the submitted series.
    pub async fn update_series(&self, series: &Series) -> Result<Series> {
        let url = self.endpoint(&["series", series.id.to_string().as_str()])?;
        let request = self.request(Method::PUT, url).json(series);
        let response = self.send(request).await?;

        match response.status() {
            StatusCode::OK | StatusCode::ACCEPTED => {
                let body = response.bytes().await?;
                if body.is_empty() {
                    return Ok(series.clone());
                }
                Ok(serde_json::from_slice(&body)?)
            }
            _ => Err(api_error(response).await),
        }
    }

    /// Remove a series, optionally deleting its files from disk.
    ///
    /// A series that is already gone counts as deleted.
    pub async fn delete_series(&self, id: i32, delete_files: bool) -> Result<()> {
        let mut url = self.endpoint(&["series", id.to_string().as_str()])?;
        url.query_pairs_mut()
            .append_pair("deleteFiles", if delete_files { "true" } else { "false" });

        let response = self.send(self.request(Method::DELETE, url)).await?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(api_error(response).await),
        }
    }

    /// Search TVDB through Sonarr.
    pub async fn lookup_series(&self, term: &str) -> Result<Vec<SeriesLookup>> {
        let mut url = self.endpoint(&["series", "lookup"])?;
        url.query_pairs_mut().append_pair("term", term);

        let response = self.send(self.request(Method::GET, url)).await?;

        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }
        decode(response).await
    }
}
