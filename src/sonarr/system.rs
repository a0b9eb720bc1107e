//! System endpoints.

use reqwest::{Method, StatusCode};

use super::client::{api_error, decode, SonarrClient};
use super::error::Result;
use super::models::SystemStatus;

impl SonarrClient {
    /// Fetch version and platform information.
    pub async fn get_system_status(&self) -> Result<SystemStatus> {
        let url = self.endpoint(&["system", "status"])?;
        let response = self.send(self.request(Method::GET, url)).await?;

        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }
        decode(response).await
    }
}
