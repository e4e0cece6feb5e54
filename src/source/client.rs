use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Thin JSON-over-HTTP client bound to one upstream base URL
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: Url,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self> {
    // Trailing slash so relative joins append instead of replacing the last segment
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
      .map_err(|e| eyre!("Invalid upstream URL {}: {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .user_agent(concat!("equinox/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base })
  }

  /// Resolve a path relative to the base URL, with query parameters.
  pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
    let mut url = self
      .base
      .join(path.trim_start_matches('/'))
      .map_err(|e| eyre!("Invalid endpoint {}: {}", path, e))?;
    if !query.is_empty() {
      url
        .query_pairs_mut()
        .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
  }

  /// GET a JSON document; any non-success status is an error.
  pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
    self
      .get_optional(url.clone())
      .await?
      .ok_or_else(|| eyre!("Not found: {}", url))
  }

  /// GET a JSON document, mapping 404 to `None`.
  pub async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
    tracing::debug!(%url, "GET");

    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    match response.status() {
      StatusCode::NOT_FOUND => Ok(None),
      status if status.is_success() => {
        let body = response
          .json::<T>()
          .await
          .map_err(|e| eyre!("Failed to parse response from {}: {}", url, e))?;
        Ok(Some(body))
      }
      status => Err(eyre!("Request to {} returned {}", url, status)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_endpoint_keeps_base_path() {
    let client = ApiClient::new("https://pokeapi.co/api/v2").unwrap();
    let url = client
      .endpoint("berry", &[("offset", "20".to_string()), ("limit", "10".to_string())])
      .unwrap();
    assert_eq!(url.as_str(), "https://pokeapi.co/api/v2/berry?offset=20&limit=10");
  }

  #[test]
  fn test_endpoint_with_trailing_slash_base() {
    let client = ApiClient::new("https://fakestoreapi.com/").unwrap();
    let url = client.endpoint("/products/3", &[]).unwrap();
    assert_eq!(url.as_str(), "https://fakestoreapi.com/products/3");
  }

  #[test]
  fn test_invalid_base_url() {
    assert!(ApiClient::new("not a url").is_err());
  }
}
