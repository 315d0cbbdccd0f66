//! HTTP client for the product backend.
//!
//! The user's region travels with each call in a [`RequestContext`] rather
//! than being installed on the client, so two calls for different regions
//! can share one `ApiClient`.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Header carrying the user's region to the backend.
pub const REGION_HEADER: &str = "x-region";

/// Per-call options for backend requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub region: Option<String>,
}

impl RequestContext {
    pub fn with_region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
        }
    }

    fn region(&self) -> Option<&str> {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` does not parse and
    /// [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("abrody-web/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Trailing slash so `join` appends to the base path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| Error::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
    }

    /// Start a request for `path` with the context's headers applied.
    pub fn request(&self, method: Method, path: &str, ctx: &RequestContext) -> Result<RequestBuilder> {
        let mut builder = self.client.request(method, self.url(path)?);
        if let Some(region) = ctx.region() {
            builder = builder.header(REGION_HEADER, region);
        }
        Ok(builder)
    }

    /// `GET path` and decode a JSON body. Non-2xx statuses are errors.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, ctx: &RequestContext) -> Result<T> {
        let response = self
            .request(Method::GET, path, ctx)?
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let api = ApiClient::new("https://api.example.com/v1").unwrap();
        assert_eq!(api.base_url().as_str(), "https://api.example.com/v1/");
        assert_eq!(
            api.url("/terms").unwrap().as_str(),
            "https://api.example.com/v1/terms"
        );
    }

    #[test]
    fn invalid_base_url() {
        assert!(matches!(
            ApiClient::new("::not a url"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn blank_region_is_ignored() {
        assert_eq!(RequestContext::with_region("  ").region(), None);
        assert_eq!(RequestContext::with_region("eu").region(), Some("eu"));
        assert_eq!(RequestContext::default().region(), None);
    }

    #[test]
    fn region_header_is_per_request() {
        let api = ApiClient::new("https://api.example.com").unwrap();
        let with = api
            .request(Method::GET, "me", &RequestContext::with_region("kr"))
            .unwrap()
            .build()
            .unwrap();
        let without = api
            .request(Method::GET, "me", &RequestContext::default())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(with.headers().get(REGION_HEADER).unwrap(), "kr");
        assert!(without.headers().get(REGION_HEADER).is_none());
    }
}
