use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use tracing::{debug, warn};
use url::Url;

use crate::{
    decode::decode,
    error::FetchError,
    model::{AirQualityReading, Coordinate},
};

/// Anything that can produce a decoded reading for a coordinate.
#[async_trait]
pub trait AirQualitySource: Send + Sync + Debug {
    async fn fetch(&self, coordinate: Coordinate) -> Result<AirQualityReading, FetchError>;
}

/// Client for the `/feed/geo:{lat};{lng}` endpoint.
///
/// Single attempt per call, no retries, transport default timeouts.
#[derive(Debug, Clone)]
pub struct AqiClient {
    endpoint: Endpoint,
    token: String,
    http: Client,
}

#[derive(Debug, Clone)]
enum Endpoint {
    /// Bare host, optionally with `:port`, always reached over https.
    Host(String),
    /// Complete base URL, scheme included.
    BaseUrl(String),
}

/// Characters that would turn a host into something else (path, query,
/// fragment, userinfo or a second scheme).
const NON_HOST_CHARS: [char; 5] = ['/', '?', '#', '@', '\\'];

impl Endpoint {
    fn base(&self) -> Result<Url, FetchError> {
        let raw = match self {
            Endpoint::Host(host) => {
                if host.is_empty() || host.contains(NON_HOST_CHARS) {
                    warn!(%host, "configured API host is not a bare host");
                    return Err(FetchError::InvalidUrl);
                }
                format!("https://{host}/")
            }
            Endpoint::BaseUrl(base_url) => base_url.clone(),
        };

        let url = Url::parse(&raw).map_err(|e| {
            warn!(base_url = %raw, error = %e, "invalid API base URL");
            FetchError::InvalidUrl
        })?;

        if url.host_str().is_none_or(str::is_empty) {
            warn!(base_url = %raw, "API base URL has no host");
            return Err(FetchError::InvalidUrl);
        }

        Ok(url)
    }
}

impl AqiClient {
    /// Client for `https://{host}`. Anything other than a bare host (with an
    /// optional port) surfaces as [`FetchError::InvalidUrl`] when a request
    /// is built.
    pub fn new(host: &str, token: &str) -> Self {
        Self::with_endpoint(Endpoint::Host(host.to_string()), token)
    }

    /// Client for an explicit base URL, e.g. a local mock server.
    pub fn with_base_url(base_url: &str, token: &str) -> Self {
        Self::with_endpoint(Endpoint::BaseUrl(base_url.to_string()), token)
    }

    fn with_endpoint(endpoint: Endpoint, token: &str) -> Self {
        Self {
            endpoint,
            token: token.to_string(),
            http: Client::new(),
        }
    }

    /// Full request URL for `coordinate`, rounded to two decimals.
    pub fn request_url(&self, coordinate: Coordinate) -> Result<Url, FetchError> {
        let mut url = self.endpoint.base()?;

        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl)?
            .pop_if_empty()
            .push("feed")
            .push(&coordinate.path_segment());

        url.query_pairs_mut().append_pair("token", &self.token);

        Ok(url)
    }

    /// Request URL with the token masked, for logs and diagnostics.
    pub fn redacted_url(&self, coordinate: Coordinate) -> Result<String, FetchError> {
        let mut url = self.request_url(coordinate)?;
        url.query_pairs_mut().clear().append_pair("token", "REDACTED");
        Ok(url.to_string())
    }

    async fn fetch_body(&self, url: Url) -> Result<String, FetchError> {
        let res = self.http.get(url).send().await.map_err(|e| {
            warn!(error = %e, "air-quality request could not be sent");
            classify_transport_error(&e)
        })?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "air-quality request failed");
            return Err(FetchError::RequestFailed);
        }

        let body = res.text().await.map_err(|e| {
            warn!(error = %e, "failed to read air-quality response body");
            FetchError::UnknownError
        })?;

        if body.trim().is_empty() {
            warn!("air-quality response body was empty");
            return Err(FetchError::InvalidData);
        }

        Ok(body)
    }
}

#[async_trait]
impl AirQualitySource for AqiClient {
    async fn fetch(&self, coordinate: Coordinate) -> Result<AirQualityReading, FetchError> {
        let url = self.request_url(coordinate)?;
        debug!(%coordinate, "requesting air-quality feed");

        let body = self.fetch_body(url).await?;
        let reading = decode(&body)?;

        debug!(aqi = reading.aqi, station = %reading.city.name, "decoded air-quality feed");
        Ok(reading)
    }
}

fn classify_transport_error(e: &reqwest::Error) -> FetchError {
    if e.is_connect() || e.is_timeout() || e.is_request() || e.is_status() {
        FetchError::RequestFailed
    } else {
        FetchError::UnknownError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_has_feed_path_and_token() {
        let client = AqiClient::new("api.waqi.info", "SECRET");
        let url = client
            .request_url(Coordinate::new(34.0522, -118.2437))
            .expect("url should build");

        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("api.waqi.info"));
        assert_eq!(url.path(), "/feed/geo:34.05;-118.24");
        assert_eq!(url.query(), Some("token=SECRET"));
    }

    #[test]
    fn request_url_follows_rounding_for_many_coordinates() {
        let client = AqiClient::new("api.waqi.info", "t");
        let coords = [(0.0, 0.0), (89.999, -179.999), (-33.8688, 151.2093), (1.005, 2.994)];

        for (lat, lng) in coords {
            let c = Coordinate::new(lat, lng);
            let url = client.request_url(c).expect("url should build");
            let r = c.rounded();
            assert_eq!(url.path(), format!("/feed/geo:{:.2};{:.2}", r.latitude, r.longitude));
            assert_eq!(url.query(), Some("token=t"));
        }
    }

    #[test]
    fn empty_token_still_builds() {
        let client = AqiClient::new("api.waqi.info", "");
        let url = client.request_url(Coordinate::new(1.0, 2.0)).expect("url should build");
        assert_eq!(url.query(), Some("token="));
    }

    #[test]
    fn token_content_never_breaks_the_url() {
        let client = AqiClient::new("api.waqi.info", "a b&c=d");
        let url = client.request_url(Coordinate::new(1.0, 2.0)).expect("url should build");
        let token: Vec<_> = url.query_pairs().collect();
        assert_eq!(token.len(), 1);
        assert_eq!(token[0].1, "a b&c=d");
    }

    #[test]
    fn invalid_host_is_invalid_url() {
        let hosts = [
            "",
            "bad host",
            "exa mple.com",
            "http://api.waqi.info",
            "https://api.waqi.info",
            "api.waqi.info/extra",
            "user@api.waqi.info",
            "api.waqi.info?x=1",
            "api.waqi.info#frag",
            "api.waqi.info:notaport",
        ];
        for host in hosts {
            let client = AqiClient::new(host, "t");
            assert_eq!(
                client.request_url(Coordinate::new(1.0, 2.0)).unwrap_err(),
                FetchError::InvalidUrl,
                "host {host:?}"
            );
        }
    }

    #[test]
    fn host_with_port_is_accepted() {
        let client = AqiClient::new("localhost:8080", "t");
        let url = client.request_url(Coordinate::new(1.0, 2.0)).expect("url should build");

        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8080));
        assert_eq!(url.path(), "/feed/geo:1.00;2.00");
    }

    #[test]
    fn base_url_keeps_its_scheme() {
        let client = AqiClient::with_base_url("http://127.0.0.1:9000", "t");
        let url = client.request_url(Coordinate::new(1.0, 2.0)).expect("url should build");

        assert_eq!(url.as_str(), "http://127.0.0.1:9000/feed/geo:1.00;2.00?token=t");
    }

    #[test]
    fn redacted_url_hides_token() {
        let client = AqiClient::new("api.waqi.info", "SECRET");
        let url = client.redacted_url(Coordinate::new(1.0, 2.0)).expect("url should build");
        assert!(!url.contains("SECRET"));
        assert!(url.ends_with("/feed/geo:1.00;2.00?token=REDACTED"));
    }

    #[tokio::test]
    async fn invalid_host_fails_before_any_request() {
        let client = AqiClient::new("bad host", "t");
        let err = client.fetch(Coordinate::new(1.0, 2.0)).await.unwrap_err();
        assert_eq!(err, FetchError::InvalidUrl);
    }
}
