//! OSRM directions provider.
//!
//! Talks to the OSRM HTTP route service:
//!
//! ```text
//! GET {base}/route/v1/{profile}/{lon},{lat};{lon},{lat}?overview=full&geometries=geojson
//! ```
//!
//! OSRM reports outcomes in the body's `code` field. `NoRoute` and
//! `NoSegment` describe the pair itself and are permanent; everything else
//! (`TooBig`, `InvalidQuery`, server errors, throttling) may succeed later.

use super::http::AsyncHttpClient;
use super::types::{DirectionsProvider, ProviderError, ProviderRoute};
use crate::coord::Coordinate;
use crate::route::TransportMode;
use serde::Deserialize;
use tracing::{debug, warn};

/// Public OSRM demo server.
pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: `[lon, lat]`
    coordinates: Vec<[f64; 2]>,
}

impl From<OsrmRoute> for ProviderRoute {
    fn from(route: OsrmRoute) -> Self {
        ProviderRoute {
            distance_meters: route.distance,
            expected_travel_time_seconds: route.duration,
            polyline: route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| Coordinate { lat, lon })
                .collect(),
        }
    }
}

/// Directions provider backed by an OSRM server.
pub struct OsrmProvider<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: AsyncHttpClient> OsrmProvider<C> {
    /// Creates a provider against the public OSRM server.
    pub fn new(http_client: C) -> Self {
        Self::with_base_url(http_client, DEFAULT_OSRM_URL)
    }

    /// Creates a provider against a custom OSRM deployment.
    pub fn with_base_url(http_client: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn profile(mode: TransportMode) -> Result<&'static str, ProviderError> {
        match mode {
            TransportMode::Automobile | TransportMode::Any => Ok("driving"),
            TransportMode::Walking => Ok("foot"),
            TransportMode::Transit | TransportMode::Airplane => {
                Err(ProviderError::UnsupportedMode(mode))
            }
        }
    }

    fn build_url(&self, source: Coordinate, destination: Coordinate, profile: &str) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=geojson",
            self.base_url, profile, source.lon, source.lat, destination.lon, destination.lat
        )
    }

    fn parse(status: u16, body: &[u8]) -> Result<Vec<ProviderRoute>, ProviderError> {
        if status == 429 {
            return Err(ProviderError::RateLimited);
        }

        let response: OsrmResponse = match serde_json::from_slice(body) {
            Ok(response) => response,
            Err(_) if !(200..300).contains(&status) => {
                return Err(ProviderError::Http(format!("HTTP {}", status)));
            }
            Err(e) => return Err(ProviderError::InvalidResponse(e.to_string())),
        };

        let message = response.message.unwrap_or_default();
        match response.code.as_str() {
            "Ok" => Ok(response.routes.into_iter().map(ProviderRoute::from).collect()),
            "NoRoute" => Err(ProviderError::NoRoute(message)),
            "NoSegment" => Err(ProviderError::InvalidEndpoint(message)),
            _ => Err(ProviderError::Rejected {
                code: response.code,
                message,
            }),
        }
    }
}

impl<C: AsyncHttpClient> DirectionsProvider for OsrmProvider<C> {
    async fn compute_route(
        &self,
        source: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<Vec<ProviderRoute>, ProviderError> {
        let profile = Self::profile(mode)?;
        let url = self.build_url(source, destination, profile);
        debug!(url = %url, mode = %mode, "Requesting OSRM route");

        let response = self.http_client.get(&url).await?;
        let result = Self::parse(response.status, &response.body);
        if let Err(e) = &result {
            warn!(status = response.status, error = %e, "OSRM request did not return a route");
        }
        result
    }

    fn name(&self) -> &str {
        "OSRM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::tests::MockHttpClient;
    use crate::provider::ErrorClass;

    const OK_BODY: &str = r#"{
        "code": "Ok",
        "routes": [{
            "distance": 176012.3,
            "duration": 7812.5,
            "geometry": {
                "type": "LineString",
                "coordinates": [[121.4737, 31.2304], [120.9, 30.9], [120.1551, 30.2741]]
            }
        }],
        "waypoints": []
    }"#;

    fn shanghai() -> Coordinate {
        Coordinate { lat: 31.2304, lon: 121.4737 }
    }

    fn hangzhou() -> Coordinate {
        Coordinate { lat: 30.2741, lon: 120.1551 }
    }

    #[tokio::test]
    async fn test_ok_response_parsed() {
        let provider = OsrmProvider::new(MockHttpClient::json(200, OK_BODY));
        let routes = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Automobile)
            .await
            .unwrap();

        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.distance_meters, 176012.3);
        assert_eq!(route.expected_travel_time_seconds, 7812.5);
        assert_eq!(route.polyline.len(), 3);
        // GeoJSON order is lon,lat
        assert_eq!(route.polyline[0], shanghai());
    }

    #[tokio::test]
    async fn test_url_format() {
        let provider =
            OsrmProvider::with_base_url(MockHttpClient::json(200, OK_BODY), "http://localhost:5000/");
        provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Walking)
            .await
            .unwrap();

        let requests = provider.http_client.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            "http://localhost:5000/route/v1/foot/121.473700,31.230400;120.155100,30.274100?overview=full&geometries=geojson"
        );
    }

    #[tokio::test]
    async fn test_any_mode_uses_driving_profile() {
        let provider = OsrmProvider::new(MockHttpClient::json(200, OK_BODY));
        provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Any)
            .await
            .unwrap();
        let requests = provider.http_client.requests.lock().unwrap();
        assert!(requests[0].contains("/route/v1/driving/"));
    }

    #[tokio::test]
    async fn test_unsupported_mode_makes_no_request() {
        let provider = OsrmProvider::new(MockHttpClient::json(200, OK_BODY));
        let err = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Transit)
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::UnsupportedMode(TransportMode::Transit));
        assert!(provider.http_client.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_route_is_unroutable() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        let provider = OsrmProvider::new(MockHttpClient::json(400, body));
        let err = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Automobile)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::NoRoute("Impossible route between points".to_string())
        );
        assert_eq!(err.class(), ErrorClass::Unroutable);
    }

    #[tokio::test]
    async fn test_no_segment_is_invalid_endpoint() {
        let body = r#"{"code": "NoSegment", "message": "Could not find a matching segment"}"#;
        let provider = OsrmProvider::new(MockHttpClient::json(400, body));
        let err = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Automobile)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidEndpoint(_)));
        assert_eq!(err.class(), ErrorClass::Unroutable);
    }

    #[tokio::test]
    async fn test_other_codes_are_transient() {
        let body = r#"{"code": "TooBig", "message": "Too many coordinates"}"#;
        let provider = OsrmProvider::new(MockHttpClient::json(400, body));
        let err = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Automobile)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { ref code, .. } if code == "TooBig"));
        assert_eq!(err.class(), ErrorClass::Transient);
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let provider = OsrmProvider::new(MockHttpClient::json(429, "slow down"));
        let err = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Automobile)
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::RateLimited);
    }

    #[tokio::test]
    async fn test_server_error_without_json() {
        let provider = OsrmProvider::new(MockHttpClient::json(502, "<html>Bad Gateway</html>"));
        let err = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Automobile)
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::Http("HTTP 502".to_string()));
    }

    #[tokio::test]
    async fn test_garbage_success_body() {
        let provider = OsrmProvider::new(MockHttpClient::json(200, "not json"));
        let err = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Automobile)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let provider =
            OsrmProvider::new(MockHttpClient::failing(ProviderError::Http("timeout".into())));
        let err = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Automobile)
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Transient);
    }

    #[tokio::test]
    async fn test_ok_with_no_routes_is_empty() {
        let provider = OsrmProvider::new(MockHttpClient::json(200, r#"{"code": "Ok", "routes": []}"#));
        let routes = provider
            .compute_route(shanghai(), hangzhou(), TransportMode::Automobile)
            .await
            .unwrap();
        assert!(routes.is_empty());
    }
}
