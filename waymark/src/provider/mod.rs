//! Directions providers.
//!
//! The resolver talks to routing services through [`DirectionsProvider`].
//! [`OsrmProvider`] is the bundled implementation; HTTP goes through
//! [`AsyncHttpClient`] so tests can substitute canned responses.

mod http;
mod osrm;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpResponse, DEFAULT_TIMEOUT_SECS};
pub use osrm::{OsrmProvider, DEFAULT_OSRM_URL};
pub use types::{DirectionsProvider, ErrorClass, ProviderError, ProviderRoute};
