//! Credential decorators for [`HttpClient`](crate::fetch::HttpClient).
//!
//! The HERE geocoder takes its key as the `apiKey` query parameter
//! ([`UrlParam`]); the RDW Socrata endpoints accept an optional app token
//! header ([`ApiKey`]).

mod api_key;
mod url_param;

pub use api_key::ApiKey;
pub use url_param::UrlParam;
