//! The shared HTTP client and response decoding
use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Header carrying the bearer token on every storage request
pub(crate) const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// One client for the whole process.  reqwest pools connections internally and
/// a `Client` is safe to share between tasks.
pub(crate) static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(Client::new);

pub(crate) fn add_auth_headers(request: RequestBuilder, auth_token: &str) -> RequestBuilder {
    request
        .header(AUTH_TOKEN_HEADER, auth_token)
        .header("content-type", "application/json")
}

/// Reads the whole body and decodes it as a single JSON document.
///
/// The body is consumed on every path, so the connection goes back to the pool
/// whether or not decoding succeeds.
pub(crate) async fn read_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let body = response.bytes().await?;
    decode_json(&body)
}

/// An empty (or whitespace only) body and a bare `null` both decode to the
/// zero value.  Whitespace around the document is fine, anything else after
/// it is an error.
pub(crate) fn decode_json<T>(body: &Bytes) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice::<Option<T>>(body)?.unwrap_or_default())
}
