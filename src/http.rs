//! HTTP client utilities shared by the REST wrappers and the chat stream.
//!
//! This module provides reusable HTTP client construction and
//! request decoration logic.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;
use std::time::Duration;

use crate::options::{ClientOptions, SecretString};

/// Build a configured HTTP client from client options.
///
/// This applies common configuration like timeouts and proxies. `timeout`
/// overrides the REST timeout from the options, which lets the chat stream
/// use its longer budget.
///
/// # Example
/// ```ignore
/// let client = build_http_client(&options, options.timeout)?;
/// ```
pub fn build_http_client(
    options: &ClientOptions,
    timeout: Option<Duration>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &options.proxy {
        if let Ok(proxy) = reqwest::Proxy::all(proxy_url) {
            builder = builder.proxy(proxy);
        }
    }

    builder.build()
}

/// Add extra headers to a request if specified in the options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// Attach the bearer token, when one is configured.
pub fn authorize(request: RequestBuilder, token: &Option<SecretString>) -> RequestBuilder {
    match token {
        Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret())),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let options = ClientOptions::default().with_token("test");
        let client = build_http_client(&options, options.timeout);
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let options = ClientOptions::default().with_proxy("http://proxy.example.com:8080".to_string());
        let client = build_http_client(&options, None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_authorize_sets_bearer_header() {
        let client = Client::new();
        let token = Some(SecretString::from("abc"));
        let request = authorize(client.get("http://localhost/x"), &token)
            .build()
            .unwrap();
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer abc");
    }

    #[test]
    fn test_extra_headers_applied() {
        let client = Client::new();
        let mut headers = HashMap::new();
        headers.insert("x-trace".to_string(), "1".to_string());
        let request = add_extra_headers(client.get("http://localhost/x"), &Some(headers))
            .build()
            .unwrap();
        assert_eq!(request.headers()["x-trace"], "1");
    }
}
