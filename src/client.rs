//! Core REST client and error types.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::http::{add_extra_headers, authorize, build_http_client};
use crate::model::Envelope;
use crate::options::ClientOptions;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Transport { status: StatusCode, body: String },

    /// A successful response carried no body to read a stream from.
    #[error("response body is not readable as a stream")]
    StreamUnavailable,

    /// The server reported an error in the middle of a stream.
    #[error("stream error: {0}")]
    Server(String),

    /// The envelope came back with `success: false`.
    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into [`ClientError::Api`].
    ///
    /// A missing `data` field is decoded as JSON `null`, so callers asking for
    /// `()` or `Option<_>` accept bodies like `{"success": true, "message": "ok"}`.
    pub fn into_data(self) -> Result<T, ClientError> {
        if !self.success {
            return Err(ClientError::Api(self.message));
        }
        match self.data {
            Some(data) => Ok(data),
            None => Ok(serde_json::from_value(Value::Null)?),
        }
    }
}

/// HTTP client for the backend REST API.
///
/// Holds one pooled `reqwest::Client` configured for ordinary calls and one
/// configured with the longer streaming timeout.
#[derive(Debug, Clone)]
pub struct ApiClient {
    options: ClientOptions,
    http: reqwest::Client,
    stream_http: reqwest::Client,
}

impl ApiClient {
    /// Create a client from options.
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let http = build_http_client(&options, options.timeout)?;
        let stream_http = build_http_client(&options, options.stream_timeout)?;
        Ok(Self {
            options,
            http,
            stream_http,
        })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientOptions::from_env()?)
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Identifier stamped on locally built messages.
    pub fn user_id(&self) -> &str {
        self.options.user_id.as_deref().unwrap_or_default()
    }

    fn request(&self, client: &reqwest::Client, method: Method, path: &str) -> RequestBuilder {
        let url = self.options.url(path);
        debug!("API request: {} {}", method, url);
        let req = authorize(client.request(method, url), &self.options.token);
        add_extra_headers(req, &self.options.extra_headers)
    }

    /// Send a request and unwrap the JSON envelope.
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("API error: {} {}", status, body);
            return Err(Self::handle_error_response(status, &body));
        }

        let envelope: Envelope<T> = response.json().await?;
        envelope.into_data()
    }

    /// Prefer the envelope's message over the raw body when there is one.
    fn handle_error_response(status: StatusCode, body: &str) -> ClientError {
        let body = match serde_json::from_str::<Envelope<Value>>(body) {
            Ok(envelope) if !envelope.message.is_empty() => envelope.message,
            _ => body.to_string(),
        };
        ClientError::Transport { status, body }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(&self.http, Method::GET, path)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.request(&self.http, Method::GET, path).query(query))
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(&self.http, Method::POST, path).json(body))
            .await
    }

    /// POST with no request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(&self.http, Method::POST, path)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(&self.http, Method::PUT, path).json(body))
            .await
    }

    /// PUT with no request body.
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(&self.http, Method::PUT, path)).await
    }

    /// Upload one file as the `file` field of a multipart form.
    pub async fn post_file<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<T, ClientError> {
        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name.to_string()));
        self.send(self.request(&self.http, Method::POST, path).multipart(form))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let _: Value = self
            .send(self.request(&self.http, Method::DELETE, path))
            .await?;
        Ok(())
    }

    /// Open a streaming POST and return the raw response, whatever its status.
    pub(crate) async fn post_stream<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self
            .request(&self.stream_http, Method::POST, path)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}
