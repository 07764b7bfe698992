//! `reqwest` implementation of the client transport seam.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::time::Duration;

use async_trait::async_trait;
use catweight_client::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(Duration::from_millis(request.timeout_ms));
        if let Some(value) = request.authorization() {
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(content_type) = request.body.content_type() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(payload) = request.body.payload() {
            builder = builder.body(payload.to_owned());
        }

        let response = builder.send().await.map_err(|e| transport_error(&e, request.timeout_ms))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| transport_error(&e, request.timeout_ms))?;
        Ok(HttpResponse::new(status, body))
    }
}

fn transport_error(err: &reqwest::Error, timeout_ms: u64) -> TransportError {
    tracing::debug!(error = %err, timeout = err.is_timeout(), "reqwest send failed");
    if err.is_timeout() {
        TransportError::timed_out(timeout_ms)
    } else {
        TransportError::failed(err.to_string())
    }
}
