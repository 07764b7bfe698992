//! `gloo-net` transport for the browser.
//!
//! Requests race a `gloo-timers` timeout; whichever finishes first wins and
//! the loser is dropped, which aborts the pending `fetch` future.

use async_trait::async_trait;
use futures::future::{self, Either};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;

use super::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport, TransportError};

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Put => Request::put(&request.url),
            Method::Delete => Request::delete(&request.url),
        };
        if let Some(value) = request.authorization() {
            builder = builder.header("Authorization", &value);
        }
        if let Some(content_type) = request.body.content_type() {
            builder = builder.header("Content-Type", content_type);
        }
        let built = match request.body {
            RequestBody::Empty => builder.build(),
            RequestBody::Json(raw) | RequestBody::Form(raw) => builder.body(raw),
        }
        .map_err(|e| TransportError::failed(e.to_string()))?;

        let timeout_ms = u32::try_from(request.timeout_ms).unwrap_or(u32::MAX);
        let send = built.send();
        let timeout = TimeoutFuture::new(timeout_ms);
        futures::pin_mut!(send, timeout);

        match future::select(send, timeout).await {
            Either::Left((result, _)) => {
                let response = result.map_err(|e| TransportError::failed(e.to_string()))?;
                let status = response.status();
                let body = response.text().await.map_err(|e| TransportError::failed(e.to_string()))?;
                Ok(HttpResponse { status, body })
            }
            Either::Right(((), _)) => Err(TransportError::timed_out(request.timeout_ms)),
        }
    }
}
