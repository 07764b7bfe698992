//! Scripted transport for tests.
//!
//! Replies are consumed in request order. A gated reply parks the request
//! until the test sends a response through the returned channel, which lets
//! tests interleave overlapping operations deterministically.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;

use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};

enum Reply {
    Ready(Result<HttpResponse, TransportError>),
    Gated(oneshot::Receiver<HttpResponse>),
}

#[derive(Default)]
struct FakeState {
    replies: VecDeque<Reply>,
    requests: Vec<HttpRequest>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    state: Rc<RefCell<FakeState>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, status: u16, body: serde_json::Value) -> &Self {
        self.push(Reply::Ready(Ok(HttpResponse::new(status, body.to_string()))));
        self
    }

    pub(crate) fn reply_raw(&self, status: u16, body: &str) -> &Self {
        self.push(Reply::Ready(Ok(HttpResponse::new(status, body))));
        self
    }

    pub(crate) fn fail(&self, err: TransportError) -> &Self {
        self.push(Reply::Ready(Err(err)));
        self
    }

    pub(crate) fn gate(&self) -> oneshot::Sender<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.push(Reply::Gated(rx));
        tx
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.state.borrow().requests.len()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.state.borrow().requests.iter().map(|r| r.url.clone()).collect()
    }

    fn push(&self, reply: Reply) {
        self.state.borrow_mut().replies.push_back(reply);
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = {
            let mut state = self.state.borrow_mut();
            state.requests.push(request);
            state.replies.pop_front()
        };
        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx)) => rx.await.map_err(|_| TransportError::failed("gate dropped")),
            None => Err(TransportError::failed("no scripted reply")),
        }
    }
}
