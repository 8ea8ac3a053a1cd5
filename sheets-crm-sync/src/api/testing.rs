//! Scripted transport for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;

use super::transport::{CrmRequest, HttpResponse, Transport, TransportError};

type Responder = Box<dyn Fn(&CrmRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

/// Replays queued outcomes in order, then falls back to a responder
/// (or a 500 when none is set). Every request is recorded.
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<CrmRequest>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            responder: None,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every unscripted request through a closure
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&CrmRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::new()
        }
    }

    pub fn then_status(self, status: u16, body: &str) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn then_transport_error(self, message: &str) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(message)));
        self
    }

    pub fn requests(&self) -> Vec<CrmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_with_method(&self, method: Method) -> Vec<CrmRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &CrmRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(next) = self.queue.lock().unwrap().pop_front() {
            return next;
        }
        match &self.responder {
            Some(responder) => responder(request),
            None => Ok(HttpResponse::new(500, "unscripted request")),
        }
    }
}
