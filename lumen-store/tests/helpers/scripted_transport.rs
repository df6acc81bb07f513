//! In-memory HTTP transport replaying scripted responses
//!
//! Responses are queued per `(method, path)` and consumed in order. A gated
//! response is held back until its sender fires, which lets tests control the
//! order in which overlapping requests complete.

use async_trait::async_trait;
use lumen_store::{ApiError, HttpRequest, HttpResponse, HttpTransport, Method};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

struct Scripted {
    result: Result<HttpResponse, ApiError>,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.script
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
    }

    /// Queue a response
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(
            method,
            path,
            Scripted {
                result: Ok(HttpResponse::new(status, body)),
                gate: None,
            },
        );
    }

    /// Queue a failure where no response arrives
    pub fn fail(&self, method: Method, path: &str, error: ApiError) {
        self.push(
            method,
            path,
            Scripted {
                result: Err(error),
                gate: None,
            },
        );
    }

    /// Queue a response released only when the returned sender fires
    pub fn respond_gated(&self, method: Method, path: &str, status: u16, body: Value) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(
            method,
            path,
            Scripted {
                result: Ok(HttpResponse::new(status, body)),
                gate: Some(rx),
            },
        );
        tx
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);

        let next = self
            .script
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted { result, gate }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => Ok(HttpResponse::new(
                404,
                json!({ "message": format!("no scripted response for {} {}", key.0, key.1) }),
            )),
        }
    }
}
