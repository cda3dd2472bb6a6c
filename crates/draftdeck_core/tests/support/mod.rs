#![allow(dead_code)]

use async_trait::async_trait;
use draftdeck_core::api::{ApiRequest, DocTransport, Method, RawResponse, TransportError};
use draftdeck_core::{
    ClientConfig, CredentialRepository, SameSectionPolicy, SqliteCredentialRepository, Workbench,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

enum Reply {
    Ready(Result<RawResponse, TransportError>),
    Gated(oneshot::Receiver<RawResponse>),
}

/// Scripted DocService: replies are queued per `(method, path)` and
/// consumed in order. Unscripted routes answer 404.
#[derive(Default)]
pub struct StubTransport {
    requests: Mutex<Vec<ApiRequest>>,
    routes: Mutex<HashMap<(String, String), VecDeque<Reply>>>,
}

fn key(method: Method, path: &str) -> (String, String) {
    (method.to_string(), path.to_string())
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry(key(method, path))
            .or_default()
            .push_back(reply);
    }

    pub fn respond(&self, method: Method, path: &str, response: RawResponse) {
        self.push(method, path, Reply::Ready(Ok(response)));
    }

    pub fn respond_json(&self, method: Method, path: &str, body: Value) {
        self.respond(method, path, json_response(200, body));
    }

    pub fn fail_network(&self, method: Method, path: &str, message: &str) {
        self.push(
            method,
            path,
            Reply::Ready(Err(TransportError(message.to_string()))),
        );
    }

    /// Queues a reply that is only delivered when the returned sender fires.
    pub fn gate(&self, method: Method, path: &str) -> oneshot::Sender<RawResponse> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, Reply::Gated(rx));
        tx
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

#[async_trait]
impl DocTransport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let route = key(request.method, &request.path);
        self.requests.lock().unwrap().push(request);
        let reply = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx)) => rx
                .await
                .map_err(|_| TransportError("gate dropped".to_string())),
            None => Ok(text_response(404, "no stub route")),
        }
    }
}

pub fn json_response(status: u16, body: Value) -> RawResponse {
    RawResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: body.to_string().into_bytes(),
    }
}

pub fn text_response(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        content_type: Some("text/plain; charset=utf-8".to_string()),
        body: body.as_bytes().to_vec(),
    }
}

pub fn bytes_response(body: &[u8]) -> RawResponse {
    RawResponse {
        status: 200,
        content_type: Some(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
        ),
        body: body.to_vec(),
    }
}

pub fn section_json(id: i64, title: &str, order: u32, content: Option<&str>) -> Value {
    json!({ "id": id, "title": title, "order": order, "content": content })
}

pub fn project_json(id: i64, title: &str, doc_type: &str, sections: Vec<Value>) -> Value {
    json!({
        "id": id,
        "title": title,
        "topic": "quarterly sales",
        "doc_type": doc_type,
        "created_at": "2024-10-01T12:00:00",
        "sections": sections,
    })
}

pub fn identity_json() -> Value {
    json!({ "id": 1, "email": "ana@example.com", "full_name": "Ana Ruiz", "created_at": "2024-10-01T12:00:00" })
}

pub struct Harness {
    pub transport: Arc<StubTransport>,
    pub repo: Arc<SqliteCredentialRepository>,
    pub workbench: Workbench,
}

pub fn harness() -> Harness {
    harness_with_policy(SameSectionPolicy::Race)
}

pub fn harness_with_policy(policy: SameSectionPolicy) -> Harness {
    let transport = StubTransport::new();
    let repo = Arc::new(SqliteCredentialRepository::in_memory().unwrap());
    let mut config = ClientConfig::new("http://docs.test", "/nonexistent/draftdeck").unwrap();
    config.same_section_policy = policy;
    let workbench = Workbench::new(
        &config,
        transport.clone(),
        repo.clone() as Arc<dyn CredentialRepository>,
    );
    Harness {
        transport,
        repo,
        workbench,
    }
}

/// Logs the harness in with an empty project list.
pub async fn logged_in(h: &Harness) {
    logged_in_with_projects(h, vec![]).await;
}

pub async fn logged_in_with_projects(h: &Harness, projects: Vec<Value>) {
    h.transport.respond_json(
        Method::Post,
        "/auth/login",
        json!({ "access_token": "tok-1", "token_type": "bearer" }),
    );
    h.transport
        .respond_json(Method::Get, "/auth/me", identity_json());
    h.transport
        .respond_json(Method::Get, "/projects", Value::Array(projects));
    h.workbench
        .login("ana@example.com", "secret")
        .await
        .expect("scripted login should succeed");
}
