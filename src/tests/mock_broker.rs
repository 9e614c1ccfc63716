//! In-process stand-in for the emulator's REST surface.
//!
//! Implements just enough of topics, subscriptions, publish, pull and
//! acknowledge for the client to be exercised over real HTTP. Requests are
//! recorded so tests can assert what went over the wire.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    data: String,
    attributes: Value,
    message_id: String,
    publish_time: String,
}

impl StoredMessage {
    fn to_json(&self) -> Value {
        json!({
            "data": self.data,
            "attributes": self.attributes,
            "messageId": self.message_id,
            "publishTime": self.publish_time,
        })
    }
}

#[derive(Debug)]
struct SubscriptionState {
    topic: String,
    ack_deadline_seconds: u64,
    pending: Vec<StoredMessage>,
    outstanding: HashMap<String, StoredMessage>,
}

#[derive(Debug, Default)]
struct Emulator {
    topics: BTreeMap<String, Value>,
    subscriptions: BTreeMap<String, SubscriptionState>,
    requests: Vec<RecordedRequest>,
    next_message_id: u64,
    fail_next: Option<(StatusCode, String)>,
}

type Shared = Arc<Mutex<Emulator>>;

pub struct MockBroker {
    pub base_url: String,
    state: Shared,
}

impl MockBroker {
    /// Binds an ephemeral port and serves until the test runtime shuts down.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Emulator::default()));
        let app = Router::new().fallback(dispatch).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock broker");
        let addr = listener.local_addr().expect("mock broker addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock broker serve");
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            state,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Makes the next request fail with `status` and an error envelope.
    pub fn fail_next(&self, status: StatusCode, message: &str) {
        self.state.lock().unwrap().fail_next = Some((status, message.to_string()));
    }

    /// Number of delivered-but-unacknowledged messages on a subscription.
    pub fn outstanding(&self, subscription: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .get(subscription)
            .map(|s| s.outstanding.len())
            .unwrap_or(0)
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
            "status": status.canonical_reason().unwrap_or("ERROR"),
        }
    });
    (status, axum::Json(body)).into_response()
}

fn ok(body: Value) -> Response {
    (StatusCode::OK, axum::Json(body)).into_response()
}

async fn dispatch(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let path = uri
        .path()
        .strip_prefix("/v1/")
        .unwrap_or(uri.path())
        .to_string();

    let mut emulator = state.lock().unwrap();
    emulator.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: body.clone(),
    });
    if let Some((status, message)) = emulator.fail_next.take() {
        return error(status, &message);
    }

    let (resource, action) = match path.rsplit_once(':') {
        Some((resource, action)) => (resource.to_string(), Some(action.to_string())),
        None => (path.clone(), None),
    };
    let segments: Vec<&str> = resource.split('/').collect();

    match (method, segments.as_slice(), action.as_deref()) {
        (Method::GET, ["projects", project, "topics"], None) => {
            let prefix = format!("projects/{}/topics/", project);
            let topics: Vec<Value> = emulator
                .topics
                .iter()
                .filter(|(name, _)| name.starts_with(&prefix))
                .map(|(_, topic)| topic.clone())
                .collect();
            if topics.is_empty() {
                ok(json!({}))
            } else {
                ok(json!({ "topics": topics }))
            }
        }
        (Method::PUT, ["projects", _, "topics", id], None) => {
            if id.is_empty() || id.starts_with("goog") {
                return error(StatusCode::BAD_REQUEST, "Invalid [topics] name");
            }
            if emulator.topics.contains_key(&resource) {
                return error(StatusCode::CONFLICT, "Topic already exists");
            }
            let topic = json!({ "name": resource });
            emulator.topics.insert(resource.clone(), topic.clone());
            ok(topic)
        }
        (Method::DELETE, ["projects", _, "topics", _], None) => {
            if emulator.topics.remove(&resource).is_none() {
                return error(StatusCode::NOT_FOUND, "Topic not found");
            }
            for sub in emulator.subscriptions.values_mut() {
                if sub.topic == resource {
                    sub.topic = "_deleted-topic_".to_string();
                }
            }
            ok(json!({}))
        }
        (Method::GET, ["projects", _, "topics", _, "subscriptions"], None) => {
            let topic = segments[..4].join("/");
            let names: Vec<&String> = emulator
                .subscriptions
                .iter()
                .filter(|(_, sub)| sub.topic == topic)
                .map(|(name, _)| name)
                .collect();
            ok(json!({ "subscriptions": names }))
        }
        (Method::POST, ["projects", _, "topics", _], Some("publish")) => {
            if !emulator.topics.contains_key(&resource) {
                return error(StatusCode::NOT_FOUND, "Topic not found");
            }
            let messages = body
                .as_ref()
                .and_then(|b| b.get("messages"))
                .and_then(|m| m.as_array())
                .cloned()
                .unwrap_or_default();
            let mut ids = Vec::new();
            for message in messages {
                emulator.next_message_id += 1;
                let stored = StoredMessage {
                    data: message["data"].as_str().unwrap_or_default().to_string(),
                    attributes: message.get("attributes").cloned().unwrap_or(json!({})),
                    message_id: emulator.next_message_id.to_string(),
                    publish_time: chrono::Utc::now().to_rfc3339(),
                };
                ids.push(stored.message_id.clone());
                for sub in emulator.subscriptions.values_mut() {
                    if sub.topic == resource {
                        sub.pending.push(stored.clone());
                    }
                }
            }
            ok(json!({ "messageIds": ids }))
        }
        (Method::GET, ["projects", project, "subscriptions"], None) => {
            let prefix = format!("projects/{}/subscriptions/", project);
            let subs: Vec<Value> = emulator
                .subscriptions
                .iter()
                .filter(|(name, _)| name.starts_with(&prefix))
                .map(|(name, sub)| {
                    json!({
                        "name": name,
                        "topic": sub.topic,
                        "ackDeadlineSeconds": sub.ack_deadline_seconds,
                    })
                })
                .collect();
            if subs.is_empty() {
                ok(json!({}))
            } else {
                ok(json!({ "subscriptions": subs }))
            }
        }
        (Method::PUT, ["projects", _, "subscriptions", _], None) => {
            let topic = body
                .as_ref()
                .and_then(|b| b.get("topic"))
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string();
            if !emulator.topics.contains_key(&topic) {
                return error(StatusCode::NOT_FOUND, "Topic not found");
            }
            if emulator.subscriptions.contains_key(&resource) {
                return error(StatusCode::CONFLICT, "Subscription already exists");
            }
            let ack_deadline_seconds = body
                .as_ref()
                .and_then(|b| b.get("ackDeadlineSeconds"))
                .and_then(|d| d.as_u64())
                .unwrap_or(10);
            emulator.subscriptions.insert(
                resource.clone(),
                SubscriptionState {
                    topic: topic.clone(),
                    ack_deadline_seconds,
                    pending: Vec::new(),
                    outstanding: HashMap::new(),
                },
            );
            ok(json!({
                "name": resource,
                "topic": topic,
                "ackDeadlineSeconds": ack_deadline_seconds,
            }))
        }
        (Method::DELETE, ["projects", _, "subscriptions", _], None) => {
            if emulator.subscriptions.remove(&resource).is_none() {
                return error(StatusCode::NOT_FOUND, "Subscription does not exist");
            }
            ok(json!({}))
        }
        (Method::POST, ["projects", _, "subscriptions", _], Some("pull")) => {
            let max = body
                .as_ref()
                .and_then(|b| b.get("maxMessages"))
                .and_then(|m| m.as_u64())
                .unwrap_or(1) as usize;
            let Some(sub) = emulator.subscriptions.get_mut(&resource) else {
                return error(StatusCode::NOT_FOUND, "Subscription does not exist");
            };
            let take = max.min(sub.pending.len());
            let mut received = Vec::new();
            for message in sub.pending.drain(..take).collect::<Vec<_>>() {
                let ack_id = uuid::Uuid::new_v4().to_string();
                received.push(json!({ "ackId": ack_id, "message": message.to_json() }));
                sub.outstanding.insert(ack_id, message);
            }
            if received.is_empty() {
                ok(json!({}))
            } else {
                ok(json!({ "receivedMessages": received }))
            }
        }
        (Method::POST, ["projects", _, "subscriptions", _], Some("acknowledge")) => {
            let ack_ids: Vec<String> = body
                .as_ref()
                .and_then(|b| b.get("ackIds"))
                .and_then(|ids| serde_json::from_value(ids.clone()).ok())
                .unwrap_or_default();
            let Some(sub) = emulator.subscriptions.get_mut(&resource) else {
                return error(StatusCode::NOT_FOUND, "Subscription does not exist");
            };
            if ack_ids.iter().any(|id| !sub.outstanding.contains_key(id)) {
                return error(StatusCode::BAD_REQUEST, "Invalid ack ID");
            }
            for id in &ack_ids {
                sub.outstanding.remove(id);
            }
            ok(json!({}))
        }
        _ => error(StatusCode::NOT_FOUND, "Not found"),
    }
}
