//! In-process fake ticketing service for integration tests.
//!
//! Serves the REST endpoints under `/api/v1` and the push channel at
//! `/ticketUpdates` on an ephemeral port. Mutations update the fake's
//! event list so that later polls observe them, the way the real service
//! behaves.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::{broadcast, oneshot, watch};

use ticket_sync::config::SyncConfig;

/// Upper bound for any wait in the integration tests.
pub const WAIT: Duration = Duration::from_secs(5);

/// A canned reply for the next mutating call.
#[derive(Debug, Clone)]
pub struct Reply {
    /// HTTP status.
    pub status: u16,
    /// Raw body text.
    pub body: String,
}

impl Reply {
    /// A reply with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone)]
enum Push {
    Text(String),
    Kick,
}

struct FakeState {
    events: Mutex<Vec<Value>>,
    list_calls: watch::Sender<usize>,
    fail_list: AtomicBool,
    list_gate: Mutex<Option<oneshot::Receiver<()>>>,
    next_reply: Mutex<Option<Reply>>,
    purchases: Mutex<Vec<Value>>,
    mutations: Mutex<Vec<String>>,
    mutation_calls: AtomicUsize,
    ws_upgrades: watch::Sender<usize>,
    ws_closed: watch::Sender<usize>,
    push: broadcast::Sender<Push>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a running fake service.
pub struct FakeService {
    state: Arc<FakeState>,
    addr: SocketAddr,
}

impl FakeService {
    /// Binds to `127.0.0.1:0` and starts serving.
    pub async fn start() -> Self {
        let (list_calls, _) = watch::channel(0);
        let (ws_upgrades, _) = watch::channel(0);
        let (ws_closed, _) = watch::channel(0);
        let (push, _) = broadcast::channel(64);
        let state = Arc::new(FakeState {
            events: Mutex::new(Vec::new()),
            list_calls,
            fail_list: AtomicBool::new(false),
            list_gate: Mutex::new(None),
            next_reply: Mutex::new(None),
            purchases: Mutex::new(Vec::new()),
            mutations: Mutex::new(Vec::new()),
            mutation_calls: AtomicUsize::new(0),
            ws_upgrades,
            ws_closed,
            push,
        });

        let app = Router::new()
            .route("/api/v1/events/getAllEvents", get(list_events))
            .route("/api/v1/events/addEvent", post(add_event))
            .route("/api/v1/events/startEvent/{id}", post(start_event))
            .route("/api/v1/events/stopEvent/{id}", post(stop_event))
            .route("/api/v1/events/deleteEvent/{id}", delete(delete_event))
            .route("/api/v1/ticket/purchaseTicket", post(purchase_ticket))
            .route("/ticketUpdates", get(ticket_updates))
            .with_state(Arc::clone(&state));

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("failed to bind fake service");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("fake service has no local address");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { state, addr }
    }

    /// Client configuration pointed at this service.
    pub fn config(&self) -> SyncConfig {
        SyncConfig::for_host(&self.addr.to_string())
    }

    /// Base URL of the REST endpoints.
    pub fn api_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// URL of the push channel.
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ticketUpdates", self.addr)
    }

    /// Replaces the event list.
    pub fn set_events(&self, events: Vec<Value>) {
        *lock(&self.state.events) = events;
    }

    /// Makes every list call fail with a 500 until reset.
    pub fn fail_list(&self, fail: bool) {
        self.state.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Holds the next list call after it has read the event list, until the
    /// returned sender fires (or is dropped).
    pub fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        *lock(&self.state.list_gate) = Some(gate);
        release
    }

    /// Number of list calls received so far.
    pub fn list_calls(&self) -> usize {
        *self.state.list_calls.borrow()
    }

    /// Waits until at least `n` list calls have been received.
    pub async fn wait_for_list_calls(&self, n: usize) {
        let mut rx = self.state.list_calls.subscribe();
        let waited = tokio::time::timeout(WAIT, rx.wait_for(|calls| *calls >= n)).await;
        if !matches!(waited, Ok(Ok(_))) {
            panic!("expected {n} list calls, saw {}", self.list_calls());
        }
    }

    /// Overrides the reply to the next mutating call.
    pub fn reply_next(&self, reply: Reply) {
        *lock(&self.state.next_reply) = Some(reply);
    }

    /// Purchase bodies received so far.
    pub fn purchases(&self) -> Vec<Value> {
        lock(&self.state.purchases).clone()
    }

    /// Log of mutating calls, e.g. `"start 5"`.
    pub fn mutations(&self) -> Vec<String> {
        lock(&self.state.mutations).clone()
    }

    /// Number of mutating calls, including rejected ones.
    pub fn mutation_calls(&self) -> usize {
        self.state.mutation_calls.load(Ordering::SeqCst)
    }

    /// Number of WebSocket upgrades served.
    pub fn ws_upgrades(&self) -> usize {
        *self.state.ws_upgrades.borrow()
    }

    /// Waits until at least `n` WebSocket upgrades have been served.
    pub async fn wait_for_ws_upgrades(&self, n: usize) {
        let mut rx = self.state.ws_upgrades.subscribe();
        let waited = tokio::time::timeout(WAIT, rx.wait_for(|count| *count >= n)).await;
        if !matches!(waited, Ok(Ok(_))) {
            panic!("expected {n} websocket upgrades, saw {}", self.ws_upgrades());
        }
    }

    /// Number of WebSocket sessions that have ended.
    pub fn ws_closed(&self) -> usize {
        *self.state.ws_closed.borrow()
    }

    /// Waits until at least `n` WebSocket sessions have ended.
    pub async fn wait_for_ws_closed(&self, n: usize) {
        let mut rx = self.state.ws_closed.subscribe();
        let waited = tokio::time::timeout(WAIT, rx.wait_for(|count| *count >= n)).await;
        if !matches!(waited, Ok(Ok(_))) {
            panic!("expected {n} closed websockets, saw {}", self.ws_closed());
        }
    }

    /// Sends a raw text frame to every connected socket.
    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.state.push.send(Push::Text(text.into()));
    }

    /// Sends a `{ "logMessage": .. }` frame to every connected socket.
    pub fn push_log(&self, message: &str) {
        self.push_text(json!({ "logMessage": message }).to_string());
    }

    /// Closes every connected socket from the server side.
    pub fn kick(&self) {
        let _ = self.state.push.send(Push::Kick);
    }
}

/// Event JSON in the service's wire shape.
pub fn event_json(id: i64, name: &str, price: f64, started: bool, completed: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "location": "Colombo",
        "date": "2024-12-01",
        "time": "18:00",
        "description": "An evening event",
        "imageUrl": "https://img.example/event.jpg",
        "ticketPrice": price,
        "totalTickets": 100,
        "soldTickets": 0,
        "availableTickets": 100,
        "maxTicketCapacity": 20,
        "ticketReleaseRate": 2.0,
        "customerRetrievalRate": 1.0,
        "started": started,
        "completed": completed,
    })
}

fn take_reply(state: &FakeState) -> Option<Reply> {
    lock(&state.next_reply).take()
}

fn reply_response(reply: Reply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, reply.body).into_response()
}

fn record_mutation(state: &FakeState, entry: String) {
    state.mutation_calls.fetch_add(1, Ordering::SeqCst);
    lock(&state.mutations).push(entry);
}

fn update_event(state: &FakeState, id: i64, apply: impl Fn(&mut serde_json::Map<String, Value>)) {
    let mut events = lock(&state.events);
    for event in events.iter_mut() {
        if event.get("id").and_then(Value::as_i64) == Some(id)
            && let Some(fields) = event.as_object_mut()
        {
            apply(fields);
        }
    }
}

async fn list_events(State(state): State<Arc<FakeState>>) -> Response {
    let events = lock(&state.events).clone();
    state.list_calls.send_modify(|calls| *calls += 1);

    let gate = lock(&state.list_gate).take();
    if let Some(gate) = gate {
        let _ = gate.await;
    }

    if state.fail_list.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Database unavailable" })),
        )
            .into_response();
    }
    Json(Value::Array(events)).into_response()
}

async fn add_event(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    record_mutation(&state, "create".to_string());
    if let Some(reply) = take_reply(&state) {
        return reply_response(reply);
    }
    let mut events = lock(&state.events);
    let next_id = events
        .iter()
        .filter_map(|e| e.get("id").and_then(Value::as_i64))
        .max()
        .unwrap_or(0)
        + 1;
    let mut created = body;
    if let Some(fields) = created.as_object_mut() {
        fields.insert("id".to_string(), json!(next_id));
        fields.insert("soldTickets".to_string(), json!(0));
        fields.insert("completed".to_string(), json!(false));
    }
    events.push(created.clone());
    Json(created).into_response()
}

async fn start_event(State(state): State<Arc<FakeState>>, Path(id): Path<i64>) -> Response {
    record_mutation(&state, format!("start {id}"));
    if let Some(reply) = take_reply(&state) {
        return reply_response(reply);
    }
    update_event(&state, id, |fields| {
        fields.insert("started".to_string(), json!(true));
    });
    (StatusCode::OK, String::new()).into_response()
}

async fn stop_event(State(state): State<Arc<FakeState>>, Path(id): Path<i64>) -> Response {
    record_mutation(&state, format!("stop {id}"));
    if let Some(reply) = take_reply(&state) {
        return reply_response(reply);
    }
    update_event(&state, id, |fields| {
        fields.insert("completed".to_string(), json!(true));
    });
    (StatusCode::OK, "Event stopped").into_response()
}

async fn delete_event(State(state): State<Arc<FakeState>>, Path(id): Path<i64>) -> Response {
    record_mutation(&state, format!("delete {id}"));
    if let Some(reply) = take_reply(&state) {
        return reply_response(reply);
    }
    lock(&state.events).retain(|e| e.get("id").and_then(Value::as_i64) != Some(id));
    (StatusCode::OK, String::new()).into_response()
}

async fn purchase_ticket(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    record_mutation(&state, "purchase".to_string());
    lock(&state.purchases).push(body.clone());
    if let Some(reply) = take_reply(&state) {
        return reply_response(reply);
    }
    let id = body.get("ticketId").and_then(Value::as_i64).unwrap_or_default();
    let count = body.get("ticketCount").and_then(Value::as_i64).unwrap_or_default();
    update_event(&state, id, |fields| {
        let sold = fields.get("soldTickets").and_then(Value::as_i64).unwrap_or(0);
        fields.insert("soldTickets".to_string(), json!(sold + count));
    });
    Json(json!({ "message": format!("Purchased {count} tickets") })).into_response()
}

async fn ticket_updates(State(state): State<Arc<FakeState>>, ws: WebSocketUpgrade) -> Response {
    let push = state.push.subscribe();
    state.ws_upgrades.send_modify(|count| *count += 1);
    ws.on_upgrade(move |socket| async move {
        serve_socket(socket, push).await;
        state.ws_closed.send_modify(|count| *count += 1);
    })
}

async fn serve_socket(mut socket: WebSocket, mut push: broadcast::Receiver<Push>) {
    loop {
        tokio::select! {
            pushed = push.recv() => match pushed {
                Ok(Push::Text(text)) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        return;
                    }
                }
                Ok(Push::Kick) | Err(_) => {
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                }
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                Some(Ok(_)) => {}
            },
        }
    }
}
