//! # ticket-sync
//!
//! Client-side synchronization core for an event-ticketing dashboard.
//!
//! The crate keeps a local snapshot of every event consistent with a
//! remote ticketing service, turns user actions (buy, start, stop,
//! delete, create) into remote calls, and streams the service's broadcast
//! activity log. Consistency is eventual: the remote service is the source
//! of truth and every successful poll replaces the snapshot wholesale.
//!
//! ## Architecture
//!
//! ```text
//! View (ViewSession)
//!     │
//!     ├── ActionDispatcher (service/) ──▶ RemoteClient (remote/)
//!     │         │                              ▲
//!     │         └─ request_refresh ─▶ StatePoller (service/)
//!     │                                        │
//!     ├── SnapshotStore (domain/) ◀────────────┘
//!     ├── Notifier (domain/)
//!     │
//!     └── LogStreamClient (ws/) ──▶ ListenerRegistry
//! ```

pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod remote;
pub mod service;
pub mod ws;
