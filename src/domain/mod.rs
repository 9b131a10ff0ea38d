//! Domain layer: events, the snapshot store, and notifications.
//!
//! This module holds the client-side data model: event identity and
//! lifecycle, the immutable snapshot with its single-entry-point store,
//! transient purchase and creation requests, dashboard aggregates, and the
//! notification bus every failure is reported through.

pub mod draft;
pub mod event;
pub mod event_id;
pub mod metrics;
pub mod notification;
pub mod purchase;
pub mod snapshot;
pub mod store;

pub use draft::EventDraft;
pub use event::{Event, Lifecycle};
pub use event_id::EventId;
pub use metrics::DashboardMetrics;
pub use notification::{Notification, Notifier, Severity};
pub use purchase::PurchaseRequest;
pub use snapshot::Snapshot;
pub use store::{SnapshotAction, SnapshotStore};
