//! Service layer: polling, user actions, and view lifetimes.
//!
//! [`StatePoller`] owns the snapshot refresh cadence, [`ActionDispatcher`]
//! turns user intents into remote calls and notifications, and
//! [`ViewSession`] starts and stops both with the open view.

pub mod dispatcher;
pub mod poller;
pub mod session;

pub use dispatcher::ActionDispatcher;
pub use poller::{PollOutcome, StatePoller};
pub use session::{ParseViewKindError, ViewKind, ViewSession};
