//! Wire types shared by the PRONTIO server and its clients.
//!
//! Every call is a single `POST` carrying an [`ActionRequest`] and answered
//! with an [`ApiResponse`]. The server routes on the action name through the
//! priority list in [`action`]; the client normalises whatever comes back
//! through [`ApiResponse::from_value`].

pub mod action;
pub mod envelope;
pub mod models;
pub mod slot;

pub use action::{route, ActionGroup, RoutedAction, ROUTES};
pub use envelope::{ActionError, ActionRequest, ApiError, ApiResponse, MalformedResponse};
pub use models::*;
pub use slot::{DaySchedule, DaySummary, Slot, SlotStatus};
