//! PRONTIO front-end logic without the DOM.
//!
//! [`dispatcher`] is the only module that talks to the network. Page
//! controllers in [`pages`] combine it with the [`session`] and the pure
//! views in [`agenda_view`] and [`listing`].

pub mod agenda_view;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod listing;
pub mod pages;
pub mod session;

pub use agenda_view::{classify, filter_slots, DayView, SlotAction, SlotRow, StatusFilter};
pub use config::ClientConfig;
pub use dispatcher::ApiClient;
pub use error::{ClientError, Result};
pub use listing::{normalize_text, project, ListQuery, Listable, SortKey};
pub use session::{ContextoAgenda, PacienteAtual, Session, Tema};
