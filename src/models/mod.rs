//! Request and response types for the shelfcal API

pub mod calendar;

pub use calendar::{CalendarCreated, CalendarKind, TransitionResponse};
