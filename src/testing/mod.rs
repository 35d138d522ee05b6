//! Headless testing framework: the Pilot.
//!
//! Use the [`Pilot`] to drive an [`App`](crate::app::App) over a
//! [`HeadlessBackend`](crate::render::HeadlessBackend) the way a user would:
//! move, press, type, let time pass, and inspect what reached the backend.

pub mod pilot;

pub use pilot::Pilot;
