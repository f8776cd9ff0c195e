//! Domain core for the mentorbook booking engine.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the API, and any future worker or CLI tooling.
//!
//! - [`slot`] — weekly time-slot model and the lock-union algebra.
//! - [`booking`] — payment/acceptance status constants and end-date math.
//! - [`amendment`] — amendment kinds, approval states, and the proposal
//!   and resolution rule set.
//! - [`error`] — the domain error taxonomy shared across crates.

pub mod amendment;
pub mod booking;
pub mod error;
pub mod slot;
pub mod types;
