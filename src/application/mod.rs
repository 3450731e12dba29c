//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer:
//! the booking state, the step-table wizard that drives it, the mock
//! configuration, and the terminal UI state.

pub mod booking;
pub mod config;
pub mod state;
pub mod wizard;

pub use booking::*;
pub use config::*;
pub use state::*;
pub use wizard::*;
