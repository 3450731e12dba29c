//! busticket - Terminal Bus Ticket Booking
//!
//! A step-by-step booking wizard that issues a mock bus ticket with a
//! synthetic transaction ID and QR payload, built in Rust.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
