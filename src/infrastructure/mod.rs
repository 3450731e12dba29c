//! Infrastructure layer providing external service integrations.
//!
//! This module contains the QR-image endpoint client, the system clipboard
//! and ticket serialization. Failures here never reach the booking logic.

pub mod clipboard;
pub mod errors;
pub mod export;
pub mod qr;

pub use clipboard::*;
pub use errors::*;
pub use export::*;
pub use qr::*;
