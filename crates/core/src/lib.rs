//! # Studio Core
//!
//! Domain models, the error type shared by every crate, and the pure
//! algorithms behind the studio: booking conflict detection, originals
//! matching and delivery packaging, image compression, object-key naming
//! and payment summaries.

pub mod compress;
pub mod conflict;
pub mod errors;
pub mod finance;
pub mod models;
pub mod naming;
pub mod originals;
pub mod time_format;
