//! File formats described with `bytecraft` schemas.
//!
//! [bmp] and [dht] build their full layout from a header probe with
//! [bytecraft::builder::parse_dependent]. [registry::Registry] dispatches a file to one
//! of them by extension and falls back to a single opaque byte span.

pub mod bmp;
pub mod cli;
pub mod dht;
pub mod errors;
pub mod registry;
pub mod time;

pub use errors::{FormatError, Result};
pub use registry::Registry;
