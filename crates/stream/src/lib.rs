//! Chunked-stream decoding for Palisade.
//!
//! The remote inference service answers over an incremental text-event
//! protocol (SSE-like). This crate turns raw, arbitrarily-split chunks
//! into typed `StreamEvent`s in strict arrival order and tracks the
//! out-of-band usage/limit metadata the service interleaves with
//! content.

pub mod control;
pub mod decoder;
pub mod usage;

pub use control::sniff_control;
pub use decoder::StreamDecoder;
pub use usage::{ResourceUsage, UsageMeter, UsageSnapshot};
