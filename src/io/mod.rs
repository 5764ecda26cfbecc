//! Ambient I/O layer: CSV in, CSV out. No core numerical logic lives here
//! (spec.md §9's "core layer" note) — only parsing, memoisation, and
//! formatting.

pub mod kv;
pub mod output;
pub mod series;
