//! Sales CSV dashboard pipeline
//!
//! One upload in, five derived views out: decode the buffer, parse it into a
//! typed table, aggregate, and render the charts plus a static page.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingest;
pub mod render;
