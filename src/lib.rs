//! Scan QR codes from images or a live frame feed, generate QR codes from
//! text, and keep a local history of every distinct code scanned.
//!
//! - [`store`]: the scan history and the settings slot it persists to
//! - [`scan`]: static image decoding and the live feed worker
//! - [`generate`]: text to QR image
//! - [`report`]: text exports, history table and JSON

pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod platform;
pub mod report;
pub mod scan;
pub mod store;

pub use error::{Error, Result};
