//! Data sources other than user uploads.

pub mod sample;

pub use sample::*;
