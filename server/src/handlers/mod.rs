//! Request handlers for table operations.

mod tables;

pub use tables::*;
