//! journal.record.v1 input schema
//!
//! This module defines the record shape accepted from the hosted store and
//! the adapter that turns it into typed pipeline records.

mod raw_record;
mod adapter;

pub use raw_record::*;
pub use adapter::*;
