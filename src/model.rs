//! Core data model for the launch ingester.
//!
//! These types describe what flows through a run:
//! launch records in, page requests out, and the derived aggregate row.

mod aggregate;
#[cfg(test)]
pub mod fixtures;
mod launch;
mod query;

pub use aggregate::AggregateRow;
pub use launch::LaunchRecord;
pub use query::{DateAfter, LaunchFilter, QueryOptions, QueryPage, QueryRequest, SortOrder, SortSpec};
