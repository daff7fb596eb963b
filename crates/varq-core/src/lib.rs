//! Core library for varq.
//!
//! Validates client-supplied SQON filter trees against the static field
//! catalog, compiles them into a [`query::Query`] plan, and defines the
//! configuration, error, and output-record types shared by the server.

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod occurrence;
pub mod query;
pub mod sqon;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use filter::{CompareOp, FilterNode};
pub use occurrence::{Aggregation, Occurrence};
pub use query::{build_query, Pagination, Query, SortBody, SortField, SortOrder};
pub use sqon::Sqon;
