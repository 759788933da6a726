//! leeslog: a personal reading log.
//!
//! Books are looked up on bol.com, rated and dated by the user and stored in a
//! Deta Base collection. The dashboard aggregates the stored records into
//! yearly totals and monthly series.

pub mod app;
pub mod modules;
pub mod utils;

pub use modules::books;
