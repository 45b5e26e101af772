//! REDCap access for the enrollment report.
//!
//! [`RedcapClient`] talks to a live project over the REDCap API;
//! [`FixtureSource`] serves the same data from JSON files on disk. Both
//! implement [`enrollment_core::RecordSource`].

pub mod client;
pub mod error;
pub mod fixture;
pub mod records;

pub use client::{Content, DEFAULT_RECORD_ID_FIELD, RedcapClient, form_params};
pub use error::{RedcapError, Result};
pub use fixture::FixtureSource;
