//! Transactional email for the clinic system.
//!
//! This crate renders the three notification kinds (patient welcome,
//! appointment confirmation, consultation summary) from typed requests and,
//! behind the `smtp` feature, delivers them through an SMTP relay.

pub mod request;
pub mod templates;

#[cfg(feature = "smtp")]
pub mod smtp;

pub use request::*;
pub use templates::*;
