//! Read-only projections over stored records.
//!
//! Derived display fields (age, relative dates, subtotals) are computed at
//! read time and never persisted.

mod consultation;
mod patient;

pub use consultation::*;
pub use patient::*;

use thiserror::Error;

use crate::db::DbError;

/// Viewer errors.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type ViewResult<T> = Result<T, ViewError>;
