//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`InvalidAmount`] returned when user input is not a valid amount.
//! - [`EditInProgress`] and [`NotEditing`] returned by the savings editor
//!   when an action does not fit its current state.
//! - [`UnsupportedExportVersion`], [`UnknownCategory`] and
//!   [`DuplicateCategory`] returned while preparing a data export for import.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`EditInProgress`]: EngineError::EditInProgress
//!  [`NotEditing`]: EngineError::NotEditing
//!  [`UnsupportedExportVersion`]: EngineError::UnsupportedExportVersion
//!  [`UnknownCategory`]: EngineError::UnknownCategory
//!  [`DuplicateCategory`]: EngineError::DuplicateCategory
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("Unsupported export version {found} (expected {expected})")]
    UnsupportedExportVersion { found: u32, expected: u32 },
    #[error("\"{0}\" category not found!")]
    UnknownCategory(String),
    #[error("\"{0}\" category is declared twice")]
    DuplicateCategory(String),
    #[error("Another field is already being edited")]
    EditInProgress,
    #[error("No field is being edited")]
    NotEditing,
}
