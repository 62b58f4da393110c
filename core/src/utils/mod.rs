//! Formatting, validation and timing helpers shared by the controller and CLI.

pub mod debounce;
pub mod format;
pub mod validate;

pub use debounce::Debouncer;
pub use format::{average_rating, format_date, format_rating, NOT_AVAILABLE};
pub use validate::{is_valid_email, validate_required};
