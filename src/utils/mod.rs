// Utility functions
pub mod error;
pub mod sanitize;
pub mod upload;
pub mod validate;
