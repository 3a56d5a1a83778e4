pub mod error_helpers;
pub mod file;
pub mod input;
pub mod retry;
pub mod text;
pub mod validation;
