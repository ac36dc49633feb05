//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelInfo`]: what the reasoning client advertises about itself
//! - [`output_format::OutputFormat`]: how a finished run is printed
//! - [`string`]: UTF-8 safe string helpers

pub mod model;
pub mod output_format;
pub mod string;
