//! # Iron Gate
//!
//! Genetic compatibility screening for prospective partners. Two biological
//! profiles go in; a traffic-light verdict (safe, caution, danger) and the
//! reasons for it come out.
//!
//! ## Rules
//!
//! - Genotype: when neither partner is AA, the pairing carries a high risk of
//!   sickle cell disease and the verdict is danger.
//! - Rhesus: a rhesus-negative mother with a rhesus-positive father raises the
//!   verdict to caution. A danger verdict is never lowered.
//!
//! ## Features
//!
//! - Profile input as JSON, TOML or plain-text lab reports
//! - Parallel screening of one profile against a directory of candidates
//! - Reports in HTML, CSV, TSV and JSON

pub mod analysis;
pub mod discovery;
pub mod error;
pub mod output;
pub mod parsers;
pub mod types;

// Re-export key types
pub use analysis::{evaluate, summarize, CandidateScreener, CompatibilityEvaluator};
pub use discovery::FileDiscovery;
pub use error::ProfileError;
pub use output::{ReportFormat, ReportGenerator};
pub use parsers::{ParsedProfile, ProfileParser, ReportScanner};
pub use types::*;
