use std::path::PathBuf;
use thiserror::Error;

/// Failures while decoding profile input
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("invalid genotype '{0}' (expected one of AA, AS, SS, AC, SC)")]
    InvalidGenotype(String),

    #[error("invalid blood group '{0}' (expected e.g. O+, AB-, A POS)")]
    InvalidBloodGroup(String),

    #[error("unsupported profile format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON profile {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed TOML profile {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
