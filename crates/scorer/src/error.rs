use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("{}: no header row", .path.display())]
    MissingHeader { path: PathBuf },

    #[error("{}: column `{column}` not found in header", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}:{line}: unbalanced quote", .path.display())]
    UnbalancedQuote { path: PathBuf, line: usize },

    #[error("{}:{line}: empty wallet identifier", .path.display())]
    MalformedIdentifier { path: PathBuf, line: usize },

    #[error("{}:{line}: {reason}", .path.display())]
    MalformedFeatureRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("no feature row for wallet {wallet_id}")]
    MissingFeatures { wallet_id: String },

    #[error("wallet {wallet_id}: {field} is not finite")]
    NonFiniteFeature {
        wallet_id: String,
        field: &'static str,
    },

    #[error("invalid scoring weights: {0}")]
    InvalidWeights(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;
