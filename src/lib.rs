//! Aboleth training helpers - Rust implementation
//!
//! Small utilities for candle training loops:
//! - **Positivity**: constrain a trainable parameter to stay strictly positive
//! - **Endless permutations**: without-replacement index cycles that reshuffle on exhaustion
//! - **Batching**: feed-dict mini-batches drawn from an in-memory dataset
//!
//! # Example
//!
//! ```ignore
//! use aboleth_rs::{batch, FeedDataset};
//! use ndarray::{Array2, IxDyn};
//!
//! let mut data = FeedDataset::new();
//! data.insert("x", Array2::<f32>::zeros((100, 2)).into_dyn())?;
//! data.insert("y", Array2::<f32>::zeros((100, 1)).into_dyn())?;
//!
//! for feed in batch(&data, 10, Some(1000), Some(42))? {
//!     let x = feed.get("x").unwrap();
//!     assert_eq!(feed.count(), 100);
//! }
//! ```

pub mod config;
pub mod data;
pub mod utils;

// Re-export commonly used items
pub use config::BatchConfig;
pub use data::{batch, BatchGenerator, EndlessPermutations, FeedDataset, FeedDict, FeedSource, Seed};
pub use utils::{pos, pos_default, Positivity, DEFAULT_MINVAL};

/// Library error types
#[derive(Debug, thiserror::Error)]
pub enum AbolethError {
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Dataset has no entries to infer the sample count from")]
    EmptyDataset,

    #[error("Shape mismatch for '{name}': expected leading dimension {expected}, found {found}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AbolethError>;
