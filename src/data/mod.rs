/// In-memory datasets, index permutations and feed-dict batching
pub mod batch;
pub mod dataset;
pub mod permutation;

pub use batch::{batch, BatchGenerator, FeedDict};
pub use dataset::FeedDataset;
pub use permutation::{EndlessPermutations, Seed};

use candle_core::{Device, Tensor};
use std::collections::HashMap;

/// Pull-based source of feed dicts for a training loop
pub trait FeedSource {
    /// Get the next feed dict as tensors on `device`, or `None` when exhausted
    fn next_feed(&mut self, device: &Device) -> crate::Result<Option<HashMap<String, Tensor>>>;

    /// Batches left to yield; `None` if the source never ends
    fn num_batches(&self) -> Option<usize>;
}
