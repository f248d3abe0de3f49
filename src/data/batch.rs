/// Feed-dict mini-batch generation
use candle_core::{Device, Tensor, WithDType};
use ndarray::{ArrayD, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

use super::dataset::FeedDataset;
use super::permutation::{EndlessPermutations, Seed};
use crate::{AbolethError, BatchConfig};

/// One mini-batch: every dataset entry sliced to `batch_size` rows, plus the
/// full dataset size under the count key
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDict<A> {
    arrays: BTreeMap<String, ArrayD<A>>,
    count_key: String,
    count: usize,
    indices: Vec<usize>,
}

impl<A> FeedDict<A> {
    pub fn get(&self, name: &str) -> Option<&ArrayD<A>> {
        self.arrays.get(name)
    }

    /// Dataset size `N`
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn count_key(&self) -> &str {
        &self.count_key
    }

    /// Rows per array
    pub fn batch_size(&self) -> usize {
        self.indices.len()
    }

    /// Dataset rows this batch was sliced from, in order
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Array keys (the count key is not included)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArrayD<A>)> {
        self.arrays.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_arrays(self) -> BTreeMap<String, ArrayD<A>> {
        self.arrays
    }
}

impl<A: WithDType> FeedDict<A> {
    /// Convert to candle tensors, adding `N` as an `i64` scalar
    pub fn to_tensors(&self, device: &Device) -> crate::Result<HashMap<String, Tensor>> {
        if self.arrays.contains_key(&self.count_key) {
            return Err(AbolethError::Config(format!(
                "count key '{}' collides with a dataset entry",
                self.count_key
            )));
        }

        let mut feed = HashMap::with_capacity(self.arrays.len() + 1);
        for (name, array) in &self.arrays {
            let data: Vec<A> = array.iter().copied().collect();
            let tensor = Tensor::from_vec(data, array.shape(), device)?;
            feed.insert(name.clone(), tensor);
        }
        feed.insert(self.count_key.clone(), Tensor::new(self.count as i64, device)?);

        Ok(feed)
    }
}

/// Iterator over random mini-batches of a [`FeedDataset`]
///
/// Indices come from an [`EndlessPermutations`] stream, so consecutive
/// batches sweep the data without replacement and reshuffle after every
/// full pass. When `batch_size > N` a single batch spans several passes and
/// may contain repeated rows.
pub struct BatchGenerator<'a, A, R: Rng = StdRng> {
    data: &'a FeedDataset<A>,
    perms: EndlessPermutations<R>,
    n_samples: usize,
    batch_size: usize,
    n_iter: Option<usize>,
    count_key: String,
    issued: usize,
}

impl<'a, A: Clone> BatchGenerator<'a, A, StdRng> {
    /// Create from a config, seeding a `StdRng` from `config.seed`
    pub fn from_config(data: &'a FeedDataset<A>, config: &BatchConfig) -> crate::Result<Self> {
        Self::with_rng(data, config, Seed::from(config.seed).into_rng())
    }
}

impl<'a, A: Clone, R: Rng> BatchGenerator<'a, A, R> {
    /// Create from a config and a caller-supplied generator
    ///
    /// `config.seed` is ignored; the generator's own state decides the stream.
    pub fn with_rng(data: &'a FeedDataset<A>, config: &BatchConfig, rng: R) -> crate::Result<Self> {
        config.validate()?;

        let n_samples = data.n_samples().ok_or(AbolethError::EmptyDataset)?;
        if n_samples == 0 {
            return Err(AbolethError::Data(
                "dataset entries have zero rows; nothing to sample".to_string(),
            ));
        }

        if config.batch_size > n_samples {
            log::warn!(
                "batch_size {} exceeds dataset size {}; batches will repeat rows",
                config.batch_size,
                n_samples
            );
        }

        log::info!(
            "Batch generator: {} samples, {} entries, batch_size={}, n_iter={}",
            n_samples,
            data.len(),
            config.batch_size,
            config
                .n_iter
                .map_or_else(|| "unbounded".to_string(), |n| n.to_string())
        );

        Ok(Self {
            data,
            perms: EndlessPermutations::with_rng(n_samples, rng),
            n_samples,
            batch_size: config.batch_size,
            n_iter: config.n_iter,
            count_key: config.count_key.clone(),
            issued: 0,
        })
    }

    /// Dataset size `N`
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Batches yielded so far
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Batches left, or `None` for an unbounded generator
    pub fn remaining(&self) -> Option<usize> {
        self.n_iter.map(|n| n.saturating_sub(self.issued))
    }

    fn draw(&mut self) -> FeedDict<A> {
        let indices = self.perms.take_indices(self.batch_size);

        let arrays = self
            .data
            .iter()
            .map(|(name, array)| (name.clone(), array.select(Axis(0), &indices)))
            .collect();

        FeedDict {
            arrays,
            count_key: self.count_key.clone(),
            count: self.n_samples,
            indices,
        }
    }
}

impl<'a, A: Clone, R: Rng> Iterator for BatchGenerator<'a, A, R> {
    type Item = FeedDict<A>;

    fn next(&mut self) -> Option<FeedDict<A>> {
        if self.remaining() == Some(0) {
            return None;
        }

        self.issued += 1;
        Some(self.draw())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining() {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl<A: WithDType, R: Rng> super::FeedSource for BatchGenerator<'_, A, R> {
    fn next_feed(&mut self, device: &Device) -> crate::Result<Option<HashMap<String, Tensor>>> {
        self.next().map(|feed| feed.to_tensors(device)).transpose()
    }

    fn num_batches(&self) -> Option<usize> {
        self.remaining()
    }
}

/// Random feed-dict batches for stochastic gradient training
///
/// Yields `n_iter` batches (`None` for no limit) of `batch_size` rows each,
/// with the dataset size attached under `"N"`. Consecutive passes draw
/// without replacement.
pub fn batch<A: Clone>(
    data: &FeedDataset<A>,
    batch_size: usize,
    n_iter: Option<usize>,
    seed: Option<u64>,
) -> crate::Result<BatchGenerator<'_, A>> {
    let config = BatchConfig {
        batch_size,
        n_iter,
        seed,
        ..BatchConfig::default()
    };
    BatchGenerator::from_config(data, &config)
}
