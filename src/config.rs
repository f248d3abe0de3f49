/// Configuration for feed-dict batching
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default number of batches a generator yields
pub const DEFAULT_N_ITER: usize = 10000;

/// Default feed-dict key carrying the dataset size
pub const DEFAULT_COUNT_KEY: &str = "N";

/// Batching parameters
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BatchConfig {
    /// Number of samples in each batch
    pub batch_size: usize,

    /// Number of batches to yield; `None` yields forever
    #[serde(default = "default_n_iter")]
    pub n_iter: Option<usize>,

    /// Random seed; `None` seeds from system entropy
    #[serde(default)]
    pub seed: Option<u64>,

    /// Key under which the dataset size is attached to every batch
    #[serde(default = "default_count_key")]
    pub count_key: String,
}

fn default_n_iter() -> Option<usize> {
    Some(DEFAULT_N_ITER)
}

fn default_count_key() -> String {
    DEFAULT_COUNT_KEY.to_string()
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            n_iter: default_n_iter(),
            seed: None,
            count_key: default_count_key(),
        }
    }
}

impl BatchConfig {
    /// Config with the given batch size and defaults for everything else
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }

    pub fn with_n_iter(mut self, n_iter: Option<usize>) -> Self {
        self.n_iter = n_iter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_count_key(mut self, key: impl Into<String>) -> Self {
        self.count_key = key.into();
        self
    }

    /// Load from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        log::info!("Loading batch config from: {:?}", path);

        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.batch_size == 0 {
            return Err(crate::AbolethError::Config(
                "batch_size must be > 0".to_string(),
            ));
        }

        if self.count_key.is_empty() {
            return Err(crate::AbolethError::Config(
                "count_key must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the generator built from this config never ends
    pub fn is_unbounded(&self) -> bool {
        self.n_iter.is_none()
    }
}
