/// In-memory dataset of named arrays sharing a leading sample dimension
use ndarray::ArrayD;
use std::collections::btree_map::{self, BTreeMap};

use crate::AbolethError;

/// Named arrays with a common first dimension `N`
///
/// Keys are ordered, so the entry used to infer `N` is always the
/// lexicographically first one.
#[derive(Debug, Clone)]
pub struct FeedDataset<A> {
    arrays: BTreeMap<String, ArrayD<A>>,
}

impl<A> Default for FeedDataset<A> {
    fn default() -> Self {
        Self {
            arrays: BTreeMap::new(),
        }
    }
}

impl<A> FeedDataset<A> {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, array)` pairs
    pub fn from_arrays<I, K>(entries: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (K, ArrayD<A>)>,
        K: Into<String>,
    {
        let mut dataset = Self::new();
        for (name, array) in entries {
            dataset.insert(name, array)?;
        }
        Ok(dataset)
    }

    /// Add or replace an entry
    ///
    /// Rejects scalars and arrays whose leading dimension disagrees with the
    /// entries already present. A rejected insert leaves the dataset unchanged.
    pub fn insert(&mut self, name: impl Into<String>, array: ArrayD<A>) -> crate::Result<()> {
        let name = name.into();

        let found = match array.shape().first() {
            Some(&rows) => rows,
            None => {
                return Err(AbolethError::Data(format!(
                    "'{}' is zero-dimensional; entries need a leading sample axis",
                    name
                )))
            }
        };

        // Replacing the only entry may change N
        let expected = self
            .arrays
            .iter()
            .find(|(key, _)| **key != name)
            .map(|(_, existing)| existing.shape()[0]);

        if let Some(expected) = expected {
            if expected != found {
                return Err(AbolethError::ShapeMismatch {
                    name,
                    expected,
                    found,
                });
            }
        }

        self.arrays.insert(name, array);
        Ok(())
    }

    /// Sample count `N`, or `None` when there are no entries
    pub fn n_samples(&self) -> Option<usize> {
        self.arrays.values().next().map(|array| array.shape()[0])
    }

    /// Number of named entries
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ArrayD<A>> {
        self.arrays.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ArrayD<A>> {
        self.arrays.iter()
    }
}

impl<'a, A> IntoIterator for &'a FeedDataset<A> {
    type Item = (&'a String, &'a ArrayD<A>);
    type IntoIter = btree_map::Iter<'a, String, ArrayD<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
