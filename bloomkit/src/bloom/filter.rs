// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use super::builder::MAX_BIT_COUNT;
use super::builder::MAX_HASH_COUNT;
use super::builder::MIN_BIT_COUNT;
use super::builder::MIN_HASH_COUNT;
use super::BloomFilterBuilder;
use crate::bitset::BitSet;
use crate::codec::FilterBytes;
use crate::codec::FilterSlice;
use crate::error::Error;
use crate::hash::BitIndices;
use crate::hash::HashStrategy;
use crate::hash::DEFAULT_SEED;

// Serialization layout: bit_count (u64), hash_count (u64), packed bits
const HEADER_BYTES: usize = 16;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (added elements always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// Elements are byte sequences; anything implementing `AsRef<[u8]>` can be added, including
/// the empty sequence.
///
/// All queries and insertions take `&self` and are lock-free, so a filter behind an
/// [`Arc`](std::sync::Arc) can be fed by several writers while any number of readers query it.
/// A query racing an insertion may miss the bits that insertion is about to set, but a bit
/// seen as set is never seen as unset later.
///
/// Adding more elements than the filter was sized for is not an error: the filter keeps
/// working with a higher false positive rate, see
/// [`estimated_false_positive_rate()`](Self::estimated_false_positive_rate).
///
/// Use [`BloomFilterBuilder`] (or the [`new`](Self::new) and
/// [`from_capacity`](Self::from_capacity) shorthands) to construct instances.
pub struct BloomFilter {
    strategy: HashStrategy,
    /// Number of hash functions (k)
    hash_count: u32,
    /// Planned capacity (n), when sized by accuracy
    expected_items: Option<u64>,
    /// Number of `add` calls since creation or the last reset
    inserted: AtomicU64,
    /// Whether going past `expected_items` has already been reported
    capacity_warned: AtomicBool,
    /// Bit array of m bits
    bits: BitSet,
}

impl BloomFilter {
    /// Creates a filter with an explicit bit count (m) and hash count (k).
    ///
    /// This is the low-level constructor; see [`from_capacity`](Self::from_capacity) for the
    /// optimally sized one.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameters`](crate::error::ErrorKind::InvalidParameters) if either
    /// count is 0, `bit_count` exceeds [`MAX_BIT_COUNT`](super::MAX_BIT_COUNT) or
    /// `hash_count` exceeds [`MAX_HASH_COUNT`](super::MAX_HASH_COUNT).
    pub fn new(bit_count: u64, hash_count: u32) -> Result<Self, Error> {
        BloomFilterBuilder::with_size(bit_count, hash_count).build()
    }

    /// Creates a filter sized to hold `expected_items` elements at a false positive rate of
    /// `fpp`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameters`](crate::error::ErrorKind::InvalidParameters) if
    /// `expected_items` is 0 or `fpp` is not strictly between 0.0 and 1.0.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let filter = BloomFilter::from_capacity(1000, 0.01).unwrap();
    /// assert_eq!(filter.bit_count(), 9586);
    /// assert_eq!(filter.hash_count(), 7);
    /// ```
    pub fn from_capacity(expected_items: u64, fpp: f64) -> Result<Self, Error> {
        BloomFilterBuilder::with_accuracy(expected_items, fpp).build()
    }

    pub(super) fn from_parts(
        strategy: HashStrategy,
        hash_count: u32,
        expected_items: Option<u64>,
        bits: BitSet,
    ) -> Self {
        BloomFilter {
            strategy,
            hash_count,
            expected_items,
            inserted: AtomicU64::new(0),
            capacity_warned: AtomicBool::new(false),
            bits,
        }
    }

    /// Adds an element to the filter.
    ///
    /// After this call, `contains(element)` always returns `true`. There is no way to remove an
    /// element other than [`reset()`](Self::reset).
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let filter = BloomFilter::new(100, 3).unwrap();
    /// filter.add("user123");
    /// filter.add(b"raw bytes");
    /// filter.add(42_u64.to_le_bytes());
    ///
    /// assert!(filter.contains("user123"));
    /// ```
    pub fn add(&self, element: impl AsRef<[u8]>) {
        for index in self.indices(element.as_ref()) {
            self.bits.set(index);
        }
        self.record_insertion();
    }

    /// Tests whether an element is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Element was **possibly** added (or false positive)
    /// - `false`: Element was **definitely not** added
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let filter = BloomFilter::from_capacity(100, 0.01).unwrap();
    /// filter.add("apple");
    ///
    /// assert!(filter.contains("apple"));
    /// assert!(!filter.contains("grape"));
    /// ```
    pub fn contains(&self, element: impl AsRef<[u8]>) -> bool {
        self.indices(element.as_ref()).all(|index| self.bits.get(index))
    }

    /// Adds an element and returns whether it was possibly present before.
    ///
    /// This hashes once, instead of twice for `contains()` followed by `add()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let filter = BloomFilter::from_capacity(100, 0.01).unwrap();
    /// assert!(!filter.check_and_add("apple"));
    /// assert!(filter.check_and_add("apple"));
    /// ```
    pub fn check_and_add(&self, element: impl AsRef<[u8]>) -> bool {
        let mut newly_set = false;
        for index in self.indices(element.as_ref()) {
            newly_set |= self.bits.set(index);
        }
        self.record_insertion();
        !newly_set
    }

    /// Estimates the current false positive probability.
    ///
    /// Uses `(1 - e^(-k * n / m))^k`, where n is [`inserted_count()`](Self::inserted_count).
    /// A value well above the rate the filter was sized for means more elements were added than
    /// planned and the filter should be rebuilt with a larger capacity.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let k = f64::from(self.hash_count);
        let n = self.inserted_count() as f64;
        let m = self.bit_count() as f64;
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    /// Estimates the number of distinct elements added from the number of set bits.
    ///
    /// Uses `-(m / k) * ln(1 - X / m)` where X is [`bits_set()`](Self::bits_set). Returns
    /// infinity when every bit is set.
    pub fn estimated_cardinality(&self) -> f64 {
        let k = f64::from(self.hash_count);
        let m = self.bit_count() as f64;
        let x = self.bits_set() as f64;
        -(m / k) * (1.0 - x / m).ln()
    }

    /// Resets the filter to its initial empty state.
    ///
    /// Clears all bits and counters while preserving size, hash count and seed.
    pub fn reset(&mut self) {
        self.bits.clear();
        *self.inserted.get_mut() = 0;
        *self.capacity_warned.get_mut() = false;
    }

    /// Merges another filter into this one via bitwise OR (union).
    ///
    /// After merging, this filter recognizes every element of either filter. The inserted
    /// count becomes the sum of both counts, which over-counts elements added to both.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilters`](crate::error::ErrorKind::IncompatibleFilters) if the
    /// filters differ in bit count, hash count or seed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut f1 = BloomFilter::from_capacity(100, 0.01).unwrap();
    /// let f2 = BloomFilter::from_capacity(100, 0.01).unwrap();
    /// f1.add("a");
    /// f2.add("b");
    ///
    /// f1.union(&f2).unwrap();
    /// assert!(f1.contains("a"));
    /// assert!(f1.contains("b"));
    /// ```
    pub fn union(&mut self, other: &BloomFilter) -> Result<(), Error> {
        if !self.is_compatible(other) {
            return Err(
                Error::incompatible_filters("cannot union incompatible Bloom filters")
                    .with_context("bit_count", pair(self.bit_count(), other.bit_count()))
                    .with_context("hash_count", pair(self.hash_count, other.hash_count))
                    .with_context("seed", pair(self.seed(), other.seed())),
            );
        }

        self.bits.union_with(&other.bits);
        let inserted = self.inserted.get_mut();
        *inserted = inserted.saturating_add(other.inserted_count());
        let inserted = *inserted;
        tracing::debug!(bits_set = self.bits_set(), inserted, "merged bloom filters");
        Ok(())
    }

    /// Checks if two filters are compatible for merging.
    ///
    /// Filters are compatible if they have the same:
    /// - Bit count
    /// - Number of hash functions
    /// - Seed
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.bit_count() == other.bit_count()
            && self.hash_count == other.hash_count
            && self.strategy == other.strategy
    }

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits_set() == 0
    }

    /// Returns the number of bits in the filter (m).
    pub fn bit_count(&self) -> u64 {
        self.bits.len()
    }

    /// Returns the number of hash functions used (k).
    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u64 {
        self.strategy.seed()
    }

    /// Returns the number of elements the filter was sized for, if it was built by accuracy.
    pub fn expected_items(&self) -> Option<u64> {
        self.expected_items
    }

    /// Returns how many elements have been added, counting repeated additions.
    ///
    /// For a deserialized filter this starts from the estimate of
    /// [`estimated_cardinality()`](Self::estimated_cardinality).
    pub fn inserted_count(&self) -> u64 {
        self.inserted.load(Ordering::Relaxed)
    }

    /// Returns the number of bits set to 1.
    pub fn bits_set(&self) -> u64 {
        self.bits.count_ones()
    }

    /// Returns the fraction of bits set.
    ///
    /// An optimally sized filter at its planned capacity has about half of its bits set; values
    /// above 0.5 indicate a degraded false positive rate.
    pub fn load_factor(&self) -> f64 {
        self.bits_set() as f64 / self.bit_count() as f64
    }

    /// Serializes the filter to a byte vector.
    ///
    /// The layout is the bit count and the hash count as little-endian `u64`s, followed by the
    /// bits packed LSB-first into `ceil(bit_count / 8)` bytes. The seed is not stored; a filter
    /// built with a custom seed must be restored with
    /// [`deserialize_with_seed()`](Self::deserialize_with_seed).
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let filter = BloomFilter::new(100, 3).unwrap();
    /// filter.add("test");
    ///
    /// let bytes = filter.serialize();
    /// assert_eq!(bytes.len(), 16 + 13);
    /// let restored = BloomFilter::deserialize(&bytes).unwrap();
    /// assert!(restored.contains("test"));
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let packed = self.bits.to_bytes();
        let mut bytes = FilterBytes::with_capacity(HEADER_BYTES + packed.len());
        bytes.write_u64_le(self.bit_count());
        bytes.write_u64_le(u64::from(self.hash_count));
        bytes.write(&packed);
        bytes.into_bytes()
    }

    /// Deserializes a filter that was built with the default seed.
    ///
    /// # Errors
    ///
    /// See [`deserialize_with_seed()`](Self::deserialize_with_seed).
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_seed(bytes, DEFAULT_SEED)
    }

    /// Deserializes a filter, hashing with `seed`.
    ///
    /// The inserted count is not part of the serialized form and is restored from
    /// [`estimated_cardinality()`](Self::estimated_cardinality).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidData`](crate::error::ErrorKind::InvalidData) if:
    /// - The data is truncated or has trailing bytes
    /// - The bit count or hash count is out of range
    /// - Padding bits past the bit count are set
    pub fn deserialize_with_seed(bytes: &[u8], seed: u64) -> Result<Self, Error> {
        let mut cursor = FilterSlice::new(bytes);

        let bit_count = cursor
            .read_u64_le()
            .map_err(|_| Error::insufficient_data("bit_count"))?;
        let hash_count = cursor
            .read_u64_le()
            .map_err(|_| Error::insufficient_data("hash_count"))?;

        if !(MIN_BIT_COUNT..=MAX_BIT_COUNT).contains(&bit_count) {
            return Err(
                Error::deserial("bit_count out of range").with_context("bit_count", bit_count)
            );
        }
        let hash_count = u32::try_from(hash_count)
            .ok()
            .filter(|k| (MIN_HASH_COUNT..=MAX_HASH_COUNT).contains(k))
            .ok_or_else(|| {
                Error::deserial("hash_count out of range").with_context("hash_count", hash_count)
            })?;

        let packed = cursor
            .read_remaining()
            .map_err(|_| Error::insufficient_data("bit_array"))?;
        let bits = BitSet::from_bytes(bit_count, &packed)?;

        let filter = BloomFilter::from_parts(HashStrategy::with_seed(seed), hash_count, None, bits);
        let estimate = filter.estimated_cardinality();
        let inserted = if estimate.is_finite() {
            estimate.round() as u64
        } else {
            filter.bits_set()
        };
        filter.inserted.store(inserted, Ordering::Relaxed);

        tracing::debug!(
            bit_count,
            hash_count,
            seed,
            bits_set = filter.bits_set(),
            "deserialized bloom filter"
        );
        Ok(filter)
    }

    fn indices(&self, element: &[u8]) -> BitIndices {
        self.strategy
            .indices(element, self.hash_count, self.bit_count())
    }

    fn record_insertion(&self) {
        let inserted = self.inserted.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(expected_items) = self.expected_items {
            if inserted > expected_items && !self.capacity_warned.swap(true, Ordering::Relaxed) {
                tracing::warn!(
                    expected_items,
                    inserted,
                    estimated_fpp = self.estimated_false_positive_rate(),
                    "bloom filter is past its planned capacity, false positive rate is degrading"
                );
            }
        }
    }
}

fn pair(ours: impl fmt::Display, theirs: impl fmt::Display) -> String {
    format!("{ours} vs {theirs}")
}

impl Clone for BloomFilter {
    fn clone(&self) -> Self {
        BloomFilter {
            strategy: self.strategy,
            hash_count: self.hash_count,
            expected_items: self.expected_items,
            inserted: AtomicU64::new(self.inserted_count()),
            capacity_warned: AtomicBool::new(self.capacity_warned.load(Ordering::Relaxed)),
            bits: self.bits.clone(),
        }
    }
}

/// Two filters are equal when they share bit count, hash count and seed, and have the same bits
/// set. Counters are not compared.
impl PartialEq for BloomFilter {
    fn eq(&self, other: &Self) -> bool {
        self.is_compatible(other) && self.bits == other.bits
    }
}

impl Eq for BloomFilter {}

impl fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("bit_count", &self.bit_count())
            .field("hash_count", &self.hash_count)
            .field("seed", &self.seed())
            .field("expected_items", &self.expected_items)
            .field("inserted", &self.inserted_count())
            .field("bits_set", &self.bits_set())
            .finish()
    }
}
