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

use std::f64::consts::LN_2;

use super::BloomFilter;
use crate::bitset::BitSet;
use crate::error::Error;
use crate::hash::HashStrategy;
use crate::hash::DEFAULT_SEED;

/// The smallest accepted bit count.
pub const MIN_BIT_COUNT: u64 = 1;
/// The largest accepted bit count, `i32::MAX` words of 64 bits.
pub const MAX_BIT_COUNT: u64 = i32::MAX as u64 * 64;
/// The smallest accepted hash count.
pub const MIN_HASH_COUNT: u32 = 1;
/// The largest accepted hash count.
pub const MAX_HASH_COUNT: u32 = i16::MAX as u32;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sizing {
    Size { bit_count: u64, hash_count: u32 },
    Accuracy { expected_items: u64, fpp: f64 },
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify expected items and target false positive
///   rate (recommended)
/// - [`with_size()`](Self::with_size): Specify bit count and hash count directly (manual)
///
/// Parameters are validated by [`build()`](Self::build).
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilterBuilder {
    sizing: Sizing,
    seed: u64,
}

impl BloomFilterBuilder {
    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// The bit count and hash count minimizing the false positive rate for `expected_items`
    /// insertions are derived as
    ///
    /// ```text
    /// bit_count  = ceil(-(n * ln(p)) / ln(2)^2)
    /// hash_count = round((bit_count / n) * ln(2)), at least 1
    /// ```
    ///
    /// # Arguments
    ///
    /// - `expected_items`: Expected number of distinct items, at least 1
    /// - `fpp`: Target false positive probability, strictly between 0 and 1
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// // Optimal for 10,000 items with 1% FPP
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01)
    ///     .seed(42)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(filter.hash_count(), 7);
    /// ```
    pub fn with_accuracy(expected_items: u64, fpp: f64) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Accuracy {
                expected_items,
                fpp,
            },
            seed: DEFAULT_SEED,
        }
    }

    /// Creates a builder with manual size specification.
    ///
    /// A filter of fixed size does not adapt to how many items it will receive, so its false
    /// positive rate grows without bound as more items are added. Prefer
    /// [`with_accuracy()`](Self::with_accuracy) unless the parameters were computed elsewhere.
    ///
    /// # Arguments
    ///
    /// - `bit_count`: Total number of bits in the filter, at least 1
    /// - `hash_count`: Number of hash functions to use, at least 1
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(100, 3).build().unwrap();
    /// assert_eq!(filter.bit_count(), 100);
    /// ```
    pub fn with_size(bit_count: u64, hash_count: u32) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Size {
                bit_count,
                hash_count,
            },
            seed: DEFAULT_SEED,
        }
    }

    /// Sets a custom hash seed (default: 9001).
    ///
    /// **Important**: Filters with different seeds cannot be merged.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameters`](crate::error::ErrorKind::InvalidParameters) if any of:
    /// - `bit_count` < [`MIN_BIT_COUNT`] or `bit_count` > [`MAX_BIT_COUNT`]
    /// - `hash_count` < [`MIN_HASH_COUNT`] or `hash_count` > [`MAX_HASH_COUNT`]
    /// - `expected_items` is 0
    /// - `fpp` is not strictly between 0.0 and 1.0
    /// - the bit count derived from `expected_items` and `fpp` exceeds [`MAX_BIT_COUNT`]
    pub fn build(self) -> Result<BloomFilter, Error> {
        let (bit_count, hash_count, expected_items) = match self.sizing {
            Sizing::Size {
                bit_count,
                hash_count,
            } => {
                check_bit_count(bit_count)?;
                check_hash_count(hash_count)?;
                (bit_count, hash_count, None)
            }
            Sizing::Accuracy {
                expected_items,
                fpp,
            } => {
                if expected_items == 0 {
                    return Err(Error::invalid_parameters(
                        "expected_items must be greater than 0",
                    ));
                }
                if !(fpp > 0.0 && fpp < 1.0) {
                    return Err(Error::invalid_parameters(
                        "fpp must be between 0.0 and 1.0 (exclusive)",
                    )
                    .with_context("fpp", fpp));
                }
                let bit_count = Self::suggest_bit_count(expected_items, fpp);
                check_bit_count(bit_count)
                    .map_err(|err| err.with_context("expected_items", expected_items))?;
                let hash_count = Self::suggest_hash_count(expected_items, bit_count);
                (bit_count, hash_count, Some(expected_items))
            }
        };

        tracing::debug!(
            bit_count,
            hash_count,
            seed = self.seed,
            expected_items = ?expected_items,
            "created bloom filter"
        );

        Ok(BloomFilter::from_parts(
            HashStrategy::with_seed(self.seed),
            hash_count,
            expected_items,
            BitSet::new(bit_count),
        ))
    }

    /// Suggests optimal number of bits given expected items and target FPP.
    ///
    /// Formula: `m = ceil(-n * ln(p) / (ln(2)^2))`
    /// where n = expected_items, p = fpp
    ///
    /// The result is not clamped, so it may exceed [`MAX_BIT_COUNT`] for extreme inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// let bits = BloomFilterBuilder::suggest_bit_count(1000, 0.01);
    /// assert_eq!(bits, 9586);
    /// ```
    pub fn suggest_bit_count(expected_items: u64, fpp: f64) -> u64 {
        let n = expected_items as f64;
        let bits = (-(n * fpp.ln()) / (LN_2 * LN_2)).ceil();
        // saturating float-to-int conversion
        (bits as u64).max(MIN_BIT_COUNT)
    }

    /// Suggests optimal number of hash functions given expected items and bit count.
    ///
    /// Formula: `k = round((m / n) * ln(2))`, clamped to
    /// [`MIN_HASH_COUNT`]..=[`MAX_HASH_COUNT`]
    /// where m = bit_count, n = expected_items
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// let hashes = BloomFilterBuilder::suggest_hash_count(1000, 9586);
    /// assert_eq!(hashes, 7); // optimal k ≈ 6.64
    /// ```
    pub fn suggest_hash_count(expected_items: u64, bit_count: u64) -> u32 {
        let m = bit_count as f64;
        let n = expected_items.max(1) as f64;
        let k = (m / n * LN_2).round();
        k.clamp(f64::from(MIN_HASH_COUNT), f64::from(MAX_HASH_COUNT)) as u32
    }
}

fn check_bit_count(bit_count: u64) -> Result<(), Error> {
    if bit_count < MIN_BIT_COUNT {
        return Err(Error::invalid_parameters(format!(
            "bit_count must be at least {MIN_BIT_COUNT}"
        )));
    }
    if bit_count > MAX_BIT_COUNT {
        return Err(Error::invalid_parameters(format!(
            "bit_count must not exceed {MAX_BIT_COUNT}"
        ))
        .with_context("bit_count", bit_count));
    }
    Ok(())
}

fn check_hash_count(hash_count: u32) -> Result<(), Error> {
    if hash_count < MIN_HASH_COUNT {
        return Err(Error::invalid_parameters(format!(
            "hash_count must be at least {MIN_HASH_COUNT}"
        )));
    }
    if hash_count > MAX_HASH_COUNT {
        return Err(Error::invalid_parameters(format!(
            "hash_count must not exceed {MAX_HASH_COUNT}"
        ))
        .with_context("hash_count", hash_count));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_with_accuracy_sizing() {
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build().unwrap();
        assert_eq!(filter.bit_count(), 9586);
        assert_eq!(filter.hash_count(), 7);
        assert_eq!(filter.expected_items(), Some(1000));
        assert_eq!(filter.seed(), DEFAULT_SEED);
    }

    #[test]
    fn test_with_accuracy_smallest() {
        // m = ceil(1.4427) = 2, k = round(1.386) = 1
        let filter = BloomFilterBuilder::with_accuracy(1, 0.5).build().unwrap();
        assert_eq!(filter.bit_count(), 2);
        assert_eq!(filter.hash_count(), 1);
    }

    #[test]
    fn test_hash_count_clamped_to_one() {
        // very loose targets yield k < 0.5 before clamping
        assert_eq!(BloomFilterBuilder::suggest_hash_count(1000, 100), 1);
    }

    #[test]
    fn test_hash_count_clamped_to_max() {
        assert_eq!(
            BloomFilterBuilder::suggest_hash_count(1, MAX_BIT_COUNT),
            MAX_HASH_COUNT
        );
        let filter = BloomFilterBuilder::with_size(64, MAX_HASH_COUNT).build().unwrap();
        assert_eq!(filter.hash_count(), MAX_HASH_COUNT);
    }

    #[test]
    fn test_with_size_is_exact() {
        let filter = BloomFilterBuilder::with_size(100, 3).seed(5).build().unwrap();
        assert_eq!(filter.bit_count(), 100);
        assert_eq!(filter.hash_count(), 3);
        assert_eq!(filter.seed(), 5);
        assert_eq!(filter.expected_items(), None);
    }

    #[test]
    fn test_invalid_parameters() {
        let cases = [
            BloomFilterBuilder::with_size(0, 3),
            BloomFilterBuilder::with_size(100, 0),
            BloomFilterBuilder::with_size(100, MAX_HASH_COUNT + 1),
            BloomFilterBuilder::with_size(64, u32::MAX),
            BloomFilterBuilder::with_size(MAX_BIT_COUNT + 1, 3),
            BloomFilterBuilder::with_accuracy(0, 0.01),
            BloomFilterBuilder::with_accuracy(100, 0.0),
            BloomFilterBuilder::with_accuracy(100, 1.0),
            BloomFilterBuilder::with_accuracy(100, -0.5),
            BloomFilterBuilder::with_accuracy(100, f64::NAN),
            BloomFilterBuilder::with_accuracy(u64::MAX, 1e-300),
        ];
        for builder in cases {
            let err = builder.clone().build().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameters, "{builder:?}");
        }
    }
}
