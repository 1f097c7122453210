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

use super::murmur3_x64_128;
use super::DEFAULT_SEED;

/// Derives the bit positions of an element using double hashing (Kirsch-Mitzenmacher).
///
/// A single MurmurHash3 pass yields two base values `h1` and `h2`, and the `i`-th position is
///
/// ```text
/// index_i = (h1 + i * h2) mod m        for i in 0..k
/// ```
///
/// which statistically approximates `k` independent hash functions at the cost of one.
///
/// The strategy is a pure function of its seed: the same element, `k` and `m` always produce
/// the same positions, across processes and platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashStrategy {
    seed: u64,
}

impl Default for HashStrategy {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl HashStrategy {
    /// Creates a strategy hashing with the given seed.
    pub const fn with_seed(seed: u64) -> Self {
        HashStrategy { seed }
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the `k` bit positions of `element` in a bit array of `m` bits.
    ///
    /// Every yielded index is strictly less than `m`, and exactly `k` indices are yielded,
    /// including for an empty element.
    ///
    /// # Panics
    ///
    /// Panics if `m` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::hash::HashStrategy;
    /// let strategy = HashStrategy::default();
    /// let indices: Vec<u64> = strategy.indices(b"user123", 3, 100).collect();
    /// assert_eq!(indices.len(), 3);
    /// assert!(indices.iter().all(|&i| i < 100));
    /// ```
    pub fn indices(&self, element: &[u8], k: u32, m: u64) -> BitIndices {
        assert!(m > 0, "bit array must hold at least one bit");

        let (h1, h2) = murmur3_x64_128(element, self.seed);

        // A step that is a multiple of m would map every probe onto the first one.
        let mut step = h2 % m;
        if step == 0 {
            step = 1 % m;
        }

        BitIndices {
            next: h1 % m,
            step,
            modulus: m,
            remaining: k,
        }
    }
}

/// Iterator over the bit positions of one element, see [`HashStrategy::indices`].
#[derive(Debug, Clone)]
pub struct BitIndices {
    next: u64,
    step: u64,
    modulus: u64,
    remaining: u32,
}

impl Iterator for BitIndices {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let current = self.next;
        // (current + step) mod m, with both operands already reduced so it cannot overflow
        let gap = self.modulus - self.step;
        self.next = if current >= gap {
            current - gap
        } else {
            current + self.step
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for BitIndices {}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_indices(element: &[u8], seed: u64, k: u32, m: u64) -> Vec<u64> {
        let (h1, h2) = murmur3_x64_128(element, seed);
        let h2 = if h2 % m == 0 { 1 } else { h2 };
        (0..k as u128)
            .map(|i| ((h1 as u128 + i * h2 as u128) % m as u128) as u64)
            .collect()
    }

    #[test]
    fn test_matches_linear_combination() {
        let strategy = HashStrategy::with_seed(42);
        let elements: [&[u8]; 4] = [b"", b"a", b"user123", b"The quick brown fox"];
        for m in [1, 2, 7, 64, 100, 9586, u64::MAX] {
            for element in elements {
                let actual: Vec<u64> = strategy.indices(element, 11, m).collect();
                assert_eq!(actual, reference_indices(element, 42, 11, m), "m = {m}");
            }
        }
    }

    #[test]
    fn test_exact_count_and_bounds() {
        let strategy = HashStrategy::default();
        for k in [1, 3, 7, 100] {
            for i in 0u32..200 {
                let element = i.to_le_bytes();
                let indices = strategy.indices(&element, k, 97);
                assert_eq!(indices.len(), k as usize);
                let indices: Vec<u64> = indices.collect();
                assert_eq!(indices.len(), k as usize);
                assert!(indices.iter().all(|&index| index < 97));
            }
        }
    }

    #[test]
    fn test_zero_hashes() {
        let strategy = HashStrategy::default();
        assert_eq!(strategy.indices(b"x", 0, 10).count(), 0);
    }

    #[test]
    fn test_deterministic() {
        let a = HashStrategy::with_seed(7);
        let b = HashStrategy::with_seed(7);
        let left: Vec<u64> = a.indices(b"user456", 5, 1000).collect();
        let right: Vec<u64> = b.indices(b"user456", 5, 1000).collect();
        assert_eq!(left, right);

        let other: Vec<u64> = HashStrategy::with_seed(8).indices(b"user456", 5, 1000).collect();
        assert_ne!(left, other);
    }

    #[test]
    fn test_probes_do_not_collapse() {
        // with m = 2 any odd step alternates, any even step is replaced by 1
        let strategy = HashStrategy::default();
        for i in 0u32..64 {
            let indices: Vec<u64> = strategy.indices(&i.to_le_bytes(), 2, 2).collect();
            assert_ne!(indices[0], indices[1]);
        }
    }

    #[test]
    #[should_panic(expected = "at least one bit")]
    fn test_zero_modulus() {
        HashStrategy::default().indices(b"x", 3, 0);
    }
}
