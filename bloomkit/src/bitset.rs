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

//! A fixed-size bit array that can be read and written concurrently.

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::error::Error;

/// A fixed-size array of bits packed into atomic `u64` words.
///
/// Bits are set with an atomic OR, so concurrent writers targeting the same word never lose
/// each other's updates. No shared-reference operation ever clears a bit: once a reader has
/// observed a bit as set, it observes it as set from then on. Only [`clear`](Self::clear),
/// which requires exclusive access, resets bits.
///
/// Bit `i` is stored in word `i / 64` at offset `i % 64`.
pub struct BitSet {
    len: u64,
    words: Box<[AtomicU64]>,
}

impl BitSet {
    /// Creates a bit set of `len` bits, all unset.
    pub fn new(len: u64) -> Self {
        let num_words = len.div_ceil(64) as usize;
        let words = (0..num_words).map(|_| AtomicU64::new(0)).collect();
        BitSet { len, words }
    }

    /// Returns the number of bits.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns whether the bit set holds no bits at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sets the bit at `index` and returns whether it was previously unset.
    ///
    /// Setting an already set bit has no effect.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`. Use [`try_set`](Self::try_set) for a checked variant.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bitset::BitSet;
    /// let bits = BitSet::new(100);
    /// assert!(bits.set(42));
    /// assert!(!bits.set(42));
    /// assert!(bits.get(42));
    /// ```
    #[inline]
    pub fn set(&self, index: u64) -> bool {
        assert!(
            index < self.len,
            "index {index} out of range for bit set of length {}",
            self.len
        );
        let (word_index, mask) = locate(index);
        let previous = self.words[word_index].fetch_or(mask, Ordering::Relaxed);
        previous & mask == 0
    }

    /// Returns the value of the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`. Use [`try_get`](Self::try_get) for a checked variant.
    #[inline]
    pub fn get(&self, index: u64) -> bool {
        assert!(
            index < self.len,
            "index {index} out of range for bit set of length {}",
            self.len
        );
        let (word_index, mask) = locate(index);
        self.words[word_index].load(Ordering::Relaxed) & mask != 0
    }

    /// Checked variant of [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`](crate::error::ErrorKind::IndexOutOfRange) if
    /// `index >= len`.
    pub fn try_set(&self, index: u64) -> Result<bool, Error> {
        if index >= self.len {
            return Err(Error::index_out_of_range(index, self.len));
        }
        Ok(self.set(index))
    }

    /// Checked variant of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`](crate::error::ErrorKind::IndexOutOfRange) if
    /// `index >= len`.
    pub fn try_get(&self, index: u64) -> Result<bool, Error> {
        if index >= self.len {
            return Err(Error::index_out_of_range(index, self.len));
        }
        Ok(self.get(index))
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> u64 {
        self.words
            .iter()
            .map(|word| u64::from(word.load(Ordering::Relaxed).count_ones()))
            .sum()
    }

    /// Unsets every bit.
    pub fn clear(&mut self) {
        for word in self.words.iter_mut() {
            *word.get_mut() = 0;
        }
    }

    /// Sets every bit that is set in `other`.
    ///
    /// # Panics
    ///
    /// Panics if the two bit sets differ in length.
    pub fn union_with(&self, other: &BitSet) {
        assert_eq!(self.len, other.len, "bit sets must have the same length");
        for (word, other_word) in self.words.iter().zip(other.words.iter()) {
            word.fetch_or(other_word.load(Ordering::Relaxed), Ordering::Relaxed);
        }
    }

    /// Returns the bits packed LSB-first into `ceil(len / 8)` bytes.
    ///
    /// Bit `i` is bit `i % 8` of byte `i / 8`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let num_bytes = self.len.div_ceil(8) as usize;
        let mut bytes = Vec::with_capacity(self.words.len() * 8);
        for word in self.words.iter() {
            bytes.extend_from_slice(&word.load(Ordering::Relaxed).to_le_bytes());
        }
        bytes.truncate(num_bytes);
        bytes
    }

    /// Restores a bit set of `len` bits from the packed form produced by
    /// [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidData`](crate::error::ErrorKind::InvalidData) if `bytes` is not exactly
    /// `ceil(len / 8)` long, or if any padding bit past `len` is set.
    pub fn from_bytes(len: u64, bytes: &[u8]) -> Result<Self, Error> {
        let expected = len.div_ceil(8);
        if bytes.len() as u64 != expected {
            return Err(Error::deserial("bit array length does not match bit count")
                .with_context("expected_bytes", expected)
                .with_context("actual_bytes", bytes.len()));
        }

        let excess_bits = len % 8;
        if excess_bits != 0 {
            let last = bytes[bytes.len() - 1];
            if last >> excess_bits != 0 {
                return Err(Error::deserial("padding bits past the bit count are set"));
            }
        }

        let words = bytes
            .chunks(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf[..chunk.len()].copy_from_slice(chunk);
                AtomicU64::new(u64::from_le_bytes(buf))
            })
            .collect();
        Ok(BitSet { len, words })
    }
}

/// Splits a bit index into its word index and the mask selecting it within that word.
#[inline]
fn locate(index: u64) -> (usize, u64) {
    let word_index = (index >> 6) as usize; // index / 64
    let mask = 1u64 << (index & 63); // index % 64
    (word_index, mask)
}

impl Clone for BitSet {
    fn clone(&self) -> Self {
        let words = self
            .words
            .iter()
            .map(|word| AtomicU64::new(word.load(Ordering::Relaxed)))
            .collect();
        BitSet {
            len: self.len,
            words,
        }
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .words
                .iter()
                .zip(other.words.iter())
                .all(|(a, b)| a.load(Ordering::Relaxed) == b.load(Ordering::Relaxed))
    }
}

impl Eq for BitSet {}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitSet")
            .field("len", &self.len)
            .field("ones", &self.count_ones())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::BitSet;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_is_unset() {
        let bits = BitSet::new(130);
        assert_eq!(bits.len(), 130);
        assert_eq!(bits.count_ones(), 0);
        assert!((0..130).all(|i| !bits.get(i)));
    }

    #[test]
    fn test_set_only_touches_target() {
        let bits = BitSet::new(200);
        assert!(bits.set(63));
        assert!(bits.set(64));
        assert!(!bits.set(64));
        for i in 0..200 {
            assert_eq!(bits.get(i), i == 63 || i == 64, "bit {i}");
        }
        assert_eq!(bits.count_ones(), 2);
    }

    #[test]
    fn test_checked_access() {
        let bits = BitSet::new(10);
        assert!(bits.try_set(9).unwrap());
        assert!(bits.try_get(9).unwrap());
        assert_eq!(bits.try_set(10).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(bits.try_get(64).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_out_of_range_panics() {
        BitSet::new(100).set(100);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        // the last word has room for bit 127, but it lies past the length
        BitSet::new(100).get(127);
    }

    #[test]
    fn test_clear() {
        let mut bits = BitSet::new(70);
        bits.set(0);
        bits.set(69);
        bits.clear();
        assert_eq!(bits.count_ones(), 0);
    }

    #[test]
    fn test_union_with() {
        let a = BitSet::new(100);
        let b = BitSet::new(100);
        a.set(1);
        b.set(2);
        b.set(99);
        a.union_with(&b);
        assert!(a.get(1) && a.get(2) && a.get(99));
        assert_eq!(a.count_ones(), 3);
    }

    #[test]
    fn test_byte_layout() {
        let bits = BitSet::new(12);
        bits.set(0);
        bits.set(9);
        bits.set(11);
        assert_eq!(bits.to_bytes(), vec![0b0000_0001, 0b0000_1010]);

        let restored = BitSet::from_bytes(12, &bits.to_bytes()).unwrap();
        assert_eq!(restored, bits);
    }

    #[test]
    fn test_from_bytes_rejects_bad_input() {
        let err = BitSet::from_bytes(12, &[0, 0, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        // bit 12 lies past the length
        let err = BitSet::from_bytes(12, &[0, 0b0001_0000]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_concurrent_writers_same_word() {
        let bits = BitSet::new(64);
        std::thread::scope(|s| {
            for t in 0..8u64 {
                let bits = &bits;
                s.spawn(move || {
                    for i in (t..64).step_by(8) {
                        bits.set(i);
                    }
                });
            }
        });
        assert_eq!(bits.count_ones(), 64);
    }
}
