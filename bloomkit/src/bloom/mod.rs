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

//! Bloom Filter implementation for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If an element was added, `contains()` will always return `true`
//! - **Possible false positives**: `contains()` may return `true` for elements never added
//! - **Fixed size**: The bit array never grows; resizing means rebuilding from the elements
//! - **Insert only**: Elements cannot be removed, only the whole filter can be reset
//! - **Concurrent**: `add()` and `contains()` take `&self` and are lock-free
//!
//! # Usage
//!
//! ```rust
//! use bloomkit::bloom::BloomFilter;
//!
//! // Create a filter optimized for 1000 elements with 1% false positive rate
//! let filter = BloomFilter::from_capacity(1000, 0.01).unwrap();
//!
//! // Add elements
//! filter.add("apple");
//! filter.add(b"banana");
//! filter.add(42_u64.to_le_bytes());
//!
//! // Check membership
//! assert!(filter.contains("apple")); // true - definitely added
//! assert!(!filter.contains("grape")); // false - never added (probably)
//!
//! // Get statistics
//! println!("Size: {} bits", filter.bit_count());
//! println!("Bits set: {}", filter.bits_set());
//! println!("Est. FPP: {:.4}%", filter.estimated_false_positive_rate() * 100.0);
//! ```
//!
//! # Creating Filters
//!
//! ## By Accuracy (Recommended)
//!
//! Calculates the optimal size and hash count:
//!
//! ```rust
//! # use bloomkit::bloom::BloomFilterBuilder;
//! let filter = BloomFilterBuilder::with_accuracy(
//!     10_000, // Expected items
//!     0.01,   // Target false positive probability (1%)
//! )
//! .seed(9001) // Optional: custom seed
//! .build()
//! .unwrap();
//! ```
//!
//! ## By Size (Manual)
//!
//! Specify the exact bit count and hash count:
//!
//! ```rust
//! # use bloomkit::bloom::BloomFilterBuilder;
//! let filter = BloomFilterBuilder::with_size(
//!     95_851, // Number of bits
//!     7,      // Number of hash functions
//! )
//! .build()
//! .unwrap();
//! ```
//!
//! # Capacity
//!
//! A filter that receives more elements than it was sized for does not fail. Its false positive
//! rate rises with every further element, and a single warning is logged through `tracing`
//! when the planned capacity is first exceeded. Watch
//! [`BloomFilter::estimated_false_positive_rate`] and rebuild with a larger capacity when it
//! drifts from the target.
//!
//! # Implementation Details
//!
//! - Uses MurmurHash3 (x64, 128-bit) for hashing
//! - Implements double hashing (Kirsch-Mitzenmacher method) for k hash functions
//! - Bits packed in atomic `u64` words
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance: Building a Better Bloom
//!   Filter"

mod builder;
mod filter;

pub use self::builder::BloomFilterBuilder;
pub use self::builder::MAX_BIT_COUNT;
pub use self::builder::MAX_HASH_COUNT;
pub use self::builder::MIN_BIT_COUNT;
pub use self::builder::MIN_HASH_COUNT;
pub use self::filter::BloomFilter;
