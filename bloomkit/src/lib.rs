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

//! # bloomkit
//!
//! A Bloom filter for probabilistic set membership testing that can be shared between threads.
//!
//! The filter answers "possibly present" or "definitely absent". An element that was added is
//! always reported as present, while an element that was never added is reported as present
//! with a probability governed by the filter's size and load.
//!
//! - [`bloom`] holds the filter and its builder, including optimal sizing from an expected item
//!   count and a target false positive rate.
//! - [`hash`] derives the `k` bit positions of an element from a single 128-bit hash using
//!   double hashing.
//! - [`bitset`] is the fixed-size atomic bit array backing the filter.
//! - [`error`] is the error type returned by every fallible operation.
//!
//! ```rust
//! use bloomkit::bloom::BloomFilter;
//!
//! let filter = BloomFilter::from_capacity(1_000, 0.01).unwrap();
//! filter.add("user123");
//! assert!(filter.contains("user123"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod bitset;
pub mod bloom;
pub mod error;
pub mod hash;

mod codec;
