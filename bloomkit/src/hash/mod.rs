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

//! Hashing of elements into bit positions.
//!
//! All positions are derived from one [MurmurHash3](murmur3_x64_128) pass over the element's
//! bytes, see [`HashStrategy`].

mod murmurhash;
mod strategy;

pub use self::murmurhash::murmur3_x64_128;
pub use self::strategy::BitIndices;
pub use self::strategy::HashStrategy;

/// The seed 9001 used by default is a prime number that was chosen very early on in
/// experimental testing.
///
/// Filters can only be combined or restored from bytes when they hash with the same seed, so
/// once filters have been persisted with a seed it cannot change.
pub const DEFAULT_SEED: u64 = 9001;
