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

use std::sync::Arc;

use bloomkit::bloom::BloomFilter;
use bloomkit::bloom::BloomFilterBuilder;

fn main() {
    // Create a filter sized for 10,000 items at 1% false positives
    let filter = BloomFilter::from_capacity(10_000, 0.01).unwrap();

    println!("Created Bloom filter for 10,000 items at 1% FPP");
    println!(
        "Bits: {}, hash functions: {}",
        filter.bit_count(),
        filter.hash_count()
    );

    // Add some values
    println!("\nAdding 10,000 user ids...");
    for i in 0..10_000 {
        filter.add(format!("user{i}"));
    }

    let missed = (0..10_000)
        .filter(|i| !filter.contains(format!("user{i}")))
        .count();
    let false_positives = (10_000..110_000)
        .filter(|i| filter.contains(format!("user{i}")))
        .count();

    println!("Added ids reported absent: {missed}");
    println!(
        "Measured false positive rate: {:.3}%",
        false_positives as f64 / 100_000.0 * 100.0
    );
    println!(
        "Estimated false positive rate: {:.3}%",
        filter.estimated_false_positive_rate() * 100.0
    );
    println!("Load factor: {:.3}", filter.load_factor());

    // Overfilling degrades accuracy without failing
    println!("\nAdding another 10,000 ids past the planned capacity...");
    for i in 10_000..20_000 {
        filter.add(format!("user{i}"));
    }
    println!(
        "Estimated false positive rate: {:.3}%",
        filter.estimated_false_positive_rate() * 100.0
    );

    // Serialize and deserialize
    println!("\nSerializing filter...");
    let bytes = filter.serialize();
    println!("Serialized size: {} bytes", bytes.len());

    let restored = BloomFilter::deserialize(&bytes).unwrap();
    println!("Restored equals original: {}", restored == filter);
    println!(
        "Estimated distinct items after deserialization: {:.0}",
        restored.estimated_cardinality()
    );

    // Shared between threads
    println!("\nFilling a filter from 4 threads...");
    let shared = Arc::new(
        BloomFilterBuilder::with_accuracy(40_000, 0.001)
            .seed(42)
            .build()
            .unwrap(),
    );
    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                for i in 0..10_000u64 {
                    shared.add((t * 10_000 + i).to_le_bytes());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    println!("Inserted: {}", shared.inserted_count());
    println!("Contains 12345: {}", shared.contains(12_345u64.to_le_bytes()));
}
