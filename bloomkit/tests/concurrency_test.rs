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

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use bloomkit::bloom::BloomFilter;

const WRITERS: u64 = 8;
const PER_WRITER: u64 = 2_000;

fn element(writer: u64, i: u64) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&writer.to_le_bytes());
    bytes[8..].copy_from_slice(&i.to_le_bytes());
    bytes
}

#[test]
fn test_many_writers() {
    let filter = BloomFilter::from_capacity(WRITERS * PER_WRITER, 0.01).unwrap();
    std::thread::scope(|s| {
        for writer in 0..WRITERS {
            let filter = &filter;
            s.spawn(move || {
                for i in 0..PER_WRITER {
                    filter.add(element(writer, i));
                }
            });
        }
    });

    assert_eq!(filter.inserted_count(), WRITERS * PER_WRITER);
    for writer in 0..WRITERS {
        assert!((0..PER_WRITER).all(|i| filter.contains(element(writer, i))));
    }

    // concurrent adds lose no bit compared to a sequential fill
    let sequential = BloomFilter::from_capacity(WRITERS * PER_WRITER, 0.01).unwrap();
    for writer in 0..WRITERS {
        for i in 0..PER_WRITER {
            sequential.add(element(writer, i));
        }
    }
    assert_eq!(filter, sequential);
}

#[test]
fn test_readers_never_see_bits_cleared() {
    let filter = Arc::new(BloomFilter::from_capacity(PER_WRITER, 0.01).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let filter = Arc::clone(&filter);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                // once an element is seen as present it must stay present
                let mut seen = vec![false; PER_WRITER as usize];
                while !done.load(Ordering::Acquire) {
                    for (i, seen) in seen.iter_mut().enumerate() {
                        let present = filter.contains(element(0, i as u64));
                        assert!(present || !*seen, "element {i} disappeared");
                        *seen |= present;
                    }
                }
            })
        })
        .collect();

    for i in 0..PER_WRITER {
        filter.add(element(0, i));
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().unwrap();
    }
    assert!((0..PER_WRITER).all(|i| filter.contains(element(0, i))));
}

#[test]
fn test_check_and_add_racing_writers() {
    // at least one of several racing writers observes the element as new, and afterwards
    // every writer observes it as present
    for round in 0..50u64 {
        let filter = BloomFilter::new(1 << 16, 5).unwrap();
        let new_count = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let filter = &filter;
                    s.spawn(move || !filter.check_and_add(round.to_le_bytes()))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|&was_new| was_new)
                .count()
        });
        assert!(new_count >= 1);
        assert!(filter.check_and_add(round.to_le_bytes()));
        assert_eq!(filter.inserted_count(), 5);
    }
}
