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

use std::io;
use std::io::Cursor;
use std::io::Read;

use byteorder::ReadBytesExt;
use byteorder::LE;

/// A wrapper around a byte slice that provides methods for reading filter fields from it.
pub struct FilterSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl FilterSlice<'_> {
    /// Creates a new `FilterSlice` from the given byte slice.
    pub fn new(slice: &[u8]) -> FilterSlice<'_> {
        FilterSlice {
            slice: Cursor::new(slice),
        }
    }

    /// Reads a 64-bit unsigned integer in little-endian byte order.
    pub fn read_u64_le(&mut self) -> io::Result<u64> {
        self.slice.read_u64::<LE>()
    }

    /// Reads every byte that has not been consumed yet.
    pub fn read_remaining(&mut self) -> io::Result<Vec<u8>> {
        let mut rest = Vec::new();
        self.slice.read_to_end(&mut rest)?;
        Ok(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::FilterSlice;
    use crate::codec::FilterBytes;

    #[test]
    fn test_read_back_written_fields() {
        let mut bytes = FilterBytes::with_capacity(18);
        bytes.write_u64_le(100);
        bytes.write_u64_le(3);
        bytes.write(&[0xab, 0x01]);
        let bytes = bytes.into_bytes();
        assert_eq!(&bytes[..8], &100u64.to_le_bytes());

        let mut slice = FilterSlice::new(&bytes);
        assert_eq!(slice.read_u64_le().unwrap(), 100);
        assert_eq!(slice.read_u64_le().unwrap(), 3);
        assert_eq!(slice.read_remaining().unwrap(), vec![0xab, 0x01]);
        assert!(slice.read_remaining().unwrap().is_empty());
    }

    #[test]
    fn test_truncated_read_fails() {
        let mut slice = FilterSlice::new(&[1, 2, 3]);
        assert!(slice.read_u64_le().is_err());
    }
}
