//! Partitioner - primary key to partition address
//!
//! The address is derived from a MurmurHash3 (x86, 32-bit, seed 0) of the
//! first [`PREFIX_LEN`] characters of the key, rendered as unpadded lowercase
//! hex. The first digit is the bucket, the first three digits the split.

use crate::error::{CoreError, Result};
use crate::types::PartitionAddress;

/// Number of leading key characters that feed the hash
pub const PREFIX_LEN: usize = 3;

/// Number of hex digits that make up a split name
const SPLIT_DIGITS: usize = 3;

/// MurmurHash3 x86_32
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    let mut h = seed;
    let mut chunks = data.chunks_exact(4);

    for chunk in &mut chunks {
        let k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h ^= k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let k = tail
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &b)| acc | (u32::from(b) << (8 * i)));
        h ^= k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
    }

    // Finalization mix
    h ^= data.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Compute the partition address of a primary key.
///
/// Surrounding whitespace is ignored. Keys shorter than [`PREFIX_LEN`]
/// characters after trimming are rejected.
pub fn locate(key: &str) -> Result<PartitionAddress> {
    let key = key.trim();
    let prefix_end = match key.char_indices().nth(PREFIX_LEN - 1) {
        Some((idx, c)) => idx + c.len_utf8(),
        None => {
            return Err(CoreError::KeyTooShort {
                key: key.to_string(),
                min: PREFIX_LEN,
            })
        }
    };

    let hash = murmur3_32(key[..prefix_end].as_bytes(), 0);
    let hex = format!("{:x}", hash);

    // `hex` is never empty; 0 renders as "0"
    let bucket = hex.chars().next().unwrap_or('0');
    let split: String = hex.chars().take(SPLIT_DIGITS).collect();

    Ok(PartitionAddress::new(bucket, split))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_murmur3_reference_vectors() {
        assert_eq!(murmur3_32(b"", 0), 0);
        assert_eq!(murmur3_32(b"", 1), 0x514e_28b7);
        assert_eq!(murmur3_32(b"foo", 0), 0xf6a5_c420);
        assert_eq!(murmur3_32(b"hello", 0), 0x248b_fa47);
        assert_eq!(
            murmur3_32(b"The quick brown fox jumps over the lazy dog", 0),
            0x2e4f_f723
        );
    }

    #[test]
    fn test_locate_known_keys() {
        // murmur3("cka") = 0x497cb098
        assert_eq!(locate("cka2501").unwrap(), PartitionAddress::new('4', "497"));
        // murmur3("abc") = 0xb3dd93fa
        assert_eq!(locate("abc").unwrap(), PartitionAddress::new('b', "b3d"));
    }

    #[test]
    fn test_locate_unpadded_hex() {
        // murmur3("ckb") = 0x0e42efd6 renders as "e42efd6"
        assert_eq!(locate("ckb9").unwrap(), PartitionAddress::new('e', "e42"));
    }

    #[test]
    fn test_locate_uses_prefix_only() {
        assert_eq!(locate("cka2501").unwrap(), locate("cka2502").unwrap());
        assert_eq!(locate("cka").unwrap(), locate("cka-anything-else").unwrap());
    }

    #[test]
    fn test_locate_ignores_surrounding_whitespace() {
        assert_eq!(locate(" cka2501\t").unwrap(), locate("cka2501").unwrap());
        assert!(matches!(locate("  ab  "), Err(CoreError::KeyTooShort { .. })));
    }

    #[test]
    fn test_locate_is_deterministic() {
        for key in ["cka2501", "zzz0", "abc123", "été-42"] {
            let first = locate(key).unwrap();
            for _ in 0..10 {
                assert_eq!(locate(key).unwrap(), first);
            }
        }
    }

    #[test]
    fn test_split_starts_with_bucket() {
        for i in 0..500 {
            let addr = locate(&format!("k{:04}", i * 7)).unwrap();
            assert!(addr.split.starts_with(addr.bucket));
            assert_eq!(addr.split.len(), 3);
        }
    }

    #[test]
    fn test_locate_collisions_are_allowed() {
        // Distinct prefixes that land on the same split
        assert_eq!(locate("adc1").unwrap(), locate("aim1").unwrap());
    }

    #[test]
    fn test_locate_multibyte_prefix() {
        // Prefix is three characters, hashed as UTF-8: "été" = 0x3393660f
        assert_eq!(locate("été-42").unwrap(), PartitionAddress::new('3', "339"));
    }

    #[test]
    fn test_locate_rejects_short_keys() {
        for key in ["", "a", "ab", "é1"] {
            match locate(key) {
                Err(CoreError::KeyTooShort { key: k, min }) => {
                    assert_eq!(k, key);
                    assert_eq!(min, PREFIX_LEN);
                }
                other => panic!("expected KeyTooShort, got {:?}", other),
            }
        }
    }
}
