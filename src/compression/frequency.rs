//! Byte frequency model shared by the entropy coders.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occurrence count of every byte value present in a buffer.
///
/// Only non-zero counts are stored, ordered by byte value, so iteration order is
/// stable and the table serializes to the same JSON object every time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable(BTreeMap<u8, u64>);

impl FrequencyTable {
    /// Count every byte in `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        counts
            .iter()
            .enumerate()
            .map(|(byte, &count)| (byte as u8, count))
            .collect()
    }

    /// Get the frequency of a byte, zero when absent
    pub fn get(&self, byte: u8) -> u64 {
        self.0.get(&byte).copied().unwrap_or(0)
    }

    /// Number of distinct byte values with a non-zero count
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts, i.e. the length of the counted buffer.
    ///
    /// `None` when the counts overflow `u64`, which only a forged table can do.
    pub fn total(&self) -> Option<u64> {
        self.0
            .values()
            .try_fold(0u64, |sum, &count| sum.checked_add(count))
    }

    /// Iterate `(byte, count)` pairs in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.0.iter().map(|(&byte, &count)| (byte, count))
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        FrequencyTable(iter.into_iter().filter(|&(_, count)| count > 0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_table() {
        let freq = FrequencyTable::from_bytes(b"aabccc");
        assert_eq!(freq.get(b'a'), 2);
        assert_eq!(freq.get(b'b'), 1);
        assert_eq!(freq.get(b'c'), 3);
        assert_eq!(freq.get(b'z'), 0);
        assert_eq!(freq.len(), 3);
        assert_eq!(freq.total(), Some(6));
    }

    #[test]
    fn test_empty_input() {
        let freq = FrequencyTable::from_bytes(b"");
        assert!(freq.is_empty());
        assert_eq!(freq.total(), Some(0));
    }

    #[test]
    fn test_full_byte_range() {
        let data: Vec<u8> = (0..=255u8).collect();
        let freq = FrequencyTable::from_bytes(&data);
        assert_eq!(freq.len(), 256);
        assert!(freq.iter().all(|(_, count)| count == 1));
        let order: Vec<u8> = freq.iter().map(|(byte, _)| byte).collect();
        assert_eq!(order, data);
    }

    #[test]
    fn test_zero_counts_dropped() {
        let freq: FrequencyTable = vec![(1, 0), (2, 5)].into_iter().collect();
        assert_eq!(freq.len(), 1);
        assert_eq!(freq.get(2), 5);
    }

    #[test]
    fn test_json_shape() {
        let freq = FrequencyTable::from_bytes(b"AAB");
        let json = serde_json::to_string(&freq).unwrap();
        assert_eq!(json, r#"{"65":2,"66":1}"#);
        let back: FrequencyTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, freq);
    }

    #[test]
    fn test_total_overflow() {
        let freq: FrequencyTable =
            serde_json::from_str(r#"{"0":18446744073709551615,"1":1}"#).unwrap();
        assert_eq!(freq.total(), None);
    }
}
