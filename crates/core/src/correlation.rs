use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use uuid::Uuid;

/// Token linking a staged payload to the notification that announces it.
///
/// Values always fit in a native machine word so they survive the trip
/// through the notification parameter unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(u64);

const WORD_MASK: u64 = usize::MAX as u64;

impl CorrelationId {
    /// Low bits of a fresh random UUID, masked to the machine word.
    pub fn generate() -> Self {
        let low = Uuid::new_v4().as_u128() as u64;
        Self(low & WORD_MASK)
    }

    /// Value for the notification's lparam slot.
    pub fn as_lparam(self) -> isize {
        self.0 as usize as isize
    }

    pub fn from_lparam(lparam: isize) -> Self {
        Self(lparam as usize as u64)
    }

    /// File name of the staged payload for this id.
    pub fn file_name(self) -> String {
        self.to_string()
    }
}

impl From<u64> for CorrelationId {
    fn from(value: u64) -> Self {
        Self(value & WORD_MASK)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for CorrelationId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rapid_ids_are_pairwise_distinct() {
        // 10k draws from >= 2^32 values: collision odds are well below 2%
        // on 32-bit and ~2.7e-12 on 64-bit targets.
        let ids: HashSet<CorrelationId> = (0..10_000).map(|_| CorrelationId::generate()).collect();
        if usize::BITS >= 64 {
            assert_eq!(ids.len(), 10_000);
        } else {
            assert!(ids.len() >= 9_990);
        }
    }

    #[test]
    fn lparam_round_trip_is_lossless() {
        for _ in 0..64 {
            let id = CorrelationId::generate();
            assert_eq!(CorrelationId::from_lparam(id.as_lparam()), id);
        }
    }

    #[test]
    fn display_is_fixed_width_hex() {
        let id = CorrelationId::from(0xabc);
        assert_eq!(id.to_string(), "0000000000000abc");
        assert_eq!("0000000000000abc".parse::<CorrelationId>().unwrap(), id);
        assert!("not-hex".parse::<CorrelationId>().is_err());
    }
}
