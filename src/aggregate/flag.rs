//! Bitwise aggregation for flag (bitmask) rasters.
//!
//! Samples are combined as unsigned bit patterns; signed kinds use their
//! two's complement representation.

use ndarray::ArrayView2;

use super::qualifying;
use crate::raster::Sample;

/// Bits set in every qualifying sample.
pub fn and<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>) -> Option<T> {
    qualifying(window, nodata)
        .map(Sample::to_flag_bits)
        .reduce(|acc, bits| acc & bits)
        .map(T::from_flag_bits)
}

/// Bits set in at least one qualifying sample.
pub fn or<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>) -> Option<T> {
    qualifying(window, nodata)
        .map(Sample::to_flag_bits)
        .reduce(|acc, bits| acc | bits)
        .map(T::from_flag_bits)
}

/// Per-bit majority vote; a bit carried by exactly half of the samples is
/// dropped, as an AND over a split vote would.
pub fn median_and<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>) -> Option<T> {
    majority(window, nodata, false)
}

/// Per-bit majority vote; a bit carried by exactly half of the samples is
/// kept, as an OR over a split vote would.
pub fn median_or<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>) -> Option<T> {
    majority(window, nodata, true)
}

fn majority<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>, keep_ties: bool) -> Option<T> {
    let mut counts = [0usize; 64];
    let mut n = 0usize;
    for bits in qualifying(window, nodata).map(Sample::to_flag_bits) {
        n += 1;
        let mut rest = bits;
        while rest != 0 {
            let bit = rest.trailing_zeros() as usize;
            counts[bit] += 1;
            rest &= rest - 1;
        }
    }
    if n == 0 {
        return None;
    }

    let mut result = 0u64;
    for (bit, &count) in counts.iter().enumerate() {
        let set = match (2 * count).cmp(&n) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => keep_ties,
            std::cmp::Ordering::Less => false,
        };
        if set {
            result |= 1 << bit;
        }
    }
    Some(T::from_flag_bits(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_and_keeps_common_bits() {
        let arr = array![[0b1011u8, 0b0011], [0b1111, 0b0111]];
        assert_eq!(and(&arr.view(), None), Some(0b0011));
    }

    #[test]
    fn test_or_collects_any_bit() {
        let arr = array![[0b0001u16, 0b0100], [0b1000, 0b0000]];
        assert_eq!(or(&arr.view(), None), Some(0b1101));
    }

    #[test]
    fn test_nodata_excluded() {
        // 0xFF is no-data; including it would not change AND but would change OR
        let arr = array![[0b0001u8, 0xFF], [0b0011, 0xFF]];
        assert_eq!(and(&arr.view(), Some(0xFF)), Some(0b0001));
        assert_eq!(or(&arr.view(), Some(0xFF)), Some(0b0011));
    }

    #[test]
    fn test_and_or_bit_properties() {
        let arr = array![[0x35u8, 0x1C, 0x94], [0x77, 0x05, 0xF0]];
        let samples: Vec<u8> = arr.iter().copied().collect();
        let a = and(&arr.view(), None).unwrap();
        let o = or(&arr.view(), None).unwrap();
        for bit in 0..8 {
            let mask = 1u8 << bit;
            let in_all = samples.iter().all(|s| s & mask != 0);
            let in_any = samples.iter().any(|s| s & mask != 0);
            assert_eq!(a & mask != 0, in_all, "AND bit {bit}");
            assert_eq!(o & mask != 0, in_any, "OR bit {bit}");
        }
    }

    #[test]
    fn test_signed_flags_use_bit_pattern() {
        let arr = array![[-1i16, 0x00F0], [0x0FF0, -1]];
        assert_eq!(and(&arr.view(), None), Some(0x00F0));
        assert_eq!(or(&arr.view(), None), Some(-1));
    }

    #[test]
    fn test_median_majority() {
        // bit 0: 3 of 3, bit 1: 2 of 3, bit 2: 1 of 3
        let arr = array![[0b111u8, 0b011, 0b001]];
        assert_eq!(median_and(&arr.view(), None), Some(0b011));
        assert_eq!(median_or(&arr.view(), None), Some(0b011));
    }

    #[test]
    fn test_median_ties() {
        // bit 0 in all 4, bit 1 in exactly 2, bit 3 in 1
        let arr = array![[0b0011u8, 0b0011], [0b1001, 0b0001]];
        assert_eq!(median_and(&arr.view(), None), Some(0b0001));
        assert_eq!(median_or(&arr.view(), None), Some(0b0011));
    }
}
