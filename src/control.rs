//! Control bytes and SIMD group matching.
//!
//! Every slot in the table has a control byte. Occupied slots store the 7-bit
//! `H2` tag of their hash, so the high bit is always clear for them. The
//! remaining states all have the high bit set:
//!
//! | Value  | Bits        | Meaning                       |
//! |--------|-------------|-------------------------------|
//! | `0x80` | `1000_0000` | [`EMPTY`]: slot never written |
//! | `0xFE` | `1111_1110` | [`DELETED`]: reserved         |
//! | `0xFF` | `1111_1111` | [`SENTINEL`]: reserved        |
//!
//! Control bytes are grouped into windows of [`GROUP_SIZE`] bytes which are
//! matched against a target byte with a single SSE2 compare on x86_64.

/// Number of slots in a group. One group of control bytes fills exactly one
/// 128-bit vector register.
pub const GROUP_SIZE: usize = 16;

/// Control byte of a slot that has never held an entry.
pub const EMPTY: u8 = 0b1000_0000;

/// Control byte reserved for tombstones. The table never removes entries, so
/// nothing writes this value, but migration treats it as vacant.
pub const DELETED: u8 = 0b1111_1110;

/// Control byte reserved for an end-of-table marker. Unused: the table pads the
/// control array with [`EMPTY`] bytes instead.
pub const SENTINEL: u8 = 0b1111_1111;

/// Group selector half of a hash.
#[inline(always)]
pub fn h1(hash: u64) -> usize {
    // Truncated on 32-bit targets. Capacity fits in `usize` there too, so the
    // masked home group is the same.
    (hash >> 7) as usize
}

/// Tag half of a hash, stored in the control byte of an occupied slot.
#[inline(always)]
pub fn h2(hash: u64) -> u8 {
    (hash & 0x7F) as u8
}

/// Returns `true` if `ctrl` marks an occupied slot.
#[inline(always)]
pub fn is_full(ctrl: u8) -> bool {
    ctrl & 0x80 == 0
}

/// A set of slot offsets within one group, one bit per slot.
///
/// Iterating yields offsets from lowest to highest, clearing the lowest set
/// bit on each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitMask(u16);

impl BitMask {
    /// Returns `true` if any slot matched.
    #[inline(always)]
    pub fn any_bit_set(self) -> bool {
        self.0 != 0
    }

    /// Offset of the first matching slot, if any.
    #[inline(always)]
    pub fn lowest_set_bit(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Raw 16-bit mask.
    #[inline(always)]
    pub fn bits(self) -> u16 {
        self.0
    }
}

impl Iterator for BitMask {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        let offset = self.lowest_set_bit()?;
        self.0 &= self.0 - 1;
        Some(offset)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitMask {}

/// A snapshot of [`GROUP_SIZE`] consecutive control bytes.
#[derive(Clone, Copy)]
#[repr(C, align(16))]
pub struct Group {
    ctrl: [u8; GROUP_SIZE],
}

impl Group {
    /// Loads the group starting at `ctrl[0]`.
    ///
    /// # Panics
    ///
    /// Panics if `ctrl` is shorter than [`GROUP_SIZE`]. The table's control
    /// array is padded so that every group start has a full window behind it.
    #[inline(always)]
    pub fn load(ctrl: &[u8]) -> Self {
        let mut bytes = [EMPTY; GROUP_SIZE];
        bytes.copy_from_slice(&ctrl[..GROUP_SIZE]);
        Group { ctrl: bytes }
    }

    /// Slots whose control byte equals `byte`.
    #[inline(always)]
    #[allow(unreachable_code)]
    pub fn match_byte(&self, byte: u8) -> BitMask {
        #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
        {
            return self.match_byte_sse2(byte);
        }

        self.match_byte_generic(byte)
    }

    #[inline(always)]
    fn match_byte_generic(&self, byte: u8) -> BitMask {
        let mut bits: u16 = 0;
        for (i, &ctrl) in self.ctrl.iter().enumerate() {
            if ctrl == byte {
                bits |= 1 << i;
            }
        }
        BitMask(bits)
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
    #[inline(always)]
    fn match_byte_sse2(&self, byte: u8) -> BitMask {
        use core::arch::x86_64::*;
        // SAFETY: `Group` is `#[repr(C, align(16))]` with `ctrl` at offset 0 and
        // exactly 16 bytes long, so an aligned 128-bit load stays in bounds.
        unsafe {
            let data = _mm_load_si128(self.ctrl.as_ptr() as *const __m128i);
            let cmp = _mm_cmpeq_epi8(data, _mm_set1_epi8(byte as i8));
            BitMask(_mm_movemask_epi8(cmp) as u16)
        }
    }

    /// Slots that have never been written.
    ///
    /// `DELETED` and `SENTINEL` share the high bit with `EMPTY`, so this is an
    /// exact byte compare rather than a sign-bit scan.
    #[inline(always)]
    pub fn match_empty(&self) -> BitMask {
        self.match_byte(EMPTY)
    }

    /// Slots holding an entry, i.e. control bytes with the high bit clear.
    #[inline(always)]
    #[allow(unreachable_code)]
    pub fn match_full(&self) -> BitMask {
        #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
        {
            return self.match_full_sse2();
        }

        self.match_full_generic()
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
    #[inline(always)]
    fn match_full_sse2(&self) -> BitMask {
        use core::arch::x86_64::*;
        // SAFETY: Same layout argument as `match_byte_sse2`.
        unsafe {
            let data = _mm_load_si128(self.ctrl.as_ptr() as *const __m128i);
            BitMask(!(_mm_movemask_epi8(data) as u16))
        }
    }

    #[inline(always)]
    fn match_full_generic(&self) -> BitMask {
        let mut bits: u16 = 0;
        for (i, &ctrl) in self.ctrl.iter().enumerate() {
            if is_full(ctrl) {
                bits |= 1 << i;
            }
        }
        BitMask(bits)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn group_from(bytes: [u8; GROUP_SIZE]) -> Group {
        Group::load(&bytes)
    }

    #[test]
    fn hash_halves() {
        let hash = 0xDEAD_BEEF_0000_01FFu64;
        assert_eq!(h2(hash), 0x7F);
        assert_eq!(h1(hash), (hash >> 7) as usize);
        assert_eq!(h2(0x80), 0);
        assert!(is_full(h2(u64::MAX)));
    }

    #[test]
    fn control_states() {
        assert!(!is_full(EMPTY));
        assert!(!is_full(DELETED));
        assert!(!is_full(SENTINEL));
        for tag in 0..=0x7Fu8 {
            assert!(is_full(tag));
        }
    }

    #[test]
    fn bitmask_iterates_low_to_high() {
        let offsets: Vec<usize> = BitMask(0b1000_0000_0010_0101).collect();
        assert_eq!(offsets, [0, 2, 5, 15]);
        assert_eq!(BitMask(0).lowest_set_bit(), None);
        assert_eq!(BitMask(0b1000).lowest_set_bit(), Some(3));
        assert_eq!(BitMask(0xFFFF).len(), 16);
    }

    #[test]
    fn match_byte_finds_every_copy() {
        let mut bytes = [EMPTY; GROUP_SIZE];
        bytes[1] = 0x11;
        bytes[7] = 0x11;
        bytes[15] = 0x11;
        bytes[3] = 0x12;
        let group = group_from(bytes);

        assert_eq!(group.match_byte(0x11).collect::<Vec<_>>(), [1, 7, 15]);
        assert_eq!(group.match_byte(0x12).collect::<Vec<_>>(), [3]);
        assert!(!group.match_byte(0x13).any_bit_set());
    }

    #[test]
    fn match_empty_ignores_reserved_states() {
        let mut bytes = [0x05u8; GROUP_SIZE];
        bytes[2] = DELETED;
        bytes[4] = SENTINEL;
        bytes[9] = EMPTY;
        let group = group_from(bytes);

        assert_eq!(group.match_empty().collect::<Vec<_>>(), [9]);
        assert_eq!(group.match_full().len(), 13);
        assert!(!group.match_full().any(|i| i == 2 || i == 4 || i == 9));
    }

    #[test]
    fn full_group_has_no_empty() {
        let group = group_from([0x2A; GROUP_SIZE]);
        assert_eq!(group.match_empty().lowest_set_bit(), None);
        assert_eq!(group.match_full().bits(), 0xFFFF);
        assert_eq!(group.match_byte(0x2A).bits(), 0xFFFF);
    }

    #[test]
    fn portable_matching_agrees_with_vector_matching() {
        let seed = OsRng.try_next_u64().unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        let palette = [EMPTY, DELETED, SENTINEL, 0x00, 0x01, 0x3C, 0x7F];

        for _ in 0..2000 {
            let mut bytes = [EMPTY; GROUP_SIZE];
            for byte in bytes.iter_mut() {
                *byte = if rng.random_bool(0.5) {
                    palette[rng.random_range(0..palette.len())]
                } else {
                    rng.random::<u8>()
                };
            }
            let group = group_from(bytes);

            for &target in palette.iter().chain(&bytes) {
                assert_eq!(
                    group.match_byte(target),
                    group.match_byte_generic(target),
                    "seed {seed:#x}, group {bytes:02x?}, target {target:#04x}"
                );
            }
            assert_eq!(
                group.match_full(),
                group.match_full_generic(),
                "seed {seed:#x}, group {bytes:02x?}"
            );
        }
    }
}
