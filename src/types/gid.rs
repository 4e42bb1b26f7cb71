//! Packed cell values.
//!
//! A tile layer cell is a 32-bit value whose top three bits are flip flags
//! and whose remaining 29 bits are the global tile ID.

use serde::Serialize;

pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;

/// All flag bits.
pub const FLIP_MASK: u32 = FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY;

/// Everything that is not a flag bit.
pub const GID_MASK: u32 = !FLIP_MASK;

/// A raw cell value split into its GID and flip flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Gid {
    /// Global tile ID with flags removed. Zero means "no tile".
    pub id: u32,
    pub flip_h: bool,
    pub flip_v: bool,
    /// Diagonal flip (x/y transpose).
    pub flip_d: bool,
}

impl Gid {
    /// Split a packed cell value.
    pub fn from_raw(raw: u32) -> Self {
        let flags = flip_bits(raw);
        Self {
            id: true_gid(raw),
            flip_h: flags & FLIPPED_HORIZONTALLY != 0,
            flip_v: flags & FLIPPED_VERTICALLY != 0,
            flip_d: flags & FLIPPED_DIAGONALLY != 0,
        }
    }

    /// Pack back into a raw cell value.
    pub fn to_raw(self) -> u32 {
        let mut raw = self.id & GID_MASK;
        if self.flip_h {
            raw |= FLIPPED_HORIZONTALLY;
        }
        if self.flip_v {
            raw |= FLIPPED_VERTICALLY;
        }
        if self.flip_d {
            raw |= FLIPPED_DIAGONALLY;
        }
        raw
    }

    pub fn is_empty(self) -> bool {
        self.id == 0
    }
}

/// The GID bits of a packed value.
pub fn true_gid(raw: u32) -> u32 {
    raw & GID_MASK
}

/// The flag bits of a packed value.
pub fn flip_bits(raw: u32) -> u32 {
    raw & FLIP_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_flip() {
        let gid = Gid::from_raw(0x8000_0005);
        assert_eq!(gid.id, 5);
        assert!(gid.flip_h);
        assert!(!gid.flip_v);
        assert!(!gid.flip_d);
    }

    #[test]
    fn test_all_flags() {
        let gid = Gid::from_raw(0xE000_0001);
        assert_eq!(gid.id, 1);
        assert!(gid.flip_h && gid.flip_v && gid.flip_d);
        assert_eq!(gid.to_raw(), 0xE000_0001);
    }

    #[test]
    fn test_zero_is_empty() {
        assert!(Gid::from_raw(0).is_empty());
        // Flags on an empty cell still leave no tile.
        assert!(Gid::from_raw(FLIPPED_VERTICALLY).is_empty());
    }

    #[test]
    fn test_masks_partition_every_bit() {
        let samples = [
            0u32,
            1,
            5,
            0x1FFF_FFFF,
            0x2000_0000,
            0x8000_0005,
            0xDEAD_BEEF,
            0xFFFF_FFFF,
        ];
        for raw in samples.into_iter().chain((0..32).map(|b| 1u32 << b)) {
            assert_eq!(true_gid(raw) | flip_bits(raw), raw, "union for {raw:#x}");
            assert_eq!(true_gid(raw) & flip_bits(raw), 0, "overlap for {raw:#x}");
            assert_eq!(Gid::from_raw(raw).to_raw(), raw);
        }
    }
}
