//! Big-endian field packing shared by both generators.

/// Mask selecting the low 48 bits of the leading field.
pub const MASK_48: u64 = (1 << 48) - 1;

/// Mask clearing the version nibble of the 16-bit field.
pub const VERSION_MASK: u16 = 0x0fff;

/// Mask clearing the two variant bits of the 64-bit field.
pub const VARIANT_MASK: u64 = 0x3fff_ffff_ffff_ffff;

/// The `10` variant tag placed in the top two bits of the 64-bit field.
pub const VARIANT_TAG: u64 = 0x8000_0000_0000_0000;

/// Returns the 16-bit field with `version` multiplexed into its high nibble.
pub const fn tag_version(payload: u16, version: u8) -> u16 {
    (payload & VERSION_MASK) | ((version as u16) << 12)
}

/// Returns the 64-bit field with the `10` variant tag multiplexed into its top two bits.
pub const fn tag_variant(payload: u64) -> u64 {
    (payload & VARIANT_MASK) | VARIANT_TAG
}

/// Writes the three fields into `out` at offsets 0, 6 and 8, all big-endian.
///
/// Only the low 48 bits of `a48` are written; `b16` and `c64` are written as is, so callers are
/// expected to have tagged them already.
pub fn pack_fields(out: &mut [u8; 16], a48: u64, b16: u16, c64: u64) {
    out[..6].copy_from_slice(&a48.to_be_bytes()[2..]);
    out[6..8].copy_from_slice(&b16.to_be_bytes());
    out[8..].copy_from_slice(&c64.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::{pack_fields, tag_variant, tag_version, MASK_48};

    /// Packs prepared cases at fixed offsets
    #[test]
    fn packs_prepared_cases_at_fixed_offsets() {
        let cases: &[((u64, u16, u64), [u8; 16])] = &[
            ((0, 0, 0), [0; 16]),
            ((MASK_48, u16::MAX, u64::MAX), [0xff; 16]),
            (
                (0x0123_4567_89ab, 0xcdef, 0x0011_2233_4455_6677),
                [
                    0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x00, 0x11, 0x22, 0x33, 0x44,
                    0x55, 0x66, 0x77,
                ],
            ),
        ];

        for (fs, bytes) in cases {
            let mut out = [0x5a; 16];
            pack_fields(&mut out, fs.0, fs.1, fs.2);
            assert_eq!(&out, bytes);
        }
    }

    /// Drops bits above 48 in the leading field
    #[test]
    fn drops_bits_above_48_in_the_leading_field() {
        let mut out = [0u8; 16];
        pack_fields(&mut out, 0xffff_0000_0000_0001, 0, 0);
        assert_eq!(out[..6], [0u8, 0, 0, 0, 0, 1]);
    }

    /// Multiplexes version and variant tags
    #[test]
    fn multiplexes_version_and_variant_tags() {
        assert_eq!(tag_version(0xffff, 4), 0x4fff);
        assert_eq!(tag_version(0x0000, 7), 0x7000);
        assert_eq!(tag_version(0xa123, 7), 0x7123);
        assert_eq!(tag_variant(u64::MAX), 0xbfff_ffff_ffff_ffff);
        assert_eq!(tag_variant(0), 0x8000_0000_0000_0000);
        assert_eq!(tag_variant(0x4000_0000_0000_0001), 0x8000_0000_0000_0001);
    }
}
