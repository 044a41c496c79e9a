use std::{fmt, str};

use fstr::FStr;

use crate::pack::{pack_fields, tag_variant, tag_version, MASK_48};

/// Represents a Universally Unique IDentifier as a 16-byte big-endian array.
///
/// Values compare in byte order, so identifiers from [`MonotonicGenerator`] sort by creation
/// time.
///
/// [`MonotonicGenerator`]: crate::MonotonicGenerator
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid([u8; 16]);

/// The variant field values of a UUID.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Variant {
    /// `0xxx`: the NCS backward compatibility variant, including the Nil UUID.
    Var0,

    /// `10xx`: the variant produced by this crate.
    Var10,

    /// `110x`: the Microsoft backward compatibility variant.
    Var110,

    /// `111x`: reserved for future definition, including the Max UUID.
    VarReserved,
}

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Creates a UUIDv4 from its three random fields.
    ///
    /// Bits of `random_b` and `random_c` occupied by the version and variant tags are discarded.
    ///
    /// # Panics
    ///
    /// Panics if `random_a` is not a 48-bit integer.
    pub fn from_fields_v4(random_a: u64, random_b: u16, random_c: u64) -> Self {
        assert!(random_a <= MASK_48, "`random_a` must be a 48-bit integer");
        let mut bytes = [0u8; 16];
        pack_fields(
            &mut bytes,
            random_a,
            tag_version(random_b, 4),
            tag_variant(random_c),
        );
        Self(bytes)
    }

    /// Creates a UUIDv7 from the millisecond timestamp, the 12-bit sub-millisecond fraction, and
    /// the 62-bit random tail.
    ///
    /// # Panics
    ///
    /// Panics if any argument exceeds its field width.
    pub fn from_fields_v7(unix_ts_ms: u64, sub_ms: u16, rand: u64) -> Self {
        assert!(
            unix_ts_ms <= MASK_48 && sub_ms < 1 << 12 && rand < 1 << 62,
            "invalid field value"
        );
        let mut bytes = [0u8; 16];
        pack_fields(
            &mut bytes,
            unix_ts_ms,
            tag_version(sub_ms, 7),
            tag_variant(rand),
        );
        Self(bytes)
    }

    /// Returns the 48-bit big-endian integer stored in the leading six bytes, which is the Unix
    /// timestamp in milliseconds for a UUIDv7.
    pub fn unix_ts_ms(&self) -> u64 {
        self.0[..6]
            .iter()
            .fold(0, |acc, e| (acc << 8) | u64::from(*e))
    }

    /// Returns the variant field.
    pub const fn variant(&self) -> Variant {
        match self.0[8] >> 4 {
            0x0..=0x7 => Variant::Var0,
            0x8..=0xb => Variant::Var10,
            0xc | 0xd => Variant::Var110,
            _ => Variant::VarReserved,
        }
    }

    /// Returns the version field if the variant is [`Variant::Var10`].
    pub const fn version(&self) -> Option<u8> {
        match self.variant() {
            Variant::Var10 => Some(self.0[6] >> 4),
            _ => None,
        }
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// string type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuidv7_mono::Uuid;
    ///
    /// let x = "01809424-3e59-7c05-9219-566f82fff672".parse::<Uuid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "01809424-3e59-7c05-9219-566f82fff672");
    /// assert_eq!(format!("{}", y), "01809424-3e59-7c05-9219-566f82fff672");
    /// # Ok::<(), uuidv7_mono::ParseError>(())
    /// ```
    pub fn encode(&self) -> FStr<36> {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buffer = [0u8; 36];
        let mut pos = 0;
        for (i, e) in self.0.iter().enumerate() {
            buffer[pos] = DIGITS[usize::from(e >> 4)];
            buffer[pos + 1] = DIGITS[usize::from(e & 15)];
            pos += 2;
            if i == 3 || i == 5 || i == 7 || i == 9 {
                buffer[pos] = b'-';
                pos += 1;
            }
        }
        debug_assert!(buffer.is_ascii());
        // SAFETY: the buffer consists of ASCII hex digits and hyphens only
        unsafe { FStr::from_inner_unchecked(buffer) }
    }
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Parses the 8-4-4-4-12 hexadecimal representation, accepting either letter case.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.as_bytes();
        if src.len() != 36 {
            return Err(ParseError {});
        }

        let mut digits = src.iter().enumerate().filter_map(|(pos, &c)| match pos {
            8 | 13 | 18 | 23 => None,
            _ => Some(c),
        });
        if [8, 13, 18, 23].iter().any(|&pos| src[pos] != b'-') {
            return Err(ParseError {});
        }

        let mut bytes = [0u8; 16];
        for e in bytes.iter_mut() {
            let (Some(hi), Some(lo)) = (digits.next(), digits.next()) else {
                return Err(ParseError {});
            };
            *e = (hex_value(hi)? << 4) | hex_value(lo)?;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(c: u8) -> Result<u8, ParseError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(ParseError {}),
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.encode().to_string()
    }
}

/// Error parsing an invalid string representation of UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("invalid string representation")]
pub struct ParseError {}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Uuid;

    impl From<Uuid> for uuid::Uuid {
        fn from(src: Uuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Uuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(UuidVisitor)
            } else {
                deserializer.deserialize_bytes(UuidVisitor)
            }
        }
    }

    /// Accepts the canonical string or the 16 raw bytes, whichever the format provides.
    struct UuidVisitor;

    impl de::Visitor<'_> for UuidVisitor {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a canonical UUID string or 16 bytes")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Uuid, E> {
            value.parse().map_err(E::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Uuid, E> {
            match <[u8; 16]>::try_from(value) {
                Ok(bytes) => Ok(Uuid(bytes)),
                Err(_) => Err(E::invalid_length(value.len(), &self)),
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::{Uuid, Variant};

    /// Returns a collection of prepared UUIDv7 cases
    fn prepare_cases() -> &'static [((u64, u16, u64), &'static str)] {
        const MAX_UINT48: u64 = (1 << 48) - 1;
        const MAX_UINT12: u16 = (1 << 12) - 1;
        const MAX_UINT62: u64 = (1 << 62) - 1;

        &[
            ((0, 0, 0), "00000000-0000-7000-8000-000000000000"),
            ((MAX_UINT48, 0, 0), "ffffffff-ffff-7000-8000-000000000000"),
            ((0, MAX_UINT12, 0), "00000000-0000-7fff-8000-000000000000"),
            ((0, 0, MAX_UINT62), "00000000-0000-7000-bfff-ffffffffffff"),
            (
                (MAX_UINT48, MAX_UINT12, MAX_UINT62),
                "ffffffff-ffff-7fff-bfff-ffffffffffff",
            ),
            (
                (0x17f22e279b0, 0xcc3, 0x18c4dc0c0c07398f),
                "017f22e2-79b0-7cc3-98c4-dc0c0c07398f",
            ),
        ]
    }

    /// Encodes and decodes prepared cases correctly
    #[test]
    fn encodes_and_decodes_prepared_cases_correctly() {
        for (fs, text) in prepare_cases() {
            let from_fields = Uuid::from_fields_v7(fs.0, fs.1, fs.2);
            assert_eq!(Ok(from_fields), text.parse());
            assert_eq!(Ok(from_fields), text.to_uppercase().parse());
            assert_eq!(&from_fields.encode() as &str, *text);
            assert_eq!(&from_fields.to_string(), text);
            assert_eq!(from_fields.unix_ts_ms(), fs.0);
            assert_eq!(from_fields.version(), Some(7));
            #[cfg(feature = "uuid")]
            assert_eq!(&uuid::Uuid::from(from_fields).to_string(), text);
        }
    }

    /// Builds UUIDv4 from random fields
    #[test]
    fn builds_uuidv4_from_random_fields() {
        let e = Uuid::from_fields_v4(0x2ca4_b2ce_6c13, 0xf0d4, 0xfccf_37d2_2282_0f6f);
        assert_eq!(&e.encode() as &str, "2ca4b2ce-6c13-40d4-bccf-37d222820f6f");
        assert_eq!(e.version(), Some(4));
        assert_eq!(e.variant(), Variant::Var10);
    }

    /// Returns error to invalid string representation
    #[test]
    fn returns_error_to_invalid_string_representation() {
        let cases = [
            "",
            " 0180a8f0-5b82-75b4-9fef-ecad657c30bb",
            "0180a8f0-5b84-7438-ab50-f0626f78002b ",
            "+0180a8f0-5b84-7438-ab50-f06405d35edb",
            "0180a8f05b847438ab50f068decfbfd7",
            "0180a8f0-5b847438-ab50-f06991838802",
            "{0180a8f0-5b84-7438-ab50-f06ac2e5e082}",
            "0180a8f0-5b84-74 8-ab50-f06bed27bdc7",
            "0180a8g0-5b84-7438-ab50-f06c91175b8a",
            "0180a8f0-5b84-7438-ab50_f06d3ea24429",
        ];

        for e in cases {
            assert!(e.parse::<Uuid>().is_err());
        }
    }

    /// Returns Nil and Max UUIDs with their variants
    #[test]
    fn returns_nil_and_max_uuids_with_their_variants() {
        assert_eq!(&Uuid::NIL.encode() as &str, "00000000-0000-0000-0000-000000000000");
        assert_eq!(&Uuid::MAX.encode() as &str, "ffffffff-ffff-ffff-ffff-ffffffffffff");
        assert_eq!(Uuid::NIL.variant(), Variant::Var0);
        assert_eq!(Uuid::MAX.variant(), Variant::VarReserved);
        assert_eq!(Uuid::NIL.version(), None);
        assert_eq!(Uuid::MAX.version(), None);
    }

    /// Has symmetric converters
    #[test]
    fn has_symmetric_converters() {
        for (fs, _) in prepare_cases() {
            let e = Uuid::from_fields_v7(fs.0, fs.1, fs.2);
            assert_eq!(Uuid::from(<[u8; 16]>::from(e)), e);
            assert_eq!(Uuid::from(u128::from(e)), e);
            assert_eq!(e.encode().parse(), Ok(e));
            assert_eq!(String::from(e).to_uppercase().parse(), Ok(e));
            #[cfg(feature = "uuid")]
            assert_eq!(Uuid::from(<uuid::Uuid>::from(e)), e);
        }
    }
}
