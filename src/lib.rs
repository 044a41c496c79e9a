//! Monotonic UUIDv7 and random UUIDv4 generators
//!
//! ```rust
//! use uuidv7_mono::MonotonicGenerator;
//!
//! let g = MonotonicGenerator::init();
//! let mut buffer = [0u8; 16];
//! g.generate(&mut buffer)?;
//! println!("{:?}", buffer); // as 16-byte big-endian array
//!
//! let uuid = g.generate_uuid()?;
//! println!("{}", uuid); // e.g. "01809424-3e59-7c05-9219-566f82fff672"
//! g.end();
//! # Ok::<(), uuidv7_mono::GenerateError>(())
//! ```
//!
//! See [RFC 9562](https://www.rfc-editor.org/rfc/rfc9562).
//!
//! # Field and bit layout
//!
//! [`MonotonicGenerator`] produces identifiers with the following bit layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          unix_ts_ms                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          unix_ts_ms           |  ver  |        sub_ms         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|                          rand                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             rand                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 48-bit `unix_ts_ms` field is dedicated to the Unix timestamp in milliseconds.
//! - The 4-bit `ver` field is set at `0111`.
//! - The 12-bit `sub_ms` field holds the microseconds within the millisecond, scaled from
//!   0..=999 onto 0..=4091.
//! - The 2-bit `var` field is set at `10`.
//! - The remaining 62 `rand` bits are filled with a cryptographically strong random number.
//!
//! Every call of a generator embeds a microsecond tick strictly greater than the previous one.
//! When the system clock stalls or moves backwards, the generator runs ahead of the clock and
//! records the lead as debt, paying it back once the clock advances again. When the debt grows
//! beyond half a second, the caller that pushed it over sleeps for a quarter of a second, so the
//! embedded timestamps never drift far from the real-time clock.
//!
//! # Other features
//!
//! This library also generates UUID version 4 with [`RandomGenerator`], and offers process-wide
//! generators with an explicit `init`/`end` lifecycle:
//!
//! ```rust
//! uuidv7_mono::init();
//! let uuid = uuidv7_mono::uuid4();
//! println!("{}", uuid); // e.g. "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
//! uuidv7_mono::end();
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
pub use error::{EntropyPolicy, GenerateError};

mod id;
pub use id::{ParseError, Uuid, Variant};

mod pack;
pub use pack::pack_fields;

pub mod source;
pub use source::{Clock, OsRandom, RandSource, Reporter, Sleep};

mod v4;
pub use v4::RandomGenerator;

pub mod v7;
#[doc(inline)]
pub use v7::{Config, GeneratorState, MonotonicGenerator};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{end, generate_v4, generate_v7, init, uuid4, uuid7};
