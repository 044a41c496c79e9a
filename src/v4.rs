//! UUIDv4 generator.

use crate::pack::{pack_fields, tag_variant, tag_version, MASK_48};
use crate::source::{draw, LogReporter, OsRandom, RandSource, Reporter};
use crate::{EntropyPolicy, GenerateError, Uuid};

/// Generates UUIDv4 identifiers made of 122 random bits.
///
/// The generator holds no mutable state and takes no lock, so a single instance can be shared by
/// reference among any number of threads.
///
/// # Examples
///
/// ```rust
/// use uuidv7_mono::RandomGenerator;
///
/// let g: RandomGenerator = RandomGenerator::default();
/// let mut buffer = [0u8; 16];
/// g.generate(&mut buffer)?;
/// assert_eq!(buffer[6] >> 4, 4);
/// # Ok::<(), uuidv7_mono::GenerateError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct RandomGenerator<R = OsRandom, P = LogReporter> {
    rand: R,
    reporter: P,
    policy: EntropyPolicy,
}

impl<R: RandSource> RandomGenerator<R> {
    /// Creates a generator drawing from `rand` and logging entropy failures.
    pub const fn new(rand: R) -> Self {
        Self {
            rand,
            reporter: LogReporter,
            policy: EntropyPolicy::BestEffort,
        }
    }
}

impl<R: RandSource, P: Reporter> RandomGenerator<R, P> {
    /// Replaces the sink that receives entropy failures.
    pub fn with_reporter<Q: Reporter>(self, reporter: Q) -> RandomGenerator<R, Q> {
        RandomGenerator {
            rand: self.rand,
            reporter,
            policy: self.policy,
        }
    }

    /// Sets what [`generate`](Self::generate) returns after an entropy failure.
    pub fn with_entropy_policy(mut self, policy: EntropyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Writes a new UUIDv4 into `out`.
    ///
    /// The 48-, 16- and 64-bit fields are drawn independently. Every failed draw is reported
    /// once and leaves zero bits in its field; `out` is always written, and the return value
    /// follows the configured [`EntropyPolicy`].
    pub fn generate(&self, out: &mut [u8; 16]) -> Result<(), GenerateError> {
        let mut first = None;
        let mut random_a = [0u8; 8];
        let mut random_b = [0u8; 2];
        let mut random_c = [0u8; 8];
        draw(&self.rand, &self.reporter, 4, &mut random_a[2..], &mut first);
        draw(&self.rand, &self.reporter, 4, &mut random_b, &mut first);
        draw(&self.rand, &self.reporter, 4, &mut random_c, &mut first);

        pack_fields(
            out,
            u64::from_be_bytes(random_a) & MASK_48,
            tag_version(u16::from_be_bytes(random_b), 4),
            tag_variant(u64::from_be_bytes(random_c)),
        );
        self.policy.resolve(first)
    }

    /// Generates a new UUIDv4 object.
    pub fn generate_uuid(&self) -> Result<Uuid, GenerateError> {
        let mut bytes = [0u8; 16];
        self.generate(&mut bytes).map(|()| Uuid::from(bytes))
    }
}
