//! Monotonic UUIDv7 generator and related types.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::pack::{pack_fields, tag_variant, tag_version, MASK_48};
use crate::source::{draw, Clock, LogReporter, OsRandom, RandSource, Reporter, Sleep};
use crate::source::{SystemClock, ThreadSleep};
use crate::{EntropyPolicy, GenerateError, Uuid};

/// Tunables of a [`MonotonicGenerator`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Config {
    /// The amount of borrowed time, in microseconds, above which a caller is put to sleep.
    pub max_debt: u64,

    /// How long a caller sleeps once the debt exceeds `max_debt`.
    pub backoff: Duration,

    /// What `generate` returns after an entropy failure.
    pub entropy_policy: EntropyPolicy,
}

impl Config {
    /// Sets `max_debt`.
    pub const fn with_max_debt(mut self, max_debt: u64) -> Self {
        self.max_debt = max_debt;
        self
    }

    /// Sets `backoff`.
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets `entropy_policy`.
    pub const fn with_entropy_policy(mut self, entropy_policy: EntropyPolicy) -> Self {
        self.entropy_policy = entropy_policy;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_debt: 500_000,
            backoff: Duration::from_millis(250),
            entropy_policy: EntropyPolicy::BestEffort,
        }
    }
}

/// A snapshot of the state shared by all callers of a [`MonotonicGenerator`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct GeneratorState {
    /// The tick, in microseconds, embedded in the most recent identifier.
    pub last_tick: u64,

    /// The amount of time, in microseconds, that `last_tick` has been pushed ahead of the clock
    /// and not yet paid back.
    pub debt: u64,
}

impl GeneratorState {
    /// Reconciles the clock reading `tv` with the last tick and returns the tick to embed,
    /// together with whether the caller has to back off.
    ///
    /// A stalled reading adds the whole lead of the last tick over the clock to the debt, so the
    /// debt grows quadratically while the clock stays put. Once it exceeds `max_debt`, half of
    /// `max_debt` is written off here, under the same lock, so that a single crossing puts a
    /// single caller to sleep.
    fn reconcile(&mut self, mut tv: u64, max_debt: u64) -> (u64, bool) {
        let mut over_limit = false;
        if tv > self.last_tick {
            // pay back borrowed time while staying ahead of the last tick
            let repay = self.debt.min(tv - self.last_tick - 1);
            tv -= repay;
            self.debt -= repay;
        } else {
            // clock stalled or went backwards
            self.debt += self.last_tick - tv + 1;
            tv = self.last_tick + 1;
            if self.debt > max_debt {
                self.debt -= max_debt / 2;
                over_limit = true;
            }
        }
        self.last_tick = tv;
        (tv, over_limit)
    }
}

/// Generates UUIDv7 identifiers that strictly increase across all callers sharing the
/// generator, even when the clock stalls or moves backwards.
///
/// The generator embeds a microsecond tick: the 48-bit `unix_ts_ms` field holds the tick in
/// milliseconds, and the 12-bit field next to the version holds the sub-millisecond remainder
/// scaled from 0..=999 onto 0..=4091 (RFC 9562, section 6.2, method 3). The remaining 62 bits are
/// random. This layout is not bit-compatible with generators that fill the 12-bit field with
/// random bits or a counter.
///
/// Each call takes a tick strictly greater than the previous one. When the clock does not
/// advance past the last tick, the generator borrows time by moving one microsecond ahead and
/// records the lead over the clock as debt, which is paid back as soon as the clock moves forward
/// again. When the debt exceeds [`Config::max_debt`], half of `max_debt` is written off and the
/// caller that pushed it over sleeps for [`Config::backoff`] outside the lock.
///
/// The sub-millisecond field is computed as `(us * 4096) / 1000` in integer arithmetic. This is
/// `floor(4.096 * us)` exactly, so it differs by one from implementations that truncate a
/// floating-point product at multiples of 125 microseconds (512 rather than 511 at 125 us).
///
/// # Examples
///
/// ```rust
/// use std::thread;
/// use uuidv7_mono::MonotonicGenerator;
///
/// let g = MonotonicGenerator::init();
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = &g;
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.generate_uuid().unwrap(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// g.end();
/// ```
#[derive(Debug)]
pub struct MonotonicGenerator<R = OsRandom, C = SystemClock, S = ThreadSleep, P = LogReporter> {
    state: Mutex<GeneratorState>,
    config: Config,
    rand: R,
    clock: C,
    sleep: S,
    reporter: P,
}

impl MonotonicGenerator {
    /// Creates a generator backed by the OS random number generator and the system clock.
    pub fn init() -> Self {
        Self::with_sources(OsRandom, SystemClock)
    }
}

impl Default for MonotonicGenerator {
    fn default() -> Self {
        Self::init()
    }
}

impl<R: RandSource, C: Clock> MonotonicGenerator<R, C> {
    /// Creates a generator with the specified random source and clock and the default
    /// configuration.
    pub fn with_sources(rand: R, clock: C) -> Self {
        Self {
            state: Mutex::default(),
            config: Config::default(),
            rand,
            clock,
            sleep: ThreadSleep,
            reporter: LogReporter,
        }
    }
}

impl<R, C, S, P> MonotonicGenerator<R, C, S, P>
where
    R: RandSource,
    C: Clock,
    S: Sleep,
    P: Reporter,
{
    /// Replaces the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the primitive used for backpressure sleeps.
    pub fn with_sleep<T: Sleep>(self, sleep: T) -> MonotonicGenerator<R, C, T, P> {
        MonotonicGenerator {
            state: self.state,
            config: self.config,
            rand: self.rand,
            clock: self.clock,
            sleep,
            reporter: self.reporter,
        }
    }

    /// Replaces the sink that receives entropy failures.
    pub fn with_reporter<Q: Reporter>(self, reporter: Q) -> MonotonicGenerator<R, C, S, Q> {
        MonotonicGenerator {
            state: self.state,
            config: self.config,
            rand: self.rand,
            clock: self.clock,
            sleep: self.sleep,
            reporter,
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a snapshot of the shared state.
    pub fn state(&self) -> GeneratorState {
        *self.lock_state()
    }

    /// Writes a new UUIDv7 into `out`.
    ///
    /// A failed random draw is reported once and leaves the random tail zeroed; `out` is always
    /// written, and the return value follows [`Config::entropy_policy`].
    pub fn generate(&self, out: &mut [u8; 16]) -> Result<(), GenerateError> {
        let tick = self.next_tick();

        let mut first = None;
        let mut rand = [0u8; 8];
        draw(&self.rand, &self.reporter, 7, &mut rand, &mut first);

        pack_fields(
            out,
            (tick / 1000) & MASK_48,
            tag_version(sub_ms(tick), 7),
            tag_variant(u64::from_be_bytes(rand)),
        );
        self.config.entropy_policy.resolve(first)
    }

    /// Generates a new UUIDv7 object.
    pub fn generate_uuid(&self) -> Result<Uuid, GenerateError> {
        let mut bytes = [0u8; 16];
        self.generate(&mut bytes).map(|()| Uuid::from(bytes))
    }

    /// Tears down the generator, returning the final state.
    pub fn end(self) -> GeneratorState {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        log::debug!(
            "monotonic generator ended at tick {} with debt {}",
            state.last_tick,
            state.debt
        );
        state
    }

    /// Reads the clock and reserves the next tick, applying backpressure if needed.
    fn next_tick(&self) -> u64 {
        let tv = self.clock.now();
        let (tick, over_limit) = self.lock_state().reconcile(tv, self.config.max_debt);

        // the guard is gone by now; other callers proceed while this one sleeps
        if over_limit {
            log::warn!(
                "borrowed time exceeded {} us; sleeping for {:?}",
                self.config.max_debt,
                self.config.backoff
            );
            self.sleep.sleep(self.config.backoff);
        }
        tick
    }

    fn lock_state(&self) -> MutexGuard<'_, GeneratorState> {
        // the state is never left half-updated, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Maps the sub-millisecond part of a microsecond tick onto 12 bits.
const fn sub_ms(tick: u64) -> u16 {
    ((tick % 1000) * 4096 / 1000) as u16
}
