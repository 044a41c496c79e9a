//! Process-wide generators and their `init`/`end` lifecycle.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync::{Arc, PoisonError, RwLock};

use crate::source::{LogReporter, SystemClock, ThreadSleep};
use crate::{MonotonicGenerator, RandomGenerator, Uuid};
use inner::ReseedingRandom;

type GlobalV7 = MonotonicGenerator<ReseedingRandom, SystemClock, ThreadSleep, LogReporter>;
type GlobalV4 = RandomGenerator<ReseedingRandom, LogReporter>;

#[derive(Debug)]
struct Globals {
    v7: GlobalV7,
    v4: GlobalV4,
}

static GLOBALS: RwLock<Option<Arc<Globals>>> = RwLock::new(None);

/// Creates the process-wide generators. Does nothing if they already exist.
pub fn init() {
    let mut globals = GLOBALS.write().unwrap_or_else(PoisonError::into_inner);
    if globals.is_none() {
        *globals = Some(Arc::new(Globals {
            v7: MonotonicGenerator::with_sources(ReseedingRandom, SystemClock),
            v4: RandomGenerator::new(ReseedingRandom),
        }));
        log::debug!("process-wide generators initialized");
    }
}

/// Tears down the process-wide generators. Does nothing if they do not exist.
///
/// Calls already in progress complete with the generators they started with.
pub fn end() {
    let globals = GLOBALS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(globals) = globals {
        let state = globals.v7.state();
        log::debug!(
            "process-wide generators ended at tick {} with debt {}",
            state.last_tick,
            state.debt
        );
    }
}

/// Returns the process-wide generators.
///
/// # Panics
///
/// Panics if called outside the window between [`init`] and [`end`].
fn globals() -> Arc<Globals> {
    match &*GLOBALS.read().unwrap_or_else(PoisonError::into_inner) {
        Some(globals) => Arc::clone(globals),
        None => panic!("process-wide generators used outside the init/end window"),
    }
}

/// Writes a new UUIDv7 into `out` using the process-wide generator.
///
/// The order of the identifiers is guaranteed process-wide. The process-wide generators always
/// run under [`EntropyPolicy::BestEffort`](crate::EntropyPolicy::BestEffort): a failed random
/// draw is logged at the error level and leaves zero bits behind, and `out` is always written.
/// Use a [`MonotonicGenerator`] handle configured with
/// [`EntropyPolicy::Propagate`](crate::EntropyPolicy::Propagate) to observe such failures.
///
/// # Panics
///
/// Panics if called outside the window between [`init`] and [`end`].
pub fn generate_v7(out: &mut [u8; 16]) {
    // BestEffort resolves to Ok after reporting
    let _ = globals().v7.generate(out);
}

/// Writes a new UUIDv4 into `out` using the process-wide generator.
///
/// Like [`generate_v7`], this runs under the fixed
/// [`EntropyPolicy::BestEffort`](crate::EntropyPolicy::BestEffort) policy; use a
/// [`RandomGenerator`] handle to choose another.
///
/// # Panics
///
/// Panics if called outside the window between [`init`] and [`end`].
pub fn generate_v4(out: &mut [u8; 16]) {
    let _ = globals().v4.generate(out);
}

/// Generates a UUIDv7 object.
///
/// # Examples
///
/// ```rust
/// uuidv7_mono::init();
/// let uuid = uuidv7_mono::uuid7();
/// println!("{uuid}"); // e.g., "01809424-3e59-7c05-9219-566f82fff672"
/// println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
/// uuidv7_mono::end();
/// ```
///
/// # Panics
///
/// Panics if called outside the window between [`init`] and [`end`].
pub fn uuid7() -> Uuid {
    let mut bytes = [0u8; 16];
    generate_v7(&mut bytes);
    Uuid::from(bytes)
}

/// Generates a UUIDv4 object.
///
/// # Examples
///
/// ```rust
/// uuidv7_mono::init();
/// let uuid = uuidv7_mono::uuid4();
/// println!("{uuid}"); // e.g., "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
/// uuidv7_mono::end();
/// ```
///
/// # Panics
///
/// Panics if called outside the window between [`init`] and [`end`].
pub fn uuid4() -> Uuid {
    let mut bytes = [0u8; 16];
    generate_v4(&mut bytes);
    Uuid::from(bytes)
}

mod inner {
    use std::cell::RefCell;

    use rand::rngs::{adapter::ReseedingRng, OsRng};
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha12Core;

    use crate::source::RandSource;

    type Core = ReseedingRng<ChaCha12Core, OsRng>;

    thread_local! {
        static RNG: RefCell<Option<Core>> = const { RefCell::new(None) };
    }

    /// A per-thread ChaCha12 generator seeded from, and reseeded every 64 KiB by, the OS random
    /// number generator, emulating the strategy of `ThreadRng` from `rand`.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ReseedingRandom;

    impl RandSource for ReseedingRandom {
        fn try_fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
            RNG.with(|cell| {
                let mut slot = cell.borrow_mut();
                let rng = match slot.take() {
                    Some(rng) => rng,
                    None => ReseedingRng::new(ChaCha12Core::from_rng(OsRng)?, 1024 * 64, OsRng),
                };
                slot.insert(rng).try_fill_bytes(dest)
            })
        }
    }
}
