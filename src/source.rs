//! Interfaces to the external collaborators of the generators and their standard
//! implementations.

use std::sync::{Mutex, PoisonError};
use std::{thread, time};

use rand::RngCore;

use crate::GenerateError;

/// A cryptographically secure source of random bytes.
pub trait RandSource {
    /// Fills `dest` entirely with random data, or returns the error that prevented it.
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

/// A high-resolution clock returning microseconds since the Unix epoch.
///
/// Implementations need not be monotonic: stalls and backward jumps are absorbed by
/// [`MonotonicGenerator`](crate::MonotonicGenerator).
pub trait Clock {
    /// Returns the current time in microseconds.
    fn now(&self) -> u64;
}

/// A primitive that blocks the calling thread.
pub trait Sleep {
    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: time::Duration);
}

/// A sink for faults that do not abort identifier generation.
pub trait Reporter {
    /// Called once for each failed draw from the random source.
    fn report(&self, error: &GenerateError);
}

/// The operating system's random number generator.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct OsRandom;

impl RandSource for OsRandom {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        rand::rngs::OsRng.try_fill_bytes(dest)
    }
}

/// An adapter that implements [`RandSource`] for [`RngCore`] types from `rand` (v0.8) crate.
///
/// The wrapped generator is shared by all callers through a mutex.
#[derive(Debug, Default)]
pub struct Adapter<T>(Mutex<T>);

impl<T: RngCore> Adapter<T> {
    /// Wraps `rng`.
    pub const fn new(rng: T) -> Self {
        Self(Mutex::new(rng))
    }
}

impl<T: RngCore> RandSource for Adapter<T> {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_fill_bytes(dest)
    }
}

/// The system real-time clock.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // a clock set before the epoch reads as zero and is handled as a rollback
        time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .map_or(0, |d| d.as_micros() as u64)
    }
}

impl<F: Fn() -> u64> Clock for F {
    fn now(&self) -> u64 {
        self()
    }
}

/// Blocks via [`std::thread::sleep`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: time::Duration) {
        thread::sleep(duration);
    }
}

/// Forwards faults to the `log` facade at the error level.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, error: &GenerateError) {
        match error {
            GenerateError::Entropy { source, .. } => log::error!("{error}: {source}"),
        }
    }
}

/// Fills `dest` from `rand`, reporting a failure and zeroing `dest` if the draw fails.
///
/// The first failure of a call is kept in `first` so that it can be returned to the caller.
pub(crate) fn draw<R, P>(
    rand: &R,
    reporter: &P,
    version: u8,
    dest: &mut [u8],
    first: &mut Option<GenerateError>,
) where
    R: RandSource + ?Sized,
    P: Reporter + ?Sized,
{
    if let Err(source) = rand.try_fill(dest) {
        dest.fill(0);
        let error = GenerateError::Entropy { version, source };
        reporter.report(&error);
        first.get_or_insert(error);
    }
}
