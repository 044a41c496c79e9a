//! Error and entropy-failure policy types.

use thiserror::Error;

/// Error reported when a generator could not obtain all of its random bits.
///
/// The output buffer is always written even when this error is produced; the random section of
/// such an identifier contains zero bits where the failed draws would have gone.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A draw from the random source failed.
    #[error("failed to generate the random section of UUIDv{version}")]
    Entropy {
        /// The version of the identifier being generated.
        version: u8,

        /// The error returned by the random source.
        #[source]
        source: rand::Error,
    },
}

/// Specifies what `generate` returns after a failed random draw has been reported.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum EntropyPolicy {
    /// Reports the failure and returns `Ok(())` with the degraded identifier in the buffer.
    #[default]
    BestEffort,

    /// Reports the failure and returns the first [`GenerateError`] of the call.
    Propagate,
}

impl EntropyPolicy {
    /// Converts the first failure observed during a call into the call's return value.
    pub(crate) fn resolve(self, first: Option<GenerateError>) -> Result<(), GenerateError> {
        match (self, first) {
            (Self::Propagate, Some(err)) => Err(err),
            _ => Ok(()),
        }
    }
}
