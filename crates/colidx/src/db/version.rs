use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    value::Value,
};
use derive_more::{Deref, Display};
use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};
use ulid::{Generator, Ulid};

///
/// Version
///
/// Logical timestamp minted once per write call. It resolves conflicting
/// writes to the same column (higher wins) and is embedded in index and
/// history column keys so the two can be correlated and retired together.
///

#[derive(Clone, Copy, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version(Ulid);

impl Version {
    /// Lowest version; history scans start here.
    pub const ZERO: Self = Self(Ulid(0));

    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    #[must_use]
    pub const fn as_ulid(self) -> Ulid {
        self.0
    }

    #[must_use]
    pub const fn to_value(self) -> Value {
        Value::Ulid(self.0)
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_bytes()
    }
}

///
/// VersionSource
///
/// Clock collaborator. Successive calls must return strictly increasing
/// versions; sharing one source across callers keeps that property global.
///

pub trait VersionSource: Send + Sync {
    fn next_version(&self) -> Result<Version, InternalError>;
}

///
/// UlidClock
///
/// Wall-clock ulids, kept strictly monotonic within one millisecond.
///

pub struct UlidClock {
    generator: Mutex<Generator>,
}

impl UlidClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generator: Mutex::new(Generator::new()),
        }
    }
}

impl Default for UlidClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionSource for UlidClock {
    fn next_version(&self) -> Result<Version, InternalError> {
        let mut generator = self
            .generator
            .lock()
            .map_err(|_| InternalError::index_internal("version clock lock poisoned"))?;
        let ulid = generator
            .generate()
            .map_err(|err| {
                // the millisecond's random space is exhausted; the next one frees it
                InternalError::new(
                    ErrorClass::Unavailable,
                    ErrorOrigin::Index,
                    format!("version clock: {err}"),
                )
            })?;

        Ok(Version(ulid))
    }
}

///
/// SequenceClock
///
/// Deterministic counter clock for replay and tests.
///

#[derive(Debug)]
pub struct SequenceClock {
    next: AtomicU64,
}

impl SequenceClock {
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequenceClock {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl VersionSource for SequenceClock {
    fn next_version(&self) -> Result<Version, InternalError> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);

        Ok(Version(Ulid(u128::from(n))))
    }
}

///
/// TESTS
///
