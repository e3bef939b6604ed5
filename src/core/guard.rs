//! Single-use access guard for handle instances.
//!
//! Each handle instance owns one guard. Under [`Locking::LockAfterUse`] the
//! guard flips to locked once the handle has served an operation, so a
//! superseded handle cannot be reused.

use crate::error::FluentError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether a handle is consumed by the operations it serves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locking {
    /// The serving handle is locked after every successful operation.
    LockAfterUse,
    /// Handles stay usable, so one handle can branch into several
    /// independent continuations.
    #[default]
    NeverLock,
}

/// Whether operations may run without their owning handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// Operations only run on the handle they were taken from.
    #[default]
    HardBound,
    /// Operations may be rebound to other handles or called as free
    /// functions over an explicit state.
    DetachAllowed,
}

impl Binding {
    pub fn allows_detach(&self) -> bool {
        matches!(self, Binding::DetachAllowed)
    }
}

/// Lock bit for one handle instance.
///
/// States: Active -> Claimed -> Locked. A failed operation releases its
/// claim back to Active. Locked is terminal for the instance.
///
/// # Example
///
/// ```rust
/// use retrace::core::{AccessGuard, Locking};
///
/// let guard = AccessGuard::new(Locking::LockAfterUse);
/// assert!(guard.check().is_ok());
///
/// let claim = guard.claim().unwrap();
/// assert!(guard.claim().is_err());
/// claim.commit();
/// assert!(guard.is_locked());
///
/// let relaxed = AccessGuard::new(Locking::NeverLock);
/// relaxed.claim().unwrap().commit();
/// assert!(relaxed.check().is_ok());
/// ```
#[derive(Debug)]
pub struct AccessGuard {
    locking: Locking,
    locked: AtomicBool,
}

impl AccessGuard {
    pub fn new(locking: Locking) -> Self {
        Self {
            locking,
            locked: AtomicBool::new(false),
        }
    }

    /// Guard that never locks, used by the mutable modes.
    pub fn unlocked() -> Self {
        Self::new(Locking::NeverLock)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Fail with [`FluentError::Locked`] if the handle was already consumed.
    pub fn check(&self) -> Result<(), FluentError> {
        if self.is_locked() {
            Err(FluentError::Locked)
        } else {
            Ok(())
        }
    }

    /// Take the handle for one consuming operation.
    ///
    /// Under [`Locking::LockAfterUse`] the bit is set atomically, so of two
    /// concurrent callers only one gets a claim. The claim releases the
    /// bit when dropped without [`Claim::commit`].
    pub fn claim(&self) -> Result<Claim<'_>, FluentError> {
        let armed = match self.locking {
            Locking::LockAfterUse => {
                self.locked
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .map_err(|_| FluentError::Locked)?;
                true
            }
            Locking::NeverLock => {
                self.check()?;
                false
            }
        };
        Ok(Claim { guard: self, armed })
    }
}

/// Pending use of a guarded handle.
#[must_use = "dropping a claim without committing releases the handle"]
#[derive(Debug)]
pub struct Claim<'a> {
    guard: &'a AccessGuard,
    armed: bool,
}

impl Claim<'_> {
    /// Keep the handle locked. Returns true when this claim locked it.
    pub fn commit(mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.guard.locked.store(false, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn new_guard_is_active() {
        let guard = AccessGuard::new(Locking::LockAfterUse);
        assert!(!guard.is_locked());
        assert!(guard.check().is_ok());
    }

    #[test]
    fn committed_claim_is_terminal() {
        let guard = AccessGuard::new(Locking::LockAfterUse);

        assert!(guard.claim().unwrap().commit());
        assert!(guard.is_locked());

        let err = guard.claim().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Locked);
        let err = guard.check().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Locked);
    }

    #[test]
    fn dropped_claim_releases() {
        let guard = AccessGuard::new(Locking::LockAfterUse);
        {
            let _claim = guard.claim().unwrap();
            assert!(guard.is_locked());
            assert!(guard.claim().is_err());
        }
        assert!(!guard.is_locked());
        assert!(guard.claim().is_ok());
    }

    #[test]
    fn concurrent_claims_admit_one() {
        let guard = &AccessGuard::new(Locking::LockAfterUse);
        let barrier = &std::sync::Barrier::new(8);

        let granted = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(move |_| {
                    scope.spawn(move || {
                        barrier.wait();
                        guard.claim().map(Claim::commit).is_ok()
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join())
                .filter(|granted| matches!(granted, Ok(true)))
                .count()
        });

        assert_eq!(granted, 1);
    }

    #[test]
    fn never_lock_claims_freely() {
        let guard = AccessGuard::new(Locking::NeverLock);
        assert!(!guard.claim().unwrap().commit());
        assert!(!guard.claim().unwrap().commit());
        assert!(!guard.is_locked());
        assert!(guard.check().is_ok());
    }

    #[test]
    fn unlocked_guard_never_locks() {
        let guard = AccessGuard::unlocked();
        let _ = guard.claim().map(Claim::commit);
        assert!(guard.check().is_ok());
    }

    #[test]
    fn binding_detach_flag() {
        assert!(!Binding::HardBound.allows_detach());
        assert!(Binding::DetachAllowed.allows_detach());
        assert_eq!(Binding::default(), Binding::HardBound);
        assert_eq!(Locking::default(), Locking::NeverLock);
    }

    #[test]
    fn options_enums_serialize_snake_case() {
        let json = serde_json::to_string(&Locking::LockAfterUse).unwrap();
        assert_eq!(json, "\"lock_after_use\"");
        let binding: Binding = serde_json::from_str("\"detach_allowed\"").unwrap();
        assert_eq!(binding, Binding::DetachAllowed);
    }
}
