//! Temporary ownership of a host flag.

use bevy::log::debug;

use super::host::{HostFlag, MapSurface};

/// Holds a host flag at a forced value and remembers what it was before.
///
/// The host is not owned, so the lease cannot restore itself on drop; every
/// exit path must hand it back through [`FlagLease::release`].
#[must_use = "a dropped lease leaves the host flag overridden"]
#[derive(Debug, PartialEq, Eq)]
pub struct FlagLease {
    flag: HostFlag,
    prior: bool,
}

impl FlagLease {
    pub fn acquire<H: MapSurface + ?Sized>(host: &mut H, flag: HostFlag, held: bool) -> Self {
        let prior = host.flag(flag);
        host.set_flag(flag, held);
        debug!("Acquired {:?} (was {}, now {})", flag, prior, held);
        Self { flag, prior }
    }

    pub fn release<H: MapSurface + ?Sized>(self, host: &mut H) {
        host.set_flag(self.flag, self.prior);
        debug!("Restored {:?} to {}", self.flag, self.prior);
    }
}

/// Release the lease in `slot`, if any.
pub fn release_slot<H: MapSurface + ?Sized>(slot: &mut Option<FlagLease>, host: &mut H) {
    if let Some(lease) = slot.take() {
        lease.release(host);
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::StubSurface;
    use super::*;

    #[test]
    fn test_lease_restores_prior_disabled_state() {
        let mut host = StubSurface::default();
        host.set_flag(HostFlag::DoubleClickZoom, false);

        let lease = FlagLease::acquire(&mut host, HostFlag::DoubleClickZoom, false);
        assert_eq!(
            lease,
            FlagLease {
                flag: HostFlag::DoubleClickZoom,
                prior: false
            }
        );
        lease.release(&mut host);

        assert!(!host.flag(HostFlag::DoubleClickZoom));
    }

    #[test]
    fn test_lease_restores_prior_enabled_state() {
        let mut host = StubSurface::default();
        let lease = FlagLease::acquire(&mut host, HostFlag::MarkerPointerEvents, false);
        assert!(!host.flag(HostFlag::MarkerPointerEvents));
        lease.release(&mut host);
        assert!(host.flag(HostFlag::MarkerPointerEvents));
    }

    #[test]
    fn test_release_slot_is_idempotent() {
        let mut host = StubSurface::default();
        let mut slot = Some(FlagLease::acquire(
            &mut host,
            HostFlag::DoubleClickZoom,
            false,
        ));
        release_slot(&mut slot, &mut host);
        host.set_flag(HostFlag::DoubleClickZoom, false);
        release_slot(&mut slot, &mut host);
        assert!(slot.is_none());
        assert!(!host.flag(HostFlag::DoubleClickZoom));
    }
}
