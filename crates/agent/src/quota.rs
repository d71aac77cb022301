//! Per-session dispatch ceiling.

use penwright_core::error::DispatchError;
use penwright_core::session::Session;

/// Number of paid dispatches a session gets when nothing else is configured.
pub const DEFAULT_CEILING: u32 = 5;

/// Caps how many tool dispatches a single session may make.
///
/// The guard holds no state of its own; the count lives on the [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaGuard {
    ceiling: u32,
}

impl QuotaGuard {
    pub fn new(ceiling: u32) -> Self {
        Self { ceiling }
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// True while the session is still under the ceiling.
    pub fn can_dispatch(&self, session: &Session) -> bool {
        session.usage_count() < self.ceiling
    }

    /// Like [`can_dispatch`](Self::can_dispatch), but as the error a refused
    /// dispatch reports.
    pub fn check(&self, session: &Session) -> Result<(), DispatchError> {
        if self.can_dispatch(session) {
            return Ok(());
        }
        Err(DispatchError::ExhaustedQuota {
            used: session.usage_count(),
            ceiling: self.ceiling,
        })
    }

    /// Count one successful dispatch. Call only after the downstream call
    /// has returned.
    pub fn record_usage(&self, session: &mut Session) {
        session.increment_usage();
    }

    pub fn remaining(&self, session: &Session) -> u32 {
        self.ceiling.saturating_sub(session.usage_count())
    }
}

impl Default for QuotaGuard {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penwright_core::session::UserIdentity;

    fn session() -> Session {
        Session::new(UserIdentity::new("alice"))
    }

    #[test]
    fn allows_exactly_ceiling_dispatches() {
        let guard = QuotaGuard::default();
        let mut session = session();
        for _ in 0..DEFAULT_CEILING {
            assert!(guard.can_dispatch(&session));
            guard.record_usage(&mut session);
        }
        assert_eq!(session.usage_count(), 5);
        assert!(!guard.can_dispatch(&session));
        assert_eq!(guard.remaining(&session), 0);
    }

    #[test]
    fn check_reports_usage_and_ceiling() {
        let guard = QuotaGuard::new(1);
        let mut session = session();
        assert!(guard.check(&session).is_ok());
        guard.record_usage(&mut session);

        match guard.check(&session) {
            Err(DispatchError::ExhaustedQuota { used, ceiling }) => {
                assert_eq!(used, 1);
                assert_eq!(ceiling, 1);
            }
            other => panic!("expected exhausted quota, got {other:?}"),
        }
    }

    #[test]
    fn remaining_counts_down() {
        let guard = QuotaGuard::new(3);
        let mut session = session();
        assert_eq!(guard.remaining(&session), 3);
        guard.record_usage(&mut session);
        assert_eq!(guard.remaining(&session), 2);
    }

    #[test]
    fn zero_ceiling_refuses_everything() {
        let guard = QuotaGuard::new(0);
        assert!(!guard.can_dispatch(&session()));
    }

    #[test]
    fn new_session_starts_fresh() {
        let guard = QuotaGuard::new(1);
        let mut first = session();
        guard.record_usage(&mut first);
        assert!(!guard.can_dispatch(&first));
        assert!(guard.can_dispatch(&session()));
    }
}
