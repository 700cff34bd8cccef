use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// True while a time-series run is in flight. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct MonitoringFlag {
    active: Arc<AtomicBool>,
}

impl MonitoringFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Raises the flag, or returns `None` if a run already holds it.
    pub fn try_begin(&self) -> Option<MonitoringGuard> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| MonitoringGuard {
                active: self.active.clone(),
            })
    }
}

/// Lowers the flag when dropped.
#[derive(Debug)]
pub struct MonitoringGuard {
    active: Arc<AtomicBool>,
}

impl Drop for MonitoringGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_and_releases_on_drop() {
        let flag = MonitoringFlag::new();
        let shared = flag.clone();

        let guard = flag.try_begin().unwrap();
        assert!(shared.is_active());
        assert!(shared.try_begin().is_none());

        drop(guard);
        assert!(!flag.is_active());
        assert!(shared.try_begin().is_some());
    }
}
