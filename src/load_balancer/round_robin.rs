//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use crate::load_balancer::{Strategy, backend::Backend};

/// Round-robin selector.
/// Stores an internal cursor to rotate through backends, starting at index 0.
///
/// Every candidate inspected consumes one cursor position, skipped ones
/// included, so concurrent callers never share a position.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for RoundRobin {
    fn next_server<'a>(
        &self,
        backends: &'a [Backend],
        eligible: &dyn Fn(&Backend) -> bool,
    ) -> Option<&'a Backend> {
        let len = backends.len();
        if len == 0 {
            return None;
        }

        // At most one full cycle, then give up.
        for _ in 0..len {
            let index = self.cursor.fetch_add(1, Ordering::Relaxed) % len;
            let backend = &backends[index];
            if eligible(backend) {
                return Some(backend);
            }
        }
        None
    }
}
