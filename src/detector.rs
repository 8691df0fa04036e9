// src/detector.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::notify::{NotificationTemplate, PushMessage};

/// Last in-region count seen by a successful tick. Starts at 0 and lives
/// only as long as the process. Cloning shares the same counter.
///
/// Single writer: the tick pipeline. Ticks run one after another, so the
/// atomic only guards readers such as the status endpoint.
#[derive(Debug, Clone, Default)]
pub struct ObservedCount(Arc<AtomicUsize>);

impl ObservedCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, n: usize) {
        self.0.store(n, Ordering::SeqCst);
    }
}

/// Pure decision step: the new observed count is always `current`; a
/// message is produced only when the count went up.
pub fn evaluate(
    previous: usize,
    current: usize,
    template: &NotificationTemplate,
) -> (usize, Option<PushMessage>) {
    let msg = (current > previous).then(|| template.render(current));
    (current, msg)
}
