//! Priority-ordered early delivery of routes while discovery is running.

use std::collections::HashSet;
use std::time::Duration;

use payroute_core::{AssetKey, PriorityEntry};
use tokio::time::Instant;
use tracing::debug;

use crate::route::PaymentRoute;

/// Outcome of offering one route to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DripDecision {
    /// Released now, possibly together with queued routes it unblocked.
    Released,
    /// Held until the routes ahead of it in priority are released.
    Queued,
    /// A route for this asset was released before.
    AlreadyReleased,
    /// A route for this asset is already waiting.
    AlreadyQueued,
    /// The route has no candidate to identify an asset by.
    Rejected,
}

/// Result of [`DripScheduler::offer`]: the decision for the offered route
/// and every route released as a consequence, in release order.
#[derive(Debug, Clone, PartialEq)]
pub struct DripStep {
    pub decision: DripDecision,
    pub released: Vec<PaymentRoute>,
}

#[derive(Debug)]
struct Queued {
    index: Option<usize>,
    key: AssetKey,
    route: PaymentRoute,
}

/// State of one resolution's drip delivery.
///
/// A route is released immediately when its asset is the next one in the
/// priority list, when the list is exhausted, or once the threshold has
/// elapsed since `started_at`. Otherwise it is queued by priority index,
/// assets without a priority entry last. Every asset is released at most once.
#[derive(Debug)]
pub struct DripScheduler {
    priorities: Vec<AssetKey>,
    started_at: Instant,
    threshold: Duration,
    dripped_index: usize,
    released: HashSet<AssetKey>,
    queue: Vec<Queued>,
}

impl DripScheduler {
    pub fn new(priority: &[PriorityEntry], started_at: Instant, threshold: Duration) -> Self {
        Self {
            priorities: priority.iter().map(PriorityEntry::key).collect(),
            started_at,
            threshold,
            dripped_index: 0,
            released: HashSet::new(),
            queue: Vec::new(),
        }
    }

    /// When queued routes stop waiting for their turn.
    pub fn deadline(&self) -> Instant {
        self.started_at + self.threshold
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn released_count(&self) -> usize {
        self.released.len()
    }

    fn priority_exhausted(&self) -> bool {
        self.dripped_index >= self.priorities.len()
    }

    fn index_of(&self, key: &AssetKey) -> Option<usize> {
        self.priorities.iter().position(|k| k == key)
    }

    pub fn offer(&mut self, route: PaymentRoute, now: Instant) -> DripStep {
        let Some(key) = route.key() else {
            return DripStep {
                decision: DripDecision::Rejected,
                released: Vec::new(),
            };
        };
        if self.released.contains(&key) {
            return DripStep {
                decision: DripDecision::AlreadyReleased,
                released: Vec::new(),
            };
        }

        let index = self.index_of(&key);
        if index == Some(self.dripped_index) {
            let mut released = vec![self.release(key, route)];
            self.dripped_index += 1;
            released.extend(self.drain_ready(now));
            return DripStep {
                decision: DripDecision::Released,
                released,
            };
        }
        if self.priority_exhausted() || self.is_expired(now) {
            return DripStep {
                decision: DripDecision::Released,
                released: vec![self.release(key, route)],
            };
        }
        if self.queue.iter().any(|queued| queued.key == key) {
            return DripStep {
                decision: DripDecision::AlreadyQueued,
                released: Vec::new(),
            };
        }

        debug!(asset = %key, ?index, dripped_index = self.dripped_index, "Queueing drip");
        let position = self
            .queue
            .iter()
            .position(|queued| sort_index(queued.index) > sort_index(index))
            .unwrap_or(self.queue.len());
        self.queue.insert(position, Queued { index, key, route });
        DripStep {
            decision: DripDecision::Queued,
            released: Vec::new(),
        }
    }

    /// Release everything queued if the threshold has elapsed.
    pub fn release_expired(&mut self, now: Instant) -> Vec<PaymentRoute> {
        if self.is_expired(now) {
            self.flush()
        } else {
            Vec::new()
        }
    }

    /// Discovery completed: release every queued route in priority order.
    pub fn finish(&mut self) -> Vec<PaymentRoute> {
        self.flush()
    }

    /// Release queued routes at the front of the queue for as long as they
    /// are next in line or no longer need to wait.
    fn drain_ready(&mut self, now: Instant) -> Vec<PaymentRoute> {
        let mut released = Vec::new();
        while let Some(front) = self.queue.first() {
            let next_in_line = front.index == Some(self.dripped_index);
            if !next_in_line && !self.priority_exhausted() && !self.is_expired(now) {
                break;
            }
            let queued = self.queue.remove(0);
            if next_in_line {
                self.dripped_index += 1;
            }
            released.push(self.release(queued.key, queued.route));
        }
        released
    }

    fn flush(&mut self) -> Vec<PaymentRoute> {
        let queue = std::mem::take(&mut self.queue);
        queue
            .into_iter()
            .map(|queued| self.release(queued.key, queued.route))
            .collect()
    }

    fn release(&mut self, key: AssetKey, route: PaymentRoute) -> PaymentRoute {
        debug!(asset = %key, "Releasing drip");
        self.released.insert(key);
        route
    }
}

/// Queue order: prioritized assets by index, unprioritized ones last.
fn sort_index(index: Option<usize>) -> usize {
    index.unwrap_or(usize::MAX)
}
