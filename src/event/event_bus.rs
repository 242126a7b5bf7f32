// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus for coordinator events.

use tokio::sync::broadcast;

use super::CoordinatorEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcasts [`CoordinatorEvent`]s to any number of subscribers.
///
/// Publishing never blocks and never fails. Events published without
/// subscribers are dropped; a subscriber that falls more than the channel
/// capacity behind receives `RecvError::Lagged` and misses the oldest events,
/// which is harmless for re-render signals since the store always holds the
/// latest state.
///
/// # Examples
///
/// ```
/// use ailink_lib::event::{CoordinatorEvent, EventBus};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
/// bus.publish(CoordinatorEvent::device_added("dev-1"));
/// assert_eq!(rx.try_recv().unwrap().device_id(), Some("dev-1"));
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event to all current subscribers.
    pub fn publish(&self, event: CoordinatorEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
