// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change notifications.
//!
//! The coordinator publishes refresh and device lifecycle events, and
//! entities publish [`CoordinatorEvent::StateWritten`] around optimistic
//! writes. Hosts subscribe to the [`EventBus`] and re-render affected
//! entities.

mod coordinator_event;
mod event_bus;

pub use coordinator_event::CoordinatorEvent;
pub use event_bus::EventBus;
