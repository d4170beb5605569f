//! Fieldbus Poller: periodic presence sensor readout.
//!
//! Every tick reads both presence inputs concurrently and publishes them
//! through a `watch` channel. A failed (or overdue) read is logged and
//! that side keeps its last known value; the next tick retries.
//!
//! Cancellation is two-fold: the task is aborted, and a shared guard is
//! flipped first so a read that already completed but has not been
//! applied yet is discarded instead of landing after teardown. The guard
//! is flipped and checked under the presence channel's lock, so once
//! `cancel` returns no tick can publish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, info, trace, warn};

use pallet_common::bus::{BusError, FieldbusIo};
use pallet_common::io::{RegisterMap, Signal, decode_bool};
use pallet_common::side::Side;

use crate::state::presence::Presence;

/// Shared "this poller has been superseded" flag.
#[derive(Debug, Clone, Default)]
pub struct PollGuard(Arc<AtomicBool>);

impl PollGuard {
    /// Mark every holder as superseded.
    pub fn supersede(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Supersede while holding the presence channel's write lock. A tick
    /// applying its results either finishes first or sees the flag.
    pub fn supersede_on(&self, presence: &watch::Sender<Presence>) {
        presence.send_if_modified(|_| {
            self.supersede();
            false
        });
    }

    #[inline]
    pub fn is_current(&self) -> bool {
        !self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one side's read within a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideReading {
    Present(bool),
    Failed(BusError),
    TimedOut,
}

/// Read one side's presence input, bounded by `deadline`.
pub async fn read_presence(
    fieldbus: &dyn FieldbusIo,
    map: &RegisterMap,
    side: Side,
    deadline: Duration,
) -> SideReading {
    let address = map.resolve(Signal::pallet_present(side));
    match timeout(deadline, fieldbus.read_address(address)).await {
        Ok(Ok(raw)) => SideReading::Present(decode_bool(&raw.value)),
        Ok(Err(e)) => SideReading::Failed(e),
        Err(_) => SideReading::TimedOut,
    }
}

/// Run one poll tick and apply the results unless superseded.
///
/// Returns `false` when the guard says this poller is no longer current.
pub async fn poll_once(
    fieldbus: &dyn FieldbusIo,
    map: &RegisterMap,
    deadline: Duration,
    guard: &PollGuard,
    presence: &watch::Sender<Presence>,
) -> bool {
    let (left, right) = tokio::join!(
        read_presence(fieldbus, map, Side::Left, deadline),
        read_presence(fieldbus, map, Side::Right, deadline),
    );

    let readings = [(Side::Left, left), (Side::Right, right)];

    let mut current = true;
    let mut before = Presence::default();
    presence.send_if_modified(|p| {
        if !guard.is_current() {
            current = false;
            return false;
        }
        before = *p;
        let mut changed = false;
        for (side, reading) in &readings {
            if let SideReading::Present(value) = reading {
                changed |= p.set(*side, *value);
            }
        }
        changed
    });
    if !current {
        debug!("poll results discarded: poller superseded");
        return false;
    }

    for (side, reading) in readings {
        match reading {
            SideReading::Present(value) => {
                if before.get(side) != value {
                    info!(%side, present = value, "pallet presence changed");
                } else {
                    trace!(%side, present = value, "pallet presence unchanged");
                }
            }
            SideReading::Failed(e) => {
                warn!(%side, error = %e, "presence read failed, keeping last value");
            }
            SideReading::TimedOut => {
                warn!(%side, ?deadline, "presence read timed out, keeping last value");
            }
        }
    }
    true
}

/// Handle to a running poll task.
#[derive(Debug)]
pub struct PresencePoller {
    handle: Option<JoinHandle<()>>,
    guard: PollGuard,
    presence: Arc<watch::Sender<Presence>>,
}

impl PresencePoller {
    /// Spawn the poll loop on the current tokio runtime.
    pub fn spawn(
        fieldbus: Arc<dyn FieldbusIo>,
        map: RegisterMap,
        presence: Arc<watch::Sender<Presence>>,
        period: Duration,
    ) -> Self {
        let guard = PollGuard::default();
        let task_guard = guard.clone();
        let task_presence = presence.clone();
        info!(bus = fieldbus.name(), ?period, "presence poller started");

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !task_guard.is_current() {
                    break;
                }
                let current =
                    poll_once(fieldbus.as_ref(), &map, period, &task_guard, &task_presence).await;
                if !current {
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
            guard,
            presence,
        }
    }

    /// Stop polling. Idempotent.
    pub fn cancel(&mut self) {
        self.guard.supersede_on(&self.presence);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("presence poller cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PresencePoller {
    fn drop(&mut self) {
        self.cancel();
    }
}
