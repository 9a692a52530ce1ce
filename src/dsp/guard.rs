//! Last-resort protection for the output buffer.

/*
Protect Your Ears
=================

A bad coefficient, a division by a phase of zero, or a filter pushed past
Nyquist can all end in NaN or in a value far outside [-1, 1]. Played through
headphones that is painful; fed into a host it can poison every plugin
downstream. So every rendered buffer passes through one final check:

    sample            action
    ---------------   -------------------------------------------
    NaN / ±Inf        zero the whole buffer and stop
    |x| > 2.0         zero the whole buffer and stop (runaway feedback)
    1.0 < |x| ≤ 2.0   hard-clip to ±1.0 and keep going
    |x| ≤ 1.0         untouched

This is a safety net, not signal processing. A correctly configured engine
never trips it.


Reporting
---------

The guard runs on the audio thread, so it never logs. Each call returns a
`BufferHealth`, and the engine tallies those in a `GuardMeter`: plain atomic
counters that another thread can drain with `take_snapshot()` and report
however it likes.
*/

use std::sync::atomic::{AtomicU64, Ordering};

/// Anything louder than this is treated as a fault, not as a loud note.
const FAULT_LEVEL: f32 = 2.0;

/// What the guard did to a buffer. Ordered from harmless to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum BufferHealth {
    #[default]
    Clean,
    Clipped,
    Silenced,
}

/// Clip mild overs in place; silence the buffer on NaN, Inf or runaway values.
pub fn protect_your_ears(buffer: &mut [f32]) -> BufferHealth {
    if buffer
        .iter()
        .any(|x| !x.is_finite() || x.abs() > FAULT_LEVEL)
    {
        buffer.fill(0.0);
        return BufferHealth::Silenced;
    }

    let mut health = BufferHealth::Clean;
    for sample in buffer.iter_mut().filter(|x| x.abs() > 1.0) {
        health = BufferHealth::Clipped;
        *sample = sample.signum();
    }

    health
}

/// Counts of guarded buffers since the last snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuardReport {
    pub clipped: u64,
    pub silenced: u64,
}

/// Lock-free tally of guard interventions, written by the audio thread.
#[derive(Debug, Default)]
pub struct GuardMeter {
    clipped: AtomicU64,
    silenced: AtomicU64,
}

impl GuardMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, health: BufferHealth) {
        match health {
            BufferHealth::Clean => {}
            BufferHealth::Clipped => {
                self.clipped.fetch_add(1, Ordering::Relaxed);
            }
            BufferHealth::Silenced => {
                self.silenced.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Drain the counters. `None` when nothing happened since the last call.
    pub fn take_snapshot(&self) -> Option<GuardReport> {
        let report = GuardReport {
            clipped: self.clipped.swap(0, Ordering::Relaxed),
            silenced: self.silenced.swap(0, Ordering::Relaxed),
        };

        (report != GuardReport::default()).then_some(report)
    }
}
