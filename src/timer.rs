use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// the delay and sound timers count down at 60Hz
pub const TIMER_PERIOD: Duration = Duration::from_nanos(100_000_000 / 6);

/// delay and sound timers, shared between the cycle driver, the timer process
/// and whatever is making noises
#[derive(Debug, Default)]
pub struct Timers {
    delay: AtomicU8,
    sound: AtomicU8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(&self) -> u8 {
        self.delay.load(Ordering::Acquire)
    }

    pub fn set_delay(&self, value: u8) {
        self.delay.store(value, Ordering::Release);
    }

    pub fn sound(&self) -> u8 {
        self.sound.load(Ordering::Acquire)
    }

    pub fn set_sound(&self, value: u8) {
        self.sound.store(value, Ordering::Release);
    }

    /// one 60Hz tick: count both timers down, stopping at zero
    pub fn tick(&self) {
        for timer in [&self.delay, &self.sound] {
            let _ = timer.fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| t.checked_sub(1));
        }
    }
}

/// tick the timers every `period` until `halt` is raised. deadlines are
/// chained off each other so sleep overshoot doesn't accumulate
pub fn run_timers(timers: &Timers, halt: &AtomicBool, period: Duration) {
    let mut next = Instant::now() + period;
    while !halt.load(Ordering::Acquire) {
        spin_sleep::sleep(next.saturating_duration_since(Instant::now()));
        if halt.load(Ordering::Acquire) {
            break;
        }
        timers.tick();
        next += period;
    }
}
