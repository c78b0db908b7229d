use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use game_core::{RevealCompletion, RevealMachine, RevealPhase};
use game_types::TransitionEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    pub tick: Duration,
    pub spin_duration: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(80),
            spin_duration: Duration::from_millis(2000),
        }
    }
}

type CompletionCallback = Arc<dyn Fn(RevealCompletion) + Send + Sync>;

/// Runs the letter reveal animation on tokio timers.
///
/// At most one spin task exists at a time; starting a new spin aborts the
/// previous task and invalidates its token, so each logical spin completes
/// once at most. The completion callback runs on the spin task, outside the
/// machine lock. It must not call back into the sequencer's restart, cancel
/// or teardown.
pub struct LetterRevealSequencer {
    machine: Arc<Mutex<RevealMachine>>,
    timing: RevealTiming,
    on_complete: CompletionCallback,
    spin: Mutex<Option<JoinHandle<()>>>,
    /// Held while a completion is delivered and while spins are superseded,
    /// so no callback runs after `cancel` or `teardown` returns.
    delivery: Arc<Mutex<()>>,
}

impl LetterRevealSequencer {
    pub fn new(
        timing: RevealTiming,
        alphabet: Vec<char>,
        on_complete: impl Fn(RevealCompletion) + Send + Sync + 'static,
    ) -> Self {
        Self {
            machine: Arc::new(Mutex::new(RevealMachine::new(alphabet))),
            timing,
            on_complete: Arc::new(on_complete),
            spin: Mutex::new(None),
            delivery: Arc::new(Mutex::new(())),
        }
    }

    pub fn on_transition(&self, event: &TransitionEvent) {
        self.start(Some(event.letter), Some(event.round_number));
    }

    /// Spin before the authority confirmed a letter.
    pub fn start_optimistic(&self) {
        self.start(None, None);
    }

    pub fn cancel(&self) {
        let _delivery = lock(&self.delivery);
        self.abort_spin();
        lock(&self.machine).cancel();
    }

    pub fn show(&self, letter: char) {
        lock(&self.machine).show(letter);
    }

    pub fn phase(&self) -> RevealPhase {
        lock(&self.machine).phase()
    }

    pub fn display_letter(&self) -> char {
        lock(&self.machine).display_letter()
    }

    /// Cancel every timer. Nothing completes afterwards.
    pub fn teardown(&self) {
        let _delivery = lock(&self.delivery);
        self.abort_spin();
        lock(&self.machine).reset();
    }

    fn start(&self, letter: Option<char>, round_number: Option<u32>) {
        let _delivery = lock(&self.delivery);
        let mut spin = lock(&self.spin);
        if let Some(previous) = spin.take() {
            debug!("Restarting letter reveal");
            previous.abort();
        }

        let token = lock(&self.machine).begin(letter, round_number);
        let machine = self.machine.clone();
        let delivery = self.delivery.clone();
        let on_complete = self.on_complete.clone();
        let timing = self.timing;

        *spin = Some(tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval_at(started + timing.tick, timing.tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let settle = tokio::time::sleep_until(started + timing.spin_duration);
            tokio::pin!(settle);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut settle => break,
                    _ = ticker.tick() => {
                        lock(&machine).tick(token);
                    }
                }
            }

            let completion = lock(&machine).settle(token);
            if let Some(completion) = completion {
                let _delivery = lock(&delivery);
                if lock(&machine).is_latest(token) {
                    on_complete(completion);
                } else {
                    debug!("Letter reveal superseded before completion");
                }
            }
        }));
    }

    fn abort_spin(&self) {
        if let Some(spin) = lock(&self.spin).take() {
            spin.abort();
        }
    }
}

impl Drop for LetterRevealSequencer {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
