use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use game_core::SequenceGate;
use game_types::RemoteError;

/// The kinds of remote state a client keeps fresh, with their default cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKind {
    Room,
    Lobby,
    MatchState,
    Validations,
    MonthlyLeaderboard,
    MonthlyTop1,
}

impl PollKind {
    pub fn default_interval(self) -> Duration {
        match self {
            PollKind::Room => Duration::from_secs(2),
            PollKind::Lobby => Duration::from_secs(3),
            PollKind::MatchState => Duration::from_secs(2),
            PollKind::Validations => Duration::from_secs(2),
            PollKind::MonthlyLeaderboard | PollKind::MonthlyTop1 => Duration::from_secs(30),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PollKind::Room => "room",
            PollKind::Lobby => "lobby",
            PollKind::MatchState => "match",
            PollKind::Validations => "validations",
            PollKind::MonthlyLeaderboard => "leaderboard",
            PollKind::MonthlyTop1 => "top1",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    /// No poll has completed yet.
    Loading,
    Fresh,
    /// The latest poll failed; `latest` still holds the last good value.
    Stale {
        error: RemoteError,
        consecutive_failures: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced<T> {
    pub sequence: u64,
    /// When the fetch that produced `value` was issued.
    pub issued_at: Instant,
    pub value: T,
}

/// What observers of a poll see.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSnapshot<T> {
    pub latest: Option<Sequenced<T>>,
    pub status: PollStatus,
}

impl<T> PollSnapshot<T> {
    pub fn loading() -> Self {
        Self {
            latest: None,
            status: PollStatus::Loading,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.latest.as_ref().map(|latest| &latest.value)
    }

    pub fn sequence(&self) -> Option<u64> {
        self.latest.as_ref().map(|latest| latest.sequence)
    }

    pub fn is_stale(&self) -> bool {
        matches!(self.status, PollStatus::Stale { .. })
    }
}

/// Owner side of a running poll. Dropping it stops the poll.
pub struct PollHandle<T> {
    key: String,
    sender: Arc<watch::Sender<PollSnapshot<T>>>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl<T> PollHandle<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot<T>> {
        self.sender.subscribe()
    }

    /// Poll again as soon as the current poll (if any) settles. Requests made
    /// while a poll is in flight coalesce into one follow-up poll.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        debug!("Stopping poll {}", self.key);
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct Poller;

impl Poller {
    /// Start polling `fetch` every `interval`, first poll immediately.
    ///
    /// The loop waits for each call to settle before scheduling the next one,
    /// so polls for one key never overlap. It exits on its own once every
    /// receiver is gone.
    pub fn spawn<T, F, Fut>(
        key: impl Into<String>,
        interval: Duration,
        fetch: F,
    ) -> (PollHandle<T>, watch::Receiver<PollSnapshot<T>>)
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RemoteError>> + Send + 'static,
    {
        let key = key.into();
        let (sender, receiver) = watch::channel(PollSnapshot::loading());
        let sender = Arc::new(sender);
        let refresh = Arc::new(Notify::new());

        let task = tokio::spawn(run(
            key.clone(),
            interval,
            fetch,
            sender.clone(),
            refresh.clone(),
        ));

        let handle = PollHandle {
            key,
            sender,
            refresh,
            task,
        };
        (handle, receiver)
    }
}

async fn run<T, F, Fut>(
    key: String,
    interval: Duration,
    fetch: F,
    sender: Arc<watch::Sender<PollSnapshot<T>>>,
    refresh: Arc<Notify>,
) where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, RemoteError>> + Send + 'static,
{
    let mut gate = SequenceGate::new();
    let mut next_sequence: u64 = 0;
    let mut failures: u32 = 0;

    loop {
        if sender.receiver_count() == 0 {
            break;
        }

        let sequence = next_sequence;
        next_sequence += 1;
        let issued_at = Instant::now();

        match fetch().await {
            Ok(value) => {
                if gate.accept(sequence) {
                    failures = 0;
                    sender.send_replace(PollSnapshot {
                        latest: Some(Sequenced {
                            sequence,
                            issued_at,
                            value,
                        }),
                        status: PollStatus::Fresh,
                    });
                } else {
                    debug!("Discarding out-of-order snapshot {} for {}", sequence, key);
                }
            }
            Err(error) => {
                failures += 1;
                if error.is_transient() {
                    warn!("Poll {} failed ({} in a row): {}", key, failures, error);
                } else {
                    error!("Poll {} failed ({} in a row): {}", key, failures, error);
                }
                let consecutive_failures = failures;
                sender.send_modify(|snapshot| {
                    snapshot.status = PollStatus::Stale {
                        error,
                        consecutive_failures,
                    };
                });
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = refresh.notified() => {
                debug!("Refresh requested for {}", key);
            }
            _ = sender.closed() => break,
        }
    }

    debug!("Poll {} has no observers left, exiting", key);
}
