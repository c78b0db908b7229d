use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use game_core::{
    LocalFallbackStore, MatchEvent, MatchEventBus, MatchView, ReconciledScores, RevealPhase,
    RoundTransitionDetector, SPANISH_ALPHABET, ScoreReconciler, ScoringEngine, SequenceGate,
    SessionStorage,
};
use game_types::{
    Category, MatchState, PlayerId, RemoteError, RoomId, RoomView, RoundPayload, ScoreboardEntry,
    ValidationResult,
};

use crate::config::Config;
use crate::handlers::{LogAnnouncer, StopAnnouncer};
use crate::poller::{PollHandle, PollKind, PollSnapshot, PollStatus, Poller};
use crate::remote::MatchAuthority;
use crate::reveal::LetterRevealSequencer;

type SharedBus = Arc<Mutex<MatchEventBus>>;

fn publish(bus: &SharedBus, event: MatchEvent) {
    bus.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .publish(event);
}

/// A client's live view of one room's match.
///
/// Keeps the room, match state and validation results polled, runs the
/// letter reveal on round transitions, caches finished rounds locally and
/// exposes the reconciled scoreboard. Dropping the session stops all of it.
pub struct MatchSession {
    room_id: RoomId,
    authority: Arc<dyn MatchAuthority>,
    store: Arc<LocalFallbackStore>,
    sequencer: Arc<LetterRevealSequencer>,
    announcer: Arc<dyn StopAnnouncer>,
    current_user: Option<PlayerId>,
    room_poll: PollHandle<RoomView>,
    match_poll: PollHandle<MatchState>,
    validation_poll: PollHandle<Vec<ValidationResult>>,
    room_rx: watch::Receiver<PollSnapshot<RoomView>>,
    match_rx: watch::Receiver<PollSnapshot<MatchState>>,
    validation_rx: watch::Receiver<PollSnapshot<Vec<ValidationResult>>>,
    driver: JoinHandle<()>,
}

impl MatchSession {
    /// Start observing `room_id`. Fails with `SessionRequired` before any
    /// request is made when the authority has no session.
    pub fn open(
        room_id: RoomId,
        authority: Arc<dyn MatchAuthority>,
        storage: Arc<dyn SessionStorage>,
        config: &Config,
        bus: MatchEventBus,
    ) -> Result<Self, RemoteError> {
        if !authority.has_session() {
            return Err(RemoteError::SessionRequired);
        }

        info!("Opening match session for room {}", room_id);

        let bus: SharedBus = Arc::new(Mutex::new(bus));
        let store = Arc::new(LocalFallbackStore::with_ttl(storage, config.score_cache_ttl));

        let sequencer = {
            let bus = bus.clone();
            Arc::new(LetterRevealSequencer::new(
                config.reveal,
                SPANISH_ALPHABET.to_vec(),
                move |completion| {
                    publish(
                        &bus,
                        MatchEvent::RevealSettled {
                            room_id,
                            round_number: completion.round_number,
                            letter: completion.letter,
                        },
                    );
                },
            ))
        };

        let (room_poll, room_rx) = {
            let authority = authority.clone();
            Poller::spawn(
                poll_key(PollKind::Room, room_id),
                config.room_poll_interval,
                move || {
                    let authority = authority.clone();
                    async move { authority.get_room(room_id).await }
                },
            )
        };

        let (match_poll, match_rx) = {
            let authority = authority.clone();
            Poller::spawn(
                poll_key(PollKind::MatchState, room_id),
                config.match_poll_interval,
                move || {
                    let authority = authority.clone();
                    async move { authority.get_current_match_state(room_id).await }
                },
            )
        };

        let (validation_poll, validation_rx) = {
            let authority = authority.clone();
            Poller::spawn(
                poll_key(PollKind::Validations, room_id),
                config.validation_poll_interval,
                move || {
                    let authority = authority.clone();
                    async move { authority.get_validation_results(room_id).await }
                },
            )
        };

        let driver = MatchDriver {
            room_id,
            store: store.clone(),
            sequencer: sequencer.clone(),
            bus,
            room_rx: room_rx.clone(),
            detector: RoundTransitionDetector::new(),
            gate: SequenceGate::new(),
            latest_state: None,
            latest_validations: None,
            round_ended: None,
            stale_reported: false,
            finished_at_round: None,
        };
        let driver = tokio::spawn(driver.run(match_rx.clone(), validation_rx.clone()));

        Ok(Self {
            room_id,
            authority,
            store,
            sequencer,
            announcer: Arc::new(LogAnnouncer),
            current_user: config.current_user.clone(),
            room_poll,
            match_poll,
            validation_poll,
            room_rx,
            match_rx,
            validation_rx,
            driver,
        })
    }

    pub fn with_announcer(mut self, announcer: Arc<dyn StopAnnouncer>) -> Self {
        self.announcer = announcer;
        self
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn room(&self) -> Option<RoomView> {
        self.room_rx.borrow().value().cloned()
    }

    /// Last good match state, kept while polls fail.
    pub fn match_state(&self) -> Option<MatchState> {
        self.match_rx.borrow().value().cloned()
    }

    pub fn validation_results(&self) -> Vec<ValidationResult> {
        self.validation_rx
            .borrow()
            .value()
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_stale(&self) -> bool {
        self.match_rx.borrow().is_stale()
    }

    pub fn subscribe_match(&self) -> watch::Receiver<PollSnapshot<MatchState>> {
        self.match_poll.subscribe()
    }

    pub fn reveal_phase(&self) -> RevealPhase {
        self.sequencer.phase()
    }

    pub fn display_letter(&self) -> char {
        self.sequencer.display_letter()
    }

    /// Authoritative cumulative scores once the authority has answered,
    /// the local cache before that.
    pub fn reconciled_scores(&self) -> ReconciledScores {
        let authoritative = self
            .match_rx
            .borrow()
            .value()
            .map(|state| state.cumulative_scores.clone());

        match authoritative {
            Some(scores) => ScoreReconciler::reconcile(Some(scores.as_slice()), None),
            None => {
                let cached = self.store.get_cumulative_scores(self.room_id, None);
                ScoreReconciler::reconcile(None, Some(&cached))
            }
        }
    }

    pub fn player_score(&self, player: &str) -> u64 {
        ScoreReconciler::get_player_score(&self.reconciled_scores().scores, player)
    }

    /// Ranked rows for the room's players. Falls back to whoever appears in
    /// the scores while the room itself is unknown.
    pub fn scoreboard(&self) -> Vec<ScoreboardEntry> {
        let reconciled = self.reconciled_scores();
        let players = match self.room() {
            Some(room) => room.players,
            None => reconciled
                .scores
                .iter()
                .map(|score| score.player.clone())
                .collect(),
        };

        ScoreReconciler::scoreboard(&players, &reconciled, self.current_user.as_deref())
    }

    /// Start the next round. The reveal starts spinning right away and is
    /// cancelled if the authority refuses.
    pub async fn start_round(&self) -> Result<RoundPayload, RemoteError> {
        self.require_session()?;
        self.sequencer.start_optimistic();

        match self.authority.start_round(self.room_id).await {
            Ok(payload) => {
                info!(
                    "Started round {} of {} in room {}",
                    payload.round_number, payload.total_rounds, self.room_id
                );
                self.match_poll.refresh();
                self.room_poll.refresh();
                Ok(payload)
            }
            Err(e) => {
                warn!("Failed to start round in room {}: {}", self.room_id, e);
                self.sequencer.cancel();
                Err(e)
            }
        }
    }

    pub async fn stop_round(&self) -> Result<String, RemoteError> {
        self.require_session()?;
        self.announcer.announce_stop();

        let ack = self.authority.stop_current_round(self.room_id).await?;
        info!("Stopped round in room {}", self.room_id);
        self.match_poll.refresh();
        self.validation_poll.refresh();
        Ok(ack)
    }

    /// Submit every non-blank answer for the room's categories (every
    /// supplied category while the room is unknown). Stops at the first
    /// failure. Returns how many words were submitted.
    pub async fn submit_answers(
        &self,
        answers: &BTreeMap<Category, String>,
    ) -> Result<usize, RemoteError> {
        self.require_session()?;

        let categories: Vec<Category> = match self.room() {
            Some(room) => room.categories,
            None => answers.keys().cloned().collect(),
        };

        let mut submitted = 0;
        for category in &categories {
            let Some(word) = answers.get(category) else {
                continue;
            };
            if word.trim().is_empty() {
                continue;
            }
            self.authority
                .submit_word(self.room_id, category, word.trim())
                .await?;
            submitted += 1;
        }

        debug!("Submitted {} answers in room {}", submitted, self.room_id);
        self.validation_poll.refresh();
        Ok(submitted)
    }

    pub fn close(self) {
        info!("Closing match session for room {}", self.room_id);
    }

    /// Close the session and forget the room's cached scores.
    pub fn abandon(self) {
        info!("Abandoning match in room {}", self.room_id);
        self.driver.abort();
        self.store.clear_stored_scores(self.room_id);
    }

    fn require_session(&self) -> Result<(), RemoteError> {
        if self.authority.has_session() {
            Ok(())
        } else {
            Err(RemoteError::SessionRequired)
        }
    }
}

impl Drop for MatchSession {
    fn drop(&mut self) {
        self.driver.abort();
        self.sequencer.teardown();
        debug!(
            "Session for room {} dropped ({} stopped)",
            self.room_id,
            self.room_poll.key()
        );
    }
}

fn poll_key(kind: PollKind, room_id: RoomId) -> String {
    format!("{}:{}", kind.label(), room_id)
}

/// Background task reacting to polled snapshots.
struct MatchDriver {
    room_id: RoomId,
    store: Arc<LocalFallbackStore>,
    sequencer: Arc<LetterRevealSequencer>,
    bus: SharedBus,
    room_rx: watch::Receiver<PollSnapshot<RoomView>>,
    detector: RoundTransitionDetector,
    gate: SequenceGate,
    latest_state: Option<MatchState>,
    /// Results tagged with the finished round they were fetched for, if the
    /// fetch was issued after that round was seen to be over.
    latest_validations: Option<(Option<u32>, Vec<ValidationResult>)>,
    /// The round last seen inactive, and when that was first seen.
    round_ended: Option<(u32, Instant)>,
    stale_reported: bool,
    /// Last round of the match once it has finished.
    finished_at_round: Option<u32>,
}

impl MatchDriver {
    async fn run(
        mut self,
        mut match_rx: watch::Receiver<PollSnapshot<MatchState>>,
        mut validation_rx: watch::Receiver<PollSnapshot<Vec<ValidationResult>>>,
    ) {
        loop {
            tokio::select! {
                changed = match_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = match_rx.borrow_and_update().clone();
                    self.on_match_snapshot(snapshot);
                }
                changed = validation_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = validation_rx.borrow_and_update().clone();
                    self.on_validations(snapshot);
                }
            }
        }

        debug!("Match driver for room {} exiting", self.room_id);
    }

    fn on_match_snapshot(&mut self, snapshot: PollSnapshot<MatchState>) {
        match snapshot.status {
            PollStatus::Loading => return,
            PollStatus::Stale { error, .. } => {
                if !self.stale_reported {
                    self.stale_reported = true;
                    self.publish(MatchEvent::StateStale {
                        room_id: self.room_id,
                        error,
                    });
                }
                return;
            }
            PollStatus::Fresh => self.stale_reported = false,
        }

        let Some(latest) = snapshot.latest else {
            return;
        };
        if !self.gate.accept(latest.sequence) {
            debug!("Ignoring stale match snapshot {}", latest.sequence);
            return;
        }
        let state = latest.value;

        if let Some(last_round) = self.finished_at_round {
            if state.current_round == 0 || state.current_round < last_round {
                info!("New match starting in room {}", self.room_id);
                self.finished_at_round = None;
                self.latest_validations = None;
                self.round_ended = None;
                self.detector.reset();
            }
        }

        if state.is_active || state.current_round == 0 {
            self.round_ended = None;
        } else if self.round_ended.map(|(round, _)| round) != Some(state.current_round) {
            self.round_ended = Some((state.current_round, Instant::now()));
        }

        if let Some(event) = self.detector.observe(&state) {
            info!(
                "Room {}: round {} started with letter {}",
                self.room_id, event.round_number, event.letter
            );
            self.sequencer.on_transition(&event);
            self.publish(MatchEvent::RevealStarted {
                room_id: self.room_id,
                round_number: event.round_number,
                letter: event.letter,
            });
        } else if let Some(letter) = state.current_letter {
            self.sequencer.show(letter);
        }

        self.latest_state = Some(state);
        self.score_finished_round();
        self.check_finished();
    }

    fn on_validations(&mut self, snapshot: PollSnapshot<Vec<ValidationResult>>) {
        if snapshot.status != PollStatus::Fresh {
            return;
        }
        let Some(latest) = snapshot.latest else {
            return;
        };

        // A fetch issued before the round was seen to end may hold answers
        // read while it was still open.
        let finished_round = self
            .round_ended
            .filter(|(_, seen_at)| latest.issued_at > *seen_at)
            .map(|(round, _)| round);
        self.latest_validations = Some((finished_round, latest.value));
        self.score_finished_round();
    }

    /// Cache the scores of a round that is over, from results fetched after
    /// it ended.
    fn score_finished_round(&mut self) {
        if self.finished_at_round.is_some() {
            return;
        }
        let Some(state) = &self.latest_state else {
            return;
        };
        if state.is_active || state.current_round == 0 {
            return;
        }
        let Some((Some(round), results)) = &self.latest_validations else {
            return;
        };
        if *round != state.current_round || results.is_empty() {
            return;
        }

        let players = match self.room_rx.borrow().value() {
            Some(room) => room.players.clone(),
            None => state.scored_players(),
        };
        let scores = ScoringEngine::compute_round_scores(results, &players);
        let round_number = *round;

        if self
            .store
            .store_round_scores(self.room_id, round_number, &scores)
        {
            info!("Cached round {} scores for room {}", round_number, self.room_id);
            self.publish(MatchEvent::RoundScored {
                room_id: self.room_id,
                round_number,
                scores,
            });
        }
    }

    fn check_finished(&mut self) {
        if self.finished_at_round.is_some() {
            return;
        }
        let Some(state) = &self.latest_state else {
            return;
        };
        if !MatchView::new(state).is_finished() {
            return;
        }

        let final_scores = state.cumulative_scores.clone();
        self.finished_at_round = Some(state.current_round);
        info!("Match in room {} finished", self.room_id);
        self.store.clear_stored_scores(self.room_id);
        self.publish(MatchEvent::MatchFinished {
            room_id: self.room_id,
            final_scores,
        });
    }

    fn publish(&self, event: MatchEvent) {
        publish(&self.bus, event);
    }
}
