mod common;

use common::*;
use game_core::{
    LocalFallbackStore, MatchEvent, MatchEventBus, MemorySessionStorage, RoundTransitionDetector,
    ScoreReconciler, ScoreSource, ScoringEngine,
};
use std::sync::Arc;

#[test]
fn test_empty_results_give_zero_for_any_player_count() {
    for n in [0, 1, 2, 5, 16] {
        let players = create_players(n);
        let scores = ScoringEngine::compute_round_scores(&[], &players);

        assert_eq!(scores.len(), n);
        assert!(scores.scores.iter().all(|s| s.points == 0));
    }
}

#[test]
fn test_distinct_words_score_100_without_reordering_others() {
    let players = create_players(4);
    let results = vec![
        submission(&players[2], "Animal", "Cebra", true),
        submission(&players[0], "Animal", "Oso", true),
    ];

    let scores = ScoringEngine::compute_round_scores(&results, &players);

    let order: Vec<&str> = scores.scores.iter().map(|s| s.player.as_str()).collect();
    let expected: Vec<&str> = players.iter().map(String::as_str).collect();
    assert_eq!(order, expected);
    assert_eq!(scores.points_for(&players[0]), Some(100));
    assert_eq!(scores.points_for(&players[1]), Some(0));
    assert_eq!(scores.points_for(&players[2]), Some(100));
    assert_eq!(scores.points_for(&players[3]), Some(0));
}

#[test]
fn test_shared_word_scores_50_for_every_submitter() {
    for k in 2..=5 {
        let players = create_players(k);
        let results: Vec<_> = players
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let word = if i % 2 == 0 { " Lobo" } else { "LOBO " };
                submission(p, "Animal", word, true)
            })
            .collect();

        let scores = ScoringEngine::compute_round_scores(&results, &players);

        assert!(scores.scores.iter().all(|s| s.points == 50), "k = {}", k);
    }
}

#[test]
fn test_round_scores_feed_fallback_store_once() {
    let players = create_players(2);
    let results = vec![submission(&players[0], "Color", "Rojo", true)];
    let scores = ScoringEngine::compute_round_scores(&results, &players);
    let store = LocalFallbackStore::new(Arc::new(MemorySessionStorage::new()));

    store.store_round_scores(42, 1, &scores);
    store.store_round_scores(42, 1, &scores);

    let cumulative = store.get_cumulative_scores(42, None);
    assert_eq!(cumulative.get(&players[0]), Some(&100));
    assert_eq!(cumulative.get(&players[1]), Some(&0));
}

#[test]
fn test_authoritative_scores_beat_cached_ones() {
    let store = LocalFallbackStore::new(Arc::new(MemorySessionStorage::new()));
    let stale = ScoringEngine::compute_round_scores(
        &[submission("P1", "Animal", "Puma", true)],
        &["P1".to_string(), "P2".to_string()],
    );
    store.store_round_scores(7, 1, &stale);
    store.store_round_scores(
        7,
        2,
        &ScoringEngine::compute_round_scores(
            &[
                submission("P1", "Animal", "Pez", true),
                submission("P2", "Animal", "pez", true),
            ],
            &["P1".to_string(), "P2".to_string()],
        ),
    );
    let cached = store.get_cumulative_scores(7, None);
    assert_eq!(cached.get("P1"), Some(&150));

    let state = create_match_state(2, Some('P'), false, &[("P1", 300), ("P2", 150)]);
    let reconciled = ScoreReconciler::reconcile(Some(state.cumulative_scores.as_slice()), Some(&cached));

    assert_eq!(reconciled.source, ScoreSource::Authoritative);
    assert_eq!(ScoreReconciler::get_player_score(&reconciled.scores, "P1"), 300);
}

#[test]
fn test_detector_events_reach_bus_handlers() {
    let collector = EventCollector::new();
    let mut bus = MatchEventBus::new();
    bus.add_handler(Box::new(collector.clone()));
    let mut detector = RoundTransitionDetector::new();

    for state in [
        create_match_state(0, None, false, &[]),
        create_match_state(1, Some('A'), true, &[]),
        create_match_state(1, Some('A'), true, &[]),
        create_match_state(2, Some('B'), true, &[]),
    ] {
        if let Some(event) = detector.observe(&state) {
            bus.publish(MatchEvent::RevealStarted {
                room_id: 1,
                round_number: event.round_number,
                letter: event.letter,
            });
        }
    }

    assert_eq!(collector.event_count(), 2);
    assert!(matches!(
        collector.get_events()[1],
        MatchEvent::RevealStarted {
            round_number: 2,
            letter: 'B',
            ..
        }
    ));
}
