//! Engine invariants
//!
//! Properties that must hold across many glyphs, moods, and ticks.

use glyph_core::{vitality, Glyph, MoodContext, VectorIndex, DEAD_FLOOR};
use glyph_e2e_tests::TestEngineManager;

const DIM: usize = 12;
const MOODS: [&str; 6] = [
    "DREAMING",
    "CONTEMPLATIVE",
    "FOCUSED",
    "HYPERACTIVE",
    "TRANSCENDENT",
    "UNLISTED",
];

/// 30 glyphs across all moods, born at staggered ticks
fn populated() -> TestEngineManager {
    let mut env = TestEngineManager::new_temp(DIM);
    for i in 0..30 {
        let embedding = env.embeddings.seeded(i);
        env.create(&format!("g{}", i), embedding, MOODS[i % MOODS.len()], (i as u64) * 7);
    }
    env
}

#[test]
fn test_vitality_stays_in_unit_interval() {
    let mut glyph = Glyph::new("g", "content", vec![1.0; DIM], 10, 0.02);

    for round in 0..40u64 {
        for tick in [10, 11, 50, 500, 10_000, u64::MAX / 2] {
            let v = vitality(&glyph, tick.max(glyph.last_resonance_tick));
            assert!((0.0..=1.0).contains(&v), "vitality {} out of range", v);
        }
        glyph_core::resonate(&mut glyph, 10 + round * 3, 1.0);
    }
}

#[test]
fn test_vitality_is_one_at_resonance_tick() {
    let mut env = populated();
    for tick in [300, 301, 999] {
        env.engine.resonate("g4", tick, 1.0).unwrap();
        assert_eq!(env.vitality("g4", tick), 1.0);
    }
}

#[test]
fn test_decay_rate_never_increases() {
    let mut env = populated();
    let mut previous = env.engine.get("g2").unwrap().decay_rate;

    for tick in 300..330 {
        let rate = env.engine.resonate("g2", tick, 1.0).unwrap().decay_rate;
        assert!(rate <= previous);
        previous = rate;
    }
    assert!(previous < 0.01);
}

#[test]
fn test_prune_leaves_no_survivor_below_threshold() {
    let mut env = populated();

    for (threshold, tick) in [(0.05, 250), (0.2, 400), (0.5, 600)] {
        env.engine.prune(threshold, tick).unwrap();

        for glyph in env.engine.glyphs() {
            let v = env.engine.vitality_of(&glyph.id, tick).unwrap();
            assert!(v >= threshold, "{} survived with {}", glyph.id, v);
        }
        assert_eq!(env.engine.index().len(), env.engine.len());
    }
}

#[test]
fn test_rebuild_reproduces_search() {
    let mut env = populated();
    let mood = MoodContext::new("CONTEMPLATIVE");
    let queries: Vec<Vec<f32>> = (100..105).map(|s| env.embeddings.seeded(s)).collect();

    let before: Vec<Vec<(String, f64)>> = queries
        .iter()
        .map(|q| {
            env.engine
                .search(q, &mood, 8, 250)
                .unwrap()
                .into_iter()
                .map(|h| (h.glyph.id, h.score))
                .collect()
        })
        .collect();

    env.engine.rebuild_index().unwrap();

    for (query, expected) in queries.iter().zip(before) {
        let after: Vec<(String, f64)> = env
            .engine
            .search(query, &mood, 8, 250)
            .unwrap()
            .into_iter()
            .map(|h| (h.glyph.id, h.score))
            .collect();
        assert_eq!(after, expected);
    }
}

#[test]
fn test_search_never_returns_faded() {
    let env = populated();
    let mood = MoodContext::new("FOCUSED");

    for tick in [210, 400, 800, 2_000] {
        for seed in 0..10 {
            let hits = env
                .engine
                .search(&env.embeddings.seeded(seed), &mood, 10, tick)
                .unwrap();
            assert!(hits.len() <= 10);
            for hit in hits {
                assert!(hit.vitality >= DEAD_FLOOR);
            }
        }
    }
}

#[test]
fn test_search_scores_sorted_and_bonus_capped() {
    let env = populated();
    let hits = env
        .engine
        .search(&env.embeddings.seeded(3), &MoodContext::new("DREAMING"), 10, 210)
        .unwrap();

    assert!(!hits.is_empty());
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for hit in &hits {
        assert!(hit.constellation_bonus <= 0.3);
    }
}

#[test]
fn test_constellation_data_requires_two_active_members() {
    let mut env = populated();
    env.engine.prune(0.05, 300).unwrap();

    for tick in [300, 500, 900] {
        for constellation in env.engine.get_constellation_data(tick) {
            assert!(constellation.members.len() >= 2);
            for member in &constellation.members {
                assert!(env.vitality(member, tick) > DEAD_FLOOR);
            }
            assert!((-1.0..=1.0 + 1e-6).contains(&constellation.coherence));
        }
    }
}

#[test]
fn test_constellation_data_members_are_live() {
    let mut env = populated();
    env.engine.prune(0.3, 500).unwrap();

    for constellation in env.engine.get_constellation_data(500) {
        assert!(constellation.members.len() >= 2);
        for member in &constellation.members {
            assert!(env.engine.contains(member));
        }
        assert!((-1.0..=1.0 + 1e-6).contains(&constellation.coherence));
    }
}

#[test]
fn test_no_glyph_is_its_own_neighbor() {
    let env = populated();
    for glyph in env.engine.glyphs() {
        assert!(!glyph.semantic_neighbors.contains(&glyph.id));
        assert!(glyph.semantic_neighbors.len() <= 5);
    }
}
