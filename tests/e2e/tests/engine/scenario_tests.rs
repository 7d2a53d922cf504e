//! Reference scenarios
//!
//! Fixed end-to-end behaviors of the engine: decay after 100 ticks, tight
//! clusters, batched archive flushing, and the empty engine.

use glyph_core::{EngineConfig, MemoryEngine, MoodContext};
use glyph_e2e_tests::{EmbeddingFactory, GlyphScenarios, TestEngineManager};

const DIM: usize = 16;

#[test]
fn test_focused_glyph_decays_to_one_over_e() {
    let mut env = TestEngineManager::new_temp(DIM);
    let embedding = env.embeddings.seeded(1);
    env.create("focus", embedding, "FOCUSED", 0);

    let v = env.vitality("focus", 100);
    assert!((v - (-1.0f64).exp()).abs() < 1e-9, "vitality was {}", v);
    assert!((v - 0.3679).abs() < 1e-4);
}

#[test]
fn test_identical_embeddings_form_coherent_constellation() {
    let mut env = TestEngineManager::new_temp(DIM);
    let embeddings = env.embeddings.clone();
    GlyphScenarios::create_cluster_scenario(&mut env.engine, &embeddings, 0);

    let a = env.engine.constellations().get("a").expect("a's constellation");
    assert!(a.contains("b"));
    assert!(a.contains("c"));

    let data = env.engine.get_constellation_data(0);
    let a_data = data.iter().find(|c| c.id == "a").expect("a reported");
    assert_eq!(a_data.members, vec!["a", "b", "c"]);
    assert!((a_data.coherence - 1.0).abs() < 1e-5);
    assert_eq!(a_data.centroid.len(), DIM);

    for constellation in &data {
        assert!((constellation.coherence - 1.0).abs() < 1e-5);
    }
}

#[test]
fn test_prune_buffers_then_flushes_at_ten() {
    let mut env = TestEngineManager::new_temp(DIM);
    let embeddings = env.embeddings.clone();
    GlyphScenarios::create_decay_scenario(&mut env.engine, &embeddings, 15, 5, 0);
    assert_eq!(env.engine.len(), 20);

    // TRANSCENDENT ~0.905, HYPERACTIVE ~0.018
    let pruned = env.engine.prune(0.05, 200).unwrap();
    assert_eq!(pruned, 5);
    assert_eq!(env.engine.len(), 15);
    assert_eq!(env.engine.archive().pending_len(), 5);
    assert_eq!(env.engine.archive().flush_count(), 0);
    assert!(!env.archive_path().exists());

    GlyphScenarios::create_decay_scenario(&mut env.engine, &embeddings, 0, 5, 200);
    let pruned = env.engine.prune(0.05, 400).unwrap();
    assert_eq!(pruned, 5);

    assert_eq!(env.engine.archive().pending_len(), 0);
    assert_eq!(env.engine.archive().flush_count(), 1);
    assert_eq!(env.engine.archive().len(), 10);
    assert!(env.archive_path().exists());
}

#[test]
fn test_search_on_empty_engine() {
    let engine = MemoryEngine::new(EngineConfig::with_dimensions(DIM)).unwrap();
    let query = EmbeddingFactory::new(DIM).seeded(3);

    for k in [0, 1, 10] {
        let hits = engine.search(&query, &MoodContext::new("DREAMING"), k, 0).unwrap();
        assert!(hits.is_empty());
    }
}

#[test]
fn test_mood_decay_ordering() {
    let mut env = TestEngineManager::new_temp(DIM);
    let embeddings = env.embeddings.clone();
    let scenario = GlyphScenarios::create_mood_spectrum(&mut env.engine, &embeddings, 0);

    let v = |mood: &str| env.vitality(&scenario.metadata[mood], 150);

    assert!(v("TRANSCENDENT") > v("DREAMING"));
    assert!(v("DREAMING") > v("CONTEMPLATIVE"));
    assert!(v("CONTEMPLATIVE") > v("FOCUSED"));
    assert!(v("FOCUSED") > v("HYPERACTIVE"));
}
