//! Scripted replay
//!
//! Drives an engine from a JSONL event script. Each non-blank line is one
//! operation tagged by `op`, always with an explicit tick:
//!
//! ```text
//! {"op":"create","tick":0,"content":"dawn","embedding":[1,0,0],"mood":{"mood":"FOCUSED"}}
//! {"op":"search","tick":40,"embedding":[1,0,0],"k":3}
//! {"op":"recall","tick":41,"embedding":[1,0,0],"k":1}
//! {"op":"resonate","tick":42,"id":"glyph_0_1234"}
//! {"op":"prune","tick":500,"threshold":0.05}
//! {"op":"constellations","tick":500}
//! {"op":"stats","tick":500}
//! ```
//!
//! Every operation produces one JSON result line on the output writer.

use std::io::{BufRead, Write};

use anyhow::Context;
use glyph_core::{ConstellationData, EngineStats, MemoryEngine, MoodContext, SearchHit, VectorIndex};
use serde::{Deserialize, Serialize};

fn default_k() -> usize {
    5
}

fn default_strength() -> f64 {
    1.0
}

/// One scripted operation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayOp {
    Create {
        tick: u64,
        content: String,
        embedding: Vec<f32>,
        #[serde(default)]
        mood: MoodContext,
        /// Explicit id; derived from tick and content when absent
        #[serde(default)]
        id: Option<String>,
    },
    Search {
        tick: u64,
        embedding: Vec<f32>,
        #[serde(default)]
        mood: MoodContext,
        #[serde(default = "default_k")]
        k: usize,
    },
    Recall {
        tick: u64,
        embedding: Vec<f32>,
        #[serde(default)]
        mood: MoodContext,
        #[serde(default = "default_k")]
        k: usize,
    },
    Resonate {
        tick: u64,
        id: String,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    Prune {
        tick: u64,
        /// Falls back to the configured prune threshold
        #[serde(default)]
        threshold: Option<f64>,
    },
    Constellations {
        tick: u64,
    },
    Stats {
        tick: u64,
    },
}

/// Compact view of a search hit for output
#[derive(Debug, Clone, Serialize)]
pub struct HitSummary {
    pub id: String,
    pub content: String,
    pub score: f64,
    pub similarity: f64,
    pub vitality: f64,
    pub mood_affinity: f64,
    pub constellation_bonus: f64,
}

impl From<&SearchHit> for HitSummary {
    fn from(hit: &SearchHit) -> Self {
        Self {
            id: hit.glyph.id.clone(),
            content: hit.glyph.content.clone(),
            score: hit.score,
            similarity: hit.similarity,
            vitality: hit.vitality,
            mood_affinity: hit.mood_affinity,
            constellation_bonus: hit.constellation_bonus,
        }
    }
}

/// Result line written for each operation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayOutput {
    Create {
        line: usize,
        tick: u64,
        id: String,
        decay_rate: f64,
        neighbors: Vec<String>,
    },
    Search {
        line: usize,
        tick: u64,
        hits: Vec<HitSummary>,
    },
    Recall {
        line: usize,
        tick: u64,
        hits: Vec<HitSummary>,
    },
    Resonate {
        line: usize,
        tick: u64,
        id: String,
        vitality: f64,
        resonance_count: u32,
    },
    Prune {
        line: usize,
        tick: u64,
        pruned: usize,
        remaining: usize,
    },
    Constellations {
        line: usize,
        tick: u64,
        constellations: Vec<ConstellationData>,
    },
    Stats {
        line: usize,
        tick: u64,
        stats: EngineStats,
    },
}

/// Totals for a finished replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub operations: usize,
    pub created: usize,
    pub pruned: usize,
    pub last_tick: u64,
}

/// Parse one script line
pub fn parse_line(line: &str) -> anyhow::Result<ReplayOp> {
    serde_json::from_str(line).context("invalid replay operation")
}

/// Apply one operation to the engine
pub fn apply<I: VectorIndex>(
    engine: &mut MemoryEngine<I>,
    op: ReplayOp,
    line: usize,
    summary: &mut ReplaySummary,
) -> anyhow::Result<ReplayOutput> {
    let output = match op {
        ReplayOp::Create {
            tick,
            content,
            embedding,
            mood,
            id,
        } => {
            let glyph = match id {
                Some(id) => engine.create_with_id(id, &content, embedding, &mood, tick)?,
                None => engine.create(&content, embedding, &mood, tick)?,
            };
            summary.created += 1;
            ReplayOutput::Create {
                line,
                tick,
                id: glyph.id,
                decay_rate: glyph.decay_rate,
                neighbors: glyph.semantic_neighbors,
            }
        }
        ReplayOp::Search {
            tick,
            embedding,
            mood,
            k,
        } => {
            let hits = engine.search(&embedding, &mood, k, tick)?;
            ReplayOutput::Search {
                line,
                tick,
                hits: hits.iter().map(HitSummary::from).collect(),
            }
        }
        ReplayOp::Recall {
            tick,
            embedding,
            mood,
            k,
        } => {
            let hits = engine.recall(&embedding, &mood, k, tick)?;
            ReplayOutput::Recall {
                line,
                tick,
                hits: hits.iter().map(HitSummary::from).collect(),
            }
        }
        ReplayOp::Resonate { tick, id, strength } => {
            let resonance_count = engine.resonate(&id, tick, strength)?.resonance_count;
            ReplayOutput::Resonate {
                line,
                tick,
                vitality: engine.vitality_of(&id, tick)?,
                id,
                resonance_count,
            }
        }
        ReplayOp::Prune { tick, threshold } => {
            let pruned = match threshold {
                Some(threshold) => engine.prune(threshold, tick)?,
                None => engine.prune_with_default_threshold(tick)?,
            };
            summary.pruned += pruned;
            ReplayOutput::Prune {
                line,
                tick,
                pruned,
                remaining: engine.len(),
            }
        }
        ReplayOp::Constellations { tick } => ReplayOutput::Constellations {
            line,
            tick,
            constellations: engine.get_constellation_data(tick),
        },
        ReplayOp::Stats { tick } => ReplayOutput::Stats {
            line,
            tick,
            stats: engine.stats(tick),
        },
    };

    Ok(output)
}

fn tick_of(op: &ReplayOp) -> u64 {
    match op {
        ReplayOp::Create { tick, .. }
        | ReplayOp::Search { tick, .. }
        | ReplayOp::Recall { tick, .. }
        | ReplayOp::Resonate { tick, .. }
        | ReplayOp::Prune { tick, .. }
        | ReplayOp::Constellations { tick }
        | ReplayOp::Stats { tick } => *tick,
    }
}

/// Run a whole script, writing one JSON result line per operation
///
/// Stops at the first failing line; the error names the line number.
pub fn run_script<I: VectorIndex>(
    engine: &mut MemoryEngine<I>,
    script: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in script.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("failed to read line {}", line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let op = parse_line(trimmed).with_context(|| format!("line {}", line_no))?;
        let tick = tick_of(&op);
        if tick < summary.last_tick {
            tracing::warn!(line = line_no, tick, previous = summary.last_tick, "Tick went backwards");
        }

        let output = apply(engine, op, line_no, &mut summary)
            .with_context(|| format!("line {} failed", line_no))?;

        serde_json::to_writer(&mut *out, &output)?;
        out.write_all(b"\n")?;

        summary.operations += 1;
        summary.last_tick = summary.last_tick.max(tick);
    }

    out.flush()?;
    Ok(summary)
}
