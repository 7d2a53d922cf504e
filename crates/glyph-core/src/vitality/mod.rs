//! Vitality Model
//!
//! Pure computation of how "alive" a glyph is at a given logical tick.
//!
//! ## Core Formulas:
//! - Base decay: B = exp(-rate * (tick - last_resonance_tick))
//! - Resonance boost: R = min(0.5, count * 0.05)
//! - Vitality: V = B + R * (1 - B), clamped to [0, 1]
//!
//! Resonating a glyph resets its clock and, past five resonances, multiplies
//! its decay rate by 0.98. The rate never goes back up.

mod policy;

pub use policy::{
    DecayPolicy, ResonancePolicy, DEFAULT_BOOST_PER_RESONANCE, DEFAULT_DECAY_RATE,
    DEFAULT_MAX_BOOST, DEFAULT_SLOWDOWN_AFTER, DEFAULT_SLOWDOWN_FACTOR,
};

use crate::glyph::Glyph;

/// Vitality below which search never returns a glyph
pub const DEAD_FLOOR: f64 = 0.1;

/// Default prune threshold
pub const DEFAULT_PRUNE_THRESHOLD: f64 = 0.05;

/// Vitality of a glyph at `tick` under the default resonance policy
#[inline]
pub fn vitality(glyph: &Glyph, tick: u64) -> f64 {
    vitality_with_policy(glyph, tick, &ResonancePolicy::default())
}

/// Vitality of a glyph at `tick`
pub fn vitality_with_policy(glyph: &Glyph, tick: u64, policy: &ResonancePolicy) -> f64 {
    if tick == glyph.last_resonance_tick {
        return 1.0;
    }

    let elapsed = glyph.ticks_since_resonance(tick) as f64;
    let base = (-glyph.decay_rate * elapsed).exp();
    let boost = policy.boost(glyph.resonance_count);

    (base + boost * (1.0 - base)).clamp(0.0, 1.0)
}

/// Resonate under the default policy
#[inline]
pub fn resonate(glyph: &mut Glyph, tick: u64, strength: f64) {
    resonate_with_policy(glyph, tick, strength, &ResonancePolicy::default());
}

/// Refresh a glyph at `tick`
///
/// `strength` is accepted for callers that track it; the model itself
/// treats every resonance the same.
pub fn resonate_with_policy(glyph: &mut Glyph, tick: u64, _strength: f64, policy: &ResonancePolicy) {
    glyph.last_resonance_tick = glyph.last_resonance_tick.max(tick);
    glyph.resonance_count = glyph.resonance_count.saturating_add(1);

    if glyph.resonance_count > policy.slowdown_after {
        glyph.decay_rate *= policy.slowdown_factor;
    }
}

// ============================================================================
// TESTS
// ============================================================================
