use crate::model::clip01;
use crate::model::decision::{FusedDecision, RiskTier};
use crate::model::thresholds::DecisionProfile;

/// Weighted average of the behavior and text probabilities; behavior-only when text is absent.
/// Inputs and weight are clipped to [0, 1]. Equal inputs fuse to exactly that value.
pub fn fuse(
    p_behavior: f64,
    p_text: Option<f64>,
    weight_behavior: f64,
    profile: &DecisionProfile,
) -> FusedDecision {
    let p_behavior = clip01(p_behavior);
    let p_text = p_text.map(clip01);
    let weight_behavior = clip01(weight_behavior);

    let fused_probability = match p_text {
        Some(pt) => pt + weight_behavior * (p_behavior - pt),
        None => p_behavior,
    };

    FusedDecision {
        behavior_probability: p_behavior,
        text_probability: p_text,
        weight_behavior,
        fused_probability,
        tier: classify_tier(fused_probability, profile),
    }
}

/// Lower bounds are inclusive and checked from the top tier down.
pub fn classify_tier(fused: f64, profile: &DecisionProfile) -> RiskTier {
    if fused >= profile.high_min {
        RiskTier::High
    } else if fused >= profile.elevated_min {
        RiskTier::Elevated
    } else {
        RiskTier::Low
    }
}

pub fn fusion_caption(decision: &FusedDecision) -> String {
    match decision.text_probability {
        Some(pt) => format!(
            "fused = behavior {:.2} x {:.3} + text {:.2} x {:.3} = {:.3}",
            decision.weight_behavior,
            decision.behavior_probability,
            decision.weight_text(),
            pt,
            decision.fused_probability
        ),
        None => format!(
            "behavior-only: fused = {:.3} (no text model or empty text)",
            decision.fused_probability
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_fusion.rs"]
mod tests;
