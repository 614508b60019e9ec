use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Elevated,
    High,
}

impl RiskTier {
    pub fn name(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Elevated => "elevated",
            RiskTier::High => "high",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            RiskTier::High => {
                "high risk: contact a mental-health professional or school counselling centre soon"
            }
            RiskTier::Elevated => "early warning: online follow-up or intervention recommended",
            RiskTier::Low => "low risk: maintain healthy routines and support",
        }
    }
}

/// Created once per submission and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedDecision {
    pub behavior_probability: f64,
    pub text_probability: Option<f64>,
    pub weight_behavior: f64,
    pub fused_probability: f64,
    pub tier: RiskTier,
}

impl FusedDecision {
    pub fn weight_text(&self) -> f64 {
        1.0 - self.weight_behavior
    }

    pub fn used_text(&self) -> bool {
        self.text_probability.is_some()
    }
}
