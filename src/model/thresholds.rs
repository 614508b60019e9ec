#[derive(Debug, Clone)]
pub struct DecisionProfile {
    pub high_min: f64,
    pub elevated_min: f64,
    pub outlier_abs_z: f64,
    pub weight_behavior: f64,
    pub top_k: usize,
    pub categorical_limit: usize,
    pub missing_preview: usize,
}

impl DecisionProfile {
    pub fn default_v1() -> Self {
        Self {
            high_min: 0.6,
            elevated_min: 0.3,
            outlier_abs_z: 2.0,
            weight_behavior: 0.7,
            top_k: 15,
            categorical_limit: 50,
            missing_preview: 12,
        }
    }
}

impl Default for DecisionProfile {
    fn default() -> Self {
        Self::default_v1()
    }
}
