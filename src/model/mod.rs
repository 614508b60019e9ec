pub mod baseline;
pub mod decision;
pub mod labels;
pub mod scores;
pub mod thresholds;
pub mod value;

pub fn clip01(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}
