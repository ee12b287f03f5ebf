pub mod geo;
pub mod normalize;
pub mod opportunity;

pub use geo::geo_divergence;
pub use opportunity::{score_opportunity, ScoreInputs, ScoringSettings};
