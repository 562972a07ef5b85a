pub mod candidate_extractor;
pub mod classifier;
pub mod detector;
