//! Adaptive detection-candidate filtering and temporal-persistence engine.
//!
//! Sits between a raw per-frame object detector and downstream
//! classification: learns geometric/confidence thresholds from the video
//! itself during a warm-up window, rejects implausible candidates,
//! suppresses one-frame flickers via grid-cell persistence, and amortizes
//! detector cost by sampling frames while still annotating every frame.

pub mod detection;
pub mod filtering;
pub mod pipeline;
pub mod shared;
