use std::collections::HashMap;
use std::fmt::Write as _;

use crate::filtering::thresholds::ThresholdSet;

/// Run-level aggregates exposed to reporting collaborators.
///
/// Counters reflect sampled frames only; frames that reused the cache
/// never inflate them.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Every frame that reached the engine, sampled or not.
    pub total_frames: usize,
    /// Frames on which detection/filtering actually ran.
    pub frames_sampled: usize,
    pub frame_step: usize,
    /// Accepted candidates across all sampled frames.
    pub accepted_total: usize,
    /// Per-label tallies from the attached classifier, if any.
    pub label_counts: HashMap<String, usize>,
    /// The ThresholdSet active at end of run.
    pub thresholds: ThresholdSet,
    pub calibrated: bool,
    pub calibration_area_samples: usize,
    pub calibration_confidence_samples: usize,
    pub persistence_min_hits: usize,
    pub grid_size: f64,
}

impl RunSummary {
    /// Label tallies sorted by count descending, name ascending on ties.
    pub fn top_labels(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .label_counts
            .iter()
            .map(|(name, &count)| (name.as_str(), count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Renders the human-readable end-of-run report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Detection filtering summary ===");
        let _ = writeln!(out, "Frames total: {}", self.total_frames);
        let _ = writeln!(
            out,
            "Frames analyzed (sampling, step={}): {}",
            self.frame_step, self.frames_sampled
        );
        let _ = writeln!(out, "Accepted detections (after filters): {}", self.accepted_total);

        let state = if self.calibrated {
            "calibrated"
        } else {
            "provisional"
        };
        let _ = writeln!(
            out,
            "Thresholds ({state}, {} area / {} confidence samples):",
            self.calibration_area_samples, self.calibration_confidence_samples
        );
        let _ = writeln!(out, "  min_area={:.0}", self.thresholds.min_area);
        let _ = writeln!(out, "  max_area={:.0}", self.thresholds.max_area);
        let _ = writeln!(out, "  min_aspect_ratio={:.3}", self.thresholds.min_aspect_ratio);
        let _ = writeln!(out, "  max_aspect_ratio={:.3}", self.thresholds.max_aspect_ratio);
        let _ = writeln!(out, "  min_confidence={:.3}", self.thresholds.min_confidence);
        let _ = writeln!(out, "  persistence_min_hits={}", self.persistence_min_hits);
        let _ = writeln!(out, "  grid_size={:.0}", self.grid_size);

        let top = self.top_labels();
        if !top.is_empty() {
            let _ = writeln!(out, "Top labels:");
            for (name, count) in top.iter().take(10) {
                let _ = writeln!(out, "- {name}: {count}");
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            total_frames: 90,
            frames_sampled: 30,
            frame_step: 3,
            accepted_total: 25,
            label_counts: HashMap::from([
                ("happy".to_string(), 12),
                ("neutral".to_string(), 10),
                ("sad".to_string(), 3),
            ]),
            thresholds: ThresholdSet {
                min_area: 1400.0,
                max_area: 48_000.0,
                min_aspect_ratio: 0.6,
                max_aspect_ratio: 1.6,
                min_confidence: 0.36,
            },
            calibrated: true,
            calibration_area_samples: 150,
            calibration_confidence_samples: 120,
            persistence_min_hits: 2,
            grid_size: 60.0,
        }
    }

    #[test]
    fn test_top_labels_sorted_by_count_then_name() {
        let mut s = summary();
        s.label_counts.insert("angry".to_string(), 10);
        let top = s.top_labels();
        assert_eq!(top[0], ("happy", 12));
        // Tie between angry and neutral resolves alphabetically.
        assert_eq!(top[1], ("angry", 10));
        assert_eq!(top[2], ("neutral", 10));
        assert_eq!(top[3], ("sad", 3));
    }

    #[test]
    fn test_render_contains_key_fields() {
        let text = summary().render();
        assert!(text.contains("Frames total: 90"));
        assert!(text.contains("step=3"));
        assert!(text.contains("Accepted detections (after filters): 25"));
        assert!(text.contains("calibrated"));
        assert!(text.contains("min_area=1400"));
        assert!(text.contains("min_confidence=0.360"));
        assert!(text.contains("- happy: 12"));
    }

    #[test]
    fn test_render_without_labels_omits_section() {
        let mut s = summary();
        s.label_counts.clear();
        assert!(!s.render().contains("Top labels"));
    }

    #[test]
    fn test_render_provisional_state() {
        let mut s = summary();
        s.calibrated = false;
        assert!(s.render().contains("provisional"));
    }
}
