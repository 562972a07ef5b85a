use std::collections::HashMap;

use crate::detection::candidate_extractor::extract_candidates;
use crate::detection::classifier::Classifier;
use crate::detection::detector::Detector;
use crate::filtering::calibrator::ThresholdCalibrator;
use crate::filtering::candidate_filter;
use crate::filtering::persistence::PersistenceFilter;
use crate::filtering::thresholds::ThresholdSet;
use crate::shared::candidate::AcceptedCandidate;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

use super::engine_config::EngineConfig;
use super::run_summary::RunSummary;

/// Decides which frames get full detection + filtering and carries the
/// last accepted candidate set forward to the frames in between.
///
/// On a sampled frame (`frame_index % frame_step == 0`) the full chain
/// runs: detect, extract, calibration bookkeeping, geometric/confidence
/// filter, persistence filter, classifier attachment; the surviving list
/// replaces the cache. Skipped frames reuse the cache verbatim. Any
/// detector or classifier error on a sampled frame resets the cache to
/// empty so stale "ghost boxes" never outlive a malfunction.
///
/// All calibration and filtering state is owned here, by the single
/// consumer of the frame stream; no synchronization is needed by
/// construction.
pub struct SamplingCoordinator {
    detector: Box<dyn Detector>,
    classifier: Option<Box<dyn Classifier>>,
    thresholds: ThresholdSet,
    calibrator: ThresholdCalibrator,
    persistence: PersistenceFilter,
    frame_step: usize,
    crop_pad_ratio: f64,
    frame_index: usize,
    frames_sampled: usize,
    accepted_total: usize,
    label_counts: HashMap<String, usize>,
    last_accepted: Vec<AcceptedCandidate>,
}

impl SamplingCoordinator {
    pub fn new(
        detector: Box<dyn Detector>,
        classifier: Option<Box<dyn Classifier>>,
        config: &EngineConfig,
        metadata: &VideoMetadata,
    ) -> Self {
        let frame_area = metadata.frame_area();
        Self {
            detector,
            classifier,
            thresholds: ThresholdSet::provisional(&config.fallback, frame_area),
            calibrator: ThresholdCalibrator::new(config.calibration.clone(), frame_area),
            persistence: PersistenceFilter::new(
                config.grid_size,
                config.persistence_min_hits,
                config.history_capacity,
            ),
            frame_step: config.frame_step,
            crop_pad_ratio: config.crop_pad_ratio,
            frame_index: 0,
            frames_sampled: 0,
            accepted_total: 0,
            label_counts: HashMap::new(),
            last_accepted: Vec::new(),
        }
    }

    /// Processes one frame and returns the accepted set to annotate it
    /// with: freshly computed on sampled frames, cached otherwise.
    pub fn process_frame(&mut self, frame: &Frame) -> &[AcceptedCandidate] {
        let sampled = self.frame_index % self.frame_step == 0;
        self.frame_index += 1;

        if !sampled {
            return &self.last_accepted;
        }

        match self.analyze(frame) {
            Ok(accepted) => {
                self.frames_sampled += 1;
                self.accepted_total += accepted.len();
                for entry in &accepted {
                    if let Some(label) = &entry.label {
                        *self.label_counts.entry(label.name.clone()).or_default() += 1;
                    }
                }
                self.last_accepted = accepted;
            }
            Err(e) => {
                // Fail safe, not fail open: the affected frame drops all
                // annotations instead of reusing possibly-stale boxes.
                log::debug!("frame {}: analysis failed: {e}", self.frame_index - 1);
                self.last_accepted.clear();
            }
        }

        &self.last_accepted
    }

    /// Drops the cached accepted set. Used by the executor when a frame
    /// could not be read at all, so skipped-frame reuse cannot resurrect
    /// boxes across the gap.
    pub fn invalidate_cache(&mut self) {
        self.last_accepted.clear();
    }

    pub fn last_accepted(&self) -> &[AcceptedCandidate] {
        &self.last_accepted
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_frames: self.frame_index,
            frames_sampled: self.frames_sampled,
            frame_step: self.frame_step,
            accepted_total: self.accepted_total,
            label_counts: self.label_counts.clone(),
            thresholds: self.thresholds.clone(),
            calibrated: self.calibrator.is_calibrated(),
            calibration_area_samples: self.calibrator.area_sample_count(),
            calibration_confidence_samples: self.calibrator.confidence_sample_count(),
            persistence_min_hits: self.persistence.min_hits(),
            grid_size: self.persistence.grid_size(),
        }
    }

    fn analyze(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<AcceptedCandidate>, Box<dyn std::error::Error>> {
        let raw = self.detector.detect(frame)?;
        let candidates = extract_candidates(&raw);

        let mut accepted = Vec::new();
        for candidate in candidates {
            if !self.calibrator.is_calibrated() {
                self.calibrator.add_sample(
                    candidate.area(),
                    candidate.aspect_ratio(),
                    candidate.confidence(),
                );
                if self.calibrator.ready() {
                    self.thresholds = self.calibrator.calibrate();
                    log::info!(
                        "thresholds calibrated after {} samples: {:?}",
                        self.calibrator.area_sample_count(),
                        self.thresholds
                    );
                }
            }

            if !candidate_filter::passes(&candidate, &self.thresholds) {
                continue;
            }
            if !self.persistence.observe(candidate.x(), candidate.y()) {
                continue;
            }

            let label = match self.classifier.as_mut() {
                Some(classifier) => {
                    let crop = frame.crop_padded(
                        candidate.x(),
                        candidate.y(),
                        candidate.width(),
                        candidate.height(),
                        self.crop_pad_ratio,
                    );
                    // An empty crop means the box sits entirely outside
                    // the frame; nothing to classify.
                    let Some(crop) = crop else { continue };
                    match classifier.classify(&crop)? {
                        Some(label) => Some(label),
                        // No result for this crop drops the candidate.
                        None => continue,
                    }
                }
                None => None,
            };

            accepted.push(AcceptedCandidate { candidate, label });
        }

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::candidate::{Label, RawDetection};

    // --- Stubs ---

    struct ScriptedDetector {
        /// One entry per detect() call; `None` scripts an error.
        script: Vec<Option<Vec<RawDetection>>>,
        calls: usize,
    }

    impl ScriptedDetector {
        fn new(script: Vec<Option<Vec<RawDetection>>>) -> Self {
            Self { script, calls: 0 }
        }

        fn repeating(detections: Vec<RawDetection>) -> Self {
            Self {
                script: vec![Some(detections)],
                calls: 0,
            }
        }
    }

    impl Detector for ScriptedDetector {
        fn detect(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
            let step = self.script[self.calls.min(self.script.len() - 1)].clone();
            self.calls += 1;
            step.ok_or_else(|| "detector malfunction".into())
        }
    }

    struct FixedClassifier {
        result: Option<Label>,
        fail: bool,
    }

    impl Classifier for FixedClassifier {
        fn classify(
            &mut self,
            _crop: &Frame,
        ) -> Result<Option<Label>, Box<dyn std::error::Error>> {
            if self.fail {
                return Err("classifier malfunction".into());
            }
            Ok(self.result.clone())
        }
    }

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 100 * 100 * 3], 100, 100, 3, index)
    }

    fn detection(x: i32, y: i32, w: i32, h: i32) -> RawDetection {
        RawDetection {
            x,
            y,
            width: w,
            height: h,
            confidence: None,
        }
    }

    /// Permissive config: every frame sampled, persistence off, warm-up
    /// far away, so individual behaviors can be isolated.
    fn open_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.frame_step = 1;
        config.persistence_min_hits = 1;
        config.calibration.warmup_target = 1000;
        config.fallback.min_area = 1.0;
        config
    }

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            width: 100,
            height: 100,
            fps: 30.0,
            total_frames: 0,
        }
    }

    fn coordinator(detector: ScriptedDetector, config: EngineConfig) -> SamplingCoordinator {
        SamplingCoordinator::new(Box::new(detector), None, &config, &metadata())
    }

    // --- Sampling stride ---

    #[test]
    fn test_step_3_samples_frames_0_3_6() {
        let detector = ScriptedDetector::repeating(vec![detection(10, 10, 20, 20)]);
        let mut config = open_config();
        config.frame_step = 3;
        let mut coord = coordinator(detector, config);

        for i in 0..9 {
            coord.process_frame(&frame(i));
        }

        let summary = coord.summary();
        assert_eq!(summary.total_frames, 9);
        assert_eq!(summary.frames_sampled, 3); // frames 0, 3, 6
    }

    #[test]
    fn test_skipped_frames_reuse_latest_sampled_result() {
        let detector = ScriptedDetector::new(vec![
            Some(vec![detection(10, 10, 20, 20)]),
            Some(vec![detection(50, 50, 20, 20)]),
        ]);
        let mut config = open_config();
        config.frame_step = 2;
        let mut coord = coordinator(detector, config);

        let f0 = coord.process_frame(&frame(0)).to_vec();
        assert_eq!(f0.len(), 1);
        assert_eq!(f0[0].candidate.x(), 10);

        // Skipped frame reuses frame 0's result verbatim.
        let f1 = coord.process_frame(&frame(1)).to_vec();
        assert_eq!(f1, f0);

        // Next sampled frame overwrites the cache.
        let f2 = coord.process_frame(&frame(2)).to_vec();
        assert_eq!(f2[0].candidate.x(), 50);
    }

    #[test]
    fn test_counters_ignore_skipped_frames() {
        let detector = ScriptedDetector::repeating(vec![detection(10, 10, 20, 20)]);
        let mut config = open_config();
        config.frame_step = 3;
        let mut coord = coordinator(detector, config);

        for i in 0..9 {
            coord.process_frame(&frame(i));
        }

        // One acceptance per sampled frame; cache reuse must not triple it.
        assert_eq!(coord.summary().accepted_total, 3);
    }

    // --- Fail-safe ---

    #[test]
    fn test_detector_error_empties_cache() {
        let detector = ScriptedDetector::new(vec![
            Some(vec![detection(10, 10, 20, 20)]),
            None, // malfunction on the second sampled frame
            Some(vec![detection(10, 10, 20, 20)]),
        ]);
        let mut coord = coordinator(detector, open_config());

        assert_eq!(coord.process_frame(&frame(0)).len(), 1);
        // The failed frame must not resurrect the previous cache.
        assert!(coord.process_frame(&frame(1)).is_empty());
        assert!(coord.last_accepted().is_empty());
        // The run recovers on the next sampled frame.
        assert_eq!(coord.process_frame(&frame(2)).len(), 1);
    }

    #[test]
    fn test_failed_frame_not_counted_as_sampled() {
        let detector = ScriptedDetector::new(vec![None]);
        let mut coord = coordinator(detector, open_config());
        coord.process_frame(&frame(0));
        assert_eq!(coord.summary().frames_sampled, 0);
        assert_eq!(coord.summary().total_frames, 1);
    }

    #[test]
    fn test_classifier_error_empties_cache() {
        let detector = ScriptedDetector::repeating(vec![detection(10, 10, 20, 20)]);
        let classifier = FixedClassifier {
            result: None,
            fail: true,
        };
        let mut coord = SamplingCoordinator::new(
            Box::new(detector),
            Some(Box::new(classifier)),
            &open_config(),
            &metadata(),
        );
        assert!(coord.process_frame(&frame(0)).is_empty());
        assert_eq!(coord.summary().frames_sampled, 0);
    }

    #[test]
    fn test_invalidate_cache_clears_last_accepted() {
        let detector = ScriptedDetector::repeating(vec![detection(10, 10, 20, 20)]);
        let mut coord = coordinator(detector, open_config());
        coord.process_frame(&frame(0));
        assert_eq!(coord.last_accepted().len(), 1);
        coord.invalidate_cache();
        assert!(coord.last_accepted().is_empty());
    }

    // --- Classifier attachment ---

    #[test]
    fn test_classifier_label_attached_and_tallied() {
        let detector = ScriptedDetector::repeating(vec![detection(10, 10, 20, 20)]);
        let classifier = FixedClassifier {
            result: Some(Label {
                name: "happy".to_string(),
                score: 91.5,
            }),
            fail: false,
        };
        let mut coord = SamplingCoordinator::new(
            Box::new(detector),
            Some(Box::new(classifier)),
            &open_config(),
            &metadata(),
        );

        let accepted = coord.process_frame(&frame(0)).to_vec();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].label.as_ref().unwrap().name, "happy");

        coord.process_frame(&frame(1));
        assert_eq!(coord.summary().label_counts["happy"], 2);
    }

    #[test]
    fn test_classifier_no_result_drops_candidate() {
        let detector = ScriptedDetector::repeating(vec![detection(10, 10, 20, 20)]);
        let classifier = FixedClassifier {
            result: None,
            fail: false,
        };
        let mut coord = SamplingCoordinator::new(
            Box::new(detector),
            Some(Box::new(classifier)),
            &open_config(),
            &metadata(),
        );
        assert!(coord.process_frame(&frame(0)).is_empty());
        // Frame itself succeeded; it still counts as sampled.
        assert_eq!(coord.summary().frames_sampled, 1);
    }

    // --- Calibration wiring ---

    #[test]
    fn test_warmup_end_to_end_collapsed_ratios_use_fallback_window() {
        // Five square boxes with areas 100..130; all aspect ratios 1.0,
        // so calibration must fall back to the [0.6, 1.6] window.
        let sizes = [10, 11, 10, 11, 9]; // areas 100, 121, 100, 121, 81
        let script: Vec<Option<Vec<RawDetection>>> = sizes
            .iter()
            .map(|&s| Some(vec![detection(10, 10, s, s)]))
            .collect();
        let detector = ScriptedDetector::new(script);

        let mut config = open_config();
        config.calibration.warmup_target = 5;
        let mut coord = coordinator(detector, config);

        for i in 0..4 {
            coord.process_frame(&frame(i));
            assert!(!coord.summary().calibrated);
        }
        coord.process_frame(&frame(4));

        let summary = coord.summary();
        assert!(summary.calibrated);
        assert_eq!(summary.calibration_area_samples, 5);
        assert_eq!(summary.thresholds.min_aspect_ratio, 0.6);
        assert_eq!(summary.thresholds.max_aspect_ratio, 1.6);
    }

    #[test]
    fn test_calibrated_thresholds_filter_in_same_frame() {
        // Warm-up of 1: the first candidate calibrates, and the second
        // candidate of the same frame is judged by the new thresholds.
        let detector = ScriptedDetector::repeating(vec![
            detection(10, 10, 20, 20), // area 400 -> calibrates min=max=400
            detection(40, 40, 50, 50), // area 2500, outside [400, 400]
        ]);
        let mut config = open_config();
        config.calibration.warmup_target = 1;
        let mut coord = coordinator(detector, config);

        let accepted = coord.process_frame(&frame(0)).to_vec();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].candidate.width(), 20);
    }

    // --- Persistence wiring ---

    #[test]
    fn test_persistence_suppresses_one_frame_flicker() {
        let detector = ScriptedDetector::new(vec![
            Some(vec![detection(10, 10, 20, 20)]),
            // Same cell recurs; a far-away flicker appears once.
            Some(vec![detection(12, 11, 20, 20), detection(500, 500, 20, 20)]),
        ]);
        let mut config = open_config();
        config.persistence_min_hits = 2;
        let mut coord = coordinator(detector, config);

        // First observation of the cell: rejected.
        assert!(coord.process_frame(&frame(0)).is_empty());
        // Recurring cell accepted; the flicker is not.
        let accepted = coord.process_frame(&frame(1)).to_vec();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].candidate.x(), 12);
    }
}
