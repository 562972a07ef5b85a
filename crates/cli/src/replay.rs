use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde::Deserialize;

use facesift_core::detection::detector::Detector;
use facesift_core::pipeline::annotation_sink::AnnotationSink;
use facesift_core::pipeline::frame_source::FrameSource;
use facesift_core::shared::candidate::{AcceptedCandidate, RawDetection};
use facesift_core::shared::frame::Frame;
use facesift_core::shared::video_metadata::VideoMetadata;

/// One line of a JSONL detection log.
#[derive(Debug, Deserialize)]
pub struct DetectionRecord {
    pub frame: usize,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Loads a detection log into per-frame detection lists.
pub fn load_records(
    path: &Path,
) -> Result<HashMap<usize, Vec<RawDetection>>, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    parse_records(BufReader::new(file))
}

fn parse_records<R: BufRead>(
    reader: R,
) -> Result<HashMap<usize, Vec<RawDetection>>, Box<dyn std::error::Error>> {
    let mut records: HashMap<usize, Vec<RawDetection>> = HashMap::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: DetectionRecord =
            serde_json::from_str(&line).map_err(|e| format!("line {}: {e}", line_no + 1))?;
        records.entry(record.frame).or_default().push(RawDetection {
            x: record.x,
            y: record.y,
            width: record.w,
            height: record.h,
            confidence: record.confidence,
        });
    }

    Ok(records)
}

/// Synthesizes blank frames of the recorded dimensions; a replay run only
/// needs geometry, not pixel content.
pub struct ReplayFrameSource {
    width: u32,
    height: u32,
    fps: f64,
    total_frames: usize,
}

impl ReplayFrameSource {
    pub fn new(width: u32, height: u32, fps: f64, total_frames: usize) -> Self {
        Self {
            width,
            height,
            fps,
            total_frames,
        }
    }
}

impl FrameSource for ReplayFrameSource {
    fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        if self.width == 0 || self.height == 0 {
            return Err("frame dimensions must be positive".into());
        }
        Ok(VideoMetadata {
            width: self.width,
            height: self.height,
            fps: self.fps,
            total_frames: self.total_frames,
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let (width, height, total) = (self.width, self.height, self.total_frames);
        let len = (width as usize) * (height as usize) * 3;
        Box::new((0..total).map(move |i| Ok(Frame::new(vec![0u8; len], width, height, 3, i))))
    }

    fn close(&mut self) {}
}

/// Serves recorded detections keyed by frame index.
pub struct ReplayDetector {
    records: HashMap<usize, Vec<RawDetection>>,
}

impl ReplayDetector {
    pub fn new(records: HashMap<usize, Vec<RawDetection>>) -> Self {
        Self { records }
    }
}

impl Detector for ReplayDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
        Ok(self.records.get(&frame.index()).cloned().unwrap_or_default())
    }
}

/// Writes one JSON object per frame with the accepted boxes.
pub struct JsonlAnnotationSink {
    out: Box<dyn Write + Send>,
}

impl JsonlAnnotationSink {
    pub fn create(path: Option<&Path>) -> io::Result<Self> {
        let out: Box<dyn Write + Send> = match path {
            Some(p) => Box::new(File::create(p)?),
            None => Box::new(io::stdout()),
        };
        Ok(Self { out })
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }
}

impl AnnotationSink for JsonlAnnotationSink {
    fn annotate(
        &mut self,
        frame: &Frame,
        accepted: &[AcceptedCandidate],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let boxes: Vec<serde_json::Value> = accepted
            .iter()
            .map(|entry| {
                let c = &entry.candidate;
                let mut value = serde_json::json!({
                    "x": c.x(),
                    "y": c.y(),
                    "w": c.width(),
                    "h": c.height(),
                });
                if let Some(label) = &entry.label {
                    value["label"] = serde_json::json!(label.name);
                    value["score"] = serde_json::json!(label.score);
                }
                value
            })
            .collect();

        let line = serde_json::json!({ "frame": frame.index(), "accepted": boxes });
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn finish(
        &mut self,
        _summary: &facesift_core::pipeline::run_summary::RunSummary,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.out.flush()?;
        Ok(())
    }
}
