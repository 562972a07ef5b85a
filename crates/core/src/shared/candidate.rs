/// One bounding box as reported by an upstream detector for a single frame.
///
/// Raw output is untrusted: boxes may be degenerate (zero or negative
/// dimensions) and a confidence score is only available from some detector
/// backends.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDetection {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: Option<f64>,
}

/// A validated detection candidate with strictly positive dimensions.
///
/// `confidence` stays `None` when the detector backend reports no score.
/// That is distinct from a score of zero: the confidence filter treats a
/// missing score as "cannot fail this check".
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    confidence: Option<f64>,
}

impl Candidate {
    /// Validates a raw detection. Boxes with `width <= 0` or `height <= 0`
    /// yield `None` and are dropped silently by the extractor.
    pub fn from_raw(raw: &RawDetection) -> Option<Self> {
        if raw.width <= 0 || raw.height <= 0 {
            return None;
        }
        Some(Self {
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
            confidence: raw.confidence,
        })
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Classifier output for one candidate: a dominant label and its score.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub name: String,
    pub score: f64,
}

/// A candidate that survived the full filter chain, with any classifier
/// attributes attached. The most recent accepted set of a sampled frame is
/// cached by the sampling coordinator and reused verbatim on skipped frames.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptedCandidate {
    pub candidate: Candidate,
    pub label: Option<Label>,
}
