use ndarray::ArrayView3;

/// A single video frame: contiguous RGB bytes in row-major order.
///
/// Decode/encode happens at I/O boundaries only; the engine treats pixel
/// data as opaque except when cropping a candidate region for a classifier.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Position of this frame in decode order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Crops a candidate box with a proportional margin, clamped to frame
    /// bounds. The margin is `pad_ratio * max(w, h)` on every side, so the
    /// classifier sees some surrounding context instead of a tight box.
    ///
    /// Returns `None` when the clamped region is empty (box entirely
    /// off-frame).
    pub fn crop_padded(&self, x: i32, y: i32, w: i32, h: i32, pad_ratio: f64) -> Option<Frame> {
        let pad = (pad_ratio * w.max(h) as f64) as i32;
        let x1 = (x - pad).max(0) as u32;
        let y1 = (y - pad).max(0) as u32;
        let x2 = ((x + w + pad).max(0) as u32).min(self.width);
        let y2 = ((y + h + pad).max(0) as u32).min(self.height);

        if x1 >= x2 || y1 >= y2 {
            return None;
        }

        let cw = (x2 - x1) as usize;
        let ch = (y2 - y1) as usize;
        let chans = self.channels as usize;
        let stride = self.width as usize * chans;

        let mut data = Vec::with_capacity(cw * ch * chans);
        for row in y1 as usize..y2 as usize {
            let start = row * stride + x1 as usize * chans;
            data.extend_from_slice(&self.data[start..start + cw * chans]);
        }

        Some(Frame::new(data, cw as u32, ch as u32, self.channels, self.index))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
