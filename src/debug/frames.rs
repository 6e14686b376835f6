/// Rolling window over the most recent frame times, in seconds.
/// Storage is allocated once; the oldest sample is overwritten when full.
pub struct FrameWindow {
    samples: Box<[f64]>,
    next: usize,
    filled: usize,
    sum: f64,
}

/// Summary of the samples currently in a [`FrameWindow`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl FrameStats {
    /// Frames per second implied by the mean frame time.
    pub fn fps(&self) -> f64 {
        1.0 / self.mean.max(f64::EPSILON)
    }
}

impl FrameWindow {
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len.max(1)].into_boxed_slice(),
            next: 0,
            filled: 0,
            sum: 0.0,
        }
    }

    pub fn record(&mut self, dt: f64) {
        if self.filled == self.samples.len() {
            self.sum -= self.samples[self.next];
        } else {
            self.filled += 1;
        }
        self.samples[self.next] = dt;
        self.sum += dt;
        self.next = (self.next + 1) % self.samples.len();
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn reset(&mut self) {
        self.next = 0;
        self.filled = 0;
        self.sum = 0.0;
    }

    /// `None` until at least one frame is recorded.
    pub fn stats(&self) -> Option<FrameStats> {
        if self.is_empty() {
            return None;
        }
        let live = &self.samples[..self.filled];
        let (min, max) = live
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(FrameStats {
            mean: self.sum / self.filled as f64,
            min,
            max,
        })
    }
}
