use serde::{Deserialize, Serialize};

/// One point of the speed series, taken at a whole elapsed second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedSample {
    pub at_second: u64,
    pub net_wpm: u32,
    pub raw_wpm: u32,
}

impl SpeedSample {
    pub fn new(at_second: u64, net_wpm: u32, raw_wpm: u32) -> Self {
        Self {
            at_second,
            net_wpm,
            raw_wpm,
        }
    }
}

impl From<SpeedSample> for (f64, f64) {
    fn from(p: SpeedSample) -> Self {
        (p.at_second as f64, p.net_wpm as f64)
    }
}

/// Append-only speed series holding at most one sample per second, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedSeries {
    samples: Vec<SpeedSample>,
}

impl SpeedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sample unless one already exists for its second (or a later one).
    /// Returns whether the sample was appended.
    pub fn record(&mut self, sample: SpeedSample) -> bool {
        match self.samples.last() {
            Some(last) if last.at_second >= sample.at_second => false,
            _ => {
                self.samples.push(sample);
                true
            }
        }
    }

    pub fn samples(&self) -> &[SpeedSample] {
        &self.samples
    }

    pub fn net_wpm_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.net_wpm as f64).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
