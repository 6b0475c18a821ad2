// ---------------------------------------------------------------------------
// RotaryReading
// ---------------------------------------------------------------------------

/// One processed sample from the rotary angle sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotaryReading {
    /// Smoothed angle in degrees, `[0, 360)`.
    pub angle: u16,
    /// Absolute change from the last reported angle. 0 on the first sample.
    pub delta: u16,
    /// True only for the very first sample after construction.
    pub first: bool,
    /// True when the change cleared the report threshold (or `first`).
    pub reported: bool,
}

// ---------------------------------------------------------------------------
// RotarySampler
// ---------------------------------------------------------------------------

/// Noise-filtered angle-change detector.
///
/// Raw 16-bit ADC samples are smoothed through a fixed-size circular buffer;
/// the mean is reduced to 12-bit resolution and mapped to degrees. An angle
/// is reported only when it moved at least `report_threshold` degrees from
/// the last reported value. This hysteresis is the sole noise filter and is
/// never bypassed.
#[derive(Debug)]
pub struct RotarySampler {
    buf: Vec<u16>,
    idx: usize,
    last_reported: Option<u16>,
    report_threshold: u16,
}

impl RotarySampler {
    pub fn new(buffer_size: usize, report_threshold: u16) -> Self {
        Self {
            buf: vec![0; buffer_size.max(1)],
            idx: 0,
            last_reported: None,
            report_threshold,
        }
    }

    pub fn last_reported(&self) -> Option<u16> {
        self.last_reported
    }

    /// Overwrite the oldest slot with `raw`, recompute the smoothed angle,
    /// and apply the report hysteresis.
    pub fn push(&mut self, raw: u16) -> RotaryReading {
        self.buf[self.idx] = raw;
        self.idx = (self.idx + 1) % self.buf.len();

        let sum: u64 = self.buf.iter().map(|&v| v as u64).sum();
        let avg = sum / self.buf.len() as u64;
        // 16-bit ADC reading reduced to 12-bit, then scaled to [0, 360).
        let angle = ((avg >> 4) * 360 / 4096) as u16;

        match self.last_reported {
            None => {
                // First sample always reports, establishing the baseline.
                self.last_reported = Some(angle);
                RotaryReading {
                    angle,
                    delta: 0,
                    first: true,
                    reported: true,
                }
            }
            Some(prev) => {
                let delta = angle.abs_diff(prev);
                let reported = delta >= self.report_threshold;
                if reported {
                    self.last_reported = Some(angle);
                }
                RotaryReading {
                    angle,
                    delta,
                    first: false,
                    reported,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_always_reports() {
        let mut sampler = RotarySampler::new(10, 5);
        let reading = sampler.push(0);
        assert!(reading.first);
        assert!(reading.reported);
        assert_eq!(sampler.last_reported(), Some(reading.angle));
    }

    #[test]
    fn sub_threshold_oscillation_is_silent() {
        let mut sampler = RotarySampler::new(1, 5);
        let first = sampler.push(32_000);
        assert!(first.reported);

        // Oscillate within a couple of degrees of the baseline.
        for raw in [32_100, 31_900, 32_200, 31_800, 32_000] {
            let reading = sampler.push(raw);
            assert!(!reading.reported, "delta {} should stay silent", reading.delta);
        }
        assert_eq!(sampler.last_reported(), Some(first.angle));
    }

    #[test]
    fn large_change_reports_and_moves_baseline() {
        let mut sampler = RotarySampler::new(1, 5);
        let first = sampler.push(0);
        assert_eq!(first.angle, 0);

        let reading = sampler.push(65_535);
        assert!(reading.reported);
        assert!(reading.angle > 350);
        assert_eq!(sampler.last_reported(), Some(reading.angle));
    }

    #[test]
    fn angle_stays_below_360() {
        let mut sampler = RotarySampler::new(1, 5);
        let reading = sampler.push(u16::MAX);
        assert!(reading.angle < 360);
    }

    #[test]
    fn buffer_smooths_spikes() {
        let mut sampler = RotarySampler::new(10, 5);
        sampler.push(0);
        // One full-scale spike averaged over ten zeroed slots barely moves
        // the angle.
        let reading = sampler.push(65_535);
        assert!(reading.angle < 40);
    }
}
