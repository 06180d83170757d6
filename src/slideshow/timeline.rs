//! Slide timing: how many frames each slide occupies
//!
//! Slides are hard-cut in input order. Slide *i* covers the half-open frame
//! range `[round(start_i * fps), round(end_i * fps))`, where `start_i` is the
//! sum of the preceding slide durations. Rounding cumulative boundaries (not
//! per-slide lengths) keeps the total at `round(sum * fps)` frames. When every
//! slide shares one duration `d`, `start_i` is computed as `i * d` so ties at
//! half a frame round the same way as `round(n * d * fps)`.

use std::ops::Range;
use std::time::Duration;

use super::raster::ImageAsset;
use crate::error::{PitchError, Result};

/// One image paired with its display duration in seconds
#[derive(Debug, Clone)]
pub struct SlideSpec {
    pub image: ImageAsset,
    pub seconds: f64,
}

impl SlideSpec {
    #[must_use]
    pub fn new(image: ImageAsset, seconds: f64) -> Self {
        Self { image, seconds }
    }
}

/// Frame layout of a slideshow at a fixed frame rate
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    fps: u32,
    durations: Vec<f64>,
    boundaries: Vec<u64>,
}

impl Timeline {
    /// `count` slides sharing one duration.
    pub fn uniform(count: usize, seconds: f64, fps: u32) -> Result<Self> {
        Self::new(vec![seconds; count], fps)
    }

    pub fn from_slides(slides: &[SlideSpec], fps: u32) -> Result<Self> {
        Self::new(slides.iter().map(|s| s.seconds).collect(), fps)
    }

    pub fn new(durations: Vec<f64>, fps: u32) -> Result<Self> {
        if durations.is_empty() {
            return Err(PitchError::NoImagesProvided);
        }
        if fps == 0 {
            return Err(PitchError::InvalidSettings(
                "frame rate must be at least 1 fps".to_string(),
            ));
        }
        if let Some(bad) = durations.iter().find(|d| !d.is_finite() || **d <= 0.0) {
            return Err(PitchError::InvalidSettings(format!(
                "slide duration must be a positive number of seconds, got {bad}"
            )));
        }

        let uniform = durations.windows(2).all(|w| w[0] == w[1]);
        let mut boundaries = Vec::with_capacity(durations.len() + 1);
        boundaries.push(0);
        let mut elapsed = 0.0;
        for (i, d) in durations.iter().enumerate() {
            elapsed += d;
            let end = if uniform { (i + 1) as f64 * d } else { elapsed };
            boundaries.push((end * f64::from(fps)).round() as u64);
        }

        if let Some(i) = boundaries.windows(2).position(|w| w[0] == w[1]) {
            return Err(PitchError::InvalidSettings(format!(
                "slide {} lasts {}s, shorter than one frame at {fps} fps",
                i + 1,
                durations[i]
            )));
        }

        Ok(Self {
            fps,
            durations,
            boundaries,
        })
    }

    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn frame_ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        self.boundaries.windows(2).map(|w| w[0]..w[1])
    }

    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.boundaries.last().copied().unwrap_or(0)
    }

    /// Sum of configured slide durations
    #[must_use]
    pub fn nominal_duration(&self) -> Duration {
        Duration::from_secs_f64(self.durations.iter().sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_slides_three_seconds_at_24fps() {
        let timeline = Timeline::uniform(3, 3.0, 24).unwrap();
        assert_eq!(timeline.total_frames(), 216);
        assert_eq!(timeline.nominal_duration(), Duration::from_secs(9));
        assert_eq!(
            timeline.frame_ranges().collect::<Vec<_>>(),
            vec![0..72, 72..144, 144..216]
        );
    }

    #[test]
    fn total_is_n_times_d_times_f() {
        for (n, d, f) in [
            (1, 1.0, 24),
            (5, 2.5, 30),
            (7, 0.5, 24),
            (12, 4.0, 25),
            (9, 0.1, 25),
            (11, 0.1, 25),
            (7, 7.3, 25),
        ] {
            let timeline = Timeline::uniform(n, d, f).unwrap();
            let expected = (n as f64 * d * f64::from(f)).round() as u64;
            assert_eq!(timeline.total_frames(), expected, "n={n} d={d} f={f}");
            assert!(
                (timeline.nominal_duration().as_secs_f64() - n as f64 * d).abs() < 1e-9
            );
        }
    }

    #[test]
    fn ranges_are_contiguous_for_fractional_frames() {
        let timeline = Timeline::uniform(4, 0.3, 24).unwrap();
        let ranges: Vec<_> = timeline.frame_ranges().collect();
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(ranges.last().unwrap().end, timeline.total_frames());
        assert_eq!(timeline.total_frames(), 29);
    }

    #[test]
    fn mixed_durations_round_cumulative_boundaries() {
        let timeline = Timeline::new(vec![1.0, 0.5, 2.25], 24).unwrap();
        assert_eq!(
            timeline.frame_ranges().collect::<Vec<_>>(),
            vec![0..24, 24..36, 36..90]
        );
    }

    #[test]
    fn empty_timeline_is_no_images() {
        assert!(matches!(
            Timeline::uniform(0, 3.0, 24),
            Err(PitchError::NoImagesProvided)
        ));
    }

    #[test]
    fn rejects_bad_durations() {
        for d in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Timeline::uniform(2, d, 24),
                Err(PitchError::InvalidSettings(_))
            ));
        }
        assert!(matches!(
            Timeline::uniform(2, 1.0, 0),
            Err(PitchError::InvalidSettings(_))
        ));
    }

    #[test]
    fn rejects_slide_shorter_than_a_frame() {
        let err = Timeline::uniform(1, 0.01, 24).unwrap_err();
        assert!(err.to_string().contains("shorter than one frame"));
    }
}
