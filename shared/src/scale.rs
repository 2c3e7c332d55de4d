use thiserror::Error;

use crate::colors::Rgb;

/// Number of color classes in the choropleth.
pub const BUCKETS: usize = 7;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    #[error("cannot build a scale without any finite values")]
    Empty,

    #[error("scale domain must be finite, got [{min}, {max}]")]
    NonFinite { min: f64, max: f64 },

    #[error("scale domain is inverted: min {min} > max {max}")]
    Inverted { min: f64, max: f64 },
}

/// Threshold scale splitting `[min, max)` into [`BUCKETS`] equal-width classes.
///
/// Boundary `i` sits at `min + i * (max - min) / BUCKETS`. A value belongs to
/// bucket `i` when `boundary[i] <= v < boundary[i + 1]`; anything below the
/// first boundary falls into bucket 0 and anything at or past the last one
/// into bucket `BUCKETS - 1`, so every real number has exactly one color.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdScale {
    min: f64,
    max: f64,
    boundaries: [f64; BUCKETS],
    palette: [Rgb; BUCKETS],
}

impl ThresholdScale {
    pub fn new(min: f64, max: f64, palette: [Rgb; BUCKETS]) -> Result<Self, ScaleError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ScaleError::NonFinite { min, max });
        }
        if min > max {
            return Err(ScaleError::Inverted { min, max });
        }
        let step = (max - min) / BUCKETS as f64;
        let boundaries = std::array::from_fn(|i| min + i as f64 * step);
        Ok(Self {
            min,
            max,
            boundaries,
            palette,
        })
    }

    /// Build over the extent of `values`, ignoring NaN and infinities.
    pub fn from_values(
        values: impl IntoIterator<Item = f64>,
        palette: [Rgb; BUCKETS],
    ) -> Result<Self, ScaleError> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .ok_or(ScaleError::Empty)?;
        Self::new(min, max, palette)
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn boundaries(&self) -> &[f64; BUCKETS] {
        &self.boundaries
    }

    pub fn palette(&self) -> &[Rgb; BUCKETS] {
        &self.palette
    }

    /// Bucket index for `value`. NaN lands in bucket 0.
    pub fn bucket_of(&self, value: f64) -> usize {
        let at_or_below = self.boundaries.partition_point(|b| *b <= value);
        at_or_below.saturating_sub(1).min(BUCKETS - 1)
    }

    pub fn color_of(&self, value: f64) -> Rgb {
        self.palette[self.bucket_of(value)]
    }

    /// `[lower, upper)` extent of a bucket. The open ends of the first and last
    /// buckets are closed off with the domain's min and max.
    pub fn invert_extent(&self, bucket: usize) -> Option<(f64, f64)> {
        if bucket >= BUCKETS {
            return None;
        }
        let lower = if bucket == 0 {
            self.min
        } else {
            self.boundaries[bucket]
        };
        let upper = if bucket == BUCKETS - 1 {
            self.max
        } else {
            self.boundaries[bucket + 1]
        };
        Some((lower, upper))
    }

    /// Same as [`invert_extent`](Self::invert_extent), keyed by palette color.
    pub fn invert_color(&self, color: Rgb) -> Option<(f64, f64)> {
        let bucket = self.palette.iter().position(|c| *c == color)?;
        self.invert_extent(bucket)
    }
}

/// Round half up, the way browsers round numbers for display.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Linear map from a numeric domain onto a pixel range, rounding the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 || !span.is_finite() {
            0.5
        } else {
            (value - d0) / span
        };
        round_half_up(r0 + (r1 - r0) * t)
    }
}

#[cfg(test)]
mod tests {
    use super::{BUCKETS, LinearScale, ScaleError, ThresholdScale, round_half_up};
    use crate::colors::REDS_7;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < tolerance,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    fn scale_20_75() -> ThresholdScale {
        ThresholdScale::new(20.0, 75.0, REDS_7).expect("valid domain")
    }

    #[test]
    fn boundaries_split_domain_into_sevenths() {
        let scale = scale_20_75();
        let expected = [20.0, 27.86, 35.71, 43.57, 51.43, 59.29, 67.14];
        for (actual, expected) in scale.boundaries().iter().zip(expected) {
            assert_close(*actual, expected, 0.005);
        }
    }

    #[test]
    fn thirty_falls_in_second_bucket() {
        let scale = scale_20_75();
        assert_eq!(scale.bucket_of(30.0), 1);
        assert_eq!(scale.color_of(30.0), REDS_7[1]);
    }

    #[test]
    fn out_of_domain_values_clamp_to_end_buckets() {
        let scale = scale_20_75();
        assert_eq!(scale.bucket_of(-5.0), 0);
        assert_eq!(scale.bucket_of(20.0), 0);
        assert_eq!(scale.bucket_of(75.0), BUCKETS - 1);
        assert_eq!(scale.bucket_of(1_000.0), BUCKETS - 1);
        assert_eq!(scale.bucket_of(f64::NAN), 0);
    }

    #[test]
    fn buckets_are_monotonic_across_domain() {
        let scale = scale_20_75();
        let mut previous = 0;
        let mut v = 20.0;
        while v < 75.0 {
            let bucket = scale.bucket_of(v);
            assert!(bucket >= previous, "bucket decreased at {v}");
            assert!(REDS_7.contains(&scale.color_of(v)));
            previous = bucket;
            v += 0.05;
        }
        assert_eq!(previous, BUCKETS - 1);
    }

    #[test]
    fn inverted_extent_contains_value() {
        let scale = scale_20_75();
        let mut v = 20.0;
        while v < 75.0 {
            let (lo, hi) = scale.invert_extent(scale.bucket_of(v)).expect("bucket in range");
            assert!(lo <= v && v < hi, "{v} outside [{lo}, {hi})");
            v += 0.05;
        }
    }

    #[test]
    fn open_ends_use_domain_bounds() {
        let scale = scale_20_75();
        assert_eq!(scale.invert_extent(0).map(|e| e.0), Some(20.0));
        assert_eq!(scale.invert_extent(BUCKETS - 1).map(|e| e.1), Some(75.0));
        assert_eq!(scale.invert_extent(BUCKETS), None);
        assert_eq!(scale.invert_color(REDS_7[0]), scale.invert_extent(0));
        assert_eq!(scale.invert_color((1, 2, 3)), None);
    }

    #[test]
    fn from_values_uses_finite_extent() {
        let scale = ThresholdScale::from_values([42.0, f64::NAN, 2.6, 75.1], REDS_7)
            .expect("finite values present");
        assert_eq!(scale.domain(), (2.6, 75.1));
        assert_eq!(
            ThresholdScale::from_values([f64::NAN], REDS_7),
            Err(ScaleError::Empty)
        );
    }

    #[test]
    fn rejects_bad_domains() {
        assert!(matches!(
            ThresholdScale::new(10.0, 5.0, REDS_7),
            Err(ScaleError::Inverted { .. })
        ));
        assert!(matches!(
            ThresholdScale::new(0.0, f64::INFINITY, REDS_7),
            Err(ScaleError::NonFinite { .. })
        ));
    }

    #[test]
    fn degenerate_domain_is_still_total() {
        let scale = ThresholdScale::new(5.0, 5.0, REDS_7).expect("single-point domain");
        assert_eq!(scale.bucket_of(4.0), 0);
        assert_eq!(scale.bucket_of(5.0), BUCKETS - 1);
    }

    #[test]
    fn linear_scale_rounds_to_pixels() {
        let scale = LinearScale::new((20.0, 75.0), (0.0, 200.0));
        assert_eq!(scale.map(20.0), 0.0);
        assert_eq!(scale.map(75.0), 200.0);
        assert_eq!(scale.map(27.857142857142858), 29.0);
        assert_eq!(LinearScale::new((3.0, 3.0), (0.0, 200.0)).map(3.0), 100.0);
    }

    #[test]
    fn round_half_up_matches_browser_rounding() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(27.86), 28.0);
    }
}
