//! # Reference Trajectory Curves
//!
//! Expected-altitude bands drawn behind the live altitude trace.
//!
//! Each curve is piecewise linear with a single breakpoint `b` and a total
//! span `s`:
//!
//! - `0 ..= b`: descent from 900 to 500
//! - `b ..= s`: descent from 500 to ground level (0)
//!
//! ```text
//! y(x) = 900 - (400 / b) * x               x <= b
//! y(x) = 500 - (500 / (s - b)) * (x - b)   x >  b
//! ```
//!
//! ## Usage
//!
//! ```
//! use ground_station::trajectory::reference::MAIN_CURVE;
//!
//! assert_eq!(MAIN_CURVE.evaluate(0.0), 900.0);
//! assert!((MAIN_CURVE.evaluate(MAIN_CURVE.breakpoint()) - 500.0).abs() < 1e-9);
//! ```

use crate::telemetry::series::{Sample, Series};

/// Altitude at `x = 0`
pub const START_ALTITUDE: f64 = 900.0;

/// Altitude at the breakpoint
pub const BREAKPOINT_ALTITUDE: f64 = 500.0;

/// Points per reference band
pub const DEFAULT_SAMPLE_COUNT: usize = 50;

/// Nominal trajectory
pub const MAIN_CURVE: ReferenceCurve = ReferenceCurve::new("Main Function", 21.413, 271.066);

/// Slowest expected descent
pub const MIN_CURVE: ReferenceCurve = ReferenceCurve::new("Min Function", 28.079, 526.655);

/// Fastest expected descent
pub const MAX_CURVE: ReferenceCurve = ReferenceCurve::new("Max Function", 17.413, 183.766);

/// Piecewise-linear expected altitude over elapsed time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceCurve {
    name: &'static str,
    breakpoint: f64,
    span: f64,
}

impl ReferenceCurve {
    /// Create a curve; `breakpoint` must lie strictly inside `(0, span)`
    #[must_use]
    pub const fn new(name: &'static str, breakpoint: f64, span: f64) -> Self {
        Self {
            name,
            breakpoint,
            span,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn breakpoint(&self) -> f64 {
        self.breakpoint
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.span
    }

    /// Expected altitude at elapsed time `x`
    ///
    /// The breakpoint itself belongs to the first segment.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        if x <= self.breakpoint {
            START_ALTITUDE - (START_ALTITUDE - BREAKPOINT_ALTITUDE) / self.breakpoint * x
        } else {
            BREAKPOINT_ALTITUDE
                - BREAKPOINT_ALTITUDE / (self.span - self.breakpoint) * (x - self.breakpoint)
        }
    }

    /// Evaluate at `count` points spaced evenly over `0 ..= span`
    ///
    /// # Examples
    ///
    /// ```
    /// use ground_station::trajectory::reference::MIN_CURVE;
    ///
    /// let band = MIN_CURVE.sample(50);
    /// assert_eq!(band.len(), 50);
    /// assert_eq!(band.last().unwrap().x, MIN_CURVE.span());
    /// ```
    #[must_use]
    pub fn sample(&self, count: usize) -> Series {
        let mut series = Series::new(self.name);
        match count {
            0 => {}
            1 => series.push(Sample::new(0.0, self.evaluate(0.0))),
            _ => {
                let step = self.span / (count - 1) as f64;
                for i in 0..count {
                    // Pin the last point to the span to avoid drift.
                    let x = if i == count - 1 { self.span } else { step * i as f64 };
                    series.push(Sample::new(x, self.evaluate(x)));
                }
            }
        }
        series
    }
}

/// The three bands rendered at startup: main, min, max
#[must_use]
pub fn reference_bands(count: usize) -> Vec<Series> {
    [MAIN_CURVE, MIN_CURVE, MAX_CURVE]
        .iter()
        .map(|curve| curve.sample(count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_first_segment_formula() {
        for curve in [MAIN_CURVE, MIN_CURVE, MAX_CURVE] {
            let b = curve.breakpoint();
            for i in 0..=20 {
                let x = b * i as f64 / 20.0;
                let expected = 900.0 - (400.0 / b) * x;
                assert!((curve.evaluate(x) - expected).abs() < EPS, "{} at {}", curve.name(), x);
            }
        }
    }

    #[test]
    fn test_second_segment_formula() {
        for curve in [MAIN_CURVE, MIN_CURVE, MAX_CURVE] {
            let (b, s) = (curve.breakpoint(), curve.span());
            for i in 1..=20 {
                let x = b + (s - b) * i as f64 / 20.0;
                let expected = 500.0 - (500.0 / (s - b)) * (x - b);
                assert!((curve.evaluate(x) - expected).abs() < EPS, "{} at {}", curve.name(), x);
            }
        }
    }

    #[test]
    fn test_continuity_at_breakpoint() {
        for curve in [MAIN_CURVE, MIN_CURVE, MAX_CURVE] {
            let b = curve.breakpoint();
            assert!((curve.evaluate(b) - 500.0).abs() < EPS);
            assert!((curve.evaluate(b + 1e-9) - 500.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_reaches_ground_at_span() {
        for curve in [MAIN_CURVE, MIN_CURVE, MAX_CURVE] {
            assert!(curve.evaluate(curve.span()).abs() < EPS);
        }
    }

    #[test]
    fn test_second_segment_lengths() {
        // s - b for each band
        assert!((MAIN_CURVE.span() - MAIN_CURVE.breakpoint() - 249.653).abs() < 1e-9);
        assert!((MIN_CURVE.span() - MIN_CURVE.breakpoint() - 498.576).abs() < 1e-9);
        assert!((MAX_CURVE.span() - MAX_CURVE.breakpoint() - 166.353).abs() < 1e-9);
    }

    #[test]
    fn test_sample_spacing() {
        let band = MAIN_CURVE.sample(DEFAULT_SAMPLE_COUNT);
        assert_eq!(band.len(), 50);
        assert_eq!(band.samples()[0], Sample::new(0.0, 900.0));
        assert_eq!(band.samples()[49].x, 271.066);

        let step = 271.066 / 49.0;
        assert!((band.samples()[1].x - step).abs() < EPS);
    }

    #[test]
    fn test_sample_degenerate_counts() {
        assert!(MAX_CURVE.sample(0).is_empty());
        assert_eq!(MAX_CURVE.sample(1).samples(), &[Sample::new(0.0, 900.0)]);
    }

    #[test]
    fn test_reference_bands_order() {
        let bands = reference_bands(10);
        let names: Vec<_> = bands.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Main Function", "Min Function", "Max Function"]);
        assert!(bands.iter().all(|s| s.len() == 10));
    }
}
