//! Travel-time to distance interpolation.
//!
//! Wavefront distance is estimated from the per-region (travel time, distance)
//! samples of a prediction. Queries outside the sampled range extrapolate
//! linearly from the nearest boundary segment and never fail.

/// Knots closer than this on the time axis are treated as the same sample.
const KNOT_EPSILON: f64 = 1e-9;

/// Piecewise-linear interpolant with linear extrapolation on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator {
    /// (x, y) knots, strictly ascending in x
    knots: Vec<(f64, f64)>,
}

impl LinearInterpolator {
    /// Build an interpolant from paired samples.
    ///
    /// Samples are sorted by `xs`; non-finite pairs are dropped and pairs whose
    /// `x` repeats an earlier one are skipped (the first occurrence is kept).
    /// Extra trailing elements of the longer slice are ignored.
    #[must_use]
    pub fn new(xs: &[f64], ys: &[f64]) -> Self {
        let mut pairs: Vec<(f64, f64)> = xs
            .iter()
            .copied()
            .zip(ys.iter().copied())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();

        // Stable sort keeps input order among equal abscissae.
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut knots: Vec<(f64, f64)> = Vec::with_capacity(pairs.len());
        for (x, y) in pairs {
            match knots.last() {
                Some(&(last_x, _)) if x - last_x < KNOT_EPSILON => {}
                _ => knots.push((x, y)),
            }
        }

        Self { knots }
    }

    /// Number of distinct knots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    /// Check if the interpolant has no knots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Evaluate at `x`.
    ///
    /// With no knots the result is `0.0`; with a single knot it is that
    /// knot's value. Finite queries always give finite results.
    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        match self.knots.as_slice() {
            [] => 0.0,
            [(_, y)] => *y,
            knots => {
                // Segment [i-1, i] containing x, or the boundary segment when
                // x lies outside the knots.
                let i = knots
                    .partition_point(|&(kx, _)| kx <= x)
                    .clamp(1, knots.len() - 1);
                let (x0, y0) = knots[i - 1];
                let (x1, y1) = knots[i];
                let slope = (y1 - y0) / (x1 - x0);
                let y = y0 + slope * (x - x0);
                if y.is_finite() || x.is_nan() {
                    y
                } else if y.is_nan() {
                    // Flat segment queried at an overflowing offset.
                    y0
                } else {
                    // Far extrapolation saturates instead of overflowing.
                    y.clamp(-f64::MAX, f64::MAX)
                }
            }
        }
    }
}

/// P- and S-wave distance interpolants for one earthquake.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelDistance {
    p: LinearInterpolator,
    s: LinearInterpolator,
}

impl TravelDistance {
    /// Build both interpolants from parallel distance and travel-time samples.
    #[must_use]
    pub fn new(distances: &[f64], p_times: &[f64], s_times: &[f64]) -> Self {
        Self {
            p: LinearInterpolator::new(p_times, distances),
            s: LinearInterpolator::new(s_times, distances),
        }
    }

    /// Distances (km) travelled by the P and S wavefronts `seconds` after
    /// origin time.
    ///
    /// A wavefront cannot be behind its source, so extrapolated negatives are
    /// clamped to zero.
    #[must_use]
    pub fn distance_at(&self, seconds: f64) -> (f64, f64) {
        (
            self.p.eval(seconds).max(0.0),
            self.s.eval(seconds).max(0.0),
        )
    }

    /// The P-wave interpolant.
    #[must_use]
    pub fn p_wave(&self) -> &LinearInterpolator {
        &self.p
    }

    /// The S-wave interpolant.
    #[must_use]
    pub fn s_wave(&self) -> &LinearInterpolator {
        &self.s
    }
}
