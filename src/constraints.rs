//! Joint limits of a planning group

use crate::utils;
use rand::Rng;
use std::ops::RangeInclusive;

/// Lower and upper limits of the joints of one planning group. Unlike the wrap-around
/// limits of revolute-only arms, these limits are plain intervals, as they must also
/// work for prismatic joints (gantry axes, gripper fingers).
#[derive(Clone, Debug, PartialEq)]
pub struct Constraints {
    /// Lower limit per joint
    pub from: Vec<f64>,

    /// Upper limit per joint
    pub to: Vec<f64>,
}

impl Constraints {
    /// Create constraints from lower and upper limits. If some lower limit is above
    /// the upper limit, the two are swapped.
    pub fn new(from: Vec<f64>, to: Vec<f64>) -> Self {
        assert_eq!(from.len(), to.len(), "Lower and upper limits must have the same length");
        let (from, to) = from
            .into_iter()
            .zip(to)
            .map(|(f, t)| if f <= t { (f, t) } else { (t, f) })
            .unzip();
        Constraints { from, to }
    }

    /// Create constraints from ranges where revolute joints are given in degrees.
    /// `revolute` tells which of the joints need conversion.
    pub fn from_degrees(ranges: &[RangeInclusive<f64>], revolute: &[bool]) -> Self {
        let convert = |value: f64, i: usize| {
            if revolute.get(i).copied().unwrap_or(false) {
                value.to_radians()
            } else {
                value
            }
        };
        Self::new(
            ranges.iter().enumerate().map(|(i, r)| convert(*r.start(), i)).collect(),
            ranges.iter().enumerate().map(|(i, r)| convert(*r.end(), i)).collect(),
        )
    }

    /// Number of constrained joints
    pub fn len(&self) -> usize {
        self.from.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }

    /// Checks if all values are within the limits. Values of the wrong
    /// dimension are never compliant.
    pub fn compliant(&self, values: &[f64]) -> bool {
        values.len() == self.from.len()
            && utils::is_valid(values)
            && values
                .iter()
                .zip(self.from.iter().zip(&self.to))
                .all(|(v, (from, to))| *v >= *from && *v <= *to)
    }

    /// Middle of the allowed range of every joint
    pub fn centers(&self) -> Vec<f64> {
        self.from
            .iter()
            .zip(&self.to)
            .map(|(from, to)| (from + to) / 2.0)
            .collect()
    }

    /// Random joint values within the limits. This is the sampler for RRT.
    pub fn random_angles(&self) -> Vec<f64> {
        let mut rng = rand::thread_rng();
        self.from
            .iter()
            .zip(&self.to)
            .map(|(from, to)| {
                if from < to {
                    rng.gen_range(*from..=*to)
                } else {
                    *from
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_compliant() {
        let limits = Constraints::new(vec![0.0, -PI, 0.0], vec![1.0, PI, 0.04]);
        assert!(limits.compliant(&[0.5, 0.0, 0.02]));
        assert!(limits.compliant(&[0.0, PI, 0.04]));
        assert!(!limits.compliant(&[1.1, 0.0, 0.02]));
        assert!(!limits.compliant(&[0.5, 0.0, f64::NAN]));
    }

    #[test]
    fn test_wrong_dimension_not_compliant() {
        let limits = Constraints::new(vec![0.0, 0.0], vec![1.0, 1.0]);
        assert!(!limits.compliant(&[0.5]));
        assert!(!limits.compliant(&[0.5, 0.5, 0.5]));
    }

    #[test]
    fn test_swapped_limits() {
        let limits = Constraints::new(vec![1.0], vec![-1.0]);
        assert_eq!(limits.from, vec![-1.0]);
        assert_eq!(limits.to, vec![1.0]);
    }

    #[test]
    fn test_from_degrees() {
        let limits = Constraints::from_degrees(&[0.0..=1.0, -90.0..=90.0], &[false, true]);
        assert_eq!(limits.to[0], 1.0);
        assert!((limits.to[1] - PI / 2.0).abs() < 1E-12);
    }

    #[test]
    fn test_random_within_limits() {
        let limits = Constraints::new(vec![0.0, -2.0, 0.3], vec![1.0, 2.0, 0.3]);
        for _ in 0..100 {
            let sample = limits.random_angles();
            assert!(limits.compliant(&sample), "{:?} out of limits", sample);
        }
    }
}
