use std::borrow::Cow;

use crate::entity::{Cartesian3, JulianDate, Quaternion};

/// Values that can be blended between two samples.
pub trait Interpolate: Clone {
    /// Blend from `a` to `b` by `t` in `[0, 1]`.
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self;
}

impl Interpolate for Cartesian3 {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }
}

impl Interpolate for Quaternion {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        a.slerp(*b, t)
    }
}

/// A value at a specific time.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    /// When the value applies.
    pub time: JulianDate,
    /// The sampled value.
    pub value: T,
}

impl<T> Sample<T> {
    /// Create a sample.
    pub fn new(time: JulianDate, value: T) -> Self {
        Self { time, value }
    }
}

/// A time-varying value.
///
/// Sampled properties are undefined before the first and after the last sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Property<T> {
    /// The same value at every time.
    Constant(T),
    /// Samples interpolated in between. [`Property::sampled`] sorts them.
    Sampled(Vec<Sample<T>>),
}

impl<T: Interpolate> Property<T> {
    /// Build a sampled property. Samples are sorted by time.
    pub fn sampled(mut samples: Vec<Sample<T>>) -> Self {
        samples.sort_by_key(|s| s.time);
        Self::Sampled(samples)
    }

    /// Evaluate the property at `time`.
    pub fn value_at(&self, time: JulianDate) -> Option<T> {
        let samples = match self {
            Self::Constant(value) => return Some(value.clone()),
            Self::Sampled(samples) => in_time_order(samples),
        };
        let first = samples.first()?;
        let last = samples.last()?;
        if time < first.time || time > last.time {
            return None;
        }

        // Index of the first sample strictly after `time`.
        let upper = samples.partition_point(|s| s.time <= time);
        if upper == 0 {
            return Some(first.value.clone());
        }
        let before = &samples[upper - 1];
        if before.time == time || upper == samples.len() {
            return Some(before.value.clone());
        }
        let after = &samples[upper];

        let span = (after.time - before.time).num_milliseconds() as f64;
        let elapsed = (time - before.time).num_milliseconds() as f64;
        let t = if span > 0.0 { elapsed / span } else { 0.0 };
        Some(T::interpolate(&before.value, &after.value, t))
    }

    /// The closed interval over which the property is defined, if bounded.
    pub fn interval(&self) -> Option<(JulianDate, JulianDate)> {
        match self {
            Self::Constant(_) => None,
            Self::Sampled(samples) => {
                let start = samples.iter().map(|s| s.time).min()?;
                let end = samples.iter().map(|s| s.time).max()?;
                Some((start, end))
            }
        }
    }
}

/// `Sampled` can be built directly, so the order is not guaranteed.
fn in_time_order<T: Clone>(samples: &[Sample<T>]) -> Cow<'_, [Sample<T>]> {
    if samples.is_sorted_by_key(|s| s.time) {
        Cow::Borrowed(samples)
    } else {
        let mut sorted = samples.to_vec();
        sorted.sort_by_key(|s| s.time);
        Cow::Owned(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> JulianDate {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn constant_defined_everywhere() {
        let p = Property::Constant(Cartesian3::new(1.0, 2.0, 3.0));
        assert_eq!(p.value_at(t0()), Some(Cartesian3::new(1.0, 2.0, 3.0)));
        assert!(p.interval().is_none());
    }

    #[test]
    fn sampled_interpolates_linearly() {
        let p = Property::sampled(vec![
            Sample::new(t0() + Duration::seconds(10), Cartesian3::new(10.0, 0.0, 0.0)),
            Sample::new(t0(), Cartesian3::ZERO),
        ]);
        let mid = p.value_at(t0() + Duration::seconds(5)).unwrap();
        assert!((mid.x - 5.0).abs() < 1e-9);
        assert_eq!(p.value_at(t0()), Some(Cartesian3::ZERO));
        assert_eq!(
            p.value_at(t0() + Duration::seconds(10)),
            Some(Cartesian3::new(10.0, 0.0, 0.0))
        );
    }

    #[test]
    fn sampled_undefined_outside_interval() {
        let p = Property::sampled(vec![
            Sample::new(t0(), Cartesian3::ZERO),
            Sample::new(t0() + Duration::seconds(1), Cartesian3::ONE),
        ]);
        assert!(p.value_at(t0() - Duration::seconds(1)).is_none());
        assert!(p.value_at(t0() + Duration::seconds(2)).is_none());
        assert_eq!(p.interval(), Some((t0(), t0() + Duration::seconds(1))));
    }

    #[test]
    fn unsorted_variant_still_interpolates() {
        let p = Property::Sampled(vec![
            Sample::new(t0() + Duration::seconds(10), Cartesian3::new(10.0, 0.0, 0.0)),
            Sample::new(t0(), Cartesian3::ZERO),
        ]);
        let mid = p.value_at(t0() + Duration::seconds(5)).unwrap();
        assert!((mid.x - 5.0).abs() < 1e-9);
        assert!(p.value_at(t0() - Duration::seconds(1)).is_none());
        assert_eq!(p.interval(), Some((t0(), t0() + Duration::seconds(10))));
    }

    #[test]
    fn empty_samples_undefined() {
        let p: Property<Cartesian3> = Property::sampled(Vec::new());
        assert!(p.value_at(t0()).is_none());
        assert!(p.interval().is_none());
    }

    #[test]
    fn orientation_slerps() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let p = Property::sampled(vec![
            Sample::new(t0(), a),
            Sample::new(t0() + Duration::seconds(2), b),
        ]);
        let mid = p.value_at(t0() + Duration::seconds(1)).unwrap();
        let expected = Quaternion::from_rotation_z(std::f64::consts::FRAC_PI_4);
        assert!(mid.abs_diff_eq(expected, 1e-9));
    }
}
