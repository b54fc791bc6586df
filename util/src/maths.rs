//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Wrap an angular difference into the range (-pi, pi].
///
/// Uses the atan2 formulation so that the result is correct for inputs of
/// any magnitude, not just those within one turn of the range.
pub fn wrap_to_pi<T>(angle_rad: T) -> T
where
    T: Float
{
    angle_rad.sin().atan2(angle_rad.cos())
}

/// Unwrap a sequence of angles so that it contains no jump greater than pi.
///
/// Each element after the first is shifted by a multiple of 2*pi such that
/// the difference to its predecessor lies in (-pi, pi]. The first element is
/// never modified, and the direction represented by each angle is preserved.
pub fn unwrap_angles<T>(angles_rad: &[T]) -> Vec<T>
where
    T: Float
{
    let mut unwrapped = Vec::with_capacity(angles_rad.len());

    let mut prev = match angles_rad.first() {
        Some(a) => {
            unwrapped.push(*a);
            *a
        },
        None => return unwrapped
    };

    for a in angles_rad.iter().skip(1) {
        let next = prev + wrap_to_pi(*a - prev);
        unwrapped.push(next);
        prev = next;
    }

    unwrapped
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&0.5f64, &-1.0, &1.0), 0.5);
        assert_eq!(clamp(&7.0f64, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-7.0f64, &-1.0, &1.0), -1.0);
    }

    #[test]
    fn test_wrap_to_pi() {
        assert!((wrap_to_pi(0f64)).abs() < 1e-12);
        assert!((wrap_to_pi(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_to_pi(-0.5 * PI) + 0.5 * PI).abs() < 1e-12);
        // Large multiples of a full turn collapse back into range
        assert!((wrap_to_pi(8.0 * PI + 0.1) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_unwrap_angles() {
        // A sequence crossing the pi/-pi boundary becomes monotonic
        let wrapped = [3.0f64, -3.0, -2.5];
        let unwrapped = unwrap_angles(&wrapped);
        assert!((unwrapped[0] - 3.0).abs() < 1e-12);
        assert!((unwrapped[1] - (2.0 * PI - 3.0)).abs() < 1e-12);

        for pair in unwrapped.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= PI);
        }

        // Unchanged sequences stay unchanged
        let smooth = [0.0f64, 0.1, 0.2];
        assert_eq!(unwrap_angles(&smooth), smooth.to_vec());

        // Empty input is allowed
        assert!(unwrap_angles::<f64>(&[]).is_empty());
    }
}
