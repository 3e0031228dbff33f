use crate::PtError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PtError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PtError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, PtError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(PtError::NotPositive { what, value: v })
    }
}

/// Finite bounds with `min < max`.
pub fn ensure_range(min: Real, max: Real, what: &'static str) -> Result<(Real, Real), PtError> {
    ensure_finite(min, what)?;
    ensure_finite(max, what)?;
    if min < max {
        Ok((min, max))
    } else {
        Err(PtError::InvalidRange { what, min, max })
    }
}

/// Clamp `v` into `[min, max]`.
///
/// Callers guarantee `min <= max` (see [`ensure_range`]). NaN passes through.
#[inline]
pub fn clamp(v: Real, min: Real, max: Real) -> Real {
    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clamp_stays_in_bounds(v in -1e6_f64..1e6, lo in -1e3_f64..0.0, span in 1e-3_f64..1e3) {
            let hi = lo + span;
            let c = clamp(v, lo, hi);
            prop_assert!(c >= lo && c <= hi);
        }
    }
}
