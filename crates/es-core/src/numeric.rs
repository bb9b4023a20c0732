use crate::CoreError;

/// Floating point type used throughout the system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Round to the nearest integer, ties toward positive infinity.
///
/// Report figures ("Total Energy,9001,kWh/year") are rounded this way.
pub fn round_half_up(v: Real) -> i64 {
    if v.is_nan() {
        return 0;
    }
    // `v + 0.5` can round up across an integer boundary before the floor.
    let floor = v.floor();
    let rounded = if v - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// Fixed-point formatting with `digits` decimals.
///
/// Exact binary ties round away from zero (`0.125` -> `"0.13"`), unlike
/// `format!("{:.2}")` which rounds them to even.
pub fn to_fixed(v: Real, digits: usize) -> String {
    const EXTRA_DIGITS: usize = 40;

    if !v.is_finite() {
        return format!("{v}");
    }

    let wide = format!("{:.*}", digits + EXTRA_DIGITS, v.abs());
    let (head, tail) = wide.split_at(wide.len() - EXTRA_DIGITS);
    let is_tie = tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0');
    if !is_tie {
        return format!("{:.*}", digits, v);
    }

    let truncated = head.strip_suffix('.').unwrap_or(head);
    let sign = if v.is_sign_negative() { "-" } else { "" };
    format!("{sign}{}", increment_last_digit(truncated))
}

fn increment_last_digit(decimal: &str) -> String {
    let mut bytes = decimal.as_bytes().to_vec();
    let mut carry = true;
    for b in bytes.iter_mut().rev() {
        if !carry {
            break;
        }
        match *b {
            b'.' => continue,
            b'9' => *b = b'0',
            digit => {
                *b = digit + 1;
                carry = false;
            }
        }
    }
    let mut out = String::with_capacity(bytes.len() + 1);
    if carry {
        out.push('1');
    }
    out.push_str(&String::from_utf8_lossy(&bytes));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn round_half_up_matches_report_rounding() {
        assert_eq!(round_half_up(5000.4), 5000);
        assert_eq!(round_half_up(1200.6), 1201);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-0.4), 0);
    }

    #[test]
    fn round_half_up_just_below_a_tie() {
        // Largest double below 0.5; adding 0.5 would round to 1.0.
        assert_eq!(round_half_up(0.49999999999999994), 0);
        assert_eq!(round_half_up(4503599627370497.0), 4503599627370497);
        assert_eq!(round_half_up(-1.5), -1);
    }

    #[test]
    fn to_fixed_plain_values() {
        assert_eq!(to_fixed(45.2, 1), "45.2");
        assert_eq!(to_fixed(3.14159, 2), "3.14");
        assert_eq!(to_fixed(0.0, 3), "0.000");
        assert_eq!(to_fixed(12.0, 0), "12");
    }

    #[test]
    fn to_fixed_ties_round_away_from_zero() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(9.995, 2), format!("{:.2}", 9.995));
        assert_eq!(to_fixed(99.5, 0), "100");
        assert_eq!(to_fixed(-0.125, 2), "-0.13");
    }

    proptest::proptest! {
        #[test]
        fn round_half_up_stays_within_half(v in -1.0e9f64..1.0e9) {
            let r = round_half_up(v) as f64;
            proptest::prop_assert!((r - v).abs() <= 0.5 + 1e-6);
        }

        #[test]
        fn to_fixed_parses_back_close(v in -1.0e6f64..1.0e6, digits in 0usize..5) {
            let parsed: f64 = to_fixed(v, digits).parse().unwrap();
            proptest::prop_assert!((parsed - v).abs() <= 0.5 * 10f64.powi(-(digits as i32)) + 1e-6);
        }
    }
}
