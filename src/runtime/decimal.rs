/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Decimal arithmetic helpers.
//!
//! Results are rounded to [`PRECISION`] significant digits. Conversion to and
//! from `f64` goes through the shortest decimal text of the float, so `0.1`
//! becomes exactly `0.1` and not its binary expansion.

use bigdecimal::BigDecimal;
use num_traits::{ToPrimitive, Zero};
use std::str::FromStr;

use super::RuntimeError;

/// Significant digits kept by every operation.
pub const PRECISION: u64 = 20;

/// Extra digits carried through repeated multiplication.
const GUARD_DIGITS: u64 = 10;

pub fn parse(text: &str) -> Result<BigDecimal, RuntimeError> {
    BigDecimal::from_str(text).map_err(|_| RuntimeError::InvalidNumber {
        text: text.to_string(),
    })
}

pub fn from_f64(value: f64) -> Result<BigDecimal, RuntimeError> {
    if !value.is_finite() {
        return Err(RuntimeError::NonFinite {
            value: value.to_string(),
        });
    }
    parse(&value.to_string())
}

pub fn to_f64(value: &BigDecimal) -> Result<f64, RuntimeError> {
    value
        .to_f64()
        .filter(|float| float.is_finite())
        .ok_or_else(|| RuntimeError::NonFinite {
            value: value.to_string(),
        })
}

pub fn round(value: &BigDecimal) -> BigDecimal {
    value.with_prec(PRECISION)
}

pub fn is_integer(value: &BigDecimal) -> bool {
    value.with_scale(0) == *value
}

pub fn add(lhs: &BigDecimal, rhs: &BigDecimal) -> BigDecimal {
    round(&(lhs + rhs))
}

pub fn sub(lhs: &BigDecimal, rhs: &BigDecimal) -> BigDecimal {
    round(&(lhs - rhs))
}

pub fn mul(lhs: &BigDecimal, rhs: &BigDecimal) -> BigDecimal {
    round(&(lhs * rhs))
}

pub fn div(lhs: &BigDecimal, rhs: &BigDecimal) -> Result<BigDecimal, RuntimeError> {
    if rhs.is_zero() {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(round(&(lhs / rhs)))
}

/// Remainder of truncating division; the result has the sign of `lhs`.
pub fn rem(lhs: &BigDecimal, rhs: &BigDecimal) -> Result<BigDecimal, RuntimeError> {
    if rhs.is_zero() {
        return Err(RuntimeError::DivisionByZero);
    }
    let quotient = (lhs / rhs).with_scale(0);
    Ok(round(&(lhs - rhs * quotient)))
}

/// `base ^ exponent`. Integer exponents are computed exactly by repeated
/// squaring; other exponents go through `f64::powf`.
pub fn pow(base: &BigDecimal, exponent: &BigDecimal) -> Result<BigDecimal, RuntimeError> {
    if let Some(power) = is_integer(exponent).then(|| exponent.to_i64()).flatten() {
        let mut result = BigDecimal::from(1);
        let mut square = base.clone();
        let mut remaining = power.unsigned_abs();
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = (&result * &square).with_prec(PRECISION + GUARD_DIGITS);
            }
            square = (&square * &square).with_prec(PRECISION + GUARD_DIGITS);
            remaining >>= 1;
        }
        return if power < 0 {
            div(&BigDecimal::from(1), &result)
        } else {
            Ok(round(&result))
        };
    }
    let float = to_f64(base)?.powf(to_f64(exponent)?);
    if float.is_nan() {
        return Err(RuntimeError::Domain {
            func: "^",
            value: base.to_string(),
        });
    }
    from_f64(float)
}

pub fn sqrt(value: &BigDecimal) -> Result<BigDecimal, RuntimeError> {
    value
        .sqrt()
        .map(|root| round(&root))
        .ok_or_else(|| RuntimeError::Domain {
            func: "sqrt",
            value: value.to_string(),
        })
}

pub fn exp(value: &BigDecimal) -> BigDecimal {
    round(&value.exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> BigDecimal {
        parse(text).expect("literal")
    }

    #[test]
    fn decimal_sums_do_not_drift() {
        let sum = add(&from_f64(0.1).expect("finite"), &from_f64(0.2).expect("finite"));
        assert_eq!(sum, dec("0.3"));
        assert_eq!(to_f64(&sum).expect("finite"), 0.3);
    }

    #[test]
    fn rem_truncates_toward_zero() {
        assert_eq!(rem(&dec("7"), &dec("3")).expect("rem"), dec("1"));
        assert_eq!(rem(&dec("-7"), &dec("3")).expect("rem"), dec("-1"));
        assert_eq!(rem(&dec("7.5"), &dec("2")).expect("rem"), dec("1.5"));
        assert_eq!(rem(&dec("1"), &dec("0")), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn integer_powers_are_exact() {
        assert_eq!(pow(&dec("2"), &dec("10")).expect("pow"), dec("1024"));
        assert_eq!(pow(&dec("10"), &dec("-2")).expect("pow"), dec("0.01"));
        assert_eq!(pow(&dec("1.5"), &dec("2")).expect("pow"), dec("2.25"));
        assert_eq!(pow(&dec("0"), &dec("-1")), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn sqrt_of_negative_is_a_domain_error() {
        assert_eq!(sqrt(&dec("4")).expect("sqrt"), dec("2"));
        assert!(matches!(
            sqrt(&dec("-1")),
            Err(RuntimeError::Domain { func: "sqrt", .. })
        ));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert!(matches!(
            from_f64(f64::NAN),
            Err(RuntimeError::NonFinite { .. })
        ));
    }
}
