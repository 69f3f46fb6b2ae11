//! Exact base-10 numbers for the storage boundary.
//!
//! A [`Decimal`] is `mantissa * 10^exponent`, always normalized: zero is
//! `{0, 0}` and a non-zero mantissa never ends in a decimal zero. Numbers are
//! parsed from and rendered to text, so a value built from a float carries
//! exactly the digits of the float's shortest textual form.

use std::fmt;
use std::str::FromStr;

use crate::error::{EncodeError, NumberError};
use crate::limits::{
    MAX_DECIMAL_DIGITS, MAX_DECIMAL_MAGNITUDE, MAX_PLAIN_EXPONENT, MIN_DECIMAL_MAGNITUDE,
};

/// Arbitrary-precision decimal (up to 38 significant digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    exponent: i32,
}

impl Decimal {
    /// The normalized zero.
    pub const ZERO: Decimal = Decimal { mantissa: 0, exponent: 0 };

    /// Creates a decimal from mantissa and exponent, normalizing trailing zeros.
    pub fn new(mantissa: i128, exponent: i32) -> Result<Self, NumberError> {
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }
        let mut mantissa = mantissa;
        let mut exponent = exponent as i64;
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exponent += 1;
        }
        Self::checked(mantissa, exponent, || format!("{}E{}", mantissa, exponent))
    }

    /// Builds a decimal from a float via its shortest round-trip text.
    ///
    /// `0.1` becomes exactly `0.1`, not the binary expansion of the nearest
    /// double.
    pub fn from_f64(value: f64) -> Result<Self, EncodeError> {
        if !value.is_finite() {
            return Err(EncodeError::FloatNotFinite { value });
        }
        let text = format!("{:e}", value);
        Ok(text.parse::<Decimal>()?)
    }

    /// Converts to the nearest binary float.
    ///
    /// This loses precision for decimals that have no exact binary form.
    pub fn to_f64(&self) -> f64 {
        // `<int>e<int>` is always a valid float literal, and the standard
        // parser rounds it correctly.
        format!("{}e{}", self.mantissa, self.exponent)
            .parse()
            .unwrap_or(f64::NAN)
    }

    /// Returns the normalized mantissa.
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Returns the normalized exponent.
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Returns true if the value has no fractional part.
    pub fn is_integer(&self) -> bool {
        self.exponent >= 0
    }

    /// Number of significant digits in the mantissa.
    pub fn digits(&self) -> usize {
        digit_count(self.mantissa)
    }

    fn checked(
        mantissa: i128,
        exponent: i64,
        text: impl FnOnce() -> String,
    ) -> Result<Self, NumberError> {
        let digits = digit_count(mantissa);
        if digits > MAX_DECIMAL_DIGITS {
            return Err(NumberError::TooManyDigits {
                digits,
                max: MAX_DECIMAL_DIGITS,
            });
        }
        let magnitude = exponent + digits as i64 - 1;
        if magnitude < MIN_DECIMAL_MAGNITUDE as i64 || magnitude > MAX_DECIMAL_MAGNITUDE as i64 {
            return Err(NumberError::OutOfRange { text: text() });
        }
        // In range: the magnitude bounds keep the exponent well inside i32.
        Ok(Self {
            mantissa,
            exponent: exponent as i32,
        })
    }
}

fn digit_count(mantissa: i128) -> usize {
    mantissa
        .unsigned_abs()
        .checked_ilog10()
        .map_or(1, |d| d as usize + 1)
}

impl FromStr for Decimal {
    type Err = NumberError;

    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.is_empty() {
            return Err(NumberError::Empty);
        }
        let invalid = || NumberError::InvalidSyntax {
            text: text.to_string(),
        };

        let (negative, body) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (coefficient, exp_text) = match body.find(['e', 'E']) {
            Some(i) => (&body[..i], Some(&body[i + 1..])),
            None => (body, None),
        };
        let (int_part, frac_part) = coefficient.split_once('.').unwrap_or((coefficient, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let mut exponent: i64 = match exp_text {
            Some(e) => {
                let unsigned = e.strip_prefix(['+', '-']).unwrap_or(e);
                if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                e.parse().map_err(|_| invalid())?
            }
            None => 0,
        };
        exponent = exponent
            .checked_sub(frac_part.len() as i64)
            .ok_or_else(invalid)?;

        let all_digits = format!("{}{}", int_part, frac_part);
        let significant = all_digits.trim_start_matches('0');
        let trimmed = significant.trim_end_matches('0');
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }
        exponent = exponent
            .checked_add((significant.len() - trimmed.len()) as i64)
            .ok_or_else(invalid)?;

        if trimmed.len() > MAX_DECIMAL_DIGITS {
            return Err(NumberError::TooManyDigits {
                digits: trimmed.len(),
                max: MAX_DECIMAL_DIGITS,
            });
        }
        let magnitude: i128 = trimmed.parse().map_err(|_| invalid())?;
        let mantissa = if negative { -magnitude } else { magnitude };

        Self::checked(mantissa, exponent, || text.to_string())
    }
}

impl fmt::Display for Decimal {
    /// Plain notation when short (`0.1`, `1500`, `-0.0025`), otherwise
    /// `<mantissa>E<exponent>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mantissa == 0 {
            return f.write_str("0");
        }
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let exponent = self.exponent;

        if exponent >= 0 {
            if exponent <= MAX_PLAIN_EXPONENT {
                return write!(f, "{}{}{}", sign, digits, "0".repeat(exponent as usize));
            }
            return write!(f, "{}{}E{}", sign, digits, exponent);
        }

        let frac_len = exponent.unsigned_abs() as usize;
        if frac_len < digits.len() {
            let (int_part, frac_part) = digits.split_at(digits.len() - frac_len);
            write!(f, "{}{}.{}", sign, int_part, frac_part)
        } else if frac_len - digits.len() <= MAX_PLAIN_EXPONENT as usize {
            let zeros = "0".repeat(frac_len - digits.len());
            write!(f, "{}0.{}{}", sign, zeros, digits)
        } else {
            write!(f, "{}{}E{}", sign, digits, exponent)
        }
    }
}
