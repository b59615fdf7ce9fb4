use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};

/// Exact decimal number: `mantissa * 10^-scale`.
///
/// Equality and ordering are by value, so `1.50` equals `1.5`.
#[derive(Debug, Clone)]
pub struct Numeric {
    mantissa: BigInt,
    scale: u32,
}

impl Numeric {
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            mantissa: mantissa.into(),
            scale,
        }
    }

    /// Exact half-sum. The scale grows by one digit when the sum is odd.
    pub fn midpoint(&self, other: &Self) -> Self {
        let scale = self.scale.max(other.scale);
        let sum = self.rescaled(scale) + other.rescaled(scale);

        let two = BigInt::from(2);
        if (&sum % &two).sign() == Sign::NoSign {
            Self::new(sum / two, scale)
        } else {
            // sum / 2 == sum * 5 / 10
            Self::new(sum * 5, scale + 1)
        }
    }

    fn rescaled(&self, scale: u32) -> BigInt {
        debug_assert!(scale >= self.scale);
        &self.mantissa * BigInt::from(10).pow(scale - self.scale)
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Numeric {}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.mantissa.cmp(&other.mantissa);
        }
        let scale = self.scale.max(other.scale);
        self.rescaled(scale).cmp(&other.rescaled(scale))
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.magnitude().to_string();
        if self.mantissa.sign() == Sign::Minus {
            f.write_str("-")?;
        }

        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }

        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{int}.{frac}")
        } else {
            write!(f, "0.{digits:0>scale$}")
        }
    }
}

impl FromStr for Numeric {
    type Err = InvalidNumeric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
            return Err(InvalidNumeric);
        }

        let digits = format!("{int}{frac}");
        let magnitude = BigInt::from_str(&digits).map_err(|_e| InvalidNumeric)?;
        let scale = u32::try_from(frac.len()).map_err(|_e| InvalidNumeric)?;

        Ok(Self::new(
            if negative { -magnitude } else { magnitude },
            scale,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal number")]
pub struct InvalidNumeric;

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Numeric {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display() {
        for (input, output) in [
            ("12.340", "12.340"),
            ("-0.05", "-0.05"),
            ("+7", "7"),
            (".5", "0.5"),
            ("3.", "3"),
            ("-123456789012345678901234567890.1", "-123456789012345678901234567890.1"),
        ] {
            assert_eq!(num(input).to_string(), output, "input: {input}");
        }

        for input in ["", ".", "-", "1.2.3", "1e5", "abc", "--1"] {
            assert!(input.parse::<Numeric>().is_err(), "input: {input}");
        }
    }

    #[test]
    fn ordering_ignores_scale() {
        assert_eq!(num("1.50"), num("1.5"));
        assert!(num("1.49") < num("1.5"));
        assert!(num("-2") < num("-1.999"));
        assert_eq!(num("0.000").cmp(&num("-0")), Ordering::Equal);
    }

    #[test]
    fn midpoint_is_exact() {
        assert_eq!(num("2").midpoint(&num("5")).to_string(), "3.5");
        assert_eq!(num("2").midpoint(&num("4")).to_string(), "3");
        assert_eq!(num("0.1").midpoint(&num("0.25")).to_string(), "0.175");
        assert_eq!(num("-1").midpoint(&num("0")).to_string(), "-0.5");
        assert_eq!(num("1.01").midpoint(&num("1.02")), num("1.015"));
    }
}
