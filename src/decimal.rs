use crate::error::{Error, ErrorKind};
use dashu::integer::IBig;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number of fractional digits carried through every operation.
pub const SCALE: usize = 10;

/// Largest exponent magnitude `pow` accepts.
pub const MAX_EXPONENT: u32 = 100_000;

lazy_static::lazy_static! {
    static ref SCALE_FACTOR: IBig = IBig::from(10u8).pow(SCALE);
}

/// Fixed-point decimal: the wrapped integer is the value multiplied by `10^SCALE`.
///
/// Every operation truncates toward zero to the working scale, so ordering and
/// equality are exact at that scale.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(IBig);

impl Decimal {
    pub fn zero() -> Self {
        Decimal(IBig::ZERO)
    }

    pub fn one() -> Self {
        Decimal(SCALE_FACTOR.clone())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == IBig::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < IBig::ZERO
    }

    pub fn is_positive(&self) -> bool {
        self.0 > IBig::ZERO
    }

    pub fn add(&self, other: &Decimal) -> Decimal {
        Decimal(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Decimal) -> Decimal {
        Decimal(&self.0 - &other.0)
    }

    pub fn mul(&self, other: &Decimal) -> Decimal {
        Decimal(&self.0 * &other.0 / &*SCALE_FACTOR)
    }

    pub fn div(&self, other: &Decimal) -> Result<Decimal, Error> {
        if other.is_zero() {
            return Err(Error::division_by_zero());
        }
        Ok(Decimal(&self.0 * &*SCALE_FACTOR / &other.0))
    }

    /// Remainder of truncating division; the sign follows the dividend.
    pub fn rem(&self, other: &Decimal) -> Result<Decimal, Error> {
        if other.is_zero() {
            return Err(Error::modulo_by_zero());
        }
        Ok(Decimal(&self.0 % &other.0))
    }

    pub fn pow(&self, exponent: &Decimal) -> Result<Decimal, Error> {
        if &exponent.0 % &*SCALE_FACTOR != IBig::ZERO {
            return Err(Error::new(
                ErrorKind::NonIntegralExponent,
                format!("Exponent {} has a fractional part", exponent.to_trimmed_string()),
            ));
        }
        let magnitude = exponent.abs().0 / &*SCALE_FACTOR;
        let k = u32::try_from(magnitude)
            .ok()
            .filter(|k| *k <= MAX_EXPONENT)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::ExponentTooLarge,
                    format!("Exponent {} is too large", exponent.to_trimmed_string()),
                )
            })? as usize;

        if k == 0 {
            return Ok(Decimal::one());
        }
        let raised = self.0.pow(k);
        if exponent.is_negative() {
            if self.is_zero() {
                return Err(Error::division_by_zero());
            }
            // 1 / (m^k / 10^(S*k)) rescaled to S fractional digits
            let numerator = IBig::from(10u8).pow(SCALE * (k + 1));
            Ok(Decimal(numerator / raised))
        } else {
            let divisor = IBig::from(10u8).pow(SCALE * (k - 1));
            Ok(Decimal(raised / divisor))
        }
    }

    pub fn neg(&self) -> Decimal {
        Decimal(IBig::ZERO - &self.0)
    }

    pub fn abs(&self) -> Decimal {
        if self.is_negative() { self.neg() } else { self.clone() }
    }

    pub fn compare(&self, other: &Decimal) -> Ordering {
        self.cmp(other)
    }

    /// Render without trailing fractional zeros (`14.5000000000` -> `14.5`, `14.0000000000` -> `14`).
    pub fn to_trimmed_string(&self) -> String {
        let full = self.to_string();
        match full.split_once('.') {
            Some((int_part, frac)) => {
                let frac = frac.trim_end_matches('0');
                if frac.is_empty() {
                    int_part.to_string()
                } else {
                    format!("{}.{}", int_part, frac)
                }
            }
            None => full,
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Decimal::zero()
    }
}

impl From<i64> for Decimal {
    fn from(n: i64) -> Self {
        Decimal(IBig::from(n) * &*SCALE_FACTOR)
    }
}

impl FromStr for Decimal {
    type Err = Error;

    /// Parses `[+-]? digits? ('.' digits)?`; fractional digits past the scale are truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::malformed(format!("Invalid number '{}'", s));
        let trimmed = s.trim();
        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let mut digits = String::with_capacity(int_part.len() + SCALE);
        digits.push_str(int_part);
        let kept = &frac_part[..frac_part.len().min(SCALE)];
        digits.push_str(kept);
        digits.extend(std::iter::repeat('0').take(SCALE - kept.len()));

        let magnitude: IBig = digits.parse().map_err(|_| invalid())?;
        Ok(if negative { Decimal(IBig::ZERO - magnitude) } else { Decimal(magnitude) })
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let magnitude = self.abs().0;
        let int_part = &magnitude / &*SCALE_FACTOR;
        let frac_part = &magnitude % &*SCALE_FACTOR;
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}{}.{:0>width$}", sign, int_part, frac_part.to_string(), width = SCALE)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_renders_at_working_scale() {
        assert_eq!(d("12").to_string(), "12.0000000000");
        assert_eq!(d(".5").to_string(), "0.5000000000");
        assert_eq!(d("-3.25").to_string(), "-3.2500000000");
        assert_eq!(d("0.123456789012").to_string(), "0.1234567890");
        assert!("".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!("abc".parse::<Decimal>().is_err());
    }

    #[test]
    fn trimmed_rendering() {
        assert_eq!(d("14").to_trimmed_string(), "14");
        assert_eq!(d("-0.250").to_trimmed_string(), "-0.25");
        assert_eq!(Decimal::zero().to_trimmed_string(), "0");
    }

    #[test]
    fn arithmetic_truncates_toward_zero() {
        assert_eq!(d("1").div(&d("3")).unwrap().to_string(), "0.3333333333");
        assert_eq!(d("-2").div(&d("3")).unwrap().to_string(), "-0.6666666666");
        assert_eq!(d("0.00001").mul(&d("0.00001")), d("0.0000000001"));
        assert_eq!(d("0.00001").mul(&d("0.000001")), Decimal::zero());
        assert_eq!(d("0.1").add(&d("0.2")), d("0.3"));
        assert_eq!(d("7.5").rem(&d("2")).unwrap(), d("1.5"));
        assert_eq!(d("-7").rem(&d("3")).unwrap(), d("-1"));
    }

    #[test]
    fn zero_divisors_fail() {
        assert_eq!(d("1").div(&Decimal::zero()).unwrap_err().kind, ErrorKind::DivisionByZero);
        assert_eq!(d("1").rem(&Decimal::zero()).unwrap_err().kind, ErrorKind::ModuloByZero);
        assert_eq!(Decimal::zero().pow(&d("-1")).unwrap_err().kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn integral_powers() {
        assert_eq!(d("2").pow(&d("10")).unwrap(), d("1024"));
        assert_eq!(d("1.5").pow(&d("2")).unwrap(), d("2.25"));
        assert_eq!(d("2").pow(&d("-2")).unwrap(), d("0.25"));
        assert_eq!(d("3").pow(&d("-1")).unwrap().to_string(), "0.3333333333");
        assert_eq!(d("9").pow(&Decimal::zero()).unwrap(), Decimal::one());
        assert_eq!(d("2").pow(&d("0.5")).unwrap_err().kind, ErrorKind::NonIntegralExponent);
        assert_eq!(d("2").pow(&d("1000001")).unwrap_err().kind, ErrorKind::ExponentTooLarge);
    }

    #[test]
    fn ordering_is_exact() {
        assert!(d("0.0000000002") > d("0.0000000001"));
        assert!(d("-1") < d("0.5"));
        assert_eq!(d("2.50").compare(&d("2.5")), Ordering::Equal);
    }
}
