use std::fmt;

/// Arbitrary-precision signed decimal
///
/// The value is `magnitude × 10^(-scale)` where `magnitude` is a big-endian
/// two's-complement integer of any length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decimal {
    scale: i32,
    magnitude: Vec<u8>,
}

impl Decimal {
    pub fn new(magnitude: &[u8], scale: i32) -> Self {
        Self {
            scale,
            magnitude: magnitude.to_vec(),
        }
    }

    pub fn from_i64(value: i64, scale: i32) -> Self {
        Self {
            scale,
            magnitude: minimal_twos_complement(&value.to_be_bytes()),
        }
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn magnitude(&self) -> &[u8] {
        &self.magnitude
    }

    pub fn is_negative(&self) -> bool {
        self.magnitude.first().is_some_and(|b| b & 0x80 != 0)
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.iter().all(|b| *b == 0)
    }

    /// Nearest `f64`; precision beyond 17 significant digits is lost
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(0.0)
    }

    /// Decimal digits of the absolute unscaled value, most significant first
    fn unscaled_digits(&self) -> Vec<u8> {
        let mut num = self.magnitude.clone();
        if self.is_negative() {
            negate_in_place(&mut num);
        }

        let mut digits = Vec::new();
        while num.iter().any(|b| *b != 0) {
            let mut rem = 0u32;
            for byte in num.iter_mut() {
                let cur = (rem << 8) | u32::from(*byte);
                *byte = (cur / 10) as u8;
                rem = cur % 10;
            }
            digits.push(b'0' + rem as u8);
        }
        if digits.is_empty() {
            digits.push(b'0');
        }
        digits.reverse();
        digits
    }
}

/// Two's-complement negation of a big-endian integer
fn negate_in_place(bytes: &mut [u8]) {
    let mut carry = true;
    for byte in bytes.iter_mut().rev() {
        let (value, overflow) = (!*byte).overflowing_add(u8::from(carry));
        *byte = value;
        carry = carry && overflow;
    }
}

/// Drop redundant sign-extension bytes
fn minimal_twos_complement(bytes: &[u8]) -> Vec<u8> {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let (cur, next) = (bytes[start], bytes[start + 1]);
        let redundant = (cur == 0x00 && next & 0x80 == 0) || (cur == 0xFF && next & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut digits = self.unscaled_digits();
        if self.is_negative() && !self.is_zero() {
            f.write_str("-")?;
        }

        match usize::try_from(self.scale) {
            Ok(0) => {}
            Ok(scale) => {
                if digits.len() <= scale {
                    let mut padded = vec![b'0'; scale + 1 - digits.len()];
                    padded.extend_from_slice(&digits);
                    digits = padded;
                }
                let point = digits.len() - scale;
                digits.insert(point, b'.');
            }
            Err(_) => {
                let zeros = self.scale.unsigned_abs() as usize;
                digits.extend(std::iter::repeat_n(b'0', zeros));
            }
        }

        f.write_str(&String::from_utf8_lossy(&digits))
    }
}

#[cfg(feature = "with-rust-decimal")]
impl TryFrom<&Decimal> for rust_decimal::Decimal {
    type Error = crate::error::Error;

    fn try_from(value: &Decimal) -> Result<Self, Self::Error> {
        use crate::error::Error;

        let out_of_range = || Error::UnsupportedConversion(format!("decimal {} is out of range", value));
        if value.magnitude.len() > 16 {
            return Err(out_of_range());
        }
        let fill = if value.is_negative() { 0xFF } else { 0x00 };
        let mut bytes = [fill; 16];
        bytes[16 - value.magnitude.len()..].copy_from_slice(&value.magnitude);
        let mut mantissa = i128::from_be_bytes(bytes);

        let scale = if value.scale < 0 {
            for _ in 0..value.scale.unsigned_abs() {
                mantissa = mantissa.checked_mul(10).ok_or_else(out_of_range)?;
            }
            0
        } else {
            value.scale.unsigned_abs()
        };
        rust_decimal::Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| out_of_range())
    }
}

#[cfg(feature = "with-rust-decimal")]
impl From<rust_decimal::Decimal> for Decimal {
    fn from(value: rust_decimal::Decimal) -> Self {
        Self {
            scale: value.scale() as i32,
            magnitude: minimal_twos_complement(&value.mantissa().to_be_bytes()),
        }
    }
}
