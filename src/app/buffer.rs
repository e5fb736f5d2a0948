use std::collections::BTreeMap;

use crate::constant::{SQL_NO_TOTAL, SQL_NULL_DATA};
use crate::decimal::Decimal;
use crate::guid::Guid;
use crate::type_traits::BindingType;

/// Output buffers bound to result columns, keyed by 1-based column index
pub type ColumnBindingMap<'a> = BTreeMap<u16, ApplicationDataBuffer<'a>>;

/// Outcome of writing a value into an application buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionResult {
    Success,
    /// The value did not fit; the result length reports its full size.
    VarlenDataTruncated,
    /// The buffer cannot hold a value of the bound type.
    Failure,
    /// The bound type cannot represent the source value.
    Unsupported,
}

/// A numeric source value with its native width
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Number {
    /// C-style conversion: floats truncate toward zero and saturate
    pub fn as_i64(self) -> i64 {
        match self {
            Number::I8(v) => i64::from(v),
            Number::I16(v) => i64::from(v),
            Number::I32(v) => i64::from(v),
            Number::I64(v) => v,
            Number::F32(v) => v as i64,
            Number::F64(v) => v as i64,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::F32(v) => f64::from(v),
            Number::F64(v) => v,
            other => other.as_i64() as f64,
        }
    }

    fn native_bytes(self) -> Vec<u8> {
        match self {
            Number::I8(v) => v.to_ne_bytes().to_vec(),
            Number::I16(v) => v.to_ne_bytes().to_vec(),
            Number::I32(v) => v.to_ne_bytes().to_vec(),
            Number::I64(v) => v.to_ne_bytes().to_vec(),
            Number::F32(v) => v.to_ne_bytes().to_vec(),
            Number::F64(v) => v.to_ne_bytes().to_vec(),
        }
    }

    fn parse(text: &str, float: bool) -> Number {
        let text = text.trim();
        if !float && let Ok(v) = text.parse::<i64>() {
            return Number::I64(v);
        }
        Number::F64(text.parse::<f64>().unwrap_or(0.0))
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::I8(v) => write!(f, "{}", v),
            Number::I16(v) => write!(f, "{}", v),
            Number::I32(v) => write!(f, "{}", v),
            Number::I64(v) => write!(f, "{}", v),
            Number::F32(v) => write!(f, "{}", v),
            Number::F64(v) => write!(f, "{}", v),
        }
    }
}

/// One caller-owned slot: a bounds-checked byte view plus a separate
/// result-length cell.
///
/// Fixed-width types are stored in native byte order. Text is stored
/// NUL-terminated; `WChar` text uses UTF-16 code units.
#[derive(Debug)]
pub struct ApplicationDataBuffer<'a> {
    ty: BindingType,
    buffer: Option<&'a mut [u8]>,
    res_len: Option<&'a mut i64>,
}

impl<'a> ApplicationDataBuffer<'a> {
    pub fn new(ty: BindingType, buffer: Option<&'a mut [u8]>, res_len: Option<&'a mut i64>) -> Self {
        Self {
            ty,
            buffer,
            res_len,
        }
    }

    pub fn binding_type(&self) -> BindingType {
        self.ty
    }

    pub fn capacity(&self) -> usize {
        self.buffer.as_deref().map_or(0, <[u8]>::len)
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    pub fn res_len(&self) -> Option<i64> {
        self.res_len.as_deref().copied()
    }

    pub fn is_null(&self) -> bool {
        self.res_len() == Some(SQL_NULL_DATA)
    }

    fn set_res_len(&mut self, len: i64) {
        if let Some(cell) = self.res_len.as_deref_mut() {
            *cell = len;
        }
    }

    // ========================================================================
    // Put
    // ========================================================================

    fn put_fixed(&mut self, bytes: &[u8]) -> ConversionResult {
        self.set_res_len(bytes.len() as i64);
        match self.buffer.as_deref_mut() {
            Some(buf) => match buf.get_mut(..bytes.len()) {
                Some(dst) => {
                    dst.copy_from_slice(bytes);
                    ConversionResult::Success
                }
                None => ConversionResult::Failure,
            },
            None => ConversionResult::Success,
        }
    }

    fn put_raw(&mut self, data: &[u8]) -> ConversionResult {
        self.set_res_len(data.len() as i64);
        let Some(buf) = self.buffer.as_deref_mut() else {
            return ConversionResult::Success;
        };
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        if n < data.len() {
            ConversionResult::VarlenDataTruncated
        } else {
            ConversionResult::Success
        }
    }

    fn put_text(&mut self, text: &str) -> ConversionResult {
        let bytes = text.as_bytes();
        self.set_res_len(bytes.len() as i64);
        let Some(buf) = self.buffer.as_deref_mut() else {
            return ConversionResult::Success;
        };
        if let Some(room) = buf.len().checked_sub(1) {
            let n = bytes.len().min(room);
            buf[..n].copy_from_slice(&bytes[..n]);
            buf[n] = 0;
        }
        if bytes.len() < buf.len() {
            ConversionResult::Success
        } else {
            ConversionResult::VarlenDataTruncated
        }
    }

    fn put_wide_text(&mut self, text: &str) -> ConversionResult {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.set_res_len((units.len() * 2) as i64);
        let Some(buf) = self.buffer.as_deref_mut() else {
            return ConversionResult::Success;
        };
        let unit_capacity = buf.len() / 2;
        if let Some(room) = unit_capacity.checked_sub(1) {
            let n = units.len().min(room);
            for (i, unit) in units.iter().take(n).chain(std::iter::once(&0u16)).enumerate() {
                buf[i * 2..i * 2 + 2].copy_from_slice(&unit.to_ne_bytes());
            }
        }
        if units.len() < unit_capacity {
            ConversionResult::Success
        } else {
            ConversionResult::VarlenDataTruncated
        }
    }

    fn put_unsupported(&mut self) -> ConversionResult {
        self.set_res_len(SQL_NO_TOTAL);
        ConversionResult::Unsupported
    }

    /// Write a numeric value, converting to the bound type
    pub fn put_num(&mut self, value: Number) -> ConversionResult {
        match self.ty {
            BindingType::SignedTinyInt => self.put_fixed(&(value.as_i64() as i8).to_ne_bytes()),
            BindingType::Bit => self.put_fixed(&[u8::from(value.as_i64() != 0)]),
            BindingType::UnsignedTinyInt => self.put_fixed(&(value.as_i64() as u8).to_ne_bytes()),
            BindingType::SignedShort => self.put_fixed(&(value.as_i64() as i16).to_ne_bytes()),
            BindingType::UnsignedShort => self.put_fixed(&(value.as_i64() as u16).to_ne_bytes()),
            BindingType::SignedLong => self.put_fixed(&(value.as_i64() as i32).to_ne_bytes()),
            BindingType::UnsignedLong => self.put_fixed(&(value.as_i64() as u32).to_ne_bytes()),
            BindingType::SignedBigInt => self.put_fixed(&value.as_i64().to_ne_bytes()),
            BindingType::UnsignedBigInt => self.put_fixed(&(value.as_i64() as u64).to_ne_bytes()),
            BindingType::Float => self.put_fixed(&(value.as_f64() as f32).to_ne_bytes()),
            BindingType::Double => self.put_fixed(&value.as_f64().to_ne_bytes()),
            BindingType::Char => self.put_text(&value.to_string()),
            BindingType::WChar => self.put_wide_text(&value.to_string()),
            BindingType::Binary | BindingType::Default => self.put_raw(&value.native_bytes()),
            BindingType::Numeric => match value {
                Number::F32(_) | Number::F64(_) => self.put_unsupported(),
                int => self.put_decimal(&Decimal::from_i64(int.as_i64(), 0)),
            },
            BindingType::TDate
            | BindingType::TTime
            | BindingType::TTimestamp
            | BindingType::Guid
            | BindingType::Unsupported => self.put_unsupported(),
        }
    }

    pub fn put_i8(&mut self, value: i8) -> ConversionResult {
        self.put_num(Number::I8(value))
    }

    pub fn put_i16(&mut self, value: i16) -> ConversionResult {
        self.put_num(Number::I16(value))
    }

    pub fn put_i32(&mut self, value: i32) -> ConversionResult {
        self.put_num(Number::I32(value))
    }

    pub fn put_i64(&mut self, value: i64) -> ConversionResult {
        self.put_num(Number::I64(value))
    }

    pub fn put_f32(&mut self, value: f32) -> ConversionResult {
        self.put_num(Number::F32(value))
    }

    pub fn put_f64(&mut self, value: f64) -> ConversionResult {
        self.put_num(Number::F64(value))
    }

    pub fn put_string(&mut self, value: &str) -> ConversionResult {
        match self.ty {
            BindingType::Char => self.put_text(value),
            BindingType::WChar => self.put_wide_text(value),
            BindingType::Binary | BindingType::Default => self.put_raw(value.as_bytes()),
            BindingType::Float | BindingType::Double => self.put_num(Number::parse(value, true)),
            BindingType::SignedTinyInt
            | BindingType::UnsignedTinyInt
            | BindingType::SignedShort
            | BindingType::UnsignedShort
            | BindingType::SignedLong
            | BindingType::UnsignedLong
            | BindingType::SignedBigInt
            | BindingType::UnsignedBigInt
            | BindingType::Bit
            | BindingType::Numeric => self.put_num(Number::parse(value, false)),
            BindingType::Guid => match Guid::parse(value) {
                Some(guid) => self.put_guid(&guid),
                None => ConversionResult::Failure,
            },
            BindingType::TDate
            | BindingType::TTime
            | BindingType::TTimestamp
            | BindingType::Unsupported => self.put_unsupported(),
        }
    }

    pub fn put_guid(&mut self, value: &Guid) -> ConversionResult {
        match self.ty {
            BindingType::Char => self.put_text(&value.to_string()),
            BindingType::WChar => self.put_wide_text(&value.to_string()),
            BindingType::Guid => {
                // SQLGUID: Data1 u32, Data2 u16, Data3 u16, Data4 [u8; 8]
                let most = value.most_significant_bits() as u64;
                let mut bytes = Vec::with_capacity(16);
                bytes.extend_from_slice(&((most >> 32) as u32).to_ne_bytes());
                bytes.extend_from_slice(&((most >> 16) as u16).to_ne_bytes());
                bytes.extend_from_slice(&(most as u16).to_ne_bytes());
                bytes.extend_from_slice(&value.least_significant_bits().to_be_bytes());
                self.put_fixed(&bytes)
            }
            BindingType::Binary | BindingType::Default => self.put_raw(&value.to_bytes()),
            _ => self.put_unsupported(),
        }
    }

    pub fn put_binary(&mut self, data: &[u8]) -> ConversionResult {
        match self.ty {
            BindingType::Binary | BindingType::Default => self.put_raw(data),
            BindingType::Char => self.put_text(&to_hex(data)),
            BindingType::WChar => self.put_wide_text(&to_hex(data)),
            _ => self.put_unsupported(),
        }
    }

    pub fn put_decimal(&mut self, value: &Decimal) -> ConversionResult {
        match self.ty {
            BindingType::Char => self.put_text(&value.to_string()),
            BindingType::WChar => self.put_wide_text(&value.to_string()),
            BindingType::Numeric => match numeric_struct(value) {
                Some(bytes) => self.put_fixed(&bytes),
                None => ConversionResult::Failure,
            },
            BindingType::SignedTinyInt
            | BindingType::UnsignedTinyInt
            | BindingType::SignedShort
            | BindingType::UnsignedShort
            | BindingType::SignedLong
            | BindingType::UnsignedLong
            | BindingType::SignedBigInt
            | BindingType::UnsignedBigInt
            | BindingType::Bit
            | BindingType::Float
            | BindingType::Double => self.put_num(Number::F64(value.to_f64())),
            _ => self.put_unsupported(),
        }
    }

    /// Zero the destination and report NULL
    pub fn put_null(&mut self) -> ConversionResult {
        if let Some(buf) = self.buffer.as_deref_mut() {
            buf.fill(0);
        }
        self.set_res_len(SQL_NULL_DATA);
        ConversionResult::Success
    }

    // ========================================================================
    // Get
    // ========================================================================

    /// Bytes holding the value: bounded by the result length when it is a
    /// length, otherwise by the first NUL for text types.
    fn value_bytes(&self) -> &[u8] {
        let buf = self.buffer.as_deref().unwrap_or_default();
        let buf = match self.res_len() {
            Some(len) if len >= 0 => &buf[..(len as usize).min(buf.len())],
            _ => buf,
        };
        match self.ty {
            BindingType::Char => {
                let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
                &buf[..end]
            }
            BindingType::WChar => {
                let end = buf
                    .chunks_exact(2)
                    .position(|unit| unit == [0, 0])
                    .map_or(buf.len() - buf.len() % 2, |units| units * 2);
                &buf[..end]
            }
            _ => buf,
        }
    }

    fn fixed<const N: usize>(&self) -> Option<[u8; N]> {
        self.buffer.as_deref()?.get(..N)?.try_into().ok()
    }

    /// Text rendering of the bound value, at most `max_len` bytes
    pub fn get_string(&self, max_len: usize) -> String {
        let mut text = match self.ty {
            BindingType::Char => {
                let bytes = self.value_bytes();
                match simdutf8::basic::from_utf8(bytes) {
                    Ok(s) => s.to_owned(),
                    Err(_) => String::from_utf8_lossy(bytes).into_owned(),
                }
            }
            BindingType::WChar => {
                let units: Vec<u16> = self
                    .value_bytes()
                    .chunks_exact(2)
                    .map(|unit| u16::from_ne_bytes([unit[0], unit[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            BindingType::Guid => self.get_guid().map(|g| g.to_string()).unwrap_or_default(),
            BindingType::Binary | BindingType::Default => {
                String::from_utf8_lossy(self.value_bytes()).into_owned()
            }
            _ => self.get_number().map(|n| n.to_string()).unwrap_or_default(),
        };
        if text.len() > max_len {
            let mut end = max_len;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        text
    }

    /// Numeric value of the bound buffer; text is parsed
    pub fn get_number(&self) -> Option<Number> {
        let value = match self.ty {
            BindingType::SignedTinyInt | BindingType::Bit => {
                Number::I8(i8::from_ne_bytes(self.fixed()?))
            }
            BindingType::UnsignedTinyInt => Number::I16(i16::from(u8::from_ne_bytes(self.fixed()?))),
            BindingType::SignedShort => Number::I16(i16::from_ne_bytes(self.fixed()?)),
            BindingType::UnsignedShort => Number::I32(i32::from(u16::from_ne_bytes(self.fixed()?))),
            BindingType::SignedLong => Number::I32(i32::from_ne_bytes(self.fixed()?)),
            BindingType::UnsignedLong => Number::I64(i64::from(u32::from_ne_bytes(self.fixed()?))),
            BindingType::SignedBigInt => Number::I64(i64::from_ne_bytes(self.fixed()?)),
            BindingType::UnsignedBigInt => Number::I64(u64::from_ne_bytes(self.fixed()?) as i64),
            BindingType::Float => Number::F32(f32::from_ne_bytes(self.fixed()?)),
            BindingType::Double => Number::F64(f64::from_ne_bytes(self.fixed()?)),
            BindingType::Char | BindingType::WChar => {
                let text = self.get_string(usize::MAX);
                let float = text.contains(['.', 'e', 'E']);
                Number::parse(&text, float)
            }
            _ => return None,
        };
        Some(value)
    }

    pub fn get_i8(&self) -> i8 {
        self.get_i64() as i8
    }

    pub fn get_i16(&self) -> i16 {
        self.get_i64() as i16
    }

    pub fn get_i32(&self) -> i32 {
        self.get_i64() as i32
    }

    pub fn get_i64(&self) -> i64 {
        self.get_number().map_or(0, Number::as_i64)
    }

    pub fn get_f32(&self) -> f32 {
        self.get_f64() as f32
    }

    pub fn get_f64(&self) -> f64 {
        self.get_number().map_or(0.0, Number::as_f64)
    }

    pub fn get_guid(&self) -> Option<Guid> {
        match self.ty {
            BindingType::Guid => {
                let bytes: [u8; 16] = self.fixed()?;
                let data1 = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                let data2 = u16::from_ne_bytes([bytes[4], bytes[5]]);
                let data3 = u16::from_ne_bytes([bytes[6], bytes[7]]);
                let most = (u64::from(data1) << 32) | (u64::from(data2) << 16) | u64::from(data3);
                let mut least = [0u8; 8];
                least.copy_from_slice(&bytes[8..]);
                Some(Guid::new(most as i64, i64::from_be_bytes(least)))
            }
            BindingType::Binary | BindingType::Default => {
                let bytes: [u8; 16] = self.value_bytes().try_into().ok()?;
                Some(Guid::from_bytes(bytes))
            }
            BindingType::Char | BindingType::WChar => Guid::parse(&self.get_string(usize::MAX)),
            _ => None,
        }
    }

    pub fn get_bytes(&self) -> Vec<u8> {
        match self.ty {
            BindingType::Char | BindingType::WChar => self.get_string(usize::MAX).into_bytes(),
            _ => self.value_bytes().to_vec(),
        }
    }
}

fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect()
}

/// `SQL_NUMERIC_STRUCT`: precision, scale, sign (1 positive), 16-byte
/// little-endian absolute value
fn numeric_struct(value: &Decimal) -> Option<[u8; 19]> {
    let scale = i8::try_from(value.scale()).ok()?;
    let negative = value.is_negative();
    let mut abs = value.magnitude().to_vec();
    if negative {
        let mut carry = true;
        for byte in abs.iter_mut().rev() {
            let (v, overflow) = (!*byte).overflowing_add(u8::from(carry));
            *byte = v;
            carry = carry && overflow;
        }
    }
    let significant: Vec<u8> = abs.iter().copied().skip_while(|b| *b == 0).collect();
    if significant.len() > 16 {
        return None;
    }

    let digits = Decimal::new(&abs, 0).to_string();
    let digits = digits.trim_start_matches('-');
    let mut out = [0u8; 19];
    out[0] = u8::try_from(digits.len()).ok()?;
    out[1] = scale as u8;
    out[2] = u8::from(!negative);
    for (i, byte) in significant.iter().rev().enumerate() {
        out[3 + i] = *byte;
    }
    Some(out)
}
