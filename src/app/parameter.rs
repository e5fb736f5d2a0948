use std::collections::BTreeMap;

use crate::app::buffer::ApplicationDataBuffer;
use crate::constant::SqlType;
use crate::error::{Error, Result};
use crate::protocol::binary::WireValue;

/// Parameters bound to a statement, keyed by 1-based index
pub type ParameterBindingMap<'a> = BTreeMap<u16, Parameter<'a>>;

/// A caller-owned input buffer plus the SQL type it is sent as
#[derive(Debug)]
pub struct Parameter<'a> {
    buffer: ApplicationDataBuffer<'a>,
    sql_type: SqlType,
}

impl<'a> Parameter<'a> {
    pub fn new(buffer: ApplicationDataBuffer<'a>, sql_type: SqlType) -> Self {
        Self { buffer, sql_type }
    }

    pub fn buffer(&self) -> &ApplicationDataBuffer<'a> {
        &self.buffer
    }

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    /// Read the buffer back and encode it as the wire type matching `sql_type`
    pub fn to_wire_value(&self) -> Result<WireValue> {
        if self.buffer.is_null() {
            return Ok(WireValue::Null);
        }
        let value = match self.sql_type {
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar => {
                WireValue::String(self.buffer.get_string(usize::MAX))
            }
            SqlType::TinyInt => WireValue::Byte(self.buffer.get_i8()),
            SqlType::SmallInt => WireValue::Short(self.buffer.get_i16()),
            SqlType::Integer => WireValue::Int(self.buffer.get_i32()),
            SqlType::BigInt => WireValue::Long(self.buffer.get_i64()),
            SqlType::Float => WireValue::Float(self.buffer.get_f32()),
            SqlType::Double => WireValue::Double(self.buffer.get_f64()),
            SqlType::Bit => WireValue::Bool(self.buffer.get_i8() != 0),
            SqlType::Binary | SqlType::VarBinary | SqlType::LongVarBinary => {
                WireValue::ByteArray(self.buffer.get_bytes())
            }
            SqlType::Guid => match self.buffer.get_guid() {
                Some(guid) => WireValue::Uuid(guid),
                None => {
                    return Err(Error::UnsupportedConversion(format!(
                        "{:?} buffer does not hold a GUID",
                        self.buffer.binding_type()
                    )));
                }
            },
            other => {
                return Err(Error::NotImplemented(format!(
                    "parameters of SQL type {other:?}"
                )));
            }
        };
        Ok(value)
    }
}

/// Encode bound parameters in index order. Indices must run 1..=n without gaps.
pub fn collect_arguments(params: &ParameterBindingMap<'_>) -> Result<Vec<WireValue>> {
    let mut args = Vec::with_capacity(params.len());
    for (expected, (idx, param)) in (1u16..).zip(params) {
        if *idx != expected {
            return Err(Error::UnboundParameter(expected));
        }
        args.push(param.to_wire_value()?);
    }
    Ok(args)
}
