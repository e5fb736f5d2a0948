//! Mapping between the wire type tags, external SQL types and application
//! binding types, plus the per-type display attributes reported in metadata.
//!
//! Every `binary_type_*` function is the SQL-type function applied to
//! [`binary_to_sql_type`].

use crate::constant::c_type::*;
use crate::constant::{SQL_NULLABLE_UNKNOWN, SqlType, WireType};

/// Display size of variable-length data
const DEFAULT_VARDATA_DISPLAY_SIZE: i32 = 1024;

/// Display size of everything else without a fixed width
const DEFAULT_DISPLAY_SIZE: i32 = 34;

/// Native type of an application buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    Char,
    /// UTF-16 code units
    WChar,
    SignedTinyInt,
    UnsignedTinyInt,
    SignedShort,
    UnsignedShort,
    SignedLong,
    UnsignedLong,
    SignedBigInt,
    UnsignedBigInt,
    Float,
    Double,
    Bit,
    Binary,
    TDate,
    TTime,
    TTimestamp,
    Numeric,
    Guid,
    Default,
    Unsupported,
}

/// Application binding type for an `SQL_C_*` code
pub fn to_driver_type(c_type: i16) -> BindingType {
    match c_type {
        SQL_C_CHAR => BindingType::Char,
        SQL_C_WCHAR => BindingType::WChar,
        SQL_C_SSHORT => BindingType::SignedShort,
        SQL_C_USHORT => BindingType::UnsignedShort,
        SQL_C_SLONG => BindingType::SignedLong,
        SQL_C_ULONG => BindingType::UnsignedLong,
        SQL_C_FLOAT => BindingType::Float,
        SQL_C_DOUBLE => BindingType::Double,
        SQL_C_BIT => BindingType::Bit,
        SQL_C_STINYINT => BindingType::SignedTinyInt,
        SQL_C_UTINYINT => BindingType::UnsignedTinyInt,
        SQL_C_SBIGINT => BindingType::SignedBigInt,
        SQL_C_UBIGINT => BindingType::UnsignedBigInt,
        SQL_C_BINARY => BindingType::Binary,
        SQL_C_TYPE_DATE => BindingType::TDate,
        SQL_C_TYPE_TIME => BindingType::TTime,
        SQL_C_TYPE_TIMESTAMP => BindingType::TTimestamp,
        SQL_C_NUMERIC => BindingType::Numeric,
        SQL_C_GUID => BindingType::Guid,
        SQL_C_DEFAULT => BindingType::Default,
        _ => BindingType::Unsupported,
    }
}

pub fn is_application_type_supported(c_type: i16) -> bool {
    to_driver_type(c_type) != BindingType::Unsupported
}

/// SQL types accepted for parameters
pub fn is_sql_type_supported(sql_type: SqlType) -> bool {
    matches!(
        sql_type,
        SqlType::Char
            | SqlType::Varchar
            | SqlType::LongVarchar
            | SqlType::SmallInt
            | SqlType::Integer
            | SqlType::Float
            | SqlType::Double
            | SqlType::Bit
            | SqlType::TinyInt
            | SqlType::BigInt
            | SqlType::Binary
            | SqlType::VarBinary
            | SqlType::LongVarBinary
            | SqlType::Guid
    )
}

/// External SQL type of a wire type tag. Total over every byte value;
/// collections, objects and unknown tags collapse to [`SqlType::Binary`].
pub fn binary_to_sql_type(tag: u8) -> SqlType {
    match WireType::from_u8(tag) {
        Some(WireType::Byte | WireType::Char) => SqlType::TinyInt,
        Some(WireType::Short) => SqlType::SmallInt,
        Some(WireType::Int) => SqlType::Integer,
        Some(WireType::Long) => SqlType::BigInt,
        Some(WireType::Float) => SqlType::Float,
        Some(WireType::Double) => SqlType::Double,
        Some(WireType::Bool) => SqlType::Bit,
        Some(WireType::Decimal) => SqlType::Decimal,
        Some(WireType::String) => SqlType::Varchar,
        Some(WireType::Uuid) => SqlType::Guid,
        Some(WireType::Date) => SqlType::TypeDate,
        Some(WireType::Timestamp) => SqlType::TypeTimestamp,
        _ => SqlType::Binary,
    }
}

pub fn binary_type_nullability(_tag: u8) -> i64 {
    SQL_NULLABLE_UNKNOWN
}

pub fn sql_type_display_size(sql_type: SqlType) -> i32 {
    match sql_type {
        SqlType::Varchar | SqlType::Char | SqlType::WChar | SqlType::Binary => {
            DEFAULT_VARDATA_DISPLAY_SIZE
        }
        SqlType::Bit => 1,
        SqlType::TinyInt => 4,
        SqlType::SmallInt => 6,
        SqlType::Integer => 11,
        SqlType::BigInt => 20,
        SqlType::Real => 14,
        SqlType::Float | SqlType::Double => 24,
        SqlType::TypeDate => 10,
        SqlType::TypeTime => 8,
        SqlType::TypeTimestamp => 19,
        SqlType::Guid => 36,
        _ => DEFAULT_DISPLAY_SIZE,
    }
}

pub fn binary_type_display_size(tag: u8) -> i32 {
    sql_type_display_size(binary_to_sql_type(tag))
}

pub fn sql_type_column_size(sql_type: SqlType) -> i32 {
    match sql_type {
        SqlType::Varchar | SqlType::Char | SqlType::WChar | SqlType::Binary => {
            DEFAULT_VARDATA_DISPLAY_SIZE
        }
        SqlType::Bit => 1,
        SqlType::TinyInt => 3,
        SqlType::SmallInt => 5,
        SqlType::Integer => 10,
        SqlType::BigInt => 19,
        SqlType::Real => 7,
        SqlType::Float | SqlType::Double => 15,
        SqlType::TypeDate => 10,
        SqlType::TypeTime => 8,
        SqlType::TypeTimestamp => 19,
        SqlType::Guid => 36,
        _ => DEFAULT_DISPLAY_SIZE,
    }
}

pub fn binary_type_column_size(tag: u8) -> i32 {
    sql_type_column_size(binary_to_sql_type(tag))
}

/// Bytes transferred for a fixed binding of the type
pub fn sql_type_transfer_length(sql_type: SqlType) -> i32 {
    match sql_type {
        SqlType::Varchar | SqlType::Char | SqlType::WChar | SqlType::Binary => {
            DEFAULT_VARDATA_DISPLAY_SIZE
        }
        SqlType::Bit | SqlType::TinyInt => 1,
        SqlType::SmallInt => 2,
        SqlType::Integer | SqlType::Real | SqlType::Float => 4,
        SqlType::BigInt | SqlType::Double => 8,
        SqlType::TypeDate | SqlType::TypeTime => 6,
        SqlType::TypeTimestamp | SqlType::Guid => 16,
        _ => DEFAULT_DISPLAY_SIZE,
    }
}

pub fn binary_type_transfer_length(tag: u8) -> i32 {
    sql_type_transfer_length(binary_to_sql_type(tag))
}

pub fn sql_type_num_precision_radix(sql_type: SqlType) -> i32 {
    match sql_type {
        SqlType::Real | SqlType::Float | SqlType::Double => 2,
        SqlType::Bit | SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => {
            10
        }
        _ => 0,
    }
}

pub fn binary_type_num_precision_radix(tag: u8) -> i32 {
    sql_type_num_precision_radix(binary_to_sql_type(tag))
}

/// Scale is not tracked; always "not applicable"
pub fn sql_type_decimal_digits(_sql_type: SqlType) -> i32 {
    -1
}

pub fn binary_type_decimal_digits(tag: u8) -> i32 {
    sql_type_decimal_digits(binary_to_sql_type(tag))
}

pub fn sql_type_unsigned(sql_type: SqlType) -> bool {
    !matches!(
        sql_type,
        SqlType::Bit
            | SqlType::TinyInt
            | SqlType::SmallInt
            | SqlType::Integer
            | SqlType::BigInt
            | SqlType::Real
            | SqlType::Float
            | SqlType::Double
    )
}

pub fn binary_type_unsigned(tag: u8) -> bool {
    sql_type_unsigned(binary_to_sql_type(tag))
}

/// Type name reported in catalog result sets
pub fn sql_type_name(sql_type: SqlType) -> &'static str {
    match sql_type {
        SqlType::Char => "CHAR",
        SqlType::Numeric => "NUMERIC",
        SqlType::Decimal => "DECIMAL",
        SqlType::Integer => "INTEGER",
        SqlType::SmallInt => "SMALLINT",
        SqlType::Float => "FLOAT",
        SqlType::Real => "REAL",
        SqlType::Double => "DOUBLE",
        SqlType::Varchar => "VARCHAR",
        SqlType::TypeDate => "DATE",
        SqlType::TypeTime => "TIME",
        SqlType::TypeTimestamp => "TIMESTAMP",
        SqlType::LongVarchar => "LONGVARCHAR",
        SqlType::Binary => "BINARY",
        SqlType::VarBinary => "VARBINARY",
        SqlType::LongVarBinary => "LONGVARBINARY",
        SqlType::BigInt => "BIGINT",
        SqlType::TinyInt => "TINYINT",
        SqlType::Bit => "BIT",
        SqlType::WChar => "WCHAR",
        SqlType::WVarchar => "WVARCHAR",
        SqlType::WLongVarchar => "WLONGVARCHAR",
        SqlType::Guid => "GUID",
    }
}
