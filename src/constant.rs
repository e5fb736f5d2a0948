/// Binary protocol version carried in every full object header
pub const PROTO_VER: u8 = 1;

/// Rows requested per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: i32 = 1024;

/// Default ODBC listener port of the remote node
pub const DEFAULT_PORT: u16 = 11443;

/// Result-length sentinel: the column value is NULL
pub const SQL_NULL_DATA: i64 = -1;

/// Result-length sentinel: the total length cannot be determined
pub const SQL_NO_TOTAL: i64 = -4;

/// Input-length sentinel: the text buffer is NUL-terminated
pub const SQL_NTS: i64 = -3;

pub const SQL_NULLABLE_UNKNOWN: i64 = 2;

/// Type tag preceding every value of the binary object format
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    Char = 7,
    Bool = 8,
    String = 9,
    Uuid = 10,
    Date = 11,
    ArrayByte = 12,
    ArrayShort = 13,
    ArrayInt = 14,
    ArrayLong = 15,
    ArrayFloat = 16,
    ArrayDouble = 17,
    ArrayChar = 18,
    ArrayBool = 19,
    ArrayString = 20,
    ArrayUuid = 21,
    ArrayDate = 22,
    Array = 23,
    Collection = 24,
    Map = 25,
    MapEntry = 26,
    Binary = 27,
    Enum = 28,
    ArrayEnum = 29,
    Decimal = 30,
    ArrayDecimal = 31,
    Timestamp = 33,
    ArrayTimestamp = 34,
    /// Null marker, no payload follows
    Null = 101,
    Handle = 102,
    /// Full object header; also the tag of user objects
    Full = 103,
}

impl WireType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Byte),
            2 => Some(Self::Short),
            3 => Some(Self::Int),
            4 => Some(Self::Long),
            5 => Some(Self::Float),
            6 => Some(Self::Double),
            7 => Some(Self::Char),
            8 => Some(Self::Bool),
            9 => Some(Self::String),
            10 => Some(Self::Uuid),
            11 => Some(Self::Date),
            12 => Some(Self::ArrayByte),
            13 => Some(Self::ArrayShort),
            14 => Some(Self::ArrayInt),
            15 => Some(Self::ArrayLong),
            16 => Some(Self::ArrayFloat),
            17 => Some(Self::ArrayDouble),
            18 => Some(Self::ArrayChar),
            19 => Some(Self::ArrayBool),
            20 => Some(Self::ArrayString),
            21 => Some(Self::ArrayUuid),
            22 => Some(Self::ArrayDate),
            23 => Some(Self::Array),
            24 => Some(Self::Collection),
            25 => Some(Self::Map),
            26 => Some(Self::MapEntry),
            27 => Some(Self::Binary),
            28 => Some(Self::Enum),
            29 => Some(Self::ArrayEnum),
            30 => Some(Self::Decimal),
            31 => Some(Self::ArrayDecimal),
            33 => Some(Self::Timestamp),
            34 => Some(Self::ArrayTimestamp),
            101 => Some(Self::Null),
            102 => Some(Self::Handle),
            103 => Some(Self::Full),
            _ => None,
        }
    }

    /// Tags whose payload follows the tag directly and never needs a rewind:
    /// the fixed-width primitives and the null marker.
    pub fn is_consumed_on_peek(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Short
                | Self::Char
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::Bool
                | Self::Null
        )
    }
}

/// Request command byte, the first byte of every request payload
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandByte {
    ExecuteSqlQuery = 1,
    FetchSqlQuery = 2,
    CloseSqlQuery = 3,
    GetColumnsMeta = 4,
    GetTablesMeta = 5,
}

impl CommandByte {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::ExecuteSqlQuery),
            2 => Some(Self::FetchSqlQuery),
            3 => Some(Self::CloseSqlQuery),
            4 => Some(Self::GetColumnsMeta),
            5 => Some(Self::GetTablesMeta),
            _ => None,
        }
    }
}

/// Response status byte
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Success = 0,
    Failed = 1,
}

/// External SQL data types (ODBC `SQL_*` codes)
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Char = 1,
    Numeric = 2,
    Decimal = 3,
    Integer = 4,
    SmallInt = 5,
    Float = 6,
    Real = 7,
    Double = 8,
    Varchar = 12,
    TypeDate = 91,
    TypeTime = 92,
    TypeTimestamp = 93,
    LongVarchar = -1,
    Binary = -2,
    VarBinary = -3,
    LongVarBinary = -4,
    BigInt = -5,
    TinyInt = -6,
    Bit = -7,
    WChar = -8,
    WVarchar = -9,
    WLongVarchar = -10,
    Guid = -11,
}

impl SqlType {
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(Self::Char),
            2 => Some(Self::Numeric),
            3 => Some(Self::Decimal),
            4 => Some(Self::Integer),
            5 => Some(Self::SmallInt),
            6 => Some(Self::Float),
            7 => Some(Self::Real),
            8 => Some(Self::Double),
            12 => Some(Self::Varchar),
            91 => Some(Self::TypeDate),
            92 => Some(Self::TypeTime),
            93 => Some(Self::TypeTimestamp),
            -1 => Some(Self::LongVarchar),
            -2 => Some(Self::Binary),
            -3 => Some(Self::VarBinary),
            -4 => Some(Self::LongVarBinary),
            -5 => Some(Self::BigInt),
            -6 => Some(Self::TinyInt),
            -7 => Some(Self::Bit),
            -8 => Some(Self::WChar),
            -9 => Some(Self::WVarchar),
            -10 => Some(Self::WLongVarchar),
            -11 => Some(Self::Guid),
            _ => None,
        }
    }

    pub fn code(self) -> i16 {
        self as i16
    }
}

/// Application binding type codes (ODBC `SQL_C_*`)
pub mod c_type {
    pub const SQL_C_CHAR: i16 = 1;
    pub const SQL_C_WCHAR: i16 = -8;
    pub const SQL_C_SSHORT: i16 = -15;
    pub const SQL_C_USHORT: i16 = -17;
    pub const SQL_C_SLONG: i16 = -16;
    pub const SQL_C_ULONG: i16 = -18;
    pub const SQL_C_FLOAT: i16 = 7;
    pub const SQL_C_DOUBLE: i16 = 8;
    pub const SQL_C_BIT: i16 = -7;
    pub const SQL_C_STINYINT: i16 = -26;
    pub const SQL_C_UTINYINT: i16 = -28;
    pub const SQL_C_SBIGINT: i16 = -25;
    pub const SQL_C_UBIGINT: i16 = -27;
    pub const SQL_C_BINARY: i16 = -2;
    pub const SQL_C_TYPE_DATE: i16 = 91;
    pub const SQL_C_TYPE_TIME: i16 = 92;
    pub const SQL_C_TYPE_TIMESTAMP: i16 = 93;
    pub const SQL_C_NUMERIC: i16 = 2;
    pub const SQL_C_GUID: i16 = -11;
    pub const SQL_C_DEFAULT: i16 = 99;
}

/// Return code of a call-level operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlResult {
    Success,
    SuccessWithInfo,
    NoData,
    Error,
}

impl SqlResult {
    /// The numeric `SQLRETURN` value
    pub fn return_code(self) -> i16 {
        match self {
            SqlResult::Success => 0,
            SqlResult::SuccessWithInfo => 1,
            SqlResult::NoData => 100,
            SqlResult::Error => -1,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, SqlResult::Success | SqlResult::SuccessWithInfo)
    }
}
