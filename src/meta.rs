use crate::constant::{SqlType, WireType};
use crate::error::Result;
use crate::protocol::binary::{BinaryReader, write_string};
use crate::type_traits::*;

/// Column descriptor attribute identifiers (`SQL_DESC_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAttribute {
    Label,
    BaseColumnName,
    Name,
    TableName,
    BaseTableName,
    SchemaName,
    CatalogName,
    LiteralPrefix,
    LiteralSuffix,
    TypeName,
    LocalTypeName,
    FixedPrecScale,
    AutoUniqueValue,
    CaseSensitive,
    ConciseType,
    Type,
    DisplaySize,
    Length,
    OctetLength,
    Nullable,
    NumPrecRadix,
    Precision,
    Scale,
    Searchable,
    Unnamed,
    Unsigned,
    Updatable,
    /// Number of columns in the result set; not a per-column attribute
    Count,
}

impl ColumnAttribute {
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            18 => Some(Self::Label),
            22 => Some(Self::BaseColumnName),
            1011 => Some(Self::Name),
            15 => Some(Self::TableName),
            23 => Some(Self::BaseTableName),
            16 => Some(Self::SchemaName),
            17 => Some(Self::CatalogName),
            27 => Some(Self::LiteralPrefix),
            28 => Some(Self::LiteralSuffix),
            14 => Some(Self::TypeName),
            29 => Some(Self::LocalTypeName),
            9 => Some(Self::FixedPrecScale),
            11 => Some(Self::AutoUniqueValue),
            12 => Some(Self::CaseSensitive),
            2 => Some(Self::ConciseType),
            1002 => Some(Self::Type),
            6 => Some(Self::DisplaySize),
            1003 => Some(Self::Length),
            1013 => Some(Self::OctetLength),
            1008 => Some(Self::Nullable),
            32 => Some(Self::NumPrecRadix),
            1005 => Some(Self::Precision),
            1006 => Some(Self::Scale),
            13 => Some(Self::Searchable),
            1012 => Some(Self::Unnamed),
            8 => Some(Self::Unsigned),
            10 => Some(Self::Updatable),
            1001 => Some(Self::Count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Str(String),
    Num(i64),
}

const SQL_PRED_BASIC: i64 = 2;
const SQL_NAMED: i64 = 0;
const SQL_UNNAMED: i64 = 1;
const SQL_ATTR_READONLY: i64 = 0;

/// Result column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    schema_name: String,
    table_name: String,
    column_name: String,
    type_name: String,
    data_type: u8,
}

impl ColumnMeta {
    pub fn new(schema_name: &str, table_name: &str, column_name: &str, type_name: &str, data_type: u8) -> Self {
        Self {
            schema_name: schema_name.to_string(),
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            type_name: type_name.to_string(),
            data_type,
        }
    }

    /// Descriptor of a locally produced catalog column
    pub(crate) fn catalog_column(column_name: &str, data_type: WireType) -> Self {
        let type_name = sql_type_name(binary_to_sql_type(data_type as u8));
        Self::new("", "", column_name, type_name, data_type as u8)
    }

    /// Decode: schema, table, column and type name strings, then the wire type byte
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let schema_name = reader.read_string()?.unwrap_or_default().to_string();
        let table_name = reader.read_string()?.unwrap_or_default().to_string();
        let column_name = reader.read_string()?.unwrap_or_default().to_string();
        let type_name = reader.read_string()?.unwrap_or_default().to_string();
        let data_type = reader.read_u8()?;
        Ok(Self {
            schema_name,
            table_name,
            column_name,
            type_name,
            data_type,
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string(out, Some(&self.schema_name))?;
        write_string(out, Some(&self.table_name))?;
        write_string(out, Some(&self.column_name))?;
        write_string(out, Some(&self.type_name))?;
        out.push(self.data_type);
        Ok(())
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Wire type tag of the column
    pub fn data_type(&self) -> u8 {
        self.data_type
    }

    pub fn sql_type(&self) -> SqlType {
        binary_to_sql_type(self.data_type)
    }

    pub fn get_attribute(&self, attr: ColumnAttribute) -> Option<AttributeValue> {
        let is_text = matches!(self.sql_type(), SqlType::Varchar | SqlType::Char | SqlType::LongVarchar);
        let value = match attr {
            ColumnAttribute::Label | ColumnAttribute::BaseColumnName | ColumnAttribute::Name => {
                AttributeValue::Str(self.column_name.clone())
            }
            ColumnAttribute::TableName | ColumnAttribute::BaseTableName => {
                AttributeValue::Str(self.table_name.clone())
            }
            ColumnAttribute::SchemaName => AttributeValue::Str(self.schema_name.clone()),
            ColumnAttribute::CatalogName => AttributeValue::Str(String::new()),
            ColumnAttribute::LiteralPrefix | ColumnAttribute::LiteralSuffix => {
                AttributeValue::Str(if is_text { "'".to_string() } else { String::new() })
            }
            ColumnAttribute::TypeName | ColumnAttribute::LocalTypeName => {
                AttributeValue::Str(self.type_name.clone())
            }
            ColumnAttribute::FixedPrecScale | ColumnAttribute::AutoUniqueValue => AttributeValue::Num(0),
            ColumnAttribute::CaseSensitive => AttributeValue::Num(i64::from(is_text)),
            ColumnAttribute::ConciseType | ColumnAttribute::Type => {
                AttributeValue::Num(i64::from(self.sql_type().code()))
            }
            ColumnAttribute::DisplaySize => {
                AttributeValue::Num(i64::from(binary_type_display_size(self.data_type)))
            }
            ColumnAttribute::Length | ColumnAttribute::OctetLength => {
                AttributeValue::Num(i64::from(binary_type_transfer_length(self.data_type)))
            }
            ColumnAttribute::Nullable => AttributeValue::Num(binary_type_nullability(self.data_type)),
            ColumnAttribute::NumPrecRadix => {
                AttributeValue::Num(i64::from(binary_type_num_precision_radix(self.data_type)))
            }
            ColumnAttribute::Precision => {
                AttributeValue::Num(i64::from(binary_type_column_size(self.data_type)))
            }
            ColumnAttribute::Scale => {
                AttributeValue::Num(i64::from(binary_type_decimal_digits(self.data_type)))
            }
            ColumnAttribute::Searchable => AttributeValue::Num(SQL_PRED_BASIC),
            ColumnAttribute::Unnamed => AttributeValue::Num(if self.column_name.is_empty() {
                SQL_UNNAMED
            } else {
                SQL_NAMED
            }),
            ColumnAttribute::Unsigned => AttributeValue::Num(i64::from(binary_type_unsigned(self.data_type))),
            ColumnAttribute::Updatable => AttributeValue::Num(SQL_ATTR_READONLY),
            ColumnAttribute::Count => return None,
        };
        Some(value)
    }
}

/// Table descriptor returned by a table catalog lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    catalog_name: String,
    schema_name: String,
    table_name: String,
    table_type: String,
}

impl TableMeta {
    pub fn new(catalog_name: &str, schema_name: &str, table_name: &str, table_type: &str) -> Self {
        Self {
            catalog_name: catalog_name.to_string(),
            schema_name: schema_name.to_string(),
            table_name: table_name.to_string(),
            table_type: table_type.to_string(),
        }
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let catalog_name = reader.read_string()?.unwrap_or_default().to_string();
        let schema_name = reader.read_string()?.unwrap_or_default().to_string();
        let table_name = reader.read_string()?.unwrap_or_default().to_string();
        let table_type = reader.read_string()?.unwrap_or_default().to_string();
        Ok(Self {
            catalog_name,
            schema_name,
            table_name,
            table_type,
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string(out, Some(&self.catalog_name))?;
        write_string(out, Some(&self.schema_name))?;
        write_string(out, Some(&self.table_name))?;
        write_string(out, Some(&self.table_type))
    }

    pub fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn table_type(&self) -> &str {
        &self.table_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_meta_read_write() {
        let meta = ColumnMeta::new("PUBLIC", "PERSON", "NAME", "java.lang.String", WireType::String as u8);
        let mut out = Vec::new();
        meta.write(&mut out).unwrap();
        let mut reader = BinaryReader::new(&out);
        assert_eq!(ColumnMeta::read(&mut reader).unwrap(), meta);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_column_attributes() {
        let meta = ColumnMeta::new("PUBLIC", "PERSON", "AGE", "java.lang.Integer", WireType::Int as u8);
        assert_eq!(meta.get_attribute(ColumnAttribute::Label), Some(AttributeValue::Str("AGE".to_string())));
        assert_eq!(
            meta.get_attribute(ColumnAttribute::BaseTableName),
            Some(AttributeValue::Str("PERSON".to_string()))
        );
        assert_eq!(meta.get_attribute(ColumnAttribute::ConciseType), Some(AttributeValue::Num(4)));
        assert_eq!(meta.get_attribute(ColumnAttribute::DisplaySize), Some(AttributeValue::Num(11)));
        assert_eq!(meta.get_attribute(ColumnAttribute::Length), Some(AttributeValue::Num(4)));
        assert_eq!(meta.get_attribute(ColumnAttribute::Precision), Some(AttributeValue::Num(10)));
        assert_eq!(meta.get_attribute(ColumnAttribute::Scale), Some(AttributeValue::Num(-1)));
        assert_eq!(meta.get_attribute(ColumnAttribute::Unsigned), Some(AttributeValue::Num(0)));
        assert_eq!(meta.get_attribute(ColumnAttribute::Nullable), Some(AttributeValue::Num(2)));
        assert_eq!(meta.get_attribute(ColumnAttribute::LiteralPrefix), Some(AttributeValue::Str(String::new())));
        assert_eq!(meta.get_attribute(ColumnAttribute::Count), None);
    }

    #[test]
    fn test_text_column_attributes() {
        let meta = ColumnMeta::catalog_column("TABLE_NAME", WireType::String);
        assert_eq!(meta.type_name(), "VARCHAR");
        assert_eq!(meta.get_attribute(ColumnAttribute::LiteralSuffix), Some(AttributeValue::Str("'".to_string())));
        assert_eq!(meta.get_attribute(ColumnAttribute::CaseSensitive), Some(AttributeValue::Num(1)));
        assert_eq!(meta.get_attribute(ColumnAttribute::Scale), Some(AttributeValue::Num(-1)));
    }

    #[test]
    fn test_table_meta_read_write() {
        let meta = TableMeta::new("", "PUBLIC", "PERSON", "TABLE");
        let mut out = Vec::new();
        meta.write(&mut out).unwrap();
        let mut reader = BinaryReader::new(&out);
        assert_eq!(TableMeta::read(&mut reader).unwrap(), meta);
    }

    #[test]
    fn test_attribute_codes() {
        assert_eq!(ColumnAttribute::from_i16(18), Some(ColumnAttribute::Label));
        assert_eq!(ColumnAttribute::from_i16(1001), Some(ColumnAttribute::Count));
        assert_eq!(ColumnAttribute::from_i16(-3), None);
    }
}
