use crate::app::buffer::{ApplicationDataBuffer, ConversionResult};
use crate::constant::WireType;
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::protocol::binary::BinaryReader;

/// A decoded column value borrowing from the page
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue<'a> {
    Null,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(&'a str),
    Guid(Guid),
    /// A full object, header included
    Object(&'a [u8]),
}

impl ColumnValue<'_> {
    /// Route the value through the buffer's conversions
    pub fn put_into(&self, buffer: &mut ApplicationDataBuffer<'_>) -> ConversionResult {
        match self {
            ColumnValue::Null => buffer.put_null(),
            ColumnValue::Byte(v) => buffer.put_i8(*v),
            ColumnValue::Short(v) => buffer.put_i16(*v),
            ColumnValue::Int(v) => buffer.put_i32(*v),
            ColumnValue::Long(v) => buffer.put_i64(*v),
            ColumnValue::Float(v) => buffer.put_f32(*v),
            ColumnValue::Double(v) => buffer.put_f64(*v),
            ColumnValue::Bool(v) => buffer.put_i8(i8::from(*v)),
            ColumnValue::String(s) => buffer.put_string(s),
            ColumnValue::Guid(g) => buffer.put_guid(g),
            ColumnValue::Object(bytes) => buffer.put_binary(bytes),
        }
    }
}

/// Decode the next value. On error the reader may have moved; callers
/// only commit the position on success.
fn read_value<'a>(reader: &mut BinaryReader<'a>) -> Result<ColumnValue<'a>> {
    let tag = reader.read_column_header()?;
    let value = match WireType::from_u8(tag) {
        Some(WireType::Byte) => ColumnValue::Byte(reader.read_i8()?),
        // CHAR is a 2-byte code unit
        Some(WireType::Short | WireType::Char) => ColumnValue::Short(reader.read_i16()?),
        Some(WireType::Int) => ColumnValue::Int(reader.read_i32()?),
        Some(WireType::Long) => ColumnValue::Long(reader.read_i64()?),
        Some(WireType::Float) => ColumnValue::Float(reader.read_f32()?),
        Some(WireType::Double) => ColumnValue::Double(reader.read_f64()?),
        Some(WireType::Bool) => ColumnValue::Bool(reader.read_bool()?),
        Some(WireType::Null) => ColumnValue::Null,
        Some(WireType::String) => match reader.read_string()? {
            Some(s) => ColumnValue::String(s),
            None => ColumnValue::Null,
        },
        Some(WireType::Uuid) => match reader.read_guid()? {
            Some(g) => ColumnValue::Guid(g),
            None => ColumnValue::Null,
        },
        Some(WireType::Full) => ColumnValue::Object(reader.read_full_object()?),
        _ => return Err(Error::UnsupportedWireType(tag)),
    };
    Ok(value)
}

/// Cursor over the rows of one page
///
/// Each row is `[int32 column count][tagged column values]`. `pos` counts the
/// columns of the current row already consumed; once it reaches `size` the
/// row must be advanced with [`Row::move_to_next`].
#[derive(Debug)]
pub struct Row {
    page: Vec<u8>,
    /// Offset of the next unread byte
    offset: usize,
    row_begin_pos: usize,
    size: i32,
    pos: i32,
}

impl Row {
    /// Position at the first row of `page`. An empty page holds no rows.
    pub fn new(page: Vec<u8>) -> Result<Self> {
        let mut row = Self {
            page,
            offset: 0,
            row_begin_pos: 0,
            size: 0,
            pos: 0,
        };
        if !row.page.is_empty() {
            row.read_row_header()?;
        }
        Ok(row)
    }

    fn read_row_header(&mut self) -> Result<()> {
        let mut reader = BinaryReader::at(&self.page, self.offset);
        let size = reader.read_i32().map_err(|_| Error::InvalidPacket)?;
        if size < 0 {
            return Err(Error::InvalidPacket);
        }
        self.size = size;
        self.pos = 0;
        self.offset = reader.position();
        self.row_begin_pos = self.offset;
        Ok(())
    }

    /// Column count of the current row
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Columns of the current row consumed so far
    pub fn position(&self) -> i32 {
        self.pos
    }

    /// Page offset where the current row's column data starts
    pub fn row_begin_pos(&self) -> usize {
        self.row_begin_pos
    }

    /// Page offset of the next unread byte
    pub fn stream_position(&self) -> usize {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.size
    }

    /// Decode the next column. Fails without any state change when the row
    /// is exhausted or the column cannot be decoded.
    pub fn read_column(&mut self) -> Result<ColumnValue<'_>> {
        if self.is_exhausted() {
            return Err(Error::RowExhausted);
        }
        let mut reader = BinaryReader::at(&self.page, self.offset);
        let value = read_value(&mut reader)?;
        self.offset = reader.position();
        self.pos += 1;
        Ok(value)
    }

    /// Decode the next column into `buffer`
    pub fn read_column_to_buffer(
        &mut self,
        buffer: &mut ApplicationDataBuffer<'_>,
    ) -> Result<ConversionResult> {
        let value = self.read_column()?;
        Ok(value.put_into(buffer))
    }

    pub fn skip_column(&mut self) -> Result<()> {
        self.read_column().map(|_| ())
    }

    /// Skip what is left of the current row and enter the next one
    pub fn move_to_next(&mut self) -> Result<()> {
        while !self.is_exhausted() {
            self.skip_column()?;
        }
        self.read_row_header()
    }
}
