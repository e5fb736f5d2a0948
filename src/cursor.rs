use crate::error::{Error, Result};
use crate::protocol::command::ResultPage;
use crate::row::Row;

/// Server-side cursor state of one executed query
///
/// Tracks the page currently held and which of its rows is current. Before
/// the first page arrives `has_next` is optimistic so that the first fetch
/// triggers a page request.
#[derive(Debug)]
pub struct Cursor {
    query_id: i64,
    row: Option<Row>,
    row_count: i32,
    /// Rows of the current page entered so far
    entered: i32,
    last_page: bool,
}

impl Cursor {
    pub fn new(query_id: i64) -> Self {
        Self {
            query_id,
            row: None,
            row_count: 0,
            entered: 0,
            last_page: false,
        }
    }

    pub fn query_id(&self) -> i64 {
        self.query_id
    }

    /// Whether a further row may exist
    pub fn has_next(&self) -> bool {
        self.row.is_none() || self.entered < self.row_count || !self.last_page
    }

    /// The current page is spent and another one is available from the server
    pub fn needs_data_update(&self) -> bool {
        self.row.is_none() || (self.entered >= self.row_count && !self.last_page)
    }

    /// Replace the current page. A page announcing rows must carry at least
    /// the first row header.
    pub fn update_data(&mut self, page: ResultPage) -> Result<()> {
        if page.row_count > 0 && page.data.is_empty() {
            return Err(Error::InvalidPacket);
        }
        self.row = Some(Row::new(page.data)?);
        self.row_count = page.row_count;
        self.last_page = page.last;
        self.entered = 0;
        Ok(())
    }

    /// Enter the next row of the current page. Returns `false` when the page
    /// has no more rows.
    pub fn increment(&mut self) -> Result<bool> {
        let Some(row) = self.row.as_mut() else {
            return Ok(false);
        };
        if self.entered >= self.row_count {
            return Ok(false);
        }
        if self.entered > 0 {
            row.move_to_next()?;
        }
        self.entered += 1;
        Ok(true)
    }

    /// The current row, once one has been entered
    pub fn row_mut(&mut self) -> Option<&mut Row> {
        if self.entered == 0 {
            return None;
        }
        self.row.as_mut()
    }
}
