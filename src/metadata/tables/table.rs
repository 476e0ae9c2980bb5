use crate::metadata::token::Token;

/// Common accessors of a raw table row.
pub trait RowDefinition {
    /// The 1-based row id
    fn rid(&self) -> u32;

    /// The token of this row
    fn token(&self) -> Token;
}

/// An in-memory metadata table: rows stored in row order, addressed by 1-based row id.
pub struct MetadataTable<T> {
    rows: Vec<T>,
}

impl<T: RowDefinition> MetadataTable<T> {
    /// Creates a table from rows whose row ids must be `1..=rows.len()` in order.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a row id does not match its position.
    pub fn from_rows(rows: Vec<T>) -> crate::Result<Self> {
        for (index, row) in rows.iter().enumerate() {
            if row.rid() as usize != index + 1 {
                return Err(malformed_error!(
                    "Row {} stored at position {}",
                    row.rid(),
                    index + 1
                ));
            }
        }

        Ok(MetadataTable { rows })
    }

    /// Returns the row with the 1-based id `rid`
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<&T> {
        let index = (rid as usize).checked_sub(1)?;
        self.rows.get(index)
    }

    /// Number of rows in this table
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Iterates the rows in row order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }
}

impl<T> Default for MetadataTable<T> {
    fn default() -> Self {
        MetadataTable { rows: Vec::new() }
    }
}

impl<'a, T: RowDefinition> IntoIterator for &'a MetadataTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

macro_rules! impl_row_definition {
    ($($row:ty),* $(,)?) => {
        $(
            impl crate::metadata::tables::RowDefinition for $row {
                fn rid(&self) -> u32 {
                    self.rid
                }

                fn token(&self) -> crate::metadata::token::Token {
                    self.token
                }
            }
        )*
    };
}

pub(crate) use impl_row_definition;
