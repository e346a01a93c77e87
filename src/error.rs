use thiserror::Error;

/// Failures while turning an uploaded buffer into derived views.
///
/// The first error aborts the whole upload; there are no partial tables and
/// no partial results.
#[derive(Debug, Error)]
pub enum TableError {
    /// Input bytes are not decodable text.
    #[error("input is not valid UTF-8 (first bad byte at offset {offset})")]
    Decode { offset: usize },

    /// No header matched one of the required logical columns.
    #[error("required column '{column}' not found among headers {headers:?}")]
    Schema {
        column: &'static str,
        headers: Vec<String>,
    },

    /// A date or numeric field failed to parse.
    #[error("line {line}: invalid {field} value {value:?}")]
    Parse {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// The reader produced a malformed record.
    #[error("line {line}: malformed CSV record")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },

    /// The table has no data rows.
    #[error("table contains no data rows")]
    Empty,
}
