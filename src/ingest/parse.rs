use std::io::Cursor;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::TableError;
use crate::ingest::columns::{AliasTable, ColumnMap};
use crate::ingest::table::{SalesRecord, SalesTable};

/// Date formats seen in exports, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Same formats with a time-of-day suffix; the time is discarded.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Parse decoded upload text into a typed table.
///
/// The first line must be a header row resolvable through `aliases`. Any
/// unparseable field rejects the whole upload, and so does a table with zero
/// data rows.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_table(text: &str, aliases: &AliasTable) -> Result<SalesTable, TableError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(Cursor::new(text.as_bytes()));

    let headers = rdr.headers().map_err(|e| TableError::Csv {
        line: 1,
        source: e,
    })?;
    let map = ColumnMap::resolve(headers, aliases)?;
    debug!(?map, "resolved header row");

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        // header is line 1, so the first data record is line 2
        let line = idx + 2;
        let record = result.map_err(|e| TableError::Csv { line, source: e })?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(line);
        records.push(parse_record(&record, &map, line)?);
    }

    if records.is_empty() {
        return Err(TableError::Empty);
    }
    debug!(rows = records.len(), "parsed sales table");
    Ok(SalesTable::new(records))
}

fn parse_record(
    record: &StringRecord,
    map: &ColumnMap,
    line: usize,
) -> Result<SalesRecord, TableError> {
    let date_raw = field(record, map.date, "date", line)?;
    let date = parse_date(date_raw).ok_or_else(|| invalid(line, "date", date_raw))?;

    let quantity_raw = field(record, map.quantity, "quantity", line)?;
    let quantity: u64 = quantity_raw
        .parse()
        .map_err(|_| invalid(line, "quantity", quantity_raw))?;

    let amount_raw = field(record, map.amount, "amount", line)?;
    let amount: f64 = amount_raw
        .parse()
        .map_err(|_| invalid(line, "amount", amount_raw))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(invalid(line, "amount", amount_raw));
    }

    Ok(SalesRecord {
        date,
        category: field(record, map.category, "category", line)?.to_string(),
        product: field(record, map.product, "product", line)?.to_string(),
        quantity,
        amount,
    })
}

fn field<'r>(
    record: &'r StringRecord,
    idx: usize,
    name: &'static str,
    line: usize,
) -> Result<&'r str, TableError> {
    record.get(idx).ok_or_else(|| invalid(line, name, ""))
}

fn invalid(line: usize, field: &'static str, value: &str) -> TableError {
    TableError::Parse {
        line,
        field,
        value: value.to_string(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<SalesTable, TableError> {
        parse_table(text, &AliasTable::builtin())
    }

    #[test]
    fn parses_well_formed_upload() {
        let table = parse(
            "date,category,product,quantity,amount\n\
             2024-01-05,Food,Bread,10,100.0\n\
             2024-02-10,Food,Bread,5,60.0\n",
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(first.product, "Bread");
        assert_eq!(first.quantity, 10);
        assert_eq!(first.amount, 100.0);
    }

    #[test]
    fn accepts_russian_headers() {
        let table = parse(
            "Дата,Категория,Товар,Количество,Сумма\n\
             2024-01-05,Еда,Хлеб,10,100.0\n",
        )
        .unwrap();
        assert_eq!(table.records()[0].category, "Еда");
    }

    #[test]
    fn accepts_alternate_date_formats() {
        let table = parse(
            "date,category,product,quantity,amount\n\
             2024/01/05,Food,Bread,1,1.0\n\
             05.01.2024,Food,Bread,1,1.0\n\
             2024-01-05 13:45:00,Food,Bread,1,1.0\n",
        )
        .unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert!(table.records().iter().all(|r| r.date == expected));
    }

    #[test]
    fn bad_date_is_a_parse_error_with_line() {
        let err = parse(
            "date,category,product,quantity,amount\n\
             2024-01-05,Food,Bread,10,100.0\n\
             not-a-date,Food,Bread,5,60.0\n",
        )
        .unwrap_err();
        match err {
            TableError::Parse { line, field, value } => {
                assert_eq!(line, 3);
                assert_eq!(field, "date");
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let err = parse(
            "date,category,product,quantity,amount\n\
             2024-01-05,Food,Bread,-3,100.0\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TableError::Parse {
                field: "quantity",
                ..
            }
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = parse(
            "date,category,product,quantity,amount\n\
             2024-01-05,Food,Bread,3,-9.5\n",
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Parse { field: "amount", .. }));
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let err = parse(
            "date,category,product,quantity\n\
             2024-01-05,Food,Bread,10\n",
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Schema { column: "amount", .. }));
    }

    #[test]
    fn short_record_is_a_parse_error() {
        let err = parse(
            "date,category,product,quantity,amount\n\
             2024-01-05,Food,Bread,10\n",
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Parse { field: "amount", .. }));
    }

    #[test]
    fn header_only_upload_is_empty() {
        let err = parse("date,category,product,quantity,amount\n").unwrap_err();
        assert!(matches!(err, TableError::Empty));
    }

    #[test]
    fn quoted_fields_are_unwrapped() {
        let table = parse(
            "date,category,product,quantity,amount\n\
             2024-01-05,\"Food, frozen\",Bread,10,100.0\n",
        )
        .unwrap();
        assert_eq!(table.records()[0].category, "Food, frozen");
    }
}
