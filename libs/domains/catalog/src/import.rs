//! Bulk CSV import.
//!
//! The header is validated up front: a missing required column rejects the
//! whole payload. Rows are then parsed one by one into [`CreateProduct`]
//! commands; a bad row is reported and never stops the rows after it.
//!
//! Fields are split on bare commas. Quoting is not supported.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ProductError, ProductResult};
use crate::models::CreateProduct;

pub const REQUIRED_COLUMNS: [&str; 11] = [
    "name",
    "sku",
    "slug",
    "price",
    "quantity",
    "unitId",
    "categoryId",
    "brandId",
    "subCategoryId",
    "storeId",
    "warehouseId",
];

/// One data row: its line number (header is line 0) and the parsed command.
#[derive(Debug)]
pub struct ImportRow {
    pub row: u64,
    pub command: ProductResult<CreateProduct>,
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    /// Non-blank data rows
    pub total_rows: u64,
    pub imported: u64,
    pub failed: u64,
    /// One `Row N: message` entry per failed row
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn record<T>(&mut self, row: u64, outcome: &ProductResult<T>) {
        self.total_rows += 1;
        match outcome {
            Ok(_) => self.imported += 1,
            Err(err) => {
                self.failed += 1;
                self.errors.push(format!("Row {}: {}", row, err));
            }
        }
    }
}

/// Header lookup keyed by lowercased name with underscores removed, so
/// `unitId`, `UNITID` and `unit_id` all name the same column.
struct Columns {
    index: HashMap<String, usize>,
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl Columns {
    fn from_header(header: &StringRecord) -> ProductResult<Self> {
        let index: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (normalize(name), i))
            .collect();

        for column in REQUIRED_COLUMNS {
            if !index.contains_key(&normalize(column)) {
                return Err(ProductError::Configuration(format!(
                    "Missing required column: {}",
                    column
                )));
            }
        }

        Ok(Self { index })
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.index
            .get(&normalize(column))
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

struct RowReader<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
}

impl<'a> RowReader<'a> {
    fn optional(&self, column: &str) -> Option<String> {
        self.columns.get(self.record, column).map(str::to_string)
    }

    fn required(&self, column: &str) -> ProductResult<String> {
        self.optional(column)
            .ok_or_else(|| ProductError::Validation(format!("Missing value for {}", column)))
    }

    fn parsed<T: FromStr>(&self, column: &str) -> ProductResult<T> {
        let raw = self.required(column)?;
        parse_value(column, &raw)
    }

    fn parsed_optional<T: FromStr>(&self, column: &str) -> ProductResult<Option<T>> {
        self.optional(column)
            .map(|raw| parse_value(column, &raw))
            .transpose()
    }

    fn command(&self) -> ProductResult<CreateProduct> {
        Ok(CreateProduct {
            name: self.required("name")?,
            sku: self.required("sku")?,
            slug: self.required("slug")?,
            price: self.parsed::<Decimal>("price")?,
            quantity: self.parsed("quantity")?,
            unit_id: self.parsed("unitId")?,
            category_id: self.parsed("categoryId")?,
            brand_id: self.parsed("brandId")?,
            sub_category_id: self.parsed("subCategoryId")?,
            store_id: self.parsed("storeId")?,
            warehouse_id: self.parsed("warehouseId")?,
            item_code: self.optional("itemCode"),
            barcode_symbology: self.optional("barcodeSymbology"),
            barcode_value: self.optional("barcodeValue"),
            selling_type: self.optional("sellingType"),
            product_type: self.optional("productType"),
            tax_type: self.optional("taxType"),
            discount_type: self.optional("discountType"),
            discount_value: self.parsed_optional::<Decimal>("discountValue")?,
            qty_alert: self.parsed_optional("qtyAlert")?,
            description: self.optional("description"),
            manufacturer: self.optional("manufacturer"),
            image_url: self.optional("imageUrl"),
            manufactured_date: self.parsed_optional::<NaiveDate>("manufacturedDate")?,
            expired_date: self.parsed_optional::<NaiveDate>("expiredDate")?,
        })
    }
}

fn parse_value<T: FromStr>(column: &str, raw: &str) -> ProductResult<T> {
    raw.parse::<T>()
        .map_err(|_| ProductError::Validation(format!("Invalid {}: '{}'", column, raw)))
}

/// Parse CSV text into per-row commands.
///
/// Fails as a whole only when the content is empty or a required column is
/// missing. Header-only content yields no rows.
pub fn parse_csv(content: &str) -> ProductResult<Vec<ImportRow>> {
    let content = content.trim_start_matches('\u{FEFF}');
    if content.trim().is_empty() {
        return Err(ProductError::Configuration("CSV content is empty".to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let header = reader
        .headers()
        .map_err(|e| ProductError::Configuration(format!("Unreadable CSV header: {}", e)))?
        .clone();
    let columns = Columns::from_header(&header)?;

    let mut rows = Vec::new();
    for (ordinal, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                // A whitespace-only line reads as one empty field. Rows of bare
                // separators still carry fields and go through validation.
                if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
                    continue;
                }
                let row = record
                    .position()
                    .map(|p| p.line().saturating_sub(1))
                    .unwrap_or(ordinal as u64 + 1);
                let command = RowReader {
                    columns: &columns,
                    record: &record,
                }
                .command();
                rows.push(ImportRow { row, command });
            }
            Err(err) => {
                let row = err
                    .position()
                    .map(|p| p.line().saturating_sub(1))
                    .unwrap_or(ordinal as u64 + 1);
                rows.push(ImportRow {
                    row,
                    command: Err(ProductError::Validation(format!("Unreadable row: {}", err))),
                });
            }
        }
    }

    tracing::debug!(rows = rows.len(), "Parsed CSV import");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "name,sku,slug,price,quantity,unitId,categoryId,brandId,subCategoryId,storeId,warehouseId";

    #[test]
    fn test_empty_content_is_rejected() {
        assert!(matches!(
            parse_csv("  \n "),
            Err(ProductError::Configuration(msg)) if msg == "CSV content is empty"
        ));
    }

    #[test]
    fn test_missing_column_is_named() {
        let err = parse_csv("name,sku,slug,price,quantity\nA,B,c,1,1").unwrap_err();
        assert_eq!(err.to_string(), "Missing required column: unitId");
    }

    #[test]
    fn test_header_lookup_ignores_case_and_underscores() {
        let csv = "NAME,Sku,slug,price,quantity,unit_id,CATEGORYID,brand_id,sub_category_id,store_id,warehouse_id\n\
                   Widget,SKU1,widget,9.99,5,1,2,3,4,5,6";
        let rows = parse_csv(csv).unwrap();

        assert_eq!(rows.len(), 1);
        let command = rows[0].command.as_ref().unwrap();
        assert_eq!(command.name, "Widget");
        assert_eq!(command.category_id, 2);
        assert_eq!(command.warehouse_id, 6);
        assert_eq!(command.price, Decimal::from_str("9.99").unwrap());
    }

    #[test]
    fn test_header_only_has_no_rows() {
        assert!(parse_csv(HEADER).unwrap().is_empty());
    }

    #[test]
    fn test_blank_lines_are_skipped_and_rows_keep_line_numbers() {
        let csv = format!(
            "{HEADER}\nA,SKU1,a,1.00,1,1,1,1,1,1,1\n\n   \nB,SKU2,b,2.00,1,1,1,1,1,1,1\n"
        );
        let rows = parse_csv(&csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[1].row, 4);
    }

    #[test]
    fn test_separator_only_row_is_a_data_row() {
        let csv = format!("{HEADER}\nA,SKU1,a,1.00,1,1,1,1,1,1,1\n,,,,,,,,,,\n");
        let rows = parse_csv(&csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].row, 2);
        assert_eq!(
            rows[1].command.as_ref().unwrap_err().to_string(),
            "Missing value for name"
        );
    }

    #[test]
    fn test_row_parse_errors_stay_on_the_row() {
        let csv = format!("{HEADER}\nA,SKU1,a,abc,1,1,1,1,1,1,1\nB,SKU2,b,2.00,1,1,1,1,1,1\nC,SKU3,c,3,1,1,1,1,1,1,1");
        let rows = parse_csv(&csv).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0].command.as_ref().unwrap_err().to_string(),
            "Invalid price: 'abc'"
        );
        assert_eq!(
            rows[1].command.as_ref().unwrap_err().to_string(),
            "Missing value for warehouseId"
        );
        assert!(rows[2].command.is_ok());
    }

    #[test]
    fn test_optional_columns_are_read() {
        let csv = format!(
            "{HEADER},itemCode,barcodeSymbology,expiredDate,discountValue\n\
             A,SKU1,a,1.00,1,1,1,1,1,1,1,IC-1,EAN13,2027-01-31,0.50"
        );
        let rows = parse_csv(&csv).unwrap();
        let command = rows[0].command.as_ref().unwrap();

        assert_eq!(command.item_code.as_deref(), Some("IC-1"));
        assert_eq!(command.barcode_symbology.as_deref(), Some("EAN13"));
        assert_eq!(command.expired_date, NaiveDate::from_ymd_opt(2027, 1, 31));
        assert_eq!(command.discount_value, Some(Decimal::from_str("0.50").unwrap()));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let csv = format!("\u{FEFF}{HEADER}\nA,SKU1,a,1.00,1,1,1,1,1,1,1");
        assert_eq!(parse_csv(&csv).unwrap().len(), 1);
    }

    #[test]
    fn test_report_counts() {
        let mut report = ImportReport::default();
        report.record::<()>(1, &Ok(()));
        report.record::<()>(2, &Err(ProductError::InvalidDateRange));

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.imported, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(
            report.errors,
            vec!["Row 2: expiredDate must be after manufacturedDate".to_string()]
        );
    }
}
