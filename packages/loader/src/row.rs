//! A single parsed CSV row.

use pincode_sales_models::{
    COLUMN_CITY, COLUMN_DEVICE_TYPE, COLUMN_POSTAL_CODE, COLUMN_QUANTITY_SOLD, COLUMN_STATE,
    DeviceCategory, SalesRecord,
};

/// Header-name to value pairs for one CSV row, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: Vec<(String, String)>,
}

impl CsvRow {
    /// Creates a row from `(header, value)` pairs.
    #[must_use]
    pub const fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Returns the value under `column`. When a header repeats, the first
    /// occurrence wins.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(header, _)| header == column)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates `(header, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    /// Converts this row into a [`SalesRecord`]. Absent columns become
    /// empty strings, which makes the record invalid.
    #[must_use]
    pub fn to_sales_record(&self) -> SalesRecord {
        let field = |column: &str| self.get(column).unwrap_or_default().to_string();

        SalesRecord {
            postal_code: field(COLUMN_POSTAL_CODE),
            city: field(COLUMN_CITY),
            state: field(COLUMN_STATE),
            device_category: DeviceCategory::from_label(&field(COLUMN_DEVICE_TYPE)),
            quantity_sold: field(COLUMN_QUANTITY_SOLD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> CsvRow {
        CsvRow::new(
            pairs
                .iter()
                .map(|(h, v)| ((*h).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn converts_to_sales_record() {
        let record = row(&[
            ("pincode", "400001"),
            ("city", "Mumbai"),
            ("state", "Maharashtra"),
            ("device_type", "Tablet"),
            ("quantity_sold", "8"),
        ])
        .to_sales_record();

        assert_eq!(record.postal_code, "400001");
        assert_eq!(record.device_category, DeviceCategory::Tablet);
        assert_eq!(record.quantity(), 8);
        assert!(record.is_valid());
    }

    #[test]
    fn absent_columns_make_an_invalid_record() {
        let record = row(&[("pincode", "400001"), ("city", "Mumbai")]).to_sales_record();
        assert!(record.state.is_empty());
        assert!(!record.is_valid());
    }

    #[test]
    fn first_duplicate_header_wins() {
        let r = row(&[("city", "Pune"), ("city", "Nagpur")]);
        assert_eq!(r.get("city"), Some("Pune"));
        assert_eq!(r.iter().count(), 2);
    }
}
