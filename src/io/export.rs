//! Export the table and the product x category pivot to CSV.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts, and `write_table_csv` output reads back through `read_table_csv`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Category, Column, SalesTable};
use crate::error::Result;

/// Write the table with the columns it carries.
pub fn write_table_csv(path: &Path, table: &SalesTable) -> Result<()> {
    let file = File::create(path)?;
    write_table(file, table)
}

pub fn write_table<W: Write>(out: W, table: &SalesTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let columns: Vec<Column> = [
        Column::Product,
        Column::Category,
        Column::UnitsSold,
        Column::Date,
        Column::UnitPrice,
    ]
    .into_iter()
    .filter(|c| table.has_column(*c))
    .collect();

    writer.write_record(columns.iter().map(|c| c.name()))?;

    for r in table.records() {
        let row: Vec<String> = columns
            .iter()
            .map(|c| match c {
                Column::Product => r.product.clone(),
                Column::Category => r.category.display_name().to_string(),
                Column::UnitsSold => r.units_sold.to_string(),
                Column::Date => r.date.map(|d| d.to_string()).unwrap_or_default(),
                Column::UnitPrice => r.unit_price.map(|p| p.to_string()).unwrap_or_default(),
                Column::Revenue => String::new(),
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Units sold summed per product (rows) and category (columns).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pivot {
    /// Categories that appear in the table, in `Category` order.
    pub categories: Vec<Category>,
    /// Product -> one total per entry of `categories` (zero-filled).
    pub rows: BTreeMap<String, Vec<u64>>,
}

pub fn pivot_units(table: &SalesTable) -> Pivot {
    let categories: Vec<Category> = table.units_by_category().into_keys().collect();
    let mut rows: BTreeMap<String, Vec<u64>> = BTreeMap::new();

    for r in table.records() {
        let Some(col) = categories.iter().position(|c| *c == r.category) else {
            continue;
        };
        let row = rows
            .entry(r.product.clone())
            .or_insert_with(|| vec![0; categories.len()]);
        row[col] += u64::from(r.units_sold);
    }

    Pivot { categories, rows }
}

pub fn write_pivot_csv(path: &Path, pivot: &Pivot) -> Result<()> {
    let file = File::create(path)?;
    write_pivot(file, pivot)
}

pub fn write_pivot<W: Write>(out: W, pivot: &Pivot) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["product".to_string()];
    header.extend(pivot.categories.iter().map(|c| c.display_name().to_string()));
    writer.write_record(&header)?;

    for (product, totals) in &pivot.rows {
        let mut row = vec![product.clone()];
        row.extend(totals.iter().map(u64::to_string));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SaleRecord;
    use crate::io::ingest::read_table;

    fn rec(product: &str, category: Category, units: u32) -> SaleRecord {
        SaleRecord {
            product: product.to_string(),
            category,
            units_sold: units,
            date: None,
            unit_price: None,
        }
    }

    #[test]
    fn generated_table_survives_csv() {
        let table = crate::data::generate_table(&Default::default()).unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();

        let back = read_table(buf.as_slice()).unwrap();
        assert!(back.row_errors.is_empty());
        assert_eq!(back.table, table);
    }

    #[test]
    fn fine_grained_prices_survive_csv() {
        let input = "product,category,units_sold,unit_price\nHome-01,Home,3,19.999\nHome-02,Home,5,0.125\n";
        let first = read_table(input.as_bytes()).unwrap().table;

        let mut buf = Vec::new();
        write_table(&mut buf, &first).unwrap();
        let back = read_table(buf.as_slice()).unwrap().table;

        let prices: Vec<Option<f64>> = back.records().iter().map(|r| r.unit_price).collect();
        assert_eq!(prices, vec![Some(19.999), Some(0.125)]);
        assert_eq!(back, first);
    }

    #[test]
    fn writes_only_present_columns() {
        let table = SalesTable::from_records(vec![rec("Home-01", Category::Home, 2)]);
        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "product,category,units_sold\nHome-01,Home,2\n");
    }

    #[test]
    fn pivot_sums_and_zero_fills() {
        let table = SalesTable::from_records(vec![
            rec("A", Category::Home, 2),
            rec("A", Category::Home, 3),
            rec("B", Category::Sports, 4),
        ]);
        let pivot = pivot_units(&table);
        assert_eq!(pivot.categories, vec![Category::Home, Category::Sports]);
        assert_eq!(pivot.rows["A"], vec![5, 0]);
        assert_eq!(pivot.rows["B"], vec![0, 4]);

        let mut buf = Vec::new();
        write_pivot(&mut buf, &pivot).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "product,Home,Sports\nA,5,0\nB,0,4\n"
        );
    }
}
