//! Pearson correlation between the table's numeric columns.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::{Column, SalesTable};
use crate::error::{Result, SalesError};

/// A numeric view of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    UnitsSold,
    UnitPrice,
    Revenue,
    /// Days since the earliest sale date.
    Day,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 4] = [
        NumericColumn::UnitsSold,
        NumericColumn::UnitPrice,
        NumericColumn::Revenue,
        NumericColumn::Day,
    ];

    pub fn source(self) -> Column {
        match self {
            NumericColumn::UnitsSold => Column::UnitsSold,
            NumericColumn::UnitPrice => Column::UnitPrice,
            NumericColumn::Revenue => Column::Revenue,
            NumericColumn::Day => Column::Date,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NumericColumn::UnitsSold => "units_sold",
            NumericColumn::UnitPrice => "unit_price",
            NumericColumn::Revenue => "revenue",
            NumericColumn::Day => "day",
        }
    }
}

/// Numeric columns the table carries, in a stable order.
pub fn numeric_columns(table: &SalesTable) -> Vec<NumericColumn> {
    NumericColumn::ALL
        .into_iter()
        .filter(|c| table.has_column(c.source()))
        .collect()
}

/// Values of one numeric column, in table order.
pub fn column_values(table: &SalesTable, column: NumericColumn) -> Result<Vec<f64>> {
    table.require(&[column.source()])?;
    let origin = table.date_range().map(|(lo, _)| lo);
    table
        .records()
        .iter()
        .map(|r| {
            let v = match column {
                NumericColumn::UnitsSold => Some(f64::from(r.units_sold)),
                NumericColumn::UnitPrice => r.unit_price,
                NumericColumn::Revenue => r.revenue(),
                NumericColumn::Day => r
                    .date
                    .zip(origin)
                    .map(|(d, lo)| (d - lo).num_days() as f64),
            };
            v.ok_or(SalesError::MissingField(column.source()))
        })
        .collect()
}

/// Correlation matrix with column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    pub values: DMatrix<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        Some(self.values[(i, j)])
    }
}

/// Pearson correlations between all numeric columns present.
///
/// A column with zero variance has no defined correlation; its off-diagonal
/// entries are reported as `0.0`.
pub fn correlation_matrix(table: &SalesTable) -> Result<CorrelationMatrix> {
    let columns = numeric_columns(table);
    if columns.len() < 2 {
        let missing = NumericColumn::ALL
            .into_iter()
            .map(NumericColumn::source)
            .find(|c| !table.has_column(*c))
            .unwrap_or(Column::UnitPrice);
        return Err(SalesError::MissingField(missing));
    }
    if table.len() < 2 {
        return Err(SalesError::insufficient(2, table.len()));
    }

    let series = columns
        .iter()
        .map(|c| column_values(table, *c))
        .collect::<Result<Vec<_>>>()?;

    let k = columns.len();
    let values = DMatrix::from_fn(k, k, |i, j| {
        if i == j {
            1.0
        } else {
            pearson(&series[i], &series[j]).unwrap_or(0.0)
        }
    });

    Ok(CorrelationMatrix { columns, values })
}

/// Pearson correlation; `None` when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mx = xs[..n].iter().sum::<f64>() / n as f64;
    let my = ys[..n].iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::domain::{Category, SaleRecord};

    #[test]
    fn pearson_perfect_lines() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(pearson(&x, &[2.0, 4.0, 6.0, 8.0]).unwrap(), 1.0);
        assert_relative_eq!(pearson(&x, &[8.0, 6.0, 4.0, 2.0]).unwrap(), -1.0);
        assert_eq!(pearson(&x, &[3.0, 3.0, 3.0, 3.0]), None);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let table = crate::data::generate_table(&Default::default()).unwrap();
        let m = correlation_matrix(&table).unwrap();
        assert_eq!(m.columns, NumericColumn::ALL.to_vec());
        let k = m.columns.len();
        for i in 0..k {
            assert_relative_eq!(m.values[(i, i)], 1.0);
            for j in 0..k {
                assert_relative_eq!(m.values[(i, j)], m.values[(j, i)], epsilon = 1e-12);
                assert!(m.values[(i, j)].abs() <= 1.0);
            }
        }
        assert_eq!(m.get(NumericColumn::Day, NumericColumn::Day), Some(1.0));
    }

    #[test]
    fn needs_two_numeric_columns() {
        let table = SalesTable::from_records(vec![
            SaleRecord {
                product: "Home-01".into(),
                category: Category::Home,
                units_sold: 3,
                date: None,
                unit_price: None,
            },
            SaleRecord {
                product: "Home-02".into(),
                category: Category::Home,
                units_sold: 5,
                date: None,
                unit_price: None,
            },
        ]);
        assert!(matches!(
            correlation_matrix(&table),
            Err(SalesError::MissingField(Column::UnitPrice))
        ));
    }
}
