//! Synthetic sales table generation.

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::domain::{Category, GeneratorConfig, SaleRecord, SalesTable};
use crate::error::{Result, SalesError};

/// A product offered in the synthetic catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub category: Category,
    pub unit_price: f64,
}

/// Generate a sales table.
///
/// The output is fully determined by `config` (including `config.seed`).
pub fn generate_table(config: &GeneratorConfig) -> Result<SalesTable> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(config.units_mean, config.units_std_dev)
        .map_err(|e| SalesError::invalid(format!("Units distribution error: {e}")))?;

    let catalogue = build_catalogue(&mut rng, config);

    let mut records = Vec::with_capacity(config.record_count);
    for _ in 0..config.record_count {
        let product = &catalogue[rng.gen_range(0..catalogue.len())];

        // Rounding then clamping keeps the draw inside the configured range;
        // values below zero can't survive because `units_min` is unsigned.
        let draw: f64 = normal.sample(&mut rng);
        let units_sold = draw
            .round()
            .clamp(f64::from(config.units_min), f64::from(config.units_max)) as u32;

        let offset = rng.gen_range(0..config.span_days);
        let date = date_at(config.start_date, offset)?;

        records.push(SaleRecord {
            product: product.name.clone(),
            category: product.category,
            units_sold,
            date: Some(date),
            unit_price: Some(product.unit_price),
        });
    }

    // Date order; ties keep generation order.
    records.sort_by_key(|r| r.date);

    debug!(
        records = records.len(),
        products = catalogue.len(),
        seed = config.seed,
        "generated sales table"
    );

    Ok(SalesTable::from_records(records))
}

fn validate(config: &GeneratorConfig) -> Result<()> {
    if config.record_count == 0 {
        return Err(SalesError::invalid("Record count must be > 0."));
    }
    if config.units_min > config.units_max {
        return Err(SalesError::invalid(format!(
            "Invalid units range: min {} > max {}.",
            config.units_min, config.units_max
        )));
    }
    if !(config.units_mean.is_finite() && config.units_std_dev.is_finite())
        || config.units_std_dev < 0.0
    {
        return Err(SalesError::invalid(
            "Units mean must be finite and std-dev finite and >= 0.",
        ));
    }
    if !(config.price_min.is_finite() && config.price_max.is_finite())
        || config.price_min < 0.0
        || config.price_max < config.price_min
    {
        return Err(SalesError::invalid(format!(
            "Invalid price range: [{}, {}].",
            config.price_min, config.price_max
        )));
    }
    if config.span_days == 0 {
        return Err(SalesError::invalid("Date span must be at least one day."));
    }
    if config.products_per_category == 0 {
        return Err(SalesError::invalid("Products per category must be > 0."));
    }
    // The last possible sale date must exist in the calendar.
    date_at(config.start_date, config.span_days - 1)?;
    Ok(())
}

fn date_at(start: NaiveDate, offset: u32) -> Result<NaiveDate> {
    start.checked_add_days(Days::new(u64::from(offset))).ok_or_else(|| {
        SalesError::invalid(format!(
            "Date span of {offset} day(s) from {start} is out of range."
        ))
    })
}

fn build_catalogue(rng: &mut StdRng, config: &GeneratorConfig) -> Vec<Product> {
    let mut out = Vec::with_capacity(Category::ALL.len() * config.products_per_category);
    for category in Category::ALL {
        for i in 0..config.products_per_category {
            let raw = rng.gen_range(config.price_min..=config.price_max);
            out.push(Product {
                name: format!("{}-{:02}", category.display_name(), i + 1),
                category,
                unit_price: (raw * 100.0).round() / 100.0,
            });
        }
    }
    out
}
