//! Chart drawing with the Plotters SVG backend.
//!
//! Data prep happens up front in plain functions; the drawing closures only
//! place shapes.

use std::collections::BTreeMap;
use std::error::Error;

use chrono::{Days, NaiveDate};
use plotters::coord::Shift;
use plotters::data::Quartiles;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::palette::{category_color, coolwarm};
use super::treemap::{Tile, squarify};
use super::{ChartKind, ChartOptions};
use crate::domain::{Category, SalesTable};
use crate::error::{Result, SalesError};
use crate::io::{Pivot, pivot_units};
use crate::stats::correlation::column_values;
use crate::stats::{NumericColumn, correlation_matrix, histogram as bin_units};

type Root<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult = std::result::Result<(), Box<dyn Error>>;

const FONT: &str = "sans-serif";

/// Draw into an in-memory SVG document.
fn to_svg(options: &ChartOptions, draw: impl FnOnce(&Root<'_>) -> DrawResult) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        draw(&root).map_err(render_error)?;
        root.present().map_err(render_error)?;
    }
    Ok(svg)
}

fn render_error(err: impl std::fmt::Display) -> SalesError {
    SalesError::Render(err.to_string())
}

/// Total units per category, for categories with records.
pub fn category_totals(table: &SalesTable) -> Vec<(Category, u64)> {
    table
        .units_by_category()
        .into_iter()
        .map(|(c, units)| (c, units.iter().map(|u| u64::from(*u)).sum()))
        .collect()
}

/// Total units per sale date, in date order.
pub fn daily_totals(table: &SalesTable) -> Vec<(NaiveDate, u64)> {
    let mut out: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for r in table.records() {
        if let Some(d) = r.date {
            *out.entry(d).or_default() += u64::from(r.units_sold);
        }
    }
    out.into_iter().collect()
}

pub(super) fn histogram(table: &SalesTable, options: &ChartOptions) -> Result<String> {
    let bins = bin_units(&table.units(), options.histogram_bins)?;
    let n = bins.len() as u32;
    let top = bins.iter().map(|b| b.count).max().unwrap_or(0) as u32 + 1;
    let labels: Vec<String> = bins.iter().map(|b| format!("{:.0}-{:.0}", b.lower, b.upper)).collect();

    to_svg(options, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(ChartKind::Histogram.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d((0u32..n).into_segmented(), 0u32..top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Units sold")
            .y_desc("Frequency")
            .x_labels(bins.len())
            .x_label_formatter(&|v: &SegmentValue<u32>| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(palette_blue().mix(0.75).filled())
                .margin(2)
                .data(bins.iter().enumerate().map(|(i, b)| (i as u32, b.count as u32))),
        )?;
        Ok(())
    })
}

pub(super) fn boxplot(table: &SalesTable, options: &ChartOptions) -> Result<String> {
    let groups: Vec<(Category, Quartiles)> = table
        .units_by_category()
        .into_iter()
        .map(|(c, units)| (c, Quartiles::new(&units)))
        .collect();
    let n = groups.len() as u32;

    let (lo, hi) = groups.iter().fold((f32::MAX, f32::MIN), |(lo, hi), (_, q)| {
        let v = q.values();
        (lo.min(v[0]), hi.max(v[4]))
    });
    let pad = ((hi - lo) * 0.1).max(1.0);
    let y_range = (lo - pad)..(hi + pad);

    to_svg(options, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(ChartKind::Boxplot.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d((0u32..n).into_segmented(), y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Category")
            .y_desc("Units sold")
            .x_labels(groups.len())
            .x_label_formatter(&|v: &SegmentValue<u32>| match v {
                SegmentValue::CenterOf(i) => groups
                    .get(*i as usize)
                    .map(|(c, _)| c.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(groups.iter().enumerate().map(|(i, (c, q))| {
            Boxplot::new_vertical(SegmentValue::CenterOf(i as u32), q)
                .width(30)
                .whisker_width(0.6)
                .style(category_color(*c))
        }))?;
        Ok(())
    })
}

pub(super) fn category_bar(table: &SalesTable, options: &ChartOptions) -> Result<String> {
    let totals = category_totals(table);
    let n = totals.len() as u32;
    let top = totals.iter().map(|(_, t)| *t).max().unwrap_or(0);
    let top = top + top / 10 + 1;

    to_svg(options, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(ChartKind::CategoryBar.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n).into_segmented(), 0u64..top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Category")
            .y_desc("Total units sold")
            .x_labels(totals.len())
            .x_label_formatter(&|v: &SegmentValue<u32>| match v {
                SegmentValue::CenterOf(i) => totals
                    .get(*i as usize)
                    .map(|(c, _)| c.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(totals.iter().enumerate().map(|(i, (c, total))| {
            let i = i as u32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), *total)],
                category_color(*c).filled(),
            );
            bar.set_margin(0, 0, 12, 12);
            bar
        }))?;
        Ok(())
    })
}

/// One bar segment of the stacked chart.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    product: u32,
    category: Category,
    lower: u64,
    upper: u64,
}

/// Stack each product's per-category totals bottom-up in `Category` order.
/// Zero-height segments are dropped.
fn stack_segments(pivot: &Pivot) -> Vec<Segment> {
    let mut out = Vec::new();
    for (i, totals) in pivot.rows.values().enumerate() {
        let mut base = 0;
        for (category, total) in pivot.categories.iter().zip(totals) {
            if *total > 0 {
                out.push(Segment {
                    product: i as u32,
                    category: *category,
                    lower: base,
                    upper: base + total,
                });
            }
            base += total;
        }
    }
    out
}

pub(super) fn stacked_bar(table: &SalesTable, options: &ChartOptions) -> Result<String> {
    let pivot = pivot_units(table);
    let products: Vec<&String> = pivot.rows.keys().collect();
    let segments = stack_segments(&pivot);
    let n = products.len() as u32;
    let top = segments.iter().map(|s| s.upper).max().unwrap_or(0);
    let top = top + top / 10 + 1;

    to_svg(options, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(ChartKind::StackedBar.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(90)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n).into_segmented(), 0u64..top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Units sold")
            .x_labels(products.len())
            .x_label_style((FONT, 11).into_font().transform(FontTransform::Rotate90))
            .x_label_formatter(&|v: &SegmentValue<u32>| match v {
                SegmentValue::CenterOf(i) => products
                    .get(*i as usize)
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        for &category in &pivot.categories {
            let color = category_color(category);
            chart
                .draw_series(segments.iter().filter(|s| s.category == category).map(|s| {
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::Exact(s.product), s.lower),
                            (SegmentValue::Exact(s.product + 1), s.upper),
                        ],
                        color.filled(),
                    );
                    bar.set_margin(0, 0, 4, 4);
                    bar
                }))?
                .label(category.to_string())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .draw()?;
        Ok(())
    })
}

pub(super) fn heatmap(table: &SalesTable, options: &ChartOptions) -> Result<String> {
    let matrix = correlation_matrix(table)?;
    let k = matrix.columns.len();

    to_svg(options, |root| {
        let area = root.titled(ChartKind::Heatmap.title(), (FONT, 22))?;
        let (w, h) = area.dim_in_pixel();
        let label_w = 110i32;
        let label_h = 30i32;
        let cell_w = ((w as i32 - label_w - 20) / k as i32).max(1);
        let cell_h = ((h as i32 - label_h - 20) / k as i32).max(1);
        let center = Pos::new(HPos::Center, VPos::Center);

        for (j, col) in matrix.columns.iter().enumerate() {
            let x = label_w + j as i32 * cell_w + cell_w / 2;
            area.draw(&Text::new(
                col.label(),
                (x, label_h / 2),
                (FONT, 14).into_font().color(&BLACK).pos(center),
            ))?;
        }

        for (i, row) in matrix.columns.iter().enumerate() {
            let y0 = label_h + i as i32 * cell_h;
            area.draw(&Text::new(
                row.label(),
                (label_w - 8, y0 + cell_h / 2),
                (FONT, 14)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Right, VPos::Center)),
            ))?;

            for j in 0..k {
                let value = matrix.values[(i, j)];
                let x0 = label_w + j as i32 * cell_w;
                area.draw(&Rectangle::new(
                    [(x0, y0), (x0 + cell_w, y0 + cell_h)],
                    coolwarm(value).filled(),
                ))?;
                area.draw(&Rectangle::new(
                    [(x0, y0), (x0 + cell_w, y0 + cell_h)],
                    WHITE.stroke_width(2),
                ))?;
                area.draw(&Text::new(
                    format!("{value:.2}"),
                    (x0 + cell_w / 2, y0 + cell_h / 2),
                    (FONT, 16).into_font().color(&BLACK).pos(center),
                ))?;
            }
        }
        Ok(())
    })
}

/// `(category, units, revenue, day)` per record.
fn scatter_points(table: &SalesTable) -> Result<Vec<(Category, f64, f64, f64)>> {
    let units = column_values(table, NumericColumn::UnitsSold)?;
    let revenue = column_values(table, NumericColumn::Revenue)?;
    let days = column_values(table, NumericColumn::Day)?;
    Ok(table
        .records()
        .iter()
        .zip(units.into_iter().zip(revenue).zip(days))
        .map(|(r, ((u, rev), d))| (r.category, u, rev, d))
        .collect())
}

fn span(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if hi > lo { lo..hi } else { lo..(lo + 1.0) }
}

/// `(category, units, revenue)` per record.
fn revenue_points(table: &SalesTable) -> Result<Vec<(Category, f64, f64)>> {
    let units = column_values(table, NumericColumn::UnitsSold)?;
    let revenue = column_values(table, NumericColumn::Revenue)?;
    Ok(table
        .records()
        .iter()
        .zip(units.into_iter().zip(revenue))
        .map(|(r, (u, rev))| (r.category, u, rev))
        .collect())
}

pub(super) fn scatter(table: &SalesTable, options: &ChartOptions) -> Result<String> {
    let points = revenue_points(table)?;
    let x_range = span(points.iter().map(|p| p.1));
    let y_range = span(points.iter().map(|p| p.2));
    let categories: Vec<Category> = table.units_by_category().into_keys().collect();

    to_svg(options, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(ChartKind::Scatter.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc("Units sold")
            .y_desc("Revenue")
            .x_label_formatter(&|v| format!("{v:.0}"))
            .y_label_formatter(&|v| format!("{v:.0}"))
            .draw()?;

        for &category in &categories {
            let color = category_color(category);
            chart
                .draw_series(
                    points
                        .iter()
                        .filter(|p| p.0 == category)
                        .map(|&(_, u, rev)| Circle::new((u, rev), 4, color.mix(0.8).filled())),
                )?
                .label(category.to_string())
                .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .draw()?;
        Ok(())
    })
}

pub(super) fn scatter3d(table: &SalesTable, options: &ChartOptions) -> Result<String> {
    let points = scatter_points(table)?;
    let x_range = span(points.iter().map(|p| p.1));
    let y_range = span(points.iter().map(|p| p.2));
    let z_range = span(points.iter().map(|p| p.3));

    to_svg(options, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(ChartKind::Scatter3d.title(), (FONT, 22))
            .margin(20)
            .build_cartesian_3d(x_range, y_range, z_range)?;

        chart.with_projection(|mut pb| {
            pb.yaw = 0.6;
            pb.pitch = 0.3;
            pb.scale = 0.8;
            pb.into_matrix()
        });

        chart
            .configure_axes()
            .light_grid_style(BLACK.mix(0.1))
            .max_light_lines(4)
            .draw()?;

        chart.draw_series(
            points
                .iter()
                .map(|&(c, u, rev, d)| Circle::new((u, rev, d), 3, category_color(c).filled())),
        )?;
        Ok(())
    })
}

pub(super) fn treemap(table: &SalesTable, options: &ChartOptions) -> Result<String> {
    let totals = category_totals(table);
    let grand: u64 = totals.iter().map(|(_, t)| t).sum();

    to_svg(options, |root| {
        let area = root.titled(ChartKind::Treemap.title(), (FONT, 22))?;
        let (w, h) = area.dim_in_pixel();
        if grand == 0 {
            area.draw(&Text::new(
                "No units sold",
                (w as i32 / 2, h as i32 / 2),
                (FONT, 18).into_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Center)),
            ))?;
            return Ok(());
        }

        let bounds = Tile {
            x: 10.0,
            y: 10.0,
            w: f64::from(w) - 20.0,
            h: f64::from(h) - 20.0,
        };
        let values: Vec<f64> = totals.iter().map(|(_, t)| *t as f64).collect();
        let tiles = squarify(&values, bounds);

        for ((category, total), tile) in totals.iter().zip(&tiles) {
            if tile.area() <= 0.0 {
                continue;
            }
            let corners = [
                (tile.x.round() as i32, tile.y.round() as i32),
                ((tile.x + tile.w).round() as i32, (tile.y + tile.h).round() as i32),
            ];
            area.draw(&Rectangle::new(corners, category_color(*category).mix(0.85).filled()))?;
            area.draw(&Rectangle::new(corners, WHITE.stroke_width(3)))?;

            if tile.w > 70.0 && tile.h > 40.0 {
                let share = *total as f64 / grand as f64 * 100.0;
                let (x, y) = (corners[0].0 + 8, corners[0].1 + 8);
                area.draw(&Text::new(
                    category.to_string(),
                    (x, y),
                    (FONT, 16).into_font().color(&WHITE),
                ))?;
                area.draw(&Text::new(
                    format!("{total} ({share:.1}%)"),
                    (x, y + 20),
                    (FONT, 14).into_font().color(&WHITE),
                ))?;
            }
        }
        Ok(())
    })
}

pub(super) fn trend(table: &SalesTable, options: &ChartOptions) -> Result<String> {
    let daily = daily_totals(table);
    let (Some((origin, _)), Some((last, _))) = (daily.first().copied(), daily.last().copied()) else {
        return Err(SalesError::insufficient(1, 0));
    };
    let points: Vec<(f64, f64)> = daily
        .iter()
        .map(|(d, t)| ((*d - origin).num_days() as f64, *t as f64))
        .collect();
    let x_max = ((last - origin).num_days() as f64).max(1.0);
    let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max) * 1.1 + 1.0;

    let date_label = |v: &f64| {
        origin
            .checked_add_days(Days::new(v.max(0.0).round() as u64))
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    to_svg(options, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(ChartKind::Trend.title(), (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Units sold")
            .x_labels(6)
            .x_label_formatter(&date_label)
            .y_label_formatter(&|v| format!("{v:.0}"))
            .draw()?;

        chart.draw_series(LineSeries::new(points.iter().copied(), palette_blue().stroke_width(2)))?;
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, palette_blue().filled())))?;
        Ok(())
    })
}

fn palette_blue() -> RGBColor {
    category_color(Category::Electronics)
}
