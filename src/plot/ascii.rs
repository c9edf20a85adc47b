//! ASCII histogram for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each bin is drawn as a column block of `#`, scaled to the tallest bin.

use crate::stats::Bin;

/// Render bins into a `width x height` character grid with a range header.
pub fn render_ascii_histogram(bins: &[Bin], width: usize, height: usize) -> String {
    let width = width.max(bins.len()).max(10);
    let height = height.max(3);

    let mut out = String::new();
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        out.push_str("Histogram: (no data)\n");
        return out;
    };

    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    out.push_str(&format!(
        "Histogram: units=[{:.1}, {:.1}] | bins={} | max count={}\n",
        first.lower,
        last.upper,
        bins.len(),
        max_count
    ));

    let mut grid = vec![vec![' '; width]; height];
    for (i, bin) in bins.iter().enumerate() {
        let (x0, x1) = column_span(i, bins.len(), width);
        let filled = bar_height(bin.count, max_count, height);
        for row in grid.iter_mut().skip(height - filled) {
            for cell in &mut row[x0..x1] {
                *cell = '#';
            }
        }
    }

    for row in grid {
        let line: String = row.into_iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str(&"-".repeat(width));
    out.push('\n');

    out
}

/// Columns `[x0, x1)` of bin `i`; bins get equal widths, with one blank
/// separator column when there is room for it.
fn column_span(i: usize, n: usize, width: usize) -> (usize, usize) {
    let x0 = i * width / n;
    let x1 = (i + 1) * width / n;
    if x1 - x0 > 1 { (x0, x1 - 1) } else { (x0, x1) }
}

fn bar_height(count: usize, max_count: usize, height: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let h = (count as f64 / max_count as f64 * height as f64).round() as usize;
    h.clamp(1, height)
}
