//! Squarified treemap layout.
//!
//! Lays values out as rectangles tiling a bounding box, each with area
//! proportional to its value, keeping aspect ratios close to 1 (Bruls,
//! Huizing & van Wijk). Values are placed largest first; the output is
//! returned in input order.

/// An axis-aligned rectangle in drawing units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Tile {
    pub fn area(&self) -> f64 {
        self.w * self.h
    }
}

/// Lay out `values` inside `bounds`. Non-positive values get an empty tile at
/// the bounds' origin.
pub fn squarify(values: &[f64], bounds: Tile) -> Vec<Tile> {
    let empty = Tile {
        x: bounds.x,
        y: bounds.y,
        w: 0.0,
        h: 0.0,
    };
    let mut out = vec![empty; values.len()];

    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 || bounds.area() <= 0.0 {
        return out;
    }

    let mut order: Vec<usize> = (0..values.len()).filter(|&i| values[i] > 0.0).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let scale = bounds.area() / total;
    let areas: Vec<(usize, f64)> = order.iter().map(|&i| (i, values[i] * scale)).collect();

    let mut free = bounds;
    let mut row: Vec<(usize, f64)> = Vec::new();

    for &item in &areas {
        let side = free.w.min(free.h);
        if row.is_empty() {
            row.push(item);
            continue;
        }
        let current = worst_ratio(&row, side);
        row.push(item);
        if worst_ratio(&row, side) > current {
            row.pop();
            free = place_row(&row, free, &mut out);
            row.clear();
            row.push(item);
        }
    }
    if !row.is_empty() {
        place_row(&row, free, &mut out);
    }

    out
}

/// Largest aspect ratio in `row` when laid along a side of length `side`.
fn worst_ratio(row: &[(usize, f64)], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    let (lo, hi) = row
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), (_, a)| (lo.min(*a), hi.max(*a)));
    if sum <= 0.0 || lo <= 0.0 {
        return f64::INFINITY;
    }
    let s2 = side * side;
    let sum2 = sum * sum;
    (s2 * hi / sum2).max(sum2 / (s2 * lo))
}

/// Place a row along the shorter side of `free`, returning the space left.
fn place_row(row: &[(usize, f64)], free: Tile, out: &mut [Tile]) -> Tile {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();

    if free.w >= free.h {
        // Column on the left edge.
        let width = if free.h > 0.0 { sum / free.h } else { 0.0 };
        let mut y = free.y;
        for &(idx, area) in row {
            let h = if width > 0.0 { area / width } else { 0.0 };
            out[idx] = Tile { x: free.x, y, w: width, h };
            y += h;
        }
        Tile {
            x: free.x + width,
            y: free.y,
            w: (free.w - width).max(0.0),
            h: free.h,
        }
    } else {
        // Row along the top edge.
        let height = if free.w > 0.0 { sum / free.w } else { 0.0 };
        let mut x = free.x;
        for &(idx, area) in row {
            let w = if height > 0.0 { area / height } else { 0.0 };
            out[idx] = Tile { x, y: free.y, w, h: height };
            x += w;
        }
        Tile {
            x: free.x,
            y: free.y + height,
            w: free.w,
            h: (free.h - height).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds() -> Tile {
        Tile {
            x: 0.0,
            y: 0.0,
            w: 600.0,
            h: 400.0,
        }
    }

    #[test]
    fn areas_are_proportional_and_inside_bounds() {
        let values = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0];
        let tiles = squarify(&values, bounds());
        let total: f64 = values.iter().sum();
        let b = bounds();

        for (v, t) in values.iter().zip(&tiles) {
            assert_relative_eq!(t.area(), v / total * b.area(), epsilon = 1e-6);
            assert!(t.x >= -1e-9 && t.y >= -1e-9);
            assert!(t.x + t.w <= b.w + 1e-6);
            assert!(t.y + t.h <= b.h + 1e-6);
        }

        let covered: f64 = tiles.iter().map(Tile::area).sum();
        assert_relative_eq!(covered, b.area(), epsilon = 1e-6);
    }

    #[test]
    fn tiles_do_not_overlap() {
        let tiles = squarify(&[5.0, 3.0, 2.0, 1.0], bounds());
        for (i, a) in tiles.iter().enumerate() {
            for b in &tiles[i + 1..] {
                let overlap_w = (a.x + a.w).min(b.x + b.w) - a.x.max(b.x);
                let overlap_h = (a.y + a.h).min(b.y + b.h) - a.y.max(b.y);
                assert!(overlap_w <= 1e-6 || overlap_h <= 1e-6, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn single_value_fills_bounds() {
        let tiles = squarify(&[42.0], bounds());
        assert_eq!(tiles.len(), 1);
        let (t, b) = (tiles[0], bounds());
        assert_relative_eq!(t.x, b.x);
        assert_relative_eq!(t.y, b.y);
        assert_relative_eq!(t.w, b.w, epsilon = 1e-9);
        assert_relative_eq!(t.h, b.h, epsilon = 1e-9);
    }

    #[test]
    fn zero_values_get_empty_tiles() {
        let tiles = squarify(&[0.0, 3.0], bounds());
        assert_eq!(tiles[0].area(), 0.0);
        assert_relative_eq!(tiles[1].area(), bounds().area(), epsilon = 1e-6);
    }
}
