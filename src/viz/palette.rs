//! Colors shared by the SVG charts and the dashboard.

use plotters::style::RGBColor;

use crate::domain::Category;

/// One color per category, in `Category::ALL` order.
pub const CATEGORY_COLORS: [RGBColor; 5] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
];

pub fn category_color(category: Category) -> RGBColor {
    let idx = Category::ALL.iter().position(|c| *c == category).unwrap_or(0);
    CATEGORY_COLORS[idx % CATEGORY_COLORS.len()]
}

const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

/// Diverging blue-white-red scale for values in `[-1, 1]`.
pub fn coolwarm(value: f64) -> RGBColor {
    let v = if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 };
    let (from, to, t) = if v < 0.0 { (NEUTRAL, COOL, -v) } else { (NEUTRAL, WARM, v) };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(7.0), coolwarm(1.0));
        assert_eq!(coolwarm(f64::NAN), coolwarm(0.0));
    }

    #[test]
    fn categories_get_distinct_colors() {
        let colors: Vec<RGBColor> = Category::ALL.into_iter().map(category_color).collect();
        for (i, a) in colors.iter().enumerate() {
            assert!(colors[i + 1..].iter().all(|b| b != a));
        }
    }
}
