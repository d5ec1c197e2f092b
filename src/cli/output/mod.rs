//! Terminal rendition of the report pie charts: a colored legend where each
//! entry carries its share bar and percentage.

use ansi_term::Colour;

use crate::utils::percentage::share;

const PALETTE: [Colour; 5] = [
    Colour::Purple,
    Colour::Green,
    Colour::Yellow,
    Colour::Cyan,
    Colour::Red,
];

const BAR_WIDTH: f64 = 32.0;

/// Renders one chart as a titled legend. `unit` is appended to each value,
/// e.g. `"m"` for minutes or `"h"` for hours.
pub fn pie_chart(title: &str, entries: &[(String, f64)], unit: &str) -> String {
    let mut lines = vec![title.to_string()];
    if entries.is_empty() {
        lines.push("  (nothing to show yet)".to_string());
        lines.push(String::new());
        return lines.join("\n");
    }

    let total = entries.iter().map(|(_, value)| value).sum::<f64>();
    for (index, (label, value)) in entries.iter().enumerate() {
        let colour = PALETTE[index % PALETTE.len()];
        let pct = share(*value, total);
        let blocks = ((*pct / 100.0 * BAR_WIDTH).round() as usize).max(1);
        lines.push(format!(
            "  {:<33} {:>5.1}% {:>9} {}",
            colour.paint("█".repeat(blocks)).to_string(),
            *pct,
            format!("{value:.1}{unit}"),
            label,
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry_takes_the_whole_pie() {
        let chart = pie_chart(
            "This week's progress",
            &[("This week's total".to_string(), 12.5)],
            "h",
        );
        assert!(chart.contains("This week's progress"));
        assert!(chart.contains("100.0%"));
        assert!(chart.contains("12.5h"));
        assert!(chart.contains("This week's total"));
    }

    #[test]
    fn shares_reflect_each_entrys_weight() {
        let chart = pie_chart(
            "Today's progress",
            &[
                ("Read book".to_string(), 30.0),
                ("Piano".to_string(), 10.0),
            ],
            "m",
        );
        assert!(chart.contains("75.0%"));
        assert!(chart.contains("25.0%"));
    }

    #[test]
    fn empty_chart_says_so() {
        let chart = pie_chart("Today's progress", &[], "m");
        assert!(chart.contains("nothing to show yet"));
    }
}
