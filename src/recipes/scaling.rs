//! Serving-size scaling of free-text ingredient lines

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn number_pattern() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"))
}

/// Rescales every number embedded in `items` by `target / base`.
///
/// `target == base` returns the input untouched. A `base` of zero is
/// treated the same way.
pub fn scale_ingredients(items: &[String], target: u32, base: u32) -> Vec<String> {
    if target == base || base == 0 {
        return items.to_vec();
    }

    let factor = f64::from(target) / f64::from(base);
    items.iter().map(|item| scale_line(item, factor)).collect()
}

fn scale_line(line: &str, factor: f64) -> String {
    number_pattern()
        .replace_all(line, |caps: &Captures| {
            let raw = &caps[0];
            match raw.parse::<f64>() {
                Ok(value) => format_quantity(value * factor, raw.contains('.')),
                Err(_) => raw.to_string(),
            }
        })
        .into_owned()
}

/// Whole numbers print without a decimal point unless the original was
/// written with one; everything else gets exactly one decimal place.
fn format_quantity(value: f64, written_as_decimal: bool) -> String {
    let whole = (value - value.round()).abs() < 1e-9;
    if whole && !written_as_decimal {
        format!("{:.0}", value.round())
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_doubling() {
        let items = lines(&["2 tomatoes", "100g pasta", "1.5 cups milk"]);
        assert_eq!(
            scale_ingredients(&items, 4, 2),
            lines(&["4 tomatoes", "200g pasta", "3.0 cups milk"])
        );
    }

    #[test]
    fn test_tripling() {
        let items = lines(&["2 tomatoes", "100g pasta", "1.5 cups milk"]);
        assert_eq!(
            scale_ingredients(&items, 6, 2),
            lines(&["6 tomatoes", "300g pasta", "4.5 cups milk"])
        );
    }

    #[test]
    fn test_same_servings_is_identity() {
        let items = lines(&["2.50 cups flour", "salt to taste", "007 eggs"]);
        assert_eq!(scale_ingredients(&items, 2, 2), items);
        assert_eq!(scale_ingredients(&items, 5, 0), items);
    }

    #[test]
    fn test_fractional_results_get_one_decimal() {
        let items = lines(&["3 eggs", "1 onion"]);
        assert_eq!(scale_ingredients(&items, 1, 2), lines(&["1.5 eggs", "0.5 onion"]));
        assert_eq!(scale_ingredients(&lines(&["5 g salt"]), 3, 2), lines(&["7.5 g salt"]));
    }

    #[test]
    fn test_every_number_in_a_line_is_scaled() {
        let items = lines(&["2-3 cloves garlic, 10 min"]);
        assert_eq!(
            scale_ingredients(&items, 4, 2),
            lines(&["4-6 cloves garlic, 20 min"])
        );
    }

    #[test]
    fn test_numberless_lines_pass_through() {
        let items = lines(&["a pinch of salt", ""]);
        assert_eq!(scale_ingredients(&items, 8, 2), items);
    }

    #[test]
    fn test_huge_whole_numbers_do_not_saturate() {
        let items = lines(&["10000000000000000000 grains rice"]);
        assert_eq!(
            scale_ingredients(&items, 4, 2),
            lines(&["20000000000000000000 grains rice"])
        );
    }
}
