//! Category color assignment
//!
//! Fixed mode pairs the i-th selected category with the i-th color. Random
//! mode first shuffles the colors with a constant seed, so a given selection
//! always gets the same colors, in this run and the next.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::BTreeMap;

use crate::settings::PaletteMode;

/// Seed for the Random palette shuffle
pub const PALETTE_SEED: u64 = 42;

/// Category -> color
pub type ColorMap = BTreeMap<String, String>;

/// Assign a color to each selected category.
///
/// Selections longer than the palette reuse colors from the start.
pub fn resolve(categories: &[String], mode: PaletteMode, colors: &[String]) -> ColorMap {
    if colors.is_empty() {
        tracing::warn!("Empty palette, no colors assigned");
        return ColorMap::new();
    }
    if categories.len() > colors.len() {
        tracing::warn!(
            "{} categories for {} palette colors, cycling colors",
            categories.len(),
            colors.len()
        );
    }

    let ordered = match mode {
        PaletteMode::Fixed => colors.to_vec(),
        PaletteMode::Random => shuffled(colors),
    };

    categories
        .iter()
        .zip(ordered.iter().cycle())
        .map(|(category, color)| (category.clone(), color.clone()))
        .collect()
}

fn shuffled(colors: &[String]) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(PALETTE_SEED);
    let mut out = colors.to_vec();
    out.shuffle(&mut rng);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::default_palette;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fixed_mode_follows_selection_order() {
        let colors = default_palette();
        let map = resolve(&names(&["A", "B", "C"]), PaletteMode::Fixed, &colors);

        assert_eq!(map.len(), 3);
        assert_eq!(map["A"], colors[0]);
        assert_eq!(map["B"], colors[1]);
        assert_eq!(map["C"], colors[2]);
    }

    #[test]
    fn test_random_mode_is_deterministic() {
        let colors = default_palette();
        let selection = names(&["Japan", "Chile", "Kenya", "Peru", "Spain"]);

        let first = resolve(&selection, PaletteMode::Random, &colors);
        let second = resolve(&selection, PaletteMode::Random, &colors);

        assert_eq!(first, second);
    }

    #[test]
    fn test_random_mode_uses_each_color_once() {
        let colors = default_palette();
        let selection = names(&["a", "b", "c", "d", "e"]);

        let map = resolve(&selection, PaletteMode::Random, &colors);

        let mut used: Vec<_> = map.values().cloned().collect();
        used.sort();
        let mut expected = colors.clone();
        expected.sort();
        assert_eq!(used, expected);
    }

    #[test]
    fn test_overflow_cycles_colors() {
        let colors = names(&["#000000", "#ffffff"]);
        let map = resolve(&names(&["a", "b", "c"]), PaletteMode::Fixed, &colors);
        assert_eq!(map["c"], "#000000");
    }

    #[test]
    fn test_empty_selection_is_empty_map() {
        assert!(resolve(&[], PaletteMode::Fixed, &default_palette()).is_empty());
    }
}
