//! Банки слов для названий острова, фракций и поселений

use crate::rng::XorShift32;

const ISLAND_PREFIXES: &[&str] = &[
    "Ash", "Storm", "Salt", "Iron", "Gull", "Ember", "Mist", "Thorn", "Grey", "Wreck",
];

const ISLAND_ROOTS: &[&str] = &[
    "hold", "reach", "mere", "fall", "haven", "isle", "crag", "wick", "moor", "spire",
];

const FACTIONS: &[&str] = &[
    "Tide Wardens",
    "Rust Covenant",
    "Saltborn Clans",
    "Lantern Guild",
    "Drowned Choir",
    "Ironroot Kin",
    "Gullwing League",
    "Ember Compact",
];

const SETTLEMENT_ROOTS: &[&str] = &[
    "Brine", "Cinder", "Kelp", "Harrow", "Low", "Copper", "Driftwood", "Anchor", "Gale", "Rook",
];

const SETTLEMENT_SUFFIXES: &[&str] = &[
    "port", "stead", "watch", "ford", "cove", "town", "landing", "rest",
];

pub(crate) const ROAD_REASONS: &[&str] = &["trade", "pilgrimage", "patrol", "supply"];

pub(crate) const GLOBAL_EVENTS: &[&str] = &[
    "A great storm season batters the coasts",
    "A red comet hangs over the sea for a whole winter",
    "A blight withers the island's crops",
    "The tides run strangely high for a generation",
    "Ash from a distant eruption darkens the sky",
];

pub(crate) const FILLER_EVENTS: &[&str] = &[
    "Quiet years pass",
    "The island keeps its secrets for a time",
    "Little is remembered of these years",
];

pub(crate) fn pick(rng: &mut XorShift32, pool: &[&'static str]) -> &'static str {
    rng.pick(pool).copied().unwrap_or("Nameless")
}

/// Название острова: приставка + корень.
pub(crate) fn island_name(rng: &mut XorShift32) -> String {
    let prefix = pick(rng, ISLAND_PREFIXES);
    let root = pick(rng, ISLAND_ROOTS);
    format!("{prefix}{root}")
}

/// Одна или две разные фракции (две — с вероятностью 80%).
pub(crate) fn factions(rng: &mut XorShift32) -> Vec<String> {
    let first = rng.range(0, FACTIONS.len());
    let mut result = vec![FACTIONS[first].to_string()];
    if rng.chance(0.8) {
        // Сдвиг на 1..len гарантирует другую фракцию
        let offset = rng.range(1, FACTIONS.len());
        result.push(FACTIONS[(first + offset) % FACTIONS.len()].to_string());
    }
    result
}

pub(crate) fn settlement_name(rng: &mut XorShift32) -> String {
    let root = pick(rng, SETTLEMENT_ROOTS);
    let suffix = pick(rng, SETTLEMENT_SUFFIXES);
    format!("{root}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factions_are_distinct() {
        let mut rng = XorShift32::for_purpose("names", "test");
        let mut pairs = 0;
        for _ in 0..500 {
            let f = factions(&mut rng);
            assert!((1..=2).contains(&f.len()));
            if f.len() == 2 {
                assert_ne!(f[0], f[1]);
                pairs += 1;
            }
        }
        // ~80% пар
        assert!((300..480).contains(&pairs), "{pairs}");
    }

    #[test]
    fn island_names_are_compound() {
        let mut rng = XorShift32::for_purpose("names", "island");
        let name = island_name(&mut rng);
        assert!(ISLAND_PREFIXES.iter().any(|p| name.starts_with(p)));
        assert!(ISLAND_ROOTS.iter().any(|r| name.ends_with(r)));
    }
}
