// src/lore/mod.rs
//! Летопись острова
//!
//! Один раз на мир по сиду строится история: открытие острова фракцией, крушения и руины,
//! войны, бедствия, дороги, находки. Попутно на карту ставятся POI (поселения, руины,
//! шахты, лагеря, места крушений) и планируются дороги между ними.
//!
//! ## Этапы
//!
//! 1. **Анализ ресурсов** — доли воды/леса/гор и число рыбных и нефтяных клеток.
//!    Влияют только на текст событий, но не на логику.
//! 2. **Имена** — название острова и 1–2 фракции.
//! 3. **POI** — выборка с отказами и ограниченным числом попыток ([`poi`]).
//! 4. **Хронология** — главные события вперемешку с парами второстепенных ([`timeline`]).
//! 5. **Дороги** — только между связанными по суше точками, без дублей и параллельных
//!    маршрутов ([`roads`]).
//! 6. **Фиксация** — сортировка по году и отправка записей хосту.
//!
//! Повторные вызовы ничего не делают: результат кешируется в [`WorldMeta`].

mod names;
pub mod poi;
pub mod roads;
pub mod timeline;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::hex::Coord;
use crate::host::WorldHost;
use crate::map::HexMap;
use crate::rng::XorShift32;
use crate::tile::{TerrainType, Tile, TileResource};
use crate::world::{WorldMeta, WorldState};

pub use poi::{Poi, PoiKind};
pub use roads::{RoadEnd, RoadPlan, RoadPlanner, RoadRejection};
pub use timeline::EventKind;

/// Тег потока случайности летописи.
pub const LORE_STREAM_TAG: &str = "worldLoreV8";

/// Запись летописи.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub year: u32,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub island_name: String,
    pub factions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Coord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Coord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
}

impl HistoryEntry {
    #[must_use]
    pub fn coord(&self) -> Option<Coord> {
        Some(Coord::new(self.q?, self.r?))
    }
}

/// Сводка по ресурсам острова (только для текста событий).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceAnalysis {
    pub water_ratio: f32,
    /// Доля леса среди суши
    pub forest_ratio: f32,
    /// Доля гор среди суши
    pub mountain_ratio: f32,
    pub fish: usize,
    pub oil: usize,
    pub known_pois: usize,
}

impl ResourceAnalysis {
    #[must_use]
    pub fn scan(map: &HexMap, pois: &[Poi]) -> Self {
        let tiles = map.tiles();
        let land: Vec<&Tile> = tiles.iter().filter(|t| !t.is_water()).collect();
        let ratio = |count: usize, of: usize| if of == 0 { 0.0 } else { count as f32 / of as f32 };
        let count_resource =
            |kind: TileResource| tiles.iter().filter(|t| t.resource_type == Some(kind)).count();

        Self {
            water_ratio: ratio(tiles.len() - land.len(), tiles.len()),
            forest_ratio: ratio(land.iter().filter(|t| t.has_forest).count(), land.len()),
            mountain_ratio: ratio(
                land.iter()
                    .filter(|t| matches!(t.terrain, TerrainType::Mountain | TerrainType::Volcano))
                    .count(),
                land.len(),
            ),
            fish: count_resource(TileResource::Fish),
            oil: count_resource(TileResource::Oil),
            known_pois: pois.len(),
        }
    }

    /// Чем остров привлёк первых поселенцев.
    #[must_use]
    pub fn lure(&self) -> &'static str {
        if self.fish >= 3 {
            "rich fishing grounds"
        } else if self.forest_ratio > 0.3 {
            "deep forests"
        } else if self.mountain_ratio > 0.15 {
            "ore-veined peaks"
        } else if self.oil > 0 {
            "black slicks on the water"
        } else {
            "a sheltered shore"
        }
    }
}

/// Закешированный результат генерации.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoreCache {
    pub island_name: String,
    pub factions: Vec<String>,
    pub analysis: ResourceAnalysis,
    pub roads: Vec<RoadPlan>,
    /// Записи в порядке возрастания года
    pub history: Vec<HistoryEntry>,
}

/// Генерирует летопись мира, если она ещё не построена.
///
/// Возвращает `true`, если генерация выполнена этим вызовом.
pub fn ensure_world_lore_generated(world: &mut WorldState, host: &mut dyn WorldHost) -> bool {
    if world.meta.lore_built {
        return false;
    }
    world.meta.lore_built = true;

    let cache = generate_lore(
        &mut world.map,
        &world.meta,
        &mut world.pois,
        &world.params.seed,
        &world.params.lore,
    );

    for entry in &cache.history {
        host.emit_history_entry(entry);
    }
    for plan in &cache.roads {
        for coord in [plan.from.coord(), plan.to.coord()] {
            if let Some(tile) = world.map.get(coord) {
                host.draw_tile(tile);
            }
        }
    }
    host.redraw_world();

    info!(
        island = %cache.island_name,
        events = cache.history.len(),
        pois = world.pois.len(),
        roads = cache.roads.len(),
        "world lore generated"
    );
    world.meta.lore = Some(cache);
    true
}

/// Точка входа для руин: гарантирует, что летопись построена.
pub fn generate_ruin_lore_for_tile(
    world: &mut WorldState,
    _tile: Coord,
    host: &mut dyn WorldHost,
) -> bool {
    ensure_world_lore_generated(world, host)
}

/// Точка входа для дорог: гарантирует, что летопись построена.
pub fn generate_road_lore_for_existing_connections(
    world: &mut WorldState,
    host: &mut dyn WorldHost,
) -> bool {
    ensure_world_lore_generated(world, host)
}

/// Чистая генерация: мутирует карту и список POI, возвращает кеш летописи.
pub fn generate_lore(
    map: &mut HexMap,
    meta: &WorldMeta,
    pois: &mut Vec<Poi>,
    seed: &str,
    settings: &crate::config::LoreSettings,
) -> LoreCache {
    let mut rng = XorShift32::for_purpose(seed, LORE_STREAM_TAG);

    let analysis = ResourceAnalysis::scan(map, pois);
    let island_name = names::island_name(&mut rng);
    let factions = names::factions(&mut rng);

    let mut placer = poi::PoiPlacer::new(map, pois, &meta.no_poi, settings.poi_tries);
    let placed = placer.place_all(&mut rng, &factions);

    let mut builder = timeline::TimelineBuilder {
        map,
        pois,
        placed,
        landmark: meta.landmark.as_ref(),
        settings,
        rng,
        island_name: island_name.clone(),
        factions: factions.clone(),
        analysis,
        roads: RoadPlanner::default(),
        events: Vec::new(),
        year: settings.base_year,
        narrated: Default::default(),
        war_happened: false,
        truce_happened: false,
    };
    builder.build();
    let (mut history, roads) = builder.finish();

    // Стабильная сортировка: при равных годах сохраняется порядок вставки
    history.sort_by_key(|e| e.year);

    LoreCache {
        island_name,
        factions,
        analysis,
        roads: roads.into_plans(),
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldGenerationParams;
    use crate::host::RecordingHost;

    fn small_island() -> HexMap {
        let mut map = HexMap::filled(12, 12, TerrainType::Sea);
        for tile in map.tiles_mut() {
            if (2..10).contains(&tile.q) && (2..10).contains(&tile.r) {
                tile.terrain = TerrainType::Grassland;
                tile.has_forest = tile.q < 4;
            }
        }
        map.get_mut(Coord::new(1, 1)).unwrap().resource_type = Some(TileResource::Fish);
        map.get_mut(Coord::new(5, 5)).unwrap().terrain = TerrainType::Mountain;
        map
    }

    #[test]
    fn scan_counts_shares_of_land() {
        let analysis = ResourceAnalysis::scan(&small_island(), &[]);
        assert_eq!(analysis.fish, 1);
        assert_eq!(analysis.oil, 0);
        assert!((analysis.water_ratio - 80.0 / 144.0).abs() < 1e-6);
        assert!((analysis.forest_ratio - 16.0 / 64.0).abs() < 1e-6);
        assert!((analysis.mountain_ratio - 1.0 / 64.0).abs() < 1e-6);
        assert_eq!(analysis.lure(), "a sheltered shore");
    }

    #[test]
    fn ruin_entry_point_builds_lore_once() {
        let params = WorldGenerationParams::with_seed("ruins");
        let mut world = WorldState::new(params, small_island());
        let mut host = RecordingHost::default();

        assert!(generate_ruin_lore_for_tile(&mut world, Coord::new(4, 4), &mut host));
        let emitted = host.history.len();
        assert!(emitted > 0);
        assert!(host.redraws >= 1);

        assert!(!generate_ruin_lore_for_tile(&mut world, Coord::new(6, 6), &mut host));
        assert_eq!(host.history.len(), emitted);

        let history = &world.meta.lore.as_ref().unwrap().history;
        assert!(history.windows(2).all(|w| w[0].year <= w[1].year));
    }
}
