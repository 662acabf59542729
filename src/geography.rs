// src/geography.rs
//! Крупный географический ориентир острова
//!
//! На каждый мир ставится ровно один ориентир (вулкан, ледник, плато, пустыня, топь).
//! Его площадь находится заливкой в ширину от центра по тайлам, подходящим под тип
//! ориентира, пока не набрано нужное число клеток или фронт не исчерпан.
//! Найденные клетки переписываются (тип, высота, декорации) и попадают в множество,
//! где летопись не ставит POI.
//!
//! Подсветка контура пересчитывается из текущего состояния тайлов: хранится только
//! список клеток площади.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::{debug, info, warn};

use crate::config::LandmarkSpec;
use crate::hex::{Coord, Direction};
use crate::host::WorldHost;
use crate::map::HexMap;
use crate::tile::{TerrainType, Tile};
use crate::world::WorldMeta;

/// Тип ориентира.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkKind {
    Volcano,
    Glacier,
    Plateau,
    Desert,
    Bog,
}

impl LandmarkKind {
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            LandmarkKind::Volcano => "🌋",
            LandmarkKind::Glacier => "🧊",
            LandmarkKind::Plateau => "⛰️",
            LandmarkKind::Desert => "🏜️",
            LandmarkKind::Bog => "🐸",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            LandmarkKind::Volcano => "Volcano",
            LandmarkKind::Glacier => "Glacier",
            LandmarkKind::Plateau => "Plateau",
            LandmarkKind::Desert => "Desert",
            LandmarkKind::Bog => "Bog",
        }
    }

    /// Целевой размер площади.
    #[must_use]
    pub const fn target_cells(self) -> usize {
        match self {
            LandmarkKind::Plateau => 6,
            _ => 9,
        }
    }

    /// Годится ли тайл в центр ориентира.
    fn accepts_center(self, tile: &Tile) -> bool {
        match self {
            LandmarkKind::Volcano => tile.is_mountainish(),
            _ => !tile.is_water() && !tile.is_mountainish(),
        }
    }

    /// Годится ли тайл в площадь ориентира.
    fn accepts_cell(self, tile: &Tile) -> bool {
        match self {
            LandmarkKind::Volcano | LandmarkKind::Glacier => !tile.is_water(),
            _ => !tile.is_water() && !tile.is_mountainish(),
        }
    }

    /// Сохранил ли тайл облик ориентира (для подсветки).
    fn still_matches(self, tile: &Tile) -> bool {
        match self {
            LandmarkKind::Volcano => {
                matches!(tile.terrain, TerrainType::Ash | TerrainType::Volcano)
            }
            LandmarkKind::Glacier => tile.terrain == TerrainType::Ice,
            LandmarkKind::Plateau => tile.terrain == TerrainType::Grassland && tile.elevation == 3,
            LandmarkKind::Desert => tile.terrain == TerrainType::Sand,
            LandmarkKind::Bog => tile.terrain == TerrainType::Swamp,
        }
    }

    /// Переписывает клетку площади.
    fn stamp(self, tile: &mut Tile, is_center: bool) {
        match self {
            LandmarkKind::Volcano if is_center => {
                tile.terrain = TerrainType::Volcano;
                tile.elevation = 4;
            }
            LandmarkKind::Volcano => {
                tile.terrain = TerrainType::Ash;
                tile.elevation = tile.elevation.clamp(1, 3);
            }
            LandmarkKind::Glacier => {
                tile.terrain = TerrainType::Ice;
                tile.elevation = tile.elevation.max(1);
            }
            LandmarkKind::Plateau => {
                tile.terrain = TerrainType::Grassland;
                tile.elevation = 3;
            }
            LandmarkKind::Desert => {
                tile.terrain = TerrainType::Sand;
                tile.elevation = tile.elevation.max(1);
            }
            LandmarkKind::Bog => {
                tile.terrain = TerrainType::Swamp;
                tile.elevation = 1;
            }
        }
        tile.has_mountain_icon = tile.terrain.is_mountainish();
        tile.clear_decorations();
    }
}

/// Ориентир мира.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmark {
    #[serde(rename = "type")]
    pub kind: LandmarkKind,
    pub q: i32,
    pub r: i32,
    pub emoji: String,
    pub label: String,
}

impl Landmark {
    #[must_use]
    pub fn new(kind: LandmarkKind, center: Coord) -> Self {
        Self {
            kind,
            q: center.q,
            r: center.r,
            emoji: kind.emoji().to_string(),
            label: kind.label().to_string(),
        }
    }

    #[must_use]
    pub const fn center(&self) -> Coord {
        Coord::new(self.q, self.r)
    }
}

/// Ставит ориентир один раз на мир; повторные вызовы ничего не делают.
///
/// Возвращает `true`, если ориентир был поставлен этим вызовом. Если центр найти не удалось,
/// мир остаётся без ориентира (флаг всё равно взводится).
pub fn init_or_update_geography(
    map: &mut HexMap,
    meta: &mut WorldMeta,
    spec: &LandmarkSpec,
    host: &mut dyn WorldHost,
) -> bool {
    if meta.geography_built {
        return false;
    }
    meta.geography_built = true;

    let kind = spec.kind;
    let Some(center) = resolve_center(map, spec) else {
        debug!(?kind, "no center tile for landmark, skipping");
        return false;
    };

    let cells = flood_fill(map, center, kind.target_cells(), |t| kind.accepts_cell(t));
    for &cell in &cells {
        if let Some(tile) = map.get_mut(cell) {
            kind.stamp(tile, cell == center);
            host.draw_tile(tile);
        }
    }

    info!(?kind, %center, cells = cells.len(), "landmark placed");
    meta.no_poi.extend(cells.iter().copied());
    meta.landmark = Some(Landmark::new(kind, center));
    meta.landmark_cells = cells;
    host.redraw_world();
    true
}

fn resolve_center(map: &HexMap, spec: &LandmarkSpec) -> Option<Coord> {
    let kind = spec.kind;
    if let (Some(q), Some(r)) = (spec.q, spec.r) {
        let explicit = Coord::new(q, r);
        match map.get(explicit) {
            Some(tile) if kind.accepts_cell(tile) => return Some(explicit),
            _ => warn!(%explicit, ?kind, "explicit landmark center unusable, searching instead"),
        }
    }
    map.nearest_to_land_centroid(|t| kind.accepts_center(t))
}

/// Заливка в ширину от `start` по тайлам, удовлетворяющим предикату.
///
/// Стартовая клетка входит в результат всегда; обход соседей — в порядке направлений.
pub fn flood_fill<P>(map: &HexMap, start: Coord, limit: usize, predicate: P) -> Vec<Coord>
where
    P: Fn(&Tile) -> bool,
{
    let mut cells = vec![start];
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in map.neighbors(current) {
            if cells.len() >= limit {
                return cells;
            }
            if !visited.insert(next) {
                continue;
            }
            if map.get(next).is_some_and(&predicate) {
                cells.push(next);
                queue.push_back(next);
            }
        }
    }
    cells.truncate(limit.max(1));
    cells
}

/// Клетки площади, которые всё ещё выглядят как ориентир.
#[must_use]
pub fn compute_highlight_cells(map: &HexMap, meta: &WorldMeta) -> Vec<Coord> {
    let Some(landmark) = &meta.landmark else {
        return Vec::new();
    };
    meta.landmark_cells
        .iter()
        .copied()
        .filter(|&c| map.get(c).is_some_and(|t| landmark.kind.still_matches(t)))
        .collect()
}

/// Рёбра контура подсветки: клетка и направление, в котором сосед не подсвечен.
#[must_use]
pub fn highlight_outline(map: &HexMap, meta: &WorldMeta) -> Vec<(Coord, Direction)> {
    let cells = compute_highlight_cells(map, meta);
    let set: HashSet<Coord> = cells.iter().copied().collect();
    let set = &set;
    cells
        .iter()
        .flat_map(|&c| {
            Direction::ALL
                .into_iter()
                .filter(move |&d| !set.contains(&c.neighbor(d)))
                .map(move |d| (c, d))
        })
        .collect()
}

/// Клетки, где запрещено ставить POI.
#[must_use]
pub fn no_poi_set(meta: &WorldMeta) -> &BTreeSet<Coord> {
    &meta.no_poi
}
