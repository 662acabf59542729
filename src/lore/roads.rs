// src/lore/roads.rs
//! Планирование дорог между POI
//!
//! Дорога принимается, только если:
//! - оба конца — суша и не горы;
//! - такого неориентированного ребра ещё нет;
//! - концы ещё не связаны через уже спланированные дороги (без параллельных маршрутов);
//! - между концами есть путь по суше (дороги не пересекают пролив).
//!
//! Граф дорог хранится в `petgraph::graphmap::UnGraphMap`, связность проверяется по нему же.
//! Клетки сухопутного пути принятой дороги получают флаг `has_road`.

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::hex::Coord;
use crate::map::HexMap;
use crate::pathfinding::{Domain, find_path};

use super::poi::{Poi, PoiKind};

/// Конец дороги.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadEnd {
    pub q: i32,
    pub r: i32,
    #[serde(rename = "type")]
    pub kind: PoiKind,
}

impl RoadEnd {
    #[must_use]
    pub const fn coord(&self) -> Coord {
        Coord::new(self.q, self.r)
    }
}

impl From<&Poi> for RoadEnd {
    fn from(poi: &Poi) -> Self {
        Self {
            q: poi.q,
            r: poi.r,
            kind: poi.kind,
        }
    }
}

/// Спланированная дорога.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadPlan {
    pub from: RoadEnd,
    pub to: RoadEnd,
    pub faction: Option<String>,
    pub reason: String,
    pub year: u32,
}

/// Почему дорога не принята. Это штатный исход, а не ошибка.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadRejection {
    SameEndpoint,
    /// Конец в воде, в горах или вне карты
    InvalidAnchor,
    Duplicate,
    /// Концы уже связаны существующими дорогами
    AlreadyLinked,
    /// Нет пути по суше
    NotConnected,
}

#[derive(Debug, Clone, Default)]
pub struct RoadPlanner {
    plans: Vec<RoadPlan>,
    edges: HashSet<(Coord, Coord)>,
    graph: UnGraphMap<Coord, ()>,
}

impl RoadPlanner {
    #[must_use]
    pub fn plans(&self) -> &[RoadPlan] {
        &self.plans
    }

    #[must_use]
    pub fn into_plans(self) -> Vec<RoadPlan> {
        self.plans
    }

    /// Связаны ли две точки уже спланированными дорогами.
    #[must_use]
    pub fn linked(&self, a: Coord, b: Coord) -> bool {
        self.graph.contains_node(a)
            && self.graph.contains_node(b)
            && has_path_connecting(&self.graph, a, b, None)
    }

    /// Пытается спланировать дорогу; при успехе отмечает клетки пути на карте.
    pub fn plan_road(
        &mut self,
        map: &mut HexMap,
        from: RoadEnd,
        to: RoadEnd,
        faction: Option<String>,
        reason: &str,
        year: u32,
    ) -> Result<&RoadPlan, RoadRejection> {
        let (a, b) = (from.coord(), to.coord());
        if a == b {
            return Err(RoadRejection::SameEndpoint);
        }
        if !is_anchor(map, a) || !is_anchor(map, b) {
            return Err(RoadRejection::InvalidAnchor);
        }
        let key = if a <= b { (a, b) } else { (b, a) };
        if self.edges.contains(&key) {
            return Err(RoadRejection::Duplicate);
        }
        if self.linked(a, b) {
            return Err(RoadRejection::AlreadyLinked);
        }
        let path = find_path(map, a, b, Domain::Land).ok_or(RoadRejection::NotConnected)?;

        for coord in path {
            if let Some(tile) = map.get_mut(coord) {
                tile.has_road = true;
            }
        }
        self.edges.insert(key);
        self.graph.add_edge(a, b, ());
        self.plans.push(RoadPlan {
            from,
            to,
            faction,
            reason: reason.to_string(),
            year,
        });
        Ok(&self.plans[self.plans.len() - 1])
    }
}

fn is_anchor(map: &HexMap, c: Coord) -> bool {
    map.get(c).is_some_and(|t| !t.is_water() && !t.is_mountainish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TerrainType;

    fn end(q: i32, r: i32) -> RoadEnd {
        RoadEnd {
            q,
            r,
            kind: PoiKind::Settlement,
        }
    }

    /// Два острова, разделённые водой по столбцу 4.
    fn two_islands() -> HexMap {
        let mut map = HexMap::filled(9, 5, TerrainType::Grassland);
        for r in 0..5 {
            map.get_mut(Coord::new(4, r)).unwrap().terrain = TerrainType::Water;
        }
        map.get_mut(Coord::new(1, 4)).unwrap().terrain = TerrainType::Mountain;
        map
    }

    #[test]
    fn accepts_connected_road_and_marks_tiles() {
        let mut map = two_islands();
        let mut planner = RoadPlanner::default();
        let plan = planner
            .plan_road(&mut map, end(0, 0), end(3, 3), None, "trade", 5010)
            .unwrap();
        assert_eq!(plan.year, 5010);
        assert!(map.get(Coord::new(0, 0)).unwrap().has_road);
        assert!(map.get(Coord::new(3, 3)).unwrap().has_road);
        assert!(planner.linked(Coord::new(0, 0), Coord::new(3, 3)));
    }

    #[test]
    fn rejects_cross_island_road() {
        let mut map = two_islands();
        let mut planner = RoadPlanner::default();
        assert_eq!(
            planner.plan_road(&mut map, end(0, 0), end(8, 0), None, "trade", 1).unwrap_err(),
            RoadRejection::NotConnected
        );
        assert!(planner.plans().is_empty());
        assert!(!map.get(Coord::new(0, 0)).unwrap().has_road);
    }

    #[test]
    fn rejects_duplicates_in_either_direction() {
        let mut map = two_islands();
        let mut planner = RoadPlanner::default();
        planner.plan_road(&mut map, end(0, 0), end(2, 2), None, "trade", 1).unwrap();
        assert_eq!(
            planner.plan_road(&mut map, end(2, 2), end(0, 0), None, "patrol", 2).unwrap_err(),
            RoadRejection::Duplicate
        );
    }

    #[test]
    fn rejects_redundant_parallel_road() {
        let mut map = two_islands();
        let mut planner = RoadPlanner::default();
        planner.plan_road(&mut map, end(0, 0), end(2, 0), None, "trade", 1).unwrap();
        planner.plan_road(&mut map, end(2, 0), end(3, 3), None, "trade", 2).unwrap();
        assert_eq!(
            planner.plan_road(&mut map, end(0, 0), end(3, 3), None, "trade", 3).unwrap_err(),
            RoadRejection::AlreadyLinked
        );
        assert_eq!(planner.plans().len(), 2);
    }

    #[test]
    fn rejects_water_and_mountain_anchors() {
        let mut map = two_islands();
        let mut planner = RoadPlanner::default();
        assert_eq!(
            planner.plan_road(&mut map, end(4, 0), end(0, 0), None, "x", 1).unwrap_err(),
            RoadRejection::InvalidAnchor
        );
        assert_eq!(
            planner.plan_road(&mut map, end(1, 4), end(0, 0), None, "x", 1).unwrap_err(),
            RoadRejection::InvalidAnchor
        );
        assert_eq!(
            planner.plan_road(&mut map, end(0, 0), end(0, 0), None, "x", 1).unwrap_err(),
            RoadRejection::SameEndpoint
        );
    }
}
