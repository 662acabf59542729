// src/lore/poi.rs
//! Размещение точек интереса (POI)
//!
//! Выборка с отказами: случайный кандидат из отфильтрованного пула отклоняется, если
//! клетка занята, горная или ближе минимальной дистанции к уже стоящим POI. После
//! исчерпания попыток — линейный перебор пула: сначала с соблюдением дистанции,
//! затем первая свободная негорная клетка.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::hex::Coord;
use crate::map::HexMap;
use crate::rng::XorShift32;

use super::names;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    Settlement,
    Ruin,
    Mine,
    Watchtower,
    Shrine,
    RoadsideCamp,
    RaiderCamp,
    CrashSite,
    Wreck,
    Vehicle,
}

impl PoiKind {
    /// Может ли POI служить концом дороги.
    #[must_use]
    pub const fn is_road_anchor(self) -> bool {
        !matches!(self, PoiKind::Wreck | PoiKind::Vehicle | PoiKind::CrashSite)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poi {
    #[serde(rename = "type")]
    pub kind: PoiKind,
    pub q: i32,
    pub r: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
    /// Минимальная дистанция до ранее стоявших POI, соблюдённая при размещении (0 — без ограничения)
    #[serde(default)]
    pub spacing: u32,
}

impl Poi {
    #[must_use]
    pub fn new(kind: PoiKind, coord: Coord) -> Self {
        Self {
            kind,
            q: coord.q,
            r: coord.r,
            name: None,
            faction: None,
            spacing: 0,
        }
    }

    #[must_use]
    pub const fn coord(&self) -> Coord {
        Coord::new(self.q, self.r)
    }
}

/// Откуда брать кандидатов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatePool {
    /// Суша у воды
    Coast,
    /// Суша без водных соседей
    Inland,
    /// Лесная суша
    Forest,
    /// Возвышенности (высота ≥ 2)
    HighGround,
    AnyLand,
    /// Мелководье у берега
    ShallowCoast,
}

/// Индексы POI, поставленных этим проходом.
#[derive(Debug, Clone, Default)]
pub struct PlacedPois {
    pub first_settlement: Option<usize>,
    pub second_settlement: Option<usize>,
}

pub(crate) struct PoiPlacer<'a> {
    map: &'a mut HexMap,
    pois: &'a mut Vec<Poi>,
    no_poi: &'a BTreeSet<Coord>,
    tries: u32,
}

impl<'a> PoiPlacer<'a> {
    pub(crate) fn new(
        map: &'a mut HexMap,
        pois: &'a mut Vec<Poi>,
        no_poi: &'a BTreeSet<Coord>,
        tries: u32,
    ) -> Self {
        Self {
            map,
            pois,
            no_poi,
            tries,
        }
    }

    /// Полный порядок размещения для нового мира.
    pub(crate) fn place_all(&mut self, rng: &mut XorShift32, factions: &[String]) -> PlacedPois {
        let mut placed = PlacedPois::default();
        let primary = factions.first().cloned();
        let secondary = factions.get(1).cloned().or_else(|| primary.clone());

        placed.first_settlement = self.place_settlement(rng, 6, primary);
        if rng.chance(0.55) {
            placed.second_settlement = self.place_settlement(rng, 8, secondary);
        }

        let ruins = rng.range_inclusive(1, 2);
        for _ in 0..ruins {
            self.place(rng, PoiKind::Ruin, &[CandidatePool::Inland, CandidatePool::AnyLand], 3);
        }

        let optional = [
            (PoiKind::Mine, 0.5, [CandidatePool::HighGround, CandidatePool::AnyLand], 3),
            (PoiKind::Watchtower, 0.45, [CandidatePool::HighGround, CandidatePool::Coast], 3),
            (PoiKind::Shrine, 0.4, [CandidatePool::Forest, CandidatePool::Inland], 3),
            (PoiKind::RoadsideCamp, 0.45, [CandidatePool::Inland, CandidatePool::AnyLand], 2),
            (PoiKind::RaiderCamp, 0.35, [CandidatePool::Coast, CandidatePool::AnyLand], 3),
        ];
        for (kind, p, pools, spacing) in optional {
            if rng.chance(p) {
                self.place(rng, kind, &pools, spacing);
            }
        }

        let guaranteed = [
            (PoiKind::CrashSite, CandidatePool::AnyLand),
            (PoiKind::Vehicle, CandidatePool::Inland),
            (PoiKind::Wreck, CandidatePool::ShallowCoast),
        ];
        for (kind, pool) in guaranteed {
            if !self.pois.iter().any(|p| p.kind == kind) {
                let pools: &[CandidatePool] = if pool == CandidatePool::Inland {
                    &[CandidatePool::Inland, CandidatePool::AnyLand]
                } else {
                    &[pool]
                };
                self.place(rng, kind, pools, 2);
            }
        }

        placed
    }

    fn place_settlement(
        &mut self,
        rng: &mut XorShift32,
        spacing: u32,
        faction: Option<String>,
    ) -> Option<usize> {
        let name = names::settlement_name(rng);
        let idx = self.place(
            rng,
            PoiKind::Settlement,
            &[CandidatePool::Coast, CandidatePool::AnyLand],
            spacing,
        )?;
        let poi = &mut self.pois[idx];
        poi.name = Some(name.clone());
        poi.faction.clone_from(&faction);
        if let Some(tile) = self.map.get_mut(poi.coord()) {
            tile.city_name = Some(name);
            tile.owning_faction = faction;
        }
        Some(idx)
    }

    /// Ставит один POI из первого пула, где есть свободная клетка. Возвращает его индекс.
    pub(crate) fn place(
        &mut self,
        rng: &mut XorShift32,
        kind: PoiKind,
        pools: &[CandidatePool],
        spacing: u32,
    ) -> Option<usize> {
        for &pool in pools {
            let candidates = self.candidates(pool);
            if let Some(idx) = self.place_from(rng, kind, &candidates, spacing) {
                return Some(idx);
            }
        }
        debug!(?kind, "no free tile for poi");
        None
    }

    fn place_from(
        &mut self,
        rng: &mut XorShift32,
        kind: PoiKind,
        candidates: &[Coord],
        spacing: u32,
    ) -> Option<usize> {
        if !candidates.iter().any(|&c| self.is_free(c)) {
            return None;
        }

        for _ in 0..self.tries {
            let Some(&c) = rng.pick(candidates) else {
                break;
            };
            if self.is_free(c) && self.is_spaced(c, spacing) {
                return Some(self.accept(kind, c, spacing));
            }
        }

        if let Some(&c) = candidates
            .iter()
            .find(|&&c| self.is_free(c) && self.is_spaced(c, spacing))
        {
            return Some(self.accept(kind, c, spacing));
        }
        if let Some(&c) = candidates.iter().find(|&&c| self.is_free(c)) {
            debug!(?kind, %c, spacing, "placed without spacing");
            return Some(self.accept(kind, c, 0));
        }
        None
    }

    /// Кандидаты пула в порядке строк карты; горы и запрещённые клетки исключены.
    pub(crate) fn candidates(&self, pool: CandidatePool) -> Vec<Coord> {
        let map = &*self.map;
        map.tiles()
            .iter()
            .filter(|t| !t.is_mountainish() && !self.no_poi.contains(&t.coord()))
            .filter(|t| {
                let c = t.coord();
                match pool {
                    CandidatePool::ShallowCoast => map.is_shallow_coast(c),
                    _ if t.is_water() => false,
                    CandidatePool::Coast => map.is_coastal_land(c),
                    CandidatePool::Inland => !map.is_coastal_land(c),
                    CandidatePool::Forest => t.has_forest,
                    CandidatePool::HighGround => t.elevation >= 2,
                    CandidatePool::AnyLand => true,
                }
            })
            .map(|t| t.coord())
            .collect()
    }

    fn is_free(&self, c: Coord) -> bool {
        !self.pois.iter().any(|p| p.coord() == c)
            && self.map.get(c).is_some_and(|t| !t.is_mountainish())
    }

    fn is_spaced(&self, c: Coord, spacing: u32) -> bool {
        self.pois.iter().all(|p| p.coord().distance(c) >= spacing)
    }

    fn accept(&mut self, kind: PoiKind, c: Coord, spacing: u32) -> usize {
        if let Some(tile) = self.map.get_mut(c) {
            match kind {
                PoiKind::Ruin => tile.has_ruin = true,
                PoiKind::CrashSite => tile.has_crash_site = true,
                PoiKind::Vehicle => tile.has_vehicle = true,
                _ => {}
            }
        }
        let mut poi = Poi::new(kind, c);
        poi.spacing = spacing;
        self.pois.push(poi);
        self.pois.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TerrainType;

    /// Остров 12×12: кайма воды, суша внутри, горы в строке 6.
    fn island() -> HexMap {
        let mut map = HexMap::filled(12, 12, TerrainType::Water);
        for tile in map.tiles_mut() {
            if (1..11).contains(&tile.q) && (1..11).contains(&tile.r) {
                tile.terrain = TerrainType::Grassland;
                tile.elevation = if tile.r < 4 { 2 } else { 1 };
                tile.has_forest = tile.q > 7;
            }
            if tile.r == 6 && (3..6).contains(&tile.q) {
                tile.terrain = TerrainType::Mountain;
            }
        }
        map
    }

    #[test]
    fn placement_respects_spacing_and_exclusions() {
        let mut map = island();
        let mut pois = Vec::new();
        let no_poi = BTreeSet::from([Coord::new(5, 5), Coord::new(6, 5)]);
        let mut rng = XorShift32::for_purpose("placement", "test");
        let factions = vec!["A".to_string(), "B".to_string()];

        let mut placer = PoiPlacer::new(&mut map, &mut pois, &no_poi, 90);
        let placed = placer.place_all(&mut rng, &factions);
        assert!(placed.first_settlement.is_some());

        for (i, later) in pois.iter().enumerate() {
            let tile = map.get(later.coord()).unwrap();
            assert!(!tile.is_mountainish());
            assert!(!no_poi.contains(&later.coord()));
            for earlier in &pois[..i] {
                assert_ne!(earlier.coord(), later.coord());
                assert!(earlier.coord().distance(later.coord()) >= later.spacing);
            }
        }
        assert_eq!(pois[0].spacing, 6);
        assert_eq!(pois[0].kind, PoiKind::Settlement);
    }

    #[test]
    fn guaranteed_kinds_present_once() {
        let mut map = island();
        let mut pois = Vec::new();
        let no_poi = BTreeSet::new();
        let mut rng = XorShift32::for_purpose("guaranteed", "test");
        PoiPlacer::new(&mut map, &mut pois, &no_poi, 90).place_all(&mut rng, &["A".to_string()]);

        for kind in [PoiKind::CrashSite, PoiKind::Vehicle, PoiKind::Wreck] {
            assert_eq!(pois.iter().filter(|p| p.kind == kind).count(), 1, "{kind:?}");
        }
        let wreck = pois.iter().find(|p| p.kind == PoiKind::Wreck).unwrap();
        assert!(map.is_shallow_coast(wreck.coord()));
        let crash = pois.iter().find(|p| p.kind == PoiKind::CrashSite).unwrap();
        assert!(map.get(crash.coord()).unwrap().has_crash_site);
    }

    #[test]
    fn settlement_marks_tile() {
        let mut map = island();
        let mut pois = Vec::new();
        let no_poi = BTreeSet::new();
        let mut rng = XorShift32::for_purpose("settle", "test");
        let mut placer = PoiPlacer::new(&mut map, &mut pois, &no_poi, 90);
        let idx = placer.place_settlement(&mut rng, 6, Some("Tide Wardens".into())).unwrap();
        let coord = pois[idx].coord();
        let tile = map.get(coord).unwrap();
        assert_eq!(tile.owning_faction.as_deref(), Some("Tide Wardens"));
        assert_eq!(tile.city_name, pois[idx].name);
        assert!(map.is_coastal_land(coord));
    }

    #[test]
    fn falls_back_when_spacing_impossible() {
        let mut map = HexMap::filled(3, 1, TerrainType::Grassland);
        let mut pois = vec![Poi::new(PoiKind::Ruin, Coord::new(0, 0))];
        let no_poi = BTreeSet::new();
        let mut rng = XorShift32::for_purpose("tight", "test");
        let mut placer = PoiPlacer::new(&mut map, &mut pois, &no_poi, 5);
        let idx = placer
            .place(&mut rng, PoiKind::Mine, &[CandidatePool::AnyLand], 6)
            .unwrap();
        assert_eq!(pois[idx].coord(), Coord::new(1, 0));
        assert_eq!(pois[idx].spacing, 0);
    }

    #[test]
    fn occupied_inland_falls_through_to_any_land() {
        let mut map = HexMap::filled(5, 5, TerrainType::Water);
        for tile in map.tiles_mut() {
            if (1..4).contains(&tile.q) && (1..4).contains(&tile.r) {
                tile.terrain = TerrainType::Grassland;
            }
        }
        let mut pois = vec![Poi::new(PoiKind::Ruin, Coord::new(2, 2))];
        let no_poi = BTreeSet::new();
        let mut rng = XorShift32::for_purpose("crowded", "test");
        let mut placer = PoiPlacer::new(&mut map, &mut pois, &no_poi, 20);
        assert_eq!(placer.candidates(CandidatePool::Inland), vec![Coord::new(2, 2)]);

        let idx = placer
            .place(
                &mut rng,
                PoiKind::Vehicle,
                &[CandidatePool::Inland, CandidatePool::AnyLand],
                2,
            )
            .unwrap();
        let coord = pois[idx].coord();
        assert_eq!(pois[idx].kind, PoiKind::Vehicle);
        assert_ne!(coord, Coord::new(2, 2));
        assert!(map.get(coord).unwrap().has_vehicle);
        assert_eq!(pois.iter().filter(|p| p.kind == PoiKind::Vehicle).count(), 1);
    }

    #[test]
    fn no_candidates_means_no_poi() {
        let mut map = HexMap::filled(4, 4, TerrainType::Ocean);
        let mut pois = Vec::new();
        let no_poi = BTreeSet::new();
        let mut rng = XorShift32::for_purpose("empty", "test");
        let mut placer = PoiPlacer::new(&mut map, &mut pois, &no_poi, 90);
        assert!(placer.place(&mut rng, PoiKind::Shrine, &[CandidatePool::AnyLand], 3).is_none());
        assert!(pois.is_empty());
    }
}
