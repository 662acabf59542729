// src/buildings.rs
//! Постройки игрока
//!
//! Размещение проверяет стоимость и правила клетки до любых изменений: отказ
//! оставляет мир нетронутым. Снос здания не уничтожает перевозчиков, а только
//! отвязывает их (ссылка на доки становится `None`).

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::carriers::{CarrierId, Hauler, Ship};
use crate::config::BuildingCosts;
use crate::error::PlacementError;
use crate::hex::Coord;
use crate::host::WorldHost;
use crate::map::HexMap;
use crate::resources::{Resource, Stock};
use crate::world::WorldState;

pub type BuildingId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Docks,
    Mine,
    Factory,
    Bunker,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Docks,
        BuildingKind::Mine,
        BuildingKind::Factory,
        BuildingKind::Bunker,
    ];

    #[must_use]
    pub const fn cost(self, costs: &BuildingCosts) -> Stock {
        match self {
            BuildingKind::Docks => costs.docks,
            BuildingKind::Mine => costs.mine,
            BuildingKind::Factory => costs.factory,
            BuildingKind::Bunker => costs.bunker,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BuildingKind::Docks => "docks",
            BuildingKind::Mine => "mine",
            BuildingKind::Factory => "factory",
            BuildingKind::Bunker => "bunker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: BuildingId,
    #[serde(rename = "type")]
    pub kind: BuildingKind,
    pub q: i32,
    pub r: i32,
    /// Склад; каждый ресурс ограничен `storage_cap`
    #[serde(default)]
    pub storage: Stock,
    /// Цель промысла (только у доков)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Coord>,
}

impl Building {
    #[must_use]
    pub fn new(id: BuildingId, kind: BuildingKind, coord: Coord) -> Self {
        Self {
            id,
            kind,
            q: coord.q,
            r: coord.r,
            storage: Stock::default(),
            route: None,
        }
    }

    #[must_use]
    pub const fn coord(&self) -> Coord {
        Coord::new(self.q, self.r)
    }

    #[must_use]
    pub fn is_docks(&self) -> bool {
        self.kind == BuildingKind::Docks
    }
}

/// Причал доков: первый водный сосед в порядке направлений.
#[must_use]
pub fn berth(map: &HexMap, docks: Coord) -> Option<Coord> {
    map.neighbors(docks).find(|&n| map.is_water(n))
}

/// Проверка правил клетки для постройки (без учёта стоимости).
pub fn validate_placement(
    world: &WorldState,
    kind: BuildingKind,
    coord: Coord,
) -> Result<(), PlacementError> {
    let map = &world.map;
    let tile = map.get(coord).ok_or(PlacementError::UnknownTile(coord))?;
    if world.building_at(coord).is_some() {
        return Err(PlacementError::Occupied(coord));
    }
    let reject = |reason| Err(PlacementError::InvalidTerrain { kind, coord, reason });

    if tile.is_water() {
        return reject("tile is water");
    }
    match kind {
        BuildingKind::Mine => {
            let near_rock = tile.is_mountainish()
                || map
                    .neighbors(coord)
                    .any(|n| map.get(n).is_some_and(|t| t.is_mountainish()));
            if !near_rock {
                return reject("mine needs a mountain on or next to its tile");
            }
        }
        _ if tile.is_mountainish() => return reject("tile is mountainous"),
        BuildingKind::Docks if berth(map, coord).is_none() => {
            return reject("docks need a water neighbour");
        }
        _ => {}
    }
    Ok(())
}

/// Ставит здание на указанный гекс, гекс выбранного юнита или гекс базы.
pub fn start_building_placement(
    world: &mut WorldState,
    kind: BuildingKind,
    hex_override: Option<Coord>,
    host: &mut dyn WorldHost,
) -> Result<BuildingId, PlacementError> {
    let coord = hex_override
        .or_else(|| host.selected_unit().and_then(|u| world.unit_position(u)))
        .unwrap_or_else(|| world.base.coord());

    let cost = kind.cost(&world.params.economy.building_costs);
    if let Err(err) = validate_placement(world, kind, coord) {
        warn!(%err, "building placement rejected");
        return Err(err);
    }
    charge(world, kind.as_str(), &cost, host)?;

    let id = world.allocate_building_id();
    world.buildings.push(Building::new(id, kind, coord));
    if let Some(tile) = world.map.get(coord) {
        host.draw_tile(tile);
    }
    info!(id, ?kind, %coord, "building placed");
    Ok(id)
}

/// Списывает стоимость с пула игрока или отказывает, ничего не меняя.
fn charge(
    world: &mut WorldState,
    what: &str,
    cost: &Stock,
    host: &mut dyn WorldHost,
) -> Result<(), PlacementError> {
    if !world.resources.try_spend(cost) {
        let err = PlacementError::CannotAfford {
            what: what.to_string(),
            cost: *cost,
            available: world.resources,
        };
        warn!(%err, "purchase rejected");
        return Err(err);
    }
    host.resources_changed(&world.resources);
    Ok(())
}

/// Сносит здание и отвязывает всех перевозчиков, которые на него ссылались.
pub fn destroy_building(
    world: &mut WorldState,
    id: BuildingId,
    host: &mut dyn WorldHost,
) -> Option<Building> {
    let Some(index) = world.buildings.iter().position(|b| b.id == id) else {
        warn!(id, "destroy: no such building");
        return None;
    };
    let building = world.buildings.remove(index);

    for ship in world.ships.iter_mut().filter(|s| s.docks_id == Some(id)) {
        ship.docks_id = None;
        debug!(ship = ship.id, "ship unbound from destroyed docks");
    }
    for hauler in world.haulers.iter_mut().filter(|h| h.target_docks_id == Some(id)) {
        hauler.target_docks_id = None;
        debug!(hauler = hauler.id, "hauler unbound from destroyed docks");
    }
    if let Some(tile) = world.map.get(building.coord()) {
        host.draw_tile(tile);
    }
    info!(id, kind = ?building.kind, "building destroyed");
    Some(building)
}

/// Производство зданий за ход.
pub fn apply_building_production_on_end_turn(world: &mut WorldState) {
    let cap = world.params.economy.storage_cap;
    for building in &mut world.buildings {
        let storage = &mut building.storage;
        match building.kind {
            BuildingKind::Docks => {}
            BuildingKind::Mine => add_capped(storage, Resource::Scrap, 1, cap),
            BuildingKind::Factory => {
                if storage.scrap >= 2 && storage.money < cap {
                    storage.scrap -= 2;
                    add_capped(storage, Resource::Money, 1, cap);
                }
            }
            BuildingKind::Bunker => add_capped(storage, Resource::Influence, 1, cap),
        }
    }
}

fn add_capped(storage: &mut Stock, resource: Resource, amount: u32, cap: u32) {
    let slot = storage.get_mut(resource);
    *slot = slot.saturating_add(amount).min(cap);
}

fn docks(world: &WorldState, id: BuildingId) -> Result<&Building, PlacementError> {
    let building = world.building(id).ok_or(PlacementError::UnknownBuilding(id))?;
    if !building.is_docks() {
        return Err(PlacementError::NotDocks(id));
    }
    Ok(building)
}

/// Строит корабль у причала доков.
pub fn build_ship(
    world: &mut WorldState,
    docks_id: BuildingId,
    host: &mut dyn WorldHost,
) -> Result<CarrierId, PlacementError> {
    let docks_coord = docks(world, docks_id)?.coord();
    let spawn = berth(&world.map, docks_coord).ok_or(PlacementError::NoBerth(docks_id))?;
    let cost = world.params.economy.ship_cost;
    charge(world, "ship", &cost, host)?;

    let id = world.allocate_carrier_id();
    let ship = Ship::new(id, spawn, docks_id, world.params.economy.ship_move_points);
    world.ships.push(ship);
    info!(id, docks = docks_id, %spawn, "ship built");
    Ok(id)
}

/// Строит тягач на клетке доков.
pub fn build_hauler(
    world: &mut WorldState,
    docks_id: BuildingId,
    host: &mut dyn WorldHost,
) -> Result<CarrierId, PlacementError> {
    let spawn = docks(world, docks_id)?.coord();
    let cost = world.params.economy.hauler_cost;
    charge(world, "hauler", &cost, host)?;

    let id = world.allocate_carrier_id();
    let hauler = Hauler::new(id, spawn, docks_id, world.params.economy.hauler_move_points);
    world.haulers.push(hauler);
    info!(id, docks = docks_id, %spawn, "hauler built");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldGenerationParams;
    use crate::host::{NoopHost, RecordingHost, SelectedUnit};
    use crate::tile::TerrainType;

    /// Суша 6×6, вода в столбце 0, гора в (4, 4).
    fn world() -> WorldState {
        let mut map = HexMap::filled(6, 6, TerrainType::Grassland);
        for r in 0..6 {
            map.get_mut(Coord::new(0, r)).unwrap().terrain = TerrainType::Water;
        }
        map.get_mut(Coord::new(4, 4)).unwrap().terrain = TerrainType::Mountain;
        let mut params = WorldGenerationParams::with_seed("buildings");
        params.economy.starting = Stock::new(10, 40, 20, 5);
        WorldState::new(params, map)
    }

    #[test]
    fn placement_rules() {
        let mut w = world();
        let host = &mut NoopHost;
        let water = Coord::new(0, 2);
        assert!(matches!(
            start_building_placement(&mut w, BuildingKind::Bunker, Some(water), host),
            Err(PlacementError::InvalidTerrain { .. })
        ));
        assert!(matches!(
            start_building_placement(&mut w, BuildingKind::Docks, Some(Coord::new(3, 2)), host),
            Err(PlacementError::InvalidTerrain { .. })
        ));
        assert!(matches!(
            start_building_placement(&mut w, BuildingKind::Mine, Some(Coord::new(1, 1)), host),
            Err(PlacementError::InvalidTerrain { .. })
        ));
        assert!(matches!(
            start_building_placement(&mut w, BuildingKind::Factory, Some(Coord::new(4, 4)), host),
            Err(PlacementError::InvalidTerrain { .. })
        ));
        assert_eq!(
            start_building_placement(&mut w, BuildingKind::Docks, Some(Coord::new(9, 9)), host),
            Err(PlacementError::UnknownTile(Coord::new(9, 9)))
        );
        assert!(w.buildings.is_empty());
        assert_eq!(w.resources, Stock::new(10, 40, 20, 5));

        start_building_placement(&mut w, BuildingKind::Mine, Some(Coord::new(4, 4)), host).unwrap();
        start_building_placement(&mut w, BuildingKind::Mine, Some(Coord::new(3, 4)), host).unwrap();
        start_building_placement(&mut w, BuildingKind::Docks, Some(Coord::new(1, 2)), host).unwrap();
        assert_eq!(
            start_building_placement(&mut w, BuildingKind::Bunker, Some(Coord::new(1, 2)), host),
            Err(PlacementError::Occupied(Coord::new(1, 2)))
        );
    }

    #[test]
    fn unaffordable_placement_changes_nothing() {
        let mut w = world();
        w.resources = Stock::new(0, 1, 0, 0);
        let err = start_building_placement(
            &mut w,
            BuildingKind::Factory,
            Some(Coord::new(2, 2)),
            &mut NoopHost,
        )
        .unwrap_err();
        assert!(matches!(err, PlacementError::CannotAfford { .. }));
        assert!(w.buildings.is_empty());
        assert_eq!(w.resources, Stock::new(0, 1, 0, 0));
    }

    #[test]
    fn placement_uses_selected_unit_then_base() {
        let mut w = world();
        w.base = crate::world::MobileBase { q: 2, r: 2 };
        let mut host = RecordingHost::default();
        let id = start_building_placement(&mut w, BuildingKind::Bunker, None, &mut host).unwrap();
        assert_eq!(w.building(id).unwrap().coord(), Coord::new(2, 2));
        assert_eq!(host.resource_updates.last(), Some(&w.resources));

        w.base = crate::world::MobileBase { q: 3, r: 1 };
        host.selected = Some(SelectedUnit::MobileBase);
        let id = start_building_placement(&mut w, BuildingKind::Bunker, None, &mut host).unwrap();
        assert_eq!(w.building(id).unwrap().coord(), Coord::new(3, 1));
    }

    #[test]
    fn production_respects_cap() {
        let mut w = world();
        let host = &mut NoopHost;
        let mine = start_building_placement(&mut w, BuildingKind::Mine, Some(Coord::new(4, 4)), host)
            .unwrap();
        let factory =
            start_building_placement(&mut w, BuildingKind::Factory, Some(Coord::new(2, 2)), host)
                .unwrap();
        w.building_mut(factory).unwrap().storage.scrap = 5;

        for _ in 0..15 {
            apply_building_production_on_end_turn(&mut w);
        }
        assert_eq!(w.building(mine).unwrap().storage.scrap, 10);
        let f = &w.building(factory).unwrap().storage;
        assert_eq!((f.scrap, f.money), (1, 2));
    }

    #[test]
    fn carriers_spawn_and_unbind() {
        let mut w = world();
        let host = &mut NoopHost;
        let docks_id =
            start_building_placement(&mut w, BuildingKind::Docks, Some(Coord::new(1, 2)), host)
                .unwrap();
        let ship = build_ship(&mut w, docks_id, host).unwrap();
        let hauler = build_hauler(&mut w, docks_id, host).unwrap();
        assert!(w.map.is_water(w.ship(ship).unwrap().coord()));
        assert_eq!(w.hauler(hauler).unwrap().coord(), Coord::new(1, 2));

        let bunker =
            start_building_placement(&mut w, BuildingKind::Bunker, Some(Coord::new(3, 3)), host)
                .unwrap();
        assert_eq!(build_ship(&mut w, bunker, host), Err(PlacementError::NotDocks(bunker)));

        let removed = destroy_building(&mut w, docks_id, host).unwrap();
        assert_eq!(removed.id, docks_id);
        assert_eq!(w.ship(ship).unwrap().docks_id, None);
        assert_eq!(w.hauler(hauler).unwrap().target_docks_id, None);
        assert_eq!(w.ships.len(), 1);
        assert_eq!(build_hauler(&mut w, docks_id, host), Err(PlacementError::UnknownBuilding(docks_id)));
    }
}
