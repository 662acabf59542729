// src/world.rs
//! Состояние мира и владелец симуляции
//!
//! [`WorldState`] держит всё, что меняется за сессию: карту, метаданные генерации,
//! POI, здания, перевозчиков и пул ресурсов игрока. Подсистемы получают его по ссылке.
//! [`Simulation`] связывает состояние с хостом и прогоняет ход в фиксированном порядке:
//! производство → корабли → тягачи → логистика.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

use crate::buildings::{self, Building, BuildingId, BuildingKind};
use crate::carriers::{self, CarrierId, Hauler, Ship};
use crate::config::WorldGenerationParams;
use crate::error::PlacementError;
use crate::geography::{self, Landmark};
use crate::hex::{Coord, Direction};
use crate::host::{SelectedUnit, WorldHost};
use crate::logistics;
use crate::lore::{self, LoreCache, Poi};
use crate::map::{HexMap, generate_map_from_params};
use crate::resources::Stock;

/// Метаданные генерации, которые строятся один раз на мир.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldMeta {
    pub geography_built: bool,
    pub landmark: Option<Landmark>,
    /// Клетки ориентира в порядке заливки
    pub landmark_cells: Vec<Coord>,
    /// Клетки, где нельзя ставить POI
    pub no_poi: BTreeSet<Coord>,
    pub lore_built: bool,
    pub lore: Option<LoreCache>,
}

/// Мобильная база игрока.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MobileBase {
    pub q: i32,
    pub r: i32,
}

impl MobileBase {
    #[must_use]
    pub const fn coord(&self) -> Coord {
        Coord::new(self.q, self.r)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub params: WorldGenerationParams,
    pub map: HexMap,
    pub meta: WorldMeta,
    pub pois: Vec<Poi>,
    pub buildings: Vec<Building>,
    pub ships: Vec<Ship>,
    pub haulers: Vec<Hauler>,
    pub base: MobileBase,
    /// Общий пул ресурсов игрока
    pub resources: Stock,
    pub turn: u32,
    next_building_id: BuildingId,
    next_carrier_id: CarrierId,
}

impl WorldState {
    /// Пустой мир поверх готовой карты: без ориентира и летописи.
    ///
    /// База ставится на сушу, ближайшую к центру масс острова.
    #[must_use]
    pub fn new(params: WorldGenerationParams, map: HexMap) -> Self {
        let base = map
            .nearest_to_land_centroid(|t| !t.is_water())
            .map(|c| MobileBase { q: c.q, r: c.r })
            .unwrap_or_default();
        let resources = params.economy.starting;
        Self {
            params,
            map,
            meta: WorldMeta::default(),
            pois: Vec::new(),
            buildings: Vec::new(),
            ships: Vec::new(),
            haulers: Vec::new(),
            base,
            resources,
            turn: 0,
            next_building_id: 1,
            next_carrier_id: 1,
        }
    }

    /// Полный конвейер генерации: карта → ориентир → летопись.
    pub fn generate(params: WorldGenerationParams, host: &mut dyn WorldHost) -> Self {
        let map = generate_map_from_params(&params);
        let mut world = Self::new(params, map);
        let spec = world.params.landmark_spec();
        geography::init_or_update_geography(&mut world.map, &mut world.meta, &spec, host);
        lore::ensure_world_lore_generated(&mut world, host);
        info!(
            seed = %world.params.seed,
            width = world.map.width,
            height = world.map.height,
            base = %world.base.coord(),
            "world generated"
        );
        world
    }

    #[must_use]
    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.id == id)
    }

    #[must_use]
    pub fn building_at(&self, coord: Coord) -> Option<&Building> {
        self.buildings.iter().find(|b| b.coord() == coord)
    }

    #[must_use]
    pub fn ship(&self, id: CarrierId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    pub fn ship_mut(&mut self, id: CarrierId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.id == id)
    }

    #[must_use]
    pub fn hauler(&self, id: CarrierId) -> Option<&Hauler> {
        self.haulers.iter().find(|h| h.id == id)
    }

    pub fn hauler_mut(&mut self, id: CarrierId) -> Option<&mut Hauler> {
        self.haulers.iter_mut().find(|h| h.id == id)
    }

    /// Позиция юнита, выбранного игроком.
    #[must_use]
    pub fn unit_position(&self, unit: SelectedUnit) -> Option<Coord> {
        match unit {
            SelectedUnit::MobileBase => Some(self.base.coord()),
            SelectedUnit::Ship(id) => self.ship(id).map(Ship::coord),
            SelectedUnit::Hauler(id) => self.hauler(id).map(Hauler::coord),
        }
    }

    pub(crate) fn allocate_building_id(&mut self) -> BuildingId {
        let id = self.next_building_id;
        self.next_building_id += 1;
        id
    }

    pub(crate) fn allocate_carrier_id(&mut self) -> CarrierId {
        let id = self.next_carrier_id;
        self.next_carrier_id += 1;
        id
    }
}

/// Владелец мира и хоста.
pub struct Simulation<H: WorldHost> {
    world: WorldState,
    host: H,
}

impl<H: WorldHost> Simulation<H> {
    pub fn new(params: WorldGenerationParams, mut host: H) -> Self {
        let world = WorldState::generate(params, &mut host);
        Self { world, host }
    }

    /// Симуляция поверх уже собранного состояния (тесты, загрузка сохранений).
    pub fn from_state(world: WorldState, host: H) -> Self {
        Self { world, host }
    }

    #[must_use]
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_parts(self) -> (WorldState, H) {
        (self.world, self.host)
    }

    /// Конец хода. Возвращает номер нового хода.
    pub fn end_turn(&mut self) -> u32 {
        buildings::apply_building_production_on_end_turn(&mut self.world);
        carriers::apply_ship_routes_on_end_turn(&mut self.world, &mut self.host);
        carriers::apply_hauler_behavior_on_end_turn(&mut self.world, &mut self.host);
        logistics::apply_logistics_on_end_turn(&mut self.world, &mut self.host);
        self.world.turn += 1;
        self.host.redraw_world();
        self.world.turn
    }

    pub fn place_building(
        &mut self,
        kind: BuildingKind,
        hex_override: Option<Coord>,
    ) -> Result<BuildingId, PlacementError> {
        buildings::start_building_placement(&mut self.world, kind, hex_override, &mut self.host)
    }

    pub fn destroy_building(&mut self, id: BuildingId) -> Option<Building> {
        buildings::destroy_building(&mut self.world, id, &mut self.host)
    }

    pub fn build_ship(&mut self, docks: BuildingId) -> Result<CarrierId, PlacementError> {
        buildings::build_ship(&mut self.world, docks, &mut self.host)
    }

    pub fn build_hauler(&mut self, docks: BuildingId) -> Result<CarrierId, PlacementError> {
        buildings::build_hauler(&mut self.world, docks, &mut self.host)
    }

    pub fn set_docks_route(
        &mut self,
        docks: BuildingId,
        target: Option<Coord>,
    ) -> Result<(), PlacementError> {
        carriers::set_docks_route(&mut self.world, docks, target)
    }

    /// Клетки ориентира, которые сейчас стоит подсветить.
    #[must_use]
    pub fn highlight_cells(&self) -> Vec<Coord> {
        geography::compute_highlight_cells(&self.world.map, &self.world.meta)
    }

    #[must_use]
    pub fn highlight_outline(&self) -> Vec<(Coord, Direction)> {
        geography::highlight_outline(&self.world.map, &self.world.meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{NoopHost, RecordingHost};

    #[test]
    fn generation_is_idempotent_and_reported() {
        let params = WorldGenerationParams::with_seed("123456");
        let sim = Simulation::new(params, RecordingHost::default());
        let world = sim.world();
        assert!(world.meta.geography_built);
        assert!(world.meta.lore_built);

        let lore = world.meta.lore.as_ref().unwrap();
        assert_eq!(sim.host().history, lore.history);
        assert!(world.map.is_land(world.base.coord()));

        let (mut world, mut host) = sim.into_parts();
        let pois_before = world.pois.clone();
        assert!(!lore::ensure_world_lore_generated(&mut world, &mut host));
        assert!(!lore::generate_road_lore_for_existing_connections(&mut world, &mut host));
        assert_eq!(world.pois, pois_before);
    }

    #[test]
    fn same_seed_same_world() {
        let a = WorldState::generate(WorldGenerationParams::with_seed("twin"), &mut NoopHost);
        let b = WorldState::generate(WorldGenerationParams::with_seed("twin"), &mut NoopHost);
        assert_eq!(a.map, b.map);
        assert_eq!(a.pois, b.pois);
        assert_eq!(a.meta, b.meta);
        assert_eq!(a.base, b.base);
    }

    #[test]
    fn end_turn_counts_turns() {
        let map = HexMap::filled(4, 4, crate::tile::TerrainType::Grassland);
        let world = WorldState::new(WorldGenerationParams::with_seed("t"), map);
        let mut sim = Simulation::from_state(world, NoopHost);
        assert_eq!(sim.end_turn(), 1);
        assert_eq!(sim.end_turn(), 2);
    }

    #[test]
    fn ids_are_unique() {
        let map = HexMap::filled(2, 2, crate::tile::TerrainType::Grassland);
        let mut world = WorldState::new(WorldGenerationParams::default(), map);
        let a = world.allocate_building_id();
        let b = world.allocate_building_id();
        assert_ne!(a, b);
        assert_eq!(world.allocate_carrier_id(), 1);
    }
}
