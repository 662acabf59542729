// src/carriers.rs
//! Корабли и тягачи
//!
//! ## Корабль
//!
//! ```text
//! ToTarget ──(прибыл, есть рыба)──► Harvesting ──(трюм полон / ходы вышли)──► Returning
//!    ▲  └──(прибыл, пусто)──────────────────────────────────────────────────────┘ │
//!    └──────────────────────(выгрузился, цель есть)───────────────────────────────┘
//! ```
//!
//! Смена цели доков во время промысла сбрасывает корабль в `ToTarget` со счётчиком 0;
//! груз при этом сохраняется.
//!
//! ## Тягач
//!
//! `ToDocks ↔ ReturningToBase` по суше: забирает со склада доков до вместимости кузова
//! и отвозит в общий пул игрока. Без доков — `Idle`.
//!
//! Очки хода восстанавливаются до максимума в начале каждого тика; за тик перевозчик
//! проходит не больше `min(move_points, path.len() - 1)` шагов.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::buildings::{BuildingId, berth};
use crate::config::EconomySettings;
use crate::error::PlacementError;
use crate::hex::Coord;
use crate::host::WorldHost;
use crate::logistics::RouteStop;
use crate::map::HexMap;
use crate::pathfinding::{Domain, advance_along, find_path};
use crate::resources::{Resource, Stock};
use crate::tile::TileResource;
use crate::world::WorldState;

pub type CarrierId = u32;

/// Тип перевозчика. Набор закрыт, поэтому у каждого есть своя вместимость по умолчанию.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierKind {
    Ship,
    Hauler,
}

impl CarrierKind {
    #[must_use]
    pub const fn domain(self) -> Domain {
        match self {
            CarrierKind::Ship => Domain::Water,
            CarrierKind::Hauler => Domain::Land,
        }
    }

    #[must_use]
    pub const fn default_capacity(self, economy: &EconomySettings) -> u32 {
        match self {
            CarrierKind::Ship => economy.ship_cargo_cap,
            CarrierKind::Hauler => economy.hauler_cargo_cap,
        }
    }
}

/// Общий интерфейс перевозчика для планировщика логистики.
pub trait Carrier {
    fn kind(&self) -> CarrierKind;
    fn id(&self) -> CarrierId;
    fn coord(&self) -> Coord;
    fn set_coord(&mut self, coord: Coord);
    fn cargo(&self) -> &Stock;
    fn cargo_mut(&mut self) -> &mut Stock;
    fn cargo_cap_override(&self) -> Option<u32>;
    fn move_points(&self) -> u32;
    fn reset_move_points(&mut self);
    fn route(&self) -> &[RouteStop];
    fn route_index(&self) -> usize;
    fn set_route_index(&mut self, index: usize);
    fn logistics_enabled(&self) -> bool;

    /// Явная вместимость или вместимость типа по умолчанию.
    fn capacity(&self, economy: &EconomySettings) -> u32 {
        self.cargo_cap_override()
            .unwrap_or_else(|| self.kind().default_capacity(economy))
    }

    /// Свободное место в общем на все ресурсы трюме.
    fn free_capacity(&self, economy: &EconomySettings) -> u32 {
        self.capacity(economy).saturating_sub(self.cargo().total())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShipMode {
    ToTarget,
    Harvesting,
    Returning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HaulerMode {
    ToDocks,
    ReturningToBase,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    pub id: CarrierId,
    pub q: i32,
    pub r: i32,
    pub move_points: u32,
    pub max_move_points: u32,
    pub cargo: Stock,
    pub mode: ShipMode,
    /// Доки-владелец; `None` после сноса доков
    pub docks_id: Option<BuildingId>,
    pub harvest_turns_left: u32,
    /// Цель доков, под которую начат промысел
    pub harvest_target: Option<Coord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_cap: Option<u32>,
    #[serde(default)]
    pub route: Vec<RouteStop>,
    #[serde(default)]
    pub route_index: usize,
    #[serde(default)]
    pub logistics_enabled: bool,
}

impl Ship {
    #[must_use]
    pub fn new(id: CarrierId, at: Coord, docks_id: BuildingId, move_points: u32) -> Self {
        Self {
            id,
            q: at.q,
            r: at.r,
            move_points,
            max_move_points: move_points,
            cargo: Stock::default(),
            mode: ShipMode::ToTarget,
            docks_id: Some(docks_id),
            harvest_turns_left: 0,
            harvest_target: None,
            cargo_cap: None,
            route: Vec::new(),
            route_index: 0,
            logistics_enabled: false,
        }
    }

    #[must_use]
    pub const fn coord(&self) -> Coord {
        Coord::new(self.q, self.r)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hauler {
    pub id: CarrierId,
    pub q: i32,
    pub r: i32,
    pub move_points: u32,
    pub max_move_points: u32,
    pub cargo: Stock,
    pub mode: HaulerMode,
    pub target_docks_id: Option<BuildingId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_cap: Option<u32>,
    #[serde(default)]
    pub route: Vec<RouteStop>,
    #[serde(default)]
    pub route_index: usize,
    #[serde(default)]
    pub logistics_enabled: bool,
}

impl Hauler {
    #[must_use]
    pub fn new(id: CarrierId, at: Coord, docks_id: BuildingId, move_points: u32) -> Self {
        Self {
            id,
            q: at.q,
            r: at.r,
            move_points,
            max_move_points: move_points,
            cargo: Stock::default(),
            mode: HaulerMode::ToDocks,
            target_docks_id: Some(docks_id),
            cargo_cap: None,
            route: Vec::new(),
            route_index: 0,
            logistics_enabled: false,
        }
    }

    #[must_use]
    pub const fn coord(&self) -> Coord {
        Coord::new(self.q, self.r)
    }
}

macro_rules! impl_carrier {
    ($ty:ty, $kind:expr) => {
        impl Carrier for $ty {
            fn kind(&self) -> CarrierKind {
                $kind
            }
            fn id(&self) -> CarrierId {
                self.id
            }
            fn coord(&self) -> Coord {
                Coord::new(self.q, self.r)
            }
            fn set_coord(&mut self, coord: Coord) {
                self.q = coord.q;
                self.r = coord.r;
            }
            fn cargo(&self) -> &Stock {
                &self.cargo
            }
            fn cargo_mut(&mut self) -> &mut Stock {
                &mut self.cargo
            }
            fn cargo_cap_override(&self) -> Option<u32> {
                self.cargo_cap
            }
            fn move_points(&self) -> u32 {
                self.move_points
            }
            fn reset_move_points(&mut self) {
                self.move_points = self.max_move_points;
            }
            fn route(&self) -> &[RouteStop] {
                &self.route
            }
            fn route_index(&self) -> usize {
                self.route_index
            }
            fn set_route_index(&mut self, index: usize) {
                self.route_index = index;
            }
            fn logistics_enabled(&self) -> bool {
                self.logistics_enabled
            }
        }
    };
}

impl_carrier!(Ship, CarrierKind::Ship);
impl_carrier!(Hauler, CarrierKind::Hauler);

/// Какой ресурс даёт промысел на клетке.
#[must_use]
pub const fn harvest_yield(resource: TileResource) -> Option<Resource> {
    match resource {
        TileResource::Fish => Some(Resource::Food),
        TileResource::Oil => None,
    }
}

/// Один шаг движения к `target`. Возвращает `true`, если перевозчик на месте.
fn step_towards<C: Carrier>(carrier: &mut C, map: &HexMap, target: Coord) -> bool {
    let mut pos = carrier.coord();
    if pos == target {
        return true;
    }
    let Some(path) = find_path(map, pos, target, carrier.kind().domain()) else {
        debug!(id = carrier.id(), from = %pos, to = %target, "no path");
        return false;
    };
    advance_along(&path, carrier.move_points(), &mut pos);
    carrier.set_coord(pos);
    pos == target
}

/// Назначает (или снимает) цель промысла доков.
pub fn set_docks_route(
    world: &mut WorldState,
    docks_id: BuildingId,
    target: Option<Coord>,
) -> Result<(), PlacementError> {
    if let Some(t) = target
        && !world.map.is_water(t)
    {
        warn!(%t, "route target is not water");
        return Err(PlacementError::InvalidRouteTarget(t));
    }
    let docks = world
        .building_mut(docks_id)
        .ok_or(PlacementError::UnknownBuilding(docks_id))?;
    if !docks.is_docks() {
        return Err(PlacementError::NotDocks(docks_id));
    }
    docks.route = target;
    info!(docks = docks_id, ?target, "docks route set");
    Ok(())
}

/// Тик всех кораблей (кроме переданных логистике).
pub fn apply_ship_routes_on_end_turn(world: &mut WorldState, host: &mut dyn WorldHost) {
    let economy = &world.params.economy;
    let map = &world.map;

    for ship in world.ships.iter_mut().filter(|s| !s.logistics_enabled) {
        ship.reset_move_points();
        let docks = ship
            .docks_id
            .and_then(|id| world.buildings.iter_mut().find(|b| b.id == id && b.is_docks()));
        let route = docks.as_ref().and_then(|d| d.route);

        match ship.mode {
            ShipMode::ToTarget => {
                let Some(target) = route else {
                    if ship.cargo.total() > 0 {
                        ship.mode = ShipMode::Returning;
                    }
                    continue;
                };
                if !step_towards(ship, map, target) {
                    continue;
                }
                let fish = map
                    .get(target)
                    .and_then(|t| t.resource_type)
                    .is_some_and(TileResource::is_harvestable);
                if fish {
                    ship.mode = ShipMode::Harvesting;
                    ship.harvest_turns_left = economy.harvest_turns;
                    ship.harvest_target = Some(target);
                } else {
                    ship.mode = ShipMode::Returning;
                }
                debug!(ship = ship.id, mode = ?ship.mode, "arrived at fishing target");
            }
            ShipMode::Harvesting => {
                if route != ship.harvest_target {
                    ship.mode = ShipMode::ToTarget;
                    ship.harvest_turns_left = 0;
                    ship.harvest_target = None;
                    debug!(ship = ship.id, "harvest interrupted by route change");
                    continue;
                }
                let resource = map
                    .get(ship.coord())
                    .and_then(|t| t.resource_type)
                    .and_then(harvest_yield)
                    .unwrap_or(Resource::Food);
                if ship.free_capacity(economy) > 0 {
                    *ship.cargo.get_mut(resource) += 1;
                }
                ship.harvest_turns_left = ship.harvest_turns_left.saturating_sub(1);
                if ship.harvest_turns_left == 0 || ship.free_capacity(economy) == 0 {
                    ship.mode = ShipMode::Returning;
                    ship.harvest_target = None;
                }
            }
            ShipMode::Returning => {
                let Some(docks) = docks else {
                    debug!(ship = ship.id, "orphaned ship has nowhere to return");
                    continue;
                };
                let Some(home) = berth(map, docks.coord()) else {
                    warn!(docks = docks.id, "docks lost its berth");
                    continue;
                };
                if !step_towards(ship, map, home) {
                    continue;
                }
                for r in Resource::ALL {
                    let room = economy.storage_cap.saturating_sub(docks.storage.get(r));
                    let moved = room.min(ship.cargo.get(r));
                    *docks.storage.get_mut(r) += moved;
                }
                // Что не поместилось — теряется
                ship.cargo.clear();
                if route.is_some() {
                    ship.mode = ShipMode::ToTarget;
                }
                debug!(ship = ship.id, storage = ?docks.storage, "cargo deposited");
                if let Some(tile) = map.get(docks.coord()) {
                    host.draw_tile(tile);
                }
            }
        }
    }
}

/// Тик всех тягачей (кроме переданных логистике).
pub fn apply_hauler_behavior_on_end_turn(world: &mut WorldState, host: &mut dyn WorldHost) {
    let economy = &world.params.economy;
    let map = &world.map;
    let base = world.base.coord();

    for hauler in world.haulers.iter_mut().filter(|h| !h.logistics_enabled) {
        hauler.reset_move_points();
        let docks = hauler
            .target_docks_id
            .and_then(|id| world.buildings.iter_mut().find(|b| b.id == id && b.is_docks()));
        let Some(docks) = docks else {
            if hauler.mode != HaulerMode::Idle {
                debug!(hauler = hauler.id, "docks gone, hauler idles");
            }
            hauler.mode = HaulerMode::Idle;
            hauler.target_docks_id = None;
            continue;
        };

        match hauler.mode {
            HaulerMode::Idle => hauler.mode = HaulerMode::ToDocks,
            HaulerMode::ToDocks => {
                if !step_towards(hauler, map, docks.coord()) {
                    continue;
                }
                for r in Resource::ALL {
                    let take = hauler.free_capacity(economy).min(docks.storage.get(r));
                    *docks.storage.get_mut(r) -= take;
                    *hauler.cargo.get_mut(r) += take;
                }
                hauler.mode = HaulerMode::ReturningToBase;
                debug!(hauler = hauler.id, cargo = ?hauler.cargo, "picked up at docks");
            }
            HaulerMode::ReturningToBase => {
                if !step_towards(hauler, map, base) {
                    continue;
                }
                for r in Resource::ALL {
                    *world.resources.get_mut(r) += hauler.cargo.get(r);
                }
                hauler.cargo.clear();
                hauler.mode = HaulerMode::ToDocks;
                host.resources_changed(&world.resources);
                debug!(hauler = hauler.id, "delivered to base");
            }
        }
    }
}
