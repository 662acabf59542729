// src/logistics.rs
//! Планировщик логистики
//!
//! Перевозчик с `logistics_enabled` ходит по циклическому маршруту из остановок.
//! За тик он проходит одну «ногу» к станции текущей остановки; если встал точно на
//! клетку доступа станции, выполняет действие и переходит к следующей остановке
//! (индекс по модулю длины маршрута).
//!
//! Станции адресуются строкой: `"base"` для мобильной базы, `"b:<id>"` для здания.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::buildings::{Building, BuildingId};
use crate::carriers::Carrier;
use crate::config::EconomySettings;
use crate::hex::Coord;
use crate::host::WorldHost;
use crate::map::HexMap;
use crate::pathfinding::{Domain, advance_along, find_path};
use crate::resources::{Resource, Stock};
use crate::world::WorldState;

/// Идентификатор станции.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StationId {
    Base,
    Building(BuildingId),
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationId::Base => f.write_str("base"),
            StationId::Building(id) => write!(f, "b:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id '{0}'")]
pub struct StationIdError(pub String);

impl FromStr for StationId {
    type Err = StationIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "base" {
            return Ok(StationId::Base);
        }
        s.strip_prefix("b:")
            .and_then(|id| id.parse().ok())
            .map(StationId::Building)
            .ok_or_else(|| StationIdError(s.to_string()))
    }
}

impl TryFrom<String> for StationId {
    type Error = StationIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.to_string()
    }
}

/// Единый доступ к ресурсам станции.
pub trait ResourceAccessor {
    fn get(&self, resource: Resource) -> u32;
    fn set(&mut self, resource: Resource, amount: u32);

    /// Предел по ресурсу; `None` — без ограничения.
    fn capacity(&self, resource: Resource) -> Option<u32>;

    fn add(&mut self, resource: Resource, amount: u32) {
        let value = self.get(resource).saturating_add(amount);
        self.set(resource, value);
    }

    fn free_space(&self, resource: Resource) -> u32 {
        self.capacity(resource)
            .map_or(u32::MAX, |cap| cap.saturating_sub(self.get(resource)))
    }
}

/// Склад здания; каждый ресурс ограничен `cap`.
pub struct BuildingStation<'a> {
    pub building: &'a mut Building,
    pub cap: u32,
}

impl ResourceAccessor for BuildingStation<'_> {
    fn get(&self, resource: Resource) -> u32 {
        self.building.storage.get(resource)
    }

    fn set(&mut self, resource: Resource, amount: u32) {
        self.building.storage.set(resource, amount);
    }

    fn capacity(&self, _resource: Resource) -> Option<u32> {
        Some(self.cap)
    }
}

/// Мобильная база: общий пул игрока без ограничения.
pub struct BaseStation<'a> {
    pub resources: &'a mut Stock,
}

impl ResourceAccessor for BaseStation<'_> {
    fn get(&self, resource: Resource) -> u32 {
        self.resources.get(resource)
    }

    fn set(&mut self, resource: Resource, amount: u32) {
        self.resources.set(resource, amount);
    }

    fn capacity(&self, _resource: Resource) -> Option<u32> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopAction {
    Load,
    LoadAll,
    Unload,
    UnloadAll,
    /// Неизвестное действие из данных: логируется и пропускается
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    #[serde(rename = "stationId")]
    pub station: StationId,
    pub action: StopAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
}

impl RouteStop {
    #[must_use]
    pub const fn new(station: StationId, action: StopAction, resource: Option<Resource>) -> Self {
        Self {
            station,
            action,
            resource,
        }
    }
}

/// Клетка, с которой перевозчик обслуживается станцией.
///
/// Сама клетка станции, если она в домене перевозчика, иначе первый подходящий сосед.
#[must_use]
pub fn access_tile(map: &HexMap, station: Coord, domain: Domain) -> Option<Coord> {
    if domain.allows(map, station) {
        return Some(station);
    }
    map.neighbors(station).find(|&n| domain.allows(map, n))
}

/// Выполняет действие остановки. Возвращает суммарно перенесённое количество.
///
/// Количество ограничено и наличием у источника, и местом у получателя.
pub fn execute_stop(
    cargo: &mut Stock,
    carrier_capacity: u32,
    station: &mut dyn ResourceAccessor,
    action: StopAction,
    resource: Option<Resource>,
) -> u32 {
    let all = Resource::ALL;
    let selected = resource.as_ref().map_or(&all[..], std::slice::from_ref);
    let mut moved = 0;

    match action {
        StopAction::Load | StopAction::LoadAll => {
            let limit = if action == StopAction::Load { 1 } else { u32::MAX };
            let Some(targets) = stop_resources(action, resource, selected) else {
                return 0;
            };
            for &r in targets {
                let room = carrier_capacity.saturating_sub(cargo.total());
                let available = station.get(r);
                let amount = limit.min(available).min(room);
                station.set(r, available - amount);
                *cargo.get_mut(r) += amount;
                moved += amount;
            }
        }
        StopAction::Unload | StopAction::UnloadAll => {
            let limit = if action == StopAction::Unload { 1 } else { u32::MAX };
            let Some(targets) = stop_resources(action, resource, selected) else {
                return 0;
            };
            for &r in targets {
                let amount = limit.min(cargo.get(r)).min(station.free_space(r));
                *cargo.get_mut(r) -= amount;
                station.add(r, amount);
                moved += amount;
            }
        }
        StopAction::Unknown => warn!("unknown logistics action ignored"),
    }
    moved
}

/// `load`/`unload` требуют ресурс; `*All` без ресурса обходят весь набор.
fn stop_resources<'a>(
    action: StopAction,
    resource: Option<Resource>,
    selected: &'a [Resource],
) -> Option<&'a [Resource]> {
    match (action, resource) {
        (StopAction::Load | StopAction::Unload, None) => {
            warn!(?action, "stop without resource ignored");
            None
        }
        _ => Some(selected),
    }
}

/// Тик всех перевозчиков, переданных логистике.
pub fn apply_logistics_on_end_turn(world: &mut WorldState, host: &mut dyn WorldHost) {
    let mut ctx = Context {
        map: &world.map,
        economy: &world.params.economy,
        buildings: &mut world.buildings,
        base: world.base.coord(),
        resources: &mut world.resources,
        base_changed: false,
    };
    for ship in world.ships.iter_mut().filter(|s| s.logistics_enabled) {
        ctx.run(ship);
    }
    for hauler in world.haulers.iter_mut().filter(|h| h.logistics_enabled) {
        ctx.run(hauler);
    }
    if ctx.base_changed {
        host.resources_changed(&world.resources);
    }
}

struct Context<'a> {
    map: &'a HexMap,
    economy: &'a EconomySettings,
    buildings: &'a mut Vec<Building>,
    base: Coord,
    resources: &'a mut Stock,
    base_changed: bool,
}

impl Context<'_> {
    fn station_coord(&self, station: StationId) -> Option<Coord> {
        match station {
            StationId::Base => Some(self.base),
            StationId::Building(id) => {
                self.buildings.iter().find(|b| b.id == id).map(Building::coord)
            }
        }
    }

    fn run<C: Carrier>(&mut self, carrier: &mut C) {
        carrier.reset_move_points();
        let len = carrier.route().len();
        if len == 0 {
            return;
        }
        let index = carrier.route_index() % len;
        let stop = carrier.route()[index].clone();
        let domain = carrier.kind().domain();

        let Some(access) = self
            .station_coord(stop.station)
            .and_then(|c| access_tile(self.map, c, domain))
        else {
            warn!(
                carrier = carrier.id(),
                station = %stop.station,
                "station unreachable, stop skipped"
            );
            carrier.set_route_index((index + 1) % len);
            return;
        };

        let mut pos = carrier.coord();
        if pos != access {
            let Some(path) = find_path(self.map, pos, access, domain) else {
                debug!(carrier = carrier.id(), station = %stop.station, "no path to station");
                return;
            };
            advance_along(&path, carrier.move_points(), &mut pos);
            carrier.set_coord(pos);
            if pos != access {
                return;
            }
        }

        let capacity = carrier.capacity(self.economy);
        let moved = match stop.station {
            StationId::Base => {
                let mut station = BaseStation {
                    resources: &mut *self.resources,
                };
                let moved = execute_stop(
                    carrier.cargo_mut(),
                    capacity,
                    &mut station,
                    stop.action,
                    stop.resource,
                );
                self.base_changed |= moved > 0;
                moved
            }
            StationId::Building(id) => {
                let cap = self.economy.storage_cap;
                match self.buildings.iter_mut().find(|b| b.id == id) {
                    Some(building) => {
                        let mut station = BuildingStation { building, cap };
                        execute_stop(
                            carrier.cargo_mut(),
                            capacity,
                            &mut station,
                            stop.action,
                            stop.resource,
                        )
                    }
                    None => 0,
                }
            }
        };
        debug!(
            carrier = carrier.id(),
            station = %stop.station,
            action = ?stop.action,
            moved,
            "stop executed"
        );
        carrier.set_route_index((index + 1) % len);
    }
}
