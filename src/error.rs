// src/error.rs
//! Ошибки крейта
//!
//! Генерация и пошаговая симуляция не падают: их отказы — штатные исходы с логом.
//! Ошибками возвращаются только загрузка конфигурации и отклонённые действия игрока
//! (постройка, найм, смена маршрута), причём до любых изменений состояния.

use crate::buildings::{BuildingId, BuildingKind};
use crate::hex::Coord;
use crate::resources::Stock;

/// Ошибки загрузки конфигурации.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Отказ в постройке здания, найме перевозчика или смене маршрута.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("no tile at {0}")]
    UnknownTile(Coord),

    #[error("tile {0} already has a building")]
    Occupied(Coord),

    #[error("{kind:?} cannot be placed on {coord}: {reason}")]
    InvalidTerrain {
        kind: BuildingKind,
        coord: Coord,
        reason: &'static str,
    },

    #[error("cannot afford {what}: need {cost:?}, have {available:?}")]
    CannotAfford {
        what: String,
        cost: Stock,
        available: Stock,
    },

    #[error("building {0} does not exist")]
    UnknownBuilding(BuildingId),

    #[error("building {0} is not a docks")]
    NotDocks(BuildingId),

    #[error("docks {0} has no water berth")]
    NoBerth(BuildingId),

    #[error("route target {0} is not a water tile")]
    InvalidRouteTarget(Coord),
}
