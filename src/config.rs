// src/config.rs
//! Конфигурация генерации острова и экономики
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией и симуляцией:
//! - Биом острова (определяет ориентир по умолчанию и оттенок рельефа)
//! - Ширину водной каймы по краям карты
//! - Настройки летописи (базовый год, шаг лет, попытки размещения POI)
//! - Экономику: стартовые ресурсы, стоимости, вместимости, очки хода
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::geography::LandmarkKind;
use crate::resources::Stock;

/// Биом острова
///
/// Задаёт ориентир по умолчанию и слегка смещает распределение поверхностей.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IslandBiome {
    /// Умеренный остров: луга, леса (ориентир — плато)
    #[default]
    Temperate,
    /// Вулканический остров: больше гор и грязи (ориентир — вулкан)
    Volcanic,
    /// Полярный остров: лёд вместо лугов на высотах (ориентир — ледник)
    Arctic,
    /// Засушливый остров: широкие пляжи, мало лесов (ориентир — пустыня)
    Arid,
    /// Болотистый остров: низины заболочены (ориентир — топь)
    Marsh,
}

impl IslandBiome {
    /// Ориентир, подразумеваемый биомом.
    #[must_use]
    pub const fn default_landmark(self) -> LandmarkKind {
        match self {
            IslandBiome::Temperate => LandmarkKind::Plateau,
            IslandBiome::Volcanic => LandmarkKind::Volcano,
            IslandBiome::Arctic => LandmarkKind::Glacier,
            IslandBiome::Arid => LandmarkKind::Desert,
            IslandBiome::Marsh => LandmarkKind::Bog,
        }
    }

    /// Вероятность леса на подходящей суше.
    #[must_use]
    pub const fn forest_chance(self) -> f64 {
        match self {
            IslandBiome::Temperate => 0.35,
            IslandBiome::Volcanic | IslandBiome::Marsh => 0.2,
            IslandBiome::Arctic => 0.1,
            IslandBiome::Arid => 0.05,
        }
    }
}

/// Ширина водной каймы по краям карты (в гексах)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BorderSettings {
    #[serde(default = "default_border_min")]
    pub min_width: u32,
    #[serde(default = "default_border_max")]
    pub max_width: u32,
}

fn default_border_min() -> u32 {
    1
}
fn default_border_max() -> u32 {
    2
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            min_width: 1,
            max_width: 2,
        }
    }
}

/// Явное описание ориентира (перекрывает ориентир биома)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LandmarkSpec {
    pub kind: LandmarkKind,
    #[serde(default)]
    pub q: Option<i32>,
    #[serde(default)]
    pub r: Option<i32>,
}

/// Настройки генератора летописи
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoreSettings {
    /// Год первого события (открытие острова)
    #[serde(default = "default_base_year")]
    pub base_year: u32,

    /// Минимальный шаг между событиями в годах
    #[serde(default = "default_min_year_step")]
    pub min_year_step: u32,

    /// Максимальный шаг между событиями в годах
    #[serde(default = "default_max_year_step")]
    pub max_year_step: u32,

    /// Попытки случайного размещения POI до перехода к линейному перебору
    #[serde(default = "default_poi_tries")]
    pub poi_tries: u32,
}

fn default_base_year() -> u32 {
    5000
}
fn default_min_year_step() -> u32 {
    3
}
fn default_max_year_step() -> u32 {
    40
}
fn default_poi_tries() -> u32 {
    90
}

impl Default for LoreSettings {
    fn default() -> Self {
        Self {
            base_year: 5000,
            min_year_step: 3,
            max_year_step: 40,
            poi_tries: 90,
        }
    }
}

/// Стоимости построек
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildingCosts {
    #[serde(default = "default_docks_cost")]
    pub docks: Stock,
    #[serde(default = "default_mine_cost")]
    pub mine: Stock,
    #[serde(default = "default_factory_cost")]
    pub factory: Stock,
    #[serde(default = "default_bunker_cost")]
    pub bunker: Stock,
}

fn default_docks_cost() -> Stock {
    Stock::new(0, 5, 2, 0)
}
fn default_mine_cost() -> Stock {
    Stock::new(0, 4, 0, 0)
}
fn default_factory_cost() -> Stock {
    Stock::new(0, 8, 4, 0)
}
fn default_bunker_cost() -> Stock {
    Stock::new(0, 6, 0, 1)
}

impl Default for BuildingCosts {
    fn default() -> Self {
        Self {
            docks: default_docks_cost(),
            mine: default_mine_cost(),
            factory: default_factory_cost(),
            bunker: default_bunker_cost(),
        }
    }
}

/// Экономика и параметры перевозчиков
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EconomySettings {
    /// Стартовый пул ресурсов игрока
    #[serde(default = "default_starting")]
    pub starting: Stock,

    /// Вместимость трюма корабля (общая на все ресурсы)
    #[serde(default = "default_ship_cargo_cap")]
    pub ship_cargo_cap: u32,

    /// Вместимость кузова тягача
    #[serde(default = "default_hauler_cargo_cap")]
    pub hauler_cargo_cap: u32,

    /// Вместимость склада здания по каждому ресурсу
    #[serde(default = "default_storage_cap")]
    pub storage_cap: u32,

    #[serde(default = "default_ship_move_points")]
    pub ship_move_points: u32,

    #[serde(default = "default_hauler_move_points")]
    pub hauler_move_points: u32,

    /// Сколько ходов корабль ловит рыбу на точке
    #[serde(default = "default_harvest_turns")]
    pub harvest_turns: u32,

    #[serde(default)]
    pub building_costs: BuildingCosts,

    #[serde(default = "default_ship_cost")]
    pub ship_cost: Stock,

    #[serde(default = "default_hauler_cost")]
    pub hauler_cost: Stock,
}

fn default_starting() -> Stock {
    Stock::new(10, 20, 10, 0)
}
fn default_ship_cargo_cap() -> u32 {
    2
}
fn default_hauler_cargo_cap() -> u32 {
    5
}
fn default_storage_cap() -> u32 {
    10
}
fn default_ship_move_points() -> u32 {
    3
}
fn default_hauler_move_points() -> u32 {
    2
}
fn default_harvest_turns() -> u32 {
    3
}
fn default_ship_cost() -> Stock {
    Stock::new(0, 3, 1, 0)
}
fn default_hauler_cost() -> Stock {
    Stock::new(1, 2, 0, 0)
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            starting: default_starting(),
            ship_cargo_cap: 2,
            hauler_cargo_cap: 5,
            storage_cap: 10,
            ship_move_points: 3,
            hauler_move_points: 2,
            harvest_turns: 3,
            building_costs: BuildingCosts::default(),
            ship_cost: default_ship_cost(),
            hauler_cost: default_hauler_cost(),
        }
    }
}

/// Основные параметры генерации мира
///
/// Полная конфигурация одной игровой сессии. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorldGenerationParams {
    /// Строковый сид: из него детерминированно выводится всё содержимое мира
    pub seed: String,

    /// Ширина карты в гексах (по умолчанию 20)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в гексах (по умолчанию 20)
    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub biome: IslandBiome,

    #[serde(default)]
    pub border: BorderSettings,

    /// Явный ориентир; если не задан — берётся ориентир биома
    #[serde(default)]
    pub landmark: Option<LandmarkSpec>,

    #[serde(default)]
    pub lore: LoreSettings,

    #[serde(default)]
    pub economy: EconomySettings,
}

impl WorldGenerationParams {
    /// Параметры по умолчанию с заданным сидом.
    #[must_use]
    pub fn with_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Self::default()
        }
    }

    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # island.toml
    /// seed = "123456"
    /// width = 24
    /// height = 20
    /// biome = "Volcanic"
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Проверяет согласованность параметров.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "map size must be positive, got {}×{}",
                self.width, self.height
            )));
        }
        if self.border.min_width > self.border.max_width {
            return Err(ConfigError::Invalid(format!(
                "border.min_width {} exceeds border.max_width {}",
                self.border.min_width, self.border.max_width
            )));
        }
        let max_border = self.width.min(self.height) / 2;
        if self.border.max_width > max_border {
            return Err(ConfigError::Invalid(format!(
                "border.max_width {} is wider than half the map ({max_border})",
                self.border.max_width
            )));
        }
        if self.lore.min_year_step == 0 || self.lore.min_year_step > self.lore.max_year_step {
            return Err(ConfigError::Invalid(format!(
                "year step range {}..={} is empty",
                self.lore.min_year_step, self.lore.max_year_step
            )));
        }
        Ok(())
    }

    /// Ориентир мира: явный или подразумеваемый биомом.
    #[must_use]
    pub fn landmark_spec(&self) -> LandmarkSpec {
        self.landmark.unwrap_or(LandmarkSpec {
            kind: self.biome.default_landmark(),
            q: None,
            r: None,
        })
    }
}

fn default_width() -> u32 {
    20
}
fn default_height() -> u32 {
    20
}

impl Default for WorldGenerationParams {
    fn default() -> Self {
        Self {
            seed: "0".to_string(),
            width: 20,
            height: 20,
            biome: IslandBiome::Temperate,
            border: BorderSettings::default(),
            landmark: None,
            lore: LoreSettings::default(),
            economy: EconomySettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_toml_fills_defaults() {
        let params = WorldGenerationParams::from_toml_str(r#"seed = "abc""#).unwrap();
        assert_eq!(params.seed, "abc");
        assert_eq!(params.width, 20);
        assert_eq!(params.lore.base_year, 5000);
        assert_eq!(params.economy.ship_cargo_cap, 2);
        assert_eq!(params.economy.hauler_cargo_cap, 5);
        assert_eq!(params.economy.storage_cap, 10);
        assert_eq!(params.landmark_spec().kind, LandmarkKind::Plateau);
    }

    #[test]
    fn explicit_landmark_overrides_biome() {
        let params = WorldGenerationParams::from_toml_str(
            r#"
            seed = "x"
            biome = "Arctic"

            [landmark]
            kind = "volcano"
            q = 4
            r = 5
            "#,
        )
        .unwrap();
        let spec = params.landmark_spec();
        assert_eq!(spec.kind, LandmarkKind::Volcano);
        assert_eq!((spec.q, spec.r), (Some(4), Some(5)));
    }

    #[test]
    fn rejects_inverted_border_range() {
        let err = WorldGenerationParams::from_toml_str(
            r#"
            seed = "x"
            [border]
            min_width = 3
            max_width = 1
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_border_wider_than_half_the_map() {
        let err = WorldGenerationParams::from_toml_str(
            r#"
            seed = "x"
            [border]
            min_width = 0
            max_width = 4294967295
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let params = WorldGenerationParams::from_toml_str(
            r#"
            seed = "x"
            width = 8
            height = 6
            [border]
            min_width = 3
            max_width = 3
            "#,
        )
        .unwrap();
        assert_eq!(params.border.max_width, 3);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = \"from-file\"\nwidth = 12\nheight = 9").unwrap();
        let params = WorldGenerationParams::from_toml_file(file.path()).unwrap();
        assert_eq!(params.seed, "from-file");
        assert_eq!((params.width, params.height), (12, 9));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = WorldGenerationParams::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
