use serde::{Deserialize, Serialize};

use crate::hex::Coord;

/// Тип поверхности гекса. Однозначно задаёт класс проходимости (вода / суша).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    /// Мелководье у берега
    Water,
    Sea,
    Ocean,
    Sand,
    Grassland,
    Mud,
    Swamp,
    Ice,
    Ash,
    Mountain,
    Volcano,
}

impl TerrainType {
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, TerrainType::Water | TerrainType::Ocean | TerrainType::Sea)
    }

    #[must_use]
    pub const fn is_land(self) -> bool {
        !self.is_water()
    }

    /// Горные типы: на них нельзя ставить POI и прокладывать дороги.
    #[must_use]
    pub const fn is_mountainish(self) -> bool {
        matches!(self, TerrainType::Mountain | TerrainType::Volcano)
    }
}

/// Природный ресурс на гексе.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileResource {
    Fish,
    Oil,
}

impl TileResource {
    /// Может ли корабль собирать этот ресурс.
    #[must_use]
    pub const fn is_harvestable(self) -> bool {
        matches!(self, TileResource::Fish)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub q: i32,
    pub r: i32,
    #[serde(rename = "type")]
    pub terrain: TerrainType,
    pub elevation: u8,
    pub has_forest: bool,
    pub has_ruin: bool,
    pub has_crash_site: bool,
    pub has_vehicle: bool,
    pub has_mountain_icon: bool,
    pub has_road: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owning_faction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<TileResource>,
}

impl Tile {
    #[must_use]
    pub fn new(q: i32, r: i32, terrain: TerrainType, elevation: u8) -> Self {
        Self {
            q,
            r,
            terrain,
            elevation,
            has_forest: false,
            has_ruin: false,
            has_crash_site: false,
            has_vehicle: false,
            has_mountain_icon: false,
            has_road: false,
            owning_faction: None,
            city_name: None,
            resource_type: None,
        }
    }

    #[must_use]
    pub const fn coord(&self) -> Coord {
        Coord::new(self.q, self.r)
    }

    #[must_use]
    pub const fn is_water(&self) -> bool {
        self.terrain.is_water()
    }

    #[must_use]
    pub const fn is_mountainish(&self) -> bool {
        self.terrain.is_mountainish()
    }

    /// Снимает декорации, несовместимые с переделкой рельефа.
    pub fn clear_decorations(&mut self) {
        self.has_forest = false;
        self.has_ruin = false;
        self.has_crash_site = false;
        self.has_vehicle = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_classes() {
        for t in [TerrainType::Water, TerrainType::Sea, TerrainType::Ocean] {
            assert!(t.is_water());
            assert!(!t.is_mountainish());
        }
        assert!(TerrainType::Volcano.is_land());
        assert!(TerrainType::Volcano.is_mountainish());
        assert!(!TerrainType::Ash.is_mountainish());
    }

    #[test]
    fn tile_serializes_with_js_style_keys() {
        let mut tile = Tile::new(2, 3, TerrainType::Grassland, 1);
        tile.has_forest = true;
        let json = serde_json::to_value(&tile).unwrap();
        assert_eq!(json["type"], "grassland");
        assert_eq!(json["hasForest"], true);
        assert!(json.get("cityName").is_none());
    }
}
