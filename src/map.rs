// src/map.rs
//! Гексагональная карта острова и базовый генератор рельефа
//!
//! Базовый рельеф строится как в генераторе карт высот: фрактальный шум (FBm),
//! сглаживание по соседям и радиальное затухание к краям, чтобы в центре всегда
//! была суша. Затем поверхность назначается по порогам высоты и влажности,
//! раскладываются леса и ресурсы, а по краям накладывается водная кайма случайной ширины.
//!
//! Всё детерминировано строковым сидом: одинаковые аргументы дают покомпонентно
//! одинаковую карту.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
use serde::{Deserialize, Serialize};

use crate::config::{BorderSettings, IslandBiome, WorldGenerationParams};
use crate::hex::Coord;
use crate::rng::{XorShift32, tagged_seed};
use crate::tile::{TerrainType, Tile, TileResource};

/// Карта: тайлы в порядке строк, поиск по `(q, r)` через индекс.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexMap {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Tile>,
}

impl HexMap {
    /// Карта, целиком залитая одной поверхностью.
    #[must_use]
    pub fn filled(width: u32, height: u32, terrain: TerrainType) -> Self {
        let elevation = u8::from(terrain.is_land());
        let tiles = (0..height)
            .flat_map(|r| (0..width).map(move |q| Tile::new(q as i32, r as i32, terrain, elevation)))
            .collect();
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Строит карту из готовых тайлов (например, от внешнего генератора).
    ///
    /// Тайлы вне границ отбрасываются; непокрытые позиции остаются океаном.
    #[must_use]
    pub fn from_tiles(width: u32, height: u32, tiles: impl IntoIterator<Item = Tile>) -> Self {
        let mut map = Self::filled(width, height, TerrainType::Ocean);
        for tile in tiles {
            if let Some(idx) = map.index(tile.coord()) {
                map.tiles[idx] = tile;
            }
        }
        map
    }

    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.q >= 0 && coord.r >= 0 && (coord.q as u32) < self.width && (coord.r as u32) < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.r as usize * self.width as usize + coord.q as usize)
    }

    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).and_then(|i| self.tiles.get(i))
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.index(coord).and_then(|i| self.tiles.get_mut(i))
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.tiles.iter().map(Tile::coord)
    }

    /// Соседи внутри карты в фиксированном порядке направлений.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        coord.neighbors().into_iter().filter(|c| self.contains(*c))
    }

    #[must_use]
    pub fn is_water(&self, coord: Coord) -> bool {
        self.get(coord).is_some_and(Tile::is_water)
    }

    #[must_use]
    pub fn is_land(&self, coord: Coord) -> bool {
        self.get(coord).is_some_and(|t| !t.is_water())
    }

    /// Суша, у которой есть водный сосед.
    #[must_use]
    pub fn is_coastal_land(&self, coord: Coord) -> bool {
        self.is_land(coord) && self.neighbors(coord).any(|n| self.is_water(n))
    }

    /// Мелководье (`Water`), примыкающее к суше.
    #[must_use]
    pub fn is_shallow_coast(&self, coord: Coord) -> bool {
        self.get(coord)
            .is_some_and(|t| t.terrain == TerrainType::Water)
            && self.neighbors(coord).any(|n| self.is_land(n))
    }

    /// Центр масс суши в координатах `(q, r)`.
    #[must_use]
    pub fn land_centroid(&self) -> Option<(f32, f32)> {
        let (sum_q, sum_r, count) = self
            .tiles
            .iter()
            .filter(|t| !t.is_water())
            .fold((0.0f32, 0.0f32, 0usize), |(sq, sr, n), t| {
                (sq + t.q as f32, sr + t.r as f32, n + 1)
            });
        (count > 0).then(|| (sum_q / count as f32, sum_r / count as f32))
    }

    /// Ближайший к центру масс суши тайл, удовлетворяющий предикату.
    ///
    /// При равенстве расстояний побеждает тайл, встреченный раньше в порядке строк.
    pub fn nearest_to_land_centroid<P>(&self, predicate: P) -> Option<Coord>
    where
        P: Fn(&Tile) -> bool,
    {
        let (cq, cr) = self.land_centroid()?;
        let mut best: Option<(f32, Coord)> = None;
        for tile in self.tiles.iter().filter(|t| predicate(t)) {
            let d = (tile.q as f32 - cq).powi(2) + (tile.r as f32 - cr).powi(2);
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, tile.coord()));
            }
        }
        best.map(|(_, c)| c)
    }
}

/// Генерирует карту с умеренным биомом и каймой по умолчанию.
#[must_use]
pub fn generate_map(width: u32, height: u32, seed: &str) -> HexMap {
    generate_island(width, height, seed, IslandBiome::Temperate, &BorderSettings::default())
}

/// Генерирует карту по параметрам мира.
#[must_use]
pub fn generate_map_from_params(params: &WorldGenerationParams) -> HexMap {
    generate_island(
        params.width,
        params.height,
        &params.seed,
        params.biome,
        &params.border,
    )
}

/// Полный конвейер: рельеф → поверхности → леса и ресурсы → водная кайма.
#[must_use]
pub fn generate_island(
    width: u32,
    height: u32,
    seed: &str,
    biome: IslandBiome,
    border: &BorderSettings,
) -> HexMap {
    let mut map = HexMap::filled(width, height, TerrainType::Ocean);
    if width == 0 || height == 0 {
        return map;
    }

    let elevation = generate_elevation_field(width, height, seed);
    let moisture = generate_moisture_field(width, height, seed);

    let mut features = XorShift32::for_purpose(seed, "featuresV1");
    for (i, tile) in map.tiles.iter_mut().enumerate() {
        let h = elevation[i];
        let m = moisture[i];
        let (terrain, level) = classify_terrain(h, m, biome);
        tile.terrain = terrain;
        tile.elevation = level;
        tile.has_mountain_icon = terrain.is_mountainish();

        let forest_ground = matches!(terrain, TerrainType::Grassland | TerrainType::Mud);
        if forest_ground && m > 0.45 {
            tile.has_forest = features.chance(biome.forest_chance() * 2.0);
        }
    }

    scatter_resources(&mut map, seed);
    apply_water_border(&mut map, seed, border);
    map
}

/// Поле высот 0.0..1.0 с гарантированной сушей в центре.
fn generate_elevation_field(width: u32, height: u32, seed: &str) -> Vec<f32> {
    let mut noise = FastNoiseLite::new();
    noise.set_seed(Some(tagged_seed(seed, "terrainV1") as i32));
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_fractal_type(Some(FractalType::FBm));
    noise.set_fractal_octaves(Some(3));
    noise.set_frequency(Some(0.12));

    let w = width as f32;
    let h = height as f32;
    let mut data = sample_field(width, height, |q, r| {
        let shift = if r % 2 == 1 { 0.5 } else { 0.0 };
        noise.get_noise_2d(q as f32 + shift, r as f32 * 0.866)
    });

    // Сглаживание: среднее по гексу и его соседям
    smooth_hex_field(&mut data, width, height);

    for (i, value) in data.iter_mut().enumerate() {
        let q = (i % width as usize) as f32;
        let r = (i / width as usize) as f32;
        let shift = if (i / width as usize) % 2 == 1 { 0.5 } else { 0.0 };
        // Нормированное расстояние до центра: 0 в центре, ~1 в углах
        let dx = ((q + shift + 0.5) / w - 0.5) * 2.0;
        let dy = ((r + 0.5) / h - 0.5) * 2.0;
        let d = ((dx * dx + dy * dy).sqrt() / std::f32::consts::SQRT_2).min(1.0);
        // Затухание ≥ 0.55 в центре даже при минимальном шуме
        *value = (0.9 * (1.0 - d) + 0.35 * *value).clamp(0.0, 1.0);
    }
    data
}

fn generate_moisture_field(width: u32, height: u32, seed: &str) -> Vec<f32> {
    let mut noise = FastNoiseLite::new();
    noise.set_seed(Some(tagged_seed(seed, "moistureV1") as i32));
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_frequency(Some(0.2));

    sample_field(width, height, |q, r| {
        (noise.get_noise_2d(q as f32, r as f32) + 1.0) * 0.5
    })
}

#[cfg(feature = "parallel")]
fn sample_field<F>(width: u32, height: u32, f: F) -> Vec<f32>
where
    F: Fn(u32, u32) -> f32 + Sync + Send,
{
    use rayon::prelude::*;
    (0..width * height)
        .into_par_iter()
        .map(|i| f(i % width, i / width))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn sample_field<F>(width: u32, height: u32, f: F) -> Vec<f32>
where
    F: Fn(u32, u32) -> f32,
{
    (0..width * height).map(|i| f(i % width, i / width)).collect()
}

/// Один проход сглаживания по гекс-соседям.
fn smooth_hex_field(data: &mut [f32], width: u32, height: u32) {
    let source = data.to_vec();
    for (i, value) in data.iter_mut().enumerate() {
        let center = Coord::new((i % width as usize) as i32, (i / width as usize) as i32);
        let mut sum = source[i];
        let mut count = 1.0;
        for n in center.neighbors() {
            if n.q >= 0 && n.r >= 0 && (n.q as u32) < width && (n.r as u32) < height {
                sum += source[n.r as usize * width as usize + n.q as usize];
                count += 1.0;
            }
        }
        *value = sum / count;
    }
}

/// Назначает поверхность и уровень высоты (0..=4) по высоте и влажности.
fn classify_terrain(h: f32, moisture: f32, biome: IslandBiome) -> (TerrainType, u8) {
    const SEA_LEVEL: f32 = 0.42;

    if h < 0.2 {
        return (TerrainType::Ocean, 0);
    }
    if h < 0.32 {
        return (TerrainType::Sea, 0);
    }
    if h < SEA_LEVEL {
        return (TerrainType::Water, 0);
    }

    let level = (((h - SEA_LEVEL) / (1.0 - SEA_LEVEL)) * 4.0).ceil().clamp(1.0, 4.0) as u8;

    let (beach_top, mountain_base) = match biome {
        IslandBiome::Arid => (0.56, 0.86),
        IslandBiome::Volcanic => (0.46, 0.8),
        _ => (0.48, 0.84),
    };

    if h >= mountain_base {
        return (TerrainType::Mountain, 4);
    }
    if h < beach_top {
        return (TerrainType::Sand, level);
    }
    if h >= 0.72 {
        let hills = match biome {
            IslandBiome::Arctic => TerrainType::Ice,
            _ => TerrainType::Mud,
        };
        return (hills, level.max(2));
    }

    let lowland = match biome {
        IslandBiome::Marsh if moisture > 0.55 => TerrainType::Swamp,
        IslandBiome::Arctic if moisture > 0.6 => TerrainType::Ice,
        IslandBiome::Volcanic if moisture < 0.3 => TerrainType::Mud,
        _ => TerrainType::Grassland,
    };
    (lowland, level)
}

/// Рыба на мелководье и в море, нефть в открытом океане.
fn scatter_resources(map: &mut HexMap, seed: &str) {
    let mut rng = XorShift32::for_purpose(seed, "resourcesV1");
    for tile in &mut map.tiles {
        let roll = rng.next_f64();
        tile.resource_type = match tile.terrain {
            TerrainType::Water | TerrainType::Sea if roll < 0.08 => Some(TileResource::Fish),
            TerrainType::Ocean if roll < 0.04 => Some(TileResource::Oil),
            _ => None,
        };
    }
}

/// Перекрашивает края карты в океан; ширина каждой стороны случайна в заданных пределах.
fn apply_water_border(map: &mut HexMap, seed: &str, border: &BorderSettings) {
    let mut rng = XorShift32::for_purpose(seed, "borderV1");
    let mut side = || {
        let width = rng.range_inclusive(border.min_width, border.max_width);
        i32::try_from(width).unwrap_or(i32::MAX)
    };
    let (top, bottom, left, right) = (side(), side(), side(), side());

    let w = map.width as i32;
    let h = map.height as i32;
    for tile in &mut map.tiles {
        let in_border = tile.q < left || tile.q >= w - right || tile.r < top || tile.r >= h - bottom;
        if !in_border {
            continue;
        }
        tile.terrain = TerrainType::Ocean;
        tile.elevation = 0;
        tile.has_mountain_icon = false;
        tile.resource_type = None;
        tile.clear_decorations();
    }
}
