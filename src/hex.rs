// src/hex.rs
//! Гексагональная сетка в координатах odd-r
//!
//! `q` — столбец, `r` — строка; нечётные строки сдвинуты вправо на полгекса.
//! Порядок обхода соседей фиксирован (E, NE, NW, W, SW, SE): от него зависит
//! воспроизводимость путей при равной длине и порядок заливки.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Координата гекса.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub q: i32,
    pub r: i32,
}

impl Coord {
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Сосед в заданном направлении.
    #[must_use]
    pub fn neighbor(self, dir: Direction) -> Self {
        let (dq, dr) = dir.offset(self.r);
        Self::new(self.q + dq, self.r + dr)
    }

    /// Все шесть соседей в порядке [`Direction::ALL`] (без проверки границ).
    #[must_use]
    pub fn neighbors(self) -> [Coord; 6] {
        Direction::ALL.map(|d| self.neighbor(d))
    }

    /// Кубические координаты `(x, y, z)`.
    #[must_use]
    pub fn to_cube(self) -> (i32, i32, i32) {
        let x = self.q - (self.r - (self.r & 1)) / 2;
        let z = self.r;
        (x, -x - z, z)
    }

    /// Гекс-расстояние (число шагов).
    #[must_use]
    pub fn distance(self, other: Coord) -> u32 {
        let (ax, ay, az) = self.to_cube();
        let (bx, by, bz) = other.to_cube();
        (ax - bx)
            .unsigned_abs()
            .max((ay - by).unsigned_abs())
            .max((az - bz).unsigned_abs())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((q, r): (i32, i32)) -> Self {
        Self::new(q, r)
    }
}

/// Направление на соседа.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// Смещение `(dq, dr)` с учётом чётности строки.
    #[must_use]
    pub const fn offset(self, row: i32) -> (i32, i32) {
        let odd = row & 1 == 1;
        match (self, odd) {
            (Direction::East, _) => (1, 0),
            (Direction::West, _) => (-1, 0),
            (Direction::NorthEast, false) => (0, -1),
            (Direction::NorthEast, true) => (1, -1),
            (Direction::NorthWest, false) => (-1, -1),
            (Direction::NorthWest, true) => (0, -1),
            (Direction::SouthWest, false) => (-1, 1),
            (Direction::SouthWest, true) => (0, 1),
            (Direction::SouthEast, false) => (0, 1),
            (Direction::SouthEast, true) => (1, 1),
        }
    }
}

/// Проекция гекс ↔ мировые координаты (pointy-top, odd-r).
///
/// Хост может подставить свою проекцию через [`crate::host::WorldHost`];
/// эта используется по умолчанию и в headless-режиме.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    /// Радиус гекса в мировых единицах
    pub size: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Default for HexLayout {
    fn default() -> Self {
        Self {
            size: 1.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

impl HexLayout {
    #[must_use]
    pub fn to_world(&self, coord: Coord) -> (f32, f32) {
        let sqrt3 = 3.0_f32.sqrt();
        let shift = if coord.r & 1 == 1 { 0.5 } else { 0.0 };
        let x = self.size * sqrt3 * (coord.q as f32 + shift);
        let y = self.size * 1.5 * coord.r as f32;
        (x + self.origin_x, y + self.origin_y)
    }

    /// Ближайший гекс к точке.
    #[must_use]
    pub fn to_coord(&self, x: f32, y: f32) -> Coord {
        let px = (x - self.origin_x) / self.size;
        let py = (y - self.origin_y) / self.size;
        let fq = 3.0_f32.sqrt() / 3.0 * px - py / 3.0;
        let fr = 2.0 / 3.0 * py;

        // Округление в кубических координатах
        let fs = -fq - fr;
        let mut rq = fq.round();
        let mut rr = fr.round();
        let rs = fs.round();
        let dq = (rq - fq).abs();
        let dr = (rr - fr).abs();
        let ds = (rs - fs).abs();
        if dq > dr && dq > ds {
            rq = -rr - rs;
        } else if dr > ds {
            rr = -rq - rs;
        }

        let aq = rq as i32;
        let ar = rr as i32;
        Coord::new(aq + (ar - (ar & 1)) / 2, ar)
    }
}
