// src/pathfinding.rs
//! Поиск пути в ширину по водной или сухопутной части карты
//!
//! Граф невзвешенный, поэтому BFS даёт кратчайший путь. Соседи обходятся в
//! фиксированном порядке направлений — при равной длине всегда выбирается один и тот же путь.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::hex::Coord;
use crate::map::HexMap;

/// Класс поверхности, по которому разрешено движение.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Корабли: water, sea, ocean
    Water,
    /// Тягачи и база: всё остальное
    Land,
}

impl Domain {
    /// Проходим ли гекс (вне карты — нет).
    #[must_use]
    pub fn allows(self, map: &HexMap, coord: Coord) -> bool {
        match map.get(coord) {
            Some(tile) => match self {
                Domain::Water => tile.is_water(),
                Domain::Land => !tile.is_water(),
            },
            None => false,
        }
    }
}

/// Кратчайший путь от `from` до `to` включительно.
///
/// `None`, если концы не проходимы в данном домене или связи нет.
/// Путь из одной клетки, если `from == to`.
#[must_use]
pub fn find_path(map: &HexMap, from: Coord, to: Coord, domain: Domain) -> Option<Vec<Coord>> {
    if !domain.allows(map, from) || !domain.allows(map, to) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    came_from.insert(from, from);

    while let Some(current) = queue.pop_front() {
        for next in map.neighbors(current) {
            if came_from.contains_key(&next) || !domain.allows(map, next) {
                continue;
            }
            came_from.insert(next, current);
            if next == to {
                return Some(reconstruct(&came_from, from, to));
            }
            queue.push_back(next);
        }
    }
    None
}

fn reconstruct(came_from: &HashMap<Coord, Coord>, from: Coord, to: Coord) -> Vec<Coord> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Связаны ли две клетки в домене.
#[must_use]
pub fn is_connected(map: &HexMap, from: Coord, to: Coord, domain: Domain) -> bool {
    find_path(map, from, to, domain).is_some()
}

/// Сдвигает `position` вдоль пути не более чем на `move_points` шагов.
///
/// Возвращает число сделанных шагов: `min(move_points, path.len() - 1)`.
pub fn advance_along(path: &[Coord], move_points: u32, position: &mut Coord) -> u32 {
    let Some(last) = path.len().checked_sub(1) else {
        return 0;
    };
    let steps = (move_points as usize).min(last);
    if let Some(&next) = path.get(steps) {
        *position = next;
    }
    steps as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TerrainType;

    /// Суша 5×5 с водным каналом по строке 2.
    fn channel() -> HexMap {
        let mut map = HexMap::filled(5, 5, TerrainType::Grassland);
        for q in 0..5 {
            map.get_mut(Coord::new(q, 2)).unwrap().terrain = TerrainType::Water;
        }
        map
    }

    /// Эталонное BFS-расстояние без восстановления пути.
    fn brute_distance(map: &HexMap, from: Coord, to: Coord, domain: Domain) -> Option<usize> {
        let mut dist = HashMap::from([(from, 0usize)]);
        let mut queue = VecDeque::from([from]);
        while let Some(c) = queue.pop_front() {
            let d = dist[&c];
            for n in c.neighbors() {
                if domain.allows(map, n) && !dist.contains_key(&n) {
                    dist.insert(n, d + 1);
                    queue.push_back(n);
                }
            }
        }
        dist.get(&to).copied()
    }

    #[test]
    fn water_path_along_channel() {
        let map = channel();
        let path = find_path(&map, Coord::new(0, 2), Coord::new(4, 2), Domain::Water).unwrap();
        assert_eq!(path.first(), Some(&Coord::new(0, 2)));
        assert_eq!(path.last(), Some(&Coord::new(4, 2)));
        assert_eq!(path.len(), 5);
        for pair in path.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1);
            assert!(map.is_water(pair[1]));
        }
    }

    #[test]
    fn land_paths_are_minimal() {
        let map = HexMap::filled(6, 6, TerrainType::Grassland);
        for (from, to) in [
            (Coord::new(0, 0), Coord::new(5, 5)),
            (Coord::new(5, 0), Coord::new(0, 5)),
            (Coord::new(2, 3), Coord::new(4, 1)),
        ] {
            let path = find_path(&map, from, to, Domain::Land).unwrap();
            let expected = brute_distance(&map, from, to, Domain::Land).unwrap();
            assert_eq!(path.len() - 1, expected);
            assert_eq!(expected as u32, from.distance(to));
        }
    }

    #[test]
    fn channel_splits_land() {
        let map = channel();
        assert!(find_path(&map, Coord::new(0, 0), Coord::new(4, 4), Domain::Land).is_none());
        assert!(find_path(&map, Coord::new(0, 0), Coord::new(4, 1), Domain::Land).is_some());
    }

    #[test]
    fn endpoint_outside_domain_has_no_path() {
        let map = channel();
        assert!(find_path(&map, Coord::new(0, 0), Coord::new(1, 2), Domain::Land).is_none());
        assert!(find_path(&map, Coord::new(0, 0), Coord::new(1, 2), Domain::Water).is_none());
        assert!(find_path(&map, Coord::new(0, 2), Coord::new(9, 2), Domain::Water).is_none());
    }

    #[test]
    fn same_cell_is_single_step_path() {
        let map = channel();
        let path = find_path(&map, Coord::new(3, 2), Coord::new(3, 2), Domain::Water).unwrap();
        assert_eq!(path, vec![Coord::new(3, 2)]);
    }

    #[test]
    fn ties_resolve_the_same_way() {
        let map = HexMap::filled(7, 7, TerrainType::Water);
        let a = find_path(&map, Coord::new(0, 0), Coord::new(6, 6), Domain::Water);
        let b = find_path(&map, Coord::new(0, 0), Coord::new(6, 6), Domain::Water);
        assert_eq!(a, b);
    }

    #[test]
    fn advance_takes_prefix_of_path() {
        let path = [Coord::new(0, 2), Coord::new(1, 2), Coord::new(2, 2), Coord::new(3, 2)];
        let mut pos = path[0];
        assert_eq!(advance_along(&path, 2, &mut pos), 2);
        assert_eq!(pos, Coord::new(2, 2));

        let mut pos = path[0];
        assert_eq!(advance_along(&path, 10, &mut pos), 3);
        assert_eq!(pos, Coord::new(3, 2));

        let mut pos = path[0];
        assert_eq!(advance_along(&path[..1], 3, &mut pos), 0);
        assert_eq!(pos, Coord::new(0, 2));
    }
}
