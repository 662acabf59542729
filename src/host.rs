// src/host.rs
//! Интерфейс к хосту (рендер, журнал истории, UI)
//!
//! Ядро не рисует и не знает о сцене: всё, что уходит наружу, проходит через
//! [`WorldHost`]. У каждого метода есть пустая реализация по умолчанию, поэтому
//! headless-режим и тесты работают с [`NoopHost`].

use crate::hex::{Coord, HexLayout};
use crate::lore::HistoryEntry;
use crate::resources::Stock;
use crate::tile::Tile;

/// Выбранный игроком юнит.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedUnit {
    MobileBase,
    Ship(u32),
    Hauler(u32),
}

pub trait WorldHost {
    /// Гекс → мировые координаты.
    fn coordinate_to_world(&self, coord: Coord) -> (f32, f32) {
        HexLayout::default().to_world(coord)
    }

    /// Мировые координаты → ближайший гекс.
    fn world_to_coordinate(&self, x: f32, y: f32) -> Coord {
        HexLayout::default().to_coord(x, y)
    }

    /// Тайл изменился и требует перерисовки.
    fn draw_tile(&mut self, _tile: &Tile) {}

    /// Полная перерисовка мира.
    fn redraw_world(&mut self) {}

    /// Новая запись в журнале истории.
    fn emit_history_entry(&mut self, _entry: &HistoryEntry) {}

    /// Юнит, выбранный игроком.
    fn selected_unit(&self) -> Option<SelectedUnit> {
        None
    }

    /// Пул ресурсов игрока изменился.
    fn resources_changed(&mut self, _resources: &Stock) {}
}

/// Хост без побочных эффектов.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl WorldHost for NoopHost {}

/// Хост, запоминающий всё, что ему прислали (для тестов и CLI).
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub history: Vec<HistoryEntry>,
    pub drawn_tiles: Vec<Coord>,
    pub redraws: usize,
    pub resource_updates: Vec<Stock>,
    pub selected: Option<SelectedUnit>,
}

impl WorldHost for RecordingHost {
    fn draw_tile(&mut self, tile: &Tile) {
        self.drawn_tiles.push(tile.coord());
    }

    fn redraw_world(&mut self) {
        self.redraws += 1;
    }

    fn emit_history_entry(&mut self, entry: &HistoryEntry) {
        self.history.push(entry.clone());
    }

    fn selected_unit(&self) -> Option<SelectedUnit> {
        self.selected
    }

    fn resources_changed(&mut self, resources: &Stock) {
        self.resource_updates.push(*resources);
    }
}
