// src/lore/timeline.rs
//! Хронология острова
//!
//! Четыре главных события (открытие → крушение или гибель поселения → война или
//! политика → событие по обстоятельствам) перемежаются парами второстепенных, которые
//! выбираются взвешенно из пула кандидатов. Кандидат, который не смог состояться,
//! выбывает из пула; если пул кончился раньше, чем набралась пара, добавляется
//! событие-заполнитель. Годы только растут. Последним всегда идёт прибытие игроков.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::config::LoreSettings;
use crate::geography::{Landmark, LandmarkKind};
use crate::hex::Coord;
use crate::map::HexMap;
use crate::rng::XorShift32;

use super::names::{self, FILLER_EVENTS, GLOBAL_EVENTS, ROAD_REASONS};
use super::poi::{PlacedPois, Poi, PoiKind};
use super::roads::{RoadEnd, RoadPlanner};
use super::{HistoryEntry, ResourceAnalysis};

/// Тип события летописи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Discovery,
    Founding,
    Crash,
    Ruin,
    War,
    Politics,
    Disaster,
    Expansion,
    Road,
    Vehicle,
    Wreck,
    Shrine,
    Camp,
    Truce,
    Global,
    Filler,
    Arrival,
}

/// Второстепенное событие-кандидат.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SecondaryBeat {
    Road,
    Vehicle,
    Wreck,
    Shrine,
    Camp,
    Truce,
    Global,
}

impl SecondaryBeat {
    const ALL: [SecondaryBeat; 7] = [
        SecondaryBeat::Road,
        SecondaryBeat::Vehicle,
        SecondaryBeat::Wreck,
        SecondaryBeat::Shrine,
        SecondaryBeat::Camp,
        SecondaryBeat::Truce,
        SecondaryBeat::Global,
    ];

    const fn weight(self) -> f64 {
        match self {
            SecondaryBeat::Road => 3.0,
            SecondaryBeat::Global => 1.0,
            _ => 2.0,
        }
    }
}

pub(crate) struct TimelineBuilder<'a> {
    pub(crate) map: &'a mut HexMap,
    pub(crate) pois: &'a [Poi],
    pub(crate) placed: PlacedPois,
    pub(crate) landmark: Option<&'a Landmark>,
    pub(crate) settings: &'a LoreSettings,
    pub(crate) rng: XorShift32,
    pub(crate) island_name: String,
    pub(crate) factions: Vec<String>,
    pub(crate) analysis: ResourceAnalysis,
    pub(crate) roads: RoadPlanner,
    pub(crate) events: Vec<HistoryEntry>,
    pub(crate) year: u32,
    /// Индексы POI, о которых уже рассказано
    pub(crate) narrated: HashSet<usize>,
    pub(crate) war_happened: bool,
    pub(crate) truce_happened: bool,
}

impl TimelineBuilder<'_> {
    pub(crate) fn build(&mut self) {
        self.discovery();
        self.secondary_pair();
        self.crash_or_ruin();
        self.secondary_pair();
        self.war_or_politics();
        self.secondary_pair();
        self.context_beat();
        self.arrival();
    }

    pub(crate) fn finish(self) -> (Vec<HistoryEntry>, RoadPlanner) {
        (self.events, self.roads)
    }

    /// Следующий год: текущий + случайный шаг в заданных пределах.
    fn peek_next_year(&mut self) -> u32 {
        let step = self
            .rng
            .range_inclusive(self.settings.min_year_step, self.settings.max_year_step)
            .max(1);
        self.year.saturating_add(step)
    }

    fn advance_year(&mut self) -> u32 {
        self.year = self.peek_next_year();
        self.year
    }

    fn primary_faction(&self) -> Option<String> {
        self.factions.first().cloned()
    }

    fn push(&mut self, kind: EventKind, text: String, at: Option<Coord>, faction: Option<String>) {
        debug!(year = self.year, ?kind, "history event");
        self.events.push(HistoryEntry {
            year: self.year,
            text,
            kind,
            island_name: self.island_name.clone(),
            factions: self.factions.clone(),
            q: at.map(|c| c.q),
            r: at.map(|c| c.r),
            from: None,
            to: None,
            faction,
        });
    }

    fn poi_label(&self, idx: usize) -> String {
        let poi = &self.pois[idx];
        poi.name.clone().unwrap_or_else(|| {
            let kind = format!("{:?}", poi.kind).to_lowercase();
            format!("the {kind} at {}", poi.coord())
        })
    }

    /// Первый POI данного типа, о котором ещё не рассказано.
    fn unnarrated(&self, kinds: &[PoiKind]) -> Option<usize> {
        self.pois
            .iter()
            .enumerate()
            .find(|(i, p)| kinds.contains(&p.kind) && !self.narrated.contains(i))
            .map(|(i, _)| i)
    }

    // === Главные события ===

    fn discovery(&mut self) {
        let faction = self.primary_faction();
        let who = faction.clone().unwrap_or_else(|| "Wanderers".to_string());
        let lure = self.analysis.lure();
        match self.placed.first_settlement {
            Some(idx) => {
                self.narrated.insert(idx);
                let city = self.poi_label(idx);
                let at = self.pois[idx].coord();
                let text = format!(
                    "The {who} sight {}, drawn by {lure}, and found {city}.",
                    self.island_name
                );
                self.push(EventKind::Discovery, text, Some(at), faction);
            }
            None => {
                let text = format!("The {who} sight {} but find nowhere to land.", self.island_name);
                self.push(EventKind::Discovery, text, None, faction);
            }
        }
    }

    fn crash_or_ruin(&mut self) {
        self.advance_year();
        let crash = self.unnarrated(&[PoiKind::CrashSite]);
        let ruin = self.unnarrated(&[PoiKind::Ruin]);
        let faction = self.primary_faction();

        match (crash, ruin) {
            (Some(idx), r) if r.is_none() || self.rng.chance(0.5) => {
                self.narrated.insert(idx);
                let at = self.pois[idx].coord();
                let text = format!(
                    "A skyship falls burning onto {}; the {} salvage what they can.",
                    self.island_name,
                    faction.as_deref().unwrap_or("islanders")
                );
                self.push(EventKind::Crash, text, Some(at), faction);
            }
            (_, Some(idx)) => {
                self.narrated.insert(idx);
                let at = self.pois[idx].coord();
                let outpost = names::settlement_name(&mut self.rng);
                let text = format!("The outpost of {outpost} is razed, leaving only ruins.");
                self.push(EventKind::Ruin, text, Some(at), faction);
            }
            _ => self.filler(),
        }
    }

    fn war_or_politics(&mut self) {
        self.advance_year();
        let home = self.placed.first_settlement.map(|i| self.pois[i].coord());
        if self.factions.len() >= 2 && self.rng.chance(0.6) {
            self.war_happened = true;
            let (defender, attacker) = (self.factions[0].clone(), self.factions[1].clone());
            let mut text = format!("The {attacker} make war on the {defender}");
            if self.analysis.oil > 0 {
                text.push_str(" over the oil slicks offshore");
            }
            text.push('.');
            self.push(EventKind::War, text, home, Some(attacker));
        } else {
            let faction = self.primary_faction();
            let text = format!(
                "A schism divides the {} over who should rule {}.",
                faction.as_deref().unwrap_or("settlers"),
                self.island_name
            );
            self.push(EventKind::Politics, text, home, faction);
        }
    }

    fn context_beat(&mut self) {
        self.advance_year();
        let dramatic = self
            .landmark
            .is_some_and(|l| matches!(l.kind, LandmarkKind::Volcano | LandmarkKind::Glacier));

        if dramatic && self.rng.chance(0.5) {
            self.disaster();
            return;
        }
        if let Some(idx) = self.placed.second_settlement {
            self.narrated.insert(idx);
            let poi = &self.pois[idx];
            let (at, faction) = (poi.coord(), poi.faction.clone());
            let city = self.poi_label(idx);
            let text = format!(
                "The {} found {city} on the far shore.",
                faction.as_deref().unwrap_or("settlers")
            );
            self.push(EventKind::Founding, text, Some(at), faction);
            return;
        }
        if let Some(idx) = self.unnarrated(&[PoiKind::Mine, PoiKind::Watchtower]) {
            self.narrated.insert(idx);
            let at = self.pois[idx].coord();
            let faction = self.primary_faction();
            let what = self.poi_label(idx);
            let text = format!(
                "The {} push inland and raise {what}.",
                faction.as_deref().unwrap_or("settlers")
            );
            self.push(EventKind::Expansion, text, Some(at), faction);
            return;
        }
        if self.landmark.is_some() {
            self.disaster();
        } else {
            self.global();
        }
    }

    fn disaster(&mut self) {
        let Some(landmark) = self.landmark else {
            self.global();
            return;
        };
        let text = match landmark.kind {
            LandmarkKind::Volcano => "The volcano wakes and buries the eastern fields in ash.",
            LandmarkKind::Glacier => "The glacier advances and a long winter grips the island.",
            LandmarkKind::Plateau => "A quake splits the plateau and topples its watch fires.",
            LandmarkKind::Desert => "Sandstorms boil out of the desert for seven summers.",
            LandmarkKind::Bog => "Marsh fever spreads from the bog through every village.",
        };
        self.push(EventKind::Disaster, text.to_string(), Some(landmark.center()), None);
    }

    fn arrival(&mut self) {
        self.advance_year();
        let text = format!("The players arrive on {}.", self.island_name);
        self.push(EventKind::Arrival, text, None, None);
    }

    // === Второстепенные события ===

    fn secondary_pair(&mut self) {
        let mut pool = SecondaryBeat::ALL.to_vec();
        let mut done = 0;
        while done < 2 && !pool.is_empty() {
            let weights: Vec<f64> = pool.iter().map(|b| b.weight()).collect();
            let Some(i) = self.rng.pick_weighted(&weights) else {
                break;
            };
            let beat = pool.remove(i);
            let year = self.peek_next_year();
            if self.try_secondary(beat, year) {
                done += 1;
            }
        }
        for _ in done..2 {
            self.advance_year();
            self.filler();
        }
    }

    fn try_secondary(&mut self, beat: SecondaryBeat, year: u32) -> bool {
        match beat {
            SecondaryBeat::Road => self.try_road(year),
            SecondaryBeat::Vehicle => self.try_find(
                year,
                &[PoiKind::Vehicle],
                EventKind::Vehicle,
                "Scavengers uncover an intact crawler near",
            ),
            SecondaryBeat::Wreck => self.try_find(
                year,
                &[PoiKind::Wreck],
                EventKind::Wreck,
                "Divers find a sunken hull in the shallows off",
            ),
            SecondaryBeat::Shrine => self.try_find(
                year,
                &[PoiKind::Shrine],
                EventKind::Shrine,
                "Pilgrims consecrate a shrine at",
            ),
            SecondaryBeat::Camp => self.try_find(
                year,
                &[PoiKind::RoadsideCamp, PoiKind::RaiderCamp],
                EventKind::Camp,
                "A camp springs up at",
            ),
            SecondaryBeat::Truce => self.try_truce(year),
            SecondaryBeat::Global => {
                self.year = year;
                self.global();
                true
            }
        }
    }

    fn try_find(&mut self, year: u32, kinds: &[PoiKind], kind: EventKind, lead: &str) -> bool {
        let Some(idx) = self.unnarrated(kinds) else {
            return false;
        };
        self.year = year;
        self.narrated.insert(idx);
        let at = self.pois[idx].coord();
        let text = format!("{lead} {}.", self.poi_label(idx));
        let faction = self.pois[idx].faction.clone();
        self.push(kind, text, Some(at), faction);
        true
    }

    fn try_truce(&mut self, year: u32) -> bool {
        if !self.war_happened || self.truce_happened || self.factions.len() < 2 {
            return false;
        }
        self.year = year;
        self.truce_happened = true;
        let text = format!(
            "The {} and the {} swear a truce at the water's edge.",
            self.factions[0], self.factions[1]
        );
        self.push(EventKind::Truce, text, None, None);
        true
    }

    /// Дорога от поселения (или любой опорной точки) к ближайшей подходящей точке.
    fn try_road(&mut self, year: u32) -> bool {
        let anchors: Vec<usize> = self
            .pois
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind.is_road_anchor() && self.map.is_land(p.coord()))
            .map(|(i, _)| i)
            .collect();
        if anchors.len() < 2 {
            return false;
        }

        let mut sources = anchors.clone();
        // Поселения первыми, внутри групп — порядок размещения
        sources.sort_by_key(|&i| (self.pois[i].kind != PoiKind::Settlement, i));
        let reason = names::pick(&mut self.rng, ROAD_REASONS);

        for &src in &sources {
            let origin = self.pois[src].coord();
            let mut targets: Vec<usize> = anchors.iter().copied().filter(|&i| i != src).collect();
            targets.sort_by_key(|&i| (origin.distance(self.pois[i].coord()), i));

            for dst in targets {
                let from = RoadEnd::from(&self.pois[src]);
                let to = RoadEnd::from(&self.pois[dst]);
                let faction = self.pois[src].faction.clone().or_else(|| self.primary_faction());
                if self
                    .roads
                    .plan_road(self.map, from, to, faction.clone(), reason, year)
                    .is_err()
                {
                    continue;
                }
                self.year = year;
                let text = format!(
                    "A {reason} road is cut from {} to {}.",
                    self.poi_label(src),
                    self.poi_label(dst)
                );
                self.push(EventKind::Road, text, Some(from.coord()), faction);
                if let Some(last) = self.events.last_mut() {
                    last.from = Some(from.coord());
                    last.to = Some(to.coord());
                }
                return true;
            }
        }
        false
    }

    fn global(&mut self) {
        let text = format!("{}.", names::pick(&mut self.rng, GLOBAL_EVENTS));
        self.push(EventKind::Global, text, None, None);
    }

    fn filler(&mut self) {
        let text = format!("{}.", names::pick(&mut self.rng, FILLER_EVENTS));
        self.push(EventKind::Filler, text, None, None);
    }
}
