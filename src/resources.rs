// src/resources.rs
//! Ресурсы экономики и их хранилища
//!
//! Один и тот же набор полей используется для склада здания, груза перевозчика
//! и общего пула игрока. Доступ к полю по ключу — через `match`, без строковых имён.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Перевозимый ресурс.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Food,
    Scrap,
    Money,
    Influence,
}

impl Resource {
    /// Фиксированный порядок обхода для `loadAll` / `unloadAll`.
    pub const ALL: [Resource; 4] = [
        Resource::Food,
        Resource::Scrap,
        Resource::Money,
        Resource::Influence,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Resource::Food => "food",
            Resource::Scrap => "scrap",
            Resource::Money => "money",
            Resource::Influence => "influence",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown resource '{s}'"))
    }
}

/// Количества всех ресурсов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stock {
    #[serde(default)]
    pub food: u32,
    #[serde(default)]
    pub scrap: u32,
    #[serde(default)]
    pub money: u32,
    #[serde(default)]
    pub influence: u32,
}

impl Stock {
    #[must_use]
    pub const fn new(food: u32, scrap: u32, money: u32, influence: u32) -> Self {
        Self {
            food,
            scrap,
            money,
            influence,
        }
    }

    #[must_use]
    pub const fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Food => self.food,
            Resource::Scrap => self.scrap,
            Resource::Money => self.money,
            Resource::Influence => self.influence,
        }
    }

    pub fn get_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Food => &mut self.food,
            Resource::Scrap => &mut self.scrap,
            Resource::Money => &mut self.money,
            Resource::Influence => &mut self.influence,
        }
    }

    pub fn set(&mut self, resource: Resource, amount: u32) {
        *self.get_mut(resource) = amount;
    }

    /// Сумма по всем ресурсам.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.food + self.scrap + self.money + self.influence
    }

    #[must_use]
    pub fn covers(&self, cost: &Stock) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Списывает стоимость; `false` и без изменений, если не хватает.
    pub fn try_spend(&mut self, cost: &Stock) -> bool {
        if !self.covers(cost) {
            return false;
        }
        for r in Resource::ALL {
            *self.get_mut(r) -= cost.get(r);
        }
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
