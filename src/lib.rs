pub mod buildings;
pub mod carriers;
pub mod config;
pub mod error;
pub mod geography;
pub mod hex;
pub mod host;
pub mod logistics;
pub mod lore;
pub mod map;
pub mod pathfinding;
pub mod resources;
pub mod rng;
pub mod tile;
pub mod world;

pub use buildings::{Building, BuildingId, BuildingKind};
pub use carriers::{Carrier, CarrierId, CarrierKind, Hauler, HaulerMode, Ship, ShipMode};
pub use config::{IslandBiome, WorldGenerationParams};
pub use error::{ConfigError, PlacementError};
pub use geography::{Landmark, LandmarkKind};
pub use hex::{Coord, Direction};
pub use host::{NoopHost, RecordingHost, SelectedUnit, WorldHost};
pub use logistics::{RouteStop, StationId, StopAction};
pub use lore::{EventKind, HistoryEntry, LoreCache, Poi, PoiKind, RoadPlan};
pub use map::{HexMap, generate_map};
pub use pathfinding::{Domain, find_path};
pub use resources::{Resource, Stock};
pub use rng::XorShift32;
pub use tile::{TerrainType, Tile, TileResource};
pub use world::{MobileBase, Simulation, WorldMeta, WorldState};
