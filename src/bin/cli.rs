use clap::Parser;
use islandgen::{BuildingKind, Coord, NoopHost, Simulation, WorldGenerationParams, WorldState};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Генератор островов для Chronicles of Realms
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (без него — параметры по умолчанию)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Переопределить сид из конфигурации
    #[arg(short, long)]
    seed: Option<String>,

    /// Сколько ходов симулировать со стартовой экономикой (доки + корабль + тягач)
    #[arg(short, long, default_value_t = 0)]
    turns: u32,

    /// Куда сохранить сводку мира в JSON (по умолчанию: ./world.json)
    #[arg(short, long, default_value = "world.json")]
    output: PathBuf,
}

/// Что попадает в JSON-сводку.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorldSummary<'a> {
    seed: &'a str,
    width: u32,
    height: u32,
    turn: u32,
    landmark: Option<&'a islandgen::Landmark>,
    highlight: Vec<Coord>,
    outline: Vec<(Coord, islandgen::Direction)>,
    tiles: &'a [islandgen::Tile],
    pois: &'a [islandgen::Poi],
    history: &'a [islandgen::HistoryEntry],
    roads: &'a [islandgen::RoadPlan],
    buildings: &'a [islandgen::Building],
    ships: &'a [islandgen::Ship],
    haulers: &'a [islandgen::Hauler],
    resources: islandgen::Stock,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut params = match &cli.config {
        Some(path) => {
            println!("🔍 Загрузка конфигурации...");
            WorldGenerationParams::from_toml_file(path)?
        }
        None => WorldGenerationParams::default(),
    };
    if let Some(seed) = cli.seed {
        params.seed = seed;
    }
    params.validate()?;

    println!(
        "🏝️  Генерация острова (сид: {}, размер: {}×{})...",
        params.seed, params.width, params.height
    );
    let mut sim = Simulation::new(params, NoopHost);

    if let Some(lore) = &sim.world().meta.lore {
        println!("📜 {}: {} событий летописи", lore.island_name, lore.history.len());
        for entry in &lore.history {
            println!("   {} — {}", entry.year, entry.text);
        }
    }

    if cli.turns > 0 {
        setup_starter_economy(&mut sim);
        println!("⏳ Симуляция {} ходов...", cli.turns);
        for _ in 0..cli.turns {
            sim.end_turn();
        }
        println!("💰 Ресурсы: {:?}", sim.world().resources);
    }

    println!("💾 Сохранение в {:?}", cli.output);
    let overlay = (sim.highlight_cells(), sim.highlight_outline());
    let json = serde_json::to_string_pretty(&summary(sim.world(), overlay))?;
    fs::write(&cli.output, json)?;

    println!("\n✅ Готово! Мир сохранён.");
    Ok(())
}

/// Доки на первом подходящем берегу у базы, корабль с целью на ближайшей рыбе и тягач.
fn setup_starter_economy(sim: &mut Simulation<NoopHost>) {
    let world = sim.world();
    let base = world.base.coord();
    let mut shore: Vec<Coord> = world
        .map
        .coords()
        .filter(|&c| world.map.is_coastal_land(c))
        .collect();
    shore.sort_by_key(|c| (c.distance(base), *c));

    let Some(docks) = shore
        .into_iter()
        .find_map(|c| sim.place_building(BuildingKind::Docks, Some(c)).ok())
    else {
        println!("⚠️  Не нашлось места для доков");
        return;
    };

    let world = sim.world();
    let docks_at = world.building(docks).map(|b| b.coord());
    let fish = world
        .map
        .tiles()
        .iter()
        .filter(|t| t.resource_type.is_some_and(islandgen::TileResource::is_harvestable))
        .map(islandgen::Tile::coord)
        .min_by_key(|c| docks_at.map_or(0, |d| d.distance(*c)));

    if let Err(err) = sim.build_ship(docks) {
        println!("⚠️  Корабль не построен: {err}");
    }
    if let Err(err) = sim.build_hauler(docks) {
        println!("⚠️  Тягач не построен: {err}");
    }
    if let Some(target) = fish
        && let Err(err) = sim.set_docks_route(docks, Some(target))
    {
        println!("⚠️  Маршрут доков не задан: {err}");
    }
}

type Overlay = (Vec<Coord>, Vec<(Coord, islandgen::Direction)>);

fn summary(world: &WorldState, (highlight, outline): Overlay) -> WorldSummary<'_> {
    let lore = world.meta.lore.as_ref();
    WorldSummary {
        seed: &world.params.seed,
        width: world.map.width,
        height: world.map.height,
        turn: world.turn,
        landmark: world.meta.landmark.as_ref(),
        highlight,
        outline,
        tiles: world.map.tiles(),
        pois: &world.pois,
        history: lore.map_or(&[][..], |l| l.history.as_slice()),
        roads: lore.map_or(&[][..], |l| l.roads.as_slice()),
        buildings: &world.buildings,
        ships: &world.ships,
        haulers: &world.haulers,
        resources: world.resources,
    }
}
