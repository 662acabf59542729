//! Сквозные сценарии: генерация мира, промысел, вывоз с доков, прерывание промысла.

use islandgen::{
    BuildingKind, Coord, EventKind, HaulerMode, HexMap, NoopHost, ShipMode, Simulation,
    TerrainType, TileResource, WorldGenerationParams, WorldState,
};

/// Суша в столбцах 0..=4, дальше море; рыба в (7, 5).
fn harbour() -> Simulation<NoopHost> {
    let mut map = HexMap::filled(10, 10, TerrainType::Sea);
    for tile in map.tiles_mut() {
        if tile.q <= 4 {
            tile.terrain = TerrainType::Grassland;
            tile.elevation = 1;
        }
    }
    map.get_mut(Coord::new(7, 5)).unwrap().resource_type = Some(TileResource::Fish);
    let world = WorldState::new(WorldGenerationParams::with_seed("harbour"), map);
    Simulation::from_state(world, NoopHost)
}

#[test]
fn scenario_a_single_discovery_at_base_year() {
    let params = WorldGenerationParams::with_seed("123456");
    assert_eq!((params.width, params.height), (20, 20));
    let world = WorldState::generate(params, &mut NoopHost);

    let history = &world.meta.lore.as_ref().unwrap().history;
    let discoveries: Vec<_> = history
        .iter()
        .filter(|e| e.kind == EventKind::Discovery)
        .collect();
    assert_eq!(discoveries.len(), 1);
    assert_eq!(discoveries[0].year, 5000);
    assert!(discoveries[0].coord().is_some());
    assert_eq!(history.last().unwrap().kind, EventKind::Arrival);
}

#[test]
fn scenario_b_ship_reaches_fish_and_harvests_to_cap() {
    let mut sim = harbour();
    let docks = sim.place_building(BuildingKind::Docks, Some(Coord::new(4, 5))).unwrap();
    let ship_id = sim.build_ship(docks).unwrap();
    {
        let ship = sim.world_mut().ship_mut(ship_id).unwrap();
        assert_eq!(ship.coord(), Coord::new(5, 5));
        ship.max_move_points = 1;
    }
    sim.set_docks_route(docks, Some(Coord::new(7, 5))).unwrap();

    // Путь из двух шагов по одному за ход
    sim.end_turn();
    assert_eq!(sim.world().ship(ship_id).unwrap().mode, ShipMode::ToTarget);
    sim.end_turn();
    let ship = sim.world().ship(ship_id).unwrap();
    assert_eq!(ship.coord(), Coord::new(7, 5));
    assert_eq!(ship.mode, ShipMode::Harvesting);
    assert_eq!(ship.cargo.food, 0);

    sim.end_turn();
    assert_eq!(sim.world().ship(ship_id).unwrap().cargo.food, 1);
    sim.end_turn();
    let ship = sim.world().ship(ship_id).unwrap();
    assert_eq!(ship.cargo.food, 2);
    assert_eq!(ship.mode, ShipMode::Returning);

    sim.end_turn();
    sim.end_turn();
    let ship = sim.world().ship(ship_id).unwrap();
    assert_eq!(ship.coord(), Coord::new(5, 5));
    assert_eq!(ship.cargo.total(), 0);
    assert_eq!(ship.mode, ShipMode::ToTarget);
    assert_eq!(sim.world().building(docks).unwrap().storage.food, 2);
}

#[test]
fn scenario_c_hauler_takes_up_to_capacity() {
    let mut sim = harbour();
    let docks = sim.place_building(BuildingKind::Docks, Some(Coord::new(4, 5))).unwrap();
    let hauler_id = sim.build_hauler(docks).unwrap();
    sim.world_mut().building_mut(docks).unwrap().storage.food = 7;

    sim.end_turn();
    let hauler = sim.world().hauler(hauler_id).unwrap();
    assert_eq!(hauler.cargo.food, 5);
    assert_eq!(hauler.mode, HaulerMode::ReturningToBase);
    assert_eq!(sim.world().building(docks).unwrap().storage.food, 2);
}

#[test]
fn route_change_interrupts_harvest() {
    let mut sim = harbour();
    let docks = sim.place_building(BuildingKind::Docks, Some(Coord::new(4, 5))).unwrap();
    let ship_id = sim.build_ship(docks).unwrap();
    sim.set_docks_route(docks, Some(Coord::new(7, 5))).unwrap();
    {
        let ship = sim.world_mut().ship_mut(ship_id).unwrap();
        ship.q = 7;
        ship.r = 5;
        ship.mode = ShipMode::Harvesting;
        ship.harvest_turns_left = 1;
        ship.harvest_target = Some(Coord::new(7, 5));
        ship.cargo.food = 1;
    }

    sim.set_docks_route(docks, Some(Coord::new(8, 3))).unwrap();
    sim.end_turn();

    let ship = sim.world().ship(ship_id).unwrap();
    assert_eq!(ship.mode, ShipMode::ToTarget);
    assert_eq!(ship.harvest_turns_left, 0);
    assert_eq!(ship.cargo.food, 1);
    assert_eq!(ship.coord(), Coord::new(7, 5));
}

#[test]
fn capacities_hold_over_many_turns() {
    let mut sim = harbour();
    let docks = sim.place_building(BuildingKind::Docks, Some(Coord::new(4, 5))).unwrap();
    sim.build_ship(docks).unwrap();
    sim.build_ship(docks).unwrap();
    sim.build_hauler(docks).unwrap();
    sim.set_docks_route(docks, Some(Coord::new(7, 5))).unwrap();

    let starting_food = sim.world().resources.food;
    for _ in 0..40 {
        sim.end_turn();
        let world = sim.world();
        for ship in &world.ships {
            assert!(ship.cargo.total() <= world.params.economy.ship_cargo_cap);
        }
        for hauler in &world.haulers {
            assert!(hauler.cargo.total() <= world.params.economy.hauler_cargo_cap);
        }
        for building in &world.buildings {
            assert!(building.storage.food <= world.params.economy.storage_cap);
        }
    }
    assert!(sim.world().resources.food > starting_food);
}

#[test]
fn destroyed_docks_orphans_carriers() {
    let mut sim = harbour();
    let docks = sim.place_building(BuildingKind::Docks, Some(Coord::new(4, 5))).unwrap();
    let ship_id = sim.build_ship(docks).unwrap();
    let hauler_id = sim.build_hauler(docks).unwrap();
    sim.destroy_building(docks).unwrap();

    sim.end_turn();
    let world = sim.world();
    assert_eq!(world.ships.len(), 1);
    assert_eq!(world.ship(ship_id).unwrap().docks_id, None);
    assert_eq!(world.hauler(hauler_id).unwrap().mode, HaulerMode::Idle);
}
