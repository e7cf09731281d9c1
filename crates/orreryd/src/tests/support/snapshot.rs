//! Fixed simulation state used across the suites.

use crate::upstream::{
    Environment, Galaxy, Planet, Position, ResourceDeposit, Snapshot, Star,
};

/// Two stars, three planets and a handful of deposits.
#[must_use]
pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        environment: Environment {
            version: String::from("0.10.30.22292"),
            current_planet: Some(String::from("Alpha Orrery I")),
            current_star: Some(String::from("Alpha Orrery")),
        },
        galaxy: Galaxy {
            seed: 1_234_567,
            birth_star_id: 1,
            birth_planet_id: 101,
            habitable_count: 1,
            stars: vec![alpha(), beta()],
        },
    }
}

fn alpha() -> Star {
    Star {
        id: 1,
        name: String::from("Alpha"),
        display_name: Some(String::from("Alpha Orrery")),
        position: Position {
            x: 0.5,
            y: -1.25,
            z: 2.75,
        },
        kind: String::from("MainSeqStar"),
        spectr: String::from("G"),
        temperature: 5_778.5,
        luminosity: 1.5,
        radius: 1.25,
        dyson_radius: 4.5,
        planets: vec![
            planet(101, "Alpha Orrery I", "Ocean", deposits_of_alpha_one()),
            planet(102, "Alpha Orrery II", "Lava", Vec::new()),
        ],
    }
}

fn beta() -> Star {
    let mut far = planet(201, "Beta I", "Desert", Vec::new());
    far.position = Position {
        x: 40.5,
        y: 3.5,
        z: -7.25,
    };
    Star {
        id: 2,
        name: String::from("Beta"),
        display_name: None,
        position: Position {
            x: 40.25,
            y: 3.5,
            z: -7.5,
        },
        kind: String::from("WhiteDwarf"),
        spectr: String::from("X"),
        temperature: 9_800.5,
        luminosity: 0.25,
        radius: 0.5,
        dyson_radius: 1.5,
        planets: vec![far],
    }
}

fn planet(id: i64, name: &str, kind: &str, resources: Vec<ResourceDeposit>) -> Planet {
    Planet {
        id,
        name: name.to_owned(),
        kind: kind.to_owned(),
        singularity: String::from("None"),
        theme: 8,
        radius: 200.5,
        orbit_radius: 1.75,
        rotation_period: 420.5,
        obliquity: 12.5,
        orbital_period: 3_600.5,
        position: Position {
            x: 1.5,
            y: -0.75,
            z: 0.25,
        },
        resources,
    }
}

fn deposits_of_alpha_one() -> Vec<ResourceDeposit> {
    vec![
        deposit("Iron", 5_000, 6),
        deposit("Copper", 0, 2),
        deposit("Titanium", 0, 0),
    ]
}

fn deposit(kind: &str, amount: i64, vein_count: i64) -> ResourceDeposit {
    ResourceDeposit {
        kind: kind.to_owned(),
        amount,
        vein_count,
    }
}
