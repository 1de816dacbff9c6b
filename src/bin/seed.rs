use anyhow::{Context, Result};
use clap::Parser;
use loregraph::db::{migrate, Db};
use loregraph::store::{Faction, MobileSuit, Pilot, Store};
use loregraph::Config;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Load entity records from a JSON file into the loregraph store")]
struct Args {
    /// JSON file with factions, pilots and mobile_suits arrays
    file: PathBuf,

    /// Clear existing entity tables before loading
    #[arg(short, long)]
    replace: bool,
}

/// Seed-file records: ids are optional and generated when absent.
#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    factions: Vec<FactionSeed>,
    #[serde(default)]
    pilots: Vec<PilotSeed>,
    #[serde(default)]
    mobile_suits: Vec<SuitSeed>,
}

#[derive(Debug, Deserialize)]
struct FactionSeed {
    faction_id: Option<String>,
    name: String,
    era: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    leaders: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PilotSeed {
    pilot_id: Option<String>,
    name: String,
    affiliation: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    mobile_suits: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SuitSeed {
    suit_id: Option<String>,
    name: String,
    faction: Option<String>,
    manufacturer: Option<String>,
    operator: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    pilots: Vec<String>,
}

fn fresh_id(explicit: Option<String>) -> String {
    explicit.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();

    log::info!("Starting loregraph seeding from {}", args.file.display());

    // Load configuration
    let config = Config::load()?;
    log::info!("Database path: {}", config.db_path().display());

    // Initialize database
    let db = Db::new(config.db_path());

    // Run migrations
    let migrations_dir = Path::new("migrations");
    db.with_connection(|conn| {
        migrate::run_migrations(conn, migrations_dir)
    }).await?;

    if args.replace {
        log::info!("Clearing existing entity tables");
        db.with_connection(|conn| {
            conn.execute("DELETE FROM factions", [])?;
            conn.execute("DELETE FROM pilots", [])?;
            conn.execute("DELETE FROM mobile_suits", [])?;
            Ok(())
        })
        .await?;
    }

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read seed file: {}", args.file.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw)
        .context("Failed to parse seed file JSON")?;

    let store = Store::new(db);

    for f in seed.factions {
        store
            .insert_faction(Faction {
                faction_id: fresh_id(f.faction_id),
                name: f.name,
                era: f.era,
                description: f.description,
                image_url: f.image_url,
                leaders: f.leaders,
            })
            .await?;
    }

    for p in seed.pilots {
        store
            .insert_pilot(Pilot {
                pilot_id: fresh_id(p.pilot_id),
                name: p.name,
                affiliation: p.affiliation,
                description: p.description,
                image_url: p.image_url,
                mobile_suits: p.mobile_suits,
            })
            .await?;
    }

    for s in seed.mobile_suits {
        store
            .insert_suit(MobileSuit {
                suit_id: fresh_id(s.suit_id),
                name: s.name,
                faction: s.faction,
                manufacturer: s.manufacturer,
                operator: s.operator,
                description: s.description,
                image_url: s.image_url,
                pilots: s.pilots,
            })
            .await?;
    }

    let (factions, pilots, suits) = store.entity_counts().await?;
    log::info!(
        "Seeding complete: {} factions, {} pilots, {} mobile suits in store",
        factions, pilots, suits
    );

    Ok(())
}
