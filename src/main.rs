use loregraph::config::GraphConfig;
use loregraph::db::{migrate, Db};
use loregraph::http::HttpServer;
use loregraph::store::Store;
use loregraph::{Config, Resolver};
use anyhow::Result;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "serve" => {
            // HTTP graph API mode
            run_http_server().await?;
        }
        // "verify" and anything else: verify database schema
        _ => {
            run_schema_verification().await?;
        }
    }

    Ok(())
}

/// Build the resolver from config (shared by serve and verify paths)
fn build_resolver(config: &Config) -> Resolver {
    let db = Db::new(config.db_path());
    let store = Store::new(db);
    Resolver::new(store, config.graph.clone())
}

/// Run HTTP graph server
async fn run_http_server() -> Result<()> {
    log::info!("Starting loregraph HTTP server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;

    // Initialize database
    let db = Db::new(config.db_path());

    // Run migrations
    let migrations_dir = Path::new("migrations");
    db.with_connection(|conn| {
        migrate::run_migrations(conn, migrations_dir)
    }).await?;

    log::info!("Database initialized successfully");

    let resolver = build_resolver(&config);
    let http_server = HttpServer::new(resolver, &config);
    http_server.run(config.http_server.port).await?;

    Ok(())
}

/// Run database schema verification
async fn run_schema_verification() -> Result<()> {
    log::info!("Starting loregraph v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    log::info!("Configuration loaded successfully");
    log::info!("Database path: {}", config.db_path().display());
    log::info!("Root factions: {}", config.graph.root_factions.join(", "));

    // Initialize database
    let db = Db::new(config.db_path());

    // Run migrations
    let migrations_dir = Path::new("migrations");
    db.with_connection(|conn| {
        migrate::run_migrations(conn, migrations_dir)
    }).await?;

    log::info!("Database initialized successfully");

    verify_database_schema(&db).await?;
    report_entity_counts(&config.graph, Store::new(db)).await?;

    log::info!("Ready to serve: run with the serve command");

    Ok(())
}

/// Verify that all expected database objects exist
async fn verify_database_schema(db: &Db) -> Result<()> {
    use loregraph::error::LoregraphError;

    db.with_connection(|conn| {
        // Check tables
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let tables: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        let expected_tables = vec!["factions", "mobile_suits", "pilots", "schema_migrations"];
        let mut all_tables_exist = true;

        for table in &expected_tables {
            if !tables.iter().any(|t| t == table) {
                log::error!("Missing table: {}", table);
                all_tables_exist = false;
            } else {
                log::debug!("✓ Table exists: {}", table);
            }
        }

        if !all_tables_exist {
            return Err(LoregraphError::Config("Not all required tables exist".to_string()));
        }

        // Check name indexes
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%' ORDER BY name")?;
        let indexes: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        let expected_indexes = vec![
            "idx_factions_name",
            "idx_pilots_name",
            "idx_mobile_suits_name",
            "idx_mobile_suits_faction",
        ];

        for index_name in &expected_indexes {
            if indexes.iter().any(|i| i == index_name) {
                log::debug!("✓ Index exists: {}", index_name);
            } else {
                log::warn!("Index not found: {} (migration 001 may not be applied)", index_name);
            }
        }

        // Check pragmas
        let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            return Err(LoregraphError::Config(format!("Journal mode is not WAL: {}", journal_mode)));
        }
        log::debug!("✓ Journal mode: WAL");

        let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        if foreign_keys != 1 {
            return Err(LoregraphError::Config("Foreign keys not enabled".to_string()));
        }
        log::debug!("✓ Foreign keys enabled");

        // Integrity check
        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(LoregraphError::Config(format!("Database integrity check failed: {}", integrity)));
        }
        log::info!("✓ Database integrity: OK");

        Ok(())
    }).await?;

    log::info!("✓ Database schema verification complete");
    Ok(())
}

/// Report entity counts and check the root allow-list resolves to something
async fn report_entity_counts(graph: &GraphConfig, store: Store) -> Result<()> {
    let (factions, pilots, suits) = store.entity_counts().await?;
    log::info!(
        "Entities: {} factions, {} pilots, {} mobile suits",
        factions, pilots, suits
    );

    let roots = store.factions_by_names(&graph.root_factions).await?;
    if roots.is_empty() {
        log::warn!(
            "No root factions found in store; the graph will bootstrap empty. \
            Seed data or adjust graph.root_factions in config.toml."
        );
    } else {
        log::info!("✓ {} of {} root factions present", roots.len(), graph.root_factions.len());
    }

    Ok(())
}
