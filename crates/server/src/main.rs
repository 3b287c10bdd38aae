//! Cartola-Ingest — CartolaFC data ingestion
//!
//! Usage:
//!   cartola-ingest serve --port 8000     — Launch web server
//!   cartola-ingest sync --round 16       — Ingest clubs, market and fixtures into SQLite
//!   cartola-ingest sync -r 16 --json     — Same, printing the report as JSON
//!   cartola-ingest clubs                 — Print the current club roster
//!   cartola-ingest login                 — Obtain a login token

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::{Parser, Subcommand};
use ingest::{sync_round, CartolaClient, IngestConfig, IngestError};
use persistence::{Club, Database, DbResult};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "cartola-ingest")]
#[command(about = "CartolaFC data ingestion", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite database path
    #[arg(long, global = true, env = "CARTOLA_DB_PATH", default_value = "data/cartola.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// Ingest clubs, players, positions, statuses, fixtures and score records
    Sync {
        /// Round whose fixtures to ingest
        #[arg(short, long)]
        round: i64,
        /// Print the sync report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch and print the current club roster
    Clubs,
    /// Log in and print the session token
    Login {
        #[arg(long, env = "CARTOLA_EMAIL")]
        email: String,
        #[arg(long, env = "CARTOLA_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Clone)]
struct AppState {
    client: Arc<CartolaClient>,
    db: Arc<Database>,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,ingest=debug,persistence=debug,cartola_ingest=debug")
    } else {
        EnvFilter::new("info,ingest=info,persistence=info,cartola_ingest=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = IngestConfig::from_env()?;

    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(&config, &cli.db, &host, port).await?;
        }
        Commands::Sync { round, json } => {
            cmd_sync(&config, &cli.db, round, json).await?;
        }
        Commands::Clubs => {
            cmd_clubs(&config, &cli.db).await?;
        }
        Commands::Login { email, password } => {
            cmd_login(&config, &cli.db, &email, &password).await?;
        }
    }

    Ok(())
}

async fn open(config: &IngestConfig, db_path: &str) -> anyhow::Result<(Arc<Database>, CartolaClient)> {
    let db = Database::new(db_path).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })?;
    info!("Database initialized: {}", db_path);

    let db = Arc::new(db);
    let client = CartolaClient::new(config, db.clone())?;
    Ok((db, client))
}

// ============================================================================
// Serve command — Axum web server
// ============================================================================

async fn cmd_serve(config: &IngestConfig, db_path: &str, host: &str, port: u16) -> anyhow::Result<()> {
    info!("Cartola-Ingest v{} starting...", APP_VERSION);

    let (db, client) = open(config, db_path).await?;
    let state = AppState {
        client: Arc::new(client),
        db,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Cartola-Ingest v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /                        - Index");
    println!("  GET  /clubes/                 - Current club abbreviations");
    println!("  GET  /api/health              - Health check");
    println!("  GET  /api/clubs               - Stored clubs");
    println!("  GET  /api/matches/:round      - Stored fixtures of a round");
    println!("  GET  /api/scores/:year/:round - Stored score records of a round");
    println!("\n  Upstream: {}", config.api_url);
    println!("  Database: {}", db_path);
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/clubs", get(api_clubs))
        .route("/matches/:round", get(api_matches))
        .route("/scores/:year/:round", get(api_scores));

    Router::new()
        .route("/", get(index))
        .route("/clubes/", get(clubes))
        .nest("/api", api_routes)
        .with_state(state)
}

// ============================================================================
// CLI commands
// ============================================================================

async fn cmd_sync(config: &IngestConfig, db_path: &str, round: i64, json: bool) -> anyhow::Result<()> {
    let (db, client) = open(config, db_path).await?;

    let report = sync_round(&client, &db, round).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\nSync complete (round {})", report.round);
    println!("  {:<14} {:>6}", "clubs", report.clubs);
    println!("  {:<14} {:>6}", "positions", report.positions);
    println!("  {:<14} {:>6}", "statuses", report.statuses);
    println!("  {:<14} {:>6}", "players", report.players);
    println!("  {:<14} {:>6}", "matches", report.matches);
    println!("  {:<14} {:>6}", "score records", report.score_records);

    Ok(())
}

async fn cmd_clubs(config: &IngestConfig, db_path: &str) -> anyhow::Result<()> {
    let (_db, client) = open(config, db_path).await?;
    let clubs = client.clubs().await?;

    println!("  {:>5}  {:<4} {}", "ID", "ABR", "Name");
    println!("  {}", "-".repeat(40));
    for club in &clubs {
        println!("  {:>5}  {:<4} {}", club.id, club.abbreviation, club.name);
    }

    Ok(())
}

async fn cmd_login(config: &IngestConfig, db_path: &str, email: &str, password: &str) -> anyhow::Result<()> {
    let (_db, client) = open(config, db_path).await?;
    let token = client.login(email, password).await?;
    println!("{}", token);
    Ok(())
}

// ============================================================================
// HTTP handlers
// ============================================================================

/// GET /
async fn index() -> &'static str {
    "Index"
}

/// GET /clubes/ — abbreviations of the current roster, comma separated
async fn clubes(State(state): State<AppState>) -> Result<String, (StatusCode, String)> {
    match state.client.clubs().await {
        Ok(clubs) => Ok(render_abbreviations(&clubs)),
        Err(e) => {
            error!("Failed to fetch clubs: {}", e);
            Err((status_for(&e), e.to_string()))
        }
    }
}

/// GET /api/health
async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "cartola-ingest",
        "version": APP_VERSION,
    }))
}

// ============================================================================
// API Handlers — Stored records
// ============================================================================

/// GET /api/clubs — clubs as last ingested
async fn api_clubs(State(state): State<AppState>) -> Json<serde_json::Value> {
    listing(state.db.clubs().all().await, "clubs")
}

/// GET /api/matches/:round
async fn api_matches(State(state): State<AppState>, Path(round): Path<i64>) -> Json<serde_json::Value> {
    listing(state.db.matches().for_round(round).await, "matches")
}

/// GET /api/scores/:year/:round
async fn api_scores(
    State(state): State<AppState>,
    Path((year, round)): Path<(i64, i64)>,
) -> Json<serde_json::Value> {
    listing(state.db.scores().for_round(year, round).await, "score records")
}

fn listing<T: serde::Serialize>(result: DbResult<Vec<T>>, what: &str) -> Json<serde_json::Value> {
    match result {
        Ok(records) => Json(serde_json::json!({
            "success": true,
            "data": records,
            "total": records.len(),
        })),
        Err(e) => Json(serde_json::json!({
            "success": false,
            "error": format!("Failed to query {}: {}", what, e),
            "data": [],
            "total": 0,
        })),
    }
}

fn render_abbreviations(clubs: &[Club]) -> String {
    clubs
        .iter()
        .map(|c| c.abbreviation.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upstream trouble is a bad gateway; anything on our side is a 500
fn status_for(err: &IngestError) -> StatusCode {
    match err {
        IngestError::Store(_) | IngestError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest::TransportError;
    use persistence::{Player, Position, ScoreRecord, ScoutCode, Scouts, Status};
    use rust_decimal::Decimal;

    fn club(id: i64, abbreviation: &str) -> Club {
        Club {
            id,
            name: abbreviation.to_string(),
            abbreviation: abbreviation.to_string(),
            badge_30x30: String::new(),
            badge_45x45: String::new(),
            badge_60x60: String::new(),
        }
    }

    #[test]
    fn test_render_abbreviations() {
        assert_eq!(render_abbreviations(&[]), "");
        assert_eq!(render_abbreviations(&[club(262, "FLA")]), "FLA");
        assert_eq!(
            render_abbreviations(&[club(262, "FLA"), club(263, "BOT")]),
            "FLA, BOT"
        );
    }

    #[test]
    fn test_status_for_errors() {
        let upstream = IngestError::ConnectionExhausted {
            attempts: 3,
            last: TransportError::new(ingest::TransportErrorKind::Connect, "refused"),
        };
        assert_eq!(status_for(&upstream), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&IngestError::HttpStatus {
                status: 503,
                body: String::new()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&IngestError::Config("bad".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cli_parses_sync() {
        let cli = Cli::try_parse_from(["cartola-ingest", "--db", "x.db", "sync", "--round", "16"]).unwrap();
        assert_eq!(cli.db, "x.db");
        assert!(matches!(cli.command, Commands::Sync { round: 16, json: false }));

        let cli = Cli::try_parse_from(["cartola-ingest", "sync", "-r", "16", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Sync { round: 16, json: true }));
    }

    fn state_with(db: Database) -> AppState {
        let db = Arc::new(db);
        let client = CartolaClient::new(&IngestConfig::default(), db.clone()).unwrap();
        AppState {
            client: Arc::new(client),
            db,
        }
    }

    async fn seeded_db() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.clubs()
            .upsert_all(&[club(262, "FLA"), club(263, "BOT")])
            .await
            .unwrap();
        db.players()
            .upsert_players(&[Player {
                id: 37788,
                name: "Diego Ribas da Cunha".into(),
                nickname: "Diego".into(),
                photo: String::new(),
            }])
            .await
            .unwrap();
        db.players()
            .upsert_positions(&[Position {
                id: 4,
                name: "Meia".into(),
                abbreviation: "mei".into(),
            }])
            .await
            .unwrap();
        db.players()
            .upsert_statuses(&[Status {
                id: 7,
                name: "Provável".into(),
            }])
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_api_clubs_lists_stored_clubs() {
        let state = state_with(seeded_db().await);

        let Json(body) = api_clubs(State(state)).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 2);
        // ordered by abbreviation
        assert_eq!(body["data"][0]["abbreviation"], "BOT");
        assert_eq!(body["data"][1]["id"], 262);
    }

    #[tokio::test]
    async fn test_api_matches_empty_round() {
        let state = state_with(seeded_db().await);

        let Json(body) = api_matches(State(state), Path(16)).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 0);
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_api_scores_serializes_scouts_by_code() {
        let db = seeded_db().await;
        let mut scouts = Scouts::default();
        scouts.set(ScoutCode::Goal, 1);
        db.scores()
            .upsert_all(&[ScoreRecord {
                year: 2017,
                round: 16,
                player_id: 37788,
                club_id: 262,
                position_id: 4,
                status_id: 7,
                score: Decimal::new(53, 1),
                price: Decimal::new(1472, 2),
                price_delta: Decimal::new(-45, 2),
                average: Decimal::new(418, 2),
                games_played: 11,
                scouts,
            }])
            .await
            .unwrap();
        let state = state_with(db);

        let Json(body) = api_scores(State(state), Path((2017, 16))).await;

        assert_eq!(body["total"], 1);
        let record = &body["data"][0];
        assert_eq!(record["player_id"], 37788);
        assert_eq!(record["score"], "5.3");
        assert_eq!(record["scouts"]["G"], 1);
        assert_eq!(record["scouts"]["A"], 0);
    }
}
