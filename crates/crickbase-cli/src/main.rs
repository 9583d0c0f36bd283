// crickbase command-line entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Load config (copying defaults on first run)
// 3. Initialize tracing (stderr, or the configured log file)
// 4. Open the player store, unless predicting from a roster file
// 5. Run the command and print the result as JSON on stdout

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use crickbase_app::logging::init_tracing;
use crickbase_app::players;
use crickbase_app::predict::{predict_team, PredictRequest};
use crickbase_core::config::{self, Config};
use crickbase_core::db::Database;
use crickbase_core::import::{into_pool, load_roster};
use crickbase_core::player::{parse_tags, NewPlayer, PlayerStats, PlayerUpdate};
use crickbase_core::query::{PlayerQuery, Range, SortField, SortOrder};
use crickbase_predictor::{Format, Pitch, Strategy};

#[derive(Parser)]
#[command(name = "crickbase")]
#[command(about = "Cricket player database and playing XI predictor")]
#[command(version)]
struct Cli {
    /// Directory holding defaults/ and config/
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import players from a CSV or JSON roster file
    Import {
        file: PathBuf,
    },

    /// List players, optionally filtered and sorted
    List(ListArgs),

    /// Show one player
    Show {
        id: String,
    },

    /// Add a player
    Add(AddArgs),

    /// Change some fields of a player
    Update {
        id: String,

        #[command(flatten)]
        fields: UpdateArgs,
    },

    /// Delete a player
    Delete {
        id: String,
    },

    /// Predict a playing XI
    Predict(PredictArgs),
}

#[derive(Args)]
struct ListArgs {
    /// Case-insensitive match on name, country or role
    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    country: Option<String>,

    #[arg(long)]
    role: Option<String>,

    #[arg(long)]
    gender: Option<String>,

    /// Keep players carrying any of these tags (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    #[arg(long)]
    min_runs: Option<f64>,
    #[arg(long)]
    max_runs: Option<f64>,
    #[arg(long)]
    min_wickets: Option<f64>,
    #[arg(long)]
    max_wickets: Option<f64>,
    #[arg(long)]
    min_matches: Option<f64>,
    #[arg(long)]
    max_matches: Option<f64>,
    #[arg(long)]
    min_average: Option<f64>,
    #[arg(long)]
    max_average: Option<f64>,

    /// runs, wickets, matches, average, created_at or name
    #[arg(long, default_value = "created_at")]
    sort_by: SortField,

    /// asc or desc
    #[arg(long, default_value = "desc")]
    order: SortOrder,
}

impl From<ListArgs> for PlayerQuery {
    fn from(args: ListArgs) -> Self {
        PlayerQuery {
            search: args.search,
            country: args.country,
            role: args.role,
            gender: args.gender,
            tags: args.tags,
            runs: Range {
                min: args.min_runs,
                max: args.max_runs,
            },
            wickets: Range {
                min: args.min_wickets,
                max: args.max_wickets,
            },
            matches: Range {
                min: args.min_matches,
                max: args.max_matches,
            },
            average: Range {
                min: args.min_average,
                max: args.max_average,
            },
            sort_by: args.sort_by,
            sort_order: args.order,
        }
    }
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    country: String,

    /// Batsman, Bowler, All-rounder, Wicket-keeper or Wicket-keeper Batsman
    #[arg(long)]
    role: Option<String>,

    #[arg(long)]
    gender: Option<String>,

    #[arg(long)]
    bio: Option<String>,

    /// Comma-separated tags, e.g. "spin,captain"
    #[arg(long)]
    tags: Option<String>,

    #[arg(long, default_value_t = 0)]
    matches: u32,
    #[arg(long, default_value_t = 0)]
    runs: u32,
    #[arg(long, default_value_t = 0)]
    wickets: u32,
    #[arg(long, default_value_t = 0.0)]
    average: f64,
}

impl From<AddArgs> for NewPlayer {
    fn from(args: AddArgs) -> Self {
        NewPlayer {
            name: args.name,
            country: args.country,
            role: args.role,
            gender: args.gender,
            bio: args.bio,
            tags: args.tags.as_deref().map(parse_tags).unwrap_or_default(),
            stats: PlayerStats {
                matches: args.matches,
                runs: args.runs,
                wickets: args.wickets,
                average: args.average,
            },
        }
    }
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    role: Option<String>,
    /// Pass an empty string to clear
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    /// Comma-separated; replaces the existing tags
    #[arg(long)]
    tags: Option<String>,
    #[arg(long)]
    matches: Option<u32>,
    #[arg(long)]
    runs: Option<u32>,
    #[arg(long)]
    wickets: Option<u32>,
    #[arg(long)]
    average: Option<f64>,
}

impl From<UpdateArgs> for PlayerUpdate {
    fn from(args: UpdateArgs) -> Self {
        PlayerUpdate {
            name: args.name,
            country: args.country,
            role: args.role,
            gender: args.gender,
            bio: args.bio,
            tags: args.tags.as_deref().map(parse_tags),
            matches: args.matches,
            runs: args.runs,
            wickets: args.wickets,
            average: args.average,
        }
    }
}

#[derive(Args)]
struct PredictArgs {
    /// Restrict the pool to these player ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    ids: Vec<String>,

    /// Test, ODI or T20
    #[arg(long)]
    format: Option<Format>,

    /// balanced, flat, pace or spin
    #[arg(long)]
    pitch: Option<Pitch>,

    /// balanced, bat-heavy or bowl-heavy
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Force a player into the XI (repeatable)
    #[arg(long = "lock")]
    locks: Vec<String>,

    /// Lineup size
    #[arg(long, allow_negative_numbers = true)]
    max_xi: Option<i64>,

    /// JSON request body; flags given on the command line override it
    #[arg(long)]
    request: Option<PathBuf>,

    /// Predict from a roster file instead of the player store
    #[arg(long)]
    roster: Option<PathBuf>,
}

impl PredictArgs {
    fn into_request(self) -> Result<PredictRequest> {
        let mut request = match &self.request {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read request {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid request JSON in {}", path.display()))?
            }
            None => PredictRequest::default(),
        };
        if !self.ids.is_empty() {
            request.player_ids = Some(self.ids);
        }
        if !self.locks.is_empty() {
            request.locks = Some(self.locks);
        }
        request.format = self.format.or(request.format);
        request.pitch = self.pitch.or(request.pitch);
        request.strategy = self.strategy.or(request.strategy);
        request.max_xi = self.max_xi.or(request.max_xi);
        Ok(request)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match config::load_config_in(&cli.base_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_tracing(&config.logging)?;
    if let Some(e) = config_error {
        warn!("using built-in configuration: {}", e);
    }

    let base_dir = cli.base_dir.as_path();
    match cli.command {
        Commands::Predict(args) => run_predict(args, &config, base_dir),
        Commands::Import { file } => {
            let db = open_database(&config, base_dir)?;
            print_json(&players::import_roster(&db, &file)?)
        }
        Commands::List(args) => {
            let db = open_database(&config, base_dir)?;
            print_json(&players::list_players(&db, &args.into())?)
        }
        Commands::Show { id } => {
            let db = open_database(&config, base_dir)?;
            print_json(&players::get_player(&db, &id)?)
        }
        Commands::Add(args) => {
            let db = open_database(&config, base_dir)?;
            print_json(&players::create_player(&db, args.into())?)
        }
        Commands::Update { id, fields } => {
            let db = open_database(&config, base_dir)?;
            print_json(&players::update_player(&db, &id, &fields.into())?)
        }
        Commands::Delete { id } => {
            let db = open_database(&config, base_dir)?;
            players::delete_player(&db, &id)?;
            print_json(&serde_json::json!({ "message": "Player deleted" }))
        }
    }
}

fn run_predict(args: PredictArgs, config: &Config, base_dir: &Path) -> Result<()> {
    let roster = args.roster.clone();
    let request = args.into_request()?;
    let result = match roster {
        Some(path) => {
            let pool = into_pool(load_roster(&path)?);
            predict_team(pool.as_slice(), &request, &config.predictor)?
        }
        None => {
            let db = open_database(config, base_dir)?;
            predict_team(&db, &request, &config.predictor)?
        }
    };
    print_json(&result)
}

/// Open the configured store. Relative paths resolve against `base_dir`.
fn open_database(config: &Config, base_dir: &Path) -> Result<Database> {
    let mut path = config.db_path();
    if path.is_relative() {
        path = base_dir.join(path);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create database directory {}", dir.display()))?;
    }
    let path_str = path.to_string_lossy();
    let db = Database::open(&path_str).context("failed to open database")?;
    info!("database opened at {}", path_str);
    Ok(db)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}
