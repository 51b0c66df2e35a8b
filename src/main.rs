mod api;
mod config;
mod error;
mod explore;
mod models;
mod render;
mod showcase;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{AniListClient, Variables, decode};
use crate::config::ClientConfig;
use crate::models::{MediaData, MediaSeason, PageData};
use crate::render::{banner, render_details, render_page};
use crate::showcase::Example;

const DEMO_ANIME_ID: i32 = 101922;
const DEMO_SEARCH: &str = "Attack on Titan";
const DEMO_SEASON: MediaSeason = MediaSeason::Winter;
const DEMO_YEAR: i32 = 2023;

#[derive(Parser)]
#[command(name = "anilist-probe")]
#[command(about = "Query and explore the AniList GraphQL API", long_about = None)]
struct Cli {
    /// TOML file with `endpoint` and `user_agent` overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    endpoint: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Details, search and seasonal listing in one go
    Demo,
    Details {
        #[arg(long, default_value_t = DEMO_ANIME_ID)]
        id: i32,
    },
    Search {
        #[arg(short, long)]
        text: String,
        #[arg(long, default_value_t = 1)]
        page: i32,
        #[arg(long, default_value_t = 5)]
        per_page: i32,
    },
    Seasonal {
        #[arg(long)]
        year: i32,
        #[arg(long, value_enum, ignore_case = true)]
        season: MediaSeason,
        #[arg(long, default_value_t = 1)]
        page: i32,
        #[arg(long, default_value_t = 5)]
        per_page: i32,
    },
    /// Run an arbitrary GraphQL document and print the raw JSON response
    Query(QueryArgs),
    /// Print the key/type layout of the canned responses
    Explore {
        #[arg(value_enum, default_value_t = ExploreTarget::All)]
        target: ExploreTarget,
    },
    Showcase {
        #[arg(value_enum)]
        example: Option<Example>,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["query", "file"])))]
struct QueryArgs {
    #[arg(short, long)]
    query: Option<String>,
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Variables as a JSON object
    #[arg(short, long, conflicts_with = "variables_file")]
    variables: Option<String>,
    #[arg(long)]
    variables_file: Option<PathBuf>,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExploreTarget {
    Details,
    Search,
    Seasonal,
    All,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.endpoint)?;
    let client = AniListClient::new(config)?;
    debug!("Using endpoint {}", client.endpoint());

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => {
            show_details(&client, DEMO_ANIME_ID);
            show_search(&client, DEMO_SEARCH, 1, 5);
            show_seasonal(&client, DEMO_YEAR, DEMO_SEASON, 1, 5);
        }
        Commands::Details { id } => show_details(&client, id),
        Commands::Search {
            text,
            page,
            per_page,
        } => show_search(&client, &text, page, per_page),
        Commands::Seasonal {
            year,
            season,
            page,
            per_page,
        } => show_seasonal(&client, year, season, page, per_page),
        Commands::Query(args) => run_query(&client, &args)?,
        Commands::Explore { target } => run_explore(&client, target),
        Commands::Showcase { example } => {
            let examples = match example {
                Some(e) => vec![e],
                None => Example::ALL.to_vec(),
            };
            for example in examples {
                println!("{}", banner(example.heading()));
                match example.run(&client) {
                    Ok(out) => println!("{}", out),
                    Err(e) => eprintln!("❌ {}", e),
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, endpoint: Option<String>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    Ok(match endpoint {
        Some(endpoint) => config.with_endpoint(endpoint),
        None => config,
    })
}

fn show_details(client: &AniListClient, id: i32) {
    println!("{}", banner(&format!("ANIME DETAILS (ID: {})", id)));
    match client.anime_by_id(id).and_then(decode::<MediaData>) {
        Ok(response) => println!("{}", render_details(&response)),
        Err(e) => eprintln!("❌ Error fetching anime details: {}", e),
    }
}

fn show_search(client: &AniListClient, text: &str, page: i32, per_page: i32) {
    println!(
        "{}",
        banner(&format!("SEARCH RESULTS: '{}' (Page {})", text, page))
    );
    match client
        .search_anime(text, page, per_page)
        .and_then(decode::<PageData>)
    {
        Ok(response) => println!("{}", render_page(&response, "Result")),
        Err(e) => eprintln!("❌ Error searching anime: {}", e),
    }
}

fn show_seasonal(client: &AniListClient, year: i32, season: MediaSeason, page: i32, per_page: i32) {
    println!(
        "{}",
        banner(&format!("{} {} ANIME (Page {})", season, year, page))
    );
    match client
        .seasonal_anime(year, season, page, per_page)
        .and_then(decode::<PageData>)
    {
        Ok(response) => println!("{}", render_page(&response, "Anime")),
        Err(e) => eprintln!("❌ Error fetching seasonal anime: {}", e),
    }
}

fn run_explore(client: &AniListClient, target: ExploreTarget) {
    println!("Exploring AniList API Response Structure");

    if matches!(target, ExploreTarget::Details | ExploreTarget::All) {
        println!("{}", banner("ANIME DETAILS STRUCTURE"));
        match client.anime_by_id(DEMO_ANIME_ID) {
            Ok(value) => {
                println!("\nMedia Object Structure:");
                println!("{}", explore::explore_response(&value, "/data/Media", "Media"));
            }
            Err(e) => eprintln!("❌ {}", e),
        }
    }

    if matches!(target, ExploreTarget::Search | ExploreTarget::All) {
        println!("{}", banner("SEARCH RESULTS STRUCTURE"));
        match client.search_anime(DEMO_SEARCH, 1, 1) {
            Ok(value) => {
                println!("\nPage Object Structure:");
                println!("{}", explore::explore_response(&value, "/data/Page", "Page"));
            }
            Err(e) => eprintln!("❌ {}", e),
        }
    }

    if matches!(target, ExploreTarget::Seasonal | ExploreTarget::All) {
        println!("{}", banner("SEASONAL ANIME STRUCTURE"));
        match client.seasonal_anime(DEMO_YEAR, DEMO_SEASON, 1, 1) {
            Ok(value) => {
                println!("\nPage Object Structure:");
                println!("{}", explore::explore_response(&value, "/data/Page", "Page"));
            }
            Err(e) => eprintln!("❌ {}", e),
        }
    }
}

/// Service-level `errors` are printed like any other response; only local
/// and transport failures end up in the returned error.
fn run_query(client: &AniListClient, args: &QueryArgs) -> Result<()> {
    let query = read_query(args)?;
    let variables = load_variables(args)?;

    let result = client.execute(&query, variables.as_ref())?;
    let formatted = serde_json::to_string_pretty(&result)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &formatted)
                .with_context(|| format!("Failed to write results to {:?}", path))?;
            info!("Wrote {} bytes to {:?}", formatted.len(), path);
            println!("Results saved to {}", path.display());
        }
        None => println!("{}", formatted),
    }
    Ok(())
}

fn read_query(args: &QueryArgs) -> Result<String> {
    match (&args.query, &args.file) {
        (Some(query), _) => Ok(query.clone()),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file {:?}", path)),
        (None, None) => bail!("Either --query or --file is required"),
    }
}

fn load_variables(args: &QueryArgs) -> Result<Option<Variables>> {
    let text = match (&args.variables, &args.variables_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read variables file {:?}", path))?,
        (None, None) => return Ok(None),
    };
    parse_variables(&text).map(Some)
}

fn parse_variables(text: &str) -> Result<Variables> {
    let value: Value = serde_json::from_str(text).context("Variables are not valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("Variables must be a JSON object, got {}", other),
    }
}
