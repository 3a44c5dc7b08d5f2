use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use coach_diagram::clock::{Clock, SystemClock};
use coach_diagram::config::Config;
use coach_diagram::document::{Document, MAX_TITLE_CHARS, SportType, new_id};
use coach_diagram::schema;
use coach_diagram::store::{DiagramStore, FsStore, Scope, ScopeFilter};
use coach_diagram::svg::SvgRenderer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Render, validate and manage coach diagrams
#[derive(Parser, Debug)]
#[command(name = "coach-diagram", version)]
#[command(about = "Render, validate and manage coach diagrams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a diagram JSON file to SVG
    Render {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Prefix for court and marker image paths
        #[arg(long, env = "COACH_DIAGRAM_BASE_URL")]
        base_url: Option<String>,

        /// TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Validate a diagram JSON file and print its canonical form
    Validate {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
    /// Create an empty diagram
    New {
        #[arg(long)]
        title: String,

        /// football, basketball, handball, hockey, innebandy or custom
        #[arg(long, default_value = "football")]
        sport: String,

        #[arg(long)]
        id: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "OUTPUT", conflicts_with = "store")]
        output: Option<PathBuf>,

        /// Create the diagram in a store directory instead
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,

        #[arg(long, requires = "store")]
        tenant: Option<String>,
    },
    /// List diagrams in a store directory, most recently updated first
    List {
        #[arg(long, value_name = "DIR")]
        store: PathBuf,

        #[arg(long, conflicts_with = "global")]
        tenant: Option<String>,

        #[arg(long)]
        global: bool,
    },
    /// Delete a diagram from a store directory
    Delete {
        #[arg(long, value_name = "DIR")]
        store: PathBuf,

        id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coach_diagram=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().command {
        Command::Render {
            input,
            output,
            base_url,
            config,
        } => render(&input, output.as_deref(), base_url, config.as_deref()),
        Command::Validate { input } => {
            let doc = read_document(&input)?;
            println!("{}", schema::to_json(&doc)?);
            Ok(())
        }
        Command::New {
            title,
            sport,
            id,
            output,
            store,
            tenant,
        } => {
            let sport = SportType::from_str(&sport)
                .with_context(|| format!("Unknown sport type: {}", sport))?;
            let title: String = title.chars().take(MAX_TITLE_CHARS).collect();
            let now = SystemClock.now();

            if let Some(dir) = store {
                if id.is_some() {
                    bail!("--id cannot be combined with --store; the store assigns ids");
                }
                let scope = tenant.map_or(Scope::Global, Scope::Tenant);
                let mut store = FsStore::open(&dir)
                    .with_context(|| format!("Failed to open store {}", dir.display()))?;
                let doc = store.create(&title, sport, scope, now)?;
                println!("{}", doc.id);
                return Ok(());
            }

            let doc = Document::new(id.unwrap_or_else(new_id), title, sport, now);
            let json = schema::to_json(&doc).context("Failed to encode diagram")?;
            schema::validate(&json).context("New diagram failed validation")?;
            write_output(output.as_deref(), &json)
        }
        Command::List {
            store,
            tenant,
            global,
        } => {
            let filter = match (tenant, global) {
                (Some(t), _) => ScopeFilter::Tenant(t),
                (None, true) => ScopeFilter::Global,
                (None, false) => ScopeFilter::All,
            };
            let store = FsStore::open(&store)
                .with_context(|| format!("Failed to open store {}", store.display()))?;
            for row in store.list(&filter)? {
                let scope = match &row.scope {
                    Scope::Global => "global".to_string(),
                    Scope::Tenant(t) => format!("tenant:{}", t),
                };
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.id,
                    row.updated_at.to_rfc3339(),
                    row.sport_type.as_str(),
                    scope,
                    row.title
                );
            }
            Ok(())
        }
        Command::Delete { store, id } => {
            let mut store = FsStore::open(&store)
                .with_context(|| format!("Failed to open store {}", store.display()))?;
            store.delete(&id)?;
            Ok(())
        }
    }
}

fn render(
    input: &Path,
    output: Option<&Path>,
    base_url: Option<String>,
    config: Option<&Path>,
) -> Result<()> {
    let mut config = match config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if base_url.is_some() {
        config.render.base_url = base_url;
    }

    let doc = read_document(input)?;
    let svg = SvgRenderer::new(config.render).render(&doc);
    write_output(output, &svg)
}

fn read_document(path: &Path) -> Result<Document> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    schema::validate(&raw).with_context(|| format!("Invalid diagram {}", path.display()))
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
