//! costar - command-line front end
//!
//! Manages the persisted title/people selections and runs comparisons over them.
//!
//! **Usage:**
//! ```bash
//! costar titles add 27205 "Inception" --year 2010
//! costar titles add 1399 "Game of Thrones" --series
//! costar people list
//! costar compare titles
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use costar_common::config::{ensure_root_folder, resolve_root_folder, TomlConfig};
use costar_common::db::init_database;
use costar_common::events::ComparisonMode;
use costar_common::{EventBus, KeyValueStore, MemoryKvStore, SqliteKvStore};
use costar_engine::intersect::Intersectable;
use costar_engine::{
    CommonEntity, ComparisonDomain, ComparisonOrchestrator, ComparisonOutcome, ComparisonStatus, MetadataProvider,
    NormalizedPerson, NormalizedTitle, SelectionEntry, SelectionStore, SharedCast, SharedFilmography,
    TitleKey, TmdbClient,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for costar
#[derive(Parser, Debug)]
#[command(name = "costar")]
#[command(about = "Find the people and titles your selections have in common")]
#[command(version)]
struct Cli {
    /// Root folder holding the database
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Bootstrap config file (default: <config dir>/costar/costar.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep selections in memory only (nothing is read from or written to disk)
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the selected titles
    Titles {
        #[command(subcommand)]
        action: SelectionAction,
    },
    /// Manage the selected people
    People {
        #[command(subcommand)]
        action: SelectionAction,
    },
    /// Compare the current selection
    Compare {
        #[command(subcommand)]
        target: CompareTarget,
    },
}

#[derive(Subcommand, Debug)]
enum SelectionAction {
    /// Add an entry; an entry with the same identity is replaced in place
    Add(EntryArgs),
    /// Remove the entry with this id
    Remove {
        id: u64,
        /// The id is a series id (titles only)
        #[arg(long)]
        series: bool,
    },
    /// Replace the entry at a 0-based position
    Update {
        index: usize,
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Move the entry at FROM to TO (0-based)
    Move { from: usize, to: usize },
    /// Remove every entry
    Clear,
    /// Print the selection in order
    List,
}

#[derive(Args, Debug)]
struct EntryArgs {
    /// Provider id
    id: u64,
    /// Display name
    name: String,
    /// Entry is a series rather than a movie (titles only)
    #[arg(long)]
    series: bool,
    /// Release year (titles only)
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum CompareTarget {
    /// Cast and crew shared by every selected title
    Titles,
    /// Titles shared by every selected person
    People,
}

/// Maps CLI arguments onto a selection entry type
trait CliEntry: SelectionEntry {
    fn from_args(args: &EntryArgs) -> Self;

    fn key_from(id: u64, series: bool) -> Self::Key;

    fn describe(&self) -> String;
}

impl CliEntry for NormalizedTitle {
    fn from_args(args: &EntryArgs) -> Self {
        let title = NormalizedTitle::new(Self::key_from(args.id, args.series), args.name.clone());
        match args.year {
            Some(year) => title.with_release_year(year),
            None => title,
        }
    }

    fn key_from(id: u64, series: bool) -> TitleKey {
        if series {
            TitleKey::series(id)
        } else {
            TitleKey::movie(id)
        }
    }

    fn describe(&self) -> String {
        match self.release_year {
            Some(year) => format!("{} ({}) [{}]", self.display_name, year, self.key()),
            None => format!("{} [{}]", self.display_name, self.key()),
        }
    }
}

impl CliEntry for NormalizedPerson {
    fn from_args(args: &EntryArgs) -> Self {
        NormalizedPerson::new(args.id, args.name.clone())
    }

    fn key_from(id: u64, _series: bool) -> u64 {
        id
    }

    fn describe(&self) -> String {
        format!("{} [person/{}]", self.name, self.id)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TomlConfig::load_or_default(cli.config.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting costar v{}", env!("CARGO_PKG_VERSION"));

    let kv = open_store(&cli, &config).await?;
    let events = EventBus::new(64);

    match cli.command {
        Command::Titles { action } => {
            let store = SelectionStore::<NormalizedTitle>::load(kv, config.seed_defaults, events).await?;
            run_selection(&store, action).await
        }
        Command::People { action } => {
            let store = SelectionStore::<NormalizedPerson>::load(kv, config.seed_defaults, events).await?;
            run_selection(&store, action).await
        }
        Command::Compare { target } => {
            let provider: Arc<dyn MetadataProvider> =
                Arc::new(TmdbClient::new(&config.provider).context("Failed to create provider client")?);
            match target {
                CompareTarget::Titles => {
                    let store =
                        SelectionStore::<NormalizedTitle>::load(kv, config.seed_defaults, events.clone()).await?;
                    run_compare(SharedCast, &store, provider, events).await
                }
                CompareTarget::People => {
                    let store =
                        SelectionStore::<NormalizedPerson>::load(kv, config.seed_defaults, events.clone()).await?;
                    run_compare(SharedFilmography, &store, provider, events).await
                }
            }
        }
    }
}

async fn open_store(cli: &Cli, config: &TomlConfig) -> Result<Arc<dyn KeyValueStore>> {
    if cli.memory {
        info!("Using in-memory selections");
        return Ok(Arc::new(MemoryKvStore::new()));
    }

    let root_folder = resolve_root_folder(cli.root.as_deref(), config);
    ensure_root_folder(&root_folder)?;

    let db_path = config.database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    Ok(Arc::new(SqliteKvStore::new(pool)))
}

async fn run_selection<E: CliEntry>(store: &SelectionStore<E>, action: SelectionAction) -> Result<()> {
    match action {
        SelectionAction::Add(args) => {
            store.add(E::from_args(&args)).await?;
        }
        SelectionAction::Remove { id, series } => {
            if !store.remove(&E::key_from(id, series)).await? {
                println!("Not selected: {}", id);
            }
        }
        SelectionAction::Update { index, entry } => {
            if !store.update(index, E::from_args(&entry)).await? {
                bail!("No entry at position {} (selection has {})", index, store.len());
            }
        }
        SelectionAction::Move { from, to } => {
            if !store.reorder(from, to).await? {
                bail!("Positions out of range (selection has {})", store.len());
            }
        }
        SelectionAction::Clear => store.clear().await?,
        SelectionAction::List => {}
    }

    print_selection(&store.snapshot());
    Ok(())
}

fn print_selection<E: CliEntry>(entries: &[E]) {
    if entries.is_empty() {
        println!("Selection is empty");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        println!("{:>3}  {}", index, entry.describe());
    }
}

async fn run_compare<D: ComparisonDomain>(
    domain: D,
    store: &SelectionStore<D::Entry>,
    provider: Arc<dyn MetadataProvider>,
    events: EventBus,
) -> Result<()> {
    let entries = store.snapshot();
    let orchestrator = ComparisonOrchestrator::new(domain, provider, events);

    if let Some(handle) = orchestrator.on_selection(&entries).await {
        handle.await.context("Comparison task failed")?;
    }

    let state = orchestrator.state();
    debug!(cycle = state.cycle, mode = ?state.mode, "Comparison settled");

    match state.status {
        ComparisonStatus::Idle => println!("Nothing selected"),
        ComparisonStatus::Loading => bail!("Comparison did not finish"),
        ComparisonStatus::Failed(e) => bail!(e),
        ComparisonStatus::Ready(ComparisonOutcome::Common(entities)) => {
            let names: Vec<&str> = entries.iter().map(|e| e.display_name()).collect();
            for line in common_lines::<D>(state.mode, &names, &entities) {
                println!("{}", line);
            }
        }
        ComparisonStatus::Ready(outcome) => {
            println!("{}", outcome.message().unwrap_or_default());
        }
    }

    Ok(())
}

/// Heading plus one row per common entity
///
/// A single source is self-paired by the intersector, so only its first column is shown.
fn common_lines<D: ComparisonDomain>(
    mode: ComparisonMode,
    names: &[&str],
    entities: &[CommonEntity<D::Record>],
) -> Vec<String> {
    let single = mode == ComparisonMode::Single;
    let heading = match names.first() {
        Some(name) if single => D::single_heading(name),
        _ => format!("{} in common across {}", entities.len(), names.join(", ")),
    };

    let columns_shown = if single { 1 } else { usize::MAX };
    let mut lines = vec![heading];
    for entity in entities {
        let columns: Vec<String> = entity
            .attributions
            .iter()
            .take(columns_shown)
            .map(|a| format!("{}: {}", a.source_name, a.roles.summary()))
            .collect();
        lines.push(format!(
            "  {}  |  {}",
            entity.representative.display_name(),
            columns.join("  |  ")
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use costar_engine::intersect::Attribution;
    use costar_engine::model::RoleFields;
    use costar_engine::NormalizedPersonRole;

    fn actor(name: &str) -> NormalizedPersonRole {
        NormalizedPersonRole {
            person_id: 1,
            name: name.to_string(),
            profile_ref: None,
            popularity: None,
            role_kinds: Default::default(),
            character: None,
            jobs: Vec::new(),
            departments: Default::default(),
        }
    }

    fn column(source_index: usize, source_name: &str, character: &str) -> Attribution {
        Attribution {
            source_index,
            source_name: source_name.to_string(),
            roles: RoleFields {
                characters: vec![character.to_string()],
                ..RoleFields::default()
            },
        }
    }

    #[test]
    fn test_single_source_lists_one_column() {
        let entities = vec![CommonEntity {
            representative: actor("X"),
            attributions: vec![column(0, "Solo", "Hero"), column(0, "Solo", "Hero")],
        }];

        let lines = common_lines::<SharedCast>(ComparisonMode::Single, &["Solo"], &entities);

        assert_eq!(lines, vec!["Cast and crew of Solo", "  X  |  Solo: Hero"]);
    }

    #[test]
    fn test_comparison_lists_every_source() {
        let entities = vec![CommonEntity {
            representative: actor("X"),
            attributions: vec![column(0, "A", "Hero"), column(1, "B", "Villain")],
        }];

        let lines = common_lines::<SharedCast>(ComparisonMode::Comparison, &["A", "B"], &entities);

        assert_eq!(
            lines,
            vec!["1 in common across A, B", "  X  |  A: Hero  |  B: Villain"]
        );
    }
}
