use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::cache::{Record, RecordStore, SlotStorage};
use crate::collection::{Collection, PageView};
use crate::config::Config;
use crate::source::{BerriesSource, PageQuery, ProductsSource, RemoteSource};

/// Record collection to operate on
#[derive(Debug, Subcommand)]
pub enum Kind {
  /// Products from the commerce API
  Products {
    #[command(subcommand)]
    command: Command,
  },
  /// Berries from the game-data API
  Berries {
    #[command(subcommand)]
    command: Command,
  },
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Fetch a page from upstream and list it merged with local edits
  List {
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Records per page (default: page_size from config)
    #[arg(long)]
    limit: Option<u32>,
    /// Case-insensitive filter on the listed records
    #[arg(long)]
    search: Option<String>,
    /// Only fetch if nothing is cached yet
    #[arg(long)]
    cached: bool,
  },
  /// Show one record, fetching it from upstream if it isn't cached
  Show { id: String },
  /// Create a local record from JSON
  Create {
    #[arg(long)]
    data: String,
  },
  /// Apply a JSON patch to a record
  Update {
    id: String,
    #[arg(long)]
    data: String,
  },
  /// Delete a record from the local view
  Delete { id: String },
  /// Drop all cached records
  Reset,
}

/// Main application: wires configuration and storage into one collection
/// per run.
pub struct App<S: SlotStorage> {
  config: Config,
  storage: Arc<S>,
}

impl<S: SlotStorage> App<S> {
  pub fn new(config: Config, storage: Arc<S>) -> Self {
    Self { config, storage }
  }

  pub async fn run(&self, kind: Kind) -> Result<()> {
    let sources = &self.config.sources;
    match kind {
      Kind::Products { command } => {
        let source = ProductsSource::new(&sources.products_url)?;
        self.execute(source, command).await
      }
      Kind::Berries { command } => {
        let source = BerriesSource::new(&sources.berries_url, sources.concurrency)?;
        self.execute(source, command).await
      }
    }
  }

  async fn execute<Src>(&self, source: Src, command: Command) -> Result<()>
  where
    Src: RemoteSource,
    <Src::Record as Record>::Input: DeserializeOwned,
    <Src::Record as Record>::Patch: DeserializeOwned,
  {
    let store = RecordStore::new(Arc::clone(&self.storage));
    let collection = Collection::open(store, source)?;
    spawn_change_log(collection.store());

    match command {
      Command::List {
        page,
        limit,
        search,
        cached,
      } => {
        let query =
          PageQuery::new(page, limit.unwrap_or(self.config.page_size)).with_search(search);
        let view = if cached {
          collection.ensure_loaded(&query).await?
        } else {
          load_or_offline(&collection, &query).await?
        };
        print_page(&view);
      }
      Command::Show { id } => match collection.find(&id).await? {
        Some(record) => println!("{}", to_pretty(&record)?),
        None => println!("No record with id {}", id),
      },
      Command::Create { data } => {
        let input = serde_json::from_str(&data).map_err(|e| eyre!("Invalid record JSON: {}", e))?;
        let record = collection.create(input)?;
        println!("Created {}", record.id());
        println!("{}", to_pretty(&record)?);
      }
      Command::Update { id, data } => {
        let patch = serde_json::from_str(&data).map_err(|e| eyre!("Invalid patch JSON: {}", e))?;
        // Pull the record in first, as an edit screen would
        collection.find(&id).await?;
        if collection.update(&id, patch)? {
          println!("Updated {}", id);
        } else {
          println!("No record with id {}", id);
        }
      }
      Command::Delete { id } => {
        if collection.delete(&id)? {
          println!("Deleted {}", id);
        } else {
          println!("No record with id {}", id);
        }
      }
      Command::Reset => {
        collection.reset()?;
        println!("Cleared cached {}", <Src::Record as Record>::namespace());
      }
    }

    Ok(())
  }
}

/// Fetch the page; if upstream is unreachable but something is cached,
/// show the cached view instead.
async fn load_or_offline<Src, S>(
  collection: &Collection<Src, S>,
  query: &PageQuery,
) -> Result<PageView<Src::Record>>
where
  Src: RemoteSource,
  S: SlotStorage,
{
  match collection.load_page(query).await {
    Ok(view) => Ok(view),
    Err(e) if collection.store().snapshot().is_loaded => {
      tracing::warn!(error = %e, "upstream fetch failed, serving cached records");
      eprintln!("offline: {}", e);
      Ok(collection.view(query))
    }
    Err(e) => Err(e),
  }
}

/// Trace every state the store publishes, until the store is dropped.
fn spawn_change_log<R: Record, S: SlotStorage>(store: &RecordStore<R, S>) {
  let mut changes = store.subscribe();
  tokio::spawn(async move {
    while changes.changed().await.is_ok() {
      let state = changes.borrow_and_update().clone();
      tracing::debug!(
        kind = R::namespace(),
        records = state.records.len(),
        total = state.total,
        loaded = state.is_loaded,
        "collection changed"
      );
    }
  });
}

fn print_page<R: Record>(view: &PageView<R>) {
  for record in &view.records {
    println!("{}", record.label());
  }
  println!(
    "-- page {} of {} ({} total, {} per page)",
    view.page, view.page_count, view.total, view.limit
  );
}

fn to_pretty<R: Record>(record: &R) -> Result<String> {
  serde_json::to_string_pretty(record).map_err(|e| eyre!("Failed to render record: {}", e))
}
