//! Headless driver pairing a record store with its upstream source.
//!
//! This is what a table or detail screen talks to: it waits for hydration,
//! pulls pages from the source into the store, and routes edits to the
//! store only.

use color_eyre::{eyre::eyre, Result};

use crate::cache::{is_local_id, Record, RecordStore, SlotStorage};
use crate::source::{page_count, PageQuery, RemoteSource};

/// What a paginated table needs to render.
#[derive(Debug, Clone)]
pub struct PageView<R> {
  pub records: Vec<R>,
  pub total: u64,
  pub page: u32,
  pub limit: u32,
  pub page_count: u64,
}

pub struct Collection<Src: RemoteSource, S: SlotStorage> {
  store: RecordStore<Src::Record, S>,
  source: Src,
}

impl<Src: RemoteSource, S: SlotStorage> Collection<Src, S> {
  pub fn new(store: RecordStore<Src::Record, S>, source: Src) -> Self {
    Self { store, source }
  }

  /// Create the collection and hydrate its store.
  pub fn open(store: RecordStore<Src::Record, S>, source: Src) -> Result<Self> {
    store.hydrate()?;
    Ok(Self::new(store, source))
  }

  pub fn store(&self) -> &RecordStore<Src::Record, S> {
    &self.store
  }

  fn ensure_hydrated(&self) -> Result<()> {
    if self.store.has_hydrated() {
      Ok(())
    } else {
      Err(eyre!(
        "{} has not been restored yet",
        <Src::Record as Record>::namespace()
      ))
    }
  }

  /// Fetch the page from upstream, merge it, and return the merged view.
  pub async fn load_page(&self, query: &PageQuery) -> Result<PageView<Src::Record>> {
    self.ensure_hydrated()?;
    let page = self.source.fetch_page(query).await?;
    self.store.merge(page.data, page.meta.total)?;
    Ok(self.view(query))
  }

  /// Like [`load_page`](Self::load_page), but only fetches when nothing was
  /// restored from storage.
  pub async fn ensure_loaded(&self, query: &PageQuery) -> Result<PageView<Src::Record>> {
    self.ensure_hydrated()?;
    if self.store.snapshot().records.is_empty() {
      return self.load_page(query).await;
    }
    Ok(self.view(query))
  }

  /// Current state shaped for the given page, filtered by its search term.
  pub fn view(&self, query: &PageQuery) -> PageView<Src::Record> {
    let state = self.store.snapshot();
    let records: Vec<Src::Record> = match query.search.as_deref() {
      Some(search) => state
        .records
        .iter()
        .filter(|r| r.matches(search))
        .cloned()
        .collect(),
      None => state.records.clone(),
    };

    PageView {
      records,
      total: state.total,
      page: query.page,
      limit: query.limit,
      page_count: page_count(state.total, query.limit),
    }
  }

  /// Look a record up locally, falling back to a single upstream fetch.
  ///
  /// Upstream hits are added to the cache without changing `total`.
  pub async fn find(&self, id: &str) -> Result<Option<Src::Record>> {
    self.ensure_hydrated()?;
    if let Some(record) = self.store.get_by_id(id)? {
      return Ok(Some(record));
    }
    // Upstream has never heard of local ids
    if is_local_id(id) {
      return Ok(None);
    }

    let fetched = self.source.fetch_one(id).await?;
    if let Some(record) = &fetched {
      self.store.add(record.clone())?;
    }
    Ok(fetched)
  }

  pub fn create(&self, input: <Src::Record as Record>::Input) -> Result<Src::Record> {
    self.ensure_hydrated()?;
    self.store.create(input)
  }

  pub fn update(&self, id: &str, patch: <Src::Record as Record>::Patch) -> Result<bool> {
    self.ensure_hydrated()?;
    self.store.update(id, patch)
  }

  pub fn delete(&self, id: &str) -> Result<bool> {
    self.ensure_hydrated()?;
    self.store.delete(id)
  }

  pub fn reset(&self) -> Result<()> {
    self.ensure_hydrated()?;
    self.store.reset()
  }
}
