//! Core traits for records held by the cache.

use serde::{de::DeserializeOwned, Serialize};

/// A record kind that can live in a [`RecordCache`](super::RecordCache).
///
/// The cache only reasons about identity and the modified marker; every
/// other attribute is opaque to the merge.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Attributes required to create a new local record.
  type Input;
  /// Partial update, every field optional.
  type Patch;

  /// Canonical or local-origin identifier.
  fn id(&self) -> &str;

  /// Whether a canonical record has been edited locally.
  fn is_modified(&self) -> bool;

  fn mark_modified(&mut self);

  /// Build a fresh local record from creation input and a generated id.
  fn from_input(id: String, input: Self::Input) -> Self;

  /// Shallow-merge a patch into this record.
  fn apply(&mut self, patch: Self::Patch);

  /// Storage namespace for this kind (e.g. "equinox-products-store")
  fn namespace() -> &'static str;

  /// One-line label for listings.
  fn label(&self) -> String;

  /// Case-insensitive search predicate used for client-side filtering.
  fn matches(&self, search: &str) -> bool;
}
