//! Local record cache reconciling upstream pages with local edits.
//!
//! This module provides a kind-agnostic store that:
//! - Merges paginated upstream data without losing local creations or edits
//! - Applies create/update/delete to the local view only
//! - Persists every change to a namespaced key-value slot (write-through)
//! - Restores persisted state once per session before first use (hydration)

mod id;
mod layer;
mod persist;
mod state;
mod storage;
mod traits;

pub use id::is_local_id;
pub use layer::RecordStore;
pub use storage::{NoopStorage, SlotStorage, SqliteSlotStorage};
pub use traits::Record;

#[cfg(test)]
pub(crate) mod testing {
  use serde::{Deserialize, Serialize};

  use super::Record;

  /// Minimal record kind for exercising the cache in isolation.
  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(rename = "isModified", default)]
    pub is_modified: bool,
  }

  pub struct NoteInput {
    pub title: String,
  }

  impl NoteInput {
    pub fn titled(title: &str) -> Self {
      Self {
        title: title.to_string(),
      }
    }
  }

  #[derive(Default)]
  pub struct NotePatch {
    pub title: Option<String>,
  }

  impl NotePatch {
    pub fn titled(title: &str) -> Self {
      Self {
        title: Some(title.to_string()),
      }
    }
  }

  pub fn note(id: &str, title: &str) -> Note {
    Note {
      id: id.to_string(),
      title: title.to_string(),
      is_modified: false,
    }
  }

  impl Record for Note {
    type Input = NoteInput;
    type Patch = NotePatch;

    fn id(&self) -> &str {
      &self.id
    }

    fn is_modified(&self) -> bool {
      self.is_modified
    }

    fn mark_modified(&mut self) {
      self.is_modified = true;
    }

    fn from_input(id: String, input: NoteInput) -> Self {
      Self {
        id,
        title: input.title,
        is_modified: false,
      }
    }

    fn apply(&mut self, patch: NotePatch) {
      if let Some(title) = patch.title {
        self.title = title;
      }
    }

    fn namespace() -> &'static str {
      "equinox-notes-store"
    }

    fn label(&self) -> String {
      self.title.clone()
    }

    fn matches(&self, search: &str) -> bool {
      self.title.to_lowercase().contains(&search.to_lowercase())
    }
  }
}
