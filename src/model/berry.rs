use serde::{Deserialize, Serialize};

use crate::cache::Record;

/// Name plus resource URL, as the berries API references related objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedResource {
  pub name: String,
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BerryFlavor {
  pub flavor: NamedResource,
  pub potency: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Berry {
  pub id: String,
  pub name: String,
  pub growth_time: u32,
  pub max_harvest: u32,
  pub firmness: String,
  pub size: u32,
  pub smoothness: u32,
  pub soil_dryness: u32,
  #[serde(default)]
  pub flavors: Vec<BerryFlavor>,
  pub natural_gift_power: u32,
  pub natural_gift_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(
    rename = "isModified",
    default,
    skip_serializing_if = "super::is_false"
  )]
  pub is_modified: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BerryInput {
  pub name: String,
  pub growth_time: u32,
  pub max_harvest: u32,
  pub firmness: String,
  pub size: u32,
  pub smoothness: u32,
  pub soil_dryness: u32,
  #[serde(default)]
  pub flavors: Vec<BerryFlavor>,
  pub natural_gift_power: u32,
  pub natural_gift_type: String,
  #[serde(default)]
  pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BerryPatch {
  pub name: Option<String>,
  pub growth_time: Option<u32>,
  pub max_harvest: Option<u32>,
  pub firmness: Option<String>,
  pub size: Option<u32>,
  pub smoothness: Option<u32>,
  pub soil_dryness: Option<u32>,
  pub flavors: Option<Vec<BerryFlavor>>,
  pub natural_gift_power: Option<u32>,
  pub natural_gift_type: Option<String>,
  pub url: Option<String>,
}

impl Record for Berry {
  type Input = BerryInput;
  type Patch = BerryPatch;

  fn id(&self) -> &str {
    &self.id
  }

  fn is_modified(&self) -> bool {
    self.is_modified
  }

  fn mark_modified(&mut self) {
    self.is_modified = true;
  }

  fn from_input(id: String, input: BerryInput) -> Self {
    Self {
      id,
      name: input.name,
      growth_time: input.growth_time,
      max_harvest: input.max_harvest,
      firmness: input.firmness,
      size: input.size,
      smoothness: input.smoothness,
      soil_dryness: input.soil_dryness,
      flavors: input.flavors,
      natural_gift_power: input.natural_gift_power,
      natural_gift_type: input.natural_gift_type,
      url: input.url,
      is_modified: false,
    }
  }

  fn apply(&mut self, patch: BerryPatch) {
    if let Some(v) = patch.name {
      self.name = v;
    }
    if let Some(v) = patch.growth_time {
      self.growth_time = v;
    }
    if let Some(v) = patch.max_harvest {
      self.max_harvest = v;
    }
    if let Some(v) = patch.firmness {
      self.firmness = v;
    }
    if let Some(v) = patch.size {
      self.size = v;
    }
    if let Some(v) = patch.smoothness {
      self.smoothness = v;
    }
    if let Some(v) = patch.soil_dryness {
      self.soil_dryness = v;
    }
    if let Some(v) = patch.flavors {
      self.flavors = v;
    }
    if let Some(v) = patch.natural_gift_power {
      self.natural_gift_power = v;
    }
    if let Some(v) = patch.natural_gift_type {
      self.natural_gift_type = v;
    }
    if let Some(v) = patch.url {
      self.url = Some(v);
    }
  }

  fn namespace() -> &'static str {
    "equinox-berries-store"
  }

  fn label(&self) -> String {
    let marker = if self.is_modified { "*" } else { "" };
    format!(
      "{:<24} {:<12} {:<10} growth {:>3}h  gift {} {}{}",
      self.id,
      self.name,
      self.firmness,
      self.growth_time,
      self.natural_gift_type,
      self.natural_gift_power,
      marker
    )
  }

  /// Matches on name or firmness.
  fn matches(&self, search: &str) -> bool {
    let needle = search.to_lowercase();
    self.name.to_lowercase().contains(&needle) || self.firmness.to_lowercase().contains(&needle)
  }
}
