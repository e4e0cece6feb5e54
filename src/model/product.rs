use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cache::Record;

/// Publication status shown in the products table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
  Active,
  Draft,
  Archived,
}

impl ProductStatus {
  pub const ALL: [ProductStatus; 3] = [Self::Active, Self::Draft, Self::Archived];

  /// Status assigned to the n-th upstream product.
  pub fn cycled(n: usize) -> Self {
    Self::ALL[n % Self::ALL.len()]
  }
}

impl fmt::Display for ProductStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Active => "active",
      Self::Draft => "draft",
      Self::Archived => "archived",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: String,
  pub title: String,
  pub description: String,
  pub price: f64,
  pub image: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub images: Option<Vec<String>>,
  pub category: String,
  pub rating: f64,
  pub reviews: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub colors: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sizes: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<ProductStatus>,
  #[serde(default, skip_serializing_if = "super::is_false")]
  pub is_modified: bool,
}

/// Fields accepted when creating a product. Rating and reviews start at zero
/// and any `status` in the input is ignored: new products start active.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub price: f64,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub images: Option<Vec<String>>,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub colors: Option<Vec<String>>,
  #[serde(default)]
  pub sizes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub price: Option<f64>,
  pub image: Option<String>,
  pub images: Option<Vec<String>>,
  pub category: Option<String>,
  pub colors: Option<Vec<String>>,
  pub sizes: Option<Vec<String>>,
  pub status: Option<ProductStatus>,
}

impl Record for Product {
  type Input = ProductInput;
  type Patch = ProductPatch;

  fn id(&self) -> &str {
    &self.id
  }

  fn is_modified(&self) -> bool {
    self.is_modified
  }

  fn mark_modified(&mut self) {
    self.is_modified = true;
  }

  fn from_input(id: String, input: ProductInput) -> Self {
    Self {
      id,
      title: input.title,
      description: input.description,
      price: input.price,
      image: input.image,
      images: input.images,
      category: input.category,
      rating: 0.0,
      reviews: 0,
      colors: input.colors,
      sizes: input.sizes,
      // New products always go live
      status: Some(ProductStatus::Active),
      is_modified: false,
    }
  }

  fn apply(&mut self, patch: ProductPatch) {
    if let Some(v) = patch.title {
      self.title = v;
    }
    if let Some(v) = patch.description {
      self.description = v;
    }
    if let Some(v) = patch.price {
      self.price = v;
    }
    if let Some(v) = patch.image {
      self.image = v;
    }
    if let Some(v) = patch.images {
      self.images = Some(v);
    }
    if let Some(v) = patch.category {
      self.category = v;
    }
    if let Some(v) = patch.colors {
      self.colors = Some(v);
    }
    if let Some(v) = patch.sizes {
      self.sizes = Some(v);
    }
    if let Some(v) = patch.status {
      self.status = Some(v);
    }
  }

  fn namespace() -> &'static str {
    "equinox-products-store"
  }

  fn label(&self) -> String {
    let status = self
      .status
      .map(|s| s.to_string())
      .unwrap_or_else(|| "-".to_string());
    let marker = if self.is_modified { "*" } else { "" };
    format!(
      "{:<24} {:<9} {:>9.2}  {:<20} {}{}",
      self.id, status, self.price, self.category, self.title, marker
    )
  }

  fn matches(&self, search: &str) -> bool {
    let search = search.to_lowercase();
    self.title.to_lowercase().contains(&search) || self.category.to_lowercase().contains(&search)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input() -> ProductInput {
    serde_json::from_str(r#"{"title": "Desk Lamp", "price": 19.5, "status": "draft"}"#).unwrap()
  }

  #[test]
  fn test_from_input_defaults() {
    let product = Product::from_input("custom-1-0".to_string(), input());

    assert_eq!(product.title, "Desk Lamp");
    assert_eq!(product.rating, 0.0);
    assert_eq!(product.reviews, 0);
    assert_eq!(product.status, Some(ProductStatus::Active));
    assert!(!product.is_modified);
  }

  #[test]
  fn test_patch_only_touches_given_fields() {
    let mut product = Product::from_input("custom-1-0".to_string(), input());
    let patch: ProductPatch = serde_json::from_str(r#"{"price": 25.0}"#).unwrap();
    product.apply(patch);

    assert_eq!(product.price, 25.0);
    assert_eq!(product.title, "Desk Lamp");
  }

  #[test]
  fn test_modified_flag_wire_name() {
    let mut product = Product::from_input("custom-1-0".to_string(), input());
    let json = serde_json::to_value(&product).unwrap();
    assert!(json.get("isModified").is_none());

    product.mark_modified();
    let json = serde_json::to_value(&product).unwrap();
    assert_eq!(json["isModified"], true);
  }

  #[test]
  fn test_search_matches_title_or_category() {
    let mut product = Product::from_input("custom-1-0".to_string(), input());
    product.category = "Home Goods".to_string();

    assert!(product.matches("lamp"));
    assert!(product.matches("home"));
    assert!(!product.matches("chair"));
  }

  #[test]
  fn test_status_cycle() {
    assert_eq!(ProductStatus::cycled(0), ProductStatus::Active);
    assert_eq!(ProductStatus::cycled(4), ProductStatus::Draft);
    assert_eq!(ProductStatus::cycled(5), ProductStatus::Archived);
  }
}
