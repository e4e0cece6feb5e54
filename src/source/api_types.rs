//! Serde-deserializable types matching the upstream API responses.
//!
//! These types are separate from the record kinds so the cache only ever
//! sees the reshaped form, whatever the upstream payload looks like.

use serde::Deserialize;

use crate::model::{Berry, BerryFlavor, NamedResource, Product, ProductStatus};

// ============================================================================
// Commerce API
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ApiRating {
  #[serde(default)]
  pub rate: f64,
  #[serde(default)]
  pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct ApiProduct {
  pub id: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub price: f64,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub rating: ApiRating,
}

impl ApiProduct {
  /// Listing shape: status assigned by position in the catalogue.
  pub fn into_product(self, status: ProductStatus) -> Product {
    Product {
      id: self.id.to_string(),
      title: self.title,
      description: self.description,
      price: self.price,
      image: self.image,
      images: None,
      category: self.category,
      rating: self.rating.rate,
      reviews: self.rating.count,
      colors: None,
      sizes: None,
      status: Some(status),
      is_modified: false,
    }
  }

  /// Detail shape: status derived from the id, plus gallery and variant
  /// fields the upstream doesn't provide.
  pub fn into_detail(self) -> Product {
    let status = ProductStatus::cycled(self.id as usize);
    let image = self.image.clone();
    let mut product = self.into_product(status);
    product.images = Some(vec![image.clone(), image.clone(), image]);
    product.colors = Some(to_strings(&["Black", "Graphite", "Bone"]));
    product.sizes = Some(to_strings(&["S", "M", "L", "XL", "2XL"]));
    product
  }
}

fn to_strings(values: &[&str]) -> Vec<String> {
  values.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Berries API
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiNamedResource {
  pub name: String,
  #[serde(default)]
  pub url: String,
}

impl From<ApiNamedResource> for NamedResource {
  fn from(r: ApiNamedResource) -> Self {
    NamedResource {
      name: r.name,
      url: r.url,
    }
  }
}

/// Paginated index: names and detail URLs only
#[derive(Debug, Deserialize)]
pub struct ApiBerryList {
  pub count: u64,
  #[serde(default)]
  pub results: Vec<ApiNamedResource>,
}

#[derive(Debug, Deserialize)]
pub struct ApiBerryFlavor {
  pub flavor: ApiNamedResource,
  #[serde(default)]
  pub potency: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApiBerry {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub growth_time: u32,
  #[serde(default)]
  pub max_harvest: u32,
  pub firmness: ApiNamedResource,
  #[serde(default)]
  pub size: u32,
  #[serde(default)]
  pub smoothness: u32,
  #[serde(default)]
  pub soil_dryness: u32,
  #[serde(default)]
  pub flavors: Vec<ApiBerryFlavor>,
  #[serde(default)]
  pub natural_gift_power: u32,
  pub natural_gift_type: ApiNamedResource,
}

impl ApiBerry {
  pub fn into_berry(self, url: Option<String>) -> Berry {
    Berry {
      id: self.id.to_string(),
      name: self.name,
      growth_time: self.growth_time,
      max_harvest: self.max_harvest,
      firmness: self.firmness.name,
      size: self.size,
      smoothness: self.smoothness,
      soil_dryness: self.soil_dryness,
      flavors: self
        .flavors
        .into_iter()
        .map(|f| BerryFlavor {
          flavor: f.flavor.into(),
          potency: f.potency,
        })
        .collect(),
      natural_gift_power: self.natural_gift_power,
      natural_gift_type: self.natural_gift_type.name,
      url,
      is_modified: false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const PRODUCT: &str = r#"{
    "id": 4,
    "title": "Mens Casual Slim Fit",
    "price": 15.99,
    "description": "The color could be slightly different",
    "category": "men's clothing",
    "image": "https://fakestoreapi.com/img/71YXzeOuslL.jpg",
    "rating": { "rate": 2.1, "count": 430 }
  }"#;

  const BERRY: &str = r#"{
    "id": 1,
    "name": "cheri",
    "growth_time": 3,
    "max_harvest": 5,
    "natural_gift_power": 60,
    "size": 20,
    "smoothness": 25,
    "soil_dryness": 15,
    "firmness": { "name": "soft", "url": "https://pokeapi.co/api/v2/berry-firmness/2/" },
    "flavors": [
      { "potency": 10, "flavor": { "name": "spicy", "url": "https://pokeapi.co/api/v2/berry-flavor/1/" } }
    ],
    "item": { "name": "cheri-berry", "url": "https://pokeapi.co/api/v2/item/126/" },
    "natural_gift_type": { "name": "fire", "url": "https://pokeapi.co/api/v2/type/10/" }
  }"#;

  #[test]
  fn test_product_listing_shape() {
    let api: ApiProduct = serde_json::from_str(PRODUCT).unwrap();
    let product = api.into_product(ProductStatus::Draft);

    assert_eq!(product.id, "4");
    assert_eq!(product.rating, 2.1);
    assert_eq!(product.reviews, 430);
    assert_eq!(product.status, Some(ProductStatus::Draft));
    assert_eq!(product.images, None);
  }

  #[test]
  fn test_product_detail_shape() {
    let api: ApiProduct = serde_json::from_str(PRODUCT).unwrap();
    let product = api.into_detail();

    // 4 % 3 == 1
    assert_eq!(product.status, Some(ProductStatus::Draft));
    assert_eq!(product.images.as_ref().map(Vec::len), Some(3));
    assert_eq!(product.sizes.as_ref().map(Vec::len), Some(5));
  }

  #[test]
  fn test_product_missing_rating() {
    let api: ApiProduct = serde_json::from_str(r#"{"id": 9, "title": "Bare"}"#).unwrap();
    let product = api.into_product(ProductStatus::Active);
    assert_eq!(product.rating, 0.0);
    assert_eq!(product.reviews, 0);
  }

  #[test]
  fn test_berry_shape() {
    let api: ApiBerry = serde_json::from_str(BERRY).unwrap();
    let berry = api.into_berry(Some("https://pokeapi.co/api/v2/berry/1/".to_string()));

    assert_eq!(berry.id, "1");
    assert_eq!(berry.firmness, "soft");
    assert_eq!(berry.natural_gift_type, "fire");
    assert_eq!(berry.flavors[0].flavor.name, "spicy");
    assert_eq!(berry.flavors[0].potency, 10);
    assert!(!berry.is_modified);
  }

  #[test]
  fn test_berry_list() {
    let list: ApiBerryList = serde_json::from_str(
      r#"{"count": 64, "next": null, "previous": null,
          "results": [{"name": "cheri", "url": "https://pokeapi.co/api/v2/berry/1/"}]}"#,
    )
    .unwrap();
    assert_eq!(list.count, 64);
    assert_eq!(list.results[0].name, "cheri");
  }
}
