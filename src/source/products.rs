use color_eyre::Result;

use crate::model::{Product, ProductStatus};

use super::api_types::ApiProduct;
use super::client::ApiClient;
use super::{Page, PageMeta, PageQuery, RemoteSource};

/// Products from the public commerce API.
///
/// The upstream has no pagination or search, so the whole catalogue is
/// fetched and sliced here.
#[derive(Clone)]
pub struct ProductsSource {
  client: ApiClient,
}

impl ProductsSource {
  pub fn new(base_url: &str) -> Result<Self> {
    Ok(Self {
      client: ApiClient::new(base_url)?,
    })
  }
}

/// Filter by title and cut out the requested page.
fn paginate(all: Vec<ApiProduct>, query: &PageQuery) -> Page<Product> {
  let needle = query.search.as_deref().map(str::to_lowercase);

  let filtered: Vec<Product> = all
    .into_iter()
    .enumerate()
    .map(|(i, p)| p.into_product(ProductStatus::cycled(i)))
    .filter(|p| match &needle {
      Some(n) => p.title.to_lowercase().contains(n),
      None => true,
    })
    .collect();

  let total = filtered.len() as u64;
  let data = filtered
    .into_iter()
    .skip(query.offset() as usize)
    .take(query.limit as usize)
    .collect();

  Page {
    data,
    meta: PageMeta::new(total, query.page, query.limit),
  }
}

impl RemoteSource for ProductsSource {
  type Record = Product;

  async fn fetch_page(&self, query: &PageQuery) -> Result<Page<Product>> {
    let url = self.client.endpoint("products", &[])?;
    let all: Vec<ApiProduct> = self.client.get(url).await?;
    tracing::info!(count = all.len(), page = query.page, "fetched products");
    Ok(paginate(all, query))
  }

  async fn fetch_one(&self, id: &str) -> Result<Option<Product>> {
    let url = self.client.endpoint(&format!("products/{}", id), &[])?;
    let product: Option<ApiProduct> = self.client.get_optional(url).await?;
    Ok(product.map(ApiProduct::into_detail))
  }
}
