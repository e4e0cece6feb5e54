use color_eyre::{eyre::eyre, Result};
use futures::{StreamExt, TryStreamExt};
use url::Url;

use crate::model::Berry;

use super::api_types::{ApiBerry, ApiBerryList};
use super::client::ApiClient;
use super::{Page, PageMeta, PageQuery, RemoteSource};

/// Berries from the public game-data API.
///
/// The index endpoint only returns names, so each berry on the page is
/// fetched individually, `concurrency` requests at a time.
#[derive(Clone)]
pub struct BerriesSource {
  client: ApiClient,
  concurrency: usize,
}

impl BerriesSource {
  pub fn new(base_url: &str, concurrency: usize) -> Result<Self> {
    Ok(Self {
      client: ApiClient::new(base_url)?,
      concurrency: concurrency.max(1),
    })
  }

  async fn fetch_detail(&self, url: String) -> Result<Berry> {
    let parsed: Url = url
      .parse()
      .map_err(|e| eyre!("Invalid berry URL {}: {}", url, e))?;
    let detail: ApiBerry = self.client.get(parsed).await?;
    Ok(detail.into_berry(Some(url)))
  }
}

impl RemoteSource for BerriesSource {
  type Record = Berry;

  async fn fetch_page(&self, query: &PageQuery) -> Result<Page<Berry>> {
    let url = self.client.endpoint(
      "berry",
      &[
        ("offset", query.offset().to_string()),
        ("limit", query.limit.to_string()),
      ],
    )?;
    let list: ApiBerryList = self.client.get(url).await?;

    // buffered keeps upstream order
    let data: Vec<Berry> = futures::stream::iter(list.results)
      .map(|item| self.fetch_detail(item.url))
      .buffered(self.concurrency)
      .try_collect()
      .await?;

    tracing::info!(
      count = data.len(),
      total = list.count,
      page = query.page,
      "fetched berries"
    );

    Ok(Page {
      data,
      meta: PageMeta::new(list.count, query.page, query.limit),
    })
  }

  async fn fetch_one(&self, id: &str) -> Result<Option<Berry>> {
    let url = self.client.endpoint(&format!("berry/{}", id), &[])?;
    let detail: Option<ApiBerry> = self.client.get_optional(url).await?;
    Ok(detail.map(|b| b.into_berry(None)))
  }
}
