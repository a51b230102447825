//! `ItemApi` over HTTP.

use buildcraft_core::config::ApiConfig;
use buildcraft_core::errors::{ApiError, ApiResult};
use buildcraft_core::models::{CostCategory, CostItem, CostSummary, ItemId, SubprojectId};
use buildcraft_core::traits::ItemApi;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::transport::endpoints;
use crate::transport::{HttpClient, HttpClientConfig};

/// Item CRUD client for the four cost resource families.
#[derive(Debug)]
pub struct HttpItemApi {
    client: HttpClient,
}

impl HttpItemApi {
    pub fn new(config: HttpClientConfig) -> ApiResult<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }

    /// Build from the `[api]` config section, applying its bearer token.
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        let api = Self::new(HttpClientConfig::from(config))?;
        if let Some(token) = &config.token {
            api.client.set_bearer_token(token.clone());
        }
        Ok(api)
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn send_item(
        &self,
        method: Method,
        path: String,
        item: &CostItem,
    ) -> ApiResult<CostItem> {
        let body = item.to_body().map_err(|e| ApiError::Decode {
            reason: format!("failed to encode {} item: {e}", item.category()),
        })?;
        let text = self.client.execute(method, &path, Some(&body)).await?;
        let value: serde_json::Value = decode(&text)?;
        CostItem::from_body(item.category(), value).map_err(|e| ApiError::Decode {
            reason: format!("unexpected {} item body: {e}", item.category()),
        })
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode {
        reason: e.to_string(),
    })
}

impl ItemApi for HttpItemApi {
    async fn create(&self, subproject_id: SubprojectId, item: CostItem) -> ApiResult<CostItem> {
        let path = endpoints::create_item(subproject_id, item.category());
        self.send_item(Method::POST, path, &item).await
    }

    async fn update(&self, item_id: ItemId, item: CostItem) -> ApiResult<CostItem> {
        let path = endpoints::item(item.category(), item_id);
        self.send_item(Method::PUT, path, &item).await
    }

    async fn delete(&self, category: CostCategory, item_id: ItemId) -> ApiResult<()> {
        let path = endpoints::item(category, item_id);
        self.client.execute(Method::DELETE, &path, None).await?;
        Ok(())
    }

    async fn cost_summary(&self, subproject_id: SubprojectId) -> ApiResult<CostSummary> {
        let path = endpoints::cost_summary(subproject_id);
        let text = self.client.execute(Method::GET, &path, None).await?;
        decode(&text)
    }
}
