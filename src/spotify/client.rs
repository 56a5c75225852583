use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    Res,
    config::ProviderConfig,
    management::{CredentialStore, TokenGuard},
    spotify::{
        auth::SpotifyAuth,
        retry::RetryingCaller,
        transport::{ApiRequest, Transport},
    },
    types::Paging,
};

/// Spotify Web API client.
///
/// Every request goes through [`TokenGuard::ensure_valid`] and
/// [`RetryingCaller::call`]; the accessors in `artists`, `releases` and
/// `playlist` only describe endpoints and pagination.
pub struct SpotifyClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenGuard>,
    retry: RetryingCaller,
    api_url: String,
    market: String,
}

impl SpotifyClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: Arc<TokenGuard>,
        retry: RetryingCaller,
        api_url: impl Into<String>,
        market: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            tokens,
            retry,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            market: market.into(),
        }
    }

    /// Wires transport, token guard and retry policy from configuration.
    pub fn from_config(
        config: &ProviderConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let refresher = Arc::new(SpotifyAuth::new(Arc::clone(&transport), config));
        let tokens = Arc::new(TokenGuard::new(credentials, refresher));
        let retry = RetryingCaller::new(config.retry_attempts, config.retry_delay);
        Self::new(transport, tokens, retry, &config.api_url, &config.market)
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    /// One logical call: a fresh token check and a single HTTP request per
    /// attempt.
    pub(crate) async fn send(
        &self,
        label: &str,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Res<Value> {
        let url = format!("{}{}", self.api_url, path);
        let (url, body) = (&url, &body);

        self.retry
            .call(label, || {
                let method = method.clone();
                async move {
                    let credential = self.tokens.ensure_valid().await?;
                    let mut request = ApiRequest::new(method, url)
                        .query(query)
                        .bearer(credential.access_token);
                    if let Some(body) = body {
                        request = request.json(body.clone());
                    }
                    self.transport.execute(request).await?.into_result()
                }
            })
            .await
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        label: &str,
        path: &str,
        query: &[(String, String)],
    ) -> Res<T> {
        let body = self.send(label, Method::GET, path, query, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Follows offset pagination until `offset >= total`.
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        label: &str,
        path: &str,
        query: &[(String, String)],
        limit: u32,
    ) -> Res<Vec<T>> {
        let mut items = Vec::new();
        let mut offset = 0u32;

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("limit".into(), limit.to_string()));
            page_query.push(("offset".into(), offset.to_string()));

            let page: Paging<T> = self
                .get(&format!("{label}, offset={offset}"), path, &page_query)
                .await?;
            items.extend(page.items);

            offset += limit;
            if offset >= page.total {
                break;
            }
        }

        Ok(items)
    }
}
