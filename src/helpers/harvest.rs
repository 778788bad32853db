use anyhow::bail;
use async_trait::async_trait;
use reqwest::{Client, Proxy, header};
use tracing::{error, info};

use crate::config::Config;
use crate::models::harvest::{DateRange, DayEntry, TimeEntriesResponse, User};

/// The two Harvest operations the reporting run consumes. Implemented over
/// HTTP in production and by an in-memory fake in tests.
#[async_trait]
pub trait HarvestApi: Send + Sync {
    async fn get_user(&self, id: u64) -> anyhow::Result<User>;

    async fn get_entries(&self, id: u64, range: &DateRange) -> anyhow::Result<Vec<DayEntry>>;
}

pub fn harvest_client_init(config: &Config) -> anyhow::Result<Client> {
    info!("Initializing Harvest client");

    let mut authorization = match header::HeaderValue::from_str(&format!("Bearer {}", config.token))
    {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to create Authorization header value: {}", e);
            return Err(e.into());
        }
    };
    authorization.set_sensitive(true);

    let mut headers = header::HeaderMap::new();
    headers.insert(header::AUTHORIZATION, authorization);
    headers.insert(
        "Harvest-Account-Id",
        header::HeaderValue::from_str(&config.account)?,
    );
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_static("harvest-blame"),
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );

    let mut builder = Client::builder().default_headers(headers);

    if let Some(proxy) = &config.proxy {
        info!("Routing Harvest requests through proxy {}:{}", proxy.host, proxy.port);
        builder = builder.proxy(Proxy::all(format!("http://{}:{}", proxy.host, proxy.port))?);
    }

    info!("Building Harvest client with headers");
    match builder.build() {
        Ok(client) => {
            info!("Harvest client initialized successfully");
            Ok(client)
        }
        Err(e) => {
            error!("Failed to build Harvest client: {}", e);
            Err(e.into())
        }
    }
}

/// HTTP implementation of [`HarvestApi`] against the Harvest v2 API.
pub struct HarvestClient {
    http: Client,
    base_url: String,
}

impl HarvestClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let scheme = if config.use_ssl { "https" } else { "http" };
        Ok(Self {
            http: harvest_client_init(config)?,
            base_url: format!("{scheme}://api.harvestapp.com/v2"),
        })
    }
}

#[async_trait]
impl HarvestApi for HarvestClient {
    async fn get_user(&self, id: u64) -> anyhow::Result<User> {
        let url = format!("{}/users/{id}", self.base_url);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Harvest API returned error status {} for user {}: {}", status, id, error_text);
            bail!("Harvest API returned status {status}: {error_text}");
        }

        Ok(response.json::<User>().await?)
    }

    async fn get_entries(&self, id: u64, range: &DateRange) -> anyhow::Result<Vec<DayEntry>> {
        let url = format!("{}/time_entries", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("user_id", id.to_string()),
                ("from", range.start.to_string()),
                ("to", range.end.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                "Harvest API returned error status {} for entries of user {}: {}",
                status, id, error_text
            );
            bail!("Harvest API returned status {status}: {error_text}");
        }

        let parsed = response.json::<TimeEntriesResponse>().await?;
        Ok(parsed.time_entries)
    }
}
