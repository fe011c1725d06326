// Nacos config API client
// Get / List / Upsert / Delete on top of the authenticated exchange

use reqwest::StatusCode;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{NacosError, Result};
use crate::http_client::{NacosHttpClient, RawResponse};
use crate::models::{
    delete_tenant, namespace_to_tenant, ConfigDetail, ConfigId, ConfigListItem, ConfigPage,
};

/// Config endpoint, relative to `{addr}/{apiVersion}`
const CONFIGS_PATH: &str = "cs/configs";

/// Page size for listings; one oversized page stands in for pagination
const LIST_PAGE_SIZE: &str = "999";

/// Response header carrying the content MD5 on plain-text replies
const CONTENT_MD5_HEADER: &str = "content-md5";

/// Response header carrying the config type on plain-text replies
const CONFIG_TYPE_HEADER: &str = "config-type";

/// Client for the Nacos config API
pub struct ConfigClient {
    config: Arc<Config>,
    http: NacosHttpClient,
}

impl ConfigClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let http = NacosHttpClient::new(config.clone())?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn http(&self) -> &NacosHttpClient {
        &self.http
    }

    /// `{addr}/{apiVersion}/cs/configs`
    pub fn config_url(&self) -> String {
        join_url(&[&self.config.addr, &self.config.api_version, CONFIGS_PATH])
    }

    /// Fetch one config
    pub async fn get(&self, id: &ConfigId) -> Result<ConfigDetail> {
        let url = self.config_url();
        let tenant = id.tenant();

        self.http
            .exchange(
                |client| {
                    client.get(&url).query(&[
                        ("dataId", id.data_id.as_str()),
                        ("group", id.group.as_str()),
                        ("tenant", tenant),
                    ])
                },
                |response| interpret_get(id, response),
            )
            .await
    }

    /// List the configs of a namespace, optionally restricted to a group
    pub async fn all_config(
        &self,
        namespace: &str,
        group: Option<&str>,
    ) -> Result<Vec<ConfigListItem>> {
        let url = self.config_url();
        let tenant = namespace_to_tenant(namespace);
        let group = group.unwrap_or("");

        let page = self
            .http
            .exchange(
                |client| {
                    client.get(&url).query(&[
                        ("dataId", ""),
                        ("group", group),
                        ("tenant", tenant),
                        ("pageNo", "1"),
                        ("pageSize", LIST_PAGE_SIZE),
                        ("search", "accurate"),
                    ])
                },
                |response| {
                    if !response.status.is_success() {
                        return Err(response.into_error());
                    }
                    serde_json::from_str::<ConfigPage>(&response.body).map_err(|e| {
                        NacosError::InvalidResponse(format!("failed to parse config list: {}", e))
                    })
                },
            )
            .await?;

        tracing::debug!(
            total_count = page.total_count,
            page_number = page.page_number,
            pages_available = page.pages_available,
            returned = page.page_items.len(),
            "Listed configs"
        );
        Ok(page.page_items)
    }

    /// Create or update a config
    pub async fn edit(&self, id: &ConfigId, content: &str, config_type: &str) -> Result<()> {
        let url = self.config_url();
        let tenant = id.tenant();

        self.http
            .exchange(
                |client| {
                    client.post(&url).form(&[
                        ("dataId", id.data_id.as_str()),
                        ("group", id.group.as_str()),
                        ("content", content),
                        ("tenant", tenant),
                        ("type", config_type),
                    ])
                },
                expect_ok,
            )
            .await?;

        tracing::info!(data_id = %id.data_id, group = %id.group, "Config published");
        Ok(())
    }

    /// Delete a config. The tenant parameter is omitted for the public namespace.
    pub async fn delete_config(&self, id: &ConfigId) -> Result<()> {
        let url = self.config_url();
        let mut params = vec![("dataId", id.data_id.as_str()), ("group", id.group.as_str())];
        if let Some(tenant) = delete_tenant(&id.namespace) {
            params.push(("tenant", tenant));
        }

        self.http
            .exchange(|client| client.delete(&url).query(&params), expect_ok)
            .await?;

        tracing::info!(data_id = %id.data_id, group = %id.group, "Config deleted");
        Ok(())
    }
}

fn expect_ok(response: RawResponse) -> Result<()> {
    if response.status == StatusCode::OK {
        Ok(())
    } else {
        Err(response.into_error())
    }
}

fn interpret_get(id: &ConfigId, response: RawResponse) -> Result<ConfigDetail> {
    let not_found = || NacosError::NotFound {
        data_id: id.data_id.clone(),
        group: id.group.clone(),
        namespace: id.namespace.clone(),
    };

    // Missing configs come back as a body-less 403
    if response.status == StatusCode::FORBIDDEN && response.body.is_empty() {
        return Err(not_found());
    }
    if !response.status.is_success() {
        return Err(response.into_error());
    }
    if response.body.is_empty() {
        return Err(not_found());
    }

    let is_plain_text = response
        .header(reqwest::header::CONTENT_TYPE.as_str())
        .map(|ct| ct.contains("text/plain"))
        .unwrap_or(false);

    if is_plain_text {
        return Ok(ConfigDetail {
            data_id: id.data_id.clone(),
            group: id.group.clone(),
            tenant: id.tenant().to_string(),
            content_type: response.header(CONFIG_TYPE_HEADER).map(str::to_string),
            checksum: response.header(CONTENT_MD5_HEADER).map(str::to_string),
            content: response.body,
        });
    }

    serde_json::from_str(&response.body)
        .map_err(|e| NacosError::InvalidResponse(format!("failed to parse config detail: {}", e)))
}

/// Join URL segments with single slashes
fn join_url(segments: &[&str]) -> String {
    let mut url = String::new();
    for (i, segment) in segments.iter().enumerate() {
        let segment = if i == 0 {
            segment.trim_end_matches('/')
        } else {
            segment.trim_matches('/')
        };
        if segment.is_empty() {
            continue;
        }
        if !url.is_empty() {
            url.push('/');
        }
        url.push_str(segment);
    }
    url
}
