// Nacos config API data models

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Display alias for the server-side empty tenant
pub const PUBLIC_NAMESPACE: &str = "public";

/// Group used when none is given
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// Tenant value for Get/List/Upsert: `public` maps to the empty tenant
pub fn namespace_to_tenant(namespace: &str) -> &str {
    if namespace == PUBLIC_NAMESPACE {
        ""
    } else {
        namespace
    }
}

/// Tenant parameter for Delete: omitted entirely for the public namespace
pub fn delete_tenant(namespace: &str) -> Option<&str> {
    match namespace_to_tenant(namespace) {
        "" => None,
        tenant => Some(tenant),
    }
}

/// Namespace shown to users for a server-side tenant
pub fn tenant_display(tenant: &str) -> &str {
    if tenant.is_empty() {
        PUBLIC_NAMESPACE
    } else {
        tenant
    }
}

/// Hex MD5 of config content, as reported by the server's `md5` field
pub fn content_md5(content: &str) -> String {
    format!("{:x}", Md5::digest(content.as_bytes()))
}

/// Identifies one config entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigId {
    pub namespace: String,
    pub group: String,
    pub data_id: String,
}

impl ConfigId {
    /// Empty group falls back to `DEFAULT_GROUP`
    pub fn new(namespace: &str, group: &str, data_id: &str) -> Self {
        let group = if group.is_empty() { DEFAULT_GROUP } else { group };
        Self {
            namespace: namespace.to_string(),
            group: group.to_string(),
            data_id: data_id.to_string(),
        }
    }

    pub fn tenant(&self) -> &str {
        namespace_to_tenant(&self.namespace)
    }
}

/// Full config record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDetail {
    #[serde(default)]
    pub data_id: String,

    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub tenant: String,

    #[serde(default)]
    pub content: String,

    /// Format hint (yaml, properties, json, ...)
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,

    /// MD5 of the content
    #[serde(default, rename = "md5")]
    pub checksum: Option<String>,
}

impl ConfigDetail {
    /// Whether `edited` differs from the stored content.
    /// Uses the server checksum when one was returned.
    pub fn is_modified(&self, edited: &str) -> bool {
        match self.checksum.as_deref() {
            Some(checksum) if !checksum.is_empty() => {
                !content_md5(edited).eq_ignore_ascii_case(checksum)
            }
            _ => edited != self.content,
        }
    }
}

/// Summary record from a config listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigListItem {
    #[serde(default)]
    pub data_id: String,

    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub tenant: String,
}

/// Paginated listing envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPage {
    #[serde(default)]
    pub total_count: u64,

    #[serde(default)]
    pub page_number: u64,

    #[serde(default)]
    pub pages_available: u64,

    #[serde(default)]
    pub page_items: Vec<ConfigListItem>,
}
