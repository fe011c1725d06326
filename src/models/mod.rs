// Data models for the Nacos config API

pub mod config;

pub use config::{
    content_md5, delete_tenant, namespace_to_tenant, tenant_display, ConfigDetail, ConfigId,
    ConfigListItem, ConfigPage, DEFAULT_GROUP, PUBLIC_NAMESPACE,
};
