use std::collections::BTreeMap;

use compact_str::{format_compact, CompactString};
use reqwest::Url;
use serde::Deserialize;

use super::fields::{self, FieldDescriptor, FieldSchema};
use crate::result::{Result, TrackerError};

/// Host-supplied configuration values, keyed by field name
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TrackerParams {
    values: BTreeMap<CompactString, CompactString>,
}

impl TrackerParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<CompactString>, value: impl Into<CompactString>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// The trimmed value of `name`, `None` when absent or blank
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).is_none()
    }

    /// Required fields of `schema` that have no value, in schema order
    pub fn missing(&self, schema: FieldSchema) -> Vec<(&'static str, FieldDescriptor)> {
        fields::required(schema)
            .filter(|(name, _)| self.is_blank(name))
            .copied()
            .collect()
    }

    pub fn is_configured(&self, schema: FieldSchema) -> bool {
        self.missing(schema).is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TrackerParams
where
    K: Into<CompactString>,
    V: Into<CompactString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl std::fmt::Debug for TrackerParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = self.values.iter().map(|(name, value)| {
            if name.as_str() == fields::API_TOKEN {
                (name.as_str(), "<redacted>")
            } else {
                (name.as_str(), value.as_str())
            }
        });

        f.debug_map().entries(redacted).finish()
    }
}

/// `{scheme}://{host}[:port]` of a configured endpoint; any API path is dropped.
pub(crate) fn web_root(endpoint: &str) -> Result<CompactString> {
    let url = Url::parse(endpoint).map_err(|_| TrackerError::InvalidEndpoint(endpoint.into()))?;
    let host = url
        .host_str()
        .ok_or_else(|| TrackerError::InvalidEndpoint(endpoint.into()))?;

    Ok(match url.port() {
        Some(port) => format_compact!("{}://{}:{}", url.scheme(), host, port),
        None => format_compact!("{}://{}", url.scheme(), host),
    })
}
