use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tracing::info;

use crate::{
    config::Config,
    models::contractor::Contractor,
    traits::{ContractorRepository, RecipientDirectory, StatusCatalog},
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryContractors {
    entries: HashMap<i64, Contractor>,
}

impl InMemoryContractors {
    pub fn new(contractors: impl IntoIterator<Item = Contractor>) -> Self {
        Self {
            entries: contractors
                .into_iter()
                .map(|contractor| (contractor.id, contractor))
                .collect(),
        }
    }

    /// Loads a JSON array of contractors.
    pub async fn from_file(path: &str) -> Result<Self, Error> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read contractors file {}: {}", path, e))?;

        let contractors: Vec<Contractor> = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Invalid contractors file {}: {}", path, e))?;

        info!(path, count = contractors.len(), "Contractor directory loaded");

        Ok(Self::new(contractors))
    }
}

#[async_trait]
impl ContractorRepository for InMemoryContractors {
    async fn get_by_id(&self, id: i64) -> Option<Contractor> {
        self.entries.get(&id).cloned()
    }
}

pub const STATUS_COMPLETED: i64 = 0;
pub const STATUS_PENDING: i64 = 1;
pub const STATUS_REJECTED: i64 = 2;

#[derive(Debug, Clone)]
pub struct StaticStatusCatalog {
    names: HashMap<i64, String>,
}

impl StaticStatusCatalog {
    pub fn new(names: impl IntoIterator<Item = (i64, String)>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }
}

impl Default for StaticStatusCatalog {
    fn default() -> Self {
        Self::new([
            (STATUS_COMPLETED, "Completed".to_string()),
            (STATUS_PENDING, "Pending".to_string()),
            (STATUS_REJECTED, "Rejected".to_string()),
        ])
    }
}

impl StatusCatalog for StaticStatusCatalog {
    fn name(&self, id: i64) -> Option<String> {
        self.names.get(&id).cloned()
    }
}

/// Same sender address and recipient list for every reseller and permit.
#[derive(Debug, Clone)]
pub struct ConfiguredRecipients {
    from_address: String,
    permitted: Vec<String>,
}

impl ConfiguredRecipients {
    pub fn new(from_address: impl Into<String>, permitted: Vec<String>) -> Self {
        Self {
            from_address: from_address.into(),
            permitted,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.reseller_email_from.clone(),
            config
                .permitted_emails
                .iter()
                .map(|email| email.trim().to_string())
                .collect(),
        )
    }
}

#[async_trait]
impl RecipientDirectory for ConfiguredRecipients {
    async fn permitted_emails(&self, _reseller_id: i64, _permit: &str) -> Vec<String> {
        self.permitted.clone()
    }

    async fn from_address(&self, _reseller_id: i64) -> Option<String> {
        (!self.from_address.is_empty()).then(|| self.from_address.clone())
    }
}
