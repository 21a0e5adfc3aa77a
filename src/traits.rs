//! Seams to the collaborators a notification run depends on.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::{
    errors::SendError,
    models::{
        contractor::Contractor,
        message::{EmailMessage, MessageContext, SmsDelivery, SmsRequest},
    },
};

#[async_trait]
pub trait ContractorRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Option<Contractor>;
}

pub trait StatusCatalog: Send + Sync {
    fn name(&self, id: i64) -> Option<String>;
}

/// Opaque localization capability: turns a template key and its variables
/// into display text.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, key: &str, variables: &BTreeMap<String, String>) -> String;
}

#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn permitted_emails(&self, reseller_id: i64, permit: &str) -> Vec<String>;

    async fn from_address(&self, reseller_id: i64) -> Option<String>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage, context: &MessageContext)
    -> Result<(), SendError>;
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, request: &SmsRequest) -> Result<SmsDelivery, SendError>;
}
