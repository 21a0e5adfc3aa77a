use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

use serde::{Deserialize, Serialize};

/// Permit under which employees receive return notifications.
pub const RETURN_GOODS_PERMIT: &str = "tsGoodsReturn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    New,
    Change,
}

impl NotificationKind {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(NotificationKind::New),
            2 => Some(NotificationKind::Change),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationEvent {
    ChangeReturnStatus,
    NewReturnStatus,
}

impl Display for NotificationEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NotificationEvent::ChangeReturnStatus => write!(f, "changeReturnStatus"),
            NotificationEvent::NewReturnStatus => write!(f, "newReturnStatus"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Routing context handed to the email transport with every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContext {
    pub reseller_id: i64,
    pub client_id: i64,
    pub event: NotificationEvent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequest {
    pub reseller_id: i64,
    pub client_id: i64,
    pub event: NotificationEvent,
    pub status_code: i64,
    pub variables: BTreeMap<String, String>,
}

/// What the SMS transport says happened. `sent` may be false without an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsDelivery {
    pub sent: bool,

    #[serde(default)]
    pub error: Option<String>,
}
