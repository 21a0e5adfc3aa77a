use serde::Serialize;

use crate::models::result::ChannelSendResult;

/// Per-channel outcome of one run. Every channel is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReport {
    pub employee_email: ChannelSendResult,
    pub client_email: ChannelSendResult,
    pub client_sms: ChannelSendResult,
}

impl NotificationReport {
    pub fn channels(&self) -> [(&'static str, &ChannelSendResult); 3] {
        [
            ("employeeEmail", &self.employee_email),
            ("clientEmail", &self.client_email),
            ("clientSms", &self.client_sms),
        ]
    }
}
