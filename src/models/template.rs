use std::collections::BTreeMap;

use serde::Serialize;

/// Display names of the entities resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub creator_name: String,
    pub expert_name: String,
    pub client_name: String,
}

/// Variables substituted into every rendered subject and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TemplateData {
    pub complaint_id: i64,
    pub complaint_number: String,
    pub creator_id: i64,
    pub creator_name: String,
    pub expert_id: i64,
    pub expert_name: String,
    pub client_id: i64,
    pub client_name: String,
    pub consumption_id: i64,
    pub consumption_number: String,
    pub agreement_number: String,
    pub date: String,
    pub differences: String,
}

impl TemplateData {
    fn entries(&self) -> [(&'static str, String); 13] {
        [
            ("COMPLAINT_ID", non_zero(self.complaint_id)),
            ("COMPLAINT_NUMBER", self.complaint_number.clone()),
            ("CREATOR_ID", non_zero(self.creator_id)),
            ("CREATOR_NAME", self.creator_name.clone()),
            ("EXPERT_ID", non_zero(self.expert_id)),
            ("EXPERT_NAME", self.expert_name.clone()),
            ("CLIENT_ID", non_zero(self.client_id)),
            ("CLIENT_NAME", self.client_name.clone()),
            ("CONSUMPTION_ID", non_zero(self.consumption_id)),
            ("CONSUMPTION_NUMBER", self.consumption_number.clone()),
            ("AGREEMENT_NUMBER", self.agreement_number.clone()),
            ("DATE", self.date.clone()),
            ("DIFFERENCES", self.differences.clone()),
        ]
    }

    /// Keys whose value is empty, in declaration order.
    pub fn empty_keys(&self) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(key, _)| key)
            .collect()
    }

    pub fn to_variables(&self) -> BTreeMap<String, String> {
        self.entries()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

// Zero ids render as empty so they are caught by the completeness check.
fn non_zero(value: i64) -> String {
    if value == 0 {
        String::new()
    } else {
        value.to_string()
    }
}
