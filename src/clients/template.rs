use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::{
    orchestrator::{
        CLIENT_EMAIL_BODY, CLIENT_EMAIL_SUBJECT, EMPLOYEE_EMAIL_BODY, EMPLOYEE_EMAIL_SUBJECT,
    },
    template_data::{NEW_POSITION_ADDED, POSITION_STATUS_CHANGED},
    traits::TemplateRenderer,
};

/// Renders keys from an in-process catalog. `{{NAME}}` placeholders are
/// replaced from the variables; unknown keys render as the key itself.
#[derive(Debug, Clone)]
pub struct CatalogRenderer {
    templates: HashMap<String, String>,
}

impl CatalogRenderer {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn with_template(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }
}

impl Default for CatalogRenderer {
    fn default() -> Self {
        Self::empty()
            .with_template(
                EMPLOYEE_EMAIL_SUBJECT,
                "Return {{COMPLAINT_NUMBER}}: {{DIFFERENCES}}",
            )
            .with_template(
                EMPLOYEE_EMAIL_BODY,
                "Return {{COMPLAINT_NUMBER}} (id {{COMPLAINT_ID}}) for client {{CLIENT_NAME}} \
                 (id {{CLIENT_ID}}) was created by {{CREATOR_NAME}} and reviewed by \
                 {{EXPERT_NAME}}. Consumption {{CONSUMPTION_NUMBER}} (id {{CONSUMPTION_ID}}), \
                 agreement {{AGREEMENT_NUMBER}}, dated {{DATE}}: {{DIFFERENCES}}.",
            )
            .with_template(
                CLIENT_EMAIL_SUBJECT,
                "Your return {{COMPLAINT_NUMBER}} has been updated",
            )
            .with_template(
                CLIENT_EMAIL_BODY,
                "Dear {{CLIENT_NAME}}, your return {{COMPLAINT_NUMBER}} dated {{DATE}} \
                 was updated: {{DIFFERENCES}}.",
            )
            .with_template(NEW_POSITION_ADDED, "New position added")
            .with_template(
                POSITION_STATUS_CHANGED,
                "Position status has changed from {{FROM}} to {{TO}}",
            )
    }
}

impl TemplateRenderer for CatalogRenderer {
    fn render(&self, key: &str, variables: &BTreeMap<String, String>) -> String {
        match self.templates.get(key) {
            Some(template) => replace_variables(template, variables),
            None => {
                debug!(key, "Template key not in catalog, rendering key");
                key.to_string()
            }
        }
    }
}

fn replace_variables(template: &str, variables: &BTreeMap<String, String>) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    if let Some(start) = result.find("{{") {
        if let Some(end) = result[start..].find("}}") {
            let missing_var = &result[start..start + end + 2];

            warn!(
                missing_variable = %missing_var,
                "Template contains unreplaced variable"
            );
        }
    }

    result
}
