use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    errors::TemplateError,
    models::{
        message::NotificationKind,
        request::ReturnRequest,
        template::{ResolvedNames, TemplateData},
    },
    traits::{StatusCatalog, TemplateRenderer},
};

pub const NEW_POSITION_ADDED: &str = "NewPositionAdded";
pub const POSITION_STATUS_CHANGED: &str = "PositionStatusHasChanged";

pub struct TemplateDataBuilder<'a> {
    statuses: &'a dyn StatusCatalog,
    renderer: &'a dyn TemplateRenderer,
}

impl<'a> TemplateDataBuilder<'a> {
    pub fn new(statuses: &'a dyn StatusCatalog, renderer: &'a dyn TemplateRenderer) -> Self {
        Self { statuses, renderer }
    }

    /// Fails with every empty key listed, never with a partial template.
    pub fn build(
        &self,
        request: &ReturnRequest,
        names: &ResolvedNames,
    ) -> Result<TemplateData, TemplateError> {
        let data = TemplateData {
            complaint_id: request.complaint_id,
            complaint_number: request.complaint_number.clone(),
            creator_id: request.creator_id,
            creator_name: names.creator_name.clone(),
            expert_id: request.expert_id,
            expert_name: names.expert_name.clone(),
            client_id: request.client_id,
            client_name: names.client_name.clone(),
            consumption_id: request.consumption_id,
            consumption_number: request.consumption_number.clone(),
            agreement_number: request.agreement_number.clone(),
            date: request.date.clone(),
            differences: self.describe_differences(request),
        };

        let keys = data.empty_keys();
        if !keys.is_empty() {
            debug!(keys = ?keys, "Template data incomplete");
            return Err(TemplateError::EmptyData { keys });
        }

        Ok(data)
    }

    fn describe_differences(&self, request: &ReturnRequest) -> String {
        match request.kind {
            NotificationKind::New => self.renderer.render(NEW_POSITION_ADDED, &BTreeMap::new()),
            NotificationKind::Change => {
                let (Some(from), Some(to)) = (request.status_from, request.status_to) else {
                    return String::new();
                };

                match (self.statuses.name(from), self.statuses.name(to)) {
                    (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => {
                        let variables = BTreeMap::from([
                            ("FROM".to_string(), from),
                            ("TO".to_string(), to),
                        ]);
                        self.renderer.render(POSITION_STATUS_CHANGED, &variables)
                    }
                    _ => String::new(),
                }
            }
        }
    }
}
