//! Use case for the "return status changed" event.
//!
//! A run validates the payload, resolves the client, creator and expert,
//! builds template data, then attempts each channel. Anything that fails
//! before the first send aborts the run with a `DomainError`; anything that
//! fails during a send is recorded in that channel's result only.

use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures_util::{FutureExt, future::join_all};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    errors::{DomainError, SendError},
    models::{
        contractor::{Contractor, ContractorKind},
        message::{
            EmailMessage, MessageContext, NotificationEvent, RETURN_GOODS_PERMIT, SmsRequest,
        },
        report::NotificationReport,
        request::ReturnRequest,
        result::{ChannelSendResult, ErrorEntry},
        template::{ResolvedNames, TemplateData},
    },
    template_data::TemplateDataBuilder,
    traits::{
        ContractorRepository, EmailSender, RecipientDirectory, SmsSender, StatusCatalog,
        TemplateRenderer,
    },
};

pub const EMPLOYEE_EMAIL_SUBJECT: &str = "complaintEmployeeEmailSubject";
pub const EMPLOYEE_EMAIL_BODY: &str = "complaintEmployeeEmailBody";
pub const CLIENT_EMAIL_SUBJECT: &str = "complaintClientEmailSubject";
pub const CLIENT_EMAIL_BODY: &str = "complaintClientEmailBody";

pub const CODE_MISSING_RECIPIENT: u16 = 400;
pub const CODE_INTERNAL: u16 = 500;
pub const CODE_TRANSPORT: u16 = 502;

/// Shared handles to every collaborator. Cheap to clone per request.
#[derive(Clone)]
pub struct Collaborators {
    pub contractors: Arc<dyn ContractorRepository>,
    pub statuses: Arc<dyn StatusCatalog>,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub recipients: Arc<dyn RecipientDirectory>,
    pub email: Arc<dyn EmailSender>,
    pub sms: Arc<dyn SmsSender>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    DataPrepared,
    EmployeeEmailAttempted,
    ClientChannelsAttempted,
    Skipped,
    Done,
}

struct PreparedNotification {
    request: ReturnRequest,
    client: Contractor,
    template: TemplateData,
}

pub struct NotificationOrchestrator {
    collaborators: Collaborators,
    request_id: Uuid,
    stage: Stage,
}

impl NotificationOrchestrator {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            request_id: Uuid::new_v4(),
            stage: Stage::Start,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub async fn run(&mut self, raw_payload: Value) -> Result<NotificationReport, DomainError> {
        info!(request_id = %self.request_id, "Processing return status notification");

        let prepared = match self.prepare(raw_payload).await {
            Ok(prepared) => prepared,
            Err(e) => {
                error!(
                    request_id = %self.request_id,
                    code = e.code(),
                    error = %e,
                    "Return status notification aborted"
                );
                return Err(e);
            }
        };
        self.advance(Stage::DataPrepared);

        let from_address = self
            .collaborators
            .recipients
            .from_address(prepared.request.reseller_id)
            .await
            .filter(|address| !address.is_empty());
        let from = from_address.as_deref();

        let employee_email = contained(self.send_employee_email(&prepared, from)).await;
        self.advance(Stage::EmployeeEmailAttempted);

        let (client_email, client_sms) = match prepared.request.client_status_change() {
            Some(status_to) => {
                let (email, sms) = futures_util::join!(
                    contained(self.send_client_email(&prepared, from, status_to)),
                    contained(self.send_client_sms(&prepared, status_to)),
                );
                self.advance(Stage::ClientChannelsAttempted);
                (email, sms)
            }
            None => {
                self.advance(Stage::Skipped);
                (
                    ChannelSendResult::not_attempted(),
                    ChannelSendResult::not_attempted(),
                )
            }
        };

        let report = NotificationReport {
            employee_email,
            client_email,
            client_sms,
        };
        self.advance(Stage::Done);

        for (channel, result) in report.channels() {
            if result.was_attempted() && !result.is_effectively_sent() {
                warn!(
                    request_id = %self.request_id,
                    channel,
                    errors = result.errors().len(),
                    "Notification channel not delivered"
                );
            }
        }

        info!(
            request_id = %self.request_id,
            employee_email = report.employee_email.is_effectively_sent(),
            client_email = report.client_email.is_effectively_sent(),
            client_sms = report.client_sms.is_effectively_sent(),
            "Return status notification processed"
        );

        Ok(report)
    }

    fn advance(&mut self, next: Stage) {
        debug!(request_id = %self.request_id, from = ?self.stage, to = ?next, "Stage advanced");
        self.stage = next;
    }

    async fn prepare(&self, raw_payload: Value) -> Result<PreparedNotification, DomainError> {
        let payload = ReturnRequest::rule_set()?.validate(raw_payload)?;
        let kind = ReturnRequest::kind_of(&payload)?;
        let payload = ReturnRequest::difference_rule_set(kind)?.validate(payload)?;
        let request = ReturnRequest::from_validated(&payload, kind);

        let client = self.resolve_client(request.client_id).await?;
        let creator = self
            .collaborators
            .contractors
            .get_by_id(request.creator_id)
            .await
            .ok_or(DomainError::CreatorNotFound(request.creator_id))?;
        let expert = self
            .collaborators
            .contractors
            .get_by_id(request.expert_id)
            .await
            .ok_or(DomainError::ExpertNotFound(request.expert_id))?;

        let names = ResolvedNames {
            creator_name: creator.full_name(),
            expert_name: expert.full_name(),
            client_name: client.full_name(),
        };

        let template = TemplateDataBuilder::new(
            self.collaborators.statuses.as_ref(),
            self.collaborators.renderer.as_ref(),
        )
        .build(&request, &names)?;

        Ok(PreparedNotification {
            request,
            client,
            template,
        })
    }

    async fn resolve_client(&self, client_id: i64) -> Result<Contractor, DomainError> {
        let client = self
            .collaborators
            .contractors
            .get_by_id(client_id)
            .await
            .ok_or(DomainError::ClientNotFound(client_id))?;

        match client.kind {
            ContractorKind::Customer => Ok(client),
            ContractorKind::Seller => Err(DomainError::ClientIsSeller(client_id)),
            kind => Err(DomainError::InvalidClientType {
                id: client_id,
                kind,
            }),
        }
    }

    async fn send_employee_email(
        &self,
        prepared: &PreparedNotification,
        from_address: Option<&str>,
    ) -> ChannelSendResult {
        let mut result = ChannelSendResult::attempted();

        let Some(from) = from_address else {
            result.add_error(ErrorEntry::new(
                "Reseller sender email address is empty",
                CODE_INTERNAL,
            ));
            return result;
        };

        let recipients: Vec<String> = self
            .collaborators
            .recipients
            .permitted_emails(prepared.request.reseller_id, RETURN_GOODS_PERMIT)
            .await
            .into_iter()
            .filter(|email| !email.is_empty())
            .collect();

        if recipients.is_empty() {
            result.add_error(ErrorEntry::new(
                "No permitted employee email recipients",
                CODE_MISSING_RECIPIENT,
            ));
            return result;
        }

        let variables = prepared.template.to_variables();
        let renderer = &self.collaborators.renderer;
        let subject = renderer.render(EMPLOYEE_EMAIL_SUBJECT, &variables);
        let body = renderer.render(EMPLOYEE_EMAIL_BODY, &variables);
        let context = MessageContext {
            reseller_id: prepared.request.reseller_id,
            client_id: prepared.client.id,
            event: NotificationEvent::ChangeReturnStatus,
            status_code: None,
        };

        let sends = recipients.into_iter().map(|to| {
            let message = EmailMessage {
                from: from.to_string(),
                to,
                subject: subject.clone(),
                body: body.clone(),
            };
            let context = &context;
            async move {
                let outcome = guarded(self.collaborators.email.send(&message, context)).await;
                (message.to, outcome)
            }
        });

        let mut delivered = true;
        for (recipient, outcome) in join_all(sends).await {
            if let Err(entry) = outcome {
                delivered = false;
                result.add_error(entry.with_data(json!({ "recipient": recipient })));
            }
        }
        result.set_result(delivered);

        result
    }

    async fn send_client_email(
        &self,
        prepared: &PreparedNotification,
        from_address: Option<&str>,
        status_to: i64,
    ) -> ChannelSendResult {
        let mut result = ChannelSendResult::attempted();

        let Some(from) = from_address else {
            result.add_error(ErrorEntry::new(
                "Reseller sender email address is empty",
                CODE_INTERNAL,
            ));
            return result;
        };
        let Some(to) = prepared.client.email_address() else {
            result.add_error(ErrorEntry::new(
                "Client has no email address",
                CODE_MISSING_RECIPIENT,
            ));
            return result;
        };

        let variables = prepared.template.to_variables();
        let renderer = &self.collaborators.renderer;
        let message = EmailMessage {
            from: from.to_string(),
            to: to.to_string(),
            subject: renderer.render(CLIENT_EMAIL_SUBJECT, &variables),
            body: renderer.render(CLIENT_EMAIL_BODY, &variables),
        };
        let context = MessageContext {
            reseller_id: prepared.request.reseller_id,
            client_id: prepared.client.id,
            event: NotificationEvent::ChangeReturnStatus,
            status_code: Some(status_to),
        };

        match guarded(self.collaborators.email.send(&message, &context)).await {
            Ok(()) => result.set_result(true),
            Err(entry) => result.add_error(entry),
        }

        result
    }

    async fn send_client_sms(
        &self,
        prepared: &PreparedNotification,
        status_to: i64,
    ) -> ChannelSendResult {
        let mut result = ChannelSendResult::attempted();

        if !prepared.client.has_mobile() {
            result.add_error(ErrorEntry::new(
                "Client has no mobile number",
                CODE_MISSING_RECIPIENT,
            ));
            return result;
        }

        let request = SmsRequest {
            reseller_id: prepared.request.reseller_id,
            client_id: prepared.client.id,
            event: NotificationEvent::ChangeReturnStatus,
            status_code: status_to,
            variables: prepared.template.to_variables(),
        };

        match guarded(self.collaborators.sms.send(&request)).await {
            Ok(delivery) => {
                if let Some(message) = delivery.error.filter(|message| !message.is_empty()) {
                    result.add_error(ErrorEntry::new(message, CODE_TRANSPORT));
                }
                result.set_result(delivery.sent);
            }
            Err(entry) => result.add_error(entry),
        }

        result
    }
}

/// Runs one send and turns transport errors and panics into an error entry.
async fn guarded<T, F>(send: F) -> Result<T, ErrorEntry>
where
    F: Future<Output = Result<T, SendError>>,
{
    match AssertUnwindSafe(send).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ErrorEntry::new(e.to_string(), CODE_TRANSPORT)),
        Err(_) => Err(ErrorEntry::new("Channel send panicked", CODE_INTERNAL)),
    }
}

/// Runs a whole channel, rendering included. A panic anywhere in it fails
/// that channel alone.
async fn contained<F>(channel: F) -> ChannelSendResult
where
    F: Future<Output = ChannelSendResult>,
{
    match AssertUnwindSafe(channel).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            let mut result = ChannelSendResult::attempted();
            result.add_error(ErrorEntry::new("Channel panicked", CODE_INTERNAL));
            result
        }
    }
}
