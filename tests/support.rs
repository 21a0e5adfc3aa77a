use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use return_notify::{
    clients::{
        directory::{ConfiguredRecipients, InMemoryContractors, StaticStatusCatalog},
        template::CatalogRenderer,
    },
    errors::{DomainError, SendError},
    models::{
        contractor::Contractor,
        message::{EmailMessage, MessageContext, SmsDelivery, SmsRequest},
        report::NotificationReport,
    },
    orchestrator::{Collaborators, NotificationOrchestrator},
    traits::{
        ContractorRepository, EmailSender, RecipientDirectory, SmsSender, StatusCatalog,
        TemplateRenderer,
    },
};
use serde_json::{Value, json};

pub const RESELLER_ID: i64 = 10;
pub const CLIENT_ID: i64 = 20;
pub const CREATOR_ID: i64 = 30;
pub const EXPERT_ID: i64 = 40;

pub const EMAIL_FROM: &str = "contractor@example.com";
pub const EMPLOYEE_EMAILS: [&str; 2] = ["returns@example.com", "support@example.com"];
pub const CLIENT_EMAIL: &str = "jane@example.com";

/// A CHANGE event moving the return from Pending (1) to Completed (0).
pub fn change_payload() -> Value {
    json!({
        "resellerId": RESELLER_ID,
        "notificationType": 2,
        "complaintId": 100,
        "complaintNumber": "RET-100",
        "creatorId": CREATOR_ID,
        "expertId": EXPERT_ID,
        "clientId": CLIENT_ID,
        "consumptionId": 500,
        "consumptionNumber": "CONS_500",
        "agreementNumber": "AGR-7",
        "date": "2024-05-01",
        "differences": { "from": 1, "to": 0 }
    })
}

pub fn new_payload() -> Value {
    let mut payload = change_payload();
    payload["notificationType"] = json!(1);
    if let Value::Object(map) = &mut payload {
        map.remove("differences");
    }
    payload
}

pub fn client() -> Contractor {
    Contractor::customer(CLIENT_ID)
        .with_name("Jane Doe")
        .with_email(CLIENT_EMAIL)
        .with_mobile("+15550100")
}

pub fn contractors_with_client(client: Option<Contractor>) -> InMemoryContractors {
    let mut contractors = vec![
        Contractor::employee(CREATOR_ID).with_name("Alex Roe"),
        Contractor::employee(EXPERT_ID).with_name("Sam Poe"),
    ];
    contractors.extend(client);
    InMemoryContractors::new(contractors)
}

#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<(EmailMessage, MessageContext)>>,
    failing: Vec<String>,
    panics: bool,
}

impl RecordingEmailSender {
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            failing: recipients.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(EmailMessage, MessageContext)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self) -> Vec<String> {
        let mut recipients: Vec<String> = self.sent().into_iter().map(|(m, _)| m.to).collect();
        recipients.sort();
        recipients
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(
        &self,
        message: &EmailMessage,
        context: &MessageContext,
    ) -> Result<(), SendError> {
        if self.panics {
            panic!("email transport exploded");
        }
        if self.failing.contains(&message.to) {
            return Err(SendError::Transport("connection reset".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((message.clone(), context.clone()));
        Ok(())
    }
}

pub enum SmsScript {
    Deliver(SmsDelivery),
    Fail(String),
}

pub struct ScriptedSmsSender {
    script: SmsScript,
    requests: Mutex<Vec<SmsRequest>>,
}

impl ScriptedSmsSender {
    pub fn new(script: SmsScript) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn delivering() -> Self {
        Self::new(SmsScript::Deliver(SmsDelivery {
            sent: true,
            error: None,
        }))
    }

    pub fn requests(&self) -> Vec<SmsRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsSender for ScriptedSmsSender {
    async fn send(&self, request: &SmsRequest) -> Result<SmsDelivery, SendError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.script {
            SmsScript::Deliver(delivery) => Ok(delivery.clone()),
            SmsScript::Fail(message) => Err(SendError::Transport(message.clone())),
        }
    }
}

/// Renders like the default catalog but panics on one template key.
pub struct PanickingRenderer {
    key: &'static str,
    inner: CatalogRenderer,
}

impl PanickingRenderer {
    pub fn on(key: &'static str) -> Self {
        Self {
            key,
            inner: CatalogRenderer::default(),
        }
    }
}

impl TemplateRenderer for PanickingRenderer {
    fn render(&self, key: &str, variables: &BTreeMap<String, String>) -> String {
        if key == self.key {
            panic!("template {key} exploded");
        }
        self.inner.render(key, variables)
    }
}

pub struct Harness {
    pub contractors: InMemoryContractors,
    pub recipients: ConfiguredRecipients,
    pub statuses: StaticStatusCatalog,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub email: Arc<RecordingEmailSender>,
    pub sms: Arc<ScriptedSmsSender>,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            contractors: contractors_with_client(Some(client())),
            recipients: ConfiguredRecipients::new(
                EMAIL_FROM,
                EMPLOYEE_EMAILS.iter().map(|e| e.to_string()).collect(),
            ),
            statuses: StaticStatusCatalog::default(),
            renderer: Arc::new(CatalogRenderer::default()),
            email: Arc::new(RecordingEmailSender::default()),
            sms: Arc::new(ScriptedSmsSender::delivering()),
        }
    }
}

impl Harness {
    pub fn with_client(mut self, client: Option<Contractor>) -> Self {
        self.contractors = contractors_with_client(client);
        self
    }

    pub fn with_recipients(mut self, from: &str, permitted: &[&str]) -> Self {
        self.recipients =
            ConfiguredRecipients::new(from, permitted.iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_email(mut self, email: RecordingEmailSender) -> Self {
        self.email = Arc::new(email);
        self
    }

    pub fn with_sms(mut self, script: SmsScript) -> Self {
        self.sms = Arc::new(ScriptedSmsSender::new(script));
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            contractors: Arc::new(self.contractors.clone()) as Arc<dyn ContractorRepository>,
            statuses: Arc::new(self.statuses.clone()) as Arc<dyn StatusCatalog>,
            renderer: Arc::clone(&self.renderer),
            recipients: Arc::new(self.recipients.clone()) as Arc<dyn RecipientDirectory>,
            email: Arc::clone(&self.email) as Arc<dyn EmailSender>,
            sms: Arc::clone(&self.sms) as Arc<dyn SmsSender>,
        }
    }

    pub async fn run(&self, payload: Value) -> Result<NotificationReport, DomainError> {
        NotificationOrchestrator::new(self.collaborators())
            .run(payload)
            .await
    }
}
