use return_notify::{
    errors::{DomainError, ValidationError},
    models::{
        contractor::{Contractor, ContractorKind},
        message::{NotificationEvent, SmsDelivery},
    },
    orchestrator::{
        CLIENT_EMAIL_SUBJECT, CODE_INTERNAL, CODE_MISSING_RECIPIENT, CODE_TRANSPORT,
        EMPLOYEE_EMAIL_BODY, NotificationOrchestrator, Stage,
    },
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use crate::support::{
    CLIENT_EMAIL, CLIENT_ID, EMAIL_FROM, EMPLOYEE_EMAILS, Harness, PanickingRenderer, RESELLER_ID,
    RecordingEmailSender, SmsScript, change_payload, client, new_payload,
};

/// Test: A status change with every collaborator healthy reaches all three channels
#[tokio::test]
async fn test_status_change_reaches_every_channel() {
    let harness = Harness::default();

    let report = assert_ok!(harness.run(change_payload()).await);

    assert!(report.employee_email.is_effectively_sent());
    assert!(report.client_email.is_effectively_sent());
    assert!(report.client_sms.is_effectively_sent());

    let mut expected: Vec<String> = EMPLOYEE_EMAILS.iter().map(|e| e.to_string()).collect();
    expected.push(CLIENT_EMAIL.to_string());
    expected.sort();
    assert_eq!(harness.email.sent_to(), expected);

    for (message, context) in harness.email.sent() {
        assert_eq!(message.from, EMAIL_FROM);
        assert_eq!(context.reseller_id, RESELLER_ID);
        assert_eq!(context.client_id, CLIENT_ID);
        assert_eq!(context.event, NotificationEvent::ChangeReturnStatus);

        if message.to == CLIENT_EMAIL {
            assert_eq!(context.status_code, Some(0));
            assert_eq!(message.subject, "Your return RET-100 has been updated");
        } else {
            assert_eq!(context.status_code, None);
            assert!(message.body.contains("from Pending to Completed"));
        }
    }

    let sms = harness.sms.requests();
    assert_eq!(sms.len(), 1);
    assert_eq!(sms[0].status_code, 0);
    assert_eq!(sms[0].variables["CLIENT_NAME"], "Jane Doe 20");
}

/// Test: A status change without a target status fails validation before any send
#[tokio::test]
async fn test_change_without_target_status_is_rejected() {
    let harness = Harness::default();
    let mut payload = change_payload();
    payload["differences"] = json!({ "from": 1 });

    let error = assert_err!(harness.run(payload).await);

    match error {
        DomainError::Validation(ValidationError::NotFound { field }) => {
            assert_eq!(field, "differences.to")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(harness.email.sent().is_empty());
    assert!(harness.sms.requests().is_empty());
}

/// Test: NEW events skip the client channels but still notify employees
#[tokio::test]
async fn test_new_event_skips_client_channels() {
    let harness = Harness::default();
    let mut orchestrator = NotificationOrchestrator::new(harness.collaborators());

    let report = assert_ok!(orchestrator.run(new_payload()).await);

    assert_eq!(orchestrator.stage(), Stage::Done);
    assert!(report.employee_email.is_effectively_sent());
    assert!(!report.client_email.was_attempted());
    assert!(!report.client_sms.was_attempted());
    assert!(report.client_email.errors().is_empty());
    assert!(harness.sms.requests().is_empty());

    let (message, _) = &harness.email.sent()[0];
    assert!(message.subject.contains("New position added"));
}

/// Test: A seller posing as the client aborts before templates are built
#[tokio::test]
async fn test_seller_client_aborts() {
    let harness = Harness::default()
        .with_client(Some(Contractor::seller(CLIENT_ID).with_email(CLIENT_EMAIL)));
    let mut orchestrator = NotificationOrchestrator::new(harness.collaborators());

    let error = assert_err!(orchestrator.run(change_payload()).await);

    assert!(matches!(error, DomainError::ClientIsSeller(CLIENT_ID)));
    assert_eq!(error.code(), "CLIENT_IS_SELLER");
    assert_eq!(error.status_code(), 400);
    assert_eq!(orchestrator.stage(), Stage::Start);
    assert!(harness.email.sent().is_empty());
}

/// Test: Entity resolution failures map to their own domain errors
#[tokio::test]
async fn test_entity_resolution_errors() {
    let missing = Harness::default().with_client(None);
    let error = assert_err!(missing.run(change_payload()).await);
    assert!(matches!(error, DomainError::ClientNotFound(CLIENT_ID)));

    let employee = Harness::default().with_client(Some(Contractor::employee(CLIENT_ID)));
    let error = assert_err!(employee.run(change_payload()).await);
    assert!(matches!(
        error,
        DomainError::InvalidClientType {
            kind: ContractorKind::Employee,
            ..
        }
    ));

    let harness = Harness::default();
    let mut payload = change_payload();
    payload["creatorId"] = json!(31);
    let error = assert_err!(harness.run(payload).await);
    assert!(matches!(error, DomainError::CreatorNotFound(31)));

    let mut payload = change_payload();
    payload["expertId"] = json!(41);
    let error = assert_err!(harness.run(payload).await);
    assert!(matches!(error, DomainError::ExpertNotFound(41)));
}

/// Test: Unknown notification types are refused
#[tokio::test]
async fn test_unknown_notification_type() {
    let harness = Harness::default();
    let mut payload = change_payload();
    payload["notificationType"] = json!(3);

    let error = assert_err!(harness.run(payload).await);

    assert!(matches!(error, DomainError::InvalidNotificationType(3)));
}

/// Test: Statuses without a display name leave the template incomplete
#[tokio::test]
async fn test_unknown_status_is_internal_error() {
    let harness = Harness::default();
    let mut payload = change_payload();
    payload["differences"]["to"] = json!(7);

    let error = assert_err!(harness.run(payload).await);

    assert!(matches!(error, DomainError::Template(_)));
    assert_eq!(error.status_code(), 500);
    assert!(harness.email.sent().is_empty());
}

/// Test: No permitted employee recipients fails that channel only
#[tokio::test]
async fn test_empty_recipient_list_is_a_channel_failure() {
    let harness = Harness::default().with_recipients(EMAIL_FROM, &[]);

    let report = assert_ok!(harness.run(change_payload()).await);

    assert!(report.employee_email.was_attempted());
    assert!(!report.employee_email.is_effectively_sent());
    assert_eq!(report.employee_email.errors()[0].code, CODE_MISSING_RECIPIENT);
    assert!(report.client_email.is_effectively_sent());
    assert!(report.client_sms.is_effectively_sent());
}

/// Test: A missing sender address fails both email channels but not SMS
#[tokio::test]
async fn test_missing_sender_address() {
    let harness = Harness::default().with_recipients("", &EMPLOYEE_EMAILS);

    let report = assert_ok!(harness.run(change_payload()).await);

    assert!(!report.employee_email.is_effectively_sent());
    assert!(!report.client_email.is_effectively_sent());
    assert_eq!(report.client_email.errors()[0].code, CODE_INTERNAL);
    assert!(report.client_sms.is_effectively_sent());
    assert!(harness.email.sent().is_empty());
}

/// Test: One failing recipient marks the whole employee channel failed
#[tokio::test]
async fn test_single_recipient_failure_fails_channel() {
    let harness = Harness::default()
        .with_email(RecordingEmailSender::failing_for(&[EMPLOYEE_EMAILS[1]]));

    let report = assert_ok!(harness.run(change_payload()).await);

    assert!(!report.employee_email.is_effectively_sent());
    let errors = report.employee_email.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, CODE_TRANSPORT);
    assert_eq!(errors[0].data, Some(json!({ "recipient": EMPLOYEE_EMAILS[1] })));

    assert_eq!(
        harness.email.sent_to(),
        vec![CLIENT_EMAIL.to_string(), EMPLOYEE_EMAILS[0].to_string()]
    );
    assert!(report.client_email.is_effectively_sent());
}

/// Test: A panicking email transport is contained to the email channels
#[tokio::test]
async fn test_panicking_sender_is_contained() {
    let harness = Harness::default().with_email(RecordingEmailSender::panicking());

    let report = assert_ok!(harness.run(change_payload()).await);

    assert!(!report.employee_email.is_effectively_sent());
    assert_eq!(report.employee_email.errors().len(), EMPLOYEE_EMAILS.len());
    assert_eq!(report.client_email.errors()[0].code, CODE_INTERNAL);
    assert!(report.client_sms.is_effectively_sent());
}

/// Test: A panic while rendering the employee email fails that channel and the rest still run
#[tokio::test]
async fn test_panicking_employee_render_is_contained() {
    let harness = Harness::default().with_renderer(PanickingRenderer::on(EMPLOYEE_EMAIL_BODY));

    let report = assert_ok!(harness.run(change_payload()).await);

    assert!(report.employee_email.was_attempted());
    assert!(!report.employee_email.is_effectively_sent());
    assert_eq!(report.employee_email.errors().len(), 1);
    assert_eq!(report.employee_email.errors()[0].code, CODE_INTERNAL);

    assert!(report.client_email.is_effectively_sent());
    assert!(report.client_sms.is_effectively_sent());
    assert_eq!(harness.email.sent_to(), vec![CLIENT_EMAIL.to_string()]);
    assert_eq!(harness.sms.requests().len(), 1);
}

/// Test: A panic while rendering the client email leaves the SMS channel running beside it
#[tokio::test]
async fn test_panicking_client_render_spares_sms() {
    let harness = Harness::default().with_renderer(PanickingRenderer::on(CLIENT_EMAIL_SUBJECT));

    let report = assert_ok!(harness.run(change_payload()).await);

    assert!(report.employee_email.is_effectively_sent());
    assert!(!report.client_email.is_effectively_sent());
    assert_eq!(report.client_email.errors()[0].code, CODE_INTERNAL);
    assert!(report.client_sms.is_effectively_sent());
    assert_eq!(harness.sms.requests().len(), 1);
}

/// Test: The SMS transport can decline without an error message
#[tokio::test]
async fn test_sms_declined_without_error() {
    let harness = Harness::default().with_sms(SmsScript::Deliver(SmsDelivery {
        sent: false,
        error: None,
    }));

    let report = assert_ok!(harness.run(change_payload()).await);

    assert!(report.client_sms.was_attempted());
    assert!(!report.client_sms.is_effectively_sent());
    assert!(report.client_sms.errors().is_empty());
}

/// Test: SMS errors, reported or raised, land in the SMS channel only
#[tokio::test]
async fn test_sms_errors_are_recorded() {
    let reported = Harness::default().with_sms(SmsScript::Deliver(SmsDelivery {
        sent: false,
        error: Some("quota exceeded".to_string()),
    }));
    let report = assert_ok!(reported.run(change_payload()).await);
    assert_eq!(report.client_sms.errors()[0].message, "quota exceeded");
    assert!(report.client_email.is_effectively_sent());

    let raised = Harness::default().with_sms(SmsScript::Fail("gateway down".to_string()));
    let report = assert_ok!(raised.run(change_payload()).await);
    assert_eq!(
        report.client_sms.errors()[0].message,
        "Transport request failed: gateway down"
    );
    assert!(report.employee_email.is_effectively_sent());
}

/// Test: A client without contact details fails the client channels individually
#[tokio::test]
async fn test_client_without_contacts() {
    let harness = Harness::default()
        .with_client(Some(Contractor::customer(CLIENT_ID).with_name("Jane Doe")));

    let report = assert_ok!(harness.run(change_payload()).await);

    assert!(report.employee_email.is_effectively_sent());
    assert_eq!(report.client_email.errors()[0].code, CODE_MISSING_RECIPIENT);
    assert_eq!(report.client_sms.errors()[0].code, CODE_MISSING_RECIPIENT);
    assert!(harness.sms.requests().is_empty());
}

/// Test: The report always carries all three channels
#[tokio::test]
async fn test_report_serialization() {
    let harness = Harness::default().with_client(Some(client()));

    let report = assert_ok!(harness.run(new_payload()).await);
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(
        value,
        json!({
            "employeeEmail": { "attempted": true, "success": true, "errors": [] },
            "clientEmail": { "attempted": false, "success": false, "errors": [] },
            "clientSms": { "attempted": false, "success": false, "errors": [] }
        })
    );
}
