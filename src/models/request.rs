use std::sync::LazyLock;

use serde_json::Value;

use crate::{
    errors::{DomainError, RuleError},
    models::{message::NotificationKind, rules::FieldRule},
    validation::{RuleSet, lookup},
};

const NUMBER_PATTERN: &str = r"^[\w-]+$";
const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

static RULES: LazyLock<Result<RuleSet, RuleError>> =
    LazyLock::new(|| RuleSet::new(ReturnRequest::rules()));
static NEW_DIFFERENCE_RULES: LazyLock<Result<RuleSet, RuleError>> =
    LazyLock::new(|| RuleSet::new(ReturnRequest::difference_rules(NotificationKind::New)));
static CHANGE_DIFFERENCE_RULES: LazyLock<Result<RuleSet, RuleError>> =
    LazyLock::new(|| RuleSet::new(ReturnRequest::difference_rules(NotificationKind::Change)));

/// Typed view of a validated "return status changed" payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnRequest {
    pub reseller_id: i64,
    pub kind: NotificationKind,
    pub complaint_id: i64,
    pub complaint_number: String,
    pub creator_id: i64,
    pub expert_id: i64,
    pub client_id: i64,
    pub consumption_id: i64,
    pub consumption_number: String,
    pub agreement_number: String,
    pub date: String,
    pub status_from: Option<i64>,
    pub status_to: Option<i64>,
}

impl ReturnRequest {
    pub fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::int("resellerId").required(),
            FieldRule::int("notificationType").required(),
            FieldRule::int("complaintId").required(),
            FieldRule::string("complaintNumber")
                .required()
                .matching(NUMBER_PATTERN),
            FieldRule::int("creatorId").required(),
            FieldRule::int("expertId").required(),
            FieldRule::int("clientId").required(),
            FieldRule::int("consumptionId").required(),
            FieldRule::string("consumptionNumber")
                .required()
                .matching(NUMBER_PATTERN),
            FieldRule::string("agreementNumber")
                .required()
                .matching(NUMBER_PATTERN),
            FieldRule::string("date").required().matching(DATE_PATTERN),
        ]
    }

    /// Status ids start at zero, so `allow_zero` is set on both sides.
    pub fn difference_rules(kind: NotificationKind) -> Vec<FieldRule> {
        let required = kind == NotificationKind::Change;
        vec![
            FieldRule::int("differences.from")
                .required_if(required)
                .allow_zero(),
            FieldRule::int("differences.to")
                .required_if(required)
                .allow_zero(),
        ]
    }

    /// `rules()`, compiled once per process.
    pub fn rule_set() -> Result<&'static RuleSet, RuleError> {
        RULES.as_ref().map_err(Clone::clone)
    }

    pub fn difference_rule_set(kind: NotificationKind) -> Result<&'static RuleSet, RuleError> {
        let compiled = match kind {
            NotificationKind::New => &NEW_DIFFERENCE_RULES,
            NotificationKind::Change => &CHANGE_DIFFERENCE_RULES,
        };
        compiled.as_ref().map_err(Clone::clone)
    }

    pub fn kind_of(payload: &Value) -> Result<NotificationKind, DomainError> {
        let code = int_at(payload, "notificationType").unwrap_or_default();
        NotificationKind::from_code(code).ok_or(DomainError::InvalidNotificationType(code))
    }

    /// Expects a payload that already passed `rules()` and `difference_rules()`.
    pub fn from_validated(payload: &Value, kind: NotificationKind) -> Self {
        Self {
            reseller_id: int_at(payload, "resellerId").unwrap_or_default(),
            kind,
            complaint_id: int_at(payload, "complaintId").unwrap_or_default(),
            complaint_number: string_at(payload, "complaintNumber"),
            creator_id: int_at(payload, "creatorId").unwrap_or_default(),
            expert_id: int_at(payload, "expertId").unwrap_or_default(),
            client_id: int_at(payload, "clientId").unwrap_or_default(),
            consumption_id: int_at(payload, "consumptionId").unwrap_or_default(),
            consumption_number: string_at(payload, "consumptionNumber"),
            agreement_number: string_at(payload, "agreementNumber"),
            date: string_at(payload, "date"),
            status_from: int_at(payload, "differences.from"),
            status_to: int_at(payload, "differences.to"),
        }
    }

    /// Client channels only fire for status changes that name a target status.
    pub fn client_status_change(&self) -> Option<i64> {
        match self.kind {
            NotificationKind::Change => self.status_to,
            NotificationKind::New => None,
        }
    }
}

fn int_at(payload: &Value, path: &str) -> Option<i64> {
    lookup(payload, path).and_then(Value::as_i64)
}

fn string_at(payload: &Value, path: &str) -> String {
    lookup(payload, path)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
