use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractorKind {
    Customer,
    Seller,
    Employee,
}

impl Display for ContractorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ContractorKind::Customer => write!(f, "customer"),
            ContractorKind::Seller => write!(f, "seller"),
            ContractorKind::Employee => write!(f, "employee"),
        }
    }
}

/// Client, creator or expert. The kind only says which role the record plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contractor {
    pub id: i64,
    pub kind: ContractorKind,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub mobile: Option<String>,
}

impl Contractor {
    pub fn new(id: i64, kind: ContractorKind) -> Self {
        Self {
            id,
            kind,
            name: String::new(),
            email: None,
            mobile: None,
        }
    }

    pub fn customer(id: i64) -> Self {
        Self::new(id, ContractorKind::Customer)
    }

    pub fn seller(id: i64) -> Self {
        Self::new(id, ContractorKind::Seller)
    }

    pub fn employee(id: i64) -> Self {
        Self::new(id, ContractorKind::Employee)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    pub fn full_name(&self) -> String {
        if self.name.is_empty() {
            self.id.to_string()
        } else {
            format!("{} {}", self.name, self.id)
        }
    }

    pub fn email_address(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }

    pub fn has_mobile(&self) -> bool {
        self.mobile.as_deref().is_some_and(|mobile| !mobile.is_empty())
    }
}
