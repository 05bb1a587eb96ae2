use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a payment record owned by the donation platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaymentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of the donation form a payment was made through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(String);

impl FormId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FormId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Payment status as stored by the donation platform.
///
/// `Publish` is the platform's name for a completed donation. Statuses this
/// crate has no opinion about are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    Publish,
    Refunded,
    Failed,
    Cancelled,
    Abandoned,
    Revoked,
    Preapproval,
    Processing,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Publish => "publish",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Abandoned => "abandoned",
            PaymentStatus::Revoked => "revoked",
            PaymentStatus::Preapproval => "preapproval",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Other(slug) => slug,
        }
    }
}

impl From<&str> for PaymentStatus {
    fn from(slug: &str) -> Self {
        match slug.trim().to_ascii_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "publish" | "complete" | "completed" => PaymentStatus::Publish,
            "refunded" => PaymentStatus::Refunded,
            "failed" => PaymentStatus::Failed,
            "cancelled" => PaymentStatus::Cancelled,
            "abandoned" => PaymentStatus::Abandoned,
            "revoked" => PaymentStatus::Revoked,
            "preapproval" => PaymentStatus::Preapproval,
            "processing" => PaymentStatus::Processing,
            other => PaymentStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(slug: String) -> Self {
        PaymentStatus::from(slug.as_str())
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
