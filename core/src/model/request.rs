// core/src/model/request.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::user::{CartLine, UserRecord};
use crate::error::VitrineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "completed" => Ok(RequestStatus::Completed),
            other => Err(VitrineError::Validation(format!("Unknown request status '{}'", other))),
        }
    }
}

/// How the shop reaches the customer, copied from the profile at submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub user_email: Option<String>,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub has_whatsapp: bool,
}

impl Contact {
    /// `session_email` wins over the stored email, like the auth identity does.
    pub fn from_user(user: Option<&UserRecord>, session_email: Option<&str>) -> Self {
        let non_empty = |v: &Option<String>| v.as_ref().filter(|s| !s.trim().is_empty()).cloned();
        match user {
            Some(u) => Contact {
                user_email: session_email.map(str::to_string).or_else(|| non_empty(&u.email)),
                full_name: non_empty(&u.full_name),
                address: non_empty(&u.address),
                phone: non_empty(&u.phone),
                has_whatsapp: u.has_whatsapp,
            },
            None => Contact {
                user_email: session_email.map(str::to_string),
                has_whatsapp: true,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLine {
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: u32,
    pub image: Option<String>,
    pub price_cents: Option<i64>,
    pub description: Option<String>,
}

impl From<&CartLine> for RequestLine {
    fn from(line: &CartLine) -> Self {
        let image = line
            .image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        RequestLine {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            quantity: line.quantity.max(1),
            image,
            price_cents: line.price_cents,
            description: line.description.clone().filter(|d| !d.is_empty()),
        }
    }
}

/// A submitted order awaiting admin review. Only `status` changes after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub contact: Contact,
    pub items: Vec<RequestLine>,
    pub status: RequestStatus,
    pub request_number: String,
    pub created_at: DateTime<Utc>,
}

impl Request {
    pub fn total_cents(&self) -> Option<i64> {
        if self.items.iter().all(|i| i.price_cents.is_none()) {
            return None;
        }
        Some(
            self
                .items
                .iter()
                .map(|i| i.price_cents.unwrap_or(0).saturating_mul(i64::from(i.quantity)))
                .fold(0, i64::saturating_add),
        )
    }
}
