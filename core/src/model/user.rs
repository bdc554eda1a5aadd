// core/src/model/user.rs

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VitrineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            other => Err(VitrineError::Validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// One cart entry. Everything except `product_id` and `quantity` is a
/// snapshot of the product taken when the line was last touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default = "default_quantity", deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Product stock seen when the line was written. `None` means untracked.
    #[serde(default)]
    pub stock_snapshot: Option<u32>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Int(i64),
    Float(f64),
    Text(String),
    Other(#[allow(dead_code)] IgnoredAny),
}

/// Quantities arrive from clients as whatever JSON they send. Anything that
/// is not a number of at least one becomes one.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = match Option::<RawQuantity>::deserialize(deserializer)? {
        Some(RawQuantity::Int(n)) => n,
        Some(RawQuantity::Float(f)) if f.is_finite() => f.trunc() as i64,
        Some(RawQuantity::Text(t)) => t
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map_or(1, |f| f.trunc() as i64),
        _ => 1,
    };
    Ok(crate::cart::coerce_quantity(raw))
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: None,
            quantity,
            price_cents: None,
            image: None,
            description: None,
            stock_snapshot: None,
        }
    }

    pub fn line_total_cents(&self) -> Option<i64> {
        self
            .price_cents
            .map(|p| p.saturating_mul(i64::from(self.quantity.max(1))))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
    pub profile_completed: bool,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub work_title: Option<String>,
    pub phone: Option<String>,
    pub has_whatsapp: bool,
    #[serde(default)]
    pub cart: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// A fresh client record: profile incomplete, empty cart.
    pub fn new_client(
        uid: impl Into<String>,
        email: Option<String>,
        display_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            email,
            display_name,
            role: Role::Client,
            profile_completed: false,
            full_name: None,
            address: None,
            work_title: None,
            phone: None,
            has_whatsapp: true,
            cart: Vec::new(),
            created_at: now,
        }
    }

    pub fn new_admin(
        uid: impl Into<String>,
        email: Option<String>,
        display_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            role: Role::Admin,
            profile_completed: true,
            ..Self::new_client(uid, email, display_name, now)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        self.full_name = update.full_name;
        self.address = update.address;
        self.work_title = update.work_title;
        self.phone = update.phone;
        self.has_whatsapp = update.has_whatsapp.unwrap_or(true);
        self.profile_completed = true;
    }
}

/// Profile form submitted by a client. Missing fields clear the stored value;
/// `has_whatsapp` defaults to true unless explicitly false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub work_title: Option<String>,
    pub phone: Option<String>,
    pub has_whatsapp: Option<bool>,
}
