use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::timestamp;
use super::validation::{non_negative, Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Deposit,
    Final,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentType::Deposit => write!(f, "deposit"),
            PaymentType::Final => write!(f, "final"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub total_amount: f64,
    pub estimated_amount: f64,
    pub currency: String,
    pub wedding_id: Uuid,
    #[serde(rename = "wedding_budget")]
    pub wedding: Option<Uuid>,
    pub items: Vec<BudgetItem>,
}

impl Budget {
    pub fn new(
        wedding_id: Uuid,
        total_amount: f64,
        estimated_amount: f64,
        currency: impl Into<String>,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            total_amount,
            estimated_amount,
            currency: currency.into(),
            wedding_id,
            wedding: None,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<BudgetItem>) -> Self {
        self.items = items;
        self
    }

    pub fn paid_total(&self) -> f64 {
        self.items
            .iter()
            .filter(|item| item.payment_status == PaymentStatus::Paid)
            .map(|item| item.amount)
            .sum()
    }

    pub fn pending_total(&self) -> f64 {
        self.items
            .iter()
            .filter(|item| item.payment_status == PaymentStatus::Pending)
            .map(|item| item.amount)
            .sum()
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for Budget {
    fn validate(&self) -> Result<(), ValidationError> {
        non_negative("total_amount", self.total_amount)?;
        non_negative("estimated_amount", self.estimated_amount)?;
        self.items.iter().try_for_each(Validate::validate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetItem {
    pub id: Uuid,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub currency: String,
    #[serde(with = "timestamp")]
    pub due_date: DateTime<Utc>,
    #[serde(with = "timestamp::option", default)]
    pub paid_at: Option<DateTime<Utc>>,
    pub payer: Option<String>,
    pub notes: Option<String>,
    pub payment_type: PaymentType,
    pub payment_status: PaymentStatus,
    pub budget_id: Uuid,
    pub budget: Option<Uuid>,
}

impl BudgetItem {
    pub fn new(
        budget_id: Uuid,
        name: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        currency: impl Into<String>,
        due_date: DateTime<Utc>,
        payment_type: PaymentType,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: name.into(),
            category: category.into(),
            amount,
            currency: currency.into(),
            due_date,
            paid_at: None,
            payer: None,
            notes: None,
            payment_type,
            payment_status: PaymentStatus::Pending,
            budget_id,
            budget: None,
        }
    }

    /// Records the payment, keeping status and date consistent.
    pub fn mark_paid(&mut self, paid_at: DateTime<Utc>, payer: Option<String>) {
        self.payment_status = PaymentStatus::Paid;
        self.paid_at = Some(paid_at);
        self.payer = payer;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for BudgetItem {
    fn validate(&self) -> Result<(), ValidationError> {
        non_negative("amount", self.amount)?;
        if self.payment_status == PaymentStatus::Paid && self.paid_at.is_none() {
            return Err(ValidationError::MissingPaidAt(self.name.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for BudgetItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {:.2} {} ({}, {})",
            self.name,
            self.category,
            self.amount,
            self.currency,
            self.payment_type,
            self.payment_status
        )
    }
}
