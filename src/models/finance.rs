// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::query::{FieldValue, Record};
use crate::models::crm::Client;
use crate::models::inventory::Vehicle;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending, // Aberta
    Paid,    // Quitada
    Overdue, // Vencida
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Overdue => "OVERDUE",
        }
    }
}

impl From<PaymentStatus> for FieldValue {
    fn from(status: PaymentStatus) -> Self {
        FieldValue::Str(status.as_str().to_string())
    }
}

// --- PARCELA ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,

    pub client_id: i64,
    pub vehicle_id: i64,

    // Número sequencial da parcela dentro do financiamento do veículo
    // (1-based, único por veículo).
    pub installment_number: i32,

    pub amount: Decimal,

    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,

    // Invariante: PAID se e somente se paid_date estiver preenchida.
    pub status: PaymentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Status exibido em relatórios: parcela pendente já vencida aparece
    /// como OVERDUE, sem alterar o que está armazenado.
    pub fn display_status(&self, today: NaiveDate) -> PaymentStatus {
        if self.status == PaymentStatus::Pending && self.paid_date.is_none() && self.due_date < today
        {
            PaymentStatus::Overdue
        } else {
            self.status
        }
    }
}

impl Record for Payment {
    const UNIQUE_KEYS: &'static [&'static str] = &["id", "vehicleId", "clientId"];

    fn record_id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "clientId" => Some(self.client_id.into()),
            "vehicleId" => Some(self.vehicle_id.into()),
            "installmentNumber" => Some(self.installment_number.into()),
            "amount" => Some(self.amount.into()),
            "dueDate" => Some(self.due_date.into()),
            "paidDate" => Some(self.paid_date.into()),
            "status" => Some(self.status.into()),
            "createdAt" => Some(self.created_at.into()),
            "updatedAt" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentPayload {
    pub client_id: i64,
    pub vehicle_id: i64,

    #[validate(range(min = 1, message = "O número da parcela deve ser no mínimo 1"))]
    pub installment_number: i32,

    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,

    // Se omitido: PAID quando paid_date vier preenchida, senão PENDING.
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentPayload {
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    // `Some(None)` estorna o pagamento (limpa a data).
    pub paid_date: Option<Option<NaiveDate>>,
    pub status: Option<PaymentStatus>,
}

// --- Include ---

#[derive(Debug, Clone, Default)]
pub struct PaymentInclude {
    pub client: bool,
    pub vehicle: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithRelations {
    #[serde(flatten)]
    pub payment: Payment,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
}
