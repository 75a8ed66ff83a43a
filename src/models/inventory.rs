// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::query::{FieldValue, Record};
use crate::models::crm::Client;
use crate::models::finance::Payment;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Available, // Na vitrine
    Reserved,  // Reservado por um cliente
    Sold,      // Vendido (sai do estoque ativo)
}

impl VehicleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::Reserved => "RESERVED",
            VehicleStatus::Sold => "SOLD",
        }
    }
}

impl From<VehicleStatus> for FieldValue {
    fn from(status: VehicleStatus) -> Self {
        FieldValue::Str(status.as_str().to_string())
    }
}

// --- VEÍCULO ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,

    pub brand: String,
    pub model: String,
    pub year: i32,

    // Placa é única no estoque.
    pub plate: String,

    // Condições do financiamento.
    pub price: Decimal,
    pub down_payment: Decimal,
    pub financed_amount: Decimal,
    pub installment_count: i32,
    pub installment_value: Decimal,

    pub status: VehicleStatus,

    // Flag de visibilidade independente do status: veículo vendido sai da
    // vitrine mas permanece disponível para os relatórios históricos.
    pub archived: bool,

    pub client_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Vehicle {
    const UNIQUE_KEYS: &'static [&'static str] = &["id", "plate", "clientId"];

    fn record_id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "brand" => Some(self.brand.clone().into()),
            "model" => Some(self.model.clone().into()),
            "year" => Some(self.year.into()),
            "plate" => Some(self.plate.clone().into()),
            "price" => Some(self.price.into()),
            "downPayment" => Some(self.down_payment.into()),
            "financedAmount" => Some(self.financed_amount.into()),
            "installmentCount" => Some(self.installment_count.into()),
            "installmentValue" => Some(self.installment_value.into()),
            "status" => Some(self.status.into()),
            "archived" => Some(self.archived.into()),
            "clientId" => Some(self.client_id.into()),
            "createdAt" => Some(self.created_at.into()),
            "updatedAt" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehiclePayload {
    #[validate(length(min = 2, message = "A marca deve ter no mínimo 2 caracteres"))]
    pub brand: String,

    #[validate(length(min = 1, message = "O modelo é obrigatório"))]
    pub model: String,

    #[validate(range(min = 1950, max = 2100, message = "Ano inválido"))]
    pub year: i32,

    #[validate(length(min = 7, max = 8, message = "A placa deve ter 7 ou 8 caracteres"))]
    pub plate: String,

    pub price: Decimal,
    pub down_payment: Decimal,
    pub financed_amount: Decimal,

    #[validate(range(min = 1, message = "O número de parcelas deve ser no mínimo 1"))]
    pub installment_count: i32,
    pub installment_value: Decimal,

    // Se omitido, o veículo entra como AVAILABLE e visível.
    pub status: Option<VehicleStatus>,
    pub client_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehiclePayload {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub plate: Option<String>,
    pub price: Option<Decimal>,
    pub down_payment: Option<Decimal>,
    pub financed_amount: Option<Decimal>,
    pub installment_count: Option<i32>,
    pub installment_value: Option<Decimal>,
    pub status: Option<VehicleStatus>,
    pub archived: Option<bool>,
    // `Some(None)` desfaz o vínculo com o cliente.
    pub client_id: Option<Option<i64>>,
}

// --- Include ---

#[derive(Debug, Clone, Default)]
pub struct VehicleInclude {
    pub client: bool,
    pub payments: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleWithRelations {
    #[serde(flatten)]
    pub vehicle: Vehicle,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<Payment>>,
}
