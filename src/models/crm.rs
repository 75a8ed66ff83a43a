// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::db::query::{FieldValue, Record};
use crate::models::auth::User;
use crate::models::inventory::{VehicleInclude, VehicleWithRelations};

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,

    pub name: String,

    // O CPF é único e serve de credencial de acesso no portal do cliente.
    pub cpf: String,

    pub email: Option<String>,
    pub phone: Option<String>,

    // Endereço flexível: o frontend manda um JSON, guardamos como veio.
    pub address: Option<Value>,

    // Senha temporária gerada no cadastro administrativo; limpa depois
    // do primeiro acesso.
    #[serde(skip_serializing)]
    pub temp_password: Option<String>,

    // Vínculo opcional com o usuário de acesso (1-1).
    pub user_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Client {
    // id, depois a chave natural (CPF), depois a chave estrangeira.
    const UNIQUE_KEYS: &'static [&'static str] = &["id", "cpf", "userId"];

    fn record_id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "cpf" => Some(self.cpf.clone().into()),
            "email" => Some(self.email.clone().into()),
            "phone" => Some(self.phone.clone().into()),
            "userId" => Some(self.user_id.into()),
            "createdAt" => Some(self.created_at.into()),
            "updatedAt" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    pub name: String,

    #[validate(length(min = 11, max = 14, message = "O CPF deve ter entre 11 e 14 caracteres"))]
    pub cpf: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<Value>,
    pub temp_password: Option<String>,
    pub user_id: Option<i64>,
}

// Atualização parcial: `None` mantém o valor atual.
// Os campos com `Option<Option<..>>` distinguem "não mexer" de "limpar".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Value>,
    pub temp_password: Option<Option<String>>,
    pub user_id: Option<Option<i64>>,
}

// --- Include ---

// Relações que o `find_many` resolve e anexa ao resultado.
// `vehicles` aceita um include aninhado (ex.: veículos com suas parcelas).
#[derive(Debug, Clone, Default)]
pub struct ClientInclude {
    pub user: bool,
    pub vehicles: Option<VehicleInclude>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientWithRelations {
    #[serde(flatten)]
    pub client: Client,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicles: Option<Vec<VehicleWithRelations>>,
}
