// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::query::{FieldValue, Record};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Employee,
    Client,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Employee => "EMPLOYEE",
            UserRole::Client => "CLIENT",
        }
    }
}

impl From<UserRole> for FieldValue {
    fn from(role: UserRole) -> Self {
        FieldValue::Str(role.as_str().to_string())
    }
}

// --- USUÁRIO ---

// Representa um usuário de acesso ao sistema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: UserRole,

    // Presente apenas quando o papel é CLIENT.
    pub client_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for User {
    const UNIQUE_KEYS: &'static [&'static str] = &["id", "email", "clientId"];

    fn record_id(&self) -> i64 {
        self.id
    }

    // O hash da senha fica de fora de propósito: não é um campo consultável.
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "email" => Some(self.email.clone().into()),
            "role" => Some(self.role.into()),
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
pub struct CreateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    // A senha em texto plano NUNCA é armazenada: passa pelo PasswordHasher
    // antes de entrar na coleção.
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    pub role: UserRole,
    pub client_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub client_id: Option<Option<i64>>,
}
