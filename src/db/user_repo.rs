// src/db/user_repo.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::query::{self, Where},
    db::store::MockDb,
    models::auth::{CreateUserPayload, UpdateUserPayload, User, UserRole},
    services::auth::PasswordHasher,
};

// O repositório de usuários. A senha recebida em texto plano passa pelo
// colaborador de hashing antes de entrar na coleção, sempre.
#[derive(Clone)]
pub struct UserRepository {
    db: MockDb,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserRepository {
    pub fn new(db: MockDb, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { db, hasher }
    }

    // ---
    // Funções de "Leitura"
    // ---
    // O middleware de autenticação espera `Ok(None)` para "não encontrado",
    // nunca um erro.

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_unique(&Where::new().eq("email", email)).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        self.find_unique(&Where::new().eq("id", id)).await
    }

    pub async fn find_unique(&self, criteria: &Where) -> Result<Option<User>, AppError> {
        let store = self.db.store().await;
        Ok(query::find_unique(&store.users, criteria))
    }

    pub async fn find_first(&self, criteria: &Where) -> Result<Option<User>, AppError> {
        let store = self.db.store().await;
        Ok(query::find_first(&store.users, criteria))
    }

    pub async fn find_many(&self, criteria: &Where) -> Result<Vec<User>, AppError> {
        let store = self.db.store().await;
        Ok(query::filter(&store.users, criteria))
    }

    pub async fn count(&self, criteria: &Where) -> Result<i64, AppError> {
        let store = self.db.store().await;
        Ok(query::count(&store.users, criteria))
    }

    /// Soma um campo numérico dos registros que casam com o filtro.
    pub async fn sum(&self, field: &str, criteria: &Where) -> Result<Decimal, AppError> {
        let store = self.db.store().await;
        Ok(query::sum(&store.users, field, criteria))
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create(&self, payload: CreateUserPayload) -> Result<User, AppError> {
        payload.validate()?;
        check_role_link(payload.role, payload.client_id)?;

        // O hash fica fora do lock: não segura o armazém durante o bcrypt.
        let password_hash = self.hasher.hash_password(&payload.password).await?;

        let mut store = self.db.store().await;
        if store.users.iter().any(|u| u.email == payload.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        if let Some(client_id) = payload.client_id {
            if !store.clients.iter().any(|c| c.id == client_id) {
                return Err(AppError::ClientNotFound);
            }
        }

        let now = Utc::now();
        let user = User {
            id: store.next_user_id(),
            email: payload.email,
            password_hash,
            role: payload.role,
            client_id: payload.client_id,
            created_at: now,
            updated_at: now,
        };
        store.users.push(user.clone());
        tracing::debug!("Usuário {} ({}) criado", user.id, user.email);
        Ok(user)
    }

    pub async fn update(&self, id: i64, payload: UpdateUserPayload) -> Result<User, AppError> {
        // Senha nova também passa pelo hashing, antes do lock.
        let password_hash = match &payload.password {
            Some(password) => Some(self.hasher.hash_password(password).await?),
            None => None,
        };

        let mut store = self.db.store().await;

        // Localiza o alvo antes das checagens de unicidade: id inexistente
        // responde NOT FOUND, nunca um conflito.
        let current = store
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(AppError::UserNotFound)?;

        if let Some(email) = &payload.email {
            if store.users.iter().any(|u| u.id != id && u.email == *email) {
                return Err(AppError::EmailAlreadyExists);
            }
        }

        let new_role = payload.role.unwrap_or(current.role);
        let new_client_id = match payload.client_id {
            Some(link) => link,
            None => current.client_id,
        };
        check_role_link(new_role, new_client_id)?;
        if let Some(Some(client_id)) = payload.client_id {
            if !store.clients.iter().any(|c| c.id == client_id) {
                return Err(AppError::ClientNotFound);
            }
        }

        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::UserNotFound)?;

        if let Some(email) = payload.email {
            user.email = email;
        }
        if let Some(password_hash) = password_hash {
            user.password_hash = password_hash;
        }
        user.role = new_role;
        user.client_id = new_client_id;
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    pub async fn delete(&self, id: i64) -> Result<User, AppError> {
        let mut store = self.db.store().await;
        let position = store
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(AppError::UserNotFound)?;
        Ok(store.users.remove(position))
    }
}

// Vínculo com cliente só faz sentido para o papel CLIENT.
fn check_role_link(role: UserRole, client_id: Option<i64>) -> Result<(), AppError> {
    if client_id.is_some() && role != UserRole::Client {
        Err(AppError::RoleClientMismatch)
    } else {
        Ok(())
    }
}
