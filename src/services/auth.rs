// src/services/auth.rs

use async_trait::async_trait;
use bcrypt::{hash, verify};

use crate::common::error::AppError;

// O colaborador de hashing de credenciais. O core só garante uma coisa:
// nenhuma senha em texto plano chega às coleções: tudo passa por aqui antes.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AppError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
        -> Result<bool, AppError>;
}

// Implementação padrão com bcrypt. O custo do bcrypt é proposital e pesado,
// então o trabalho roda em um thread separado.
#[derive(Debug, Clone, Default)]
pub struct BcryptHasher;

#[async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
        Ok(valid)
    }
}
