// src/config.rs

use std::env;
use std::sync::Arc;

use crate::db::{
    ClientRepository, MockDb, MockStore, PaymentRepository, UserRepository, VehicleRepository,
};
use crate::services::auth::BcryptHasher;

/// Inicializa o logger. Fica aqui para a camada HTTP chamar uma vez no boot.
pub fn init_tracing() {
    tracing_subscriber::fmt().with_target(false).compact().init();
}

#[derive(Clone)]
pub struct AppState {
    pub db: MockDb,
    pub client_repo: ClientRepository,
    pub vehicle_repo: VehicleRepository,
    pub payment_repo: PaymentRepository,
    pub user_repo: UserRepository,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, a aplicação
    // não deve subir.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // Sem DATABASE_URL o sistema roda no modo "mock database": as quatro
        // coleções vivem em memória e os ids são sequenciais por coleção.
        if env::var("DATABASE_URL").is_ok() {
            tracing::warn!(
                "DATABASE_URL definida, mas este build usa apenas o banco em memória."
            );
        }
        tracing::info!("✅ Banco de dados em memória inicializado (modo mock).");

        Ok(Self::from_store(MockStore::new()))
    }

    // --- Monta o gráfico de dependências ---
    // Armazém explícito em vez de singleton global: cada teste cria o seu.
    pub fn from_store(store: MockStore) -> Self {
        let db = MockDb::from_store(store);
        let hasher = Arc::new(BcryptHasher);

        Self {
            client_repo: ClientRepository::new(db.clone()),
            vehicle_repo: VehicleRepository::new(db.clone()),
            payment_repo: PaymentRepository::new(db.clone()),
            user_repo: UserRepository::new(db.clone(), hasher),
            db,
        }
    }
}
