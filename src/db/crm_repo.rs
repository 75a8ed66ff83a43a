// src/db/crm_repo.rs

use chrono::Utc;
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::query::{self, QueryOptions, Where},
    db::store::{MockDb, MockStore},
    models::crm::{
        Client, ClientInclude, ClientWithRelations, CreateClientPayload, UpdateClientPayload,
    },
};

// O repositório de clientes, responsável por todas as interações com a
// coleção 'clients' do armazém em memória.
#[derive(Clone)]
pub struct ClientRepository {
    db: MockDb,
}

impl ClientRepository {
    pub fn new(db: MockDb) -> Self {
        Self { db }
    }

    // ---
    // Funções de "Leitura"
    // ---

    /// Resultado vazio não é erro: devolve um `Vec` vazio.
    pub async fn find_many(
        &self,
        options: QueryOptions<ClientInclude>,
    ) -> Result<Vec<ClientWithRelations>, AppError> {
        let store = self.db.store().await;
        let mut rows = query::filter(&store.clients, &options.filter);
        if let Some(order) = &options.order_by {
            query::sort(&mut rows, order);
        }
        Ok(rows
            .into_iter()
            .map(|client| attach_relations(&store, client, &options.include))
            .collect())
    }

    /// Busca por chave identificadora (id, CPF ou vínculo de usuário).
    /// "Não encontrado" é `Ok(None)`, nunca um erro.
    pub async fn find_unique(&self, criteria: &Where) -> Result<Option<Client>, AppError> {
        let store = self.db.store().await;
        Ok(query::find_unique(&store.clients, criteria))
    }

    pub async fn find_first(&self, criteria: &Where) -> Result<Option<Client>, AppError> {
        let store = self.db.store().await;
        Ok(query::find_first(&store.clients, criteria))
    }

    pub async fn count(&self, criteria: &Where) -> Result<i64, AppError> {
        let store = self.db.store().await;
        Ok(query::count(&store.clients, criteria))
    }

    /// Soma um campo numérico dos registros que casam com o filtro.
    pub async fn sum(&self, field: &str, criteria: &Where) -> Result<Decimal, AppError> {
        let store = self.db.store().await;
        Ok(query::sum(&store.clients, field, criteria))
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create(&self, payload: CreateClientPayload) -> Result<Client, AppError> {
        payload.validate()?;

        let mut store = self.db.store().await;
        if store.clients.iter().any(|c| c.cpf == payload.cpf) {
            return Err(AppError::CpfAlreadyExists(payload.cpf));
        }
        if let Some(user_id) = payload.user_id {
            if !store.users.iter().any(|u| u.id == user_id) {
                return Err(AppError::UserNotFound);
            }
        }

        let now = Utc::now();
        let client = Client {
            id: store.next_client_id(),
            name: payload.name,
            cpf: payload.cpf,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            temp_password: payload.temp_password,
            user_id: payload.user_id,
            created_at: now,
            updated_at: now,
        };
        store.clients.push(client.clone());
        tracing::debug!("Cliente {} criado", client.id);
        Ok(client)
    }

    /// Mescla os campos enviados sobre o registro existente. O id e o
    /// `created_at` nunca mudam; o `updated_at` é sempre renovado.
    pub async fn update(&self, id: i64, payload: UpdateClientPayload) -> Result<Client, AppError> {
        let mut store = self.db.store().await;

        // Localiza o alvo antes de qualquer outra checagem: id inexistente
        // responde NOT FOUND, nunca um conflito de unicidade.
        if !store.clients.iter().any(|c| c.id == id) {
            return Err(AppError::ClientNotFound);
        }
        if let Some(cpf) = &payload.cpf {
            if store.clients.iter().any(|c| c.id != id && c.cpf == *cpf) {
                return Err(AppError::CpfAlreadyExists(cpf.clone()));
            }
        }
        if let Some(Some(user_id)) = payload.user_id {
            if !store.users.iter().any(|u| u.id == user_id) {
                return Err(AppError::UserNotFound);
            }
        }

        let client = store
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::ClientNotFound)?;

        if let Some(name) = payload.name {
            client.name = name;
        }
        if let Some(cpf) = payload.cpf {
            client.cpf = cpf;
        }
        if let Some(email) = payload.email {
            client.email = Some(email);
        }
        if let Some(phone) = payload.phone {
            client.phone = Some(phone);
        }
        if let Some(address) = payload.address {
            client.address = Some(address);
        }
        if let Some(temp_password) = payload.temp_password {
            client.temp_password = temp_password;
        }
        if let Some(user_id) = payload.user_id {
            client.user_id = user_id;
        }
        client.updated_at = Utc::now();

        Ok(client.clone())
    }

    /// Exclusão física: devolve o registro removido.
    pub async fn delete(&self, id: i64) -> Result<Client, AppError> {
        let mut store = self.db.store().await;
        let position = store
            .clients
            .iter()
            .position(|c| c.id == id)
            .ok_or(AppError::ClientNotFound)?;
        let removed = store.clients.remove(position);
        tracing::debug!("Cliente {} removido", removed.id);
        Ok(removed)
    }
}

/// Resolve as relações pedidas no `include` seguindo os vínculos por id.
pub(crate) fn attach_relations(
    store: &MockStore,
    client: Client,
    include: &ClientInclude,
) -> ClientWithRelations {
    let user = if include.user {
        client
            .user_id
            .and_then(|user_id| store.users.iter().find(|u| u.id == user_id).cloned())
    } else {
        None
    };

    let vehicles = include.vehicles.as_ref().map(|nested| {
        store
            .vehicles
            .iter()
            .filter(|v| v.client_id == Some(client.id))
            .cloned()
            .map(|vehicle| crate::db::inventory_repo::attach_relations(store, vehicle, nested))
            .collect()
    });

    ClientWithRelations {
        client,
        user,
        vehicles,
    }
}
