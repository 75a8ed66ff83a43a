// src/db/store.rs

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::models::{auth::User, crm::Client, finance::Payment, inventory::Vehicle};

// ---
// O Armazém de Entidades
// ---
// Quatro coleções em memória mais um contador de id por coleção.
// Substitui a camada de persistência quando não há banco configurado.

/// Sequência de ids de uma coleção: começa em `tamanho + 1` no momento da
/// construção do armazém e só cresce. Ids nunca são reutilizados, mesmo
/// depois de exclusões.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: i64,
}

impl IdSequence {
    pub fn new(existing: usize) -> Self {
        Self {
            next: existing as i64 + 1,
        }
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[derive(Debug)]
pub struct MockStore {
    pub clients: Vec<Client>,
    pub vehicles: Vec<Vehicle>,
    pub payments: Vec<Payment>,
    pub users: Vec<User>,

    client_ids: IdSequence,
    vehicle_ids: IdSequence,
    payment_ids: IdSequence,
    user_ids: IdSequence,
}

impl MockStore {
    pub fn new() -> Self {
        Self::with_data(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    /// Armazém pré-populado (carga de dados de exemplo). As sequências de id
    /// partem do tamanho de cada coleção.
    pub fn with_data(
        clients: Vec<Client>,
        vehicles: Vec<Vehicle>,
        payments: Vec<Payment>,
        users: Vec<User>,
    ) -> Self {
        Self {
            client_ids: IdSequence::new(clients.len()),
            vehicle_ids: IdSequence::new(vehicles.len()),
            payment_ids: IdSequence::new(payments.len()),
            user_ids: IdSequence::new(users.len()),
            clients,
            vehicles,
            payments,
            users,
        }
    }

    pub fn next_client_id(&mut self) -> i64 {
        self.client_ids.next_id()
    }

    pub fn next_vehicle_id(&mut self) -> i64 {
        self.vehicle_ids.next_id()
    }

    pub fn next_payment_id(&mut self) -> i64 {
        self.payment_ids.next_id()
    }

    pub fn next_user_id(&mut self) -> i64 {
        self.user_ids.next_id()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle clonável compartilhado pelos repositórios, o análogo do `PgPool`.
/// O mutex é o lock único de escrita: cada operação completa sua mutação
/// antes de devolver o armazém, então toda leitura vê um snapshot íntegro.
#[derive(Clone)]
pub struct MockDb {
    inner: Arc<Mutex<MockStore>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::from_store(MockStore::new())
    }

    pub fn from_store(store: MockStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn store(&self) -> MutexGuard<'_, MockStore> {
        self.inner.lock().await
    }
}

impl Default for MockDb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::IdSequence;

    #[test]
    fn id_sequence_starts_after_existing_records() {
        let mut seq = IdSequence::new(3);
        assert_eq!(seq.next_id(), 4);
        assert_eq!(seq.next_id(), 5);
    }

    #[test]
    fn id_sequence_never_repeats() {
        let mut seq = IdSequence::new(0);
        let first = seq.next_id();
        let second = seq.next_id();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        // Excluir registros não devolve ids: a sequência só conhece o próximo.
        assert_eq!(seq.next_id(), 3);
    }
}
