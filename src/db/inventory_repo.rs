// src/db/inventory_repo.rs

use chrono::Utc;
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::query::{self, QueryOptions, Where},
    db::store::{MockDb, MockStore},
    models::inventory::{
        CreateVehiclePayload, UpdateVehiclePayload, Vehicle, VehicleInclude, VehicleStatus,
        VehicleWithRelations,
    },
};

#[derive(Clone)]
pub struct VehicleRepository {
    db: MockDb,
}

impl VehicleRepository {
    pub fn new(db: MockDb) -> Self {
        Self { db }
    }

    // ---
    // Funções de "Leitura"
    // ---

    pub async fn find_many(
        &self,
        options: QueryOptions<VehicleInclude>,
    ) -> Result<Vec<VehicleWithRelations>, AppError> {
        let store = self.db.store().await;
        let mut rows = query::filter(&store.vehicles, &options.filter);
        if let Some(order) = &options.order_by {
            query::sort(&mut rows, order);
        }
        Ok(rows
            .into_iter()
            .map(|vehicle| attach_relations(&store, vehicle, &options.include))
            .collect())
    }

    /// Estoque ativo: tudo que não está arquivado. Os relatórios históricos
    /// consultam direto o `find_many`, sem esse filtro.
    pub async fn find_active(&self) -> Result<Vec<Vehicle>, AppError> {
        let store = self.db.store().await;
        Ok(query::filter(
            &store.vehicles,
            &Where::new().eq("archived", false),
        ))
    }

    pub async fn find_unique(&self, criteria: &Where) -> Result<Option<Vehicle>, AppError> {
        let store = self.db.store().await;
        Ok(query::find_unique(&store.vehicles, criteria))
    }

    pub async fn find_first(&self, criteria: &Where) -> Result<Option<Vehicle>, AppError> {
        let store = self.db.store().await;
        Ok(query::find_first(&store.vehicles, criteria))
    }

    pub async fn count(&self, criteria: &Where) -> Result<i64, AppError> {
        let store = self.db.store().await;
        Ok(query::count(&store.vehicles, criteria))
    }

    /// Soma um campo numérico dos registros que casam com o filtro,
    /// ex.: valor total do estoque vendido.
    pub async fn sum(&self, field: &str, criteria: &Where) -> Result<Decimal, AppError> {
        let store = self.db.store().await;
        Ok(query::sum(&store.vehicles, field, criteria))
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create(&self, payload: CreateVehiclePayload) -> Result<Vehicle, AppError> {
        payload.validate()?;

        let mut store = self.db.store().await;
        if store.vehicles.iter().any(|v| v.plate == payload.plate) {
            return Err(AppError::PlateAlreadyExists(payload.plate));
        }

        let status = payload.status.unwrap_or(VehicleStatus::Available);
        check_client_link(status, payload.client_id)?;
        if let Some(client_id) = payload.client_id {
            ensure_client_exists(&store, client_id)?;
        }

        let now = Utc::now();
        let vehicle = Vehicle {
            id: store.next_vehicle_id(),
            brand: payload.brand,
            model: payload.model,
            year: payload.year,
            plate: payload.plate,
            price: payload.price,
            down_payment: payload.down_payment,
            financed_amount: payload.financed_amount,
            installment_count: payload.installment_count,
            installment_value: payload.installment_value,
            status,
            // Vendido já entra fora da vitrine.
            archived: status == VehicleStatus::Sold,
            client_id: payload.client_id,
            created_at: now,
            updated_at: now,
        };
        store.vehicles.push(vehicle.clone());
        tracing::debug!("Veículo {} ({}) criado", vehicle.id, vehicle.plate);
        Ok(vehicle)
    }

    /// Além da mesclagem parcial, é aqui que o ciclo de vida do veículo é
    /// garantido: vendido/reservado exige cliente vinculado e voltar para
    /// AVAILABLE exige desfazer o vínculo na mesma atualização.
    pub async fn update(&self, id: i64, payload: UpdateVehiclePayload) -> Result<Vehicle, AppError> {
        let mut store = self.db.store().await;

        let current = store
            .vehicles
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or(AppError::VehicleNotFound)?;

        if let Some(plate) = &payload.plate {
            if store.vehicles.iter().any(|v| v.id != id && v.plate == *plate) {
                return Err(AppError::PlateAlreadyExists(plate.clone()));
            }
        }

        let new_status = payload.status.unwrap_or(current.status);
        let new_client_id = match payload.client_id {
            Some(link) => link,
            None => current.client_id,
        };
        check_client_link(new_status, new_client_id)?;
        if let Some(Some(client_id)) = payload.client_id {
            ensure_client_exists(&store, client_id)?;
        }

        // Arquivamento: explícito no payload, ou derivado da transição de
        // status (entrar em SOLD arquiva; voltar para AVAILABLE desarquiva).
        let new_archived = payload.archived.unwrap_or(if new_status == VehicleStatus::Sold {
            true
        } else if current.status == VehicleStatus::Sold && new_status == VehicleStatus::Available {
            false
        } else {
            current.archived
        });

        let vehicle = store
            .vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(AppError::VehicleNotFound)?;

        if let Some(brand) = payload.brand {
            vehicle.brand = brand;
        }
        if let Some(model) = payload.model {
            vehicle.model = model;
        }
        if let Some(year) = payload.year {
            vehicle.year = year;
        }
        if let Some(plate) = payload.plate {
            vehicle.plate = plate;
        }
        if let Some(price) = payload.price {
            vehicle.price = price;
        }
        if let Some(down_payment) = payload.down_payment {
            vehicle.down_payment = down_payment;
        }
        if let Some(financed_amount) = payload.financed_amount {
            vehicle.financed_amount = financed_amount;
        }
        if let Some(installment_count) = payload.installment_count {
            vehicle.installment_count = installment_count;
        }
        if let Some(installment_value) = payload.installment_value {
            vehicle.installment_value = installment_value;
        }
        vehicle.status = new_status;
        vehicle.archived = new_archived;
        vehicle.client_id = new_client_id;
        vehicle.updated_at = Utc::now();

        Ok(vehicle.clone())
    }

    pub async fn delete(&self, id: i64) -> Result<Vehicle, AppError> {
        let mut store = self.db.store().await;
        let position = store
            .vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or(AppError::VehicleNotFound)?;
        let removed = store.vehicles.remove(position);
        tracing::debug!("Veículo {} ({}) removido", removed.id, removed.plate);
        Ok(removed)
    }
}

// Invariante do ciclo de vida: vendido/reservado tem cliente, disponível não.
fn check_client_link(status: VehicleStatus, client_id: Option<i64>) -> Result<(), AppError> {
    let consistent = match status {
        VehicleStatus::Available => client_id.is_none(),
        VehicleStatus::Reserved | VehicleStatus::Sold => client_id.is_some(),
    };
    if consistent {
        Ok(())
    } else {
        Err(AppError::VehicleClientMismatch)
    }
}

fn ensure_client_exists(store: &MockStore, client_id: i64) -> Result<(), AppError> {
    if store.clients.iter().any(|c| c.id == client_id) {
        Ok(())
    } else {
        Err(AppError::ClientNotFound)
    }
}

/// Resolve as relações pedidas no `include` seguindo os vínculos por id.
pub(crate) fn attach_relations(
    store: &MockStore,
    vehicle: Vehicle,
    include: &VehicleInclude,
) -> VehicleWithRelations {
    let client = if include.client {
        vehicle
            .client_id
            .and_then(|client_id| store.clients.iter().find(|c| c.id == client_id).cloned())
    } else {
        None
    };

    let payments = include.payments.then(|| {
        store
            .payments
            .iter()
            .filter(|p| p.vehicle_id == vehicle.id)
            .cloned()
            .collect()
    });

    VehicleWithRelations {
        vehicle,
        client,
        payments,
    }
}
