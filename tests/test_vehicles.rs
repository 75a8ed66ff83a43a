//! Testes de integração do repositório de veículos e do ciclo de vida
//! de venda (AVAILABLE → RESERVED/SOLD e a flag de arquivamento).

use revenda::common::error::AppError;
use revenda::config::AppState;
use revenda::db::query::{OrderBy, QueryOptions, Where};
use revenda::db::MockStore;
use revenda::models::crm::CreateClientPayload;
use revenda::models::inventory::{CreateVehiclePayload, UpdateVehiclePayload, VehicleStatus};
use rust_decimal::Decimal;

// ──────────────────────── Helpers ────────────────────────

fn state() -> AppState {
    AppState::from_store(MockStore::new())
}

async fn seed_client(state: &AppState) -> i64 {
    state
        .client_repo
        .create(CreateClientPayload {
            name: "Ana".to_string(),
            cpf: "11111111111".to_string(),
            email: None,
            phone: None,
            address: None,
            temp_password: None,
            user_id: None,
        })
        .await
        .unwrap()
        .id
}

fn make_vehicle(plate: &str, year: i32) -> CreateVehiclePayload {
    CreateVehiclePayload {
        brand: "Fiat".to_string(),
        model: "Uno".to_string(),
        year,
        plate: plate.to_string(),
        price: Decimal::new(3500000, 2),
        down_payment: Decimal::new(1000000, 2),
        financed_amount: Decimal::new(2500000, 2),
        installment_count: 6,
        installment_value: Decimal::new(41667, 2),
        status: None,
        client_id: None,
    }
}

// ══════════════════════════════════════════════════════════
//  create
// ══════════════════════════════════════════════════════════

#[tokio::test]
async fn create_defaults_to_available_and_visible() {
    let state = state();
    let vehicle = state.vehicle_repo.create(make_vehicle("ABC1D23", 2020)).await.unwrap();

    assert_eq!(vehicle.id, 1);
    assert_eq!(vehicle.status, VehicleStatus::Available);
    assert!(!vehicle.archived);
    assert!(vehicle.client_id.is_none());
}

#[tokio::test]
async fn create_rejects_duplicate_plate() {
    let state = state();
    state.vehicle_repo.create(make_vehicle("ABC1D23", 2020)).await.unwrap();

    let err = state.vehicle_repo.create(make_vehicle("ABC1D23", 2021)).await.unwrap_err();
    assert!(matches!(err, AppError::PlateAlreadyExists(_)));
}

#[tokio::test]
async fn create_sold_requires_client_link() {
    let state = state();

    let mut payload = make_vehicle("ABC1D23", 2020);
    payload.status = Some(VehicleStatus::Sold);
    let err = state.vehicle_repo.create(payload).await.unwrap_err();
    assert!(matches!(err, AppError::VehicleClientMismatch));

    let client_id = seed_client(&state).await;
    let mut payload = make_vehicle("ABC1D23", 2020);
    payload.status = Some(VehicleStatus::Sold);
    payload.client_id = Some(client_id);
    let vehicle = state.vehicle_repo.create(payload).await.unwrap();

    // Vendido já entra arquivado (fora da vitrine).
    assert!(vehicle.archived);
    assert_eq!(vehicle.client_id, Some(client_id));
}

#[tokio::test]
async fn create_available_with_client_link_is_rejected() {
    let state = state();
    let client_id = seed_client(&state).await;

    let mut payload = make_vehicle("ABC1D23", 2020);
    payload.client_id = Some(client_id); // status AVAILABLE implícito
    let err = state.vehicle_repo.create(payload).await.unwrap_err();
    assert!(matches!(err, AppError::VehicleClientMismatch));
}

#[tokio::test]
async fn create_rejects_unknown_client() {
    let state = state();
    let mut payload = make_vehicle("ABC1D23", 2020);
    payload.status = Some(VehicleStatus::Reserved);
    payload.client_id = Some(99);

    let err = state.vehicle_repo.create(payload).await.unwrap_err();
    assert!(matches!(err, AppError::ClientNotFound));
}

// ══════════════════════════════════════════════════════════
//  ciclo de vida da venda
// ══════════════════════════════════════════════════════════

#[tokio::test]
async fn selling_sets_client_and_archives() {
    let state = state();
    let client_id = seed_client(&state).await;
    let vehicle = state.vehicle_repo.create(make_vehicle("ABC1D23", 2020)).await.unwrap();

    let sold = state
        .vehicle_repo
        .update(
            vehicle.id,
            UpdateVehiclePayload {
                status: Some(VehicleStatus::Sold),
                client_id: Some(Some(client_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(sold.status, VehicleStatus::Sold);
    assert_eq!(sold.client_id, Some(client_id));
    assert!(sold.archived);
}

#[tokio::test]
async fn selling_without_client_is_rejected() {
    let state = state();
    let vehicle = state.vehicle_repo.create(make_vehicle("ABC1D23", 2020)).await.unwrap();

    let err = state
        .vehicle_repo
        .update(
            vehicle.id,
            UpdateVehiclePayload {
                status: Some(VehicleStatus::Sold),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VehicleClientMismatch));
}

#[tokio::test]
async fn unselling_must_clear_client_link_in_same_update() {
    let state = state();
    let client_id = seed_client(&state).await;
    let mut payload = make_vehicle("ABC1D23", 2020);
    payload.status = Some(VehicleStatus::Sold);
    payload.client_id = Some(client_id);
    let vehicle = state.vehicle_repo.create(payload).await.unwrap();

    // Voltar para AVAILABLE mantendo o vínculo é proibido.
    let err = state
        .vehicle_repo
        .update(
            vehicle.id,
            UpdateVehiclePayload {
                status: Some(VehicleStatus::Available),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VehicleClientMismatch));

    // Na mesma atualização, limpando o vínculo, a transição é aceita
    // e o veículo volta para a vitrine.
    let relisted = state
        .vehicle_repo
        .update(
            vehicle.id,
            UpdateVehiclePayload {
                status: Some(VehicleStatus::Available),
                client_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(relisted.status, VehicleStatus::Available);
    assert!(relisted.client_id.is_none());
    assert!(!relisted.archived);
}

// ══════════════════════════════════════════════════════════
//  visibilidade e consultas
// ══════════════════════════════════════════════════════════

#[tokio::test]
async fn find_active_hides_archived_but_find_many_sees_everything() {
    let state = state();
    let client_id = seed_client(&state).await;
    state.vehicle_repo.create(make_vehicle("AAA1A11", 2019)).await.unwrap();
    let mut sold = make_vehicle("BBB2B22", 2021);
    sold.status = Some(VehicleStatus::Sold);
    sold.client_id = Some(client_id);
    state.vehicle_repo.create(sold).await.unwrap();

    let active = state.vehicle_repo.find_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].plate, "AAA1A11");

    // Relatórios históricos enxergam o estoque todo.
    let all = state.vehicle_repo.find_many(QueryOptions::default()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn sum_of_prices_respects_the_filter() {
    let state = state();
    let mut cheap = make_vehicle("AAA1A11", 2019);
    cheap.price = Decimal::new(2000000, 2); // 20000.00
    state.vehicle_repo.create(cheap).await.unwrap();
    let mut dear = make_vehicle("BBB2B22", 2022);
    dear.price = Decimal::new(5000000, 2); // 50000.00
    state.vehicle_repo.create(dear).await.unwrap();

    let total = state.vehicle_repo.sum("price", &Where::new()).await.unwrap();
    assert_eq!(total, Decimal::new(7000000, 2));

    let only_new = state
        .vehicle_repo
        .sum("price", &Where::new().eq("plate", "BBB2B22"))
        .await
        .unwrap();
    assert_eq!(only_new, Decimal::new(5000000, 2));
}

#[tokio::test]
async fn find_unique_by_plate_and_order_by_year() {
    let state = state();
    state.vehicle_repo.create(make_vehicle("AAA1A11", 2019)).await.unwrap();
    state.vehicle_repo.create(make_vehicle("BBB2B22", 2022)).await.unwrap();
    state.vehicle_repo.create(make_vehicle("CCC3C33", 2020)).await.unwrap();

    let found = state
        .vehicle_repo
        .find_unique(&Where::new().eq("plate", "BBB2B22"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.year, 2022);

    let newest_first = state
        .vehicle_repo
        .find_many(QueryOptions {
            order_by: Some(OrderBy::desc("year")),
            ..Default::default()
        })
        .await
        .unwrap();
    let years: Vec<i32> = newest_first.iter().map(|v| v.vehicle.year).collect();
    assert_eq!(years, vec![2022, 2020, 2019]);
}
