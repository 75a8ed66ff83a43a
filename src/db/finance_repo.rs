// src/db/finance_repo.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::query::{self, QueryOptions, Where},
    db::store::{MockDb, MockStore},
    models::finance::{
        CreatePaymentPayload, Payment, PaymentInclude, PaymentStatus, PaymentWithRelations,
        UpdatePaymentPayload,
    },
};

#[derive(Clone)]
pub struct PaymentRepository {
    db: MockDb,
}

impl PaymentRepository {
    pub fn new(db: MockDb) -> Self {
        Self { db }
    }

    // ---
    // Funções de "Leitura"
    // ---

    pub async fn find_many(
        &self,
        options: QueryOptions<PaymentInclude>,
    ) -> Result<Vec<PaymentWithRelations>, AppError> {
        let store = self.db.store().await;
        let mut rows = query::filter(&store.payments, &options.filter);
        if let Some(order) = &options.order_by {
            query::sort(&mut rows, order);
        }
        Ok(rows
            .into_iter()
            .map(|payment| attach_relations(&store, payment, &options.include))
            .collect())
    }

    pub async fn find_unique(&self, criteria: &Where) -> Result<Option<Payment>, AppError> {
        let store = self.db.store().await;
        Ok(query::find_unique(&store.payments, criteria))
    }

    pub async fn find_first(&self, criteria: &Where) -> Result<Option<Payment>, AppError> {
        let store = self.db.store().await;
        Ok(query::find_first(&store.payments, criteria))
    }

    pub async fn count(&self, criteria: &Where) -> Result<i64, AppError> {
        let store = self.db.store().await;
        Ok(query::count(&store.payments, criteria))
    }

    // ---
    // Agregações (relatórios)
    // ---

    /// Soma dos valores das parcelas que casam com o filtro.
    pub async fn sum_amount(&self, criteria: &Where) -> Result<Decimal, AppError> {
        let store = self.db.store().await;
        Ok(query::sum(&store.payments, "amount", criteria))
    }

    /// Total por status armazenado, ex.: quanto já foi quitado.
    pub async fn sum_by_status(&self, status: PaymentStatus) -> Result<Decimal, AppError> {
        self.sum_amount(&Where::new().eq("status", status)).await
    }

    /// Parcelas vencidas na data de referência, classificadas em tempo de
    /// leitura: nada é alterado no armazém.
    pub async fn find_overdue(&self, today: NaiveDate) -> Result<Vec<Payment>, AppError> {
        let store = self.db.store().await;
        Ok(store
            .payments
            .iter()
            .filter(|p| p.display_status(today) == PaymentStatus::Overdue)
            .cloned()
            .collect())
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create(&self, payload: CreatePaymentPayload) -> Result<Payment, AppError> {
        payload.validate()?;

        let mut store = self.db.store().await;
        if !store.clients.iter().any(|c| c.id == payload.client_id) {
            return Err(AppError::ClientNotFound);
        }
        if !store.vehicles.iter().any(|v| v.id == payload.vehicle_id) {
            return Err(AppError::VehicleNotFound);
        }
        // Número da parcela é único dentro do financiamento do veículo.
        if store.payments.iter().any(|p| {
            p.vehicle_id == payload.vehicle_id
                && p.installment_number == payload.installment_number
        }) {
            return Err(AppError::InstallmentAlreadyExists(payload.installment_number));
        }

        let status = payload.status.unwrap_or(if payload.paid_date.is_some() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        });
        check_status(status, payload.paid_date)?;

        let now = Utc::now();
        let payment = Payment {
            id: store.next_payment_id(),
            client_id: payload.client_id,
            vehicle_id: payload.vehicle_id,
            installment_number: payload.installment_number,
            amount: payload.amount,
            due_date: payload.due_date,
            paid_date: payload.paid_date,
            status,
            created_at: now,
            updated_at: now,
        };
        store.payments.push(payment.clone());
        tracing::debug!(
            "Parcela {} do veículo {} criada (id {})",
            payment.installment_number,
            payment.vehicle_id,
            payment.id
        );
        Ok(payment)
    }

    pub async fn update(&self, id: i64, payload: UpdatePaymentPayload) -> Result<Payment, AppError> {
        let mut store = self.db.store().await;

        let current = store
            .payments
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(AppError::PaymentNotFound)?;

        let new_paid_date = match payload.paid_date {
            Some(paid_date) => paid_date,
            None => current.paid_date,
        };
        // Sem status explícito, a data de pagamento dita o status.
        let new_status = match payload.status {
            Some(status) => status,
            None if payload.paid_date.is_some() => {
                if new_paid_date.is_some() {
                    PaymentStatus::Paid
                } else {
                    PaymentStatus::Pending
                }
            }
            None => current.status,
        };
        check_status(new_status, new_paid_date)?;

        let payment = store
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::PaymentNotFound)?;

        if let Some(amount) = payload.amount {
            payment.amount = amount;
        }
        if let Some(due_date) = payload.due_date {
            payment.due_date = due_date;
        }
        payment.paid_date = new_paid_date;
        payment.status = new_status;
        payment.updated_at = Utc::now();

        Ok(payment.clone())
    }

    /// Baixa da parcela: grava a data de pagamento e o status QUITADA.
    pub async fn mark_paid(&self, id: i64, paid_date: NaiveDate) -> Result<Payment, AppError> {
        self.update(
            id,
            UpdatePaymentPayload {
                paid_date: Some(Some(paid_date)),
                status: Some(PaymentStatus::Paid),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<Payment, AppError> {
        let mut store = self.db.store().await;
        let position = store
            .payments
            .iter()
            .position(|p| p.id == id)
            .ok_or(AppError::PaymentNotFound)?;
        Ok(store.payments.remove(position))
    }
}

// Invariante: PAID se e somente se houver data de pagamento; OVERDUE nunca
// convive com data de pagamento.
fn check_status(status: PaymentStatus, paid_date: Option<NaiveDate>) -> Result<(), AppError> {
    let consistent = match status {
        PaymentStatus::Paid => paid_date.is_some(),
        PaymentStatus::Pending | PaymentStatus::Overdue => paid_date.is_none(),
    };
    if consistent {
        Ok(())
    } else {
        Err(AppError::PaymentStatusConflict)
    }
}

fn attach_relations(
    store: &MockStore,
    payment: Payment,
    include: &PaymentInclude,
) -> PaymentWithRelations {
    let client = include
        .client
        .then(|| store.clients.iter().find(|c| c.id == payment.client_id).cloned())
        .flatten();

    let vehicle = include
        .vehicle
        .then(|| store.vehicles.iter().find(|v| v.id == payment.vehicle_id).cloned())
        .flatten();

    PaymentWithRelations {
        payment,
        client,
        vehicle,
    }
}
