pub mod query;
pub mod store;

pub mod crm_repo;
pub use crm_repo::ClientRepository;
pub mod inventory_repo;
pub use inventory_repo::VehicleRepository;
pub mod finance_repo;
pub use finance_repo::PaymentRepository;
pub mod user_repo;
pub use user_repo::UserRepository;

pub use store::{MockDb, MockStore};
