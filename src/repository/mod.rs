pub mod memory;
pub mod mysql;

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::model::employee::{Employee, NewEmployee};

pub use memory::InMemoryRoster;
pub use mysql::MySqlRoster;

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Source of employee records, in roster order.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Employee>>;
    async fn get(&self, id: u64) -> Result<Option<Employee>>;
    /// Assigns the next identifier and stores the record.
    async fn create(&self, employee: NewEmployee) -> Result<Employee>;
    /// Replaces the record with the same id. `NotFound` when absent.
    async fn update(&self, employee: Employee) -> Result<Employee>;
    /// `NotFound` when absent.
    async fn delete(&self, id: u64) -> Result<()>;
}
