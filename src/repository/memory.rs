use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EmployeeRepository, Result};
use crate::auth::password::{hash_password, is_password_hash};
use crate::error::RepositoryError;
use crate::model::employee::{Employee, NewEmployee};

struct Roster {
    employees: Vec<Employee>,
    /// Highest identifier ever handed out. Never goes down.
    last_id: u64,
}

/// Roster held in process memory, in insertion order.
pub struct InMemoryRoster {
    inner: RwLock<Roster>,
}

impl Default for InMemoryRoster {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl InMemoryRoster {
    pub fn new(employees: Vec<Employee>) -> Self {
        let last_id = employees.iter().map(|e| e.id).max().unwrap_or(0);
        Self {
            inner: RwLock::new(Roster { employees, last_id }),
        }
    }

    /// Load a JSON array of employee records. Plain-text seed credentials are hashed.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading roster file {}", path.display()))?;
        let mut employees: Vec<Employee> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing roster file {}", path.display()))?;

        for employee in &mut employees {
            if !employee.credential.is_empty() && !is_password_hash(&employee.credential) {
                employee.credential = hash_password(&employee.credential)?;
            }
        }

        tracing::info!(count = employees.len(), file = %path.display(), "Roster loaded");
        Ok(Self::new(employees))
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryRoster {
    async fn list(&self) -> Result<Vec<Employee>> {
        Ok(self.inner.read().await.employees.clone())
    }

    async fn get(&self, id: u64) -> Result<Option<Employee>> {
        let roster = self.inner.read().await;
        Ok(roster.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn create(&self, employee: NewEmployee) -> Result<Employee> {
        let mut roster = self.inner.write().await;
        roster.last_id += 1;
        let created = employee.with_id(roster.last_id);
        roster.employees.push(created.clone());
        Ok(created)
    }

    async fn update(&self, employee: Employee) -> Result<Employee> {
        let mut roster = self.inner.write().await;
        let slot = roster
            .employees
            .iter_mut()
            .find(|e| e.id == employee.id)
            .ok_or(RepositoryError::NotFound(employee.id))?;
        *slot = employee.clone();
        Ok(employee)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let mut roster = self.inner.write().await;
        let before = roster.employees.len();
        roster.employees.retain(|e| e.id != id);
        if roster.employees.len() == before {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}
