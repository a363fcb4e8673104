use std::str::FromStr;

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::types::Json;
use sqlx::{MySqlPool, Row};

use super::{EmployeeRepository, Result};
use crate::error::RepositoryError;
use crate::model::employee::{Employee, NewEmployee, PayItem};
use crate::model::role::Role;

const SELECT_EMPLOYEE: &str = r#"
    SELECT id, correo, nombre, apellido, rol, salario_base,
           deducciones, bonificaciones, contrasena, direccion, celular, superadmin
    FROM employees
"#;

/// Roster backed by the `employees` table (see `sql/employees.sql`).
pub struct MySqlRoster {
    pool: MySqlPool,
}

impl MySqlRoster {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn employee_from_row(row: &MySqlRow) -> Result<Employee> {
    let role: String = row.try_get("rol")?;
    let role = Role::from_str(&role)
        .map_err(|_| RepositoryError::Storage(format!("unknown role `{role}` in employees.rol")))?;
    let Json(deductions): Json<Vec<PayItem>> = row.try_get("deducciones")?;
    let Json(bonuses): Json<Vec<PayItem>> = row.try_get("bonificaciones")?;

    Ok(Employee {
        id: row.try_get("id")?,
        email: row.try_get("correo")?,
        first_name: row.try_get("nombre")?,
        last_name: row.try_get("apellido")?,
        role,
        base_salary: row.try_get("salario_base")?,
        deductions,
        bonuses,
        credential: row.try_get("contrasena")?,
        address: row.try_get("direccion")?,
        phone: row.try_get("celular")?,
        superadmin: row.try_get("superadmin")?,
    })
}

#[async_trait]
impl EmployeeRepository for MySqlRoster {
    async fn list(&self) -> Result<Vec<Employee>> {
        let sql = format!("{SELECT_EMPLOYEE} ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch employees");
            RepositoryError::from(e)
        })?;

        rows.iter().map(employee_from_row).collect()
    }

    async fn get(&self, id: u64) -> Result<Option<Employee>> {
        let sql = format!("{SELECT_EMPLOYEE} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, employee_id = id, "Failed to fetch employee");
                RepositoryError::from(e)
            })?;

        row.as_ref().map(employee_from_row).transpose()
    }

    async fn create(&self, employee: NewEmployee) -> Result<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (correo, nombre, apellido, rol, salario_base, deducciones, bonificaciones,
             contrasena, direccion, celular, superadmin)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.email)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(employee.role.to_string())
        .bind(employee.base_salary)
        .bind(Json(&employee.deductions))
        .bind(Json(&employee.bonuses))
        .bind(&employee.credential)
        .bind(&employee.address)
        .bind(&employee.phone)
        .bind(employee.superadmin)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create employee");
            RepositoryError::from(e)
        })?;

        Ok(employee.with_id(result.last_insert_id()))
    }

    async fn update(&self, employee: Employee) -> Result<Employee> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET correo = ?, nombre = ?, apellido = ?, rol = ?, salario_base = ?,
                deducciones = ?, bonificaciones = ?, contrasena = ?, direccion = ?,
                celular = ?, superadmin = ?
            WHERE id = ?
            "#,
        )
        .bind(&employee.email)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(employee.role.to_string())
        .bind(employee.base_salary)
        .bind(Json(&employee.deductions))
        .bind(Json(&employee.bonuses))
        .bind(&employee.credential)
        .bind(&employee.address)
        .bind(&employee.phone)
        .bind(employee.superadmin)
        .bind(employee.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = employee.id, "Failed to update employee");
            RepositoryError::from(e)
        })?;

        // MySQL reports zero affected rows for a no-op update, so confirm existence.
        if result.rows_affected() == 0 && self.get(employee.id).await?.is_none() {
            return Err(RepositoryError::NotFound(employee.id));
        }

        Ok(employee)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, employee_id = id, "Failed to delete employee");
                RepositoryError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}
