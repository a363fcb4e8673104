use crate::{
    auth::{auth::AuthUser, password::hash_password},
    error::RepositoryError,
    model::{
        employee::{Employee, NewEmployee, PayItem},
        role::{Capability, Role},
    },
    repository::EmployeeRepository,
};
use actix_web::{HttpResponse, Responder, error::ErrorBadRequest, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[serde(rename = "correo")]
    #[schema(example = "ana.ruiz@empresa.co", format = "email", value_type = String)]
    pub email: String,
    #[serde(rename = "nombre")]
    #[schema(example = "Ana")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    #[schema(example = "Ruiz")]
    pub last_name: String,
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(rename = "salario_base")]
    #[schema(example = 2000.0)]
    pub base_salary: f64,
    #[serde(rename = "deducciones")]
    pub deductions: Vec<PayItem>,
    #[serde(rename = "bonificaciones")]
    pub bonuses: Vec<PayItem>,
    #[serde(rename = "contrasena")]
    pub password: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "celular")]
    #[schema(example = "3001234567")]
    pub phone: String,
    pub superadmin: bool,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateEmployee {
    #[serde(rename = "correo")]
    pub email: Option<String>,
    #[serde(rename = "nombre")]
    pub first_name: Option<String>,
    #[serde(rename = "apellido")]
    pub last_name: Option<String>,
    #[serde(rename = "rol")]
    pub role: Option<Role>,
    #[serde(rename = "salario_base")]
    pub base_salary: Option<f64>,
    #[serde(rename = "deducciones")]
    pub deductions: Option<Vec<PayItem>>,
    #[serde(rename = "bonificaciones")]
    pub bonuses: Option<Vec<PayItem>>,
    #[serde(rename = "contrasena")]
    pub password: Option<String>,
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    #[serde(rename = "celular")]
    pub phone: Option<String>,
    pub superadmin: Option<bool>,
}

impl UpdateEmployee {
    fn touches_compensation(&self) -> bool {
        self.role.is_some()
            || self.base_salary.is_some()
            || self.deductions.is_some()
            || self.bonuses.is_some()
            || self.superadmin.is_some()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeQuery {
    /// Only employees with this role.
    pub rol: Option<Role>,
}

fn validate_phone(phone: &str) -> actix_web::Result<()> {
    if phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ErrorBadRequest(json!({
            "error": "El número de celular debe contener solo números y tener una longitud de 10 dígitos"
        })))
    }
}

fn validate_required(fields: &[(&str, &str)]) -> actix_web::Result<()> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(ErrorBadRequest(json!({
            "error": format!("Datos incompletos: `{name}` está vacío")
        }))),
        None => Ok(()),
    }
}

fn hash(password: &str) -> actix_web::Result<String> {
    hash_password(password).map_err(|e| {
        error!(error = %e, "Failed to hash credential");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Datos incompletos"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    roster: web::Data<dyn EmployeeRepository>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ManageEmployees)?;
    if payload.superadmin {
        auth.require(Capability::ManageCompensation)?;
    }

    let payload = payload.into_inner();
    validate_required(&[
        ("correo", payload.email.as_str()),
        ("nombre", payload.first_name.as_str()),
        ("apellido", payload.last_name.as_str()),
        ("contrasena", payload.password.as_str()),
    ])?;
    validate_phone(&payload.phone)?;

    let created = roster
        .create(NewEmployee {
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            role: payload.role,
            base_salary: payload.base_salary,
            deductions: payload.deductions,
            bonuses: payload.bonuses,
            credential: hash(&payload.password)?,
            address: payload.address,
            phone: payload.phone,
            superadmin: payload.superadmin,
        })
        .await?;

    info!(employee_id = created.id, by = auth.employee_id, "Employee created");
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Roster in order", body = [Employee]),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    auth: AuthUser,
    roster: web::Data<dyn EmployeeRepository>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ViewRoster)?;

    let mut employees = roster.list().await?;
    if let Some(role) = query.rol {
        employees.retain(|e| e.role == role);
    }

    Ok(HttpResponse::Ok().json(employees))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    auth: AuthUser,
    roster: web::Data<dyn EmployeeRepository>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_view(employee_id)?;

    let employee = roster
        .get(employee_id)
        .await?
        .ok_or(RepositoryError::NotFound(employee_id))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Object, example = json!({
            "mensaje": "Empleado actualizado correctamente"
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    auth: AuthUser,
    roster: web::Data<dyn EmployeeRepository>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ManageEmployees)?;
    if body.touches_compensation() {
        auth.require(Capability::ManageCompensation)?;
    }

    let employee_id = path.into_inner();
    let mut employee: Employee = roster
        .get(employee_id)
        .await?
        .ok_or(RepositoryError::NotFound(employee_id))?;

    let patch = body.into_inner();
    if let Some(phone) = &patch.phone {
        validate_phone(phone)?;
    }
    if let Some(password) = &patch.password {
        validate_required(&[("contrasena", password.as_str())])?;
        employee.credential = hash(password)?;
    }
    if let Some(email) = patch.email {
        employee.email = email;
    }
    if let Some(first_name) = patch.first_name {
        employee.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        employee.last_name = last_name;
    }
    if let Some(role) = patch.role {
        employee.role = role;
    }
    if let Some(base_salary) = patch.base_salary {
        employee.base_salary = base_salary;
    }
    if let Some(deductions) = patch.deductions {
        employee.deductions = deductions;
    }
    if let Some(bonuses) = patch.bonuses {
        employee.bonuses = bonuses;
    }
    if let Some(address) = patch.address {
        employee.address = address;
    }
    if let Some(phone) = patch.phone {
        employee.phone = phone;
    }
    if let Some(superadmin) = patch.superadmin {
        employee.superadmin = superadmin;
    }

    let updated = roster.update(employee).await?;
    info!(employee_id, by = auth.employee_id, "Employee updated");

    Ok(HttpResponse::Ok().json(json!({
        "mensaje": "Empleado actualizado correctamente",
        "empleado": updated
    })))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "mensaje": "Empleado eliminado"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    auth: AuthUser,
    roster: web::Data<dyn EmployeeRepository>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::ManageEmployees)?;

    let employee_id = path.into_inner();
    roster.delete(employee_id).await?;
    info!(employee_id, by = auth.employee_id, "Employee deleted");

    Ok(HttpResponse::Ok().json(json!({
        "mensaje": "Empleado eliminado"
    })))
}
