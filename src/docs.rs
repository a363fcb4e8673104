use crate::api::employee::{CreateEmployee, UpdateEmployee};
use crate::api::payroll::PayrollRunResponse;
use crate::model::employee::{Employee, PayItem};
use crate::model::role::Role;
use crate::models::{LoginReqDto, LoginResponse};
use crate::payroll::batch::{BatchReport, EmployeeOutcome, OutcomeStatus, Stage};
use crate::payroll::store::DocumentHandle;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nómina API",
        version = "0.1.0",
        description = r#"
## Payroll service

Employee records plus payslip generation and delivery.

### Key Features
- **Employee Management**
  - Create, update, list, view and delete employee records
- **Payroll**
  - Payslips are rendered, stored and emailed to every employee daily at the payroll time
  - On-demand runs are accepted only during the payroll minute

### Security
Endpoints under `/api` need a **JWT Bearer** token from `/auth/login`.
What a caller may do depends on their role (`empleado`, `gestor_rrhh`, `administrador`).
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::payroll::run_payroll
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            CreateEmployee,
            UpdateEmployee,
            Employee,
            PayItem,
            Role,
            PayrollRunResponse,
            BatchReport,
            EmployeeOutcome,
            OutcomeStatus,
            Stage,
            DocumentHandle
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and logout"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Payroll", description = "Payslip generation and delivery"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
