use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::BatchRejection;
use crate::model::employee::Employee;
use crate::model::role::Capability;
use crate::payroll::{BatchReport, PayrollBatch};

#[derive(Serialize, ToSchema)]
pub struct PayrollRunResponse {
    #[schema(example = "Pago de nóminas realizado")]
    pub mensaje: String,
    pub resultado: BatchReport,
}

/// Run payroll now for the employees in the body.
///
/// Only accepted during the payroll minute (18:00 by default).
#[utoipa::path(
    post,
    path = "/api/payroll/run",
    request_body = [Employee],
    responses(
        (status = 200, description = "Batch processed; see per-employee outcomes", body = PayrollRunResponse),
        (status = 400, description = "Missing/empty employee list, or outside the payroll minute", body = Object, example = json!({
            "error": "No se proporcionaron empleados para procesar"
        })),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn run_payroll(
    auth: AuthUser,
    batch: web::Data<PayrollBatch>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    auth.require(Capability::RunPayroll)?;

    let payload = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            BatchRejection::Validation(format!("Datos incompletos en la solicitud: {e}"))
        })?
    };

    tracing::info!(by = auth.employee_id, "On-demand payroll requested");
    let report = batch.run_on_demand_batch(payload).await?;

    Ok(HttpResponse::Ok().json(PayrollRunResponse {
        mensaje: "Pago de nóminas realizado".to_string(),
        resultado: report,
    }))
}
