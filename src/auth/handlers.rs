use crate::{
    auth::{jwt::generate_access_token, jwt::verify_token, password::verify_password},
    config::Config,
    models::{LoginReqDto, LoginResponse},
    repository::EmployeeRepository,
    utils::token_cache,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Access token issued", body = LoginResponse),
        (status = 401, description = "Empleado no autenticado")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(roster, config, user), fields(employee_id = user.id))]
pub async fn login(
    user: web::Json<LoginReqDto>,
    roster: web::Data<dyn EmployeeRepository>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.password.is_empty() {
        info!("Validation failed: empty credential");
        return HttpResponse::BadRequest().json(json!({
            "error": "No se proporcionaron datos en el cuerpo de la solicitud"
        }));
    }

    let employee = match roster.get(user.id).await {
        Ok(Some(employee)) => employee,
        Ok(None) => {
            info!("Invalid credentials: employee not found");
            return HttpResponse::Unauthorized().json(json!({"error": "Empleado no autenticado"}));
        }
        Err(e) => {
            error!(error = %e, "Roster error while fetching employee");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!("Verifying credential");
    if !verify_password(&user.password, &employee.credential) {
        info!("Invalid credentials: credential mismatch");
        return HttpResponse::Unauthorized().json(json!({"error": "Empleado no autenticado"}));
    }

    let access_token =
        match generate_access_token(&employee, &config.jwt_secret, config.access_token_ttl) {
            Ok((token, _)) => token,
            Err(e) => {
                error!(error = %e, "Failed to sign access token");
                return HttpResponse::InternalServerError().finish();
            }
        };

    info!("Login successful");
    HttpResponse::Ok().json(LoginResponse { access_token })
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Sesión cerrada")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(req: HttpRequest, config: web::Data<Config>) -> impl Responder {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    // Unknown or invalid tokens still get 204.
    if let Some(claims) = token.and_then(|t| verify_token(t, &config.jwt_secret).ok()) {
        token_cache::revoke(&claims.jti, claims.exp).await;
        info!(employee_id = claims.employee_id, "Session closed");
    }

    HttpResponse::NoContent().finish()
}
