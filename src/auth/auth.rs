use crate::model::role::{Capability, Role, capabilities_for};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// The authenticated actor, attached to the request by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: u64,
    pub role: Role,
    pub superadmin: bool,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    pub fn can(&self, capability: Capability) -> bool {
        capabilities_for(self.role, self.superadmin).contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> actix_web::Result<()> {
        if self.can(capability) {
            Ok(())
        } else {
            tracing::info!(
                employee_id = self.employee_id,
                role = %self.role,
                ?capability,
                "Permission denied"
            );
            Err(actix_web::error::ErrorForbidden(
                "No tienes permiso para realizar esta acción",
            ))
        }
    }

    /// Own record, or the whole roster.
    pub fn require_view(&self, employee_id: u64) -> actix_web::Result<()> {
        if self.employee_id == employee_id && self.can(Capability::ViewSelf) {
            return Ok(());
        }
        self.require(Capability::ViewRoster)
    }
}
