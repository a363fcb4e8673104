use std::time::{SystemTime, UNIX_EPOCH};

use crate::{model::employee::Employee, models::Claims};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

pub fn generate_access_token(
    employee: &Employee,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: employee.id.to_string(),
        employee_id: employee.id,
        role: employee.role,
        superadmin: employee.superadmin,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::fixtures::employee;
    use crate::model::role::Role;

    #[test]
    fn token_round_trip_keeps_role_and_flag() {
        let mut hr = employee(5, "Ana", "Ruiz");
        hr.role = Role::HrManager;
        hr.superadmin = true;

        let (token, issued) = generate_access_token(&hr, "s3cret", 60).unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();

        assert_eq!(claims.employee_id, 5);
        assert_eq!(claims.role, Role::HrManager);
        assert!(claims.superadmin);
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = generate_access_token(&employee(1, "Ana", "Ruiz"), "a", 60).unwrap();
        assert!(verify_token(&token, "b").is_err());
    }
}
