use moka::Expiry;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Keeps each revoked jti until the token's own `exp`.
struct UntilTokenExpires;

impl Expiry<String, usize> for UntilTokenExpires {
    fn expire_after_create(
        &self,
        _jti: &String,
        exp: &usize,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(revocation_ttl(*exp, now_secs()))
    }
}

/// jti of access tokens revoked by logout, mapped to the token's `exp`.
pub static REVOKED_TOKENS: Lazy<Cache<String, usize>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .expire_after(UntilTokenExpires)
        .build()
});

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// How long a revocation must be remembered. Zero once the token has expired.
pub fn revocation_ttl(exp: usize, now: u64) -> Duration {
    Duration::from_secs((exp as u64).saturating_sub(now))
}

pub async fn revoke(jti: &str, exp: usize) {
    REVOKED_TOKENS.insert(jti.to_string(), exp).await;
}

pub async fn is_revoked(jti: &str) -> bool {
    REVOKED_TOKENS.contains_key(jti)
}
