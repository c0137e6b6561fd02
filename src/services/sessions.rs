//! Admin web sessions stored in Redis

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;
use crate::config::{AdminConfig, RedisConfig};
use crate::utils::errors::Result;
use crate::utils::helpers::generate_random_string;
use crate::utils::logging::log_admin_action;

const TOKEN_LENGTH: usize = 48;

#[derive(Clone)]
pub struct SessionStore {
    conn: ConnectionManager,
    prefix: String,
    ttl_seconds: u64,
    login: String,
    password: String,
}

impl SessionStore {
    pub async fn connect(redis: &RedisConfig, admin: &AdminConfig) -> Result<Self> {
        let client = redis::Client::open(redis.url.as_str())?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            prefix: redis.prefix.clone(),
            ttl_seconds: redis.ttl_seconds,
            login: admin.login.clone(),
            password: admin.password.clone(),
        })
    }

    fn key(&self, token: &str) -> String {
        session_key(&self.prefix, token)
    }

    /// Check credentials and open a session; returns the session token
    pub async fn login(&self, login: &str, password: &str) -> Result<Option<String>> {
        if !credentials_match(&self.login, &self.password, login, password) {
            log_admin_action(login, "login_failed", None);
            return Ok(None);
        }

        let token = generate_random_string(TOKEN_LENGTH);
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(self.key(&token), login, self.ttl_seconds).await?;

        log_admin_action(login, "login", None);
        Ok(Some(token))
    }

    /// Admin login bound to a live session
    pub async fn validate(&self, token: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let admin: Option<String> = conn.get(self.key(token)).await?;
        debug!(valid = admin.is_some(), "Session lookup");
        Ok(admin)
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.key(token)).await?;
        Ok(())
    }
}

pub fn session_key(prefix: &str, token: &str) -> String {
    format!("{}session:{}", prefix, token)
}

/// Compare credentials without short-circuiting on the first differing byte
pub fn credentials_match(expected_login: &str, expected_password: &str, login: &str, password: &str) -> bool {
    if expected_login.is_empty() || expected_password.is_empty() {
        return false;
    }
    let login_ok = constant_time_eq(expected_login.as_bytes(), login.as_bytes());
    let password_ok = constant_time_eq(expected_password.as_bytes(), password.as_bytes());
    login_ok & password_ok
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
