//! Token tooling: `--generate-token` and `--token-info`

use anyhow::{bail, Context, Result};
use pushover_core::AuthConfig;
use pushover_gateway::{issue_token, verify_token, Claims};

/// Signing secret from the environment; token tooling needs nothing else
fn secret_from_env() -> Result<String> {
    let config = AuthConfig::from_env(true);
    if config.secret_key.is_empty() {
        bail!("PUSHOVER_AUTH_SECRET_KEY environment variable is required for token generation");
    }
    Ok(config.secret_key)
}

pub fn generate(user_id: &str, username: &str, role: &str, expiration_hours: i64) -> Result<()> {
    let secret = secret_from_env()?;
    let token = issue_token(secret.as_bytes(), user_id, username, role, expiration_hours)
        .context("failed to generate token")?;

    println!("Generated token:\n{}", token);
    println!("\nTo use this token, include it in the Authorization header:");
    println!("Authorization: Bearer {}", token);
    println!("\nToken details:");
    println!("User ID: {}", user_id);
    println!("Username: {}", username);
    println!("Role: {}", role);
    println!("Expires in: {} hours", expiration_hours);
    Ok(())
}

pub fn info(token: &str) -> Result<()> {
    let secret = secret_from_env()?;
    let claims = verify_token(secret.as_bytes(), token).context("invalid token")?;
    print!("{}", render_info(&claims, chrono::Utc::now().timestamp()));
    Ok(())
}

fn render_info(claims: &Claims, now: i64) -> String {
    let rfc3339 = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            .unwrap_or_else(|| "-".to_string())
    };

    let mut out = String::from("Token Information:\n");
    out.push_str(&format!("User ID: {}\n", claims.subject_id));
    out.push_str(&format!("Username: {}\n", claims.display_name));
    out.push_str(&format!("Role: {}\n", claims.role));
    out.push_str(&format!("Issued At: {}\n", rfc3339(claims.issued_at_utc())));
    out.push_str(&format!("Expires At: {}\n", rfc3339(claims.expires_at_utc())));

    if claims.is_expired_at(now) {
        out.push_str("Status: EXPIRED\n");
    } else {
        out.push_str("Status: VALID\n");
        out.push_str(&format!(
            "Time Remaining: {}\n",
            format_remaining(claims.expires_at - now)
        ));
    }
    out
}

/// `1h2m3s` style
fn format_remaining(secs: i64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (h, m) {
        (0, 0) => format!("{}s", s),
        (0, _) => format!("{}m{}s", m, s),
        _ => format!("{}h{}m{}s", h, m, s),
    }
}
