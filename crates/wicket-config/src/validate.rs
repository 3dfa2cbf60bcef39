//! Post-deserialization configuration validation.
//!
//! Validates that gateway configuration values are within acceptable
//! ranges and that cross-field invariants hold.

use crate::error::{ConfigError, ConfigResult};
use crate::types::GatewayConfig;

/// Minimum length for the share-link signing secret.
const MIN_SHARE_SECRET_LEN: usize = 16;

/// Upper bound on any clock-skew tolerance (one hour).
const MAX_CLOCK_SKEW_SECS: i64 = 3_600;

/// Validate a deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &GatewayConfig) -> ConfigResult<()> {
    validate_auth(config)?;
    validate_share(config)?;
    validate_throttle(config)?;
    validate_policy(config)?;
    validate_sigv4(config)?;
    Ok(())
}

fn validate_auth(config: &GatewayConfig) -> ConfigResult<()> {
    let a = &config.auth;

    if a.basic_username.is_some() != a.basic_password.is_some() {
        return Err(ConfigError::ValidationError {
            field: "auth.basic_username".to_owned(),
            message: "basic_username and basic_password must be set together".to_owned(),
        });
    }

    if let Some(user) = &a.basic_username
        && user.contains(':')
    {
        return Err(ConfigError::ValidationError {
            field: "auth.basic_username".to_owned(),
            message: "username must not contain ':' (reserved separator in basic credentials)"
                .to_owned(),
        });
    }

    if a.bearer_header.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "auth.bearer_header".to_owned(),
            message: "bearer_header must not be empty".to_owned(),
        });
    }

    if a.external_auth {
        if a.trusted_proxies.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "auth.external_auth".to_owned(),
                message: "external delegation requires at least one trusted proxy".to_owned(),
            });
        }
        if a.identity_header.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "auth.identity_header".to_owned(),
                message: "identity_header must not be empty when external_auth is enabled"
                    .to_owned(),
            });
        }
    }

    if a.realm.contains('"') {
        return Err(ConfigError::ValidationError {
            field: "auth.realm".to_owned(),
            message: "realm must not contain double quotes".to_owned(),
        });
    }

    for path in &a.bypass_paths {
        if !path.starts_with('/') {
            return Err(ConfigError::ValidationError {
                field: "auth.bypass_paths".to_owned(),
                message: format!("bypass path '{path}' must start with '/'"),
            });
        }
    }

    Ok(())
}

fn validate_share(config: &GatewayConfig) -> ConfigResult<()> {
    let s = &config.share;

    if let Some(secret) = &s.secret
        && secret.len() < MIN_SHARE_SECRET_LEN
    {
        return Err(ConfigError::ValidationError {
            field: "share.secret".to_owned(),
            message: format!("secret must be at least {MIN_SHARE_SECRET_LEN} characters"),
        });
    }

    if !(0..=MAX_CLOCK_SKEW_SECS).contains(&s.clock_skew_secs) {
        return Err(ConfigError::ValidationError {
            field: "share.clock_skew_secs".to_owned(),
            message: format!("clock skew must be between 0 and {MAX_CLOCK_SKEW_SECS} seconds"),
        });
    }

    if s.max_sessions == 0 {
        return Err(ConfigError::ValidationError {
            field: "share.max_sessions".to_owned(),
            message: "max_sessions must be at least 1".to_owned(),
        });
    }

    Ok(())
}

fn validate_throttle(config: &GatewayConfig) -> ConfigResult<()> {
    let t = &config.throttle;

    if t.max_failures == 0 {
        return Err(ConfigError::ValidationError {
            field: "throttle.max_failures".to_owned(),
            message: "max_failures must be at least 1".to_owned(),
        });
    }

    if t.window_secs < 1 {
        return Err(ConfigError::ValidationError {
            field: "throttle.window_secs".to_owned(),
            message: "window_secs must be at least 1".to_owned(),
        });
    }

    Ok(())
}

fn validate_policy(config: &GatewayConfig) -> ConfigResult<()> {
    let p = &config.policy;

    if p.root.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "policy.root".to_owned(),
            message: "root must not be empty".to_owned(),
        });
    }

    for pattern in &p.hide_patterns {
        if let Err(e) = globset::Glob::new(pattern) {
            return Err(ConfigError::ValidationError {
                field: "policy.hide_patterns".to_owned(),
                message: format!("invalid glob '{pattern}': {e}"),
            });
        }
    }

    for ext in &p.blocked_extensions {
        if ext.starts_with('.') || ext.contains('/') {
            return Err(ConfigError::ValidationError {
                field: "policy.blocked_extensions".to_owned(),
                message: format!("extension '{ext}' must be bare (no dot, no path separator)"),
            });
        }
    }

    Ok(())
}

fn validate_sigv4(config: &GatewayConfig) -> ConfigResult<()> {
    let s = &config.sigv4;

    if s.enabled {
        let key_ok = s.access_key_id.as_deref().is_some_and(|k| !k.is_empty());
        let secret_ok = s.secret_key.as_deref().is_some_and(|k| !k.is_empty());
        if !key_ok || !secret_ok {
            return Err(ConfigError::ValidationError {
                field: "sigv4.access_key_id".to_owned(),
                message: "enabled signature verification requires access_key_id and secret_key"
                    .to_owned(),
            });
        }
        if s.region.trim().is_empty() || s.service.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "sigv4.region".to_owned(),
                message: "region and service must not be empty".to_owned(),
            });
        }
    }

    if !(0..=MAX_CLOCK_SKEW_SECS).contains(&s.clock_skew_secs) {
        return Err(ConfigError::ValidationError {
            field: "sigv4.clock_skew_secs".to_owned(),
            message: format!("clock skew must be between 0 and {MAX_CLOCK_SKEW_SECS} seconds"),
        });
    }

    Ok(())
}
