//! The gateway facade.
//!
//! Wires the authenticator, throttle, share service, redemption store,
//! and path resolver into one decision surface. Collaborators (listing,
//! preview, download handlers) call [`Gateway::handle`] and receive a
//! single verdict: an authenticated flag, an optional share context, and
//! a resolved filesystem scope - or the denial response to send.

use std::sync::Arc;
use tracing::warn;
use wicket_config::GatewayConfig;
use wicket_core::{DenialClass, GatewayRequest, SessionId, Timestamp};
use wicket_crypto::MacSecret;
use wicket_share::{RedemptionStore, ShareAccessContext, ShareTokenService};
use wicket_sigv4::{Credentials, SigV4Error, SigV4Result, SigV4Verifier, VerifiedRequest};
use wicket_vfs::{PolicyMatcher, Resolver, ScopeDecision};

use crate::error::AuthResult;
use crate::throttle::FailureThrottle;
use crate::verifier::{AuthDecision, Authenticator};

/// The response a denied request must receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenialResponse {
    /// HTTP status code (`401`, `403`, or `429`).
    pub status: u16,
    /// Headers to attach (`WWW-Authenticate`, `Retry-After`).
    pub headers: Vec<(String, String)>,
    /// Failure class for logs and error bodies.
    pub class: DenialClass,
}

impl DenialResponse {
    fn unauthorized(challenge: Option<String>, class: DenialClass) -> Self {
        let headers = challenge
            .into_iter()
            .map(|value| ("WWW-Authenticate".to_string(), value))
            .collect();
        Self {
            status: 401,
            headers,
            class,
        }
    }

    fn forbidden(class: DenialClass) -> Self {
        Self {
            status: 403,
            headers: Vec::new(),
            class,
        }
    }

    fn throttled(retry_after_secs: u64) -> Self {
        Self {
            status: 429,
            headers: vec![("Retry-After".to_string(), retry_after_secs.to_string())],
            class: DenialClass::Throttled,
        }
    }
}

/// The gateway's verdict on one request.
#[derive(Debug, Clone)]
pub struct GatewayVerdict {
    /// Whether any trust mechanism accepted the request.
    pub authenticated: bool,
    /// Share context, when access came through a token or session.
    pub share: Option<ShareAccessContext>,
    /// Session minted or presented for a one-time flow.
    pub session: Option<SessionId>,
    /// Resolved filesystem scope, when the request may proceed.
    pub scope: Option<ScopeDecision>,
    /// Denial to send instead, when it may not.
    pub denial: Option<DenialResponse>,
}

impl GatewayVerdict {
    fn denied(denial: DenialResponse) -> Self {
        Self {
            authenticated: false,
            share: None,
            session: None,
            scope: None,
            denial: Some(denial),
        }
    }
}

/// The request-authorization gateway.
pub struct Gateway {
    authenticator: Authenticator,
    resolver: Resolver,
    policy: PolicyMatcher,
    api: Option<(SigV4Verifier, Credentials)>,
}

impl Gateway {
    /// Assemble the gateway from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`](crate::AuthError) when the root directory,
    /// hide patterns, or share secret are unusable.
    pub fn from_config(config: &GatewayConfig) -> AuthResult<Self> {
        let resolver = Resolver::new(&config.policy.root)?;
        let policy = PolicyMatcher::new(
            &config.policy.hide_patterns,
            config.policy.hide_dotfiles,
            config.policy.case_insensitive_globs,
            &config.policy.blocked_extensions,
        )?;

        let share = config
            .share
            .secret
            .as_ref()
            .map(|secret| {
                MacSecret::new(secret.as_bytes().to_vec()).map(|mac| {
                    Arc::new(
                        ShareTokenService::new(mac)
                            .with_clock_skew(config.share.clock_skew_secs),
                    )
                })
            })
            .transpose()?;
        let store = Arc::new(RedemptionStore::with_limits(
            config.share.clock_skew_secs,
            config.share.max_sessions,
        ));
        let throttle = Arc::new(FailureThrottle::new(
            config.throttle.max_failures,
            config.throttle.window_secs,
        ));
        let authenticator = Authenticator::new(config.auth.clone(), share, store, throttle);

        let api = match (
            config.sigv4.enabled,
            &config.sigv4.access_key_id,
            &config.sigv4.secret_key,
        ) {
            (true, Some(access_key_id), Some(secret_key)) => Some((
                SigV4Verifier::new(&config.sigv4.region, &config.sigv4.service)
                    .with_clock_skew(config.sigv4.clock_skew_secs),
                Credentials {
                    access_key_id: access_key_id.clone(),
                    secret_key: secret_key.clone(),
                },
            )),
            _ => None,
        };

        Ok(Self {
            authenticator,
            resolver,
            policy,
            api,
        })
    }

    /// The underlying authenticator (test and composition hook).
    #[must_use]
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// The path resolver.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Judge one browser-surface request end to end.
    ///
    /// Order: authenticate, enforce share scope, resolve the path. A
    /// crash anywhere in that sequence leaves no token re-usable, because
    /// nonce consumption happened inside authentication - the gateway
    /// favors false rejection over false admission.
    #[must_use]
    pub fn handle(&self, req: &GatewayRequest, now: Timestamp) -> GatewayVerdict {
        match self.authenticator.authenticate(req, now) {
            AuthDecision::Throttled { retry_after_secs } => {
                GatewayVerdict::denied(DenialResponse::throttled(retry_after_secs))
            }
            AuthDecision::Unauthorized { challenge, class } => {
                GatewayVerdict::denied(DenialResponse::unauthorized(challenge, class))
            }
            AuthDecision::Allow { share, session } => {
                if let Some(context) = &share
                    && !context.allows(req.path())
                {
                    warn!(
                        path = %req.path(),
                        scope = %context.scope_path,
                        class = %DenialClass::ScopeViolation,
                        "share token presented outside its scope"
                    );
                    return GatewayVerdict::denied(DenialResponse::forbidden(
                        DenialClass::ScopeViolation,
                    ));
                }

                let scope = self.resolver.resolve_scope(req.path(), &self.policy);
                if scope.physical_path.is_none() {
                    return GatewayVerdict::denied(DenialResponse::forbidden(
                        DenialClass::ScopeViolation,
                    ));
                }

                GatewayVerdict {
                    authenticated: true,
                    share,
                    session,
                    scope: Some(scope),
                    denial: None,
                }
            }
        }
    }

    /// Verify a machine-client API request signature.
    ///
    /// # Errors
    ///
    /// Returns [`SigV4Error::VerifierDisabled`] when the deployment has
    /// no signing credentials configured, otherwise whatever the
    /// verifier concluded.
    pub fn verify_signed_request(
        &self,
        req: &GatewayRequest,
        now: Timestamp,
    ) -> SigV4Result<VerifiedRequest> {
        let Some((verifier, credentials)) = &self.api else {
            return Err(SigV4Error::VerifierDisabled);
        };
        verifier.verify(req, credentials, now)
    }
}
