//! The ordered credential state machine.

use std::sync::Arc;
use tracing::{debug, warn};
use wicket_config::AuthSection;
use wicket_core::{ClientId, DenialClass, GatewayRequest, SessionId, Timestamp, resolve_client_ip};
use wicket_crypto::constant_time_eq_str;
use wicket_share::{RedemptionStore, ShareAccessContext, ShareTokenService, ValidationOutcome};

use crate::credentials::{CredentialParseError, extract_bearer, parse_basic_authorization};
use crate::throttle::{FailureThrottle, ThrottleDecision};

/// Query parameter carrying a share token.
pub const TOKEN_PARAM: &str = "token";

/// Query parameter carrying a redeemed one-time session.
pub const SESSION_PARAM: &str = "session";

/// Per-request authentication verdict.
#[derive(Debug, Clone)]
pub enum AuthDecision {
    /// Request may proceed.
    Allow {
        /// Share context when access came through a token or session.
        share: Option<ShareAccessContext>,
        /// Session minted (or presented) for a one-time flow.
        session: Option<SessionId>,
    },
    /// Denied with `401`.
    Unauthorized {
        /// `WWW-Authenticate` value, present only when basic credentials
        /// are configured.
        challenge: Option<String>,
        /// Failure class for logs and the response body.
        class: DenialClass,
    },
    /// Denied with `429`; the client is failure-throttled.
    Throttled {
        /// Seconds until the window resets (`Retry-After`).
        retry_after_secs: u64,
    },
}

impl AuthDecision {
    /// Whether the request was allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

/// What the share-token step concluded when it did not allow outright.
#[derive(Clone, Copy, PartialEq, Eq)]
enum TokenFailure {
    None,
    Invalid,
    Expired,
}

/// Runs the ordered authentication state machine over one request.
pub struct Authenticator {
    auth: AuthSection,
    share: Option<Arc<ShareTokenService>>,
    store: Arc<RedemptionStore>,
    throttle: Arc<FailureThrottle>,
}

impl Authenticator {
    /// Assemble an authenticator from its collaborators.
    #[must_use]
    pub fn new(
        auth: AuthSection,
        share: Option<Arc<ShareTokenService>>,
        store: Arc<RedemptionStore>,
        throttle: Arc<FailureThrottle>,
    ) -> Self {
        Self {
            auth,
            share,
            store,
            throttle,
        }
    }

    /// The throttle this authenticator feeds.
    #[must_use]
    pub fn throttle(&self) -> &Arc<FailureThrottle> {
        &self.throttle
    }

    /// The one-time redemption store.
    #[must_use]
    pub fn store(&self) -> &Arc<RedemptionStore> {
        &self.store
    }

    /// Judge one request.
    ///
    /// The step order is load-bearing: bypass, then share token, then
    /// throttle, then bearer, then external delegation, then basic. A
    /// present-but-invalid token falls through to credential checks; if
    /// those also fail, the token attempt is what gets recorded against
    /// the client so the token path cannot dodge throttling.
    #[must_use]
    pub fn authenticate(&self, req: &GatewayRequest, now: Timestamp) -> AuthDecision {
        let client = ClientId(resolve_client_ip(
            req.peer_addr(),
            req.header("X-Forwarded-For"),
            &self.auth.trusted_proxies,
        ));

        // 1. operational bypass
        if self.auth.bypass_paths.iter().any(|p| p == req.path()) {
            return AuthDecision::Allow {
                share: None,
                session: None,
            };
        }

        // 2. share token / one-time session
        let token_failure = match self.try_share_access(req, now) {
            Ok(decision) => return decision,
            Err(failure) => failure,
        };

        // 3. throttle gate, before any local secret comparison
        if let ThrottleDecision::Limited { retry_after_secs } = self.throttle.check(client, now) {
            warn!(client = %client, retry_after_secs, "request throttled");
            return AuthDecision::Throttled { retry_after_secs };
        }

        // 4. bearer token
        if let Some(expected) = &self.auth.bearer_token
            && let Some(value) = req.header(&self.auth.bearer_header)
            && !is_basic_scheme(value)
        {
            if constant_time_eq_str(extract_bearer(value), expected) {
                return AuthDecision::Allow {
                    share: None,
                    session: None,
                };
            }
            // mismatch: record, deny with no challenge so the scheme is
            // not hinted at
            self.throttle.record_failure(client, now);
            warn!(client = %client, class = %DenialClass::CredentialMismatch, "bearer token rejected");
            return AuthDecision::Unauthorized {
                challenge: None,
                class: DenialClass::CredentialMismatch,
            };
        }

        // 5. external delegation: local checks are skipped entirely, and
        // the identity header is only believed from a trusted peer
        if self.auth.external_auth {
            if self.auth.trusted_proxies.contains(&req.peer_addr())
                && let Some(identity) = req.header(&self.auth.identity_header)
                && !identity.trim().is_empty()
            {
                debug!(identity = %identity.trim(), "external identity accepted");
                return AuthDecision::Allow {
                    share: None,
                    session: None,
                };
            }
            warn!(client = %client, peer = %req.peer_addr(), "external delegation rejected");
            return AuthDecision::Unauthorized {
                challenge: None,
                class: DenialClass::CredentialMismatch,
            };
        }

        // 6. basic credentials
        if let (Some(user), Some(pass)) = (&self.auth.basic_username, &self.auth.basic_password) {
            return match parse_basic_authorization(req) {
                Ok((candidate_user, candidate_pass)) => {
                    // both comparisons always run; & instead of && keeps
                    // the second from being skipped
                    let user_ok = constant_time_eq_str(&candidate_user, user);
                    let pass_ok = constant_time_eq_str(&candidate_pass, pass);
                    if user_ok & pass_ok {
                        AuthDecision::Allow {
                            share: None,
                            session: None,
                        }
                    } else {
                        self.throttle.record_failure(client, now);
                        warn!(client = %client, class = %DenialClass::CredentialMismatch, "basic credentials rejected");
                        AuthDecision::Unauthorized {
                            challenge: self.basic_challenge(),
                            class: DenialClass::CredentialMismatch,
                        }
                    }
                }
                Err(CredentialParseError::Missing) => {
                    // no attempt was made; challenge without counting
                    self.deny_unattempted(client, now, token_failure)
                }
                Err(parse_err) => {
                    self.throttle.record_failure(client, now);
                    warn!(client = %client, error = %parse_err, class = %DenialClass::MalformedInput, "malformed basic credentials");
                    AuthDecision::Unauthorized {
                        challenge: self.basic_challenge(),
                        class: DenialClass::MalformedInput,
                    }
                }
            };
        }

        // 7. nothing configured locally: an open listing is open; a
        // configured one denies
        if self.auth.bearer_token.is_none() && self.share.is_none() {
            return AuthDecision::Allow {
                share: None,
                session: None,
            };
        }
        self.deny_unattempted(client, now, token_failure)
    }

    /// Step 2: session lookup, then token validation and (for one-time
    /// tokens) atomic nonce consumption.
    ///
    /// `Ok` carries an outright allow; `Err` carries what to remember for
    /// the fall-through.
    fn try_share_access(
        &self,
        req: &GatewayRequest,
        now: Timestamp,
    ) -> Result<AuthDecision, TokenFailure> {
        let Some(service) = &self.share else {
            return Err(TokenFailure::None);
        };

        let mut failure = TokenFailure::None;

        if let Some(raw_session) = req.query_param(SESSION_PARAM) {
            if let Some(session_id) = SessionId::parse(&raw_session) {
                if let Some(context) = self.store.session_context(&session_id, now) {
                    return Ok(AuthDecision::Allow {
                        share: Some(context),
                        session: Some(session_id),
                    });
                }
                debug!("one-time session unknown or expired");
                failure = TokenFailure::Expired;
            } else {
                failure = TokenFailure::Invalid;
            }
        }

        if let Some(raw_token) = req.query_param(TOKEN_PARAM) {
            match service.validate(&raw_token, now) {
                ValidationOutcome::Valid(context) => {
                    if !context.one_time {
                        return Ok(AuthDecision::Allow {
                            share: Some(context),
                            session: None,
                        });
                    }
                    match &context.nonce {
                        Some(nonce)
                            if self.store.try_consume_nonce(nonce, context.expires_at, now) =>
                        {
                            let session = self.store.create_session(context.clone(), now);
                            return Ok(AuthDecision::Allow {
                                share: Some(context),
                                session: Some(session),
                            });
                        }
                        _ => {
                            // replay: the signature held but the nonce is
                            // already burned
                            debug!(class = %DenialClass::MalformedInput, "one-time token replayed");
                            failure = TokenFailure::Invalid;
                        }
                    }
                }
                ValidationOutcome::Expired => {
                    debug!(class = %DenialClass::Expired, "share token expired");
                    failure = TokenFailure::Expired;
                }
                ValidationOutcome::Invalid => {
                    debug!(class = %DenialClass::MalformedInput, "share token invalid; falling through to credentials");
                    failure = TokenFailure::Invalid;
                }
            }
        }

        Err(failure)
    }

    /// Deny a request that never presented verifiable credentials.
    ///
    /// A failed token attempt still counts against the client here; a
    /// bare unauthenticated page load does not.
    fn deny_unattempted(
        &self,
        client: ClientId,
        now: Timestamp,
        token_failure: TokenFailure,
    ) -> AuthDecision {
        let class = match token_failure {
            TokenFailure::Expired => DenialClass::Expired,
            TokenFailure::Invalid => DenialClass::MalformedInput,
            TokenFailure::None => DenialClass::CredentialMismatch,
        };
        if token_failure != TokenFailure::None {
            self.throttle.record_failure(client, now);
            warn!(client = %client, class = %class, "share token rejected");
        }
        AuthDecision::Unauthorized {
            challenge: self.basic_challenge(),
            class,
        }
    }

    fn basic_challenge(&self) -> Option<String> {
        self.auth
            .basic_username
            .as_ref()
            .map(|_| format!("Basic realm=\"{}\"", self.auth.realm))
    }
}

/// Whether a header value carries the `Basic` scheme (and therefore
/// belongs to the basic flow even when bearer shares the header name).
fn is_basic_scheme(value: &str) -> bool {
    value
        .split_once(' ')
        .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case("Basic"))
}
