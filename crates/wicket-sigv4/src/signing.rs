//! Signing-key derivation and request signing.
//!
//! The signing side lives next to the verifier for two reasons: machine
//! clients shipping with the browser need it, and every verification test
//! worth having exercises both directions with independent inputs.

use wicket_core::GatewayRequest;
use wicket_crypto::{hmac_sha256, sha256_hex};

use crate::canonical::canonical_request;
use crate::error::{SigV4Error, SigV4Result};

/// Timestamp format of the `x-amz-date` header.
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Algorithm tag embedded in the string-to-sign and authorization header.
pub(crate) const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Terminator of every credential scope.
pub(crate) const SCOPE_TERMINATOR: &str = "aws4_request";

/// An access key pair for the machine-client surface.
#[derive(Clone)]
pub struct Credentials {
    /// Public access key identifier, carried in the authorization header.
    pub access_key_id: String,
    /// Secret key. Never on the wire; only derived HMAC outputs are
    /// compared.
    pub secret_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &"..")
            .finish()
    }
}

/// Derive the signing key for one (date, region, service) scope.
///
/// `key = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service),
/// "aws4_request")` - each step keys the next, so the raw secret never
/// leaves this function.
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> [u8; 32] {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

/// Assemble the string-to-sign from timestamp, scope, and the hash of the
/// canonical request.
#[must_use]
pub fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    )
}

/// Sign a request, returning the full `Authorization` header value.
///
/// The request must already carry its `x-amz-date` header (and content
/// hash header, if the body is signed); signing covers exactly what
/// verification will recompute.
///
/// # Errors
///
/// Returns [`SigV4Error::InvalidTimestamp`] if the request has no
/// `x-amz-date` header.
pub fn sign_request(
    req: &GatewayRequest,
    credentials: &Credentials,
    region: &str,
    service: &str,
) -> SigV4Result<String> {
    let amz_date = req
        .header("x-amz-date")
        .ok_or_else(|| SigV4Error::InvalidTimestamp("x-amz-date header is required".to_string()))?
        .trim()
        .to_string();
    let date = amz_date.get(..8).unwrap_or(&amz_date).to_string();

    let (canonical, signed_headers) = canonical_request(req);
    let scope = format!("{date}/{region}/{service}/{SCOPE_TERMINATOR}");
    let sts = string_to_sign(&amz_date, &scope, &canonical);
    let key = derive_signing_key(&credentials.secret_key, &date, region, service);
    let signature = hex::encode(hmac_sha256(&key, sts.as_bytes()));

    Ok(format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        credentials.access_key_id
    ))
}
