use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Checks a lowercase (or uppercase) hex HMAC-SHA256 signature against the message it
/// supposedly signs. The comparison is constant time.
pub fn ensure_signature_is_valid(
    secret: &str,
    message: &str,
    signature_to_check: &str,
) -> Result<(), SignatureError> {
    let signature_to_check_as_bytes =
        hex::decode(signature_to_check.as_bytes()).map_err(|_| SignatureError::BadSignature)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::CouldNotUseKey)?;

    mac.update(message.as_bytes());

    mac.verify_slice(&signature_to_check_as_bytes)
        .map_err(|_| SignatureError::BadSignature)
}

pub fn make_hex_hmac_sha256(secret: &str, message: &str) -> Result<String, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::CouldNotUseKey)?;

    mac.update(message.as_bytes());

    let result = mac.finalize();
    let result_bytes = result.into_bytes();

    Ok(hex::encode(result_bytes))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Bad signature received; it did not pass the check.")]
    BadSignature,
    #[error("The secret key could not be used.")]
    CouldNotUseKey,
}
