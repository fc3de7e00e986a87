//! Ed25519 verification of inbound interaction requests.
//!
//! Discord signs every request with the application's key. The signed
//! message is the `X-Signature-Timestamp` header followed by the raw body.

use ed25519_dalek::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, Signature, Verifier, VerifyingKey};

use crate::error::{DiscordError, DiscordResult, VerifyError};

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
/// Header carrying the timestamp that prefixes the signed message.
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Verifies request signatures against the application public key.
#[derive(Clone)]
pub struct RequestVerifier {
    key: VerifyingKey,
}

impl RequestVerifier {
    /// Build from the hex key shown in the developer portal.
    ///
    /// # Errors
    ///
    /// Returns [`DiscordError::InvalidPublicKey`] if the string is not 32
    /// hex-encoded bytes or not a valid curve point.
    pub fn from_hex(public_key: &str) -> DiscordResult<Self> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| DiscordError::InvalidPublicKey(e.to_string()))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|b: Vec<u8>| {
            DiscordError::InvalidPublicKey(format!(
                "expected {PUBLIC_KEY_LENGTH} bytes, got {}",
                b.len()
            ))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| DiscordError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Check `signature_hex` over `timestamp ‖ body`.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifyError`] describing why the request is rejected.
    pub fn verify(&self, signature_hex: &str, timestamp: &str, body: &[u8]) -> Result<(), VerifyError> {
        let raw = hex::decode(signature_hex).map_err(|_| VerifyError::MalformedSignature)?;
        let raw: [u8; SIGNATURE_LENGTH] = raw
            .try_into()
            .map_err(|_| VerifyError::MalformedSignature)?;
        let signature = Signature::from_bytes(&raw);

        let mut message = Vec::with_capacity(timestamp.len().saturating_add(body.len()));
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| VerifyError::Mismatch)
    }
}

impl std::fmt::Debug for RequestVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RequestVerifier({})", hex::encode(self.key.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};

    use super::*;

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn sign(key: &SigningKey, timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(key.sign(&message).to_bytes())
    }

    fn verifier(key: &SigningKey) -> RequestVerifier {
        RequestVerifier::from_hex(&hex::encode(key.verifying_key().as_bytes())).unwrap()
    }

    #[test]
    fn accepts_valid_signature() {
        let key = signing_key();
        let body = br#"{"type":1}"#;
        let sig = sign(&key, "1700000000", body);
        assert_eq!(verifier(&key).verify(&sig, "1700000000", body), Ok(()));
    }

    #[test]
    fn rejects_tampered_body() {
        let key = signing_key();
        let sig = sign(&key, "1700000000", br#"{"type":1}"#);
        assert_eq!(
            verifier(&key).verify(&sig, "1700000000", br#"{"type":2}"#),
            Err(VerifyError::Mismatch)
        );
    }

    #[test]
    fn rejects_replayed_timestamp() {
        let key = signing_key();
        let body = br#"{"type":1}"#;
        let sig = sign(&key, "1700000000", body);
        assert_eq!(
            verifier(&key).verify(&sig, "1700000001", body),
            Err(VerifyError::Mismatch)
        );
    }

    #[test]
    fn rejects_malformed_signature() {
        let key = signing_key();
        let v = verifier(&key);
        assert_eq!(v.verify("zz", "1", b""), Err(VerifyError::MalformedSignature));
        assert_eq!(v.verify("abcd", "1", b""), Err(VerifyError::MalformedSignature));
    }

    #[test]
    fn public_key_must_be_32_bytes() {
        assert!(matches!(
            RequestVerifier::from_hex("abcd"),
            Err(DiscordError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            RequestVerifier::from_hex("not hex"),
            Err(DiscordError::InvalidPublicKey(_))
        ));
    }
}
