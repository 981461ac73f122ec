//! # Signature Recovery
//!
//! Recovers the RSK address that produced an EIP-191 signature over a
//! quote or record hash.

use crate::domain::errors::{DomainError, DomainResult};
use ethers::types::{RecoveryMessage, Signature};
use ethers::utils::hex;

/// Recovers the signer of `signature` over the hex encoded `hash`.
///
/// The hash bytes are signed as an EIP-191 personal message. Both inputs
/// may carry a `0x` prefix.
///
/// # Errors
///
/// Returns [`DomainError::InvalidSignature`] if either input is not hex, the
/// signature is not 65 bytes, or no key can be recovered.
pub fn recover_signer_address(hash: &str, signature: &str) -> DomainResult<String> {
    let hash_bytes = hex::decode(hash.trim_start_matches("0x"))
        .map_err(|e| DomainError::invalid_signature(format!("hash is not hex: {e}")))?;
    let signature_bytes = hex::decode(signature.trim_start_matches("0x"))
        .map_err(|e| DomainError::invalid_signature(format!("signature is not hex: {e}")))?;
    if signature_bytes.len() != 65 {
        return Err(DomainError::invalid_signature(format!(
            "expected 65 bytes, got {}",
            signature_bytes.len()
        )));
    }
    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(DomainError::invalid_signature)?;
    let address = signature
        .recover(RecoveryMessage::Data(hash_bytes))
        .map_err(DomainError::invalid_signature)?;
    Ok(format!("{address:#x}"))
}
