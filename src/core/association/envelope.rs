//! Signed association file envelopes.
//!
//! Legacy association files are served as CMS (PKCS#7) `SignedData` with the
//! JSON document as enclosed content. Every signer's signature and message
//! digest must verify before the payload is trusted. Certificate chains are
//! not evaluated against a trust store.

use cryptographic_message_syntax::SignedData;
use tracing::{debug, warn};

/// Opens a signed envelope and returns the enclosed payload.
pub trait EnvelopeVerifier {
    /// Verify `envelope` and return its content.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the envelope cannot be parsed or
    /// any signature fails to verify.
    fn open(&self, envelope: &[u8], peer_certificate: Option<&[u8]>) -> Result<Vec<u8>, String>;
}

impl<V: EnvelopeVerifier + ?Sized> EnvelopeVerifier for &V {
    fn open(&self, envelope: &[u8], peer_certificate: Option<&[u8]>) -> Result<Vec<u8>, String> {
        (**self).open(envelope, peer_certificate)
    }
}

/// CMS `SignedData` verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmsVerifier;

impl EnvelopeVerifier for CmsVerifier {
    fn open(&self, envelope: &[u8], peer_certificate: Option<&[u8]>) -> Result<Vec<u8>, String> {
        let signed =
            SignedData::parse_ber(envelope).map_err(|e| format!("invalid signed data: {e}"))?;

        let mut verified = 0usize;
        for signer in signed.signers() {
            signer
                .verify_signature_with_signed_data(&signed)
                .map_err(|e| format!("signature verification failed: {e}"))?;
            signer
                .verify_message_digest_with_signed_data(&signed)
                .map_err(|e| format!("content digest mismatch: {e}"))?;
            verified += 1;
        }
        if verified == 0 {
            return Err("signed data has no signers".to_string());
        }

        let content = signed
            .signed_content()
            .ok_or_else(|| "signed data has no enclosed content".to_string())?;

        match peer_certificate {
            Some(peer) if !signed.certificates().any(|cert| cert.constructed_data() == peer) => {
                warn!(
                    signers = verified,
                    "peer certificate does not match any certificate in the signed envelope"
                );
            }
            Some(_) => debug!(
                signers = verified,
                peer_certificate_in_envelope = true,
                "signed envelope verified"
            ),
            None => debug!(signers = verified, "signed envelope verified"),
        }

        Ok(content.to_vec())
    }
}
