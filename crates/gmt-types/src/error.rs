/// Cryptographic operation errors.
///
/// Every failure is a tagged variant; the historical numeric codes of the
/// reference implementation are reproduced only at the boundary, through
/// [`CryptoError::legacy_code`].
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("null or empty input")]
    NullInput,
    #[error("invalid argument")]
    InvalidArg,
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("input data too long")]
    InputOverflow,
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    // BigNum errors
    #[error("big number: insufficient space")]
    BnSpaceNotEnough,
    #[error("big number: division by zero")]
    BnDivisionByZero,
    #[error("big number: no modular inverse")]
    BnNoInverse,
    #[error("big number: random generation failed")]
    BnRandGenFail,

    // Curve and key validation errors
    #[error("ecc: curve initialization rejected")]
    EcurveInit,
    #[error("ecc: point at infinity")]
    PointAtInfinity,
    #[error("ecc: point not on curve")]
    PointNotOnCurve,
    #[error("ecc: point does not have order n")]
    PointOrder,
    #[error("ecc: coordinate outside the base field")]
    FieldElementOutOfRange,
    #[error("ecc: private key outside [1, n-2]")]
    InvalidPrivateKey,
    #[error("sm2: public key rejected")]
    PubkeyInit,

    // Degenerate caller-supplied randomness
    #[error("sm2: derived key stream is all zero")]
    KdfAllZero,
    #[error("sm2: signature r degenerate (r = 0 or r + k = n)")]
    SignatureRDegenerate,
    #[error("sm2: signature s degenerate (s = 0)")]
    SignatureSDegenerate,
    #[error("sm2: verification scalar t degenerate (t = 0)")]
    VerifyTDegenerate,

    // Signature range rejections
    #[error("sm2: signature r outside [1, n-1]")]
    SignatureROutOfRange,
    #[error("sm2: signature s outside [1, n-1]")]
    SignatureSOutOfRange,

    // Authentication failures
    #[error("sm2: signature verification failed")]
    SignatureMismatch,
    #[error("sm2: ciphertext tag C3 mismatch")]
    C3Mismatch,
    #[error("sm2: responder confirmation S_B rejected")]
    KeyConfirmFromResponder,
    #[error("sm2: initiator confirmation S_A rejected")]
    KeyConfirmFromInitiator,
}

impl CryptoError {
    /// Numeric code of the reference implementation, for on-the-wire
    /// compatibility.
    ///
    /// The reference reuses the same small integers across its signature,
    /// encryption and key-exchange namespaces (`5` is both "coordinate
    /// beyond Fq" and "KDF output all zero"; `6` is both "r degenerate"
    /// and "C3 mismatch"; `8`/`9` are both the signature range errors and
    /// the exchange confirmation failures). Those collisions are
    /// intentional and preserved here. Errors the reference never surfaced
    /// numerically (argument validation, big-number failures) map to
    /// `None`.
    pub fn legacy_code(&self) -> Option<u32> {
        match self {
            CryptoError::EcurveInit => Some(0x1),
            CryptoError::PointAtInfinity => Some(0x2),
            CryptoError::PointNotOnCurve => Some(0x3),
            CryptoError::PointOrder => Some(0x4),
            CryptoError::FieldElementOutOfRange | CryptoError::KdfAllZero => Some(0x5),
            CryptoError::SignatureRDegenerate | CryptoError::C3Mismatch => Some(0x6),
            CryptoError::SignatureSDegenerate => Some(0x7),
            CryptoError::SignatureROutOfRange | CryptoError::KeyConfirmFromResponder => Some(0x8),
            CryptoError::SignatureSOutOfRange | CryptoError::KeyConfirmFromInitiator => Some(0x9),
            CryptoError::VerifyTDegenerate => Some(0xA),
            CryptoError::PubkeyInit => Some(0xB),
            CryptoError::SignatureMismatch => Some(0xC),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(CryptoError::NullInput.to_string(), "null or empty input");
        assert_eq!(
            CryptoError::PointNotOnCurve.to_string(),
            "ecc: point not on curve"
        );
        assert_eq!(
            CryptoError::InvalidKeyLength {
                expected: 16,
                got: 24
            }
            .to_string(),
            "invalid key length: expected 16, got 24"
        );
        assert_eq!(
            CryptoError::BufferTooSmall { need: 64, got: 32 }.to_string(),
            "buffer length not enough: need 64, got 32"
        );
    }

    #[test]
    fn test_legacy_code_table() {
        assert_eq!(CryptoError::EcurveInit.legacy_code(), Some(0x1));
        assert_eq!(CryptoError::PointAtInfinity.legacy_code(), Some(0x2));
        assert_eq!(CryptoError::PointNotOnCurve.legacy_code(), Some(0x3));
        assert_eq!(CryptoError::PointOrder.legacy_code(), Some(0x4));
        assert_eq!(CryptoError::VerifyTDegenerate.legacy_code(), Some(0xA));
        assert_eq!(CryptoError::PubkeyInit.legacy_code(), Some(0xB));
        assert_eq!(CryptoError::SignatureMismatch.legacy_code(), Some(0xC));
    }

    #[test]
    fn test_legacy_code_collisions_preserved() {
        // Encryption and signature namespaces share these values.
        assert_eq!(
            CryptoError::FieldElementOutOfRange.legacy_code(),
            CryptoError::KdfAllZero.legacy_code()
        );
        assert_eq!(
            CryptoError::SignatureRDegenerate.legacy_code(),
            CryptoError::C3Mismatch.legacy_code()
        );
        assert_eq!(
            CryptoError::SignatureROutOfRange.legacy_code(),
            CryptoError::KeyConfirmFromResponder.legacy_code()
        );
    }

    #[test]
    fn test_infrastructure_errors_have_no_code() {
        assert_eq!(CryptoError::InvalidArg.legacy_code(), None);
        assert_eq!(CryptoError::BnDivisionByZero.legacy_code(), None);
        assert_eq!(CryptoError::BnRandGenFail.legacy_code(), None);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CryptoError>();
    }
}
