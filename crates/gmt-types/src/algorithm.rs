/// Hash algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgId {
    Sm3,
}

/// Symmetric block cipher identifiers (algorithm + mode combination).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgId {
    Sm4Ecb,
}

/// Stream cipher and derived 3GPP construction identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamAlgId {
    /// ZUC-128 raw keystream generation.
    Zuc128,
    /// 128-EEA3 confidentiality (keystream XOR).
    Eea3,
    /// 128-EIA3 integrity (universal-hash MAC).
    Eia3,
}

/// Asymmetric (public key) algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PkeyAlgId {
    Sm2,
}

/// Elliptic curve parameter identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EccCurveId {
    /// SM2P256V1 (GB/T 32918.5-2017).
    Sm2Prime256,
}

/// Elliptic curve point encoding formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointFormat {
    /// `0x04 || X || Y`.
    Uncompressed,
    /// Bare `X || Y` without the tag byte, as used by the SM2
    /// ciphertext envelope.
    RawAffine,
}

impl Default for PointFormat {
    fn default() -> Self {
        Self::Uncompressed
    }
}
