#![forbid(unsafe_code)]
#![doc = "GM/T commercial cryptography algorithm library."]
//!
//! Implements the Chinese commercial cryptography suite: the SM3 hash and
//! its counter-mode KDF, the SM4 block cipher, the ZUC stream cipher with
//! the 128-EEA3/128-EIA3 constructions, and the SM2 public-key scheme
//! (signature, encryption, key exchange) over the SM2P256V1 curve.

// Core traits
pub mod provider;

// Hash algorithms
#[cfg(feature = "sm3")]
pub mod sm3;

pub mod hash {
    //! Unified digest interface.
    pub use super::provider::Digest;
}

// Symmetric ciphers
#[cfg(feature = "sm4")]
pub mod sm4;
#[cfg(feature = "zuc")]
pub mod zuc;

pub mod cipher {
    //! Unified symmetric cipher interface.
    pub use super::provider::BlockCipher;
}

// Asymmetric algorithms
#[cfg(feature = "ecc")]
pub mod ecc;
#[cfg(feature = "sm2")]
pub mod sm2;

pub mod kdf {
    //! Unified KDF interface.
    pub use super::provider::Kdf;
}
