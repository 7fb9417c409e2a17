//! Trait-based provider mechanism for cryptographic algorithms.
//!
//! These traits define the abstract interfaces the algorithm
//! implementations satisfy, replacing C-style function pointer tables
//! with zero-cost static dispatch.

use gmt_types::CryptoError;

/// A hash / message digest algorithm.
pub trait Digest: Send + Sync {
    /// The output size in bytes.
    fn output_size(&self) -> usize;

    /// The internal block size in bytes.
    fn block_size(&self) -> usize;

    /// Feed data into the hash state.
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;

    /// Finalize the hash and write the digest to `out`.
    /// The length of `out` must be at least `output_size()`.
    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError>;

    /// Reset the hash state to process a new message.
    fn reset(&mut self);
}

/// A block cipher (e.g., SM4).
pub trait BlockCipher: Send + Sync {
    /// Block size in bytes.
    fn block_size(&self) -> usize;

    /// Key size in bytes.
    fn key_size(&self) -> usize;

    /// Encrypt a single block in-place.
    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;

    /// Decrypt a single block in-place.
    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;
}

/// A Key Derivation Function over a shared-secret input.
pub trait Kdf: Send + Sync {
    /// Derive `output.len()` bytes of key material from `z`.
    fn derive(&self, z: &[u8], output: &mut [u8]) -> Result<(), CryptoError>;
}
