//! SM3 cryptographic hash algorithm (GB/T 32905-2016).
//!
//! SM3 is a 256-bit Merkle–Damgård hash with a 512-bit block, used as the
//! digest for SM2 signatures, encryption and key exchange. This module
//! also provides the counter-mode key derivation function built over SM3
//! (GB/T 32918.4 §5.4.3).

use gmt_types::CryptoError;

/// SM3 output size in bytes.
pub const SM3_OUTPUT_SIZE: usize = 32;

/// SM3 block size in bytes.
pub const SM3_BLOCK_SIZE: usize = 64;

/// SM3 initial chaining value.
const IV: [u32; 8] = [
    0x7380166f, 0x4914b2b9, 0x172442d7, 0xda8a0600, 0xa96f30bc, 0x163138aa, 0xe38dee4d, 0xb0fb0e4e,
];

#[inline]
fn p0(x: u32) -> u32 {
    x ^ x.rotate_left(9) ^ x.rotate_left(17)
}

#[inline]
fn p1(x: u32) -> u32 {
    x ^ x.rotate_left(15) ^ x.rotate_left(23)
}

#[inline]
fn ff(j: usize, x: u32, y: u32, z: u32) -> u32 {
    if j < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (x & z) | (y & z)
    }
}

#[inline]
fn gg(j: usize, x: u32, y: u32, z: u32) -> u32 {
    if j < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (!x & z)
    }
}

/// Compress one 512-bit block into the chaining value.
fn compress(v: &mut [u32; 8], block: &[u8; SM3_BLOCK_SIZE]) {
    // Message expansion: W0..W67, then W'j = Wj ^ Wj+4 consumed inline.
    let mut w = [0u32; 68];
    for (i, chunk) in block.chunks_exact(4).enumerate() {
        w[i] = u32::from_be_bytes(chunk.try_into().unwrap());
    }
    for j in 16..68 {
        w[j] = p1(w[j - 16] ^ w[j - 9] ^ w[j - 3].rotate_left(15))
            ^ w[j - 13].rotate_left(7)
            ^ w[j - 6];
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *v;

    for j in 0..64 {
        let t_j: u32 = if j < 16 { 0x79cc4519 } else { 0x7a879d8a };
        let a12 = a.rotate_left(12);
        let ss1 = a12
            .wrapping_add(e)
            .wrapping_add(t_j.rotate_left(j as u32 % 32))
            .rotate_left(7);
        let ss2 = ss1 ^ a12;
        let tt1 = ff(j, a, b, c)
            .wrapping_add(d)
            .wrapping_add(ss2)
            .wrapping_add(w[j] ^ w[j + 4]);
        let tt2 = gg(j, e, f, g)
            .wrapping_add(h)
            .wrapping_add(ss1)
            .wrapping_add(w[j]);

        d = c;
        c = b.rotate_left(9);
        b = a;
        a = tt1;
        h = g;
        g = f.rotate_left(19);
        f = e;
        e = p0(tt2);
    }

    v[0] ^= a;
    v[1] ^= b;
    v[2] ^= c;
    v[3] ^= d;
    v[4] ^= e;
    v[5] ^= f;
    v[6] ^= g;
    v[7] ^= h;
}

/// SM3 hash context for incremental hashing.
#[derive(Clone)]
pub struct Sm3 {
    state: [u32; 8],
    /// Total bytes absorbed so far.
    count: u64,
    buffer: [u8; SM3_BLOCK_SIZE],
    buffer_len: usize,
}

impl Default for Sm3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sm3 {
    pub fn new() -> Self {
        Self {
            state: IV,
            count: 0,
            buffer: [0u8; SM3_BLOCK_SIZE],
            buffer_len: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.count += data.len() as u64;

        let mut rest = data;
        if self.buffer_len > 0 {
            let need = SM3_BLOCK_SIZE - self.buffer_len;
            if rest.len() < need {
                self.buffer[self.buffer_len..self.buffer_len + rest.len()].copy_from_slice(rest);
                self.buffer_len += rest.len();
                return Ok(());
            }
            self.buffer[self.buffer_len..].copy_from_slice(&rest[..need]);
            let block = self.buffer;
            compress(&mut self.state, &block);
            self.buffer_len = 0;
            rest = &rest[need..];
        }

        let mut chunks = rest.chunks_exact(SM3_BLOCK_SIZE);
        for block in &mut chunks {
            compress(&mut self.state, block.try_into().unwrap());
        }

        let remainder = chunks.remainder();
        if !remainder.is_empty() {
            self.buffer[..remainder.len()].copy_from_slice(remainder);
            self.buffer_len = remainder.len();
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<[u8; SM3_OUTPUT_SIZE], CryptoError> {
        let bit_len = self.count * 8;

        // Pad with 0x80, zeros, and the 64-bit bit length; one extra block
        // when fewer than 9 bytes of the current block remain.
        let mut tail = [0u8; 2 * SM3_BLOCK_SIZE];
        tail[..self.buffer_len].copy_from_slice(&self.buffer[..self.buffer_len]);
        tail[self.buffer_len] = 0x80;

        let blocks = if self.buffer_len + 9 > SM3_BLOCK_SIZE { 2 } else { 1 };
        let end = blocks * SM3_BLOCK_SIZE;
        tail[end - 8..end].copy_from_slice(&bit_len.to_be_bytes());

        for block in tail[..end].chunks_exact(SM3_BLOCK_SIZE) {
            compress(&mut self.state, block.try_into().unwrap());
        }

        let mut out = [0u8; SM3_OUTPUT_SIZE];
        for (i, &word) in self.state.iter().enumerate() {
            out[4 * i..4 * i + 4].copy_from_slice(&word.to_be_bytes());
        }
        Ok(out)
    }

    pub fn reset(&mut self) {
        self.state = IV;
        self.count = 0;
        self.buffer = [0u8; SM3_BLOCK_SIZE];
        self.buffer_len = 0;
    }

    /// One-shot digest.
    pub fn digest(data: &[u8]) -> Result<[u8; SM3_OUTPUT_SIZE], CryptoError> {
        let mut ctx = Self::new();
        ctx.update(data)?;
        ctx.finish()
    }
}

impl crate::provider::Digest for Sm3 {
    fn output_size(&self) -> usize {
        SM3_OUTPUT_SIZE
    }
    fn block_size(&self) -> usize {
        SM3_BLOCK_SIZE
    }
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.update(data)
    }
    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.len() < SM3_OUTPUT_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: SM3_OUTPUT_SIZE,
                got: out.len(),
            });
        }
        let digest = Sm3::finish(self)?;
        out[..SM3_OUTPUT_SIZE].copy_from_slice(&digest);
        Ok(())
    }
    fn reset(&mut self) {
        self.reset()
    }
}

/// Key derivation function over SM3 (GB/T 32918.4 §5.4.3).
///
/// Derives `klen` bytes as `SM3(z || ct)` for `ct = 1, 2, …` with a 32-bit
/// big-endian counter, truncated to `klen`. Rejecting an all-zero output
/// stream is the caller's responsibility.
pub fn sm3_kdf(z: &[u8], klen: usize) -> Result<Vec<u8>, CryptoError> {
    let mut output = Vec::with_capacity(klen);
    let mut counter: u32 = 1;

    while output.len() < klen {
        let mut hasher = Sm3::new();
        hasher.update(z)?;
        hasher.update(&counter.to_be_bytes())?;
        output.extend_from_slice(&hasher.finish()?);
        counter += 1;
    }

    output.truncate(klen);
    Ok(output)
}

/// The SM3 counter-mode KDF behind the unified [`crate::provider::Kdf`]
/// interface.
pub struct Sm3Kdf;

impl crate::provider::Kdf for Sm3Kdf {
    fn derive(&self, z: &[u8], output: &mut [u8]) -> Result<(), CryptoError> {
        let stream = sm3_kdf(z, output.len())?;
        output.copy_from_slice(&stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    // GB/T 32905-2016 test vector 1: "abc"
    #[test]
    fn test_sm3_abc() {
        let expected = "66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0";
        assert_eq!(hex(&Sm3::digest(b"abc").unwrap()), expected);
    }

    // GB/T 32905-2016 test vector 2: "abcd" repeated 16 times (64 bytes)
    #[test]
    fn test_sm3_64bytes() {
        let expected = "debe9ff92275b8a138604889c18e5a4d6fdb70e5387e5765293dcba39c0c5732";
        let input = b"abcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcd";
        assert_eq!(hex(&Sm3::digest(input).unwrap()), expected);
    }

    #[test]
    fn test_sm3_empty() {
        let expected = "1ab21d8355cfa17f8e61194831e81a8f22bec8c728fefb747ed035eb5082aa2b";
        assert_eq!(hex(&Sm3::digest(b"").unwrap()), expected);
    }

    /// Incremental update must match the one-shot digest regardless of
    /// chunking.
    #[test]
    fn test_sm3_incremental() {
        let data: Vec<u8> = (0..=200).collect();
        let one_shot = Sm3::digest(&data).unwrap();

        for chunk in [1, 3, 63, 64, 65, 100] {
            let mut ctx = Sm3::new();
            for piece in data.chunks(chunk) {
                ctx.update(piece).unwrap();
            }
            assert_eq!(ctx.finish().unwrap(), one_shot, "chunk size {chunk}");
        }
    }

    #[test]
    fn test_sm3_reset() {
        let mut ctx = Sm3::new();
        ctx.update(b"garbage").unwrap();
        ctx.reset();
        ctx.update(b"abc").unwrap();
        assert_eq!(ctx.finish().unwrap(), Sm3::digest(b"abc").unwrap());
    }

    /// GB/T 32905-2016: hash 1,000,000 × 'a'.
    #[test]
    #[ignore] // slow (~2s)
    fn test_sm3_1million_a() {
        let expected = "c8aaf89429554029e231941a2acc0ad61ff2a5acd8fadd25847a3a732b3b02c3";
        let mut ctx = Sm3::new();
        let chunk = [b'a'; 1000];
        for _ in 0..1000 {
            ctx.update(&chunk).unwrap();
        }
        assert_eq!(hex(&ctx.finish().unwrap()), expected);
    }

    /// KDF with klen = 32 is exactly SM3(z || 00000001).
    #[test]
    fn test_kdf_single_block() {
        let z = b"kdf input value";
        let derived = sm3_kdf(z, 32).unwrap();

        let mut direct = Vec::from(&z[..]);
        direct.extend_from_slice(&1u32.to_be_bytes());
        assert_eq!(&derived[..], &Sm3::digest(&direct).unwrap()[..]);
    }

    /// A longer derivation truncates the counter-mode stream.
    #[test]
    fn test_kdf_truncation_and_prefix() {
        let z = b"another kdf input";
        let short = sm3_kdf(z, 19).unwrap();
        let long = sm3_kdf(z, 57).unwrap();
        assert_eq!(short.len(), 19);
        assert_eq!(long.len(), 57);
        assert_eq!(&short[..], &long[..19]);

        let mut second = Vec::from(&z[..]);
        second.extend_from_slice(&2u32.to_be_bytes());
        assert_eq!(&long[32..], &Sm3::digest(&second).unwrap()[..25]);
    }

    #[test]
    fn test_kdf_zero_length() {
        assert!(sm3_kdf(b"z", 0).unwrap().is_empty());
    }

    #[test]
    fn test_digest_trait() {
        use crate::provider::Digest as _;
        let mut ctx = Sm3::new();
        assert_eq!(ctx.output_size(), 32);
        assert_eq!(ctx.block_size(), 64);
        ctx.update(b"abc").unwrap();
        let mut out = [0u8; 32];
        crate::provider::Digest::finish(&mut ctx, &mut out).unwrap();
        assert_eq!(out, Sm3::digest(b"abc").unwrap());
    }
}
