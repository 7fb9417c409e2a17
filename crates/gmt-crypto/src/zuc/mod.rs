//! ZUC-128 stream cipher and the 128-EEA3 / 128-EIA3 constructions
//! (GM/T 0001, 3GPP TS 35.221/35.222).
//!
//! ZUC is a word-oriented stream cipher: a 16-cell LFSR over
//! GF(2^31 - 1), a bit-reconstruction stage and a nonlinear function with
//! two 32-bit memory cells, producing one 32-bit keystream word per step.
//! 128-EEA3 turns the keystream into a confidentiality transform by XOR;
//! 128-EIA3 is the derived 32-bit universal-hash MAC.

use gmt_types::CryptoError;
use zeroize::Zeroize;

/// ZUC key size in bytes (128 bits).
pub const ZUC_KEY_SIZE: usize = 16;

/// ZUC IV size in bytes (128 bits).
pub const ZUC_IV_SIZE: usize = 16;

const S0: [u8; 256] = [
    0x3e, 0x72, 0x5b, 0x47, 0xca, 0xe0, 0x00, 0x33, 0x04, 0xd1, 0x54, 0x98, 0x09, 0xb9, 0x6d, 0xcb,
    0x7b, 0x1b, 0xf9, 0x32, 0xaf, 0x9d, 0x6a, 0xa5, 0xb8, 0x2d, 0xfc, 0x1d, 0x08, 0x53, 0x03, 0x90,
    0x4d, 0x4e, 0x84, 0x99, 0xe4, 0xce, 0xd9, 0x91, 0xdd, 0xb6, 0x85, 0x48, 0x8b, 0x29, 0x6e, 0xac,
    0xcd, 0xc1, 0xf8, 0x1e, 0x73, 0x43, 0x69, 0xc6, 0xb5, 0xbd, 0xfd, 0x39, 0x63, 0x20, 0xd4, 0x38,
    0x76, 0x7d, 0xb2, 0xa7, 0xcf, 0xed, 0x57, 0xc5, 0xf3, 0x2c, 0xbb, 0x14, 0x21, 0x06, 0x55, 0x9b,
    0xe3, 0xef, 0x5e, 0x31, 0x4f, 0x7f, 0x5a, 0xa4, 0x0d, 0x82, 0x51, 0x49, 0x5f, 0xba, 0x58, 0x1c,
    0x4a, 0x16, 0xd5, 0x17, 0xa8, 0x92, 0x24, 0x1f, 0x8c, 0xff, 0xd8, 0xae, 0x2e, 0x01, 0xd3, 0xad,
    0x3b, 0x4b, 0xda, 0x46, 0xeb, 0xc9, 0xde, 0x9a, 0x8f, 0x87, 0xd7, 0x3a, 0x80, 0x6f, 0x2f, 0xc8,
    0xb1, 0xb4, 0x37, 0xf7, 0x0a, 0x22, 0x13, 0x28, 0x7c, 0xcc, 0x3c, 0x89, 0xc7, 0xc3, 0x96, 0x56,
    0x07, 0xbf, 0x7e, 0xf0, 0x0b, 0x2b, 0x97, 0x52, 0x35, 0x41, 0x79, 0x61, 0xa6, 0x4c, 0x10, 0xfe,
    0xbc, 0x26, 0x95, 0x88, 0x8a, 0xb0, 0xa3, 0xfb, 0xc0, 0x18, 0x94, 0xf2, 0xe1, 0xe5, 0xe9, 0x5d,
    0xd0, 0xdc, 0x11, 0x66, 0x64, 0x5c, 0xec, 0x59, 0x42, 0x75, 0x12, 0xf5, 0x74, 0x9c, 0xaa, 0x23,
    0x0e, 0x86, 0xab, 0xbe, 0x2a, 0x02, 0xe7, 0x67, 0xe6, 0x44, 0xa2, 0x6c, 0xc2, 0x93, 0x9f, 0xf1,
    0xf6, 0xfa, 0x36, 0xd2, 0x50, 0x68, 0x9e, 0x62, 0x71, 0x15, 0x3d, 0xd6, 0x40, 0xc4, 0xe2, 0x0f,
    0x8e, 0x83, 0x77, 0x6b, 0x25, 0x05, 0x3f, 0x0c, 0x30, 0xea, 0x70, 0xb7, 0xa1, 0xe8, 0xa9, 0x65,
    0x8d, 0x27, 0x1a, 0xdb, 0x81, 0xb3, 0xa0, 0xf4, 0x45, 0x7a, 0x19, 0xdf, 0xee, 0x78, 0x34, 0x60,
];

const S1: [u8; 256] = [
    0x55, 0xc2, 0x63, 0x71, 0x3b, 0xc8, 0x47, 0x86, 0x9f, 0x3c, 0xda, 0x5b, 0x29, 0xaa, 0xfd, 0x77,
    0x8c, 0xc5, 0x94, 0x0c, 0xa6, 0x1a, 0x13, 0x00, 0xe3, 0xa8, 0x16, 0x72, 0x40, 0xf9, 0xf8, 0x42,
    0x44, 0x26, 0x68, 0x96, 0x81, 0xd9, 0x45, 0x3e, 0x10, 0x76, 0xc6, 0xa7, 0x8b, 0x39, 0x43, 0xe1,
    0x3a, 0xb5, 0x56, 0x2a, 0xc0, 0x6d, 0xb3, 0x05, 0x22, 0x66, 0xbf, 0xdc, 0x0b, 0xfa, 0x62, 0x48,
    0xdd, 0x20, 0x11, 0x06, 0x36, 0xc9, 0xc1, 0xcf, 0xf6, 0x27, 0x52, 0xbb, 0x69, 0xf5, 0xd4, 0x87,
    0x7f, 0x84, 0x4c, 0xd2, 0x9c, 0x57, 0xa4, 0xbc, 0x4f, 0x9a, 0xdf, 0xfe, 0xd6, 0x8d, 0x7a, 0xeb,
    0x2b, 0x53, 0xd8, 0x5c, 0xa1, 0x14, 0x17, 0xfb, 0x23, 0xd5, 0x7d, 0x30, 0x67, 0x73, 0x08, 0x09,
    0xee, 0xb7, 0x70, 0x3f, 0x61, 0xb2, 0x19, 0x8e, 0x4e, 0xe5, 0x4b, 0x93, 0x8f, 0x5d, 0xdb, 0xa9,
    0xad, 0xf1, 0xae, 0x2e, 0xcb, 0x0d, 0xfc, 0xf4, 0x2d, 0x46, 0x6e, 0x1d, 0x97, 0xe8, 0xd1, 0xe9,
    0x4d, 0x37, 0xa5, 0x75, 0x5e, 0x83, 0x9e, 0xab, 0x82, 0x9d, 0xb9, 0x1c, 0xe0, 0xcd, 0x49, 0x89,
    0x01, 0xb6, 0xbd, 0x58, 0x24, 0xa2, 0x5f, 0x38, 0x78, 0x99, 0x15, 0x90, 0x50, 0xb8, 0x95, 0xe4,
    0xd0, 0x91, 0xc7, 0xce, 0xed, 0x0f, 0xb4, 0x6f, 0xa0, 0xcc, 0xf0, 0x02, 0x4a, 0x79, 0xc3, 0xde,
    0xa3, 0xef, 0xea, 0x51, 0xe6, 0x6b, 0x18, 0xec, 0x1b, 0x2c, 0x80, 0xf7, 0x74, 0xe7, 0xff, 0x21,
    0x5a, 0x6a, 0x54, 0x1e, 0x41, 0x31, 0x92, 0x35, 0xc4, 0x33, 0x07, 0x0a, 0xba, 0x7e, 0x0e, 0x34,
    0x88, 0xb1, 0x98, 0x7c, 0xf3, 0x3d, 0x60, 0x6c, 0x7b, 0xca, 0xd3, 0x1f, 0x32, 0x65, 0x04, 0x28,
    0x64, 0xbe, 0x85, 0x9b, 0x2f, 0x59, 0x8a, 0xd7, 0xb0, 0x25, 0xac, 0xaf, 0x12, 0x03, 0xe2, 0xf2,
];

/// 15-bit key-loading constants d0..d15.
const D: [u16; 16] = [
    0x44d7, 0x26bc, 0x626b, 0x135e, 0x5789, 0x35e2, 0x7135, 0x09af, 0x4d78, 0x2f13, 0x6bc4, 0x1af1,
    0x5e26, 0x3c4d, 0x789a, 0x47ac,
];

/// a + b over Z/(2^31 - 1).
#[inline]
fn add_mod31(a: u32, b: u32) -> u32 {
    let c = a.wrapping_add(b);
    (c & 0x7fffffff).wrapping_add(c >> 31)
}

/// x * 2^k over Z/(2^31 - 1): a 31-bit rotation.
#[inline]
fn mul_pow2_mod31(x: u32, k: u32) -> u32 {
    ((x << k) | (x >> (31 - k))) & 0x7fffffff
}

#[inline]
fn l1(x: u32) -> u32 {
    x ^ x.rotate_left(2) ^ x.rotate_left(10) ^ x.rotate_left(18) ^ x.rotate_left(24)
}

#[inline]
fn l2(x: u32) -> u32 {
    x ^ x.rotate_left(8) ^ x.rotate_left(14) ^ x.rotate_left(22) ^ x.rotate_left(30)
}

/// Apply S0, S1, S0, S1 to the four bytes of the word (high to low).
#[inline]
fn sbox(x: u32) -> u32 {
    u32::from_be_bytes([
        S0[(x >> 24) as usize],
        S1[(x >> 16) as u8 as usize],
        S0[(x >> 8) as u8 as usize],
        S1[x as u8 as usize],
    ])
}

/// ZUC-128 keystream generator.
///
/// `new` performs the full initialization (key loading, 32 mixing rounds
/// and the discard round), after which [`Zuc::keystream`] emits
/// working-mode words.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Zuc {
    /// LFSR cells s0..s15; each in [1, 2^31 - 1].
    lfsr: [u32; 16],
    /// Memory cell R1 of the nonlinear function.
    r1: u32,
    /// Memory cell R2 of the nonlinear function.
    r2: u32,
    /// Bit-reconstruction output X0..X3.
    x: [u32; 4],
}

impl Zuc {
    /// Initialize ZUC with a 128-bit key and 128-bit IV.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != ZUC_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: ZUC_KEY_SIZE,
                got: key.len(),
            });
        }
        if iv.len() != ZUC_IV_SIZE {
            return Err(CryptoError::InvalidArg);
        }

        // Load each cell as k_i || d_i || iv_i (8 + 15 + 8 = 31 bits).
        let mut lfsr = [0u32; 16];
        for (i, cell) in lfsr.iter_mut().enumerate() {
            *cell = ((key[i] as u32) << 23) | ((D[i] as u32) << 8) | iv[i] as u32;
        }

        let mut zuc = Zuc {
            lfsr,
            r1: 0,
            r2: 0,
            x: [0; 4],
        };

        // 32 initialization rounds feeding W >> 1 back into the LFSR.
        for _ in 0..32 {
            zuc.bit_reconstruct();
            let w = zuc.f();
            zuc.lfsr_step(w >> 1);
        }

        // One working-mode round whose output is discarded.
        zuc.bit_reconstruct();
        zuc.f();
        zuc.lfsr_step(0);

        Ok(zuc)
    }

    /// One LFSR step. `u` is the injection word during initialization and
    /// zero in working mode (the two modes of the specification coincide
    /// for u = 0).
    fn lfsr_step(&mut self, u: u32) {
        let mut v = self.lfsr[0];
        v = add_mod31(v, mul_pow2_mod31(self.lfsr[15], 15));
        v = add_mod31(v, mul_pow2_mod31(self.lfsr[13], 17));
        v = add_mod31(v, mul_pow2_mod31(self.lfsr[10], 21));
        v = add_mod31(v, mul_pow2_mod31(self.lfsr[4], 20));
        v = add_mod31(v, mul_pow2_mod31(self.lfsr[0], 8));

        self.lfsr.copy_within(1.., 0);
        let s15 = add_mod31(v, u);
        // 0 and 2^31 - 1 coincide mod p; the zero value is never used.
        self.lfsr[15] = if s15 == 0 { 0x7fffffff } else { s15 };
    }

    /// Bit reconstruction: assemble X0..X3 from the half-cells.
    fn bit_reconstruct(&mut self) {
        let s = &self.lfsr;
        self.x[0] = ((s[15] & 0x7fff8000) << 1) | (s[14] & 0xffff);
        self.x[1] = ((s[11] & 0xffff) << 16) | ((s[9] & 0x7fff8000) >> 15);
        self.x[2] = ((s[7] & 0xffff) << 16) | ((s[5] & 0x7fff8000) >> 15);
        self.x[3] = ((s[2] & 0xffff) << 16) | ((s[0] & 0x7fff8000) >> 15);
    }

    /// The nonlinear function F: consumes X0..X2, updates R1/R2, returns W.
    fn f(&mut self) -> u32 {
        let w = (self.x[0] ^ self.r1).wrapping_add(self.r2);
        let w1 = self.r1.wrapping_add(self.x[1]);
        let w2 = self.r2 ^ self.x[2];
        self.r1 = sbox(l1((w1 << 16) | (w2 >> 16)));
        self.r2 = sbox(l2((w2 << 16) | (w1 >> 16)));
        w
    }

    /// Fill `out` with the next keystream words.
    pub fn keystream(&mut self, out: &mut [u32]) {
        for z in out.iter_mut() {
            self.bit_reconstruct();
            *z = self.f() ^ self.x[3];
            self.lfsr_step(0);
        }
    }
}

/// Extract the 32-bit word starting at bit position `i` of the keystream.
#[inline]
fn word_at(k: &[u32], i: usize) -> u32 {
    let j = i >> 5;
    let m = i & 0x1f;
    if m == 0 {
        k[j]
    } else {
        (k[j] << m) | (k[j + 1] >> (32 - m))
    }
}

/// Return bit `i` of the big-endian word stream `m`.
#[inline]
fn bit_at(m: &[u32], i: usize) -> bool {
    (m[i >> 5] >> (31 - (i & 0x1f))) & 1 == 1
}

/// Build the 128-EEA3 IV from COUNT, BEARER and DIRECTION.
fn eea3_iv(count: u32, bearer: u8, direction: u8) -> [u8; ZUC_IV_SIZE] {
    let c = count.to_be_bytes();
    let mut iv = [0u8; ZUC_IV_SIZE];
    iv[..4].copy_from_slice(&c);
    iv[4] = ((bearer << 3) | (direction << 2)) & 0xfc;
    iv[8..12].copy_from_slice(&c);
    iv[12] = iv[4];
    iv
}

/// Build the 128-EIA3 IV: as EEA3 but DIRECTION perturbs bytes 8 and 14.
fn eia3_iv(count: u32, bearer: u8, direction: u8) -> [u8; ZUC_IV_SIZE] {
    let c = count.to_be_bytes();
    let mut iv = [0u8; ZUC_IV_SIZE];
    iv[..4].copy_from_slice(&c);
    iv[4] = bearer << 3;
    iv[8..12].copy_from_slice(&c);
    iv[8] ^= direction << 7;
    iv[12] = iv[4];
    iv[14] = direction << 7;
    iv
}

fn check_params(key: &[u8], bearer: u8, direction: u8) -> Result<(), CryptoError> {
    if key.len() != ZUC_KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength {
            expected: ZUC_KEY_SIZE,
            got: key.len(),
        });
    }
    if bearer > 0x1f || direction > 1 {
        return Err(CryptoError::InvalidArg);
    }
    Ok(())
}

/// 128-EEA3 confidentiality algorithm.
///
/// Encrypts (or, applied again, decrypts) `length` bits of `ibs`, given as
/// big-endian 32-bit words. Unused bits of the final output word are
/// zeroed. The operation is its own inverse.
pub fn eea3(
    ck: &[u8],
    count: u32,
    bearer: u8,
    direction: u8,
    ibs: &[u32],
    length: u32,
) -> Result<Vec<u32>, CryptoError> {
    check_params(ck, bearer, direction)?;
    let words = length.div_ceil(32) as usize;
    if ibs.len() < words {
        return Err(CryptoError::BufferTooSmall {
            need: words,
            got: ibs.len(),
        });
    }

    let mut zuc = Zuc::new(ck, &eea3_iv(count, bearer, direction))?;
    let mut obs = vec![0u32; words];
    zuc.keystream(&mut obs);

    for (o, &i) in obs.iter_mut().zip(ibs.iter()) {
        *o ^= i;
    }

    let t = length % 32;
    if t != 0 {
        obs[words - 1] = (obs[words - 1] >> (32 - t)) << (32 - t);
    }
    Ok(obs)
}

/// 128-EIA3 integrity algorithm: 32-bit MAC over `length` bits of
/// `message` (big-endian 32-bit words).
pub fn eia3(
    ik: &[u8],
    count: u32,
    bearer: u8,
    direction: u8,
    message: &[u32],
    length: u32,
) -> Result<u32, CryptoError> {
    check_params(ik, bearer, direction)?;
    let msg_words = length.div_ceil(32) as usize;
    if message.len() < msg_words {
        return Err(CryptoError::BufferTooSmall {
            need: msg_words,
            got: message.len(),
        });
    }

    // Enough words to index bit 32*(L-1) inclusive.
    let l = msg_words + 2;
    let mut zuc = Zuc::new(ik, &eia3_iv(count, bearer, direction))?;
    let mut k = vec![0u32; l];
    zuc.keystream(&mut k);

    let mut t: u32 = 0;
    for i in 0..length as usize {
        if bit_at(message, i) {
            t ^= word_at(&k, i);
        }
    }
    t ^= word_at(&k, length as usize);
    let mac = t ^ k[l - 1];

    k.zeroize();
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    // GM/T 0001.1 keystream vector: all-zero key and IV.
    #[test]
    fn test_keystream_all_zero() {
        let mut zuc = Zuc::new(&[0u8; 16], &[0u8; 16]).unwrap();
        let mut z = [0u32; 2];
        zuc.keystream(&mut z);
        assert_eq!(z, [0x27bede74, 0x018082da]);
    }

    // GM/T 0001.1 keystream vector: all-ones key and IV.
    #[test]
    fn test_keystream_all_ff() {
        let mut zuc = Zuc::new(&[0xff; 16], &[0xff; 16]).unwrap();
        let mut z = [0u32; 2];
        zuc.keystream(&mut z);
        assert_eq!(z, [0x0657cfa0, 0x7096398b]);
    }

    // GM/T 0001.1 keystream vector: random key and IV.
    #[test]
    fn test_keystream_random_vector() {
        let k = [
            0x3d, 0x4c, 0x4b, 0xe9, 0x6a, 0x82, 0xfd, 0xae, 0xb5, 0x8f, 0x64, 0x1d, 0xb1, 0x7b,
            0x45, 0x5b,
        ];
        let iv = [
            0x84, 0x31, 0x9a, 0xa8, 0xde, 0x69, 0x15, 0xca, 0x1f, 0x6b, 0xda, 0x6b, 0xfb, 0xd8,
            0xc7, 0x66,
        ];
        let mut zuc = Zuc::new(&k, &iv).unwrap();
        let mut z = [0u32; 2];
        zuc.keystream(&mut z);
        assert_eq!(z, [0x14f1c272, 0x3279c419]);
    }

    /// Keystream emission is resumable: two short reads equal one long
    /// read.
    #[test]
    fn test_keystream_resumable() {
        let key = [0x5a; 16];
        let iv = [0xa5; 16];

        let mut long = [0u32; 8];
        Zuc::new(&key, &iv).unwrap().keystream(&mut long);

        let mut zuc = Zuc::new(&key, &iv).unwrap();
        let mut first = [0u32; 3];
        let mut second = [0u32; 5];
        zuc.keystream(&mut first);
        zuc.keystream(&mut second);

        assert_eq!(&long[..3], &first);
        assert_eq!(&long[3..], &second);
    }

    #[test]
    fn test_key_iv_length_rejected() {
        assert!(Zuc::new(&[0u8; 15], &[0u8; 16]).is_err());
        assert!(Zuc::new(&[0u8; 16], &[0u8; 17]).is_err());
    }

    // 3GPP 128-EEA3 test set 1.
    #[test]
    fn test_eea3_vector() {
        let ck = [
            0x17, 0x3d, 0x14, 0xba, 0x50, 0x03, 0x73, 0x1d, 0x7a, 0x60, 0x04, 0x94, 0x70, 0xf0,
            0x0a, 0x29,
        ];
        let plain = [
            0x6cf65340, 0x735552ab, 0x0c9752fa, 0x6f9025fe, 0x0bd675d9, 0x005875b2, 0x00000000,
        ];
        let expected = [
            0xa6c85fc6, 0x6afb8533, 0xaafc2518, 0xdfe78494, 0x0ee1e4b0, 0x30238cc8, 0x00000000,
        ];

        let cipher = eea3(&ck, 0x66035492, 0x0f, 0, &plain, 0xc1).unwrap();
        assert_eq!(&cipher[..], &expected);
    }

    /// EEA3 is its own inverse and preserves the bit length.
    #[test]
    fn test_eea3_roundtrip() {
        let ck = [0x42; 16];
        let plain = [0xdeadbeef, 0x01234567, 0x89abcd00];
        let length = 72; // partial final word

        let cipher = eea3(&ck, 7, 3, 1, &plain, length).unwrap();
        let decrypted = eea3(&ck, 7, 3, 1, &cipher, length).unwrap();

        // The 72 message bits survive; the rest of the last word is zero.
        assert_eq!(decrypted[0], plain[0]);
        assert_eq!(decrypted[1], plain[1]);
        assert_eq!(decrypted[2], plain[2] & 0xff000000);
    }

    #[test]
    fn test_eea3_input_too_short() {
        let ck = [0u8; 16];
        assert!(matches!(
            eea3(&ck, 0, 0, 0, &[0u32; 2], 96),
            Err(CryptoError::BufferTooSmall { need: 3, got: 2 })
        ));
    }

    #[test]
    fn test_eea3_rejects_bad_bearer() {
        assert!(eea3(&[0u8; 16], 0, 0x20, 0, &[0u32; 1], 32).is_err());
        assert!(eea3(&[0u8; 16], 0, 0, 2, &[0u32; 1], 32).is_err());
    }

    // 3GPP 128-EIA3 test set 1: a single zero bit.
    #[test]
    fn test_eia3_vector() {
        let ik = [0u8; 16];
        let mac = eia3(&ik, 0, 0, 0, &[0x00000000], 1).unwrap();
        assert_eq!(mac, 0xc8a9595e);
    }

    #[test]
    fn test_eia3_distinguishes_direction() {
        let ik = [0x31; 16];
        let m = [0x0badf00d, 0x5ca1ab1e];
        let up = eia3(&ik, 9, 4, 0, &m, 64).unwrap();
        let down = eia3(&ik, 9, 4, 1, &m, 64).unwrap();
        assert_ne!(up, down);
    }

    #[test]
    fn test_eia3_message_too_short() {
        assert!(eia3(&[0u8; 16], 0, 0, 0, &[0u32; 1], 33).is_err());
    }
}
