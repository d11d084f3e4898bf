//! Wide-block digest built from the AES round function.
//!
//! The input is folded into a single 128-bit state, 16 bytes at a time:
//! each block is XORed in and then diffused through four AES rounds with a
//! zero round key. The state starts from a fixed embedded seed XORed with
//! the input length, so inputs that differ only in trailing zero bytes
//! still digest differently. The final partial block is zero-padded before
//! absorption; the digest is the low 64 bits of the final state.

use crate::simd128::Simd128;
use arrayref::array_ref;

/// Embedded seed, the first 128 fractional bits of pi.
const SEED: Simd128 = Simd128::from(0x243f_6a88_85a3_08d3_1319_8a2e_0370_7344);

/// Zero round key shared by all four rounds of the block mix.
const ZERO_KEY: Simd128 = Simd128::from(0);

#[inline(always)]
fn absorb(state: &mut Simd128, block: &Simd128) {
    Simd128::pxor(state, block);
    Simd128::aesenc(state, &ZERO_KEY);
    Simd128::aesenc(state, &ZERO_KEY);
    Simd128::aesenc(state, &ZERO_KEY);
    Simd128::aesenc(state, &ZERO_KEY);
}

/// Digest `data` through the AES-round block mix.
pub fn casey_hash(data: &[u8]) -> u64 {
    let mut state = Simd128::from(data.len() as u128);
    Simd128::pxor(&mut state, &SEED);

    let mut blocks = data.chunks_exact(16);
    for block in &mut blocks {
        absorb(&mut state, &Simd128::read(array_ref![block, 0, 16]));
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut last = [0u8; 16];
        last[..tail.len()].copy_from_slice(tail);
        absorb(&mut state, &Simd128::read(&last));
    }

    let mut out = [0u8; 16];
    state.write(&mut out);
    u64::from_le_bytes(*array_ref![out, 0, 8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let input = b"0123456789abcdef0123456789abcdef";
        assert_eq!(casey_hash(input), casey_hash(input));
    }

    #[test]
    fn length_distinguishes_zero_padded_inputs() {
        // A short input and its zero-extended sibling absorb the same block
        // bytes; only the length fold separates them.
        let short = [0x55u8; 7];
        let mut padded = [0u8; 16];
        padded[..7].copy_from_slice(&short);
        assert_ne!(casey_hash(&short), casey_hash(&padded));
    }

    #[test]
    fn every_block_contributes() {
        let a = [0x11u8; 48];
        let mut b = a;
        b[33] ^= 1;
        assert_ne!(casey_hash(&a), casey_hash(&b));
    }

    #[test]
    fn empty_input_digests_the_seed() {
        // No blocks to absorb: the digest is the raw seed fold, and must
        // not collide with short real inputs.
        let empty = casey_hash(b"");
        assert_ne!(empty, casey_hash(b"\0"));
        assert_ne!(empty, casey_hash(b"a"));
    }
}
