//! 128-bit lane used by the AES-round digest.
//!
//! Three backends behind one shape: AES-NI on x86 when the `aes` target
//! feature is compiled in, the ARMv8 crypto extension on aarch64, and the
//! `aes` crate's round primitive everywhere else. All three produce
//! bit-identical results, so tests and digests do not depend on which
//! backend the build selected.

#[cfg(all(target_arch = "x86", target_feature = "aes"))]
use std::arch::x86::{
    __m128i, _mm_aesenc_si128, _mm_loadu_si128, _mm_storeu_si128, _mm_xor_si128,
};
#[cfg(all(target_arch = "x86_64", target_feature = "aes"))]
use std::arch::x86_64::{
    __m128i, _mm_aesenc_si128, _mm_loadu_si128, _mm_storeu_si128, _mm_xor_si128,
};

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "aes"
))]
use std::mem::transmute;

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "aes"
))]
#[derive(Clone, Copy)]
pub(crate) struct Simd128(__m128i);

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "aes"
))]
impl Simd128 {
    pub(crate) const fn from(x: u128) -> Self {
        Self(unsafe { transmute(x) })
    }

    /// Read from array pointer (potentially unaligned)
    #[inline(always)]
    pub(crate) fn read(src: &[u8; 16]) -> Self {
        let x = unsafe { _mm_loadu_si128(src.as_ptr() as *const _ as *const __m128i) };
        Self(x)
    }

    /// Write into array pointer (potentially unaligned)
    #[inline(always)]
    pub(crate) fn write(self, dst: &mut [u8; 16]) {
        unsafe {
            _mm_storeu_si128(dst.as_mut_ptr() as *mut _ as *mut __m128i, self.0);
        }
    }

    #[inline(always)]
    pub(crate) fn aesenc(block: &mut Self, key: &Self) {
        unsafe {
            block.0 = _mm_aesenc_si128(block.0, key.0);
        }
    }

    #[inline(always)]
    pub(crate) fn pxor(dst: &mut Self, src: &Self) {
        unsafe {
            dst.0 = _mm_xor_si128(dst.0, src.0);
        }
    }
}

#[cfg(all(target_arch = "aarch64", target_feature = "aes"))]
use core::arch::aarch64::{uint8x16_t, vaeseq_u8, vaesmcq_u8, vdupq_n_u8, veorq_u8, vld1q_u8, vst1q_u8};

#[cfg(all(target_arch = "aarch64", target_feature = "aes"))]
use std::mem::transmute;

#[cfg(all(target_arch = "aarch64", target_feature = "aes"))]
#[derive(Clone, Copy)]
pub(crate) struct Simd128(uint8x16_t);

#[cfg(all(target_arch = "aarch64", target_feature = "aes"))]
impl Simd128 {
    pub(crate) const fn from(x: u128) -> Self {
        Self(unsafe { transmute(x) })
    }

    /// Read from array pointer (potentially unaligned)
    #[inline(always)]
    pub(crate) fn read(src: &[u8; 16]) -> Self {
        let x = unsafe { vld1q_u8(src.as_ptr()) };
        Self(x)
    }

    /// Write into array pointer (potentially unaligned)
    #[inline(always)]
    pub(crate) fn write(self, dst: &mut [u8; 16]) {
        unsafe {
            vst1q_u8(dst.as_mut_ptr(), self.0);
        }
    }

    #[inline(always)]
    pub(crate) fn aesenc(block: &mut Self, key: &Self) {
        unsafe {
            let zero = vdupq_n_u8(0);
            let x = vaeseq_u8(block.0, zero);
            let y = vaesmcq_u8(x);
            block.0 = veorq_u8(y, key.0);
        }
    }

    #[inline(always)]
    pub(crate) fn pxor(dst: &mut Self, src: &Self) {
        unsafe {
            dst.0 = veorq_u8(dst.0, src.0);
        }
    }
}

#[cfg(not(all(
    any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"),
    target_feature = "aes"
)))]
use aes::{cipher::Block, hazmat::cipher_round, Aes128};

#[cfg(not(all(
    any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"),
    target_feature = "aes"
)))]
#[derive(Clone, Copy)]
pub(crate) struct Simd128(Block<Aes128>);

#[cfg(not(all(
    any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"),
    target_feature = "aes"
)))]
impl Simd128 {
    pub(crate) const fn from(x: u128) -> Self {
        // Block is repr(transparent) over GenericArray<u8, U16>, which has
        // the same size and alignment as [u8; 16].
        Self(unsafe { core::mem::transmute(x.to_le_bytes()) })
    }

    /// Read from array pointer (potentially unaligned)
    #[inline(always)]
    pub(crate) fn read(src: &[u8; 16]) -> Self {
        Self(Block::<Aes128>::clone_from_slice(src))
    }

    /// Write into array pointer (potentially unaligned)
    #[inline(always)]
    pub(crate) fn write(self, dst: &mut [u8; 16]) {
        dst.copy_from_slice(self.0.as_slice());
    }

    /// One AES round (SubBytes, ShiftRows, MixColumns) followed by an XOR
    /// with the key, matching the `_mm_aesenc_si128` intrinsic.
    #[inline(always)]
    pub(crate) fn aesenc(block: &mut Self, key: &Self) {
        cipher_round(&mut block.0, &key.0);
    }

    #[inline(always)]
    pub(crate) fn pxor(dst: &mut Self, src: &Self) {
        for (a, b) in dst.0.as_mut_slice().iter_mut().zip(src.0.as_slice()) {
            *a ^= *b;
        }
    }
}
