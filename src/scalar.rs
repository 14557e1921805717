// -*- mode: rust; -*-
//
// This file is part of vxeddsa-dalek.
// Copyright (c) 2016-2021 isis lovecruft
// Copyright (c) 2016-2021 Henry de Valence
// See LICENSE for licensing information.
//
// Authors:
// - isis agora lovecruft <isis@patternsinthevoid.net>
// - Henry de Valence <hdevalence@hdevalence.ca>

//! Arithmetic on scalars (integers mod the group order).
//!
//! The `Scalar` type holds an integer \\(s < 2\^{255}\\) as 32 bytes in
//! little-endian order; reduced arithmetic mod the group order
//! \\( \ell = 2\^{252} + 27742317777372353535851937790883648493 \\) is
//! carried out on an unpacked representation of five \\(52\\)-bit limbs
//! with Montgomery multiplication.
//!
//! Scalars produced by the reducing constructors are canonical
//! (\\(s < \ell\\)); [`Scalar::from_bits`] additionally admits the
//! unreduced "clamped integer" scalars used as private keys, which the
//! scalar-multiplication routines accept directly.

use core::fmt::Debug;
use core::ops::{Add, AddAssign};
use core::ops::{Index, Neg};
use core::ops::{Mul, MulAssign};
use core::ops::{Sub, SubAssign};

use digest::consts::U64;
use digest::Digest;

use subtle::Choice;
use subtle::ConditionallySelectable;
use subtle::ConstantTimeEq;
use subtle::CtOption;

use zeroize::Zeroize;

use crate::constants;

/// The `Scalar` struct holds an integer \\(s < 2\^{255} \\) which
/// represents an element of \\(\mathbb Z / \ell\\).
#[derive(Copy, Clone, Hash)]
pub struct Scalar {
    /// `bytes` is a little-endian byte encoding of an integer representing a scalar modulo the
    /// group order.
    ///
    /// # Invariant
    ///
    /// The integer representing this scalar is less than \\(2\^{255}\\), and the high bit of
    /// `bytes[31]` is clear; canonical scalars are further less than \\(\ell\\).
    pub(crate) bytes: [u8; 32],
}

impl Scalar {
    /// The scalar \\( 0 \\).
    pub const ZERO: Self = Self { bytes: [0u8; 32] };

    /// Construct a `Scalar` by reducing a 256-bit little-endian integer
    /// modulo the group order \\( \ell \\).
    pub fn from_bytes_mod_order(bytes: [u8; 32]) -> Scalar {
        // Temporarily allow s_unreduced.bytes > 2^255 ...
        let s_unreduced = Scalar { bytes };

        // Then reduce mod the group order and return the reduced representative.
        let s = s_unreduced.reduce();
        debug_assert_eq!(0u8, s[31] >> 7);

        s
    }

    /// Construct a `Scalar` by reducing a 512-bit little-endian integer
    /// modulo the group order \\( \ell \\).
    pub fn from_bytes_mod_order_wide(input: &[u8; 64]) -> Scalar {
        UnpackedScalar::from_bytes_wide(input).pack()
    }

    /// Attempt to construct a `Scalar` from a canonical byte representation.
    ///
    /// # Return
    ///
    /// - `Some(s)`, where `s` is the `Scalar` corresponding to `bytes`,
    ///   if `bytes` is a canonical byte representation (i.e. it represents an
    ///   integer less than \\( \ell \\));
    /// - `None` if `bytes` is not a canonical byte representation.
    pub fn from_canonical_bytes(bytes: [u8; 32]) -> CtOption<Scalar> {
        let high_bit_unset = (bytes[31] >> 7).ct_eq(&0);
        let candidate = Scalar { bytes };
        CtOption::new(candidate, high_bit_unset & candidate.is_canonical())
    }

    /// Construct a `Scalar` from the low 255 bits of a 256-bit integer,
    /// without checking that the scalar is reduced mod \\( \ell \\).
    ///
    /// This is the constructor for the clamped-integer secret scalars;
    /// the multiplication routines and the reducing arithmetic below
    /// handle such unreduced values correctly.
    pub(crate) fn from_bits(bytes: [u8; 32]) -> Scalar {
        let mut s = Scalar { bytes };
        // Ensure invariant holds
        s.bytes[31] &= 0b0111_1111;
        s
    }

    /// Hash a 512-bit digest into a `Scalar`.
    pub fn from_hash<D>(hash: D) -> Scalar
    where
        D: Digest<OutputSize = U64>,
    {
        let mut output = [0u8; 64];
        output.copy_from_slice(hash.finalize().as_slice());
        Scalar::from_bytes_mod_order_wide(&output)
    }

    /// View the little-endian byte encoding of this `Scalar`.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Convert this `Scalar` to its underlying sequence of bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.bytes
    }

    /// Unpack this `Scalar` to five 52-bit limbs.
    fn unpack(&self) -> UnpackedScalar {
        UnpackedScalar::from_bytes(&self.bytes)
    }

    /// Reduce this `Scalar` modulo \\( \ell \\).
    fn reduce(&self) -> Scalar {
        let x = self.unpack();
        let xr = UnpackedScalar::mul_internal(&x, &constants::R);
        let x_mod_l = UnpackedScalar::montgomery_reduce(&xr);
        x_mod_l.pack()
    }

    /// Check whether this `Scalar` is the canonical representative mod \\( \ell \\).
    fn is_canonical(&self) -> Choice {
        self.ct_eq(&self.reduce())
    }

    /// Write this scalar in radix 16, with coefficients in \\([-8,8)\\),
    /// i.e., compute \\(a\_i\\) such that
    /// $$
    ///    a = a\_0 + a\_1 16\^1 + \cdots + a_{63} 16\^{63},
    /// $$
    /// with \\(-8 \leq a_i < 8\\) for \\(0 \leq i < 63\\) and \\(-8 \leq a_{63} \leq 8\\).
    pub(crate) fn as_radix_16(&self) -> [i8; 64] {
        debug_assert!(self[31] <= 127);
        let mut output = [0i8; 64];

        // Step 1: change radix.
        // Convert from radix 256 (bytes) to radix 16 (nibbles)
        #[inline(always)]
        fn bot_half(x: u8) -> u8 {
            x & 15
        }
        #[inline(always)]
        fn top_half(x: u8) -> u8 {
            (x >> 4) & 15
        }

        for i in 0..32 {
            output[2 * i] = bot_half(self[i]) as i8;
            output[2 * i + 1] = top_half(self[i]) as i8;
        }
        // Precondition note: since self[31] <= 127, output[63] <= 7

        // Step 2: recenter coefficients from [0,16) to [-8,8)
        for i in 0..63 {
            let carry = (output[i] + 8) >> 4;
            output[i] -= carry << 4;
            output[i + 1] += carry;
        }
        // Precondition note: output[63] is not recentered.  It
        // increases by carry <= 1.  Thus output[63] <= 8.

        output
    }

    /// Compute a width-\\(w\\) "Non-Adjacent Form" of this scalar.
    ///
    /// A width-\\(w\\) NAF of a positive integer \\(k\\) is an expression
    /// $$
    /// k = \sum_{i=0}\^m n\_i 2\^i,
    /// $$
    /// where each nonzero coefficient \\(n\_i\\) is odd and bounded by
    /// \\(|n\_i| < 2\^{w-1}\\), \\(n\_{m}\\) is nonzero, and at most one of
    /// any \\(w\\) consecutive coefficients is nonzero.
    ///
    /// Intuitively, this is like a binary expansion, except that we
    /// allow some coefficients to be negative, sparsifying the
    /// representation at the cost of a lookup table of small multiples.
    pub(crate) fn non_adjacent_form(&self, w: usize) -> [i8; 256] {
        // required by the NAF definition
        debug_assert!(w >= 2);
        // required so that the NAF digits fit in i8
        debug_assert!(w <= 8);
        // required so the digit-window reads below stay in bounds
        debug_assert!(self[31] <= 127);

        let mut naf = [0i8; 256];

        let mut x_u64 = [0u64; 5];
        read_le_u64_into(&self.bytes, &mut x_u64[0..4]);

        let width = 1 << w;
        let window_mask = width - 1;

        let mut pos = 0;
        let mut carry = 0;
        while pos < 256 {
            // Construct a buffer of bits of the scalar, starting at bit `pos`
            let u64_idx = pos / 64;
            let bit_idx = pos % 64;
            let bit_buf: u64 = if bit_idx < 64 - w {
                // This window's bits are contained in a single u64
                x_u64[u64_idx] >> bit_idx
            } else {
                // Combine the current u64's bits with the bits from the next u64
                (x_u64[u64_idx] >> bit_idx) | (x_u64[1 + u64_idx] << (64 - bit_idx))
            };

            // Add the carry into the current window
            let window = carry + (bit_buf & window_mask);

            if window & 1 == 0 {
                // If the window value is even, preserve the carry and continue.
                // Why is the carry preserved?
                // If carry == 0 and window & 1 == 0, then the next carry should be 0
                // If carry == 1 and window & 1 == 0, then bit_buf & 1 == 1 so the next carry should be 1
                pos += 1;
                continue;
            }

            if window < width / 2 {
                carry = 0;
                naf[pos] = window as i8;
            } else {
                carry = 1;
                naf[pos] = (window as i8).wrapping_sub(width as i8);
            }

            pos += w;
        }

        naf
    }
}

/// Read one or more u64s stored as little endian bytes.
///
/// # Panics
/// Panics if `src.len() != 8 * dst.len()`.
fn read_le_u64_into(src: &[u8], dst: &mut [u64]) {
    assert!(
        src.len() == 8 * dst.len(),
        "src.len() = {}, dst.len() = {}",
        src.len(),
        dst.len()
    );
    for (bytes, val) in src.chunks(8).zip(dst.iter_mut()) {
        *val = u64::from_le_bytes(
            bytes
                .try_into()
                .expect("Incorrect src length, should be 8 * dst.len()"),
        );
    }
}

/// Clamp the bytes of a secret scalar: clear the low three bits, clear the
/// high bit, and set the second-highest bit.
///
/// The result, as an integer, is a multiple of the cofactor in
/// \\([2\^{254}, 2\^{255})\\), so it cannot leak its multiple-of-eight
/// structure into small-subgroup components and always has a fixed top
/// bit for ladder implementations.
pub const fn clamp_integer(mut bytes: [u8; 32]) -> [u8; 32] {
    bytes[0] &= 0b1111_1000;
    bytes[31] &= 0b0111_1111;
    bytes[31] |= 0b0100_0000;
    bytes
}

impl Debug for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Scalar{{\n\tbytes: {:?},\n}}", &self.bytes)
    }
}

impl Eq for Scalar {}
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.bytes.ct_eq(&other.bytes)
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut bytes = [0u8; 32];
        for i in 0..32 {
            bytes[i] = u8::conditional_select(&a.bytes[i], &b.bytes[i], choice);
        }
        Scalar { bytes }
    }
}

impl Index<usize> for Scalar {
    type Output = u8;

    /// Index the bytes of the representative for this `Scalar`.  Mutation is not permitted.
    fn index(&self, _index: usize) -> &u8 {
        &(self.bytes[_index])
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
    }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn mul(self, rhs: &'b Scalar) -> Scalar {
        UnpackedScalar::mul(&self.unpack(), &rhs.unpack()).pack()
    }
}

impl<'b> MulAssign<&'b Scalar> for Scalar {
    fn mul_assign(&mut self, rhs: &'b Scalar) {
        *self = UnpackedScalar::mul(&self.unpack(), &rhs.unpack()).pack();
    }
}

define_mul_variants!(LHS = Scalar, RHS = Scalar, Output = Scalar);

impl<'a, 'b> Add<&'b Scalar> for &'a Scalar {
    type Output = Scalar;

    #[allow(non_snake_case)]
    fn add(self, rhs: &'b Scalar) -> Scalar {
        // The UnpackedScalar::add function produces reduced outputs if the inputs are reduced.
        // However, these inputs may not be reduced -- they might come from Scalar::from_bits.  So
        // after adding, convert the result to Montgomery form and then back, which reduces it.
        let sum = UnpackedScalar::add(&self.unpack(), &rhs.unpack());
        let sum_R = UnpackedScalar::mul_internal(&sum, &constants::R);
        let sum_mod_l = UnpackedScalar::montgomery_reduce(&sum_R);
        sum_mod_l.pack()
    }
}

impl<'b> AddAssign<&'b Scalar> for Scalar {
    fn add_assign(&mut self, rhs: &'b Scalar) {
        *self = &*self + rhs;
    }
}

define_add_variants!(LHS = Scalar, RHS = Scalar, Output = Scalar);

impl<'a, 'b> Sub<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn sub(self, rhs: &'b Scalar) -> Scalar {
        // The UnpackedScalar::sub function requires reduced inputs.  So
        // reduce both operands via Montgomery round trips first.
        let self_R = UnpackedScalar::mul_internal(&self.unpack(), &constants::R);
        let self_mod_l = UnpackedScalar::montgomery_reduce(&self_R);
        let rhs_R = UnpackedScalar::mul_internal(&rhs.unpack(), &constants::R);
        let rhs_mod_l = UnpackedScalar::montgomery_reduce(&rhs_R);

        UnpackedScalar::sub(&self_mod_l, &rhs_mod_l).pack()
    }
}

impl<'b> SubAssign<&'b Scalar> for Scalar {
    fn sub_assign(&mut self, rhs: &'b Scalar) {
        *self = &*self - rhs;
    }
}

define_sub_variants!(LHS = Scalar, RHS = Scalar, Output = Scalar);

impl<'a> Neg for &'a Scalar {
    type Output = Scalar;

    #[allow(non_snake_case)]
    fn neg(self) -> Scalar {
        let self_R = UnpackedScalar::mul_internal(&self.unpack(), &constants::R);
        let self_mod_l = UnpackedScalar::montgomery_reduce(&self_R);
        UnpackedScalar::sub(&UnpackedScalar::ZERO, &self_mod_l).pack()
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        -&self
    }
}

// ------------------------------------------------------------------------
// Unpacked arithmetic mod l, with five 52-bit unsigned limbs
// ------------------------------------------------------------------------

// 51-bit limbs would cover the desired 253-bit range, but isn't large
// enough to reduce a 512-bit number with Montgomery multiplication, so 52
// bits is used instead.  The largest limb in a 5x5 product of 52-bit limbs
// is
//
// ```text
// (0xfffffffffffff^2) * 5 = 0x4ffffffffffff60000000000005 (107 bits).
// ```

/// The `UnpackedScalar` struct represents an element in
/// \\(\mathbb Z / \ell \mathbb Z\\) as 5 \\(52\\)-bit limbs.
#[derive(Copy, Clone)]
pub(crate) struct UnpackedScalar(pub(crate) [u64; 5]);

/// u64 * u64 = u128 multiply helper
#[inline(always)]
const fn m(x: u64, y: u64) -> u128 {
    (x as u128) * (y as u128)
}

const MASK_52: u64 = (1u64 << 52) - 1;

impl UnpackedScalar {
    /// The scalar \\( 0 \\).
    pub const ZERO: UnpackedScalar = UnpackedScalar([0, 0, 0, 0, 0]);

    /// Unpack a 32 byte / 256 bit scalar into 5 52-bit limbs.
    pub fn from_bytes(bytes: &[u8; 32]) -> UnpackedScalar {
        let mut words = [0u64; 4];
        for i in 0..4 {
            for j in 0..8 {
                words[i] |= (bytes[(i * 8) + j] as u64) << (j * 8);
            }
        }

        let top_mask = (1u64 << 48) - 1;
        let mut s = UnpackedScalar::ZERO;

        s.0[0] = words[0] & MASK_52;
        s.0[1] = ((words[0] >> 52) | (words[1] << 12)) & MASK_52;
        s.0[2] = ((words[1] >> 40) | (words[2] << 24)) & MASK_52;
        s.0[3] = ((words[2] >> 28) | (words[3] << 36)) & MASK_52;
        s.0[4] = (words[3] >> 16) & top_mask;

        s
    }

    /// Reduce a 64 byte / 512 bit scalar mod l.
    pub fn from_bytes_wide(bytes: &[u8; 64]) -> UnpackedScalar {
        let mut words = [0u64; 8];
        for i in 0..8 {
            for j in 0..8 {
                words[i] |= (bytes[(i * 8) + j] as u64) << (j * 8);
            }
        }

        let mut lo = UnpackedScalar::ZERO;
        let mut hi = UnpackedScalar::ZERO;

        lo.0[0] = words[0] & MASK_52;
        lo.0[1] = ((words[0] >> 52) | (words[1] << 12)) & MASK_52;
        lo.0[2] = ((words[1] >> 40) | (words[2] << 24)) & MASK_52;
        lo.0[3] = ((words[2] >> 28) | (words[3] << 36)) & MASK_52;
        lo.0[4] = ((words[3] >> 16) | (words[4] << 48)) & MASK_52;
        hi.0[0] = (words[4] >> 4) & MASK_52;
        hi.0[1] = ((words[4] >> 56) | (words[5] << 8)) & MASK_52;
        hi.0[2] = ((words[5] >> 44) | (words[6] << 20)) & MASK_52;
        hi.0[3] = ((words[6] >> 32) | (words[7] << 32)) & MASK_52;
        hi.0[4] = words[7] >> 20;

        lo = UnpackedScalar::montgomery_mul(&lo, &constants::R); // (lo * R) / R = lo
        hi = UnpackedScalar::montgomery_mul(&hi, &constants::RR); // (hi * R^2) / R = hi * R

        UnpackedScalar::add(&hi, &lo)
    }

    /// Pack the limbs of this `UnpackedScalar` into a `Scalar`.
    #[rustfmt::skip] // keep alignment of s[*] calculations
    pub fn pack(&self) -> Scalar {
        let mut s = [0u8; 32];

        s[ 0] =  (self.0[0] >>  0)                      as u8;
        s[ 1] =  (self.0[0] >>  8)                      as u8;
        s[ 2] =  (self.0[0] >> 16)                      as u8;
        s[ 3] =  (self.0[0] >> 24)                      as u8;
        s[ 4] =  (self.0[0] >> 32)                      as u8;
        s[ 5] =  (self.0[0] >> 40)                      as u8;
        s[ 6] = ((self.0[0] >> 48) | (self.0[1] << 4))  as u8;
        s[ 7] =  (self.0[1] >>  4)                      as u8;
        s[ 8] =  (self.0[1] >> 12)                      as u8;
        s[ 9] =  (self.0[1] >> 20)                      as u8;
        s[10] =  (self.0[1] >> 28)                      as u8;
        s[11] =  (self.0[1] >> 36)                      as u8;
        s[12] =  (self.0[1] >> 44)                      as u8;
        s[13] =  (self.0[2] >>  0)                      as u8;
        s[14] =  (self.0[2] >>  8)                      as u8;
        s[15] =  (self.0[2] >> 16)                      as u8;
        s[16] =  (self.0[2] >> 24)                      as u8;
        s[17] =  (self.0[2] >> 32)                      as u8;
        s[18] =  (self.0[2] >> 40)                      as u8;
        s[19] = ((self.0[2] >> 48) | (self.0[3] << 4))  as u8;
        s[20] =  (self.0[3] >>  4)                      as u8;
        s[21] =  (self.0[3] >> 12)                      as u8;
        s[22] =  (self.0[3] >> 20)                      as u8;
        s[23] =  (self.0[3] >> 28)                      as u8;
        s[24] =  (self.0[3] >> 36)                      as u8;
        s[25] =  (self.0[3] >> 44)                      as u8;
        s[26] =  (self.0[4] >>  0)                      as u8;
        s[27] =  (self.0[4] >>  8)                      as u8;
        s[28] =  (self.0[4] >> 16)                      as u8;
        s[29] =  (self.0[4] >> 24)                      as u8;
        s[30] =  (self.0[4] >> 32)                      as u8;
        s[31] =  (self.0[4] >> 40)                      as u8;

        Scalar { bytes: s }
    }

    /// Compute `a + b` (mod l).
    pub fn add(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
        let mut sum = UnpackedScalar::ZERO;

        // a + b
        let mut carry: u64 = 0;
        for i in 0..5 {
            carry = a.0[i] + b.0[i] + (carry >> 52);
            sum.0[i] = carry & MASK_52;
        }

        // subtract l if the sum is >= l
        UnpackedScalar::sub(&sum, &constants::L)
    }

    /// Compute `a - b` (mod l).
    pub fn sub(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
        let mut difference = UnpackedScalar::ZERO;

        // a - b
        let mut borrow: u64 = 0;
        for i in 0..5 {
            borrow = a.0[i].wrapping_sub(b.0[i] + (borrow >> 63));
            difference.0[i] = borrow & MASK_52;
        }

        // conditionally add l if the difference is negative
        let underflow_mask = ((borrow >> 63) ^ 1).wrapping_sub(1);
        let mut carry: u64 = 0;
        for i in 0..5 {
            carry = (carry >> 52) + difference.0[i] + (constants::L.0[i] & underflow_mask);
            difference.0[i] = carry & MASK_52;
        }

        difference
    }

    /// Compute `a * b`.
    #[inline(always)]
    #[rustfmt::skip] // keep alignment of z[*] calculations
    pub(crate) fn mul_internal(a: &UnpackedScalar, b: &UnpackedScalar) -> [u128; 9] {
        let a = &a.0;
        let b = &b.0;
        let mut z = [0u128; 9];

        z[0] = m(a[0], b[0]);
        z[1] = m(a[0], b[1]) + m(a[1], b[0]);
        z[2] = m(a[0], b[2]) + m(a[1], b[1]) + m(a[2], b[0]);
        z[3] = m(a[0], b[3]) + m(a[1], b[2]) + m(a[2], b[1]) + m(a[3], b[0]);
        z[4] = m(a[0], b[4]) + m(a[1], b[3]) + m(a[2], b[2]) + m(a[3], b[1]) + m(a[4], b[0]);
        z[5] =                 m(a[1], b[4]) + m(a[2], b[3]) + m(a[3], b[2]) + m(a[4], b[1]);
        z[6] =                                 m(a[2], b[4]) + m(a[3], b[3]) + m(a[4], b[2]);
        z[7] =                                                 m(a[3], b[4]) + m(a[4], b[3]);
        z[8] =                                                                 m(a[4], b[4]);

        z
    }

    /// Compute `limbs/R` (mod l), where R is the Montgomery modulus 2^260.
    #[inline(always)]
    #[rustfmt::skip] // keep alignment of n* and r* calculations
    pub(crate) fn montgomery_reduce(limbs: &[u128; 9]) -> UnpackedScalar {
        #[inline(always)]
        fn part1(sum: u128) -> (u128, u64) {
            let p = (sum as u64).wrapping_mul(constants::LFACTOR) & MASK_52;
            ((sum + m(p, constants::L.0[0])) >> 52, p)
        }

        #[inline(always)]
        fn part2(sum: u128) -> (u128, u64) {
            let w = (sum as u64) & MASK_52;
            (sum >> 52, w)
        }

        // note: l[3] is zero, so its multiples can be skipped
        let l = &constants::L;

        // the first half computes the Montgomery adjustment factor n, and begins adding n*l to
        // make limbs divisible by R
        let (carry, n0) = part1(        limbs[0]);
        let (carry, n1) = part1(carry + limbs[1] + m(n0, l.0[1]));
        let (carry, n2) = part1(carry + limbs[2] + m(n0, l.0[2]) + m(n1, l.0[1]));
        let (carry, n3) = part1(carry + limbs[3]                 + m(n1, l.0[2]) + m(n2, l.0[1]));
        let (carry, n4) = part1(carry + limbs[4] + m(n0, l.0[4])                 + m(n2, l.0[2]) + m(n3, l.0[1]));

        // limbs is divisible by R now, so we can divide by R by simply storing the upper half as
        // the result
        let (carry, r0) = part2(carry + limbs[5]                 + m(n1, l.0[4])                 + m(n3, l.0[2]) + m(n4, l.0[1]));
        let (carry, r1) = part2(carry + limbs[6]                                 + m(n2, l.0[4])                 + m(n4, l.0[2]));
        let (carry, r2) = part2(carry + limbs[7]                                                 + m(n3, l.0[4])                );
        let (carry, r3) = part2(carry + limbs[8]                                                                 + m(n4, l.0[4]));
        let         r4 = carry as u64;

        // result may be >= l, so attempt to subtract l
        UnpackedScalar::sub(&UnpackedScalar([r0, r1, r2, r3, r4]), l)
    }

    /// Compute `a * b` (mod l).
    #[inline(never)]
    pub fn mul(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
        let ab = UnpackedScalar::montgomery_reduce(&UnpackedScalar::mul_internal(a, b));
        UnpackedScalar::montgomery_reduce(&UnpackedScalar::mul_internal(&ab, &constants::RR))
    }

    /// Compute `(a * b) / R` (mod l), where R is the Montgomery modulus 2^260.
    #[inline(never)]
    pub fn montgomery_mul(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
        UnpackedScalar::montgomery_reduce(&UnpackedScalar::mul_internal(a, b))
    }
}
