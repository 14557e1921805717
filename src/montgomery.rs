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

//! The Elligator2 map onto the Montgomery form of Curve25519, and the
//! birational lift from Montgomery \\(u\\)-coordinates to Edwards points.
//!
//! The Montgomery curve \\( v\^2 = u\^3 + A u\^2 + u \\) with
//! \\(A = 486662\\) is used here only as the intermediate target of the
//! hash-to-point construction; scalar arithmetic stays on the Edwards
//! form.

#![allow(non_snake_case)]

use core::fmt::Debug;

use subtle::Choice;
use subtle::ConditionallyNegatable;
use subtle::ConditionallySelectable;

use crate::constants::{EDWARDS_D, MONTGOMERY_A, MONTGOMERY_A_NEG};
use crate::edwards::EdwardsPoint;
use crate::field::FieldElement;

/// The \\(u\\)-coordinate of a point on the Montgomery form of
/// Curve25519, as 32 little-endian bytes.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct MontgomeryPoint(pub [u8; 32]);

impl Debug for MontgomeryPoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "MontgomeryPoint: {:?}", &self.0)
    }
}

impl MontgomeryPoint {
    /// View this `MontgomeryPoint` as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lift this \\(u\\)-coordinate to the Edwards point whose
    /// \\(x\\)-coordinate has least significant bit equal to `sign`.
    ///
    /// This applies the birational map \\( y = (u-1)/(u+1) \\) followed by
    /// Edwards decompression of \\(y\\) with the chosen sign.  Inversion
    /// of zero yields zero, so the exceptional input \\(u = -1\\) lands on
    /// one of the four-torsion points \\((\pm\sqrt{-1}, 0)\\) rather than
    /// failing.
    ///
    /// The caller must supply the \\(u\\)-coordinate of a curve point
    /// (as `elligator_encode` does); for such inputs the square root
    /// taken during decompression is always exact.
    pub(crate) fn to_edwards(&self, sign: u8) -> EdwardsPoint {
        let u = FieldElement::from_bytes(self.as_bytes());
        let one = FieldElement::ONE;

        let y = &(&u - &one) * &(&u + &one).invert();

        // Edwards decompression of y with the given x sign.
        let yy = y.square();
        let numerator = &yy - &one;
        let denominator = &(&yy * &EDWARDS_D) + &one;
        let (_, mut x) = FieldElement::sqrt_ratio_i(&numerator, &denominator);
        x.conditional_negate(x.is_negative() ^ Choice::from(sign));

        EdwardsPoint {
            X: x,
            Y: y,
            Z: one,
            T: &x * &y,
        }
    }
}

/// Perform the Elligator2 mapping to a Montgomery point.
///
/// Writing the candidate \\( x = -A/(1 + 2r\^2) \\), the output is
/// \\(x\\) itself when the Montgomery curve equation has a solution
/// there, and \\(-x - A\\) (the other preimage candidate) otherwise, so
/// that every field element lands on the curve.  Inversion of zero
/// yields zero, so the exceptional input with \\(1 + 2r\^2 = 0\\) maps
/// to \\(u = 0\\), the point of order two.
///
/// See <https://tools.ietf.org/html/draft-irtf-cfrg-hash-to-curve-10#section-6.7.1>
pub(crate) fn elligator_encode(r_0: &FieldElement) -> MontgomeryPoint {
    let one = FieldElement::ONE;
    let d_1 = &one + &r_0.square2(); /* 2r^2 */

    let d = &MONTGOMERY_A_NEG * &(d_1.invert()); /* A/(1+2r^2) */

    let d_sq = &d.square();
    let au = &MONTGOMERY_A * &d;

    let inner = &(d_sq + &au) + &one;
    let eps = &d * &inner; /* eps = d^3 + Ad^2 + d */

    let (eps_is_sq, _eps) = FieldElement::sqrt_ratio_i(&eps, &one);

    let zero = FieldElement::ZERO;
    let Atemp = FieldElement::conditional_select(&MONTGOMERY_A, &zero, eps_is_sq); /* 0, or A if nonsquare*/
    let mut u = &d + &Atemp; /* d, or d+A if nonsquare */
    u.conditional_negate(!eps_is_sq); /* d, or -d-A if nonsquare */

    MontgomeryPoint(u.as_bytes())
}
