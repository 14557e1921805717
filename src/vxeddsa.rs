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

//! The VXEdDSA verifiable random function.
//!
//! The scheme works over the Ed25519 group.  A private scalar \\(a\\)
//! (a clamped 32-byte integer, sign-normalized so that the compressed
//! public key \\(A = aB\\) carries sign bit zero) evaluates the VRF on a
//! message \\(M\\) as
//!
//! $$ V = a \cdot B_v, \qquad B_v = 8 \cdot \mathrm{Ell2}(H_2(A \\| M)), $$
//!
//! where \\(\mathrm{Ell2}\\) is the Elligator2 hash-to-point and
//! \\(H_i\\) is SHA-512 prefixed with the 32-byte little-endian encoding
//! of \\(2^{256} - 1 - i\\).  The proof is a Schnorr-style
//! equality-of-discrete-log argument, made non-interactive with the
//! Fiat-Shamir transform, showing that \\(V\\) and \\(A\\) share the
//! exponent \\(a\\) over the bases \\(B_v\\) and \\(B\\):
//!
//! $$ r = H_3(a \\| V \\| Z) \bmod \ell, \quad
//!    h = H_4(A \\| V \\| rB \\| rB_v \\| M) \bmod \ell, \quad
//!    s = r + ha \bmod \ell, $$
//!
//! with the proof serialized as \\(V \\| h \\| s\\).  The 64 random
//! bytes \\(Z\\) harden the nonce against fault attacks; the scheme
//! stays secure with \\(Z = 0\\), and \\(V\\) never depends on \\(Z\\).

#![allow(non_snake_case)]

use core::fmt::Debug;

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

use crate::edwards::{vartime, CompressedEdwardsY, EdwardsPoint};
use crate::errors::{InternalError, SignatureError};
use crate::field::FieldElement;
use crate::montgomery::elligator_encode;
use crate::scalar::{clamp_integer, Scalar};

/// The length of a seed for VRF key generation, in bytes.
pub const SEED_LENGTH: usize = 32;
/// The length of a VRF public key, in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// The length of a serialized VRF private key, in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 64;
/// The length of a VRF output, in bytes.
pub const VRF_OUTPUT_LENGTH: usize = 32;
/// The length of a VRF proof, in bytes.
pub const PROOF_LENGTH: usize = 96;
/// The length of the randomizer drawn for each proof, in bytes.
pub const RANDOMIZER_LENGTH: usize = 64;

/// Domain separator for the VRF basepoint hash: the 32-byte
/// little-endian encoding of \\(2\^{256} - 1 - 2\\).
const VRF_BASEPOINT_DOMAIN: [u8; 32] = [
    0xfd, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff,
];

/// Domain separator for the nonce hash: the 32-byte little-endian
/// encoding of \\(2\^{256} - 1 - 3\\).
const NONCE_DOMAIN: [u8; 32] = [
    0xfc, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff,
];

/// Domain separator for the challenge hash: the 32-byte little-endian
/// encoding of \\(2\^{256} - 1 - 4\\).
const CHALLENGE_DOMAIN: [u8; 32] = [
    0xfb, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff,
];

/// Hash a public key and a message to a point of the prime-order
/// subgroup, for use as the VRF basepoint \\(B_v\\).
///
/// The top bit of the digest selects the sign of the Edwards
/// \\(x\\)-coordinate; the low 255 bits map through Elligator2 onto the
/// Montgomery curve, and the cofactor multiplication clears the torsion
/// component of the lift.
fn hash_to_point(public_key: &CompressedEdwardsY, message: &[u8]) -> EdwardsPoint {
    let mut h = Sha512::new();
    h.update(VRF_BASEPOINT_DOMAIN);
    h.update(public_key.as_bytes());
    h.update(message);
    let digest = h.finalize();

    let sign_bit = (digest[31] & 0x80) >> 7;
    let mut fe_bytes = [0u8; 32];
    fe_bytes.copy_from_slice(&digest[..32]);
    fe_bytes[31] &= 0x7f;

    let r_0 = FieldElement::from_bytes(&fe_bytes);
    elligator_encode(&r_0).to_edwards(sign_bit).mul_by_cofactor()
}

/// Compute the Fiat–Shamir challenge scalar
/// \\( h = H_4(A \\| V \\| R \\| R_v \\| M) \bmod \ell \\).
fn challenge_scalar(
    A: &CompressedEdwardsY,
    V: &CompressedEdwardsY,
    R: &CompressedEdwardsY,
    Rv: &CompressedEdwardsY,
    message: &[u8],
) -> Scalar {
    let mut h = Sha512::new();
    h.update(CHALLENGE_DOMAIN);
    h.update(A.as_bytes());
    h.update(V.as_bytes());
    h.update(R.as_bytes());
    h.update(Rv.as_bytes());
    h.update(message);
    Scalar::from_hash(h)
}

// ------------------------------------------------------------------------
// VRF output
// ------------------------------------------------------------------------

/// The output of the VRF on a message: the compressed point
/// \\( V = a B_v \\).
///
/// For a fixed key, the output is a deterministic function of the
/// message; it is pseudorandom to anyone not holding the private key.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct VrfOutput(pub(crate) [u8; VRF_OUTPUT_LENGTH]);

impl Debug for VrfOutput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "VrfOutput: {:?}", &self.0)
    }
}

impl AsRef<[u8]> for VrfOutput {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; VRF_OUTPUT_LENGTH]> for VrfOutput {
    fn from(bytes: [u8; VRF_OUTPUT_LENGTH]) -> VrfOutput {
        VrfOutput(bytes)
    }
}

impl VrfOutput {
    /// View this VRF output as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; VRF_OUTPUT_LENGTH] {
        &self.0
    }

    /// Copy this VRF output to an array of bytes.
    pub fn to_bytes(&self) -> [u8; VRF_OUTPUT_LENGTH] {
        self.0
    }
}

// ------------------------------------------------------------------------
// Proofs
// ------------------------------------------------------------------------

/// A VXEdDSA proof, as produced by [`PrivateKey::prove`].
///
/// The wire format is the 96-byte concatenation
/// \\( V \\| h \\| s \\): the VRF output point, the challenge scalar,
/// and the response scalar, each 32 bytes.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Proof {
    /// The VRF output point `V`.
    pub(crate) V: CompressedEdwardsY,
    /// The challenge, an output of the challenge hash in honest proofs.
    pub(crate) h: [u8; 32],
    /// The response scalar; must be canonical mod \\( \ell \\).
    pub(crate) s: [u8; 32],
}

impl Debug for Proof {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Proof{{\n\tV: {:?},\n\th: {:?},\n\ts: {:?}\n}}",
            &self.V, &self.h, &self.s
        )
    }
}

impl Proof {
    /// Convert this proof to its 96-byte wire form.
    #[rustfmt::skip] // keep the three copy statements aligned
    pub fn to_bytes(&self) -> [u8; PROOF_LENGTH] {
        let mut bytes = [0u8; PROOF_LENGTH];

        bytes[..32].copy_from_slice(self.V.as_bytes());
        bytes[32..64].copy_from_slice(&self.h);
        bytes[64..].copy_from_slice(&self.s);
        bytes
    }

    /// Construct a `Proof` from its 96-byte wire form.
    ///
    /// The parts are not validated here: an unparseable `V` or an
    /// out-of-range `s` is reported as an ordinary verification failure
    /// by [`PublicKey::verify`], not as a parse error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Proof, SignatureError> {
        if bytes.len() != PROOF_LENGTH {
            return Err(SignatureError(InternalError::BytesLengthError {
                name: "Proof",
                length: PROOF_LENGTH,
            }));
        }

        let mut V = [0u8; 32];
        let mut h = [0u8; 32];
        let mut s = [0u8; 32];
        V.copy_from_slice(&bytes[..32]);
        h.copy_from_slice(&bytes[32..64]);
        s.copy_from_slice(&bytes[64..]);

        Ok(Proof {
            V: CompressedEdwardsY(V),
            h,
            s,
        })
    }

    /// The VRF output this proof attests to (the first 32 proof bytes).
    pub fn vrf_output(&self) -> VrfOutput {
        VrfOutput(self.V.to_bytes())
    }
}

// ------------------------------------------------------------------------
// Public keys
// ------------------------------------------------------------------------

/// A VXEdDSA public key: a compressed Edwards point \\( A = a B \\).
///
/// Keys produced by this crate always carry sign bit zero, by the
/// key-pair normalization performed at generation time; foreign keys
/// with the sign bit set verify like any other point.
#[derive(Copy, Clone)]
pub struct PublicKey(pub(crate) CompressedEdwardsY, pub(crate) EdwardsPoint);

impl Debug for PublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PublicKey({:?})", self.0)
    }
}

impl ConstantTimeEq for PublicKey {
    fn ct_eq(&self, other: &PublicKey) -> Choice {
        self.as_bytes().ct_eq(other.as_bytes())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &PublicKey) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for PublicKey {}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PublicKey {
    /// View this public key as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.0.as_bytes()
    }

    /// Copy this public key to an array of bytes.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Construct a `PublicKey` from a slice of bytes.
    ///
    /// # Returns
    ///
    /// A `Result` whose okay value is a `PublicKey`, or whose error
    /// value is a `SignatureError` describing the error that occurred:
    /// either a length mismatch or a point decompression failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<PublicKey, SignatureError> {
        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(SignatureError(InternalError::BytesLengthError {
                name: "PublicKey",
                length: PUBLIC_KEY_LENGTH,
            }));
        }
        let mut compressed_bytes = [0u8; 32];
        compressed_bytes.copy_from_slice(bytes);
        let compressed = CompressedEdwardsY(compressed_bytes);

        let point = compressed
            .decompress()
            .ok_or(SignatureError(InternalError::PointDecompressionError))?;

        Ok(PublicKey(compressed, point))
    }

    /// Verify that `proof` attests to `vrf_output` being the VRF output
    /// for `message` under this public key.
    ///
    /// All failure causes collapse to `false`: a mismatched output, an
    /// undecodable or small-order point, an out-of-range response
    /// scalar, or a failed challenge check are indistinguishable to the
    /// caller.
    pub fn verify(&self, message: &[u8], vrf_output: &VrfOutput, proof: &Proof) -> bool {
        bool::from(proof.V.as_bytes().ct_eq(vrf_output.as_bytes()))
            && self.verify_proof(message, proof).is_some()
    }

    /// Verify `proof` against `message` alone, recovering the VRF
    /// output it attests to.
    ///
    /// Returns `None` if the proof does not verify.
    pub fn verify_proof(&self, message: &[u8], proof: &Proof) -> Option<VrfOutput> {
        let V = proof.V.decompress()?;

        // The response must be a canonical scalar; the challenge is
        // accepted as arbitrary bytes and reduced for the arithmetic
        // below.  A non-canonical challenge can never satisfy the final
        // byte comparison, since the recomputed challenge is reduced.
        let s: Option<Scalar> = Scalar::from_canonical_bytes(proof.s).into();
        let s = s?;
        let h = Scalar::from_bytes_mod_order(proof.h);

        // Reject small-subgroup points: proofs must speak about the
        // prime-order components only.
        if self.1.is_small_order() || V.is_small_order() {
            return None;
        }

        let Bv = hash_to_point(&self.0, message);

        // R = sB - hA and Rv = sBv - hV; for honest proofs these equal
        // the prover's commitments rB and rBv.
        let R = vartime::double_scalar_mul_basepoint(&h, &-&self.1, &s).compress();
        let Rv = vartime::double_scalar_mul(&h, &-&V, &s, &Bv).compress();

        let h_check = challenge_scalar(&self.0, &proof.V, &R, &Rv, message);

        if h_check.as_bytes() == &proof.h {
            Some(proof.vrf_output())
        } else {
            None
        }
    }
}

// ------------------------------------------------------------------------
// Private keys
// ------------------------------------------------------------------------

/// A VXEdDSA private key.
///
/// Holds the sign-normalized secret scalar \\(a\\) together with the
/// cached public key \\(A = aB\\).  The scalar is wiped from memory on
/// drop.
pub struct PrivateKey {
    pub(crate) scalar: Scalar,
    pub(crate) public: PublicKey,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.scalar.zeroize();
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Deliberately elide the scalar.
        write!(f, "PrivateKey{{ public: {:?} }}", self.public)
    }
}

impl<'a> From<&'a PrivateKey> for PublicKey {
    fn from(private_key: &'a PrivateKey) -> PublicKey {
        private_key.public
    }
}

impl PrivateKey {
    /// Derive a `PrivateKey` from a 32-byte seed.
    ///
    /// The seed is clamped into a scalar \\(a_0\\), and the key pair is
    /// normalized so the public key carries sign bit zero: if the
    /// compressed \\(a_0 B\\) has its sign bit set, the secret scalar
    /// becomes \\(-a_0 \bmod \ell\\) and the bit is cleared.  Clamping
    /// sets bit 254, so the public key is never the identity.
    pub fn from_seed(seed: &[u8; SEED_LENGTH]) -> PrivateKey {
        let scalar_raw = Scalar::from_bits(clamp_integer(*seed));
        let A = EdwardsPoint::mul_base(&scalar_raw);
        let mut compressed = A.compress();

        let sign = Choice::from(compressed.0[31] >> 7);
        let scalar = Scalar::conditional_select(&scalar_raw, &-&scalar_raw, sign);
        let point = EdwardsPoint::conditional_select(&A, &-&A, sign);
        compressed.0[31] &= 0x7f;

        PrivateKey {
            scalar,
            public: PublicKey(compressed, point),
        }
    }

    /// Generate a `PrivateKey` by reading a 32-byte seed from `csprng`.
    ///
    /// # Returns
    ///
    /// An `Err` wrapping the entropy failure if the generator could not
    /// supply the seed bytes.
    pub fn generate<R>(csprng: &mut R) -> Result<PrivateKey, SignatureError>
    where
        R: CryptoRng + RngCore,
    {
        let mut seed = [0u8; SEED_LENGTH];
        csprng
            .try_fill_bytes(&mut seed)
            .map_err(|_| SignatureError(InternalError::EntropyError))?;

        let key = PrivateKey::from_seed(&seed);
        seed.zeroize();
        Ok(key)
    }

    /// Serialize this private key as the 64-byte concatenation of the
    /// secret scalar and the compressed public key.
    ///
    /// The format is private to this crate; it is not interoperable
    /// with other VXEdDSA libraries.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        let mut bytes = [0u8; PRIVATE_KEY_LENGTH];
        bytes[..32].copy_from_slice(self.scalar.as_bytes());
        bytes[32..].copy_from_slice(self.public.as_bytes());
        bytes
    }

    /// Construct a `PrivateKey` from the output of [`PrivateKey::to_bytes`].
    ///
    /// The public half is recomputed from the scalar and must match the
    /// stored copy; a handle whose halves disagree is rejected rather
    /// than trusted.
    pub fn from_bytes(bytes: &[u8]) -> Result<PrivateKey, SignatureError> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(SignatureError(InternalError::BytesLengthError {
                name: "PrivateKey",
                length: PRIVATE_KEY_LENGTH,
            }));
        }

        let mut scalar_bytes = [0u8; 32];
        let mut public_bytes = [0u8; 32];
        scalar_bytes.copy_from_slice(&bytes[..32]);
        public_bytes.copy_from_slice(&bytes[32..]);
        let scalar = Scalar::from_bits(scalar_bytes);

        let compressed = EdwardsPoint::mul_base(&scalar).compress();
        if bool::from(!compressed.as_bytes().ct_eq(&public_bytes)) {
            return Err(SignatureError(InternalError::KeypairMismatchError));
        }

        let point = compressed
            .decompress()
            .ok_or(SignatureError(InternalError::PointDecompressionError))?;

        Ok(PrivateKey {
            scalar,
            public: PublicKey(compressed, point),
        })
    }

    /// The public key corresponding to this private key.
    pub fn public(&self) -> PublicKey {
        self.public
    }

    /// Evaluate the VRF on `message`.
    ///
    /// The output depends only on the key and the message, and equals
    /// the output returned alongside any proof for the same message.
    pub fn compute(&self, message: &[u8]) -> VrfOutput {
        let Bv = hash_to_point(&self.public.0, message);
        VrfOutput((&Bv * &self.scalar).compress().to_bytes())
    }

    /// Evaluate the VRF on `message` and prove the evaluation, drawing
    /// 64 bytes of nonce-hardening randomness from `csprng`.
    pub fn prove<R>(&self, message: &[u8], csprng: &mut R) -> (VrfOutput, Proof)
    where
        R: CryptoRng + RngCore,
    {
        let mut randomness = [0u8; RANDOMIZER_LENGTH];
        csprng.fill_bytes(&mut randomness);

        let output = self.prove_deterministic(message, &randomness);
        randomness.zeroize();
        output
    }

    /// Evaluate the VRF on `message` and prove the evaluation with the
    /// given nonce-hardening bytes.
    ///
    /// Proofs are deterministic in `(key, message, randomness)`; the
    /// VRF output half of the result does not depend on `randomness` at
    /// all.
    pub fn prove_deterministic(
        &self,
        message: &[u8],
        randomness: &[u8; RANDOMIZER_LENGTH],
    ) -> (VrfOutput, Proof) {
        let Bv = hash_to_point(&self.public.0, message);
        let V = (&Bv * &self.scalar).compress();

        // Nonce: r = H_3(a || V || Z) mod l.
        let mut h = Sha512::new();
        h.update(NONCE_DOMAIN);
        h.update(self.scalar.as_bytes());
        h.update(V.as_bytes());
        h.update(randomness);
        let mut r = Scalar::from_hash(h);

        let R = EdwardsPoint::mul_base(&r).compress();
        let Rv = (&Bv * &r).compress();

        let h = challenge_scalar(&self.public.0, &V, &R, &Rv, message);
        let s = &r + &(&h * &self.scalar);
        r.zeroize();

        (
            VrfOutput(V.to_bytes()),
            Proof {
                V,
                h: h.to_bytes(),
                s: s.to_bytes(),
            },
        )
    }
}
