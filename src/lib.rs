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

#![no_std]
#![deny(missing_docs)]

//! # vxeddsa-dalek
//!
//! **A pure-Rust implementation of the VXEdDSA verifiable random function
//! over Curve25519.**
//!
//! A VRF is a keyed hash whose holder can prove, to anyone with the
//! matching public key, that a given 32-byte output really is the image of
//! a given message under the keyed hash.  VXEdDSA realises this with an
//! EdDSA-style proof: the private scalar \\(a\\) maps a message \\(M\\)
//! through an Elligator2 hash-to-point to a basepoint \\(B_v\\), the VRF
//! output is the compressed point \\(V = a B_v\\), and the 96-byte proof is
//! a Schnorr-style triple \\((V, h, s)\\) binding \\(V\\) to the public key
//! \\(A = a B\\) and to \\(M\\).
//!
//! # Example
//!
//! ```
//! use rand::rngs::OsRng;
//! use vxeddsa_dalek::PrivateKey;
//!
//! let private_key = PrivateKey::generate(&mut OsRng).unwrap();
//! let public_key = private_key.public();
//!
//! let (vrf_output, proof) = private_key.prove(b"alice", &mut OsRng);
//!
//! assert!(public_key.verify(b"alice", &vrf_output, &proof));
//! assert_eq!(vrf_output, private_key.compute(b"alice"));
//! ```
//!
//! The randomness passed to [`PrivateKey::prove`] hardens the nonce against
//! fault attacks but never influences the VRF output itself; proving the
//! same message twice yields the same output under different proofs.

#[cfg(feature = "std")]
#[macro_use]
extern crate std;

// Operator boilerplate for the internal arithmetic types.
#[macro_use]
mod macros;

// Field and curve arithmetic, private to the crate: the public surface of
// this crate is the VRF, not a general-purpose curve library.
mod constants;
mod curve_models;
mod edwards;
mod field;
mod montgomery;
mod scalar;
mod traits;
mod window;

mod errors;
mod vxeddsa;

pub use crate::errors::SignatureError;
pub use crate::vxeddsa::{
    PrivateKey, Proof, PublicKey, VrfOutput, PRIVATE_KEY_LENGTH, PROOF_LENGTH, PUBLIC_KEY_LENGTH,
    RANDOMIZER_LENGTH, SEED_LENGTH, VRF_OUTPUT_LENGTH,
};
