// -*- mode: rust; -*-
//
// This file is part of vxeddsa-dalek.
// Copyright (c) 2016-2021 isis lovecruft
// See LICENSE for licensing information.
//
// Authors:
// - isis agora lovecruft <isis@patternsinthevoid.net>

//! Errors which may occur when parsing keys to or from wire formats, or
//! when generating keys from an entropy source.
//!
//! Proof verification never produces an error: it reports only a boolean
//! (or the recovered VRF output), with no distinction between failure
//! causes.

use core::fmt;
use core::fmt::Display;

/// Internal errors.  Most application-level developers will likely not
/// need to pay any attention to these.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum InternalError {
    /// An encoded point did not decompress to a curve point.
    PointDecompressionError,
    /// An error in the length of bytes handed to a constructor.
    ///
    /// To use this, pass a string specifying the `name` of the type
    /// which is returning the error, and the `length` in bytes which its
    /// constructor expects.
    BytesLengthError {
        name: &'static str,
        length: usize,
    },
    /// The public half of a private-key handle does not belong to its
    /// scalar half.
    KeypairMismatchError,
    /// The entropy source could not supply enough bytes for key
    /// generation.
    EntropyError,
}

impl Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            InternalError::PointDecompressionError => write!(f, "Cannot decompress Edwards point"),
            InternalError::BytesLengthError { name: n, length: l } => {
                write!(f, "{} must be {} bytes in length", n, l)
            }
            InternalError::KeypairMismatchError => {
                write!(f, "Public key does not match the private scalar")
            }
            InternalError::EntropyError => write!(f, "Entropy source failed to supply key seed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InternalError {}

/// Errors which may occur while processing keys and proofs.
///
/// This error may arise due to:
///
/// * Being given bytes with a length different to what was expected.
///
/// * A problem decompressing the curve point in a `PublicKey`.
///
/// * A private-key handle whose cached public key does not match its
///   scalar.
///
/// * An entropy source failing during key generation.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct SignatureError(pub(crate) InternalError);

impl Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SignatureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}
