// -*- mode: rust; -*-
//
// This file is part of vxeddsa-dalek.
// Copyright (c) 2016-2021 isis lovecruft
// See LICENSE for licensing information.
//
// Authors:
// - isis agora lovecruft <isis@patternsinthevoid.net>

//! Integration tests for VXEdDSA: reference vectors, iterated
//! key-derivation chains, and adversarial inputs.

use rand::rngs::OsRng;
use sha2::{Digest, Sha512};

use vxeddsa_dalek::{PrivateKey, Proof, PublicKey, VrfOutput, RANDOMIZER_LENGTH, SEED_LENGTH};

/// Clamp seed bytes the way the key derivation chain specifies.
fn clamp(mut bytes: [u8; 32]) -> [u8; 32] {
    bytes[0] &= 248;
    bytes[31] &= 127;
    bytes[31] |= 64;
    bytes
}

#[cfg(test)]
mod vectors {
    use super::*;

    /// The deterministic 96-byte signature for the all-zero 200-byte
    /// message under the fixed test key, from the reference
    /// implementation.
    const SIGNATURE_CORRECT: [u8; 96] = [
        0x23, 0xc6, 0xe5, 0x93, 0x3f, 0xcd, 0x56, 0x47,
        0x7a, 0x86, 0xc9, 0x9b, 0x76, 0x2c, 0xb5, 0x24,
        0xc3, 0xd6, 0x05, 0x55, 0x38, 0x83, 0x4d, 0x4f,
        0x8d, 0xb8, 0xf0, 0x31, 0x07, 0xec, 0xeb, 0xa0,
        0xa0, 0x01, 0x50, 0xb8, 0x4c, 0xbb, 0x8c, 0xcd,
        0x23, 0xdc, 0x65, 0xfd, 0x0e, 0x81, 0xb2, 0x86,
        0x06, 0xa5, 0x6b, 0x0c, 0x4f, 0x53, 0x6d, 0xc8,
        0x8b, 0x8d, 0xc9, 0x04, 0x6e, 0x4a, 0xeb, 0x08,
        0xce, 0x08, 0x71, 0xfc, 0xc7, 0x00, 0x09, 0xa4,
        0xd6, 0xc0, 0xfd, 0x2d, 0x1a, 0xe5, 0xb6, 0xc0,
        0x7c, 0xc7, 0x22, 0x3b, 0x69, 0x59, 0xa8, 0x26,
        0x2b, 0x57, 0x78, 0xd5, 0x46, 0x0e, 0x0f, 0x05,
    ];

    fn fixed_test_key() -> PrivateKey {
        let mut seed = [0u8; SEED_LENGTH];
        seed[8] = 189;
        PrivateKey::from_seed(&clamp(seed))
    }

    #[test]
    fn deterministic_signature_matches_reference() {
        let key = fixed_test_key();
        let message = [0u8; 200];
        let randomness = [0u8; RANDOMIZER_LENGTH];

        let (vrf_output, proof) = key.prove_deterministic(&message, &randomness);
        assert_eq!(&proof.to_bytes()[..], &SIGNATURE_CORRECT[..]);

        let public_key = key.public();
        let recovered = public_key
            .verify_proof(&message, &proof)
            .expect("reference proof must verify");
        assert_eq!(recovered, vrf_output);
        assert!(public_key.verify(&message, &vrf_output, &proof));
    }

    #[test]
    fn corrupted_signature_fails() {
        let key = fixed_test_key();
        let message = [0u8; 200];
        let (_, proof) = key.prove_deterministic(&message, &[0u8; RANDOMIZER_LENGTH]);

        let mut bytes = proof.to_bytes();
        bytes[0] ^= 1;
        let corrupted = Proof::from_bytes(&bytes).unwrap();
        assert!(key.public().verify_proof(&message, &corrupted).is_none());
    }

    #[test]
    fn randomizer_changes_proof_but_not_output() {
        let key = fixed_test_key();
        let message = [0u8; 200];

        let (output, proof) = key.prove_deterministic(&message, &[0u8; RANDOMIZER_LENGTH]);

        let mut randomness = [0u8; RANDOMIZER_LENGTH];
        randomness[0] ^= 1;
        let (output_again, proof_again) = key.prove_deterministic(&message, &randomness);

        // The VRF output is independent of the randomizer; the
        // challenge and response are not.
        assert_eq!(output, output_again);
        assert_eq!(proof.to_bytes()[..32], proof_again.to_bytes()[..32]);
        assert_ne!(proof.to_bytes()[32..], proof_again.to_bytes()[32..]);

        assert!(key.public().verify(&message, &output_again, &proof_again));
    }
}

#[cfg(test)]
mod chains {
    use super::*;

    const SIGNATURE_10K_CORRECT: [u8; 96] = [
        0xa1, 0x96, 0x96, 0xe5, 0x87, 0x3f, 0x6e, 0x5c,
        0x2e, 0xd3, 0x73, 0xab, 0x04, 0x0c, 0x1f, 0x26,
        0x3c, 0xca, 0x52, 0xc4, 0x7e, 0x49, 0xaa, 0xce,
        0xb5, 0xd6, 0xa2, 0x29, 0x46, 0x3f, 0x1b, 0x54,
        0x45, 0x94, 0x9b, 0x6c, 0x27, 0xf9, 0x2a, 0xed,
        0x17, 0xa4, 0x72, 0xbf, 0x35, 0x37, 0xc1, 0x90,
        0xac, 0xb3, 0xfd, 0x2d, 0xf1, 0x01, 0x05, 0xbe,
        0x56, 0x5c, 0xaf, 0x63, 0x65, 0xad, 0x38, 0x04,
        0x70, 0x53, 0xdf, 0x2b, 0xc1, 0x45, 0xc8, 0xee,
        0x02, 0x0d, 0x2b, 0x22, 0x23, 0x7a, 0xbf, 0xfa,
        0x43, 0x31, 0xb3, 0xac, 0x26, 0xd9, 0x76, 0xfc,
        0xfe, 0x30, 0xa1, 0x7c, 0xce, 0x10, 0x67, 0x0e,
    ];

    const SIGNATURE_100K_CORRECT: [u8; 96] = [
        0xc9, 0x11, 0x2b, 0x55, 0xfa, 0xc4, 0xb2, 0xfe,
        0x00, 0x7d, 0xf6, 0x45, 0xcb, 0xd2, 0x73, 0xc9,
        0x43, 0xba, 0x20, 0xf6, 0x9c, 0x18, 0x84, 0xef,
        0x6c, 0x65, 0x7a, 0xdb, 0x49, 0xfc, 0x1e, 0xbe,
        0x31, 0xb3, 0xe6, 0xa4, 0x68, 0x2f, 0xd0, 0x30,
        0x81, 0xfc, 0x0d, 0xcd, 0x2d, 0x00, 0xab, 0xae,
        0x9f, 0x08, 0xf0, 0x99, 0xff, 0x9f, 0xdc, 0x2d,
        0x68, 0xd6, 0xe7, 0xe8, 0x44, 0x2a, 0x5b, 0x0e,
        0x48, 0x67, 0xe2, 0x41, 0x4a, 0xd9, 0x0c, 0x2a,
        0x2b, 0x4e, 0x66, 0x09, 0x87, 0xa0, 0x6b, 0x3b,
        0xd1, 0xd9, 0xa3, 0xe3, 0xa5, 0x69, 0xed, 0xc1,
        0x42, 0x03, 0x93, 0x0d, 0xbc, 0x7e, 0xe9, 0x08,
    ];

    const SIGNATURE_1M_CORRECT: [u8; 96] = [
        0xf8, 0xb1, 0x20, 0xf2, 0x1e, 0x5c, 0xbf, 0x5f,
        0xea, 0x07, 0xcb, 0xb5, 0x77, 0xb8, 0x03, 0xbc,
        0xcb, 0x6d, 0xf1, 0xc1, 0xa5, 0x03, 0x05, 0x7b,
        0x01, 0x63, 0x9b, 0xf9, 0xed, 0x3e, 0x57, 0x47,
        0xd2, 0x5b, 0xf4, 0x7e, 0x7c, 0x45, 0xce, 0xfc,
        0x06, 0xb3, 0xf4, 0x05, 0x81, 0x9f, 0x53, 0xb0,
        0x18, 0xe3, 0xfa, 0xcb, 0xb2, 0x52, 0x3e, 0x57,
        0xcb, 0x34, 0xcc, 0x81, 0x60, 0xb9, 0x0b, 0x04,
        0x07, 0x79, 0xc0, 0x53, 0xad, 0xc4, 0x4b, 0xd0,
        0xb5, 0x7d, 0x95, 0x4e, 0xbe, 0xa5, 0x75, 0x0c,
        0xd4, 0xbf, 0xa7, 0xc0, 0xcf, 0xba, 0xe7, 0x7c,
        0xe2, 0x90, 0xef, 0x61, 0xa9, 0x29, 0x66, 0x0d,
    ];

    const SIGNATURE_10M_CORRECT: [u8; 96] = [
        0xf5, 0xa4, 0xbc, 0xec, 0xc3, 0x3d, 0xd0, 0x43,
        0xd2, 0x81, 0x27, 0x9e, 0xf0, 0x4c, 0xbe, 0xf3,
        0x77, 0x01, 0x56, 0x41, 0x0e, 0xff, 0x0c, 0xb9,
        0x66, 0xec, 0x4d, 0xe0, 0xb7, 0x25, 0x63, 0x6b,
        0x5c, 0x08, 0x39, 0x80, 0x4e, 0x37, 0x1b, 0x2c,
        0x46, 0x6f, 0x86, 0x99, 0x1c, 0x4e, 0x31, 0x60,
        0xdb, 0x4c, 0xfe, 0xc5, 0xa2, 0x4d, 0x71, 0x2b,
        0xd6, 0xd0, 0xc3, 0x98, 0x88, 0xdb, 0x0e, 0x0c,
        0x68, 0x4a, 0xd3, 0xc7, 0x56, 0xac, 0x8d, 0x95,
        0x7b, 0xbd, 0x99, 0x50, 0xe8, 0xd3, 0xea, 0xf3,
        0x7b, 0x26, 0xf2, 0xa2, 0x2b, 0x02, 0x58, 0xca,
        0xbd, 0x2c, 0x2b, 0xf7, 0x77, 0x58, 0xfe, 0x09,
    ];

    /// Iterate the pseudorandom sign/verify chain: each round derives a
    /// key and randomizer from the previous signature, signs a mutating
    /// message, verifies, then flips one bit of either the signature or
    /// the message.
    fn run_chain(iterations: usize, checkpoints: &[(usize, &[u8; 96])]) {
        let mut message = [0u8; 200];
        let mut signature = [3u8; 96];

        for count in 1..=iterations {
            let digest = Sha512::digest(&signature[..]);
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&digest[..32]);

            let digest = Sha512::digest(&seed[..]);
            let mut randomness = [0u8; RANDOMIZER_LENGTH];
            randomness.copy_from_slice(&digest[..64]);

            let key = PrivateKey::from_seed(&clamp(seed));
            let (_, proof) = key.prove_deterministic(&message, &randomness);
            assert!(
                key.public().verify_proof(&message, &proof).is_some(),
                "chain verify failure at iteration {}",
                count
            );

            signature = proof.to_bytes();
            if digest[63] & 1 == 1 {
                signature[count % 96] ^= 1;
            } else {
                message[count % 200] ^= 1;
            }

            for (n, expected) in checkpoints {
                if count == *n {
                    assert_eq!(
                        &signature[..],
                        &expected[..],
                        "chain checkpoint mismatch at iteration {}",
                        count
                    );
                }
            }
        }
    }

    #[test]
    fn pseudorandom_chain_10k() {
        run_chain(10_000, &[(10_000, &SIGNATURE_10K_CORRECT)]);
    }

    /// Run with `cargo test -- --ignored` (slow).
    #[test]
    #[ignore]
    fn pseudorandom_chain_100k() {
        run_chain(
            100_000,
            &[
                (10_000, &SIGNATURE_10K_CORRECT),
                (100_000, &SIGNATURE_100K_CORRECT),
            ],
        );
    }

    /// Run with `cargo test -- --ignored` (very slow).
    #[test]
    #[ignore]
    fn pseudorandom_chain_10m() {
        run_chain(
            10_000_000,
            &[
                (10_000, &SIGNATURE_10K_CORRECT),
                (100_000, &SIGNATURE_100K_CORRECT),
                (1_000_000, &SIGNATURE_1M_CORRECT),
                (10_000_000, &SIGNATURE_10M_CORRECT),
            ],
        );
    }
}

#[cfg(test)]
mod integrations {
    use super::*;

    #[test]
    fn honest_complete() {
        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let public_key = key.public();

        let vrf_output = key.compute(b"alice");
        let (vrf_from_proof, proof) = key.prove(b"alice", &mut OsRng);

        assert!(
            public_key.verify(b"alice", &vrf_output, &proof),
            "generate -> compute -> prove -> verify failed"
        );
        assert_eq!(vrf_output, vrf_from_proof, "compute != prove");
    }

    #[test]
    fn proofs_are_randomized_but_output_is_not() {
        let key = PrivateKey::generate(&mut OsRng).unwrap();

        let (output_1, proof_1) = key.prove(b"alice", &mut OsRng);
        let (output_2, proof_2) = key.prove(b"alice", &mut OsRng);

        assert_eq!(output_1, output_2);
        assert_ne!(proof_1.to_bytes()[32..], proof_2.to_bytes()[32..]);
        assert!(key.public().verify(b"alice", &output_1, &proof_1));
        assert!(key.public().verify(b"alice", &output_2, &proof_2));
    }

    #[test]
    fn flip_bit_forgery() {
        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let public_key = key.public();

        for i in 0..32 {
            for j in 0..8u8 {
                let mut forged = key.compute(b"alice").to_bytes();
                forged[i] ^= 1 << j;
                let (_, proof) = key.prove(b"alice", &mut OsRng);
                assert!(
                    !public_key.verify(b"alice", &VrfOutput::from(forged), &proof),
                    "forged VRF output accepted at [{}] ^= {}",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn wrong_message_fails() {
        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let (output, proof) = key.prove(b"alice", &mut OsRng);
        assert!(!key.public().verify(b"bob", &output, &proof));
    }

    #[test]
    fn wrong_key_fails() {
        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let other = PrivateKey::generate(&mut OsRng).unwrap();
        let (output, proof) = key.prove(b"alice", &mut OsRng);
        assert!(!other.public().verify(b"alice", &output, &proof));
    }

    #[test]
    fn corrupted_challenge_and_response_fail() {
        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let (output, proof) = key.prove(b"alice", &mut OsRng);

        let mut corrupt_h = proof.to_bytes();
        corrupt_h[32] ^= 1;
        let corrupt_h = Proof::from_bytes(&corrupt_h).unwrap();
        assert!(!key.public().verify(b"alice", &output, &corrupt_h));

        let mut corrupt_s = proof.to_bytes();
        corrupt_s[64] ^= 1;
        let corrupt_s = Proof::from_bytes(&corrupt_s).unwrap();
        assert!(!key.public().verify(b"alice", &output, &corrupt_s));
    }

    /// A response scalar at or above the group order must be rejected
    /// outright, even though it is congruent to a valid response.
    #[test]
    fn noncanonical_response_scalar_fails() {
        // The group order l, little-endian.
        const ELL: [u8; 32] = [
            0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9,
            0xde, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x10,
        ];

        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let (output, proof) = key.prove(b"alice", &mut OsRng);

        // s := s + l, as a 256-bit integer; still congruent mod l.
        let mut bytes = proof.to_bytes();
        let mut carry = 0u16;
        for i in 0..32 {
            let sum = bytes[64 + i] as u16 + ELL[i] as u16 + carry;
            bytes[64 + i] = sum as u8;
            carry = sum >> 8;
        }
        assert_eq!(carry, 0, "s + l fits in 256 bits");

        let noncanonical = Proof::from_bytes(&bytes).unwrap();
        assert!(!key.public().verify(b"alice", &output, &noncanonical));
    }

    /// Public keys in a small subgroup are rejected regardless of the
    /// other proof contents.
    #[test]
    fn small_subgroup_public_key_fails() {
        // Compressed encodings of points in the eight-torsion subgroup:
        // the identity, the point of order two, a point of order four,
        // and a point of order eight.
        const TORSION_ENCODINGS: [[u8; 32]; 4] = [
            [
                0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
                0, 0, 0, 0, 0, 0,
            ],
            [
                0xec, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
                0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
                0xff, 0xff, 0xff, 0xff, 0xff, 0x7f,
            ],
            [
                0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
                0, 0, 0, 0, 0,
            ],
            [
                0xc7, 0x17, 0x6a, 0x70, 0x3d, 0x4d, 0xd8, 0x4f, 0xba, 0x3c, 0x0b, 0x76, 0x0d,
                0x10, 0x67, 0x0f, 0x2a, 0x20, 0x53, 0xfa, 0x2c, 0x39, 0xcc, 0xc6, 0x4e, 0xc7,
                0xfd, 0x77, 0x92, 0xac, 0x03, 0x7a,
            ],
        ];

        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let (output, proof) = key.prove(b"alice", &mut OsRng);

        for encoding in &TORSION_ENCODINGS {
            let torsion_key = PublicKey::from_bytes(encoding).unwrap();
            assert!(!torsion_key.verify(b"alice", &output, &proof));
            assert!(torsion_key.verify_proof(b"alice", &proof).is_none());
        }
    }

    /// A proof whose own point is in a small subgroup is rejected.
    #[test]
    fn small_subgroup_proof_point_fails() {
        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let (_, proof) = key.prove(b"alice", &mut OsRng);

        let mut bytes = proof.to_bytes();
        // Substitute the identity for V.
        bytes[..32].copy_from_slice(&[0u8; 32]);
        bytes[0] = 0x01;
        let forged = Proof::from_bytes(&bytes).unwrap();
        let forged_output = forged.vrf_output();
        assert!(!key.public().verify(b"alice", &forged_output, &forged));
    }

    #[test]
    fn public_key_wire_round_trip() {
        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let public_key = key.public();

        let decoded = PublicKey::from_bytes(public_key.as_bytes()).unwrap();
        assert_eq!(decoded, public_key);

        // Undecodable bytes are rejected: y = 2 is not the
        // y-coordinate of any curve point.
        let mut bad = [0u8; 32];
        bad[0] = 2;
        assert!(PublicKey::from_bytes(&bad).is_err());

        assert!(PublicKey::from_bytes(&[0u8; 31]).is_err());
    }

    #[test]
    fn private_key_wire_round_trip() {
        let key = PrivateKey::generate(&mut OsRng).unwrap();
        let bytes = key.to_bytes();
        let again = PrivateKey::from_bytes(&bytes).unwrap();

        assert_eq!(key.public(), again.public());
        assert_eq!(key.compute(b"alice"), again.compute(b"alice"));
    }
}
