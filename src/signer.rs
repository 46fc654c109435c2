//! Per-participant signing state.

use rand_core::{CryptoRng, RngCore};

use crate::keys::KeyPackage;
use crate::round1::{self, SigningCommitments, SigningNonces};
use crate::round2::{self, SignatureShare};
use crate::{Error, Identifier, SigningPackage};

/// One participant of the signing protocol.
///
/// A `Signer` owns its [`KeyPackage`] immutably. The nonces produced by
/// [`round1`](Signer::round1) live on the caller's stack between the two
/// rounds and are consumed by [`round2`](Signer::round2); the signer holds
/// no per-session state of its own, so one `Signer` can serve any number of
/// (sequential or concurrent) sessions.
pub struct Signer {
    key_package: KeyPackage,
}

impl Signer {
    /// Create a signer from its key package.
    pub fn new(key_package: KeyPackage) -> Self {
        Self { key_package }
    }

    /// This signer's participant identifier.
    pub fn identifier(&self) -> Identifier {
        self.key_package.identifier()
    }

    /// This signer's key package.
    pub fn key_package(&self) -> &KeyPackage {
        &self.key_package
    }

    /// Round 1: sample fresh nonces and commit to them.
    ///
    /// The commitments go to the coordinator; the nonces stay here and
    /// must be fed into exactly one [`round2`](Signer::round2) call.
    pub fn round1<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> (SigningNonces, SigningCommitments) {
        round1::commit(rng)
    }

    /// Round 2: produce this signer's signature share for the session
    /// described by `signing_package`, consuming the round-1 nonces.
    ///
    /// Nonces are consumed by value, so feeding the same pair into a
    /// second call does not compile:
    ///
    /// ```compile_fail
    /// # use rand::thread_rng;
    /// # use frost25519::{keys, Config, Coordinator, Signer};
    /// # let mut rng = thread_rng();
    /// # let config = Config::new(2, 2).unwrap();
    /// # let (key_packages, pubkeys) = keys::generate(&config, &mut rng).unwrap();
    /// # let signers: Vec<Signer> =
    /// #     key_packages.values().map(|kp| Signer::new(kp.clone())).collect();
    /// # let mut nonces = Vec::new();
    /// # let mut commitments = Vec::new();
    /// # for signer in &signers {
    /// #     let (nonce_pair, commitment) = signer.round1(&mut rng);
    /// #     nonces.push(nonce_pair);
    /// #     commitments.push((signer.identifier(), commitment));
    /// # }
    /// # let mut coordinator = Coordinator::new(config, pubkeys);
    /// # let package = coordinator.create_signing_package(b"msg", &commitments).unwrap();
    /// let nonce_pair = nonces.remove(0);
    /// let first = signers[0].round2(&package, nonce_pair).unwrap();
    /// let second = signers[0].round2(&package, nonce_pair); // error: use of moved value
    /// ```
    pub fn round2(
        &self,
        signing_package: &SigningPackage,
        nonces: SigningNonces,
    ) -> Result<SignatureShare, Error> {
        round2::sign(signing_package, nonces, &self.key_package)
    }
}
