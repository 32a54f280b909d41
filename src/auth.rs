use sha2::{Digest as _, Sha256};

/// Single shared-secret check in front of the wizard.
///
/// Candidates are compared through their SHA-256 digests so the comparison
/// time does not depend on where the strings first differ.
#[derive(Clone)]
pub struct AccessGate {
    digest: [u8; 32],
}

impl AccessGate {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: digest(secret),
        }
    }

    pub fn check(&self, candidate: &str) -> bool {
        let candidate = digest(candidate);
        self.digest
            .iter()
            .zip(candidate.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate").finish_non_exhaustive()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
