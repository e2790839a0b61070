use ngo_core::TokenVerifier;

/// Accepts exactly one configured admin token.
#[derive(Clone)]
pub struct StaticTokenVerifier {
    token: String,
}

impl StaticTokenVerifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> bool {
        let expected = self.token.as_bytes();
        let given = token.as_bytes();
        if self.token.is_empty() || expected.len() != given.len() {
            return false;
        }
        // Compare every byte so the check time does not depend on the prefix match.
        expected
            .iter()
            .zip(given)
            .fold(0_u8, |acc, (left, right)| acc | (left ^ right))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_configured_token_passes() {
        let verifier = StaticTokenVerifier::new("s3cret");
        assert!(verifier.verify("s3cret"));
        assert!(!verifier.verify("s3cres"));
        assert!(!verifier.verify("s3cret "));
        assert!(!verifier.verify(""));
    }

    #[test]
    fn empty_configured_token_rejects_everything() {
        assert!(!StaticTokenVerifier::new("").verify(""));
    }
}
