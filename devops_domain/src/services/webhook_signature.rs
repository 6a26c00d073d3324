// /////////////////////////////////////////////////////////////////////////////
// DevOps Orchestrator RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Webhook Signature Verification
//!
//! Pure functions, no I/O: each verifier takes the raw request body, the
//! header value supplied by the platform, and the configured secret, and
//! returns whether the delivery is authentic. Ported from
//! `WebhookVerifier.verify_github_signature` / `verify_gitlab_signature` /
//! `verify_jenkins_signature`.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// GitHub sends `X-Hub-Signature-256: sha256=<hex>`; the digest covers the
/// raw request body keyed by the webhook secret.
pub fn verify_github_signature(body: &[u8], header_value: &str, secret: &str) -> bool {
    let Some(hex_digest) = header_value.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// GitLab sends a pre-shared opaque token in `X-Gitlab-Token`, compared
/// directly against the configured secret rather than an HMAC digest.
pub fn verify_gitlab_token(header_value: &str, secret: &str) -> bool {
    let a = header_value.as_bytes();
    let b = secret.as_bytes();
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Jenkins signs with HMAC-SHA1 in `X-Hub-Signature`.
pub fn verify_jenkins_signature(body: &[u8], header_value: &str, secret: &str) -> bool {
    let Some(hex_digest) = header_value.strip_prefix("sha1=").or(Some(header_value)) else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha1>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github_sig(body: &[u8], secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn github_signature_roundtrips() {
        let body = br#"{"ref":"refs/heads/main"}"#;
        let sig = github_sig(body, "s3cr3t");
        assert!(verify_github_signature(body, &sig, "s3cr3t"));
        assert!(!verify_github_signature(body, &sig, "wrong"));
    }

    #[test]
    fn gitlab_token_compares_constant_time() {
        assert!(verify_gitlab_token("tok", "tok"));
        assert!(!verify_gitlab_token("tok", "tok2"));
    }

    #[test]
    fn missing_prefix_fails_github_verification() {
        let body = b"payload";
        assert!(!verify_github_signature(body, "not-a-signature", "secret"));
    }
}
