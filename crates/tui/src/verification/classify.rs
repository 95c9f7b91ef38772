use eudiplo_shop_verifier::VerifyError;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    AuthFailure,
    PermissionDenied,
    ConfigNotFound,
    Unclassified,
}

impl FailureKind {
    pub fn message(self) -> &'static str {
        match self {
            FailureKind::Timeout => {
                "Verification timed out. Please scan the QR code within 5 minutes."
            }
            FailureKind::AuthFailure => "Authentication failed. Check your credentials.",
            FailureKind::PermissionDenied => "Access denied. Check client permissions.",
            FailureKind::ConfigNotFound => "Presentation config not found.",
            FailureKind::Unclassified => "Verification failed. Please try again.",
        }
    }
}

struct Rule {
    kind: FailureKind,
    matches: fn(&VerifyError) -> bool,
}

/// Evaluated in order, first match wins.
const RULES: &[Rule] = &[
    Rule {
        kind: FailureKind::Timeout,
        matches: mentions_timeout,
    },
    Rule {
        kind: FailureKind::AuthFailure,
        matches: is_unauthorized,
    },
    Rule {
        kind: FailureKind::PermissionDenied,
        matches: is_forbidden,
    },
    Rule {
        kind: FailureKind::ConfigNotFound,
        matches: is_not_found,
    },
];

fn timeout_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\btimed?\s*out\b").expect("valid timeout pattern"))
}

fn mentions_timeout(error: &VerifyError) -> bool {
    error.is_timeout() || timeout_pattern().is_match(&error.to_string())
}

fn is_unauthorized(error: &VerifyError) -> bool {
    error.status_code() == Some(401)
}

fn is_forbidden(error: &VerifyError) -> bool {
    error.status_code() == Some(403)
}

fn is_not_found(error: &VerifyError) -> bool {
    error.status_code() == Some(404)
}

pub fn classify(error: &VerifyError) -> FailureKind {
    RULES
        .iter()
        .find(|rule| (rule.matches)(error))
        .map(|rule| rule.kind)
        .unwrap_or(FailureKind::Unclassified)
}
