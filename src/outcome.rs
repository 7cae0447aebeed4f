#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Yes,
    No,
    Unrecognized,
}

impl OutcomeKind {
    pub fn is_success(self) -> bool {
        self == OutcomeKind::Yes
    }
}

pub fn classify_outcome(raw: &str) -> OutcomeKind {
    match raw.trim().to_lowercase().as_str() {
        "yes" => OutcomeKind::Yes,
        "no" => OutcomeKind::No,
        _ => OutcomeKind::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::{OutcomeKind, classify_outcome};

    #[test]
    fn recognizes_yes_across_case_and_whitespace_variants() {
        for raw in ["yes", "Yes", "YES", " yes ", "\tYES\n", "yEs"] {
            assert!(
                classify_outcome(raw).is_success(),
                "expected {raw:?} to count as success"
            );
        }
    }

    #[test]
    fn recognizes_no_across_case_and_whitespace_variants() {
        for raw in ["no", "No", "NO", " no ", "\tNO\n"] {
            assert_eq!(classify_outcome(raw), OutcomeKind::No);
            assert!(!classify_outcome(raw).is_success());
        }
    }

    #[test]
    fn unrecognized_values_degrade_to_failure() {
        for raw in ["", "maybe", "yes!", "y", "true", "1", "nan", "None"] {
            assert_eq!(classify_outcome(raw), OutcomeKind::Unrecognized);
            assert!(!classify_outcome(raw).is_success());
        }
    }

    #[test]
    fn classification_is_stable_on_canonical_forms() {
        assert!(classify_outcome("yes").is_success());
        assert!(!classify_outcome("no").is_success());
        assert_eq!(classify_outcome("yes"), classify_outcome("  YES  "));
        assert_eq!(classify_outcome("no"), classify_outcome("  NO  "));
    }
}
