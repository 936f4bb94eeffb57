use super::report::Vulnerability;
use super::severity::Severity;

pub const MAX_SEVERITY_SCORE: u8 = 10;

const CRITICAL_WEIGHT: usize = 3;
const HIGH_WEIGHT: usize = 2;

/// Overall risk on a 0-10 scale.
///
/// Every finding counts once, critical findings add three more and high
/// findings two more: `min(10, 3c + 2h + n)`. Unrecognized severities only
/// contribute to `n`.
pub fn severity_score(vulnerabilities: &[Vulnerability]) -> u8 {
    let critical = count_severity(vulnerabilities, &Severity::Critical);
    let high = count_severity(vulnerabilities, &Severity::High);

    let raw = critical
        .saturating_mul(CRITICAL_WEIGHT)
        .saturating_add(high.saturating_mul(HIGH_WEIGHT))
        .saturating_add(vulnerabilities.len());

    raw.min(MAX_SEVERITY_SCORE as usize) as u8
}

pub fn count_severity(vulnerabilities: &[Vulnerability], severity: &Severity) -> usize {
    vulnerabilities
        .iter()
        .filter(|v| &v.severity == severity)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vuln(severity: Severity) -> Vulnerability {
        Vulnerability {
            vuln_type: "Test".to_string(),
            severity,
            description: String::new(),
            recommendation: String::new(),
        }
    }

    fn findings(critical: usize, high: usize, medium: usize, low: usize) -> Vec<Vulnerability> {
        let mut out = Vec::new();
        out.extend((0..critical).map(|_| vuln(Severity::Critical)));
        out.extend((0..high).map(|_| vuln(Severity::High)));
        out.extend((0..medium).map(|_| vuln(Severity::Medium)));
        out.extend((0..low).map(|_| vuln(Severity::Low)));
        out
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(severity_score(&[]), 0);
    }

    #[test]
    fn test_single_critical() {
        assert_eq!(severity_score(&findings(1, 0, 0, 0)), 4);
    }

    #[test]
    fn test_mixed_below_cap() {
        // 3*1 + 2*1 + 4
        assert_eq!(severity_score(&findings(1, 1, 1, 1)), 9);
    }

    #[test]
    fn test_capped_at_ten() {
        assert_eq!(severity_score(&findings(5, 5, 0, 0)), 10);
    }

    #[test]
    fn test_unrecognized_counts_once() {
        let list = vec![vuln(Severity::Unrecognized("Severe".to_string()))];
        assert_eq!(severity_score(&list), 1);
    }

    proptest! {
        #[test]
        fn prop_score_never_exceeds_cap(
            c in 0usize..50,
            h in 0usize..50,
            m in 0usize..50,
            l in 0usize..50,
        ) {
            prop_assert!(severity_score(&findings(c, h, m, l)) <= MAX_SEVERITY_SCORE);
        }

        #[test]
        fn prop_adding_critical_never_lowers_score(
            c in 0usize..20,
            h in 0usize..20,
            m in 0usize..20,
        ) {
            let before = severity_score(&findings(c, h, m, 0));
            let after = severity_score(&findings(c + 1, h, m, 0));
            prop_assert!(after >= before);
        }

        #[test]
        fn prop_adding_high_never_lowers_score(c in 0usize..20, h in 0usize..20, m in 0usize..20) {
            let before = severity_score(&findings(c, h, m, 0));
            let after = severity_score(&findings(c, h + 1, m, 0));
            prop_assert!(after >= before);
        }
    }
}
