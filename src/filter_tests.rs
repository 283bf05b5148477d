//! Tests for the key filtering module.

use super::filter::*;

mod key_regex_filter {
    use super::*;

    #[test]
    fn matches_full_key() {
        let filter = KeyRegexFilter::new(r"\[\d+\]$").unwrap();
        assert!(filter.matches("Filter[0]"));
        assert!(!filter.matches("Filter[name]"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(KeyRegexFilter::new("[unclosed").is_err());
    }
}

mod filter_chain {
    use super::*;

    #[test]
    fn empty_chain_matches_everything() {
        let chain = FilterChain::new();
        assert!(chain.is_empty());
        assert!(chain.matches("anything"));
    }

    #[test]
    fn includes_are_or() {
        let chain = FilterChain::new()
            .include(KeyRegexFilter::new("^A").unwrap())
            .include(KeyRegexFilter::new("^B").unwrap());

        assert!(chain.matches("Alpha"));
        assert!(chain.matches("Beta"));
        assert!(!chain.matches("Gamma"));
    }

    #[test]
    fn exclude_beats_include() {
        let chain = FilterChain::new()
            .include(KeyRegexFilter::new(r"^Filter\[").unwrap())
            .exclude(KeyRegexFilter::new(r"\[0\]").unwrap());

        assert!(chain.matches("Filter[1]"));
        assert!(!chain.matches("Filter[0]"));
    }

    #[test]
    fn from_patterns_builds_chain() {
        let chain = FilterChain::from_patterns(&["^Show"], &["Sockets"]).unwrap();

        assert!(chain.matches("Show Ethereal"));
        assert!(!chain.matches("Show Sockets"));
        assert!(!chain.matches("Verbose"));
    }

    #[test]
    fn from_patterns_reports_bad_pattern() {
        let err = FilterChain::from_patterns(&["ok", "(bad"], &[]).unwrap_err();
        assert_eq!(err.pattern, "(bad");
    }
}
