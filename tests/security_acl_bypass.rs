//! ACL security tests - bypass attempts and edge cases

use batch_acl::acl::{
    AclAttribute, AclEvaluator, AclType, BatchOp, GroupDirectory, OsGroupDirectory, RuleMatcher,
    StaticGroupDirectory,
};
use batch_acl::config::{AclConfigBuilder, DefaultPolicy};
use batch_acl::AclError;
use std::sync::Arc;

fn evaluator(policy: DefaultPolicy) -> AclEvaluator {
    let config = AclConfigBuilder::new()
        .default_policy(policy)
        .server_host("head01.example.com")
        .group_cache_capacity(0)
        .build()
        .unwrap();
    let mut groups = StaticGroupDirectory::new();
    groups.add_user("alice", &["alice", "wheel"]);
    AclEvaluator::with_directory(config, Arc::new(groups))
}

#[test]
fn test_explicit_deny_beats_wildcard_allow() {
    for policy in [DefaultPolicy::Deny, DefaultPolicy::Allow] {
        let eval = evaluator(policy);

        // Insertion order must not matter: the specific deny is stored first
        for text in [
            "*.example.com,-bad.example.com",
            "-bad.example.com,*.example.com",
        ] {
            let acl = AclAttribute::decode(AclType::Host, text).unwrap();
            assert!(!eval.check(&acl, AclType::Host, Some("bad.example.com")));
            assert!(eval.check(&acl, AclType::Host, Some("good.example.com")));
        }
    }
}

#[test]
fn test_case_folding_does_not_bypass_deny() {
    let eval = evaluator(DefaultPolicy::Deny);
    let acl = AclAttribute::decode(AclType::Host, "*.example.com,-BAD.example.com").unwrap();

    assert!(!eval.check(&acl, AclType::Host, Some("bad.EXAMPLE.com")));
    assert!(!eval.check(&acl, AclType::Host, Some("Bad.Example.Com")));
}

#[test]
fn test_wildcard_does_not_cover_bare_domain() {
    let eval = evaluator(DefaultPolicy::Deny);
    let acl = AclAttribute::decode(AclType::Host, "*.example.com").unwrap();

    assert!(!eval.check(&acl, AclType::Host, Some("example.com")));
    assert!(!eval.check(&acl, AclType::Host, Some("evilexample.com")));
    assert!(!eval.check(&acl, AclType::Host, Some("example.com.evil.org")));
}

#[test]
fn test_suffix_is_not_a_match() {
    assert!(!RuleMatcher::host("badexample.com", "example.com"));
    assert!(!RuleMatcher::host("xexample.com", "example.com"));
    assert!(!RuleMatcher::host("", "example.com"));
    assert!(!RuleMatcher::host("example.com", ""));
}

#[test]
fn test_zero_mask_never_allows() {
    let eval = evaluator(DefaultPolicy::Deny);
    for rule in [
        "10.0.0.0/0",
        "0.0.0.0/0",
        "10.0.0.0/0.0.0.0",
        "10.0.0.0/00",
        "10.0.0.0/garbage",
    ] {
        let acl = AclAttribute::decode(AclType::Subnet, rule).unwrap();
        for candidate in ["10.0.0.1", "1.2.3.4", "0.0.0.0", "255.255.255.255"] {
            assert!(
                !eval.check(&acl, AclType::Subnet, Some(candidate)),
                "{} admitted {}",
                rule,
                candidate
            );
        }
    }
}

#[test]
fn test_out_of_range_prefix_rejected() {
    for rule in ["10.0.0.0/33", "10.0.0.0/-8", "10.0.0.0/", "10.0.0.0"] {
        assert!(!RuleMatcher::subnet("10.0.0.1", rule), "{} matched", rule);
    }
}

#[test]
fn test_malformed_candidate_address() {
    for candidate in ["10.0.0.5/8", " 10.0.0.5", "10.0.0", "10.0.0.256", "::1", ""] {
        assert!(
            !RuleMatcher::subnet(candidate, "10.0.0.0/8"),
            "{:?} matched",
            candidate
        );
    }
}

#[test]
fn test_oversized_subnet_pattern_rejected() {
    let long_net = format!("10.0.0.0{}", " ".repeat(40));
    assert!(!RuleMatcher::subnet("10.0.0.1", &format!("{}/8", long_net)));
}

#[test]
fn test_user_prefix_confusion() {
    let eval = evaluator(DefaultPolicy::Deny);
    let acl = AclAttribute::decode(AclType::User, "alice,bob@trusted.example.com").unwrap();

    assert!(eval.check(&acl, AclType::User, Some("alice@anywhere")));
    assert!(!eval.check(&acl, AclType::User, Some("alice2")));
    assert!(!eval.check(&acl, AclType::User, Some("alic")));
    assert!(!eval.check(&acl, AclType::User, Some("bob")));
    assert!(!eval.check(&acl, AclType::User, Some("bob@evil.org")));
    assert!(!eval.check(
        &acl,
        AclType::User,
        Some("bob@evil.org@trusted.example.com")
    ));
    assert!(eval.check(&acl, AclType::User, Some("bob@trusted.example.com")));
}

#[test]
fn test_unknown_user_gets_no_groups() {
    let eval = evaluator(DefaultPolicy::Deny);
    let acl = AclAttribute::decode(AclType::Group, "wheel").unwrap();

    assert!(eval.check(&acl, AclType::Group, Some("alice")));
    assert!(!eval.check(&acl, AclType::Group, Some("ghost")));
    assert!(!eval.check(&acl, AclType::Group, Some("wheel")));
}

#[test]
fn test_lookup_failure_is_not_an_allow() {
    let eval = evaluator(DefaultPolicy::Allow);
    let acl = AclAttribute::decode(AclType::Group, "-wheel,+").unwrap();

    // Deny group misses for an unknown user, but nothing is escalated either:
    // the directive decides
    assert!(!eval.check(&acl, AclType::Group, Some("alice")));
    assert!(eval.check(&acl, AclType::Group, Some("ghost")));
}

#[cfg(unix)]
#[test]
fn test_os_lookup_of_unknown_user() {
    let dir = OsGroupDirectory::new();
    assert!(dir.groups_of("no_such_user_batch_acl_12345").is_none());
    assert!(!dir.is_member("no_such_user_batch_acl_12345", "root"));
    assert!(!dir.is_member("root\0", "root"));
}

#[test]
fn test_absent_candidate_gets_base_default() {
    let eval = evaluator(DefaultPolicy::Deny);
    let acl = AclAttribute::decode(AclType::User, "+").unwrap();

    assert!(!eval.check(&acl, AclType::User, None));
    assert!(!eval.check(&acl, AclType::User, Some("")));
    assert!(eval.check(&acl, AclType::User, Some("anyone")));
}

#[test]
fn test_empty_non_host_acl_ignores_server_identity() {
    let eval = evaluator(DefaultPolicy::Deny);
    let acl = AclAttribute::new(AclType::User);
    assert!(!eval.check(&acl, AclType::User, Some("head01.example.com")));

    let acl = AclAttribute::new(AclType::Subnet);
    assert!(!eval.check(&acl, AclType::Subnet, Some("head01.example.com")));
}

#[test]
fn test_separator_injection_rejected() {
    let mut acl = AclAttribute::decode(AclType::User, "alice").unwrap();

    for rule in ["bob,mallory", "bob\nmallory", "bob\0", ""] {
        let err = acl.apply(BatchOp::Incr, &[rule]).unwrap_err();
        assert!(matches!(err, AclError::InvalidArgument(_)), "{:?}", rule);
    }
    assert_eq!(acl.encode(), "alice");
}

#[test]
fn test_oversized_rule_rejected() {
    let mut acl = AclAttribute::new(AclType::Host);
    let huge = "a".repeat(batch_acl::MAX_RULE_LEN + 1);
    assert!(matches!(
        acl.apply(BatchOp::Set, &[huge.as_str()]),
        Err(AclError::InvalidArgument(_))
    ));
    assert!(!acl.is_set());
}
