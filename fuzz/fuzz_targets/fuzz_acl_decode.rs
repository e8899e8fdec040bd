#![no_main]
use arbitrary::Arbitrary;
use batch_acl::acl::{AclAttribute, AclEvaluator, AclType, BatchOp, StaticGroupDirectory};
use batch_acl::config::AclConfigBuilder;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    kind: u8,
    text: &'a str,
    ops: Vec<(u8, Vec<&'a str>)>,
    candidates: Vec<&'a str>,
}

fn acl_type(kind: u8) -> AclType {
    match kind % 4 {
        0 => AclType::Host,
        1 => AclType::User,
        2 => AclType::Group,
        _ => AclType::Subnet,
    }
}

fn batch_op(op: u8) -> BatchOp {
    match op % 3 {
        0 => BatchOp::Set,
        1 => BatchOp::Incr,
        _ => BatchOp::Decr,
    }
}

fuzz_target!(|input: Input| {
    let acl_type = acl_type(input.kind);
    let Ok(mut acl) = AclAttribute::decode(acl_type, input.text) else {
        return;
    };

    for (op, rules) in &input.ops {
        let before = acl.clone();
        if acl.apply(batch_op(*op), rules).is_err() {
            assert_eq!(acl, before);
        }
    }

    // Stored text must decode back to the same rules
    if acl.is_set() && !acl.is_empty() {
        let decoded = AclAttribute::decode(acl_type, acl.encode()).expect("encoded form decodes");
        let mut expected: Vec<&str> = acl.rules().into_iter().flatten().collect();
        let mut actual: Vec<&str> = decoded.rules().into_iter().flatten().collect();
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected);
    }

    let config = AclConfigBuilder::new().server_host("head01").build().unwrap();
    let eval = AclEvaluator::with_directory(config, Arc::new(StaticGroupDirectory::new()));
    for candidate in &input.candidates {
        let _ = eval.check(&acl, acl_type, Some(candidate));
    }
});
