use batch_acl::acl::{
    apply, AclAttribute, AclEvaluator, AclType, BatchOp, CachedGroupDirectory, GroupDirectory,
    RuleBuffer, RuleOrder, StaticGroupDirectory,
};
use batch_acl::config::AclConfigBuilder;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Distinct host rules spread over a handful of domains
fn host_rules(count: usize) -> Vec<String> {
    let domains = ["example.com", "cluster.local", "hpc.example.org", "lab.net"];
    let mut rules: Vec<String> = (0..count)
        .map(|i| {
            let domain = domains[i % domains.len()];
            match i % 7 {
                0 => format!("-bad{}.{}", i, domain),
                _ => format!("node{}.{}", i, domain),
            }
        })
        .collect();
    for domain in domains {
        rules.push(format!("*.{}", domain));
    }
    rules
}

fn evaluator(directory: Arc<dyn GroupDirectory>) -> AclEvaluator {
    let config = AclConfigBuilder::new()
        .server_host("head01.example.com")
        .build()
        .unwrap();
    AclEvaluator::with_directory(config, directory)
}

/// Benchmark host checks against ACLs of increasing size
fn bench_host_check(c: &mut Criterion) {
    let sizes = vec![10, 100, 1_000];

    let mut group = c.benchmark_group("host_check");

    for size in sizes {
        let mut acl = AclAttribute::new(AclType::Host);
        acl.apply(BatchOp::Set, &host_rules(size)).unwrap();
        let eval = evaluator(Arc::new(StaticGroupDirectory::new()));

        let mut rng = StdRng::seed_from_u64(42);
        let candidates: Vec<String> = (0..256)
            .map(|_| {
                let i = rng.gen_range(0..size * 2);
                format!("node{}.example.com", i)
            })
            .collect();

        group.throughput(Throughput::Elements(candidates.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                for candidate in &candidates {
                    let allowed = eval.check(&acl, AclType::Host, Some(candidate));
                    black_box(allowed);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark sorted insertion into a growing host ACL
fn bench_incr_insertion(c: &mut Criterion) {
    let sizes = vec![100, 1_000];

    let mut group = c.benchmark_group("incr_insertion");

    for size in sizes {
        let rules = host_rules(size);
        group.throughput(Throughput::Elements(rules.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &rules, |b, rules| {
            b.iter(|| {
                let mut buf = RuleBuffer::new();
                for rule in rules {
                    apply(&mut buf, &[rule], BatchOp::Incr, RuleOrder::Host).unwrap();
                }
                black_box(buf.len());
            });
        });
    }

    group.finish();
}

/// Benchmark group checks with and without the lookup cache
fn bench_group_check(c: &mut Criterion) {
    let mut directory = StaticGroupDirectory::new();
    for i in 0..64 {
        let user = format!("user{}", i);
        let groups = if i % 2 == 0 { vec!["hpc", "staff"] } else { vec!["staff"] };
        directory.add_user(&user, &groups);
    }
    let users: Vec<String> = (0..64).map(|i| format!("user{}", i)).collect();
    let acl = AclAttribute::decode(AclType::Group, "-banned,hpc").unwrap();

    let mut group = c.benchmark_group("group_check");
    group.throughput(Throughput::Elements(users.len() as u64));

    let plain = evaluator(Arc::new(directory.clone()));
    group.bench_function("static", |b| {
        b.iter(|| {
            for user in &users {
                black_box(plain.check(&acl, AclType::Group, Some(user)));
            }
        });
    });

    let cached = evaluator(Arc::new(CachedGroupDirectory::new(
        directory,
        NonZeroUsize::new(128).unwrap(),
    )));
    group.bench_function("cached", |b| {
        b.iter(|| {
            for user in &users {
                black_box(cached.check(&acl, AclType::Group, Some(user)));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_host_check,
    bench_incr_insertion,
    bench_group_check
);
criterion_main!(benches);
