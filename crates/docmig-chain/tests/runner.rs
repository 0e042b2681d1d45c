//! Chain runner behavior over multi-step chains

use std::sync::{Arc, Mutex};

use docmig_chain::{
    bump_version, ChainError, MigrationChain, MigrationOutcome, MigrationStep, Version,
};
use docmig_patch::PatchRule;
use docmig_tree::Document;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

type Log = Arc<Mutex<Vec<Version>>>;

fn v(n: u64) -> Version {
    Version::new(0, 0, n)
}

/// `0.0.1 -> ... -> 0.0.7`, steps listed newest first
fn seven(log: &Log) -> MigrationChain {
    let steps = (1..=6)
        .rev()
        .map(|n| {
            let log = Arc::clone(log);
            MigrationStep::new(v(n), v(n + 1), "", "", move |mut user, _, _| {
                log.lock().unwrap().push(v(n + 1));
                bump_version(&mut user, v(n + 1))?;
                Ok(user)
            })
        })
        .collect();
    MigrationChain::new(steps)
}

fn at(version: u64) -> Document {
    Document::parse(&format!("# ctx\n\nversion: {}\nname: devnet\n", v(version))).unwrap()
}

#[test]
fn full_chain_applies_every_step_in_order() {
    let log = Log::default();
    let chain = seven(&log);
    chain.validate().unwrap();

    let outcome = chain.migrate_to(at(1), v(7)).unwrap();
    let MigrationOutcome::Migrated(m) = outcome else {
        panic!("expected a migration");
    };
    assert_eq!(m.applied.len(), 6);
    assert_eq!((m.from, m.to), (v(1), v(7)));
    assert_eq!(*log.lock().unwrap(), (2..=7).map(v).collect::<Vec<_>>());
    assert_eq!(m.document.to_yaml(), "# ctx\n\nversion: 0.0.7\nname: devnet\n");
}

#[test]
fn partial_target_halts_there() {
    let log = Log::default();
    let outcome = seven(&log).migrate_to(at(1), v(4)).unwrap();
    assert_eq!(outcome.steps_applied(), 3);
    assert_eq!(outcome.document().version(), Some("0.0.4"));
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
fn missing_intermediate_step_is_named() {
    let log = Log::default();
    let steps = seven(&log)
        .steps()
        .iter()
        .filter(|s| s.from() != v(4))
        .cloned()
        .collect();
    let chain = MigrationChain::new(steps);

    assert_eq!(chain.validate(), Err(ChainError::Gap { version: v(4) }));
    assert_eq!(
        chain.migrate_to(at(2), v(7)).unwrap_err(),
        ChainError::Incomplete {
            stalled: v(4),
            target: v(7),
        }
    );
}

#[test]
fn up_to_date_document_is_returned_unchanged() {
    let log = Log::default();
    let outcome = seven(&log).migrate_to(at(7), v(7)).unwrap();
    assert_eq!(outcome, MigrationOutcome::UpToDate(at(7)));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn rule_based_steps_compose() {
    let chain = MigrationChain::new(vec![
        MigrationStep::from_rules(
            v(1),
            v(2),
            "version: 0.0.1\nblock: 100\n",
            "version: 0.0.2\nblock: 200\nblock_time: 12\n",
            vec![
                PatchRule::if_unchanged("block".parse().unwrap()),
                PatchRule::if_unchanged("block_time".parse().unwrap()),
            ],
        ),
        MigrationStep::from_rules(
            v(2),
            v(3),
            "version: 0.0.2\nblock: 200\nblock_time: 12\n",
            "version: 0.0.3\nblock: 300\nblock_time: 2\n",
            vec![
                PatchRule::if_unchanged("block".parse().unwrap()),
                PatchRule::always("block_time".parse().unwrap()),
            ],
        ),
    ]);

    let untouched = Document::parse("version: 0.0.1\nblock: 100\n").unwrap();
    let customized = Document::parse("version: 0.0.1\nblock: 42 # fork here\n").unwrap();

    assert_eq!(
        chain.migrate_to(untouched, v(3)).unwrap().document().to_yaml(),
        "version: 0.0.3\nblock: 300\nblock_time: 2\n"
    );
    assert_eq!(
        chain.migrate_to(customized, v(3)).unwrap().document().to_yaml(),
        "version: 0.0.3\nblock: 42 # fork here\nblock_time: 2\n"
    );
}

proptest! {
    #[test]
    fn version_order_matches_numeric_tuples(
        a in (0u64..20, 0u64..20, 0u64..20),
        b in (0u64..20, 0u64..20, 0u64..20),
    ) {
        let va: Version = format!("{}.{}.{}", a.0, a.1, a.2).parse().unwrap();
        let vb: Version = format!("{}.{}.{}", b.0, b.1, b.2).parse().unwrap();
        prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
        prop_assert_eq!(va.to_string().parse::<Version>().unwrap(), va);
    }

    #[test]
    fn any_start_reaches_any_later_target(start in 1u64..=7, target in 1u64..=7) {
        prop_assume!(start <= target);
        let log = Log::default();
        let outcome = seven(&log).migrate_to(at(start), v(target)).unwrap();
        prop_assert_eq!(outcome.steps_applied() as u64, target - start);
        prop_assert_eq!(outcome.is_up_to_date(), start == target);
        let expected = v(target).to_string();
        prop_assert_eq!(outcome.document().version(), Some(expected.as_str()));
    }
}
