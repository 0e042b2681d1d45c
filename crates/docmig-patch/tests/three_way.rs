//! Three-way patch properties over realistic and generated documents

use std::collections::BTreeMap;

use docmig_patch::{Condition, PatchEngine, PatchRule, RuleOutcome};
use docmig_tree::{DocPath, Document, Entry, Node};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const OLD: &str = "\
version: 0.0.1
chains:
  l1:
    chain_id: 31337
    rpc_url: http://localhost:8545
    fork:
      block: 22475020
";

const NEW: &str = "\
version: 0.0.2
chains:
  l1:
    chain_id: 31337
    rpc_url: http://localhost:8545
    fork:
      block: 22620000
      block_time: 12
";

fn rule(path: &str) -> PatchRule {
    PatchRule::if_unchanged(path.parse().unwrap())
}

#[test]
fn user_edits_survive_next_to_default_updates() {
    let user_src = "\
version: 0.0.1
# my chains
chains:
  l1:
    chain_id: 1337 # custom
    rpc_url: http://localhost:8545
    fork:
      block: 22475020
      url: https://rpc.example
";
    let old = Document::parse(OLD).unwrap();
    let new = Document::parse(NEW).unwrap();
    let mut user = Document::parse(user_src).unwrap();

    let report = PatchEngine::new(vec![
        rule("chains.l1.chain_id"),
        rule("chains.l1.fork.block"),
        rule("chains.l1.fork.block_time"),
    ])
    .apply(user.root_mut(), old.root(), new.root())
    .unwrap();

    assert_eq!(report.outcome("chains.l1.chain_id"), Some(RuleOutcome::Preserved));
    assert_eq!(report.outcome("chains.l1.fork.block"), Some(RuleOutcome::Replaced));
    assert_eq!(
        report.outcome("chains.l1.fork.block_time"),
        Some(RuleOutcome::Inserted { index: 1 })
    );
    assert_eq!(
        user.to_yaml(),
        "\
version: 0.0.1
# my chains
chains:
  l1:
    chain_id: 1337 # custom
    rpc_url: http://localhost:8545
    fork:
      block: 22620000
      block_time: 12
      url: https://rpc.example
"
    );
}

#[test]
fn applying_twice_changes_nothing_the_second_time() {
    let old = Document::parse(OLD).unwrap();
    let new = Document::parse(NEW).unwrap();
    let mut user = Document::parse(OLD).unwrap();
    let engine = PatchEngine::new(vec![
        rule("chains.l1.fork.block"),
        rule("chains.l1.fork.block_time"),
    ]);

    engine.apply(user.root_mut(), old.root(), new.root()).unwrap();
    let once = user.to_yaml();
    let report = engine.apply(user.root_mut(), old.root(), new.root()).unwrap();

    assert!(!report.changed());
    assert_eq!(user.to_yaml(), once);
}

fn flat(pairs: &BTreeMap<String, i64>) -> Node {
    Node::mapping(
        pairs
            .iter()
            .map(|(k, v)| Entry::new(k.clone(), Node::int(*v)))
            .collect(),
    )
}

fn values() -> impl Strategy<Value = BTreeMap<String, i64>> {
    prop::collection::btree_map("[a-f]", 0i64..4, 0..6)
}

proptest! {
    #[test]
    fn if_unchanged_preserves_or_propagates(old in values(), new in values(), user in values()) {
        let (old_root, new_root) = (flat(&old), flat(&new));
        let mut user_root = flat(&user);
        let rules = new
            .keys()
            .map(|k| PatchRule::new(DocPath::single(k.clone()), Condition::IfUnchanged))
            .collect();

        PatchEngine::new(rules).apply(&mut user_root, &old_root, &new_root).unwrap();

        for (key, value) in &user {
            let got = user_root.get(key).and_then(Node::as_str).map(str::to_string);
            let expected = match (old.get(key), new.get(key)) {
                (Some(o), Some(n)) if o == value => n,
                _ => value,
            };
            prop_assert_eq!(got, Some(expected.to_string()));
        }
        for (key, value) in &new {
            if !user.contains_key(key) {
                let got = user_root.get(key).and_then(Node::as_str).map(str::to_string);
                prop_assert_eq!(got, Some(value.to_string()));
            }
        }
        prop_assert_eq!(user_root.len(), user.keys().chain(new.keys()).collect::<std::collections::BTreeSet<_>>().len());
    }
}
