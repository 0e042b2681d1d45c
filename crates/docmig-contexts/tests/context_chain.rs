//! The context family end to end: defaults, customized documents, failures

use docmig_chain::{ChainError, StepError};
use docmig_contexts::{
    context_chain, default_registry, template, CONTEXT_FAMILY, TEMPLATES, V0_0_1, V0_0_2, V0_0_3,
    V0_0_4,
};
use docmig_test_utils::{doc, path};
use docmig_tree::{Document, Node};
use pretty_assertions::assert_eq;

const CUSTOMIZED: &str = r#"# my project context

version: 0.0.1
context:
  name: "team-devnet" # shared with CI
  chains:
    l1:
      chain_id: 31337
      rpc_url: "http://anvil:8545"
      fork:
        block: 21000000
        url: "https://eth.example.org"
  # deployer for the team
  deployer_private_key: "0x01"
  app_private_key: "0x02"
  avs:
    address: "0x03"
    metadata_url: "https://team.example.org/avs.json"
    registrar_address: ""
  notes: "keep me"
"#;

const CUSTOMIZED_MIGRATED: &str = r#"# my project context

version: 0.0.4
context:
  name: "team-devnet" # shared with CI
  chains:
    l1:
      chain_id: 31337
      rpc_url: "http://anvil:8545"
      fork:
        block: 21000000
        url: "https://eth.example.org"
        block_time: 12
    # L2 forked next to the L1
    l2:
      chain_id: 31338
      rpc_url: "http://127.0.0.1:9545"
      fork:
        block: 30500000
        url: ""
        block_time: 2
  # deployer for the team
  deployer_key: "0x01"
  avs:
    address: "0x03"
    metadata_url: "https://team.example.org/avs.json"
    registrar_address: ""
  # Core contracts on the forked L1; override to point at your own deployment
  eigenlayer:
    version: "v1.3.0"
    l1:
      allocation_manager: "0x948a420b8CC1d6BFd0B6087C2E7c344a2CD0bc39"
      delegation_manager: "0x39053D51B77DC0d36036Fc1fCc8Cb819df8Ef37A"
      strategy_manager: "0x858646372CC42E1A627fcE94aa7A7033e7CF075A"
  notes: "keep me"
"#;

/// Dotted paths of every node, in document order
fn key_order(node: &Node, prefix: &str, out: &mut Vec<String>) {
    for entry in node.entries().unwrap_or_default() {
        let key = entry.key_str().unwrap_or_default();
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        out.push(path.clone());
        key_order(&entry.value, &path, out);
    }
}

fn keys(doc: &Document) -> Vec<String> {
    let mut out = Vec::new();
    key_order(doc.root(), "", &mut out);
    out
}

#[test]
fn every_default_migrates_to_the_newest_default() {
    let registry = default_registry().unwrap();
    let latest = doc(template(V0_0_4).unwrap());

    for (version, text) in TEMPLATES {
        let outcome = registry.migrate(CONTEXT_FAMILY, doc(text), None).unwrap();
        let migrated = outcome.document();

        assert_eq!(migrated.to_value(), latest.to_value(), "values from {version}");
        assert_eq!(keys(migrated), keys(&latest), "key order from {version}");
        assert_eq!(migrated.to_yaml(), latest.to_yaml(), "text from {version}");
    }
}

#[test]
fn customized_document_keeps_values_and_comments() {
    let registry = default_registry().unwrap();
    let outcome = registry
        .migrate(CONTEXT_FAMILY, doc(CUSTOMIZED), None)
        .unwrap();

    assert_eq!(outcome.steps_applied(), 3);
    let migrated = outcome.document();
    assert_eq!(
        migrated.get(&path("context.deployer_key")).and_then(Node::as_str),
        Some("0x01")
    );
    assert!(migrated.get(&path("context.app_private_key")).is_none());
    assert_eq!(migrated.to_yaml(), CUSTOMIZED_MIGRATED);
}

#[test]
fn migrating_twice_changes_nothing() {
    let registry = default_registry().unwrap();
    let once = registry
        .migrate(CONTEXT_FAMILY, doc(CUSTOMIZED), None)
        .unwrap()
        .into_document();
    let again = registry.migrate(CONTEXT_FAMILY, once.clone(), None).unwrap();

    assert!(again.is_up_to_date());
    assert_eq!(again.document(), &once);
}

#[test]
fn intermediate_target_matches_that_default() {
    let registry = default_registry().unwrap();
    let outcome = registry
        .migrate(CONTEXT_FAMILY, doc(template(V0_0_1).unwrap()), Some(V0_0_3))
        .unwrap();
    assert_eq!(outcome.document().to_yaml(), template(V0_0_3).unwrap());
}

#[test]
fn document_without_context_fails_at_the_rename_step() {
    let chain = context_chain();
    let err = chain
        .migrate_to(doc("version: 0.0.2\nname: devnet\n"), V0_0_4)
        .unwrap_err();

    assert_eq!(
        err,
        ChainError::StepFailed {
            from: V0_0_2,
            to: V0_0_3,
            source: StepError::Precondition("document has no 'context' mapping".into()),
        }
    );
}

#[test]
fn newer_document_is_not_downgraded() {
    let registry = default_registry().unwrap();
    let err = registry
        .migrate(CONTEXT_FAMILY, doc(template(V0_0_4).unwrap()), Some(V0_0_2))
        .unwrap_err();
    assert!(matches!(err, ChainError::Downgrade { .. }));
}
