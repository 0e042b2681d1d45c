//! Migration steps of the context family
//!
//! - `0.0.1 -> 0.0.2`: newer fork block, L1 `block_time`, new `l2` chain
//! - `0.0.2 -> 0.0.3`: `deployer_private_key` renamed to `deployer_key`,
//!   new `eigenlayer` section after `avs`
//! - `0.0.3 -> 0.0.4`: `app_private_key` dropped, RPC URLs moved to `127.0.0.1`

use docmig_chain::{bump_version, MigrationChain, MigrationStep, StepError};
use docmig_patch::PatchRule;
use docmig_tree::{DocPath, Document, Entry, Node};

use crate::templates::{
    CONTEXT_V0_0_1, CONTEXT_V0_0_2, CONTEXT_V0_0_3, CONTEXT_V0_0_4, V0_0_1, V0_0_2, V0_0_3, V0_0_4,
};

const CONTEXT: &str = "context";

fn rule(path: &str) -> PatchRule {
    PatchRule::if_unchanged(DocPath::from_segments(path.split('.')))
}

/// Every step of the context family, oldest first
#[must_use]
pub fn context_chain() -> MigrationChain {
    MigrationChain::new(vec![
        MigrationStep::from_rules(
            V0_0_1,
            V0_0_2,
            CONTEXT_V0_0_1,
            CONTEXT_V0_0_2,
            vec![
                rule("context.chains.l1.fork.block"),
                rule("context.chains.l1.fork.block_time"),
                rule("context.chains.l2"),
            ],
        ),
        MigrationStep::new(V0_0_2, V0_0_3, CONTEXT_V0_0_2, CONTEXT_V0_0_3, to_0_0_3),
        MigrationStep::from_rules(
            V0_0_3,
            V0_0_4,
            CONTEXT_V0_0_3,
            CONTEXT_V0_0_4,
            vec![
                PatchRule::always(DocPath::from_segments([CONTEXT, "app_private_key"])).removing(),
                rule("context.chains.l1.rpc_url"),
                rule("context.chains.l2.rpc_url"),
            ],
        ),
    ])
}

/// Key rename plus a section insert next to a sibling the patch engine
/// would not pick
fn to_0_0_3(mut user: Document, _old: &Document, new: &Document) -> Result<Document, StepError> {
    let eigenlayer = default_entry(new, "eigenlayer")?;
    let context = user
        .root_mut()
        .get_mut(CONTEXT)
        .filter(|node| node.is_mapping())
        .ok_or_else(|| StepError::precondition("document has no 'context' mapping"))?;

    context.rename_key("deployer_private_key", "deployer_key")?;
    if context.get("eigenlayer").is_none() {
        context.insert_after("avs", eigenlayer)?;
    }

    bump_version(&mut user, V0_0_3)?;
    Ok(user)
}

/// `context.<key>` of a default document, key comments included
fn default_entry(doc: &Document, key: &str) -> Result<Entry, StepError> {
    doc.root()
        .get(CONTEXT)
        .and_then(Node::entries)
        .and_then(|entries| entries.iter().find(|e| e.key_str() == Some(key)))
        .cloned()
        .ok_or_else(|| StepError::precondition(format!("default document has no 'context.{key}'")))
}
