//! Hook selection for one snapshot and one pass.
//!
//! A registration is selected when:
//!
//! - its interest states contain the snapshot's *current* state
//!   (`interest & state == state`);
//! - it has the capability the pass needs, and for the pre passes its
//!   `requires_validation` flag equals `pass == PreValidationGated`.
//!
//! Selected registrations are stably sorted: explicitly ordered hooks first,
//! ascending by order, then unordered hooks in registration order.

use super::definitions::{DispatchPass, Hook};
use super::registry::HookRegistration;
use super::snapshot::EntityChangeSnapshot;

/// Returns the ordered registrations to run for `snapshot` in `pass`.
///
/// An empty result is a normal outcome.
pub fn select<'a>(
    registrations: impl IntoIterator<Item = &'a HookRegistration>,
    snapshot: &EntityChangeSnapshot,
    pass: DispatchPass,
) -> Vec<&'a HookRegistration> {
    let state = snapshot.current_state();

    let mut selected: Vec<&HookRegistration> = registrations
        .into_iter()
        .filter(|r| {
            r.hook()
                .interest_states()
                .is_some_and(|interest| interest.accepts(state))
        })
        .filter(|r| matches_pass(r.hook(), pass))
        .collect();

    selected.sort_by_key(|r| (r.order().is_none(), r.order()));
    selected
}

fn matches_pass(hook: &Hook, pass: DispatchPass) -> bool {
    match (pass, hook) {
        (DispatchPass::PreNoValidation, Hook::PreAction(h)) => !h.requires_validation(),
        (DispatchPass::PreValidationGated, Hook::PreAction(h)) => h.requires_validation(),
        (DispatchPass::Post, Hook::PostAction(_)) => true,
        _ => false,
    }
}
