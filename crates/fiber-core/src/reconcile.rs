//! Positional diff of a fiber's previous children against new elements.

use crate::element::Element;
use crate::fiber::{EffectTag, Fiber, FiberId, WorkState};

/// Builds the child chain of `parent` in the work-in-progress tree from
/// `elements`, comparing slot by slot with the children of
/// `parent.alternate`.
///
/// Same type at the same slot reuses the old host node (`Update`); any
/// other element is a fresh `Placement`; an old fiber without a match is
/// tagged `Deletion` and queued for removal. Old fibers are matched by the
/// slot index they were created at, so empty slots never shift siblings.
pub(crate) fn reconcile_children<N: Clone>(
    state: &mut WorkState<N>,
    parent: FiberId,
    elements: &[Option<Element>],
) {
    let WorkState {
        current,
        wip,
        deletions,
        ..
    } = state;
    let Some(wip) = wip.as_mut() else {
        return;
    };
    let mut current = current.as_mut();

    let mut old_fiber = match (current.as_deref(), wip[parent].alternate) {
        (Some(tree), Some(alternate)) => tree[alternate].child,
        _ => None,
    };
    let mut previous_sibling: Option<FiberId> = None;
    let mut index = 0;

    while index < elements.len() || old_fiber.is_some() {
        let element = elements.get(index).and_then(Option::as_ref);

        let mut old_here = None;
        if let (Some(tree), Some(old)) = (current.as_deref(), old_fiber) {
            if tree[old].index <= index {
                old_here = Some(old);
                old_fiber = tree[old].sibling;
            }
        }

        let reused = match (current.as_deref(), old_here, element) {
            (Some(tree), Some(old), Some(element))
                if tree[old].ty.as_ref() == Some(element.element_type()) =>
            {
                Some((old, tree[old].host_node.clone()))
            }
            _ => None,
        };

        let new_fiber = element.map(|element| {
            let mut fiber = Fiber::new(
                Some(element.element_type().clone()),
                element.props().clone(),
                Some(parent),
                index,
            );
            match &reused {
                Some((old, host_node)) => {
                    fiber.host_node = host_node.clone();
                    fiber.alternate = Some(*old);
                    fiber.effect_tag = EffectTag::Update;
                }
                None => fiber.effect_tag = EffectTag::Placement,
            }
            wip.push(fiber)
        });

        if let (Some(old), None) = (old_here, &reused) {
            if let Some(tree) = current.as_deref_mut() {
                tree[old].effect_tag = EffectTag::Deletion;
            }
            deletions.push(old);
        }

        if let Some(id) = new_fiber {
            match previous_sibling {
                Some(previous) => wip[previous].sibling = Some(id),
                None => wip[parent].child = Some(id),
            }
            previous_sibling = Some(id);
        }

        index += 1;
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
