use super::*;
use crate::element::{create_element, Attributes, Props};
use crate::fiber::FiberTree;
use std::rc::Rc;

fn el(tag: &str) -> Element {
    create_element(tag, Attributes::new(), vec![])
}

fn begin(state: &mut WorkState<usize>, children: Vec<Option<Element>>) -> Rc<Props> {
    let props = Rc::new(Props {
        attributes: Attributes::new(),
        children,
    });
    let alternate = state.current.as_ref().map(|_| FiberId::ROOT);
    state.wip = Some(FiberTree::with_root(0, Rc::clone(&props), alternate));
    props
}

/// Stands in for the commit phase: hands out fake host nodes and promotes
/// the tree.
fn promote(state: &mut WorkState<usize>) {
    let mut tree = state.wip.take().expect("pass in flight");
    for (n, id) in tree.preorder().into_iter().enumerate() {
        if tree[id].host_node.is_none() {
            tree[id].host_node = Some(100 + n);
        }
    }
    tree.release_alternates();
    state.current = Some(tree);
    state.deletions.clear();
}

fn summary(state: &WorkState<usize>) -> Vec<(String, EffectTag, usize)> {
    let wip = state.wip.as_ref().expect("pass in flight");
    wip.children(FiberId::ROOT)
        .map(|id| (wip[id].label().to_owned(), wip[id].effect_tag, wip[id].index))
        .collect()
}

#[test]
fn first_pass_places_every_element_and_skips_empty_slots() {
    let mut state = WorkState::new();
    let props = begin(&mut state, vec![Some(el("h1")), None, Some(el("p"))]);

    reconcile_children(&mut state, FiberId::ROOT, &props.children);

    assert_eq!(
        summary(&state),
        vec![
            ("h1".to_owned(), EffectTag::Placement, 0),
            ("p".to_owned(), EffectTag::Placement, 2),
        ]
    );
    assert!(state.deletions.is_empty());
}

#[test]
fn same_type_at_same_slot_reuses_host_node() {
    let mut state = WorkState::new();
    let props = begin(&mut state, vec![Some(el("h1")), Some(el("p"))]);
    reconcile_children(&mut state, FiberId::ROOT, &props.children);
    promote(&mut state);
    let old_nodes: Vec<_> = {
        let current = state.current.as_ref().unwrap();
        current
            .children(FiberId::ROOT)
            .map(|id| current[id].host_node)
            .collect()
    };

    let props = begin(&mut state, vec![Some(el("h1")), Some(el("p"))]);
    reconcile_children(&mut state, FiberId::ROOT, &props.children);

    let wip = state.wip.as_ref().unwrap();
    let reused: Vec<_> = wip
        .children(FiberId::ROOT)
        .map(|id| wip[id].host_node)
        .collect();
    assert_eq!(reused, old_nodes);
    assert!(wip
        .children(FiberId::ROOT)
        .all(|id| wip[id].effect_tag == EffectTag::Update && wip[id].alternate.is_some()));
}

#[test]
fn type_change_replaces_fiber() {
    let mut state = WorkState::new();
    let props = begin(&mut state, vec![Some(el("h1")), Some(el("p"))]);
    reconcile_children(&mut state, FiberId::ROOT, &props.children);
    promote(&mut state);

    let props = begin(&mut state, vec![Some(el("h1")), Some(el("span"))]);
    reconcile_children(&mut state, FiberId::ROOT, &props.children);

    assert_eq!(
        summary(&state),
        vec![
            ("h1".to_owned(), EffectTag::Update, 0),
            ("span".to_owned(), EffectTag::Placement, 1),
        ]
    );
    let current = state.current.as_ref().unwrap();
    assert_eq!(state.deletions.len(), 1);
    assert_eq!(current[state.deletions[0]].label(), "p");
    assert_eq!(current[state.deletions[0]].effect_tag, EffectTag::Deletion);
}

#[test]
fn shrinking_deletes_trailing_fibers() {
    let mut state = WorkState::new();
    let props = begin(&mut state, vec![Some(el("li")), Some(el("li")), Some(el("li"))]);
    reconcile_children(&mut state, FiberId::ROOT, &props.children);
    promote(&mut state);

    let props = begin(&mut state, vec![Some(el("li")), Some(el("li"))]);
    reconcile_children(&mut state, FiberId::ROOT, &props.children);

    assert_eq!(summary(&state).len(), 2);
    let current = state.current.as_ref().unwrap();
    let deleted: Vec<_> = state.deletions.iter().map(|id| current[*id].index).collect();
    assert_eq!(deleted, vec![2]);
}

#[test]
fn empty_slot_keeps_later_siblings_in_place() {
    let mut state = WorkState::new();
    let props = begin(&mut state, vec![Some(el("h1")), None, Some(el("p"))]);
    reconcile_children(&mut state, FiberId::ROOT, &props.children);
    promote(&mut state);

    let props = begin(&mut state, vec![Some(el("h1")), Some(el("span")), Some(el("p"))]);
    reconcile_children(&mut state, FiberId::ROOT, &props.children);

    assert_eq!(
        summary(&state),
        vec![
            ("h1".to_owned(), EffectTag::Update, 0),
            ("span".to_owned(), EffectTag::Placement, 1),
            ("p".to_owned(), EffectTag::Update, 2),
        ]
    );
    assert!(state.deletions.is_empty());

    promote(&mut state);
    let props = begin(&mut state, vec![Some(el("h1")), None, Some(el("p"))]);
    reconcile_children(&mut state, FiberId::ROOT, &props.children);

    assert_eq!(
        summary(&state),
        vec![
            ("h1".to_owned(), EffectTag::Update, 0),
            ("p".to_owned(), EffectTag::Update, 2),
        ]
    );
    let current = state.current.as_ref().unwrap();
    let deleted: Vec<_> = state.deletions.iter().map(|id| current[*id].label()).collect();
    assert_eq!(deleted, vec!["span"]);
}
