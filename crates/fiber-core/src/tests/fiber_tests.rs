use super::*;
use crate::element::{create_element, Attributes};

fn leaf(tree: &mut FiberTree<usize>, tag: &str, parent: FiberId, index: usize) -> FiberId {
    let element = create_element(tag, Attributes::new(), vec![]);
    let fiber = Fiber::new(
        Some(element.element_type().clone()),
        element.props().clone(),
        Some(parent),
        index,
    );
    tree.push(fiber)
}

fn link(tree: &mut FiberTree<usize>, parent: FiberId, children: &[FiberId]) {
    tree[parent].child = children.first().copied();
    for pair in children.windows(2) {
        tree[pair[0]].sibling = Some(pair[1]);
    }
}

// root
// └── div
//     ├── h1
//     │   └── span
//     └── ul
//         ├── li
//         └── li
fn sample_tree() -> (FiberTree<usize>, Vec<FiberId>) {
    let mut tree = FiberTree::with_root(0usize, Default::default(), None);
    let div = leaf(&mut tree, "div", FiberId::ROOT, 0);
    link(&mut tree, FiberId::ROOT, &[div]);
    let h1 = leaf(&mut tree, "h1", div, 0);
    let ul = leaf(&mut tree, "ul", div, 1);
    link(&mut tree, div, &[h1, ul]);
    let span = leaf(&mut tree, "span", h1, 0);
    link(&mut tree, h1, &[span]);
    let first = leaf(&mut tree, "li", ul, 0);
    let second = leaf(&mut tree, "li", ul, 1);
    link(&mut tree, ul, &[first, second]);
    (tree, vec![FiberId::ROOT, div, h1, span, ul, first, second])
}

#[test]
fn next_unit_walks_depth_first_preorder() {
    let (tree, expected) = sample_tree();

    let mut visited = vec![FiberId::ROOT];
    let mut cursor = tree.next_unit(FiberId::ROOT);
    while let Some(id) = cursor {
        visited.push(id);
        cursor = tree.next_unit(id);
    }

    assert_eq!(visited, expected);
    assert_eq!(tree.preorder(), expected);
}

#[test]
fn host_parent_skips_fibers_without_nodes() {
    let (mut tree, order) = sample_tree();
    let (div, span) = (order[1], order[3]);

    assert_eq!(tree.host_parent(span), Some(&0));

    tree[div].host_node = Some(7);
    assert_eq!(tree.host_parent(span), Some(&7));
    assert_eq!(tree.host_parent(FiberId::ROOT), None);
}

#[test]
fn children_follow_sibling_chain() {
    let (tree, order) = sample_tree();
    let labels: Vec<&str> = tree
        .children(order[1])
        .map(|id| tree[id].label())
        .collect();
    assert_eq!(labels, vec!["h1", "ul"]);
    assert_eq!(tree.root().label(), "#root");
}
