//! Position-addressed work tree mirroring the element tree.
//!
//! Every pass allocates its fibers into a fresh [`FiberTree`] arena. Links
//! (`parent`, `child`, `sibling`) are ids into the same arena; `alternate`
//! is an id into the previously committed tree and is cleared once the
//! tree itself is committed.

use std::any::Any;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::element::{ElementType, Props};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(usize);

impl FiberId {
    /// The root fiber of every tree, bound to the host container.
    pub const ROOT: FiberId = FiberId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EffectTag {
    #[default]
    None,
    Placement,
    Update,
    Deletion,
}

pub(crate) type HookSlot = Rc<dyn Any>;

pub struct Fiber<N> {
    /// `None` only for the root fiber.
    pub(crate) ty: Option<ElementType>,
    pub(crate) props: Rc<Props>,
    pub(crate) host_node: Option<N>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect_tag: EffectTag,
    pub(crate) hooks: Vec<HookSlot>,
    /// Slot in the parent's children list, counting empty slots.
    pub(crate) index: usize,
}

impl<N> Fiber<N> {
    pub(crate) fn new(
        ty: Option<ElementType>,
        props: Rc<Props>,
        parent: Option<FiberId>,
        index: usize,
    ) -> Self {
        Self {
            ty,
            props,
            host_node: None,
            parent,
            child: None,
            sibling: None,
            alternate: None,
            effect_tag: EffectTag::None,
            hooks: Vec::new(),
            index,
        }
    }

    pub fn element_type(&self) -> Option<&ElementType> {
        self.ty.as_ref()
    }

    pub fn props(&self) -> &Rc<Props> {
        &self.props
    }

    pub fn host_node(&self) -> Option<&N> {
        self.host_node.as_ref()
    }

    pub fn parent(&self) -> Option<FiberId> {
        self.parent
    }

    pub fn child(&self) -> Option<FiberId> {
        self.child
    }

    pub fn sibling(&self) -> Option<FiberId> {
        self.sibling
    }

    pub fn alternate(&self) -> Option<FiberId> {
        self.alternate
    }

    pub fn effect_tag(&self) -> EffectTag {
        self.effect_tag
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_component(&self) -> bool {
        matches!(self.ty, Some(ElementType::Component(_)))
    }

    pub fn label(&self) -> &str {
        self.ty.as_ref().map_or("#root", ElementType::label)
    }
}

impl<N: fmt::Debug> fmt::Debug for Fiber<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fiber")
            .field("type", &self.label())
            .field("host_node", &self.host_node)
            .field("effect_tag", &self.effect_tag)
            .field("alternate", &self.alternate)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Arena holding every fiber of one pass.
pub struct FiberTree<N> {
    fibers: Vec<Fiber<N>>, // FUTURE(no_std): migrate to arena-backed fiber storage.
}

impl<N> FiberTree<N> {
    pub(crate) fn with_root(container: N, props: Rc<Props>, alternate: Option<FiberId>) -> Self {
        let mut root = Fiber::new(None, props, None, 0);
        root.host_node = Some(container);
        root.alternate = alternate;
        Self { fibers: vec![root] }
    }

    pub(crate) fn push(&mut self, fiber: Fiber<N>) -> FiberId {
        let id = FiberId(self.fibers.len());
        self.fibers.push(fiber);
        id
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id.0)
    }

    pub fn root(&self) -> &Fiber<N> {
        &self.fibers[FiberId::ROOT.0]
    }

    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// The fiber after `id` in depth-first preorder: its child, otherwise
    /// the first sibling found walking up through parents.
    pub fn next_unit(&self, id: FiberId) -> Option<FiberId> {
        if let Some(child) = self[id].child {
            return Some(child);
        }
        let mut cursor = Some(id);
        while let Some(fiber) = cursor {
            if let Some(sibling) = self[fiber].sibling {
                return Some(sibling);
            }
            cursor = self[fiber].parent;
        }
        None
    }

    /// Direct children of `id`, following the sibling chain.
    pub fn children(&self, id: FiberId) -> impl Iterator<Item = FiberId> + '_ {
        std::iter::successors(self[id].child, move |current| self[*current].sibling)
    }

    /// All fibers reachable from the root, in preorder.
    pub fn preorder(&self) -> Vec<FiberId> {
        let mut order = Vec::with_capacity(self.fibers.len());
        let mut stack = vec![FiberId::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(sibling) = self[id].sibling {
                stack.push(sibling);
            }
            if let Some(child) = self[id].child {
                stack.push(child);
            }
        }
        order
    }

    /// Host node of the closest ancestor of `id` that owns one.
    pub fn host_parent(&self, id: FiberId) -> Option<&N> {
        let mut cursor = self[id].parent;
        while let Some(ancestor) = cursor {
            if let Some(node) = self[ancestor].host_node.as_ref() {
                return Some(node);
            }
            cursor = self[ancestor].parent;
        }
        None
    }

    pub(crate) fn release_alternates(&mut self) {
        for fiber in &mut self.fibers {
            fiber.alternate = None;
        }
    }
}

/// Scheduler state carried across yields: the committed tree, the tree
/// under construction, the traversal cursor and the pending deletions
/// (ids into the committed tree).
pub(crate) struct WorkState<N> {
    pub(crate) current: Option<FiberTree<N>>,
    pub(crate) wip: Option<FiberTree<N>>,
    pub(crate) next_unit: Option<FiberId>,
    pub(crate) deletions: Vec<FiberId>,
}

impl<N> WorkState<N> {
    pub(crate) fn new() -> Self {
        Self {
            current: None,
            wip: None,
            next_unit: None,
            deletions: Vec::new(),
        }
    }

    pub(crate) fn discard_pass(&mut self) {
        self.wip = None;
        self.next_unit = None;
        let deletions = std::mem::take(&mut self.deletions);
        self.unmark_deletions(&deletions);
    }

    /// Clears `Deletion` tags a dropped pass left on committed fibers.
    pub(crate) fn unmark_deletions(&mut self, deletions: &[FiberId]) {
        if let Some(current) = self.current.as_mut() {
            for &id in deletions {
                current[id].effect_tag = EffectTag::None;
            }
        }
    }
}

impl<N> Index<FiberId> for FiberTree<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Self::Output {
        &self.fibers[id.0]
    }
}

impl<N> IndexMut<FiberId> for FiberTree<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Self::Output {
        &mut self.fibers[id.0]
    }
}

#[cfg(test)]
#[path = "tests/fiber_tests.rs"]
mod tests;
