use std::fmt;

use crate::fiber::FiberId;

/// Errors surfaced by the reconciler, the commit phase, hooks and hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiberError {
    /// `use_state` was called while no component was being rendered.
    InvalidHookContext,
    /// The hook at `index` holds state of a different type than requested,
    /// which only happens when hook call order changed between renders.
    HookTypeMismatch { index: usize, expected: &'static str },
    /// The host cannot create a node for this tag.
    UnsupportedElementType { tag: String },
    /// A deletion walk reached a fiber with neither a host node nor a child.
    MalformedSubtree { fiber: FiberId },
    /// The host has no live node with this id.
    MissingNode { id: usize },
    /// A state setter was invoked while its root was rendering.
    ReentrantUpdate,
}

impl fmt::Display for FiberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FiberError::InvalidHookContext => {
                write!(f, "use_state called outside of a component render")
            }
            FiberError::HookTypeMismatch { index, expected } => {
                write!(f, "hook {index} does not hold state of type {expected}")
            }
            FiberError::UnsupportedElementType { tag } => {
                write!(f, "host cannot create an element for tag {tag:?}")
            }
            FiberError::MalformedSubtree { fiber } => {
                write!(f, "fiber {fiber} owns no host node and has no child")
            }
            FiberError::MissingNode { id } => write!(f, "host node {id} missing"),
            FiberError::ReentrantUpdate => {
                write!(f, "state update requested while the root is rendering")
            }
        }
    }
}

impl std::error::Error for FiberError {}
