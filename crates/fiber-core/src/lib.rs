#![doc = r"Core pieces of the fiber reconciliation engine: elements, fiber trees, the interruptible scheduler and the host boundary."]

mod collections;
mod commit;
pub mod element;
mod error;
pub mod fiber;
mod hooks;
pub mod host;
pub mod mutation;
pub mod platform;
mod reconcile;
mod scheduler;

pub use commit::CommitSummary;
pub use element::{
    create_element, create_text_element, Attributes, Child, Component, Element, ElementType,
    Listener, PropValue, Props, RenderFn, NODE_VALUE,
};
pub use error::FiberError;
pub use fiber::{EffectTag, Fiber, FiberId, FiberTree};
pub use hooks::{use_state, SetState, Update};
pub use host::{Host, HostNodeId, HostNodeKind, HostOp, MemoryHost};
pub use platform::{
    DeadlineBudget, DefaultScheduler, IdleDeadline, IdleScheduler, Unbounded, UnitBudget,
    WorkBudget,
};
pub use scheduler::{render, Root, RootConfig, RootHandle, WorkStatus};
