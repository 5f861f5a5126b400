//! Interruptible render passes and the root that owns them.
//!
//! A pass walks the work-in-progress tree one fiber at a time. Between
//! units the loop consults a [`WorkBudget`]; when it says yield, the
//! traversal cursor is kept in the root and the host is asked for another
//! idle grant. Once the traversal finishes, the whole tree is committed at
//! once.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use crate::commit::{commit_root, CommitSummary};
use crate::element::{Attributes, Component, Element, ElementType, Props};
use crate::error::FiberError;
use crate::fiber::{FiberId, FiberTree, WorkState};
use crate::hooks::with_hook_frame;
use crate::host::Host;
use crate::mutation::create_host_node;
use crate::platform::{
    DeadlineBudget, DefaultScheduler, IdleDeadline, IdleScheduler, Unbounded, WorkBudget,
};
use crate::reconcile::reconcile_children;

#[derive(Clone, Debug)]
pub struct RootConfig {
    /// The loop yields once a grant has less than this much time left.
    pub yield_threshold: Duration,
    /// Optional cap on units performed per grant.
    pub max_units_per_grant: Option<usize>,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
            max_units_per_grant: None,
        }
    }
}

/// Outcome of one grant of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkStatus {
    /// No pass was in flight.
    Idle,
    /// The budget ran out; the pass resumes on the next grant.
    Yielded { units: usize },
    Committed(CommitSummary),
}

impl WorkStatus {
    pub fn is_committed(&self) -> bool {
        matches!(self, WorkStatus::Committed(_))
    }
}

pub(crate) trait UpdateTarget {
    fn is_rendering(&self) -> bool;
    fn schedule_update(&self) -> Result<(), FiberError>;
}

/// Weak reference to a root, held by state setters.
#[derive(Clone)]
pub struct RootHandle(Weak<dyn UpdateTarget>);

impl RootHandle {
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn is_rendering(&self) -> bool {
        self.0.upgrade().is_some_and(|root| root.is_rendering())
    }

    /// Starts a new pass from the root's latest props.
    pub fn schedule_update(&self) -> Result<(), FiberError> {
        match self.0.upgrade() {
            Some(root) => root.schedule_update(),
            None => {
                log::debug!("update for a dropped root ignored");
                Ok(())
            }
        }
    }
}

struct RootInner<N> {
    state: RefCell<WorkState<N>>,
    rendering: Cell<bool>,
    container: N,
    scheduler: Arc<dyn IdleScheduler>,
}

impl<N: Clone> RootInner<N> {
    fn begin_pass(&self, state: &mut WorkState<N>, props: Rc<Props>) {
        if let Some(unit) = state.next_unit.filter(|_| state.wip.is_some()) {
            log::debug!("abandoning in-flight pass at fiber {unit}");
        }
        let alternate = state.current.as_ref().map(|_| FiberId::ROOT);
        state.wip = Some(FiberTree::with_root(self.container.clone(), props, alternate));
        state.next_unit = Some(FiberId::ROOT);
        let abandoned = std::mem::take(&mut state.deletions);
        state.unmark_deletions(&abandoned);
    }
}

impl<N: Clone> UpdateTarget for RootInner<N> {
    fn is_rendering(&self) -> bool {
        self.rendering.get()
    }

    fn schedule_update(&self) -> Result<(), FiberError> {
        if self.rendering.get() {
            return Err(FiberError::ReentrantUpdate);
        }
        let mut state = self
            .state
            .try_borrow_mut()
            .map_err(|_| FiberError::ReentrantUpdate)?;
        // Before the first commit the in-flight pass carries the only props.
        let props = match (state.current.as_ref(), state.wip.as_ref()) {
            (Some(current), _) => Rc::clone(&current.root().props),
            (None, Some(wip)) => Rc::clone(&wip.root().props),
            (None, None) => return Ok(()),
        };
        self.begin_pass(&mut state, props);
        drop(state);
        log::debug!("state update scheduled a new pass");
        self.scheduler.request_idle_callback();
        Ok(())
    }
}

/// Owns a host, its container node and the fiber trees rendered into it.
pub struct Root<H: Host> {
    host: H,
    inner: Rc<RootInner<H::Node>>,
    config: RootConfig,
}

impl<H: Host> Root<H> {
    pub fn new(host: H, container: H::Node) -> Self {
        Self::with_scheduler(
            host,
            container,
            Arc::new(DefaultScheduler),
            RootConfig::default(),
        )
    }

    pub fn with_scheduler(
        host: H,
        container: H::Node,
        scheduler: Arc<dyn IdleScheduler>,
        config: RootConfig,
    ) -> Self {
        Self {
            host,
            inner: Rc::new(RootInner {
                state: RefCell::new(WorkState::new()),
                rendering: Cell::new(false),
                container,
                scheduler,
            }),
            config,
        }
    }

    /// Starts a pass rendering `element` as the container's only child.
    ///
    /// Nothing is reconciled yet; work happens in [`Root::work_loop`].
    pub fn render(&mut self, element: Element) {
        let props = Rc::new(Props {
            attributes: Attributes::new(),
            children: vec![Some(element)],
        });
        self.inner
            .begin_pass(&mut self.inner.state.borrow_mut(), props);
        log::debug!("render scheduled into {:?}", self.inner.container);
        self.inner.scheduler.request_idle_callback();
    }

    /// Performs units of work until the deadline nears its end.
    pub fn work_loop(&mut self, deadline: &dyn IdleDeadline) -> Result<WorkStatus, FiberError> {
        let mut budget = DeadlineBudget::new(deadline, self.config.yield_threshold)
            .with_max_units(self.config.max_units_per_grant);
        self.perform_work(&mut budget)
    }

    /// Performs units of work until `budget` yields or the pass is
    /// committed. Another idle callback is requested only while work
    /// remains, so a grant that commits or finds nothing to do does not
    /// re-register.
    ///
    /// A failed unit discards the pass and the committed tree stays
    /// current. A commit that fails after mutating the host still promotes
    /// the new tree, so later passes diff against what was applied.
    pub fn perform_work(&mut self, budget: &mut impl WorkBudget) -> Result<WorkStatus, FiberError> {
        let inner = Rc::clone(&self.inner);
        let handle = self.handle();
        let mut state = inner.state.borrow_mut();
        if state.wip.is_none() {
            return Ok(WorkStatus::Idle);
        }

        inner.rendering.set(true);
        let mut units = 0;
        let traversal = run_units(&mut state, &mut self.host, &handle, budget, &mut units);
        inner.rendering.set(false);

        if let Err(err) = traversal {
            log::error!("render pass failed after {units} units: {err}");
            state.discard_pass();
            return Err(err);
        }

        if state.next_unit.is_some() {
            drop(state);
            log::trace!("yielding after {units} units");
            inner.scheduler.request_idle_callback();
            return Ok(WorkStatus::Yielded { units });
        }

        match commit_root(&mut state, &mut self.host) {
            Ok(summary) => {
                log::debug!("committed after {units} units: {summary}");
                Ok(WorkStatus::Committed(summary))
            }
            Err(err) => {
                log::error!("commit failed: {err}");
                Err(err)
            }
        }
    }

    /// Runs the in-flight pass to completion.
    pub fn flush(&mut self) -> Result<WorkStatus, FiberError> {
        self.perform_work(&mut Unbounded)
    }

    pub fn handle(&self) -> RootHandle {
        let weak = Rc::downgrade(&self.inner);
        RootHandle(weak)
    }

    pub fn has_pending_work(&self) -> bool {
        self.inner.state.borrow().wip.is_some()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn container(&self) -> &H::Node {
        &self.inner.container
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    /// Calls `f` with the last committed tree, if any.
    pub fn with_committed_tree<R>(&self, f: impl FnOnce(&FiberTree<H::Node>) -> R) -> Option<R> {
        self.inner.state.borrow().current.as_ref().map(f)
    }
}

/// Creates a root over `container` and schedules `element` into it.
pub fn render<H: Host>(element: Element, host: H, container: H::Node) -> Root<H> {
    let mut root = Root::new(host, container);
    root.render(element);
    root
}

fn run_units<H: Host>(
    state: &mut WorkState<H::Node>,
    host: &mut H,
    root: &RootHandle,
    budget: &mut impl WorkBudget,
    units: &mut usize,
) -> Result<(), FiberError> {
    while let Some(unit) = state.next_unit {
        state.next_unit = perform_unit_of_work(state, host, root, unit)?;
        *units += 1;
        if budget.should_yield() {
            break;
        }
    }
    Ok(())
}

/// Renders or materializes one fiber, reconciles its children and returns
/// the next fiber in preorder.
pub(crate) fn perform_unit_of_work<H: Host>(
    state: &mut WorkState<H::Node>,
    host: &mut H,
    root: &RootHandle,
    id: FiberId,
) -> Result<Option<FiberId>, FiberError> {
    let Some(wip) = state.wip.as_ref() else {
        return Ok(None);
    };
    let fiber = &wip[id];
    log::trace!("unit {id} <{}>", fiber.label());
    let props = Rc::clone(&fiber.props);
    let component = match fiber.ty.as_ref() {
        Some(ElementType::Component(component)) => Some(*component),
        _ => None,
    };

    match component {
        Some(component) => update_function_component(state, root, id, component, &props)?,
        None => update_host_component(state, host, id, &props)?,
    }
    Ok(state.wip.as_ref().and_then(|wip| wip.next_unit(id)))
}

fn update_function_component<N: Clone>(
    state: &mut WorkState<N>,
    root: &RootHandle,
    id: FiberId,
    component: Component,
    props: &Props,
) -> Result<(), FiberError> {
    let alternate = state.wip.as_ref().and_then(|wip| wip[id].alternate);
    let previous = match (state.current.as_ref(), alternate) {
        (Some(current), Some(alternate)) => current[alternate].hooks.clone(),
        _ => Vec::new(),
    };

    let (rendered, hooks) = with_hook_frame(previous, root.clone(), || component.render(props));
    if let Some(wip) = state.wip.as_mut() {
        wip[id].hooks = hooks;
    }
    let element = rendered?;
    reconcile_children(state, id, &[Some(element)]);
    Ok(())
}

fn update_host_component<H: Host>(
    state: &mut WorkState<H::Node>,
    host: &mut H,
    id: FiberId,
    props: &Props,
) -> Result<(), FiberError> {
    if let Some(wip) = state.wip.as_mut() {
        if wip[id].host_node.is_none() {
            if let Some(ty) = wip[id].ty.as_ref() {
                let node = create_host_node(host, ty, props)?;
                wip[id].host_node = Some(node);
            }
        }
    }
    reconcile_children(state, id, &props.children);
    Ok(())
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
