//! Per-component state that survives re-renders.
//!
//! While a component renders, a [`HookFrame`] sits on a thread-local stack.
//! Each [`use_state`] call claims the next slot of the frame and reads the
//! slot at the same position on the previous render's fiber, so hook calls
//! must happen in the same order on every render.

use std::any::type_name;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::FiberError;
use crate::fiber::HookSlot;
use crate::scheduler::RootHandle;

/// A queued state transition.
pub enum Update<T> {
    Replace(T),
    Apply(Rc<dyn Fn(&T) -> T>),
}

impl<T: Clone> Update<T> {
    pub fn apply_to(&self, state: T) -> T {
        match self {
            Update::Replace(value) => value.clone(),
            Update::Apply(f) => f(&state),
        }
    }
}

impl<T: Clone> Clone for Update<T> {
    fn clone(&self) -> Self {
        match self {
            Update::Replace(value) => Update::Replace(value.clone()),
            Update::Apply(f) => Update::Apply(Rc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Update::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

pub(crate) struct HookCell<T> {
    state: T,
    queue: RefCell<Vec<Update<T>>>,
}

impl<T: Clone> HookCell<T> {
    fn new(state: T) -> Self {
        Self {
            state,
            queue: RefCell::new(Vec::new()),
        }
    }

    /// Stored state with every queued update applied in enqueue order.
    ///
    /// The queue is not drained. A restarted pass folds it again; the next
    /// render's cell starts with an empty queue.
    fn folded(&self) -> T {
        self.queue
            .borrow()
            .iter()
            .fold(self.state.clone(), |state, update| update.apply_to(state))
    }
}

struct HookFrame {
    previous: Vec<HookSlot>,
    hooks: Vec<HookSlot>,
    root: RootHandle,
}

thread_local! {
    static HOOK_FRAMES: RefCell<Vec<HookFrame>> = const { RefCell::new(Vec::new()) };
}

struct FrameGuard;

impl FrameGuard {
    fn finish(self) -> Option<HookFrame> {
        let frame = HOOK_FRAMES.with(|frames| frames.borrow_mut().pop());
        std::mem::forget(self);
        frame
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        // Only reached when `render` unwinds.
        HOOK_FRAMES.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}

/// Runs `render` with a hook frame installed and returns its result along
/// with the hook slots it claimed.
pub(crate) fn with_hook_frame<R>(
    previous: Vec<HookSlot>,
    root: RootHandle,
    render: impl FnOnce() -> R,
) -> (R, Vec<HookSlot>) {
    HOOK_FRAMES.with(|frames| {
        frames.borrow_mut().push(HookFrame {
            previous,
            hooks: Vec::new(),
            root,
        })
    });
    let guard = FrameGuard;
    let result = render();
    let hooks = guard.finish().map(|frame| frame.hooks).unwrap_or_default();
    (result, hooks)
}

/// Declares a piece of component state.
///
/// Returns the current value, derived from the previous render's state
/// with its pending updates applied, and a setter bound to this slot.
/// Fails with [`FiberError::InvalidHookContext`] outside of a component
/// render.
pub fn use_state<T: Clone + 'static>(initial: T) -> Result<(T, SetState<T>), FiberError> {
    let (index, previous, root) = HOOK_FRAMES.with(|frames| {
        let frames = frames.borrow();
        let frame = frames.last().ok_or(FiberError::InvalidHookContext)?;
        let index = frame.hooks.len();
        Ok::<_, FiberError>((index, frame.previous.get(index).cloned(), frame.root.clone()))
    })?;

    let state = match previous {
        Some(slot) => slot
            .downcast_ref::<HookCell<T>>()
            .ok_or(FiberError::HookTypeMismatch {
                index,
                expected: type_name::<T>(),
            })?
            .folded(),
        None => initial,
    };

    let hook = Rc::new(HookCell::new(state.clone()));
    HOOK_FRAMES.with(|frames| {
        if let Some(frame) = frames.borrow_mut().last_mut() {
            frame.hooks.push(hook.clone());
        }
    });
    Ok((state, SetState { hook, root }))
}

/// Enqueues updates on one state slot and schedules a new pass.
pub struct SetState<T> {
    hook: Rc<HookCell<T>>,
    root: RootHandle,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            hook: Rc::clone(&self.hook),
            root: self.root.clone(),
        }
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("pending", &self.hook.queue.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> SetState<T> {
    pub fn set(&self, value: T) -> Result<(), FiberError> {
        self.dispatch(Update::Replace(value))
    }

    pub fn update(&self, f: impl Fn(&T) -> T + 'static) -> Result<(), FiberError> {
        self.dispatch(Update::Apply(Rc::new(f)))
    }

    /// Rejected with [`FiberError::ReentrantUpdate`] while the owning root
    /// renders; nothing is enqueued in that case. Updates to a dropped
    /// root are accepted and never applied.
    pub fn dispatch(&self, update: Update<T>) -> Result<(), FiberError> {
        if self.root.is_rendering() {
            return Err(FiberError::ReentrantUpdate);
        }
        self.hook.queue.borrow_mut().push(update);
        self.root.schedule_update()
    }

    /// Number of updates queued on this slot.
    pub fn pending(&self) -> usize {
        self.hook.queue.borrow().len()
    }
}

#[cfg(test)]
#[path = "tests/hooks_tests.rs"]
mod tests;
