//! Standard idle-time services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform
//! abstraction traits defined in `fiber-core`. Hosts construct a
//! [`StdRuntime`], create roots through it and hand it idle time with
//! [`StdRuntime::grant`] or [`StdRuntime::run_until_idle`].

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use fiber_core::{FiberError, Host, IdleDeadline, IdleScheduler, Root, RootConfig, WorkStatus};

type IdleWaker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Idle scheduler that counts requests until the host polls them.
///
/// Requests coalesce: any number of them between two polls is answered by
/// a single grant.
#[derive(Default)]
pub struct StdIdleScheduler {
    pending: AtomicUsize,
    total: AtomicUsize,
    waker: Mutex<Option<IdleWaker>>,
}

impl StdIdleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests since the last poll; resets the count.
    pub fn take_requests(&self) -> usize {
        self.pending.swap(0, Ordering::AcqRel)
    }

    pub fn take_idle_request(&self) -> bool {
        self.take_requests() > 0
    }

    /// Requests received over the scheduler's lifetime.
    pub fn total_requests(&self) -> usize {
        self.total.load(Ordering::Acquire)
    }

    /// Installs `waker`, run on every request, and returns the one it
    /// replaces.
    pub fn install_waker(&self, waker: impl Fn() + Send + Sync + 'static) -> Option<IdleWaker> {
        self.lock_waker().replace(Arc::new(waker))
    }

    /// Removes the installed waker, returning whether there was one.
    pub fn remove_waker(&self) -> bool {
        self.lock_waker().take().is_some()
    }

    fn lock_waker(&self) -> std::sync::MutexGuard<'_, Option<IdleWaker>> {
        self.waker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StdIdleScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdIdleScheduler")
            .field("pending", &self.pending.load(Ordering::Acquire))
            .field("total", &self.total_requests())
            .finish()
    }
}

impl IdleScheduler for StdIdleScheduler {
    fn request_idle_callback(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.total.fetch_add(1, Ordering::AcqRel);
        // The lock is released before the waker runs so it may request again.
        let waker = self.lock_waker().clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

/// Deadline measured against [`Instant::now`].
#[derive(Debug, Clone, Copy)]
pub struct StdDeadline {
    end: Instant,
}

impl StdDeadline {
    pub fn after(slice: Duration) -> Self {
        Self {
            end: Instant::now() + slice,
        }
    }
}

impl IdleDeadline for StdDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// Default length of one idle grant, roughly one frame at 60 Hz.
pub const DEFAULT_SLICE: Duration = Duration::from_millis(16);

/// Bundles the standard idle scheduler with a grant length.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdIdleScheduler>,
    slice: Duration,
    config: RootConfig,
}

impl StdRuntime {
    pub fn new() -> Self {
        Self::with_slice(DEFAULT_SLICE)
    }

    pub fn with_slice(slice: Duration) -> Self {
        Self {
            scheduler: Arc::new(StdIdleScheduler::default()),
            slice,
            config: RootConfig::default(),
        }
    }

    /// Replaces the configuration handed to roots created afterwards.
    pub fn with_config(mut self, config: RootConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the scheduler implementation.
    pub fn scheduler(&self) -> Arc<StdIdleScheduler> {
        Arc::clone(&self.scheduler)
    }

    pub fn slice(&self) -> Duration {
        self.slice
    }

    /// Returns whether idle time was requested since the last poll.
    pub fn take_idle_request(&self) -> bool {
        self.scheduler.take_idle_request()
    }

    /// Creates a root whose idle requests land on this runtime.
    pub fn create_root<H: Host>(&self, host: H, container: H::Node) -> Root<H> {
        Root::with_scheduler(host, container, self.scheduler(), self.config.clone())
    }

    /// Gives `root` one slice of idle time.
    pub fn grant<H: Host>(&self, root: &mut Root<H>) -> Result<WorkStatus, FiberError> {
        root.work_loop(&StdDeadline::after(self.slice))
    }

    /// Grants idle time for as long as the root keeps asking for it and
    /// returns the number of grants used.
    pub fn run_until_idle<H: Host>(&self, root: &mut Root<H>) -> Result<usize, FiberError> {
        let mut grants = 0;
        while self.take_idle_request() {
            let status = self.grant(root)?;
            grants += 1;
            log::trace!("grant {grants}: {status:?}");
        }
        Ok(grants)
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("slice", &self.slice)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use fiber_core::{
        create_element, use_state, Attributes, Component, Element, FiberError, IdleDeadline,
        IdleScheduler, Listener, MemoryHost, Props, RootConfig,
    };

    use super::{StdDeadline, StdRuntime};

    fn counter(_props: &Props) -> Result<Element, FiberError> {
        let (count, set_count) = use_state(0)?;
        let on_click = Listener::new(move || {
            set_count.update(|c| c + 1).expect("idle root accepts updates");
        });
        Ok(create_element(
            "button",
            Attributes::new().with("onClick", on_click),
            vec![count.into()],
        ))
    }

    #[test]
    fn runtime_requests_idle_time_and_commits_state_change() {
        let runtime = StdRuntime::new();
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        let mut root = runtime.create_root(host, container);

        root.render(create_element(
            Component::new("Counter", counter),
            Attributes::new(),
            vec![],
        ));
        assert!(runtime.run_until_idle(&mut root).expect("initial render") >= 1);
        assert_eq!(root.host().text_content(container), "0");

        let button = root.host().find_all(container, "button")[0];
        root.host().dispatch(button, "click").expect("dispatch");
        assert!(
            runtime.take_idle_request(),
            "state update should request idle time"
        );
        root.flush().expect("flush");
        assert_eq!(root.host().text_content(container), "1");
        assert!(!runtime.take_idle_request());
    }

    #[test]
    fn waker_fires_on_every_request() {
        let runtime = StdRuntime::with_slice(Duration::ZERO).with_config(RootConfig::default());
        let wakes = Arc::new(AtomicUsize::new(0));
        {
            let wakes = Arc::clone(&wakes);
            let previous = runtime.scheduler().install_waker(move || {
                wakes.fetch_add(1, Ordering::SeqCst);
            });
            assert!(previous.is_none());
        }
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        let mut root = runtime.create_root(host, container);

        root.render(create_element(
            "ul",
            Attributes::new(),
            vec![
                create_element("li", Attributes::new(), vec!["a".into()]).into(),
                create_element("li", Attributes::new(), vec!["b".into()]).into(),
            ],
        ));
        let grants = runtime.run_until_idle(&mut root).expect("render");

        // Zero-length slices perform one unit per grant: root, ul, two li
        // and two texts.
        assert_eq!(grants, 6);
        assert_eq!(wakes.load(Ordering::SeqCst), 6);
        assert_eq!(runtime.scheduler().total_requests(), 6);
        assert!(runtime.scheduler().remove_waker());
        assert!(!runtime.scheduler().remove_waker());
    }

    #[test]
    fn requests_between_polls_coalesce() {
        let runtime = StdRuntime::new();
        let scheduler = runtime.scheduler();
        scheduler.request_idle_callback();
        scheduler.request_idle_callback();

        assert_eq!(scheduler.take_requests(), 2);
        assert_eq!(scheduler.take_requests(), 0);
        assert!(!runtime.take_idle_request());
        assert_eq!(scheduler.total_requests(), 2);
    }

    #[test]
    fn deadline_counts_down_to_zero() {
        let deadline = StdDeadline::after(Duration::ZERO);
        assert_eq!(deadline.time_remaining(), Duration::ZERO);
        let later = StdDeadline::after(Duration::from_secs(60));
        assert!(later.time_remaining() > Duration::from_secs(1));
    }
}
