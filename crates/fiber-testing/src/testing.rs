use fiber_core::{
    Element, FiberError, HostNodeId, HostOp, MemoryHost, Root, RootHandle, UnitBudget,
    WorkStatus,
};

/// Headless harness for exercising roots in tests.
///
/// `TestRoot` owns a [`Root`] over a [`MemoryHost`] with a single `root`
/// container and exposes helpers for driving passes, firing events and
/// inspecting the produced host tree.
pub struct TestRoot {
    root: Root<MemoryHost>,
}

impl TestRoot {
    pub fn new() -> Self {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        Self {
            root: Root::new(host, container),
        }
    }

    /// Schedule `element` into the container and run the pass to completion.
    pub fn mount(&mut self, element: Element) -> Result<WorkStatus, FiberError> {
        self.root.render(element);
        self.flush()
    }

    /// Run any in-flight pass to completion.
    pub fn flush(&mut self) -> Result<WorkStatus, FiberError> {
        self.root.flush()
    }

    /// Perform at most `units` units of the in-flight pass.
    pub fn step(&mut self, units: usize) -> Result<WorkStatus, FiberError> {
        self.root.perform_work(&mut UnitBudget::new(units))
    }

    /// Fire `event` on the first node with `tag`, in preorder. Returns the
    /// number of listeners invoked; zero when no node has that tag.
    pub fn dispatch(&mut self, tag: &str, event: &str) -> Result<usize, FiberError> {
        match self.find_all(tag).first() {
            Some(&target) => self.dispatch_to(target, event),
            None => Ok(0),
        }
    }

    pub fn dispatch_to(&mut self, node: HostNodeId, event: &str) -> Result<usize, FiberError> {
        self.root.host().dispatch(node, event)
    }

    pub fn container(&self) -> HostNodeId {
        *self.root.container()
    }

    pub fn host(&self) -> &MemoryHost {
        self.root.host()
    }

    pub fn root(&mut self) -> &mut Root<MemoryHost> {
        &mut self.root
    }

    pub fn handle(&self) -> RootHandle {
        self.root.handle()
    }

    pub fn has_pending_work(&self) -> bool {
        self.root.has_pending_work()
    }

    /// Concatenated text below the container.
    pub fn text(&self) -> String {
        self.host().text_content(self.container())
    }

    /// Tags below the container in preorder; text nodes appear as `#text`.
    pub fn tags(&self) -> Vec<String> {
        self.host().tag_preorder(self.container())
    }

    pub fn find_all(&self, tag: &str) -> Vec<HostNodeId> {
        self.host().find_all(self.container(), tag)
    }

    /// Drain the host mutation log.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        self.root.host_mut().take_ops()
    }

    pub fn dump_tree(&self) -> String {
        self.host().dump_tree(self.container())
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `TestRoot`.
pub fn run_test_root<R>(f: impl FnOnce(&mut TestRoot) -> R) -> R {
    let mut root = TestRoot::new();
    f(&mut root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiber_core::{create_element, Attributes, Listener};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_root_mounts_and_dispatches() {
        run_test_root(|root| {
            let clicks = Rc::new(Cell::new(0));
            let on_click = {
                let clicks = Rc::clone(&clicks);
                Listener::new(move || clicks.set(clicks.get() + 1))
            };
            let status = root
                .mount(create_element(
                    "button",
                    Attributes::new().with("onClick", on_click),
                    vec!["go".into()],
                ))
                .expect("mount");

            assert!(status.is_committed());
            assert_eq!(root.tags(), vec!["button", "#text"]);
            assert_eq!(root.text(), "go");
            assert_eq!(root.dispatch("button", "click"), Ok(1));
            assert_eq!(clicks.get(), 1);
            assert_eq!(root.dispatch("input", "click"), Ok(0));
        });
    }
}
