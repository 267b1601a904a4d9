//! Discovery of a running instance by its listener window class.

use std::ops::ControlFlow;

use tracing::{debug, trace};

/// Opaque OS window identifier. Valid only while the owning process lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle(isize);

impl InstanceHandle {
    pub fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> isize {
        self.0
    }
}

/// Receives each top-level window during enumeration.
pub trait WindowVisitor {
    fn visit(&mut self, window: InstanceHandle) -> ControlFlow<()>;
}

/// The bits of the OS windowing system the locator needs.
pub trait WindowSystem {
    /// Walk top-level windows until the visitor breaks or the list ends.
    fn for_each_window(&self, visitor: &mut dyn WindowVisitor);

    /// Registered class name, `None` when the window can't be queried.
    fn class_name(&self, window: InstanceHandle) -> Option<String>;

    /// Top-level owning window of `window` (itself if it has no owner).
    fn root_owner(&self, window: InstanceHandle) -> InstanceHandle;
}

/// Stops at the first window whose class matches, remembering its root owner.
pub struct ClassMatcher<'a, W: WindowSystem + ?Sized> {
    system: &'a W,
    class_identity: &'a str,
    found: Option<InstanceHandle>,
}

impl<'a, W: WindowSystem + ?Sized> ClassMatcher<'a, W> {
    pub fn new(system: &'a W, class_identity: &'a str) -> Self {
        Self {
            system,
            class_identity,
            found: None,
        }
    }

    pub fn found(&self) -> Option<InstanceHandle> {
        self.found
    }
}

impl<W: WindowSystem + ?Sized> WindowVisitor for ClassMatcher<'_, W> {
    fn visit(&mut self, window: InstanceHandle) -> ControlFlow<()> {
        match self.system.class_name(window) {
            Some(name) if same_class(&name, self.class_identity) => {
                let root = self.system.root_owner(window);
                trace!(window = window.as_raw(), root = root.as_raw(), "class match");
                self.found = Some(root);
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        }
    }
}

fn same_class(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

pub struct InstanceLocator<W> {
    system: W,
}

impl<W: WindowSystem> InstanceLocator<W> {
    pub fn new(system: W) -> Self {
        Self { system }
    }

    pub fn system(&self) -> &W {
        &self.system
    }

    /// Root window of the instance that registered `class_identity`, if any.
    pub fn locate(&self, class_identity: &str) -> Option<InstanceHandle> {
        let mut matcher = ClassMatcher::new(&self.system, class_identity);
        self.system.for_each_window(&mut matcher);
        let found = matcher.found();
        debug!(class = class_identity, found = ?found, "instance lookup");
        found
    }
}
