use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::dispose::{Disposable, Dispose};

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// Groups disposers so a presenter (or any owner) can tear down everything it
/// wired in one call.
///
/// Bindings created while a scope is current (see [`Scope::run`]) register
/// themselves with it. Nothing happens on drop; teardown is always explicit.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    disposers: RefCell<Vec<Dispose>>,
    children: RefCell<Vec<Scope>>,
    disposed: Cell<bool>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        // restores the previous scope on unwind too
        struct Restore(Option<Weak<ScopeInner>>);
        impl Drop for Restore {
            fn drop(&mut self) {
                let prev = self.0.take();
                CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
            }
        }

        let prev = CURRENT_SCOPE.with(|current| {
            current
                .borrow_mut()
                .replace(Rc::downgrade(&self.inner))
        });
        let _restore = Restore(prev);
        f()
    }

    pub fn add_disposer(&self, disposer: Dispose) {
        if self.inner.disposed.get() {
            log::debug!("scope already disposed; running late disposer immediately");
            disposer.run();
            return;
        }
        self.inner.disposers.borrow_mut().push(disposer);
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    pub fn disposer_count(&self) -> usize {
        self.inner.disposers.borrow().len()
    }
}

impl Disposable for Scope {
    fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }

        // Dispose children first
        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        log::debug!("disposing scope with {} disposer(s)", disposers.len());
        for disposer in disposers {
            disposer.run();
        }
    }

    fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

/// Hands a clone of `disposer` to the current scope, if any.
pub(crate) fn register_with_current(disposer: &Dispose) {
    if let Some(scope) = current_scope() {
        scope.add_disposer(disposer.clone());
    }
}
