use std::cell::RefCell;
use std::rc::Rc;

/// Anything holding subscriptions on another component's listener list.
///
/// `dispose` must be idempotent and must never fail. Use after disposal is
/// the caller's problem.
pub trait Disposable {
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

/// One-shot teardown guard. Clones share the same teardown.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        // release the borrow before running: teardown may reenter
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }
}

impl Disposable for Dispose {
    fn dispose(&self) {
        self.run();
    }

    fn is_disposed(&self) -> bool {
        self.0.borrow().is_none()
    }
}

impl std::fmt::Debug for Dispose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispose")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Helper for building a guard out of several others; runs them in order.
pub fn dispose_all(guards: impl IntoIterator<Item = Dispose>) -> Dispose {
    let guards: Vec<Dispose> = guards.into_iter().collect();
    Dispose::new(move || {
        for g in guards {
            g.run();
        }
    })
}
