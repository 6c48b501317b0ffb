//! Error notification callbacks.
use std::collections::VecDeque;

/// Identifies a registered error callback, for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u64);

type Callback = Box<dyn FnMut() + Send>;

/// Ordered list of callbacks, invoked when a command fails.
#[derive(Default)]
pub(crate) struct ErrorCallbacks {
    next_id: u64,
    callbacks: VecDeque<(CallbackHandle, Callback)>,
}

impl ErrorCallbacks {
    fn handle(&mut self) -> CallbackHandle {
        let h = CallbackHandle(self.next_id);
        self.next_id += 1;
        h
    }

    pub fn push_front(&mut self, f: Callback) -> CallbackHandle {
        let h = self.handle();
        self.callbacks.push_front((h, f));
        h
    }

    pub fn push_back(&mut self, f: Callback) -> CallbackHandle {
        let h = self.handle();
        self.callbacks.push_back((h, f));
        h
    }

    /// Removes a callback. Returns `false` if it was not registered.
    pub fn remove(&mut self, handle: CallbackHandle) -> bool {
        let Some(i) = self.callbacks.iter().position(|(h, _)| *h == handle) else {
            return false;
        };
        self.callbacks.remove(i);
        true
    }

    pub fn invoke(&mut self) {
        for (_, f) in self.callbacks.iter_mut() {
            f();
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl std::fmt::Debug for ErrorCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorCallbacks")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn ordering() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut cbs = ErrorCallbacks::default();

        let l = log.clone();
        let b = cbs.push_back(Box::new(move || l.lock().unwrap().push("b")));
        let l = log.clone();
        cbs.push_front(Box::new(move || l.lock().unwrap().push("a")));
        let l = log.clone();
        cbs.push_back(Box::new(move || l.lock().unwrap().push("c")));
        assert_eq!(3, cbs.len());

        cbs.invoke();
        assert_eq!(vec!["a", "b", "c"], *log.lock().unwrap());

        assert!(cbs.remove(b));
        assert!(!cbs.remove(b));
        log.lock().unwrap().clear();
        cbs.invoke();
        assert_eq!(vec!["a", "c"], *log.lock().unwrap());
    }
}
