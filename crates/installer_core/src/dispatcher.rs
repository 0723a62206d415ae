use std::cell::{Cell, RefCell};
use std::rc::Rc;

use installer_logging::{installer_debug, installer_error};
use thiserror::Error;

use crate::Action;

type Handler = Rc<dyn Fn(&Action)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("cannot dispatch {attempted} while {in_flight} is still being dispatched")]
    Reentrant {
        in_flight: &'static str,
        attempted: &'static str,
    },
}

/// Opaque handle returned by [`Dispatcher::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchToken(u64);

/// Synchronous broadcast bus. Handlers run in registration order, one
/// dispatch at a time.
#[derive(Default)]
pub struct Dispatcher {
    handlers: RefCell<Vec<(DispatchToken, Handler)>>,
    next_token: Cell<u64>,
    in_flight: Cell<Option<&'static str>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: impl Fn(&Action) + 'static) -> DispatchToken {
        let token = DispatchToken(self.next_token.get());
        self.next_token.set(token.0 + 1);
        self.handlers.borrow_mut().push((token, Rc::new(handler)));
        token
    }

    /// Returns `false` if the token was not registered.
    pub fn unregister(&self, token: DispatchToken) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(registered, _)| *registered != token);
        handlers.len() != before
    }

    pub fn is_dispatching(&self) -> bool {
        self.in_flight.get().is_some()
    }

    /// Delivers `action` to every registered handler before returning.
    ///
    /// Calling this from inside a handler fails with
    /// [`DispatchError::Reentrant`]; the outer dispatch carries on unaffected.
    #[must_use = "a reentrant dispatch is a programming error and must be handled"]
    pub fn dispatch(&self, action: &Action) -> Result<(), DispatchError> {
        if let Some(in_flight) = self.in_flight.get() {
            let err = DispatchError::Reentrant {
                in_flight,
                attempted: action.name(),
            };
            installer_error!("{err}");
            return Err(err);
        }

        installer_debug!("dispatch {}", action.name());
        let _guard = InFlightGuard::enter(&self.in_flight, action.name());
        // Handlers registered during this dispatch first see the next one.
        let handlers: Vec<Handler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(action);
        }
        Ok(())
    }
}

struct InFlightGuard<'a> {
    flag: &'a Cell<Option<&'static str>>,
}

impl<'a> InFlightGuard<'a> {
    fn enter(flag: &'a Cell<Option<&'static str>>, name: &'static str) -> Self {
        flag.set(Some(name));
        Self { flag }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(None);
    }
}
