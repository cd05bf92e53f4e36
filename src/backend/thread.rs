//! A condition-variable-blocking single OS thread loop (§6.1), grounded on
//! the original's `supervisor_thread_t`/`system_context_thread_t`
//! (`rotor/thread/*`): the simplest of the four reference backends the
//! original ships, and the only one this crate carries forward (§1 scope).

use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex};

use crate::system::SystemContext;
use crate::util::Rc;

use super::Backend;

/// Blocks the driving OS thread on a condvar between wake-ups, sleeping no
/// longer than the supervisor's next timer deadline (§6.1 "drive the loop
/// until the root supervisor reaches `SHUT_DOWN`").
pub struct ThreadBackend {
    state: Rc<(Mutex<bool>, Condvar)>,
}

impl ThreadBackend {
    pub fn new() -> Self {
        Self {
            state: Rc::new((Mutex::new(false), Condvar::new())),
        }
    }

    fn signal(state: &(Mutex<bool>, Condvar)) {
        let (lock, cvar) = state;
        let mut woken = lock.lock();
        *woken = true;
        cvar.notify_one();
    }
}

impl Default for ThreadBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ThreadBackend {
    fn wake(&self) {
        Self::signal(&self.state);
    }

    fn start_timer(&self, _deadline: DateTime<Utc>) {
        // A shorter deadline than whatever the loop is currently sleeping
        // on needs a prompt re-check; waking unconditionally is simpler and
        // no less correct than comparing against the in-flight sleep.
        self.wake();
    }

    fn cancel_timer(&self, _deadline: DateTime<Utc>) {
        // Nothing to undo: the loop always recomputes its sleep duration
        // from `Supervisor::next_deadline()` on every iteration, so a
        // cancelled timer just stops showing up there.
    }

    fn run(&mut self, system: &mut SystemContext) {
        let state = self.state.clone();
        let notify: Rc<dyn Fn() + Send + Sync> = Rc::new(move || Self::signal(&state));
        system.root_mut().set_waker(notify);

        loop {
            system.run_until_idle();
            if system.root().shutdown_flag_triggered() && !system.root().has_children() {
                break;
            }

            let (lock, cvar) = &*self.state;
            let mut woken = lock.lock();
            while !*woken {
                match system.root().next_deadline() {
                    Some(deadline) => {
                        let now = Utc::now();
                        let wait = (deadline - now).to_std().unwrap_or(StdDuration::from_millis(0));
                        let result = cvar.wait_for(&mut woken, wait);
                        if result.timed_out() {
                            break;
                        }
                    }
                    None => cvar.wait(&mut woken),
                }
            }
            *woken = false;
        }
    }
}
