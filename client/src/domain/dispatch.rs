//! Serialised delivery of state updates to a single listener.
//!
//! Producers enqueue while holding whatever lock decided the update, which
//! fixes the delivery order, then call [`SerialDispatcher::drain`] after
//! releasing it. Only one caller drains at a time and the listener is never
//! invoked with the queue locked, so it may re-enter its producer (to cancel,
//! for instance) without deadlocking.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

type Sink<T> = Box<dyn Fn(T) + Send + Sync>;

struct Queue<T> {
    items: VecDeque<T>,
    draining: bool,
    closed: bool,
}

pub(crate) struct SerialDispatcher<T> {
    sink: Sink<T>,
    queue: Mutex<Queue<T>>,
}

impl<T> SerialDispatcher<T> {
    pub(crate) fn new(sink: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            queue: Mutex::new(Queue {
                items: VecDeque::new(),
                draining: false,
                closed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queue<T>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `item`; ignored once closed.
    pub(crate) fn enqueue(&self, item: T) {
        let mut queue = self.lock();
        if !queue.closed {
            queue.items.push_back(item);
        }
    }

    /// Deliver queued items in order unless another caller already is.
    pub(crate) fn drain(&self) {
        {
            let mut queue = self.lock();
            if queue.draining {
                return;
            }
            queue.draining = true;
        }

        loop {
            let next = {
                let mut queue = self.lock();
                match queue.items.pop_front() {
                    Some(item) if !queue.closed => item,
                    _ => {
                        queue.items.clear();
                        queue.draining = false;
                        return;
                    }
                }
            };
            (self.sink)(next);
        }
    }

    /// Drop pending items and refuse new ones. A delivery already in
    /// progress completes.
    pub(crate) fn close(&self) {
        let mut queue = self.lock();
        queue.closed = true;
        queue.items.clear();
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use std::sync::{Arc, OnceLock};

    fn recording() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |item| sink.lock().expect("seen").push(item))
    }

    #[test]
    fn delivers_in_enqueue_order() {
        let (seen, sink) = recording();
        let dispatcher = SerialDispatcher::new(sink);

        dispatcher.enqueue(1);
        dispatcher.enqueue(2);
        dispatcher.drain();
        dispatcher.enqueue(3);
        dispatcher.drain();

        assert_eq!(*seen.lock().expect("seen"), vec![1, 2, 3]);
    }

    #[test]
    fn closed_dispatcher_drops_pending_and_new_items() {
        let (seen, sink) = recording();
        let dispatcher = SerialDispatcher::new(sink);

        dispatcher.enqueue(1);
        dispatcher.close();
        dispatcher.enqueue(2);
        dispatcher.drain();

        assert!(seen.lock().expect("seen").is_empty());
    }

    #[test]
    fn items_enqueued_during_delivery_follow_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let me: Arc<OnceLock<Arc<SerialDispatcher<u32>>>> = Arc::new(OnceLock::new());

        let sink_seen = Arc::clone(&seen);
        let sink_me = Arc::clone(&me);
        let dispatcher = Arc::new(SerialDispatcher::new(move |item: u32| {
            sink_seen.lock().expect("seen").push(item);
            if item == 1 {
                if let Some(dispatcher) = sink_me.get() {
                    dispatcher.enqueue(2);
                    dispatcher.drain();
                    dispatcher.enqueue(3);
                }
            }
        }));
        assert!(me.set(Arc::clone(&dispatcher)).is_ok());

        dispatcher.enqueue(1);
        dispatcher.drain();

        assert_eq!(*seen.lock().expect("seen"), vec![1, 2, 3]);
    }
}
