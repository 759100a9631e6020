//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes notifications to external listeners after the engine has committed
//! the state change they describe. It is not a store: a listener that subscribes late only
//! sees notifications published after it subscribed.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of every message published after it was created
/// (broadcast semantics), in publication order.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// run_session(&engine);
///
/// for envelope in subscription.drain() {
///     log(envelope);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain everything already delivered, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// ## Delivery
///
/// Publication is best-effort: `publish()` can fail (closed transport, poisoned lock), and the
/// caller decides whether that failure matters. The campaign engine logs it and keeps the
/// already committed state change.
///
/// ## Thread Safety
///
/// The trait requires `Send + Sync`, so one bus can be shared by the engine and any number of
/// listeners.
pub trait EventBus<M>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
