//! Synchronous state-change notifications raised by object setters.
//!
//! Objects push [`StateChange`] events onto a channel shared with whoever
//! observes them. A [`SignalGate`] shared across all objects of one universe
//! can suppress delivery during bulk work without changing what the setters do.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bitflags::bitflags;
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::object::ObjectId;

bitflags! {
    /// Which part of an object a setter changed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectChange: u8 {
        const ID = 1 << 0;
        const NAME = 1 << 1;
        const POSITION = 1 << 2;
        const OWNER = 1 << 3;
        const SYSTEM = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub object: ObjectId,
    pub change: ObjectChange,
}

/// Shared switch that holds back notification delivery while inhibited.
#[derive(Debug, Clone, Default)]
pub struct SignalGate(Arc<AtomicBool>);

impl SignalGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_inhibited(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set_inhibited(&self, inhibited: bool) {
        self.0.store(inhibited, Ordering::Relaxed);
    }

    /// Inhibit delivery until the returned guard is dropped.
    ///
    /// Guards nest: dropping one restores whatever state it found.
    pub fn inhibit(&self) -> SignalInhibitGuard {
        let previous = self.0.swap(true, Ordering::Relaxed);
        SignalInhibitGuard {
            gate: self.clone(),
            previous,
        }
    }
}

#[must_use = "notifications resume as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SignalInhibitGuard {
    gate: SignalGate,
    previous: bool,
}

impl Drop for SignalInhibitGuard {
    fn drop(&mut self) {
        self.gate.set_inhibited(self.previous);
    }
}

/// Per-object sending half of the change channel. Detached notifiers drop events.
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    sender: Option<Sender<StateChange>>,
    gate: SignalGate,
}

impl ChangeNotifier {
    pub fn new(sender: Sender<StateChange>, gate: SignalGate) -> Self {
        Self {
            sender: Some(sender),
            gate,
        }
    }

    pub fn detached() -> Self {
        Self::default()
    }

    /// Create a notifier together with the receiver observers drain.
    pub fn channel(gate: SignalGate) -> (Self, Receiver<StateChange>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender, gate), receiver)
    }

    pub fn gate(&self) -> &SignalGate {
        &self.gate
    }

    pub fn is_attached(&self) -> bool {
        self.sender.is_some()
    }

    pub fn notify(&self, object: ObjectId, change: ObjectChange) {
        if self.gate.is_inhibited() {
            return;
        }
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(StateChange { object, change }).is_err() {
            tracing::trace!(
                target: "meters::object",
                object = %object,
                "state_changed.dropped=receiver_gone"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_reach_receiver() {
        let (notifier, receiver) = ChangeNotifier::channel(SignalGate::new());
        notifier.notify(ObjectId(4), ObjectChange::NAME);
        assert_eq!(
            receiver.try_recv(),
            Ok(StateChange {
                object: ObjectId(4),
                change: ObjectChange::NAME
            })
        );
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn inhibited_gate_drops_notifications() {
        let gate = SignalGate::new();
        let (notifier, receiver) = ChangeNotifier::channel(gate.clone());
        {
            let _quiet = gate.inhibit();
            notifier.notify(ObjectId(1), ObjectChange::POSITION);
        }
        assert!(receiver.try_recv().is_err());

        notifier.notify(ObjectId(1), ObjectChange::POSITION);
        assert!(receiver.try_recv().is_ok());
    }

    #[test]
    fn nested_guards_restore_previous_state() {
        let gate = SignalGate::new();
        let outer = gate.inhibit();
        {
            let _inner = gate.inhibit();
            assert!(gate.is_inhibited());
        }
        assert!(gate.is_inhibited(), "outer guard still holds");
        drop(outer);
        assert!(!gate.is_inhibited());
    }

    #[test]
    fn detached_notifier_is_silent() {
        let notifier = ChangeNotifier::detached();
        assert!(!notifier.is_attached());
        notifier.notify(ObjectId(9), ObjectChange::ID);
    }
}
