//! Lifecycle messages and the mailbox that carries them.
//!
//! Engines may finish transitions on another thread. Instead of calling user
//! callbacks from there, every lifecycle notification is posted to a
//! [`Mailbox`] and the owning animator drains it on its own thread.

use std::sync::mpsc::{self, Receiver, Sender};

use super::types::{AnimatableProperty, CycleId};

/// A lifecycle notification tagged with the cycle that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Dispatch of `property` began.
    Started {
        cycle: CycleId,
        property: AnimatableProperty,
    },
    /// `property` reported completion.
    Finished {
        cycle: CycleId,
        property: AnimatableProperty,
    },
}

impl LifecycleEvent {
    pub fn cycle(&self) -> CycleId {
        match self {
            Self::Started { cycle, .. } | Self::Finished { cycle, .. } => *cycle,
        }
    }

    pub fn property(&self) -> AnimatableProperty {
        match self {
            Self::Started { property, .. } | Self::Finished { property, .. } => *property,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Cloneable, `Send` posting side of a [`Mailbox`].
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: Sender<LifecycleEvent>,
}

impl MailboxSender {
    /// Post an event. Returns `false` if the mailbox has been dropped.
    pub fn post(&self, event: LifecycleEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Receiving side, owned by the animator.
#[derive(Debug)]
pub struct Mailbox {
    tx: Sender<LifecycleEvent>,
    rx: Receiver<LifecycleEvent>,
}

impl Mailbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> MailboxSender {
        MailboxSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every message posted so far, in posting order.
    pub fn drain(&self) -> Vec<LifecycleEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
