//! Auth-state propagation.
//!
//! The identity provider pushes sign-in and sign-out events into an
//! [`AuthStateHub`]. Consumers register once with
//! [`AuthStateHub::subscribe`] and receive the current state followed by
//! every later change. Dropping the [`AuthSubscription`] unsubscribes.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Broadcasts the current auth state to subscribers.
#[derive(Debug)]
pub struct AuthStateHub {
    sender: watch::Sender<Option<AuthUser>>,
}

impl Default for AuthStateHub {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStateHub {
    /// Creates a hub with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sender: watch::Sender::new(None),
        }
    }

    /// Publishes a sign-in (`Some`) or sign-out (`None`).
    pub fn publish(&self, user: Option<AuthUser>) {
        self.sender.send_replace(user);
    }

    /// The currently signed-in user.
    #[must_use]
    pub fn current(&self) -> Option<AuthUser> {
        self.sender.borrow().clone()
    }

    /// Registers a subscriber. Its first event is the current state.
    #[must_use]
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.sender.subscribe(),
            delivered_initial: false,
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A stream of auth states. Intermediate states published faster than
/// they are consumed are coalesced into the latest one.
#[derive(Debug)]
pub struct AuthSubscription {
    receiver: watch::Receiver<Option<AuthUser>>,
    delivered_initial: bool,
}

impl AuthSubscription {
    /// Waits for the next auth state.
    ///
    /// Returns `None` once the hub has been dropped.
    pub async fn next(&mut self) -> Option<Option<AuthUser>> {
        if self.delivered_initial {
            self.receiver.changed().await.ok()?;
        }
        self.delivered_initial = true;
        Some(self.receiver.borrow_and_update().clone())
    }
}
