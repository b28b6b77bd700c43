use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::notifications::protocol::ServerEvent;

/// One live connection attached to a user's channel.
#[derive(Debug)]
struct Subscriber {
    connection_id: Uuid,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Returned by [`NotificationHub::attach`]; the session drains `receiver`.
#[derive(Debug)]
pub struct Subscription {
    pub connection_id: Uuid,
    pub receiver: mpsc::UnboundedReceiver<ServerEvent>,
}

/// Process-wide registry of live connections, keyed by user id.
///
/// A user may have several sessions open at once. Delivery is fire-and-forget:
/// only currently attached sessions receive an event and nothing is replayed.
/// The registry lives for the lifetime of the process; [`shutdown`] tears it
/// down.
///
/// [`shutdown`]: NotificationHub::shutdown
#[derive(Debug, Default)]
pub struct NotificationHub {
    /// user_id -> attached connections
    connections: RwLock<HashMap<Uuid, Vec<Subscriber>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new connection to `user_id`'s channel.
    pub async fn attach(&self, user_id: Uuid) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = Uuid::new_v4();

        let mut connections = self.connections.write().await;
        connections.entry(user_id).or_default().push(Subscriber {
            connection_id,
            sender: tx,
        });

        tracing::debug!(%user_id, %connection_id, "Connection attached");
        Subscription {
            connection_id,
            receiver: rx,
        }
    }

    /// Remove one connection. Users with no connections left are pruned.
    pub async fn detach(&self, user_id: Uuid, connection_id: Uuid) {
        let mut connections = self.connections.write().await;

        if let Some(list) = connections.get_mut(&user_id) {
            list.retain(|s| s.connection_id != connection_id);
            if list.is_empty() {
                connections.remove(&user_id);
            }
        }
        tracing::debug!(%user_id, %connection_id, "Connection detached");
    }

    /// Push `event` to every connection of `user_id`. Returns how many
    /// connections accepted it; zero when the user is offline.
    pub async fn notify(&self, user_id: Uuid, event: ServerEvent) -> usize {
        let connections = self.connections.read().await;
        let Some(list) = connections.get(&user_id) else {
            return 0;
        };

        // A failed send means the session is gone; detach() will clean it up.
        list.iter()
            .filter(|s| s.sender.send(event.clone()).is_ok())
            .count()
    }

    /// Number of live connections for a user.
    pub async fn connection_count(&self, user_id: Uuid) -> usize {
        let connections = self.connections.read().await;
        connections.get(&user_id).map_or(0, Vec::len)
    }

    /// Drop every registered connection. Sessions observe their channel
    /// closing and end. Returns how many connections were closed.
    pub async fn shutdown(&self) -> usize {
        let mut connections = self.connections.write().await;
        let closed = connections.values().map(Vec::len).sum();
        connections.clear();
        closed
    }
}
