use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Client -> Server events ──

/// Events the client sends to the server over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Attach this connection to the user's notification channel.
    Join {
        #[serde(rename = "userId")]
        user_id: Uuid,
    },
}

// ── Server -> Client events ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GigRef {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidRef {
    pub id: Uuid,
    pub price: f64,
}

/// Events the server pushes to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The connection is now attached to the user's channel.
    Joined {
        #[serde(rename = "userId")]
        user_id: Uuid,
    },
    /// The user's bid was accepted.
    Hired {
        message: String,
        gig: GigRef,
        bid: BidRef,
    },
    Error { message: String },
}

impl ServerEvent {
    pub fn hired(gig_id: Uuid, gig_title: &str, bid_id: Uuid, price: f64) -> Self {
        ServerEvent::Hired {
            message: format!("You have been hired for \"{gig_title}\"!"),
            gig: GigRef {
                id: gig_id,
                title: gig_title.to_string(),
            },
            bid: BidRef { id: bid_id, price },
        }
    }
}
