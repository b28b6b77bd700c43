use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::jwt::AuthSettings;
use crate::auth::middleware::{request_token, resolve_caller};
use crate::db::Store;
use crate::error::AppError;
use crate::notifications::{ClientEvent, NotificationHub, ServerEvent};

/// Query params for the WebSocket handshake endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// GET /ws?token=<jwt>
///
/// Upgrades the HTTP connection to a WebSocket. Browsers cannot set headers
/// on the handshake, so the token may come as a query param; otherwise the
/// session cookie or a bearer header is used.
///
/// The connection receives nothing until the client sends
/// `{"type":"join","userId":"..."}` naming its own user id.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    store: web::Data<Store>,
    settings: web::Data<AuthSettings>,
    hub: web::Data<Arc<NotificationHub>>,
) -> Result<HttpResponse, actix_web::Error> {
    let token = query
        .into_inner()
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| request_token(&req))
        .ok_or_else(|| {
            AppError::Unauthenticated("Not authorized, no token provided".to_string())
        })?;

    let caller = resolve_caller(store.get_ref(), settings.get_ref(), &token).await?;

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    actix_web::rt::spawn(handle_ws_session(
        session,
        msg_stream,
        caller.id,
        hub.get_ref().clone(),
    ));

    Ok(response)
}

/// Drives one WebSocket session: handles `join`, forwards hub events to the
/// client, and detaches on disconnect.
async fn handle_ws_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    user_id: Uuid,
    hub: Arc<NotificationHub>,
) {
    let mut attached: Option<(Uuid, mpsc::UnboundedReceiver<ServerEvent>)> = None;

    loop {
        tokio::select! {
            msg = msg_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_client_event(&text, user_id, &hub, &mut attached).await;
                        if send_event(&mut session, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            event = next_event(&mut attached) => {
                match event {
                    Some(event) => {
                        if send_event(&mut session, &event).await.is_err() {
                            break;
                        }
                    }
                    // The hub dropped our sender (shutdown).
                    None => break,
                }
            }
        }
    }

    if let Some((connection_id, _)) = attached {
        hub.detach(user_id, connection_id).await;
    }
    let _ = session.close(None).await;
}

/// Next event for an attached session; never resolves before `join`.
async fn next_event(
    attached: &mut Option<(Uuid, mpsc::UnboundedReceiver<ServerEvent>)>,
) -> Option<ServerEvent> {
    match attached {
        Some((_, rx)) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Parse an incoming client message and return the reply to send back.
async fn handle_client_event(
    text: &str,
    user_id: Uuid,
    hub: &NotificationHub,
    attached: &mut Option<(Uuid, mpsc::UnboundedReceiver<ServerEvent>)>,
) -> ServerEvent {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(e) => e,
        Err(e) => {
            return ServerEvent::Error {
                message: format!("Invalid message format: {e}"),
            };
        }
    };

    match event {
        ClientEvent::Join { user_id: requested } => {
            if requested != user_id {
                return ServerEvent::Error {
                    message: "You can only join your own notification channel".to_string(),
                };
            }
            if attached.is_none() {
                let subscription = hub.attach(user_id).await;
                *attached = Some((subscription.connection_id, subscription.receiver));
            }
            ServerEvent::Joined { user_id }
        }
    }
}

async fn send_event(
    session: &mut actix_ws::Session,
    event: &ServerEvent,
) -> Result<(), actix_ws::Closed> {
    match serde_json::to_string(event) {
        Ok(json) => session.text(json).await,
        // Serializing these plain structs cannot fail; skip rather than drop the session.
        Err(_) => Ok(()),
    }
}
