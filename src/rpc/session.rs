//! Per-connection control session.
//!
//! ```text
//!   connect ──▶ Connected ──[recv → apply → broadcast]──▶ Connected
//!                   │
//!                   └──[close | link error]──▶ Disconnected (unregister)
//! ```
//!
//! The session multiplexes two sources: the observer's outbound queue and
//! the client's inbound messages. Outbound is polled first so replies to a
//! command go out before the next command is read.

use futures_lite::future;
use log::{info, warn};

use super::hub::{Observer, Outbound};
use super::transport::ObserverLink;
use crate::app::events::ServerMessage;
use crate::app::ports::Hardware;
use crate::app::service::Controller;
use crate::error::LinkError;

enum Wake {
    Outbound(Outbound),
    Inbound(Result<Option<String>, LinkError>),
}

/// Serve one client until it disconnects. The observer is always
/// unregistered on return.
pub async fn run_session<H, L>(controller: &Controller<H>, mut link: L) -> Result<(), LinkError>
where
    H: Hardware,
    L: ObserverLink,
{
    let observer = match controller.connect() {
        Ok(observer) => observer,
        Err(e) => {
            warn!("SESSION: rejecting client: {}", e);
            let reply = ServerMessage::Error {
                error: e.to_string(),
            };
            if let Ok(text) = reply.to_json() {
                link.send(&text).await?;
            }
            return Ok(());
        }
    };

    let id = observer.id();
    info!("SESSION[{}]: connected", id);

    let result = serve(controller, &observer, &mut link).await;
    controller.disconnect(id);

    match &result {
        Ok(()) => info!("SESSION[{}]: closed by client", id),
        Err(e) => info!("SESSION[{}]: dropped: {}", id, e),
    }
    if observer.dropped() > 0 {
        warn!(
            "SESSION[{}]: {} message(s) were dropped for a slow link",
            id,
            observer.dropped()
        );
    }
    result
}

async fn serve<H, L>(
    controller: &Controller<H>,
    observer: &Observer,
    link: &mut L,
) -> Result<(), LinkError>
where
    H: Hardware,
    L: ObserverLink,
{
    loop {
        let wake = future::or(async { Wake::Outbound(observer.next().await) }, async {
            Wake::Inbound(link.recv().await)
        })
        .await;

        match wake {
            Wake::Outbound(text) => link.send(&text).await?,
            Wake::Inbound(Ok(Some(text))) => controller.handle_message(observer.id(), &text).await,
            Wake::Inbound(Ok(None)) => return Ok(()),
            Wake::Inbound(Err(e)) => return Err(e),
        }
    }
}
