//! Venue Client Example
//!
//! Logs on, sends one limit order and waits for its execution report.
//! Run `mock_venue` first, or point `FIX_HOST`/`FIX_PORT` at a real venue
//! with `FIX_TLS=1`.

use async_trait::async_trait;
use fixline_core::{FixError, Message, MsgType};
use fixline_engine::{Application, ClientHandle, EngineBuilder};
use fixline_session::ClientConfig;
use fixline_tagvalue::{FieldList, Logon};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{info, warn};

mod common;
use common::{ExampleConfig, init_logging};

/// Sends a Logon on every (re)connect.
struct LogonOnConnect {
    client: Arc<OnceLock<ClientHandle>>,
}

#[async_trait]
impl Application for LogonOnConnect {
    async fn on_connect(&self) {
        let Some(client) = self.client.get() else {
            return;
        };
        match client.send(&Logon::new().pack()) {
            Ok(seq) => info!(%seq, "logon sent"),
            Err(e) => warn!(error = %e, "failed to build logon"),
        }
    }

    async fn on_message(&self, message: &Message) {
        match message.msg_type() {
            Some(MsgType::Heartbeat) => {}
            Some(msg_type) => info!(%msg_type, "received {}", message),
            None => warn!("message without MsgType: {}", message),
        }
    }

    async fn on_error(&self, error: &FixError) {
        warn!(error = %error, "session error");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::client();
    info!("Client connecting to {}", cfg.addr());

    let config = ClientConfig::new(
        Duration::from_secs(10),
        cfg.heartbeat_interval,
        "4.2",
        cfg.addr(),
        cfg.sender_comp_id.clone(),
        cfg.target_comp_id.clone(),
    )
    .with_tls(cfg.tls);

    let slot = Arc::new(OnceLock::new());
    let client = EngineBuilder::new(config).build()?;
    let _ = slot.set(client.clone());
    client.start(LogonOnConnect { client: slot })?;

    let logon = client.expect(&["35=A"]).await?;
    info!("Logon OK: {}", logon);

    let mut order = FieldList::with_msg_type("D");
    order
        .add_field(11, "order-1")
        .add_field(55, "BTC-PERP")
        .add_field(54, 1)
        .add_field(38, 0.01)
        .add_field(40, 2)
        .add_field(44, 50_000);
    let seq = client.send(&order.pack())?;
    info!(%seq, "order sent");

    match client.expect(&["35=8", "35=9"]).await {
        Ok(report) => {
            let status = report.get("39").unwrap_or("?");
            info!(order_id = ?report.find("37", &[]), %status, "execution report");
        }
        Err(e) if e.is_timeout() => warn!("no execution report"),
        Err(e) => return Err(e.into()),
    }

    client.stop().await;
    info!("Client done");
    Ok(())
}
