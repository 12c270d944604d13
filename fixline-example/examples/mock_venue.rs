//! Mock Venue Example
//!
//! Accepts client connections, answers Logon with Logon, acknowledges every
//! NewOrderSingle with a new-order ExecutionReport and replies to
//! TestRequests. Plain TCP only.

use fixline_core::{Message, MsgType, SeqNum, Timestamp};
use fixline_tagvalue::{FieldList, MessageBuilder};
use fixline_transport::{FixCodec, FrameReader, FrameWriter};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

mod common;
use common::{ExampleConfig, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::venue();
    let listener = TcpListener::bind(cfg.addr()).await?;
    info!("Venue listening on {}", cfg.addr());

    loop {
        let (socket, peer) = listener.accept().await?;
        info!(%peer, "client connected");
        let cfg = cfg.clone();
        tokio::spawn(async move {
            if let Err(e) = serve(socket, &cfg).await {
                warn!(%peer, error = %e, "session ended");
            }
        });
    }
}

async fn serve(socket: TcpStream, cfg: &ExampleConfig) -> anyhow::Result<()> {
    let (read, write) = socket.into_split();
    let mut reader = FrameReader::new(read, FixCodec::new());
    let mut writer = FrameWriter::new(write);
    let builder = MessageBuilder::new(
        "FIX.4.2",
        cfg.sender_comp_id.clone(),
        cfg.target_comp_id.clone(),
        cfg.heartbeat_interval.as_secs(),
    );
    let mut seq = SeqNum::default();
    let mut order_id = 0u64;

    while let Some(frame) = reader.next_frame().await? {
        let message = Message::parse(frame);
        info!("<- {}", message);

        let reply = match message.msg_type() {
            Some(MsgType::Logon) => FieldList::with_msg_type("A")
                .add_field(98, 0)
                .add_field(108, "")
                .pack(),
            Some(MsgType::TestRequest) => FieldList::heartbeat(message.get("112")).pack(),
            Some(MsgType::NewOrderSingle) => {
                order_id += 1;
                FieldList::with_msg_type("8")
                    .add_field(37, format!("VENUE-{order_id}"))
                    .add_field(11, message.get("11").unwrap_or_default())
                    .add_field(17, format!("EXEC-{order_id}"))
                    .add_field(150, 0)
                    .add_field(39, 0)
                    .add_field(55, message.get("55").unwrap_or_default())
                    .add_field(54, message.get("54").unwrap_or_default())
                    .pack()
            }
            _ => continue,
        };

        let out = builder.build_str(&reply, seq, Timestamp::now())?;
        seq = seq.next();
        info!("-> {}", Message::parse(out.as_str()));
        writer.write_frame(&out).await?;
    }
    info!("client disconnected");
    Ok(())
}
