/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Connection loop.
//!
//! One task owns the connection lifecycle: connect, run the send and
//! receive loops until either gives up, wait the reconnect delay, repeat.
//! Both loops run as joined futures on that task and share a per-connection
//! cancellation token, so neither outlives the socket.

use crate::application::Application;
use crate::client::{Outgoing, Shared};
use fixline_core::error::{FixError, SessionError};
use fixline_core::message::{Message, MsgType};
use fixline_session::heartbeat::LivenessMonitor;
use fixline_session::state::EngineState;
use fixline_tagvalue::fields::{FieldList, HEARTBEAT_TEMPLATE};
use fixline_transport::codec::{FixCodec, FrameReader, FrameWriter};
use fixline_transport::connector::BoxedStream;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the engine until the stop token is cancelled.
pub(crate) async fn run(
    shared: Arc<Shared>,
    app: Arc<dyn Application>,
    mut rx: mpsc::Receiver<Outgoing>,
) {
    let stop = shared.stop.clone();
    let address = shared.config.address.clone();

    while !stop.is_cancelled() {
        shared.state.transition(EngineState::Connecting);
        let dropped = shared.reset_for_connection(&mut rx);
        if dropped > 0 {
            warn!(dropped, "discarded frames queued before connecting");
        }
        let attempt = shared.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        info!(%address, attempt, "connecting");

        let connect = tokio::time::timeout(shared.config.timeout, shared.connector.connect(&address));
        let result = tokio::select! {
            _ = stop.cancelled() => break,
            result = connect => result,
        };

        match result {
            Ok(Ok(stream)) => {
                shared.state.transition(EngineState::Active);
                info!(%address, "connected");
                run_connection(&shared, &app, &mut rx, stream).await;
                info!(%address, "connection closed");
            }
            Ok(Err(err)) => {
                warn!(%address, error = %err, "connect failed");
                app.on_error(&FixError::Io(err)).await;
            }
            Err(_) => {
                warn!(%address, "connect timed out");
                let error = SessionError::ConnectTimeout {
                    addr: address.clone(),
                    timeout_ms: millis(shared.config.timeout),
                };
                app.on_error(&error.into()).await;
            }
        }

        if stop.is_cancelled() {
            break;
        }
        shared.state.transition(EngineState::Reconnecting);
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(shared.config.reconnect_delay) => {}
        }
    }

    shared.state.transition(EngineState::Stopped);
    debug!(%address, "engine task finished");
}

/// Drives one established connection until it is torn down.
async fn run_connection(
    shared: &Arc<Shared>,
    app: &Arc<dyn Application>,
    rx: &mut mpsc::Receiver<Outgoing>,
    stream: BoxedStream,
) {
    let on_connect = Arc::clone(app);
    tokio::spawn(async move { on_connect.on_connect().await });

    let (reader, writer) = tokio::io::split(stream);
    let codec = FixCodec::new().with_max_message_size(shared.config.max_message_size);
    let liveness = LivenessMonitor::new(shared.config.heartbeat_interval);
    let token = shared.stop.child_token();

    tokio::join!(
        send_loop(shared, app, rx, FrameWriter::new(writer), &liveness, &token),
        receive_loop(shared, app, FrameReader::new(reader, codec), &liveness, &token),
    );
}

async fn send_loop<W: AsyncWrite + Unpin>(
    shared: &Shared,
    app: &Arc<dyn Application>,
    rx: &mut mpsc::Receiver<Outgoing>,
    mut writer: FrameWriter<W>,
    liveness: &LivenessMonitor,
    token: &CancellationToken,
) {
    let interval = liveness.interval();
    let mut heartbeat = tokio::time::interval_at(Instant::now() + interval, interval);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = heartbeat.tick() => {
                if let Err(err) = shared.enqueue(HEARTBEAT_TEMPLATE) {
                    warn!(error = %err, "failed to build heartbeat");
                }
            }
            _ = tokio::time::sleep_until(liveness.deadline()) => {
                if liveness.is_expired() {
                    let elapsed_ms = millis(liveness.time_since_last_received());
                    warn!(elapsed_ms, "no inbound traffic, dropping connection");
                    app.on_error(&SessionError::HeartbeatTimeout { elapsed_ms }.into()).await;
                    break;
                }
            }
            outgoing = rx.recv() => match outgoing {
                Some(Outgoing::Frame(frame)) => {
                    debug!(frame = %frame.replace('\x01', "|"), "sending");
                    shared.cache.push(frame.as_str());
                    if let Err(err) = writer.write_frame(&frame).await {
                        if !token.is_cancelled() {
                            warn!(error = %err, "write failed");
                            app.on_error(&err.into()).await;
                        }
                        break;
                    }
                }
                Some(Outgoing::Exit) | None => break,
            },
        }
    }
    token.cancel();
}

async fn receive_loop<R: AsyncRead + Unpin>(
    shared: &Shared,
    app: &Arc<dyn Application>,
    mut reader: FrameReader<R>,
    liveness: &LivenessMonitor,
    token: &CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = token.cancelled() => break,
            next = reader.next_frame() => next,
        };
        match next {
            Ok(Some(frame)) => {
                liveness.on_message_received();
                let message = Message::parse(frame);
                debug!(%message, "received");
                app.on_message(&message).await;
                handle_inbound(shared, &message);
            }
            Ok(None) => {
                if !token.is_cancelled() {
                    info!("venue closed the connection");
                    app.on_error(&SessionError::ConnectionClosed.into()).await;
                }
                break;
            }
            Err(err) => {
                if !token.is_cancelled() {
                    warn!(error = %err, "read failed");
                    app.on_error(&err.into()).await;
                }
                break;
            }
        }
    }
    token.cancel();
}

/// Session-level handling of one inbound message.
fn handle_inbound(shared: &Shared, message: &Message) {
    match message.msg_type() {
        Some(MsgType::ResendRequest) => {
            let begin = message.get("7").unwrap_or_default();
            if shared.cache.find_by_seq(begin).is_some() {
                warn!(begin_seq = %begin, "resend request for a cached frame, retransmission unsupported");
            } else {
                warn!(begin_seq = %begin, "resend request for a frame no longer cached");
            }
        }
        Some(MsgType::Heartbeat | MsgType::TestRequest) => {
            let reply = FieldList::heartbeat(message.get("112")).pack();
            if let Err(err) = shared.enqueue(&reply) {
                warn!(error = %err, "failed to build heartbeat reply");
            }
        }
        Some(MsgType::SequenceReset) => {
            warn!(new_seq = ?message.get("36"), "sequence reset received, unsupported");
            shared.registry.dispatch(message);
        }
        _ => {
            shared.registry.dispatch(message);
        }
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientHandle;
    use fixline_session::config::ClientConfig;
    use std::time::Duration;

    fn client() -> ClientHandle {
        let config = ClientConfig::new(
            Duration::from_secs(1),
            Duration::from_secs(30),
            "4.2",
            "127.0.0.1:9878",
            "CLIENT",
            "VENUE",
        )
        .with_tls(false);
        ClientHandle::new(config).unwrap()
    }

    fn queued_frame(client: &ClientHandle) -> Option<String> {
        let mut receiver = client.shared().receiver.lock();
        match receiver.as_mut()?.try_recv().ok()? {
            Outgoing::Frame(frame) => Some(frame),
            Outgoing::Exit => None,
        }
    }

    #[test]
    fn test_reset_for_connection_drops_queued_frames() {
        let client = client();
        assert_eq!(client.send("35=D|34=|55=EARLY|").unwrap().value(), 1);
        assert_eq!(client.send("35=D|34=|55=EARLY|").unwrap().value(), 2);

        let mut rx = client.shared().receiver.lock().take().unwrap();
        assert_eq!(client.shared().reset_for_connection(&mut rx), 2);
        assert_eq!(client.next_seq_num().value(), 1);

        assert_eq!(client.send("35=D|34=|55=LATE|").unwrap().value(), 1);
        let Ok(Outgoing::Frame(frame)) = rx.try_recv() else {
            panic!("frame not queued");
        };
        assert!(frame.contains("\x0134=1\x01"));
        assert!(frame.contains("\x0155=LATE\x01"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_test_request_echoes_id() {
        let client = client();
        handle_inbound(client.shared(), &Message::parse("8=FIX.4.2|35=1|112=PING-7|"));

        let frame = queued_frame(&client).unwrap();
        assert!(frame.contains("\x0135=0\x01"));
        assert!(frame.contains("\x01112=PING-7\x01"));
        assert!(frame.contains("\x0134=1\x01"));
    }

    #[test]
    fn test_heartbeat_is_answered() {
        let client = client();
        handle_inbound(client.shared(), &Message::parse("8=FIX.4.2|35=0|"));

        let frame = queued_frame(&client).unwrap();
        assert!(frame.contains("\x0135=0\x01"));
        assert!(!frame.contains("\x01112="));
    }

    #[test]
    fn test_resend_request_is_not_answered() {
        let client = client();
        client.shared().cache.push("8=FIX.4.2\x019=5\x0134=1\x0110=000\x01");
        handle_inbound(client.shared(), &Message::parse("8=FIX.4.2|35=2|7=1|16=0|"));

        assert!(queued_frame(&client).is_none());
        assert_eq!(client.next_seq_num().value(), 1);
    }

    #[tokio::test]
    async fn test_sequence_reset_reaches_registry() {
        let client = client();
        let (_, mut rx) = client.shared().registry.register(&["35=4"]);
        handle_inbound(client.shared(), &Message::parse("8=FIX.4.2|35=4|36=10|"));

        assert_eq!(rx.try_recv().unwrap().get("36"), Some("10"));
        assert_eq!(client.next_seq_num().value(), 1);
    }

    #[test]
    fn test_application_message_reaches_registry() {
        let client = client();
        let (_, mut rx) = client.shared().registry.register(&["150=A"]);
        handle_inbound(client.shared(), &Message::parse("8=FIX.4.2|35=8|150=A|37=XYZ|"));

        assert_eq!(rx.try_recv().unwrap().find("37", &[]), Some("XYZ"));
    }
}
