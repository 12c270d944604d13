/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callback interface.
//!
//! The engine reports connection events, inbound messages and errors
//! through an [`Application`]. Callbacks run on the engine's task, except
//! [`Application::on_connect`], which is spawned so it can call back into
//! the client (typically to send a Logon) without stalling the loops.

use async_trait::async_trait;
use fixline_core::error::FixError;
use fixline_core::message::Message;

/// Application callback interface for a FIX client session.
#[async_trait]
pub trait Application: Send + Sync + 'static {
    /// Called each time a connection has been established.
    async fn on_connect(&self);

    /// Called for every inbound message, admin messages included.
    ///
    /// # Arguments
    /// * `message` - The parsed message
    async fn on_message(&self, message: &Message);

    /// Called for connection, liveness and I/O failures.
    ///
    /// # Arguments
    /// * `error` - What went wrong
    async fn on_error(&self, error: &FixError);
}

/// Default no-op application implementation.
#[derive(Debug, Default)]
pub struct NoOpApplication;

#[async_trait]
impl Application for NoOpApplication {
    async fn on_connect(&self) {}

    async fn on_message(&self, _message: &Message) {}

    async fn on_error(&self, _error: &FixError) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixline_core::error::SessionError;

    #[tokio::test]
    async fn test_noop_application() {
        let app = NoOpApplication;
        app.on_connect().await;
        app.on_message(&Message::parse("35=0|")).await;
        app.on_error(&SessionError::ConnectionClosed.into()).await;
    }
}
