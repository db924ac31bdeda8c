//! Line-delimited JSON over TCP.
//!
//! accepting → reading → msg_handling → responding, connected by mpsc
//! channels. Responses find their way back through [`Connections`].

use std::sync::Arc;

use tokio::{net::TcpListener, sync::mpsc::channel, task::JoinHandle};

use crate::{
    constants::MAX_REQUEST_LINE_BYTES,
    core::engine::Engine,
    models::{MsgToHandle, MsgToRes},
};

pub mod accepting;
pub mod connections;
pub mod msg_handling;
pub mod reading;
pub mod responding;

use accepting::accept_connections;
use connections::Connections;
use msg_handling::handle_messages;
use reading::read_sockets;
use responding::respond_to_sockets;

const CHANNEL_CAPACITY: usize = 128;

/// Starts every stage and returns the handle of the accept loop.
#[tracing::instrument(skip_all)]
pub fn serve(listener: TcpListener, engine: Arc<Engine>) -> JoinHandle<()> {
    let connections = Connections::default();
    let (read_tx, read_rx) = channel(CHANNEL_CAPACITY);
    let (msg_handle_tx, msg_handle_rx) = channel::<MsgToHandle>(CHANNEL_CAPACITY);
    let (res_tx, res_rx) = channel::<MsgToRes>(CHANNEL_CAPACITY);

    respond_to_sockets(connections.clone(), res_rx);
    handle_messages(engine, res_tx, msg_handle_rx);
    read_sockets(connections, read_rx, msg_handle_tx, MAX_REQUEST_LINE_BYTES);
    accept_connections(listener, read_tx)
}
