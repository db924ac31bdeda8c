use tokio::{io::AsyncWriteExt, sync::mpsc::Receiver, task::JoinHandle};

use crate::{models::MsgToRes, pipeline::connections::Connections};

pub fn respond_to_sockets(connections: Connections, mut res_rx: Receiver<MsgToRes>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = res_rx.recv().await {
            tracing::debug!(connection = %msg.id, "sending response");

            let Some(socket) = connections.writer(&msg.id) else {
                tracing::warn!(connection = %msg.id, "socket not found");
                continue;
            };

            let message = format!("{}\n", msg.text);
            let result = {
                let mut stream = socket.lock().await;
                match stream.write_all(message.as_bytes()).await {
                    Ok(()) => stream.flush().await,
                    Err(e) => Err(e),
                }
            };
            if let Err(e) = result {
                tracing::warn!(connection = %msg.id, error = %e, "failed to write response");
            }

            connections.finish_request(&msg.id);
        }
    })
}
