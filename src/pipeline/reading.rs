use tokio::{
    net::TcpStream,
    sync::mpsc::{Receiver, Sender},
    task::JoinHandle,
};
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

use crate::{constants::MSG_TX_ERR, models::MsgToHandle, pipeline::connections::Connections};

pub fn read_sockets(
    connections: Connections,
    mut read_rx: Receiver<TcpStream>,
    msg_handle_tx: Sender<MsgToHandle>,
    max_line_bytes: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(socket) = read_rx.recv().await {
            let conn_id = uuid::Uuid::new_v4();

            let (read_half, write_half) = socket.into_split();
            connections.register(conn_id, write_half);

            let connections = connections.clone();
            let msg_handle_tx = msg_handle_tx.clone();
            tokio::spawn(async move {
                let mut lines =
                    FramedRead::new(read_half, LinesCodec::new_with_max_length(max_line_bytes));
                while let Some(line) = lines.next().await {
                    let line = match line {
                        Ok(line) => line,
                        Err(LinesCodecError::MaxLineLengthExceeded) => {
                            tracing::warn!(
                                connection = %conn_id,
                                max_line_bytes,
                                "request line too long, dropping connection"
                            );
                            break;
                        }
                        Err(e) => {
                            tracing::debug!(connection = %conn_id, error = %e, "read failed");
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }

                    connections.begin_request(&conn_id);
                    msg_handle_tx
                        .send(MsgToHandle::new(conn_id, &line))
                        .await
                        .expect(MSG_TX_ERR);
                }
                connections.close_reading(&conn_id);
            });
        }
    })
}
