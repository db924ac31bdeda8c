use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc::Sender,
    task::JoinHandle,
};
use tokio_stream::{StreamExt, wrappers::TcpListenerStream};

pub fn accept_connections(listener: TcpListener, read_tx: Sender<TcpStream>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut incoming = TcpListenerStream::new(listener);
        while let Some(socket) = incoming.next().await {
            match socket {
                Ok(socket) => {
                    if let Ok(peer) = socket.peer_addr() {
                        tracing::debug!(%peer, "connection accepted");
                    }
                    if read_tx.send(socket).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to accept connection"),
            }
        }
    })
}
