use std::sync::Arc;

use dashmap::DashMap;
use tokio::{net::tcp::OwnedWriteHalf, sync::Mutex};
use uuid::Uuid;

pub type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

#[derive(Debug)]
struct Connection {
    writer: SharedWriter,
    in_flight: usize,
    reading_done: bool,
}

/// Write halves of open connections, keyed by connection id.
///
/// An entry is dropped once its client stopped sending and every request it
/// sent has been answered, so a client may half-close and still read all of
/// its responses.
#[derive(Clone, Debug, Default)]
pub struct Connections {
    inner: Arc<DashMap<Uuid, Connection>>,
}

impl Connections {
    pub fn register(&self, id: Uuid, writer: OwnedWriteHalf) {
        self.inner.insert(
            id,
            Connection {
                writer: Arc::new(Mutex::new(writer)),
                in_flight: 0,
                reading_done: false,
            },
        );
    }

    pub fn writer(&self, id: &Uuid) -> Option<SharedWriter> {
        self.inner.get(id).map(|conn| conn.writer.clone())
    }

    pub fn begin_request(&self, id: &Uuid) {
        if let Some(mut conn) = self.inner.get_mut(id) {
            conn.in_flight += 1;
        }
    }

    pub fn finish_request(&self, id: &Uuid) {
        if let Some(mut conn) = self.inner.get_mut(id) {
            conn.in_flight = conn.in_flight.saturating_sub(1);
        }
        self.remove_if_idle(id);
    }

    pub fn close_reading(&self, id: &Uuid) {
        if let Some(mut conn) = self.inner.get_mut(id) {
            conn.reading_done = true;
        }
        self.remove_if_idle(id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    fn remove_if_idle(&self, id: &Uuid) {
        if self
            .inner
            .remove_if(id, |_, conn| conn.reading_done && conn.in_flight == 0)
            .is_some()
        {
            tracing::debug!(connection = %id, "connection closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    async fn write_half() -> OwnedWriteHalf {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, _server) = tokio::join!(TcpStream::connect(addr), listener.accept());
        let (_read, write) = client.unwrap().into_split();
        write
    }

    #[tokio::test]
    async fn test_connection_kept_until_requests_answered() {
        let connections = Connections::default();
        let id = Uuid::new_v4();
        connections.register(id, write_half().await);

        connections.begin_request(&id);
        connections.begin_request(&id);
        connections.close_reading(&id);
        assert!(connections.writer(&id).is_some());

        connections.finish_request(&id);
        assert!(connections.writer(&id).is_some());

        connections.finish_request(&id);
        assert!(connections.writer(&id).is_none());
        assert_eq!(connections.len(), 0);
    }

    #[tokio::test]
    async fn test_idle_connection_removed_on_close() {
        let connections = Connections::default();
        let id = Uuid::new_v4();
        connections.register(id, write_half().await);

        connections.close_reading(&id);

        assert!(connections.writer(&id).is_none());
    }

    #[tokio::test]
    async fn test_open_connection_survives_answered_requests() {
        let connections = Connections::default();
        let id = Uuid::new_v4();
        connections.register(id, write_half().await);

        connections.begin_request(&id);
        connections.finish_request(&id);

        assert!(connections.writer(&id).is_some());
    }
}
