use uuid::Uuid;

/// One request line read from a connection.
#[derive(Debug, Clone)]
pub struct MsgToHandle {
    pub id: Uuid,
    pub text: String,
}

impl MsgToHandle {
    pub fn new(id: Uuid, text: &str) -> Self {
        MsgToHandle {
            id,
            text: text.to_string(),
        }
    }
}

/// One response line to write back to the connection it came from.
#[derive(Debug, Clone)]
pub struct MsgToRes {
    pub id: Uuid,
    pub text: String,
}

impl MsgToRes {
    pub fn new(id: Uuid, text: &str) -> Self {
        MsgToRes {
            id,
            text: text.to_string(),
        }
    }
}
