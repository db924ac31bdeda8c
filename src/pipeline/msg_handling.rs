use std::sync::Arc;

use tokio::{
    sync::mpsc::{Receiver, Sender},
    task::JoinHandle,
};

use crate::{
    api::{
        self,
        models::{Request, Response, ResponseEnvelope},
    },
    constants::{GREETING, RES_TX_ERR},
    core::engine::Engine,
    models::{MsgToHandle, MsgToRes},
};

/// Dispatches every request line to the engine on its own task, so a slow
/// submission never holds up other requests.
pub fn handle_messages(
    engine: Arc<Engine>,
    res_tx: Sender<MsgToRes>,
    mut msg_handle_rx: Receiver<MsgToHandle>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = msg_handle_rx.recv().await {
            let engine = engine.clone();
            let res_tx = res_tx.clone();
            tokio::spawn(async move {
                let text = respond(&engine, &msg.text).await;
                res_tx
                    .send(MsgToRes::new(msg.id, &text))
                    .await
                    .expect(RES_TX_ERR);
            });
        }
    })
}

/// Turns one request line into one response line.
pub async fn respond(engine: &Engine, line: &str) -> String {
    let envelope = match api::decode_request(line) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::info!(error = %e, "rejected request");
            return api::encode_response(&ResponseEnvelope {
                id: None,
                response: Response::Error {
                    error: e.to_string(),
                },
            });
        }
    };

    let response = match envelope.request {
        Request::Run(req) => match engine.execute(req.into()).await {
            Ok(result) => Response::Run(result.into()),
            Err(e) => engine_failure(e),
        },
        Request::Grade(req) => match engine.grade(req.into()).await {
            Ok(report) => Response::Grade(report.into()),
            Err(e) => engine_failure(e),
        },
        Request::Ping => Response::Greeting {
            message: GREETING.to_string(),
        },
    };

    api::encode_response(&ResponseEnvelope {
        id: envelope.id,
        response,
    })
}

fn engine_failure(e: crate::core::engine::EngineError) -> Response {
    tracing::error!(error = %e, "engine failure");
    Response::Error {
        error: e.to_string(),
    }
}
