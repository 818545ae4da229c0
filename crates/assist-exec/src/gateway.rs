use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use crate::contracts::GatewayReply;
use crate::contracts::GatewayRequest;
use crate::contracts::ReplyStatus;
use crate::contracts::RequestKind;
use crate::error::GatewayResult;

/// One prompt in, one displayable text out. Failures never escape
/// [`RequestGateway::answer`]; they become the kind's fallback text.
pub trait RequestGateway {
    fn name(&self) -> &'static str;

    fn complete(&self, request: &GatewayRequest) -> GatewayResult<String>;

    fn answer(&self, request: &GatewayRequest) -> GatewayReply {
        let kind = request.kind;
        let (status, text) = if request.text.trim().is_empty() {
            (ReplyStatus::Failed, kind.failure_fallback().to_string())
        } else {
            match self.complete(request) {
                Ok(text) if text.trim().is_empty() => {
                    (ReplyStatus::Empty, kind.empty_fallback().to_string())
                }
                Ok(text) => (ReplyStatus::Answered, text.trim().to_string()),
                Err(error) => {
                    tracing::warn!(gateway = self.name(), kind = kind.label(), %error, "model request failed");
                    (ReplyStatus::Failed, kind.failure_fallback().to_string())
                }
            }
        };
        GatewayReply {
            request: request.clone(),
            status,
            text,
        }
    }

    fn chat(&self, message: &str) -> String {
        self.answer(&GatewayRequest::chat(message)).text
    }

    fn generate(&self, prompt: &str) -> String {
        self.answer(&GatewayRequest::generate(prompt)).text
    }
}

/// Runs the request on a worker thread; the receiver yields exactly one reply.
pub fn spawn_request<G>(gateway: Arc<G>, request: GatewayRequest) -> mpsc::Receiver<GatewayReply>
where
    G: RequestGateway + Send + Sync + ?Sized + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let reply = gateway.answer(&request);
        let _ = tx.send(reply);
    });
    rx
}

/// Offline stand-in with canned, deterministic answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedGateway;

impl RequestGateway for SimulatedGateway {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn complete(&self, request: &GatewayRequest) -> GatewayResult<String> {
        let text = request.text.trim();
        Ok(match request.kind {
            RequestKind::Chat => format!("(simulated) You said: {text}"),
            RequestKind::Generate => {
                format!("(simulated) Draft for \"{text}\":\n\n{text}.")
            }
        })
    }
}
