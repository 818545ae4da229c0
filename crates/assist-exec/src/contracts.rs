use serde::Deserialize;
use serde::Serialize;

pub const CHAT_INSTRUCTION: &str = "You are a smart and helpful personal assistant. \
Answer clearly, objectively and in a friendly way. Help the user with their questions, \
give useful information and always be polite.";

pub const GENERATE_INSTRUCTION: &str = "You are an assistant specialised in writing. \
Produce high-quality content from the user's instructions. Be creative, clear and \
professional, and adapt tone and style to what is asked.";

pub const CONNECTION_FALLBACK: &str = "Error connecting to the AI. Please try again.";
pub const CHAT_EMPTY_FALLBACK: &str = "Sorry, I couldn't process your message.";
pub const GENERATE_EMPTY_FALLBACK: &str = "Error generating text.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Chat,
    Generate,
}

impl RequestKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Generate => "generate",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Self::Chat => CHAT_INSTRUCTION,
            Self::Generate => GENERATE_INSTRUCTION,
        }
    }

    /// Shown when the provider answered with nothing.
    pub fn empty_fallback(self) -> &'static str {
        match self {
            Self::Chat => CHAT_EMPTY_FALLBACK,
            Self::Generate => GENERATE_EMPTY_FALLBACK,
        }
    }

    /// Shown when the provider could not be reached or failed.
    pub fn failure_fallback(self) -> &'static str {
        CONNECTION_FALLBACK
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub kind: RequestKind,
    pub text: String,
}

impl GatewayRequest {
    pub fn chat(message: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Chat,
            text: message.into(),
        }
    }

    pub fn generate(prompt: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Generate,
            text: prompt.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Answered,
    Empty,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayReply {
    pub request: GatewayRequest,
    pub status: ReplyStatus,
    /// Always displayable: the answer or a fallback message.
    pub text: String,
}
