use std::process::Command;
use std::process::Stdio;

use serde_json::Value;
use snafu::ResultExt;

use crate::contracts::GatewayRequest;
use crate::error::ExitSnafu;
use crate::error::GatewayResult;
use crate::error::SpawnSnafu;
use crate::gateway::RequestGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    Codex,
    Gemini,
}

impl Provider {
    /// Unknown or missing names fall back to ollama.
    pub fn resolve(name: Option<&str>) -> Self {
        match name.unwrap_or("ollama").trim().to_ascii_lowercase().as_str() {
            "codex" => Self::Codex,
            "gemini" => Self::Gemini,
            _ => Self::Ollama,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Codex => "gpt-5",
            Self::Gemini => "gemini-2.5-pro",
            Self::Ollama => "llama3",
        }
    }
}

/// Talks to a model through a locally installed provider CLI.
#[derive(Debug, Clone)]
pub struct ProviderGateway {
    provider: Provider,
    model: String,
}

impl ProviderGateway {
    pub fn new(provider: Option<&str>, model: Option<&str>) -> Self {
        let provider = Provider::resolve(provider);
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(provider.default_model())
            .to_string();
        Self { provider, model }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn command(&self, prompt: &str) -> Command {
        match self.provider {
            Provider::Ollama => {
                let mut cmd = Command::new("ollama");
                cmd.args(["run", "--nowordwrap", self.model.as_str(), prompt]);
                cmd
            }
            Provider::Codex => {
                let mut cmd = Command::new("codex");
                cmd.arg("exec")
                    .arg("--skip-git-repo-check")
                    .arg("--json")
                    .arg("-m")
                    .arg(&self.model)
                    .arg(prompt);
                cmd
            }
            Provider::Gemini => {
                let mut cmd = Command::new("gemini");
                cmd.arg("-p")
                    .arg(prompt)
                    .arg("--output-format")
                    .arg("stream-json")
                    .arg("-m")
                    .arg(&self.model);
                cmd
            }
        }
    }
}

impl RequestGateway for ProviderGateway {
    fn name(&self) -> &'static str {
        self.provider.label()
    }

    fn complete(&self, request: &GatewayRequest) -> GatewayResult<String> {
        let prompt = build_prompt(request);
        tracing::debug!(
            provider = self.provider.label(),
            model = %self.model,
            kind = request.kind.label(),
            "sending model request"
        );
        let stdout = run_command(self.command(&prompt), self.provider.label())?;
        Ok(match self.provider {
            Provider::Ollama => stdout,
            Provider::Codex => codex_final_message(&stdout),
            Provider::Gemini => gemini_assistant_text(&stdout),
        })
    }
}

/// System instruction first, then the user's text.
pub fn build_prompt(request: &GatewayRequest) -> String {
    let mut prompt = String::new();
    prompt.push_str("System:\n");
    prompt.push_str(request.kind.instruction());
    prompt.push_str("\n\nUser Request: ");
    prompt.push_str(&request.text);
    prompt
}

fn run_command(mut cmd: Command, provider: &'static str) -> GatewayResult<String> {
    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .context(SpawnSnafu { provider })?;

    if !output.status.success() {
        let stderr = strip_ansi(&String::from_utf8_lossy(&output.stderr))
            .trim()
            .to_string();
        return ExitSnafu {
            provider,
            status: output.status.to_string(),
            stderr,
        }
        .fail();
    }
    Ok(strip_ansi(&String::from_utf8_lossy(&output.stdout)))
}

/// Drops CSI escape sequences and carriage returns from terminal output.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\u{1b}' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for n in chars.by_ref() {
                        if ('@'..='~').contains(&n) {
                            break;
                        }
                    }
                }
            }
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Last `agent_message` text from `codex exec --json` output.
pub fn codex_final_message(stdout: &str) -> String {
    let mut last = String::new();
    for line in stdout.lines().map(str::trim).filter(|l| l.starts_with('{')) {
        let Ok(event) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        if event.get("type").and_then(Value::as_str) != Some("item.completed") {
            continue;
        }
        let item = event.get("item").unwrap_or(&Value::Null);
        if item.get("type").and_then(Value::as_str) != Some("agent_message") {
            continue;
        }
        if let Some(text) = item.get("text").and_then(Value::as_str) {
            last = text.to_string();
        }
    }
    last
}

/// Assistant text from `gemini --output-format stream-json`, joining deltas.
pub fn gemini_assistant_text(stdout: &str) -> String {
    let mut text = String::new();
    for line in stdout.lines().map(str::trim).filter(|l| l.starts_with('{')) {
        let Ok(event) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        if event.get("type").and_then(Value::as_str) != Some("message")
            || event.get("role").and_then(Value::as_str) != Some("assistant")
        {
            continue;
        }
        let Some(content) = event.get("content").and_then(Value::as_str) else {
            continue;
        };
        if event.get("delta").and_then(Value::as_bool).unwrap_or(false) {
            text.push_str(content);
        } else {
            text = content.to_string();
        }
    }
    text
}
