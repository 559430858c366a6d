use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::choice::Choice;

/// A point in the frame flow. Start -> CollectAddress -> ShowResult -> Start.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    Start,
    CollectAddress,
    ShowResult,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Start => "start",
            StepId::CollectAddress => "collect-address",
            StepId::ShowResult => "show-result",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(StepId::Start),
            "collect-address" => Ok(StepId::CollectAddress),
            "show-result" => Ok(StepId::ShowResult),
            other => Err(format!("unknown frame step {:?}", other)),
        }
    }
}

/// `Initial` for a first render (GET), `Response` when the request answers a
/// previous frame interaction (POST).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FrameStatus {
    Initial,
    Response,
}

/// Everything the flow knows about one request. Built per call, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub step: StepId,
    pub status: FrameStatus,
    pub button_index: Option<u8>,
    pub input_text: Option<String>,
}

impl InboundRequest {
    pub fn initial(step: StepId) -> Self {
        InboundRequest {
            step,
            status: FrameStatus::Initial,
            button_index: None,
            input_text: None,
        }
    }

    pub fn response(step: StepId, payload: &FrameActionPayload) -> Self {
        let data = &payload.untrusted_data;
        InboundRequest {
            step,
            status: FrameStatus::Response,
            button_index: data.button_index,
            input_text: data.input_text.clone(),
        }
    }
}

// Frame action body as posted by Farcaster clients
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameActionPayload {
    #[serde(default)]
    pub untrusted_data: UntrustedData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_data: Option<TrustedData>,
}

impl FrameActionPayload {
    pub fn button(index: u8) -> Self {
        FrameActionPayload {
            untrusted_data: UntrustedData {
                button_index: Some(index),
                ..Default::default()
            },
            trusted_data: None,
        }
    }

    pub fn text(index: u8, input_text: impl Into<String>) -> Self {
        FrameActionPayload {
            untrusted_data: UntrustedData {
                button_index: Some(index),
                input_text: Some(input_text.into()),
                ..Default::default()
            },
            trusted_data: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UntrustedData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_index: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast_id: Option<CastId>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CastId {
    pub fid: u64,
    pub hash: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrustedData {
    pub message_bytes: String,
}

/// What the rendering layer should draw and which inputs come next.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderDescriptor {
    pub view: View,
    pub next_action: StepId,
    pub valid_inputs: Vec<Intent>,
}

impl RenderDescriptor {
    /// Buttons in display order, without the text input.
    pub fn buttons(&self) -> impl Iterator<Item = &Intent> {
        self.valid_inputs
            .iter()
            .filter(|intent| !matches!(intent, Intent::TextInput { .. }))
    }

    pub fn text_input(&self) -> Option<&str> {
        self.valid_inputs.iter().find_map(|intent| match intent {
            Intent::TextInput { placeholder } => Some(placeholder.as_str()),
            _ => None,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct View {
    pub headline: String,
    #[serde(default)]
    pub details: Vec<String>,
    pub tone: Tone,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Highlight,
    Warning,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Intent {
    // Opens the wallet with the unsigned bet for `choice`
    Transaction { label: String, choice: Choice },
    // Posts back to the frame at `target`
    Action { label: String, target: StepId },
    // Starts over with nothing carried
    Reset { label: String },
    TextInput { placeholder: String },
}
