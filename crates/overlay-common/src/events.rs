//! Host event names, outbound endpoints, and the messages that carry them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::id::CorrelationId;

/// Events the host pushes into the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    SendAlert,
    CloseAlertDialog,
    OpenDialog,
    CloseInputDialog,
    ShowContext,
    HideContext,
    Progress,
    ProgressCancel,
    CircleProgress,
    TextUi,
    TextUiHide,
}

impl HostEvent {
    pub const ALL: [HostEvent; 11] = [
        HostEvent::SendAlert,
        HostEvent::CloseAlertDialog,
        HostEvent::OpenDialog,
        HostEvent::CloseInputDialog,
        HostEvent::ShowContext,
        HostEvent::HideContext,
        HostEvent::Progress,
        HostEvent::ProgressCancel,
        HostEvent::CircleProgress,
        HostEvent::TextUi,
        HostEvent::TextUiHide,
    ];

    /// Name as it appears in the `action` field of a host message.
    pub fn as_str(self) -> &'static str {
        match self {
            HostEvent::SendAlert => "sendAlert",
            HostEvent::CloseAlertDialog => "closeAlertDialog",
            HostEvent::OpenDialog => "openDialog",
            HostEvent::CloseInputDialog => "closeInputDialog",
            HostEvent::ShowContext => "showContext",
            HostEvent::HideContext => "hideContext",
            HostEvent::Progress => "progress",
            HostEvent::ProgressCancel => "progressCancel",
            HostEvent::CircleProgress => "circleProgress",
            HostEvent::TextUi => "textUi",
            HostEvent::TextUiHide => "textUiHide",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host endpoints the overlay calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CloseAlert,
    InputData,
    CloseContext,
    OpenContext,
    ClickContext,
    ProgressComplete,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::CloseAlert => "closeAlert",
            Endpoint::InputData => "inputData",
            Endpoint::CloseContext => "closeContext",
            Endpoint::OpenContext => "openContext",
            Endpoint::ClickContext => "clickContext",
            Endpoint::ProgressComplete => "progressComplete",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message pushed by the host: `{"action": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "action")]
    pub name: String,
    #[serde(rename = "data", default)]
    pub payload: Value,
}

impl InboundEvent {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    pub fn host_event(&self) -> Option<HostEvent> {
        HostEvent::from_name(&self.name)
    }
}

/// A call from the overlay to a host endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundCall {
    pub id: CorrelationId,
    pub endpoint: String,
    #[serde(default)]
    pub body: Option<Value>,
}

impl OutboundCall {
    pub fn new(endpoint: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            id: CorrelationId::new(),
            endpoint: endpoint.into(),
            body,
        }
    }
}
