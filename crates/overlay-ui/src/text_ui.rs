//! Text UI: a persistent hint shown at a screen edge until hidden.
//!
//! Pure notification; nothing is reported to the host.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use overlay_bridge::SubscriptionSet;
use overlay_common::HostEvent;

use crate::component::{forward, Mounted};
use crate::context::{decode, OverlayContext};
use crate::state::{OverlayCell, OverlayKind, OverlayState};

const KIND: OverlayKind = OverlayKind::TextUi;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextUiPosition {
    #[default]
    RightCenter,
    LeftCenter,
    TopCenter,
    BottomCenter,
}

impl TextUiPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            TextUiPosition::RightCenter => "right-center",
            TextUiPosition::LeftCenter => "left-center",
            TextUiPosition::TopCenter => "top-center",
            TextUiPosition::BottomCenter => "bottom-center",
        }
    }
}

impl fmt::Display for TextUiPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextUiPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "right-center" => Ok(TextUiPosition::RightCenter),
            "left-center" => Ok(TextUiPosition::LeftCenter),
            "top-center" => Ok(TextUiPosition::TopCenter),
            "bottom-center" => Ok(TextUiPosition::BottomCenter),
            other => Err(format!("unknown text UI position '{other}'")),
        }
    }
}

/// `textUi` payload. `position` is always set once the text is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextUiProps {
    pub text: String,
    #[serde(default)]
    pub position: Option<TextUiPosition>,
    #[serde(default)]
    pub icon: Option<Value>,
    #[serde(default)]
    pub icon_color: Option<String>,
    #[serde(default)]
    pub icon_animation: Option<String>,
    #[serde(default)]
    pub align_icon: Option<String>,
    #[serde(default)]
    pub style: Option<Value>,
}

enum TextUiCommand {
    Show(TextUiProps),
    Hide,
}

/// Mounted text UI.
pub struct TextUi {
    inner: Mounted<TextUiCommand, TextUiProps>,
}

impl TextUi {
    pub fn mount(ctx: &OverlayContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (cell, state) = OverlayCell::new(KIND);

        let mut subscriptions = SubscriptionSet::new();
        forward(&ctx.bus, &mut subscriptions, KIND, HostEvent::TextUi, &tx, |e| {
            decode(e).map(TextUiCommand::Show)
        });
        forward(&ctx.bus, &mut subscriptions, KIND, HostEvent::TextUiHide, &tx, |_| {
            Ok(TextUiCommand::Hide)
        });

        let configured = &ctx.config.text_ui.default_position;
        let default_position = configured.parse().unwrap_or_else(|e| {
            warn!(kind = %KIND, error = %e, "falling back to right-center");
            TextUiPosition::default()
        });

        let machine = TextUiMachine {
            ctx: ctx.clone(),
            cell,
            default_position,
        };
        let task = tokio::spawn(machine.run(rx));
        Self {
            inner: Mounted::new(KIND, tx, state, subscriptions, task),
        }
    }

    pub fn state(&self) -> OverlayState<TextUiProps> {
        self.inner.state()
    }

    pub fn watch(&self) -> watch::Receiver<OverlayState<TextUiProps>> {
        self.inner.watch()
    }

    pub async fn unmount(self) {
        self.inner.unmount().await;
    }
}

struct TextUiMachine {
    ctx: OverlayContext,
    cell: OverlayCell<TextUiProps>,
    default_position: TextUiPosition,
}

impl TextUiMachine {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<TextUiCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                TextUiCommand::Show(mut props) => {
                    self.hide().await;
                    props.position.get_or_insert(self.default_position);
                    debug!(kind = %KIND, position = ?props.position, "showing text");
                    self.cell.open(props);
                }
                TextUiCommand::Hide => self.hide().await,
            }
        }
    }

    async fn hide(&mut self) {
        if self.cell.begin_close() {
            self.cell.finish_close(self.ctx.timings().fade_exit()).await;
        }
    }
}
