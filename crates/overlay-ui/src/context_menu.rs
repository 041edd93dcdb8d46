//! Context menu: a titled list of host-defined options.
//!
//! Menus are not requests, so only a user close reports to the host
//! (`closeContext`). A new `showContext` while a menu is on screen closes
//! it first and waits for the re-open gap before presenting the new one.

use std::fmt;
use std::time::Duration;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use overlay_bridge::SubscriptionSet;
use overlay_common::{Endpoint, HostEvent, UserAction};

use crate::component::{forward, Mounted};
use crate::context::{decode, OverlayContext};
use crate::state::{OverlayCell, OverlayKind, OverlayState};

const KIND: OverlayKind = OverlayKind::ContextMenu;

/// One entry of a context menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextOption {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<Value>,
    pub icon_color: Option<String>,
    pub icon_animation: Option<String>,
    pub disabled: bool,
    pub read_only: bool,
    pub progress: Option<f64>,
    pub color_scheme: Option<String>,
    pub arrow: bool,
    /// Submenu this option leads to.
    pub menu: Option<String>,
    pub metadata: Option<Value>,
    pub image: Option<String>,
}

impl ContextOption {
    pub fn is_selectable(&self) -> bool {
        !self.disabled && !self.read_only
    }
}

/// Options keyed by the id reported back on selection, in host order.
///
/// Hosts send either an object (`{"key": option}`) or a list, in which
/// case the keys are the list positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextOptions(Vec<(String, ContextOption)>);

impl ContextOptions {
    pub fn get(&self, key: &str) -> Option<&ContextOption> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, o)| o)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextOption)> {
        self.0.iter().map(|(k, o)| (k.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ContextOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, option) in &self.0 {
            map.serialize_entry(key, option)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ContextOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = ContextOptions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map or list of context menu options")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(ContextOptions::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut options = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, option)) = access.next_entry::<String, ContextOption>()? {
                    options.push((key, option));
                }
                Ok(ContextOptions(options))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut options = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(option) = access.next_element::<ContextOption>()? {
                    options.push((options.len().to_string(), option));
                }
                Ok(ContextOptions(options))
            }
        }

        deserializer.deserialize_any(OptionsVisitor)
    }
}

/// `showContext` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuProps {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    /// Parent menu for back navigation.
    #[serde(default)]
    pub menu: Option<String>,
    #[serde(default)]
    pub can_close: Option<bool>,
    #[serde(default)]
    pub options: ContextOptions,
}

impl ContextMenuProps {
    /// Escape and the close button work unless the host sent `canClose: false`.
    pub fn closable(&self) -> bool {
        self.can_close != Some(false)
    }
}

enum ContextCommand {
    Show(ContextMenuProps),
    Hide,
    User(UserAction),
    Select(String),
}

/// Mounted context menu.
pub struct ContextMenu {
    inner: Mounted<ContextCommand, ContextMenuProps>,
}

impl ContextMenu {
    pub fn mount(ctx: &OverlayContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (cell, state) = OverlayCell::new(KIND);

        let mut subscriptions = SubscriptionSet::new();
        forward(&ctx.bus, &mut subscriptions, KIND, HostEvent::ShowContext, &tx, |e| {
            decode(e).map(ContextCommand::Show)
        });
        forward(&ctx.bus, &mut subscriptions, KIND, HostEvent::HideContext, &tx, |_| {
            Ok(ContextCommand::Hide)
        });

        let machine = ContextMachine {
            ctx: ctx.clone(),
            cell,
        };
        let task = tokio::spawn(machine.run(rx));
        Self {
            inner: Mounted::new(KIND, tx, state, subscriptions, task),
        }
    }

    /// The user picked the option stored under `key`.
    pub fn select(&self, key: impl Into<String>) -> overlay_common::Result<()> {
        self.inner.send(ContextCommand::Select(key.into()))
    }

    /// Ask the host for the parent menu.
    pub fn back(&self) -> overlay_common::Result<()> {
        self.inner.send(ContextCommand::User(UserAction::Back))
    }

    /// Escape key or close button.
    pub fn user_action(&self, action: UserAction) -> overlay_common::Result<()> {
        self.inner.send(ContextCommand::User(action))
    }

    pub fn state(&self) -> OverlayState<ContextMenuProps> {
        self.inner.state()
    }

    pub fn watch(&self) -> watch::Receiver<OverlayState<ContextMenuProps>> {
        self.inner.watch()
    }

    pub async fn unmount(self) {
        self.inner.unmount().await;
    }
}

struct ContextMachine {
    ctx: OverlayContext,
    cell: OverlayCell<ContextMenuProps>,
}

impl ContextMachine {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<ContextCommand>) {
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
    }

    async fn handle(&mut self, command: ContextCommand) {
        match command {
            ContextCommand::Show(props) => {
                self.close(self.ctx.timings().context_reopen()).await;
                debug!(kind = %KIND, id = ?props.id, options = props.options.len(), "showing menu");
                self.cell.open(props);
            }
            ContextCommand::Hide => {
                self.close(self.ctx.timings().fade_exit()).await;
            }
            ContextCommand::User(UserAction::Back) => self.back(),
            ContextCommand::User(action @ (UserAction::Escape | UserAction::CloseButton)) => {
                let closable = self.cell.data().is_some_and(|p| p.closable());
                if !closable {
                    debug!(kind = %KIND, action = action.label(), "menu cannot be closed");
                    return;
                }
                if self.close(self.ctx.timings().fade_exit()).await {
                    self.ctx.notify(Endpoint::CloseContext, None);
                }
            }
            ContextCommand::User(action) => {
                debug!(kind = %KIND, action = action.label(), "action ignored");
            }
            ContextCommand::Select(key) => self.select(&key),
        }
    }

    fn back(&self) {
        if !self.cell.is_visible() {
            return;
        }
        match self.cell.data().and_then(|p| p.menu) {
            Some(parent) => {
                self.ctx
                    .notify(Endpoint::OpenContext, Some(json!({"id": parent, "back": true})));
            }
            None => debug!(kind = %KIND, "menu has no parent"),
        }
    }

    fn select(&self, key: &str) {
        if !self.cell.is_visible() {
            return;
        }
        let selectable = self
            .cell
            .data()
            .and_then(|p| p.options.get(key).map(ContextOption::is_selectable));
        match selectable {
            Some(true) => {
                self.ctx.notify(Endpoint::ClickContext, Some(json!(key)));
            }
            Some(false) => debug!(kind = %KIND, key, "option not selectable"),
            None => debug!(kind = %KIND, key, "unknown option"),
        }
    }

    /// Returns `true` if a visible menu was closed.
    async fn close(&mut self, exit: Duration) -> bool {
        if !self.cell.begin_close() {
            return false;
        }
        self.cell.finish_close(exit).await;
        true
    }
}
