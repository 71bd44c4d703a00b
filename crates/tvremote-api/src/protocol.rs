//! Wire types for the remote-control channel.
//!
//! Inbound frames share the `{ "event": "ms.channel.*", "data": { ... } }`
//! envelope; outbound commands use the `ms.remote.control` method envelope
//! with PascalCase parameter names.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Error;

// ── Inbound envelope ────────────────────────────────────────────────

/// Channel events the device may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelEvent {
    #[serde(rename = "ms.channel.connect")]
    Connect,
    #[serde(rename = "ms.channel.disconnect")]
    Disconnect,
    #[serde(rename = "ms.channel.clientConnect")]
    ClientConnect,
    #[serde(rename = "ms.channel.clientDisconnect")]
    ClientDisconnect,
    #[serde(rename = "ms.channel.data")]
    Data,
    #[serde(rename = "ms.channel.error")]
    Error,
    #[serde(rename = "ms.channel.message")]
    Message,
    #[serde(rename = "ms.channel.ping")]
    Ping,
    #[serde(rename = "ms.channel.ready")]
    Ready,
    #[serde(rename = "ms.channel.timeOut")]
    TimeOut,
    #[serde(rename = "ms.channel.unauthorized")]
    Unauthorized,
}

impl ChannelEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "ms.channel.connect",
            Self::Disconnect => "ms.channel.disconnect",
            Self::ClientConnect => "ms.channel.clientConnect",
            Self::ClientDisconnect => "ms.channel.clientDisconnect",
            Self::Data => "ms.channel.data",
            Self::Error => "ms.channel.error",
            Self::Message => "ms.channel.message",
            Self::Ping => "ms.channel.ping",
            Self::Ready => "ms.channel.ready",
            Self::TimeOut => "ms.channel.timeOut",
            Self::Unauthorized => "ms.channel.unauthorized",
        }
    }
}

impl fmt::Display for ChannelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The envelope every handshake frame arrives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub event: ChannelEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AuthResponseBody>,
}

impl AuthResponse {
    /// The credential carried by a `connect` frame.
    ///
    /// A top-level `data.token` wins; otherwise the token attached to the
    /// first connected client is used.
    pub fn refreshed_token(&self) -> Option<&str> {
        let data = self.data.as_ref()?;
        data.token.as_deref().or_else(|| {
            data.clients
                .as_ref()
                .and_then(|clients| clients.first())
                .and_then(|client| client.attributes.token.as_deref())
        })
    }
}

/// Payload of a handshake frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponseBody {
    /// Peers currently attached to the channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<ConnectedClient>>,
    /// Identifier of this authorized connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Fresh token issued with an authorized connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// A peer attached to the device's remote-control channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedClient {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub is_host: bool,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub connect_time: i64,
    /// Base64-encoded device name.
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub attributes: ClientAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAttributes {
    /// Base64-encoded client name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// ── Outbound envelope ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "ms.remote.control")]
    Control,
}

/// The `Cmd` verbs with a fixed spelling. Text input carries base64 text instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandVerb {
    Click,
    Move,
    LeftClick,
}

impl CommandVerb {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "Click",
            Self::Move => "Move",
            Self::LeftClick => "LeftClick",
        }
    }
}

/// Which remote-control surface a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlType {
    #[serde(rename = "SendInputEnd")]
    InputEnd,
    #[serde(rename = "SendInputString")]
    InputString,
    #[serde(rename = "ProcessMouseDevice")]
    MouseDevice,
    #[serde(rename = "SendRemoteKey")]
    RemoteKey,
}

/// Relative pointer movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "Time")]
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Params {
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_of_cmd: Option<ControlKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<bool>,
    pub type_of_remote: ControlType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// A single command written to the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCommand {
    pub method: Method,
    pub params: Params,
}

impl RemoteCommand {
    /// Press-and-release of a remote-control button.
    pub fn key(key: ControlKey) -> Self {
        Self::control(Params {
            cmd: CommandVerb::Click.as_str().into(),
            data_of_cmd: Some(key),
            option: Some(false),
            type_of_remote: ControlType::RemoteKey,
            position: None,
        })
    }

    /// Relative pointer move.
    pub fn mouse_move(dx: i32, dy: i32) -> Self {
        Self::control(Params {
            cmd: CommandVerb::Move.as_str().into(),
            data_of_cmd: None,
            option: None,
            type_of_remote: ControlType::MouseDevice,
            position: Some(Position {
                x: dx,
                y: dy,
                time: 1,
            }),
        })
    }

    pub fn left_click() -> Self {
        Self::control(Params {
            cmd: CommandVerb::LeftClick.as_str().into(),
            data_of_cmd: None,
            option: None,
            type_of_remote: ControlType::MouseDevice,
            position: None,
        })
    }

    /// Type text into the focused on-screen input field.
    pub fn input_text(text: &str) -> Self {
        Self::control(Params {
            cmd: STANDARD.encode(text.as_bytes()),
            data_of_cmd: Some(ControlKey::Base64),
            option: None,
            type_of_remote: ControlType::InputString,
            position: None,
        })
    }

    fn control(params: Params) -> Self {
        Self {
            method: Method::Control,
            params,
        }
    }

    /// Serialize to the JSON text frame the device expects.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Short label for logs: the key name, or the verb for pointer/text commands.
    pub fn label(&self) -> &str {
        match (self.params.type_of_remote, self.params.data_of_cmd) {
            (ControlType::RemoteKey, Some(key)) => key.as_str(),
            (ControlType::InputString | ControlType::InputEnd, _) => "text",
            _ => self.params.cmd.as_str(),
        }
    }
}

// ── Control keys ────────────────────────────────────────────────────

/// Returned when a key name matches no known [`ControlKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown control key: {0}")]
pub struct UnknownControlKey(pub String);

macro_rules! control_keys {
    ($($variant:ident => $wire:literal),+ $(,)?) => {
        /// Symbolic remote-control buttons understood by the device.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ControlKey {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl ControlKey {
            /// Every known key, in declaration order.
            pub const ALL: &'static [ControlKey] = &[$(ControlKey::$variant),+];

            /// The wire name, e.g. `KEY_VOLUP`.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(ControlKey::$variant => $wire,)+
                }
            }
        }
    };
}

control_keys! {
    Power => "KEY_POWER",
    PowerOff => "KEY_POWEROFF",
    PowerOn => "KEY_POWERON",
    Up => "KEY_UP",
    Down => "KEY_DOWN",
    Left => "KEY_LEFT",
    Right => "KEY_RIGHT",
    Enter => "KEY_ENTER",
    Return => "KEY_RETURN",
    ChannelList => "KEY_CH_LIST",
    ChannelUp => "KEY_CHUP",
    ChannelDown => "KEY_CHDOWN",
    Play => "KEY_PLAY",
    Pause => "KEY_PAUSE",
    Stop => "KEY_STOP",
    Rewind => "KEY_REWIND",
    FastForward => "KEY_FF",
    Record => "KEY_REC",
    Menu => "KEY_MENU",
    Source => "KEY_SOURCE",
    Guide => "KEY_GUIDE",
    Tools => "KEY_TOOLS",
    Info => "KEY_INFO",
    Red => "KEY_RED",
    Green => "KEY_GREEN",
    Yellow => "KEY_YELLOW",
    Blue => "KEY_BLUE",
    Key3D => "KEY_3D",
    VolumeUp => "KEY_VOLUP",
    VolumeDown => "KEY_VOLDOWN",
    Mute => "KEY_MUTE",
    Num0 => "KEY_0",
    Num1 => "KEY_1",
    Num2 => "KEY_2",
    Num3 => "KEY_3",
    Num4 => "KEY_4",
    Num5 => "KEY_5",
    Num6 => "KEY_6",
    Num7 => "KEY_7",
    Num8 => "KEY_8",
    Num9 => "KEY_9",
    SourceTv => "KEY_TV",
    SourceHdmi => "KEY_HDMI",
    Contents => "KEY_CONTENTS",
    Home => "KEY_HOME",
    Sleep => "KEY_SLEEP",
    Aspect => "KEY_ASPECT",
    FavoriteChannel => "KEY_FAVCH",
    QuickReplay => "KEY_QUICK_REPLAY",
    StillPicture => "KEY_STILL_PICTURE",
    FmRadio => "KEY_FM_RADIO",
    Mts => "KEY_MTS",
    Clear => "KEY_CLEAR",
    VChip => "KEY_VCHIP",
    Repeat => "KEY_REPEAT",
    Door => "KEY_DOOR",
    Open => "KEY_OPEN",
    WheelLeft => "KEY_WHEEL_LEFT",
    WheelRight => "KEY_WHEEL_RIGHT",
    PanelEnter => "KEY_PANNEL_ENTER",
    PanelMenu => "KEY_PANNEL_MENU",
    PanelSource => "KEY_PANNEL_SOURCE",
    Av1 => "KEY_AV1",
    Av2 => "KEY_AV2",
    Av3 => "KEY_AV3",
    Component1 => "KEY_COMPONENT1",
    Component2 => "KEY_COMPONENT2",
    Dvi => "KEY_DVI",
    Dnet => "KEY_DNET",
    Hdmi1 => "KEY_HDMI1",
    Hdmi2 => "KEY_HDMI2",
    Hdmi3 => "KEY_HDMI3",
    Hdmi4 => "KEY_HDMI4",
    Ext1 => "KEY_EXT1",
    Ext2 => "KEY_EXT2",
    Ext3 => "KEY_EXT3",
    Ext4 => "KEY_EXT4",
    Ext5 => "KEY_EXT5",
    Ext6 => "KEY_EXT6",
    Ext7 => "KEY_EXT7",
    Ext8 => "KEY_EXT8",
    Ext9 => "KEY_EXT9",
    Ext10 => "KEY_EXT10",
    Ext11 => "KEY_EXT11",
    Ext12 => "KEY_EXT12",
    Ext13 => "KEY_EXT13",
    Ext14 => "KEY_EXT14",
    Ext15 => "KEY_EXT15",
    Ext16 => "KEY_EXT16",
    Ext17 => "KEY_EXT17",
    Ext18 => "KEY_EXT18",
    Ext19 => "KEY_EXT19",
    Ext20 => "KEY_EXT20",
    Ext21 => "KEY_EXT21",
    Ext22 => "KEY_EXT22",
    Ext23 => "KEY_EXT23",
    Ext24 => "KEY_EXT24",
    Ext25 => "KEY_EXT25",
    Ext26 => "KEY_EXT26",
    Ext27 => "KEY_EXT27",
    Ext28 => "KEY_EXT28",
    Ext29 => "KEY_EXT29",
    Ext30 => "KEY_EXT30",
    Ext31 => "KEY_EXT31",
    Ext32 => "KEY_EXT32",
    Ext33 => "KEY_EXT33",
    Ext34 => "KEY_EXT34",
    Ext35 => "KEY_EXT35",
    Ext36 => "KEY_EXT36",
    Ext37 => "KEY_EXT37",
    Ext38 => "KEY_EXT38",
    Ext39 => "KEY_EXT39",
    Ext40 => "KEY_EXT40",
    Ext41 => "KEY_EXT41",
    Base64 => "base64",
}

impl ControlKey {
    /// Number key for a single digit.
    pub const fn digit(n: u8) -> Option<Self> {
        Some(match n {
            0 => Self::Num0,
            1 => Self::Num1,
            2 => Self::Num2,
            3 => Self::Num3,
            4 => Self::Num4,
            5 => Self::Num5,
            6 => Self::Num6,
            7 => Self::Num7,
            8 => Self::Num8,
            9 => Self::Num9,
            _ => return None,
        })
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlKey {
    type Err = UnknownControlKey;

    /// Accepts the wire name (`KEY_VOLUP`) or the bare name (`volup`), any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| {
                let wire = key.as_str();
                wire.eq_ignore_ascii_case(wanted)
                    || wire
                        .strip_prefix("KEY_")
                        .is_some_and(|short| short.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| UnknownControlKey(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn key_command_matches_wire_envelope() {
        let cmd = RemoteCommand::key(ControlKey::VolumeUp);
        let value: serde_json::Value = serde_json::from_str(&cmd.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "method": "ms.remote.control",
                "params": {
                    "Cmd": "Click",
                    "DataOfCmd": "KEY_VOLUP",
                    "Option": false,
                    "TypeOfRemote": "SendRemoteKey"
                }
            })
        );
    }

    #[test]
    fn key_command_decodes_back_to_same_fields() {
        let json = RemoteCommand::key(ControlKey::Home).to_json().unwrap();
        let decoded: RemoteCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.params.data_of_cmd, Some(ControlKey::Home));
        assert_eq!(decoded.params.type_of_remote, ControlType::RemoteKey);
    }

    #[test]
    fn mouse_move_carries_position() {
        let value = serde_json::to_value(RemoteCommand::mouse_move(12, -4)).unwrap();
        assert_eq!(
            value["params"],
            json!({
                "Cmd": "Move",
                "TypeOfRemote": "ProcessMouseDevice",
                "Position": { "x": 12, "y": -4, "Time": 1 }
            })
        );
    }

    #[test]
    fn left_click_has_no_position() {
        let value = serde_json::to_value(RemoteCommand::left_click()).unwrap();
        assert_eq!(value["params"]["Cmd"], "LeftClick");
        assert!(value["params"].get("Position").is_none());
    }

    #[test]
    fn input_text_is_base64() {
        let cmd = RemoteCommand::input_text("hello");
        assert_eq!(cmd.params.cmd, "aGVsbG8=");
        assert_eq!(cmd.params.data_of_cmd, Some(ControlKey::Base64));
        assert_eq!(cmd.params.type_of_remote, ControlType::InputString);
        assert_eq!(cmd.label(), "text");
    }

    #[test]
    fn control_key_parses_loosely() {
        assert_eq!("KEY_VOLUP".parse::<ControlKey>().unwrap(), ControlKey::VolumeUp);
        assert_eq!("volup".parse::<ControlKey>().unwrap(), ControlKey::VolumeUp);
        assert_eq!(" hdmi2 ".parse::<ControlKey>().unwrap(), ControlKey::Hdmi2);
        assert_eq!("base64".parse::<ControlKey>().unwrap(), ControlKey::Base64);
        assert_eq!(
            "KEY_NOPE".parse::<ControlKey>(),
            Err(UnknownControlKey("KEY_NOPE".into()))
        );
    }

    #[test]
    fn wire_names_are_unique() {
        let mut names: Vec<&str> = ControlKey::ALL.iter().map(|k| k.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn digit_keys() {
        assert_eq!(ControlKey::digit(7), Some(ControlKey::Num7));
        assert_eq!(ControlKey::digit(10), None);
    }

    #[test]
    fn refreshed_token_prefers_top_level() {
        let response: AuthResponse = serde_json::from_value(json!({
            "event": "ms.channel.connect",
            "data": {
                "token": "T",
                "clients": [{ "attributes": { "token": "R" } }]
            }
        }))
        .unwrap();
        assert_eq!(response.refreshed_token(), Some("T"));
    }

    #[test]
    fn refreshed_token_falls_back_to_first_client() {
        let response: AuthResponse = serde_json::from_value(json!({
            "event": "ms.channel.connect",
            "data": {
                "clients": [
                    { "attributes": { "name": "VGVzdA==", "token": "R" }, "id": "a", "isHost": false },
                    { "attributes": { "token": "other" } }
                ]
            }
        }))
        .unwrap();
        assert_eq!(response.refreshed_token(), Some("R"));
    }

    #[test]
    fn full_client_descriptor_decodes() {
        let raw = r#"{"data":{"clients":[{"attributes":{"name":"VGVzdA=="},"connectTime":1713369027676,"deviceName":"VGVzdA==","id":"502e895e-251f-48ca-b786-0f83b20102c5","isHost":false}],"id":"502e895e-251f-48ca-b786-0f83b20102c5","token":"99999999"},"event":"ms.channel.connect"}"#;
        let response: AuthResponse = serde_json::from_str(raw).unwrap();
        let data = response.data.as_ref().unwrap();
        let client = &data.clients.as_ref().unwrap()[0];
        assert_eq!(client.connect_time, 1_713_369_027_676);
        assert!(!client.is_host);
        assert_eq!(client.attributes.name.as_deref(), Some("VGVzdA=="));
        assert_eq!(response.refreshed_token(), Some("99999999"));
    }
}
