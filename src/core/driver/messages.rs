//! Driver-internal window messages and system commands.

use crate::core::window::resize::ResizeEdge;

const MSG_INIT_DISPLAY_DEVICES: u32 = 0x8000_1000;
const MSG_CONFIGURE: u32 = 0x8000_1001;
const MSG_SET_FOREGROUND: u32 = 0x8000_1002;

/// Messages the driver posts to windows and later handles on their
/// thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMessage {
    /// Display devices changed; refresh the display mode.
    InitDisplayDevices,
    /// Drain the pending compositor configure into window geometry.
    Configure,
    /// Bring the window to the foreground.
    SetForeground,
    /// Anything else. Logged and ignored.
    Unknown(u32),
}

impl DriverMessage {
    pub fn code(&self) -> u32 {
        match self {
            DriverMessage::InitDisplayDevices => MSG_INIT_DISPLAY_DEVICES,
            DriverMessage::Configure => MSG_CONFIGURE,
            DriverMessage::SetForeground => MSG_SET_FOREGROUND,
            DriverMessage::Unknown(code) => *code,
        }
    }
}

impl From<u32> for DriverMessage {
    fn from(code: u32) -> Self {
        match code {
            MSG_INIT_DISPLAY_DEVICES => DriverMessage::InitDisplayDevices,
            MSG_CONFIGURE => DriverMessage::Configure,
            MSG_SET_FOREGROUND => DriverMessage::SetForeground,
            other => DriverMessage::Unknown(other),
        }
    }
}

const SC_SIZE: u32 = 0xF000;
const SC_MOVE: u32 = 0xF010;

/// System commands the driver may turn into compositor interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysCommand {
    Move,
    Size(ResizeEdge),
    Other(u32),
}

impl SysCommand {
    /// Decode a system command parameter: the command lives in the high
    /// bits, the sizing edge in the low nibble.
    pub fn from_wparam(wparam: u32) -> Self {
        match wparam & 0xfff0 {
            SC_MOVE => SysCommand::Move,
            SC_SIZE => SysCommand::Size(ResizeEdge::from_sizing_edge(wparam & 0x0f)),
            other => SysCommand::Other(other),
        }
    }
}

/// Whether the driver took care of a system command. `NotHandled` tells
/// the caller to fall back to default processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysCommandResult {
    Handled,
    NotHandled,
}
