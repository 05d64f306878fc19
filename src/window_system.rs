//! The boundary between the window manager engine and the display server.
//!
//! The engine never talks to X directly: it consumes [`WmEvent`]s and issues
//! commands through [`WindowSystem`]. The X11 implementation lives in
//! [`crate::x11`]; tests drive the engine with a recording fake.

use crate::bar::BarModel;
use crate::errors::{ErrorKind, RequestKind, WmResult};
use crate::keyboard::keysyms::Keysym;
use crate::layout::Rect;
use crate::size_hints::SizeHints;
use x11rb::protocol::xproto::Window;

/// Flag bits of [`ConfigureRequest::value_mask`].
pub mod configure_mask {
    pub const X: u16 = 1 << 0;
    pub const Y: u16 = 1 << 1;
    pub const WIDTH: u16 = 1 << 2;
    pub const HEIGHT: u16 = 1 << 3;
    pub const BORDER_WIDTH: u16 = 1 << 4;
    pub const SIBLING: u16 = 1 << 5;
    pub const STACK_MODE: u16 = 1 << 6;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequest {
    pub window: Window,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub border_width: i32,
    pub sibling: Window,
    pub stack_mode: u32,
    pub value_mask: u16,
}

impl ConfigureRequest {
    pub fn has(&self, flag: u16) -> bool {
        self.value_mask & flag != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Name,
    NormalHints,
    Hints,
    TransientFor,
    WindowType,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Remove,
    Add,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// `_NET_WM_STATE` naming `_NET_WM_STATE_FULLSCREEN`.
    Fullscreen(StateAction),
    /// `_NET_ACTIVE_WINDOW`.
    ActiveWindow,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmEvent {
    ButtonPress {
        window: Window,
        root_x: i32,
        root_y: i32,
        /// Pointer x relative to `window`, used for bar hit-testing.
        x: i32,
        button: u8,
        state: u16,
    },
    ButtonRelease {
        window: Window,
    },
    MotionNotify {
        window: Window,
        root_x: i32,
        root_y: i32,
        time: u32,
    },
    KeyPress {
        keysym: Keysym,
        state: u16,
    },
    MapRequest {
        window: Window,
    },
    UnmapNotify {
        window: Window,
        synthetic: bool,
    },
    DestroyNotify {
        window: Window,
    },
    ConfigureRequest(ConfigureRequest),
    ConfigureNotify {
        window: Window,
        width: i32,
        height: i32,
    },
    EnterNotify {
        window: Window,
        /// False for inferior crossings and grab/ungrab modes.
        normal: bool,
    },
    PropertyNotify {
        window: Window,
        property: PropertyKind,
        deleted: bool,
    },
    ClientMessage {
        window: Window,
        message: ClientMessage,
    },
    Expose {
        window: Window,
        count: u16,
    },
    FocusIn {
        window: Window,
    },
    MappingNotify {
        keyboard: bool,
    },
    ProtocolError {
        request: RequestKind,
        error: ErrorKind,
    },
}

/// ICCCM `WM_STATE` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Withdrawn,
    Normal,
    Iconic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    pub geometry: Rect,
    pub border_width: i32,
    pub override_redirect: bool,
    pub viewable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WmHints {
    pub urgent: bool,
    /// The ICCCM input hint when the client set one.
    pub input: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowType {
    pub is_dialog: bool,
    pub is_fullscreen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    Normal,
    Move,
    Resize,
}

/// Border colour roles, resolved to pixels by the backend from the
/// configured schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderScheme {
    Normal,
    Selected,
    Global,
}

pub trait WindowSystem {
    /// Blocks until the next event arrives.
    fn next_event(&mut self) -> WmResult<WmEvent>;

    fn root(&self) -> Window;
    fn screen_size(&self) -> (i32, i32);
    /// Rectangles of the physical outputs, in server order.
    fn monitor_geometries(&self) -> Vec<Rect>;
    fn numlock_mask(&self) -> u16;

    fn bar_height(&self) -> i32;
    fn text_width(&self, text: &str) -> i32;
    fn create_bar(&mut self, geometry: Rect) -> WmResult<Window>;
    fn destroy_bar(&mut self, bar: Window) -> WmResult<()>;
    fn draw_bar(&mut self, bar: Window, model: &BarModel) -> WmResult<()>;

    /// `geometry` excludes the border.
    fn move_resize_window(&self, window: Window, geometry: Rect, border_width: i32) -> WmResult<()>;
    fn move_window(&self, window: Window, x: i32, y: i32) -> WmResult<()>;
    /// Synthetic `ConfigureNotify` telling a client its real geometry.
    fn send_configure_notify(&self, window: Window, geometry: Rect, border_width: i32) -> WmResult<()>;
    /// Grants a configure request of a window the manager does not manage.
    fn configure_unmanaged(&self, request: &ConfigureRequest) -> WmResult<()>;
    fn set_border_width(&self, window: Window, border_width: i32) -> WmResult<()>;
    fn set_border_color(&self, window: Window, scheme: BorderScheme) -> WmResult<()>;
    fn raise_window(&self, window: Window) -> WmResult<()>;
    /// Places each window directly below the previous one, starting below `sibling`.
    fn stack_windows(&self, sibling: Window, windows: &[Window]) -> WmResult<()>;

    fn map_window(&self, window: Window) -> WmResult<()>;
    fn unmap_window(&self, window: Window) -> WmResult<()>;
    fn set_client_state(&self, window: Window, state: WindowState) -> WmResult<()>;
    fn client_state(&self, window: Window) -> Option<WindowState>;

    /// `None` returns focus to the root window.
    fn focus_window(&self, window: Option<Window>) -> WmResult<()>;
    /// Returns whether the client supports `WM_TAKE_FOCUS`.
    fn send_take_focus(&self, window: Window) -> WmResult<bool>;
    /// Returns whether the client supports `WM_DELETE_WINDOW`.
    fn send_delete(&self, window: Window) -> WmResult<bool>;
    fn kill_client(&self, window: Window) -> WmResult<()>;

    fn grab_buttons(&self, window: Window, focused: bool, buttons: &[(u16, u8)]) -> WmResult<()>;
    fn ungrab_buttons(&self, window: Window) -> WmResult<()>;
    fn grab_keys(&self, keys: &[(u16, Keysym)]) -> WmResult<()>;

    /// Subscribes to the events the manager needs from a client.
    fn watch_client(&self, window: Window) -> WmResult<()>;
    fn window_attributes(&self, window: Window) -> Option<WindowAttributes>;
    fn window_title(&self, window: Window) -> Option<String>;
    /// `(instance, class)` from `WM_CLASS`.
    fn window_class(&self, window: Window) -> (String, String);
    fn transient_for(&self, window: Window) -> Option<Window>;
    fn size_hints(&self, window: Window) -> Option<SizeHints>;
    fn wm_hints(&self, window: Window) -> WmHints;
    fn set_urgency(&self, window: Window, urgent: bool) -> WmResult<()>;
    fn window_type(&self, window: Window) -> WindowType;
    fn query_tree(&self) -> Vec<Window>;
    fn set_fullscreen_state(&self, window: Window, fullscreen: bool) -> WmResult<()>;
    fn set_active_window(&self, window: Option<Window>) -> WmResult<()>;
    fn update_client_list(&self, windows: &[Window]) -> WmResult<()>;

    fn query_pointer(&self) -> Option<(i32, i32)>;
    fn warp_pointer(&self, window: Window, x: i32, y: i32) -> WmResult<()>;
    /// Returns false when another client holds the pointer.
    fn grab_pointer(&self, cursor: CursorKind) -> WmResult<bool>;
    fn ungrab_pointer(&self) -> WmResult<()>;
    fn allow_events_replay(&self) -> WmResult<()>;

    /// Root window name, the status text source.
    fn status_text(&self) -> Option<String>;
    /// Grabs the server and stops structure notifications for the root and
    /// `window` until [`WindowSystem::restore_structure_events`].
    fn mute_structure_events(&self, window: Window) -> WmResult<()>;
    fn restore_structure_events(&self, window: Window) -> WmResult<()>;
    fn flush(&self) -> WmResult<()>;
    fn refresh_keyboard_mapping(&mut self) -> WmResult<()>;
    /// Drops queued `EnterNotify` events so restacking does not steal focus.
    fn discard_enter_events(&mut self) -> WmResult<()>;
}
