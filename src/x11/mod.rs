//! [`WindowSystem`] on a live X server through x11rb.

mod atoms;
mod draw;
mod events;
mod keymap;
mod xft;

use crate::Config;
use crate::bar::BarModel;
use crate::errors::{WmError, WmResult};
use crate::keyboard::keysyms::Keysym;
use crate::layout::Rect;
use crate::size_hints::SizeHints;
use crate::window_system::{
    BorderScheme, ConfigureRequest, CursorKind, WindowAttributes, WindowState, WindowSystem, WindowType,
    WmEvent, WmHints, configure_mask,
};
use atoms::Atoms;
use draw::{BarSurface, TextRenderer, paint_bar};
use keymap::Keymap;
use log::{debug, info};
use std::collections::{HashMap, VecDeque};
use x11rb::COPY_DEPTH_FROM_PARENT;
use x11rb::connection::Connection;
use x11rb::cursor::Handle as CursorHandle;
use x11rb::errors::ReplyError;
use x11rb::protocol::Event;
use x11rb::protocol::xinerama::ConnectionExt as _;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

const WM_NAME: &str = "tagwm";

const URGENCY_HINT: u32 = 1 << 8;
const INPUT_HINT: u32 = 1 << 0;

fn root_mask(structure_events: bool) -> EventMask {
    let mask = EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::BUTTON_PRESS
        | EventMask::POINTER_MOTION
        | EventMask::ENTER_WINDOW
        | EventMask::LEAVE_WINDOW
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::PROPERTY_CHANGE;
    if structure_events {
        mask | EventMask::SUBSTRUCTURE_NOTIFY
    } else {
        mask
    }
}

fn client_mask(structure_events: bool) -> EventMask {
    let mask = EventMask::ENTER_WINDOW | EventMask::FOCUS_CHANGE | EventMask::PROPERTY_CHANGE;
    if structure_events {
        mask | EventMask::STRUCTURE_NOTIFY
    } else {
        mask
    }
}

fn pointer_mask() -> EventMask {
    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION
}

/// Extent for the wire, which cannot carry zero or negative sizes.
fn extent(value: i32) -> u32 {
    value.max(1) as u32
}

struct Cursors {
    normal: Cursor,
    moving: Cursor,
    resizing: Cursor,
}

impl Cursors {
    fn load(connection: &RustConnection, screen_num: usize) -> WmResult<Self> {
        let database = x11rb::resource_manager::new_from_default(connection)?;
        let handle = CursorHandle::new(connection, screen_num, &database)?.reply()?;
        Ok(Self {
            normal: handle.load_cursor(connection, "left_ptr")?,
            moving: handle.load_cursor(connection, "fleur")?,
            resizing: handle.load_cursor(connection, "sizing")?,
        })
    }

    fn get(&self, kind: CursorKind) -> Cursor {
        match kind {
            CursorKind::Normal => self.normal,
            CursorKind::Move => self.moving,
            CursorKind::Resize => self.resizing,
        }
    }
}

/// Window border pixels for each [`BorderScheme`].
struct BorderPixels {
    normal: u32,
    selected: u32,
    global: u32,
}

pub struct X11Backend {
    connection: RustConnection,
    root: Window,
    screen_size: (i32, i32),
    root_visual: Visualid,
    atoms: Atoms,
    keymap: Keymap,
    numlock_mask: u16,
    cursors: Cursors,
    check_window: Window,
    borders: BorderPixels,
    bar_background: u32,
    bar_height: i32,
    /// Events read ahead while discarding enter notifications.
    pending: VecDeque<Event>,
    // Bar surfaces hold Xft handles and must go before the renderer.
    bars: HashMap<Window, BarSurface>,
    text: TextRenderer,
}

impl X11Backend {
    /// Connects to `$DISPLAY` and becomes its window manager.
    pub fn connect(config: &Config) -> WmResult<Self> {
        let (connection, screen_num) = x11rb::connect(None)?;
        let screen = connection.setup().roots[screen_num].clone();
        let root = screen.root;

        let redirect = connection
            .change_window_attributes(
                root,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_REDIRECT),
            )?
            .check();
        match redirect {
            Err(ReplyError::X11Error(error)) if matches!(error.error_kind, x11rb::protocol::ErrorKind::Access) => {
                return Err(WmError::OtherWmRunning);
            }
            other => other?,
        }

        let atoms = Atoms::new(&connection)?.reply()?;
        let keymap = Keymap::load(&connection)?;
        let numlock_mask = keymap::numlock_mask(&connection, &keymap)?;
        let cursors = Cursors::load(&connection, screen_num)?;
        let text = TextRenderer::open(&config.font)?;
        let bar_height = (text.font_height() as f32 * 1.5) as i32;

        let check_window = connection.generate_id()?;
        connection.create_window(
            COPY_DEPTH_FROM_PARENT,
            check_window,
            root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            screen.root_visual,
            &CreateWindowAux::new(),
        )?;

        let backend = Self {
            connection,
            root,
            screen_size: (screen.width_in_pixels.into(), screen.height_in_pixels.into()),
            root_visual: screen.root_visual,
            atoms,
            keymap,
            numlock_mask,
            cursors,
            check_window,
            borders: BorderPixels {
                normal: config.scheme_normal.border,
                selected: config.scheme_selected.border,
                global: config.scheme_global.border,
            },
            bar_background: config.scheme_normal.background,
            bar_height,
            pending: VecDeque::new(),
            bars: HashMap::new(),
            text,
        };
        backend.advertise()?;

        backend.connection.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new()
                .event_mask(root_mask(true))
                .cursor(backend.cursors.normal),
        )?;
        backend.connection.flush()?;

        info!(
            "connected to screen {} ({}x{}), bar height {}",
            screen_num, screen.width_in_pixels, screen.height_in_pixels, bar_height
        );
        Ok(backend)
    }

    /// Publishes the EWMH supporting window and the supported atom list.
    fn advertise(&self) -> WmResult<()> {
        let atoms = &self.atoms;
        for window in [self.check_window, self.root] {
            self.connection.change_property32(
                PropMode::REPLACE,
                window,
                atoms._NET_SUPPORTING_WM_CHECK,
                AtomEnum::WINDOW,
                &[self.check_window],
            )?;
        }
        self.connection.change_property8(
            PropMode::REPLACE,
            self.check_window,
            atoms._NET_WM_NAME,
            atoms.UTF8_STRING,
            WM_NAME.as_bytes(),
        )?;
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            atoms._NET_SUPPORTED,
            AtomEnum::ATOM,
            &atoms.supported(),
        )?;
        self.connection.delete_property(self.root, atoms._NET_CLIENT_LIST)?;
        Ok(())
    }

    fn property(
        &self,
        window: Window,
        property: impl Into<Atom>,
        kind: impl Into<Atom>,
        length: u32,
    ) -> Option<GetPropertyReply> {
        self.connection
            .get_property(false, window, property, kind, 0, length)
            .ok()?
            .reply()
            .ok()
    }

    fn property32(&self, window: Window, property: impl Into<Atom>, kind: impl Into<Atom>, length: u32) -> Vec<u32> {
        self.property(window, property, kind, length)
            .and_then(|reply| reply.value32().map(|values| values.collect()))
            .unwrap_or_default()
    }

    fn text_property(&self, window: Window, property: impl Into<Atom>, kind: impl Into<Atom>) -> Option<String> {
        let reply = self.property(window, property, kind, 1024)?;
        if reply.format != 8 || reply.value.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(&reply.value).into_owned())
    }

    fn has_atom(&self, window: Window, property: Atom, atom: Atom) -> bool {
        self.property32(window, property, AtomEnum::ATOM, 32).contains(&atom)
    }

    /// Sends a `WM_PROTOCOLS` message if the client lists `protocol`.
    fn send_protocol(&self, window: Window, protocol: Atom) -> WmResult<bool> {
        let supported = self
            .property32(window, self.atoms.WM_PROTOCOLS, AtomEnum::ATOM, 64)
            .contains(&protocol);
        if !supported {
            return Ok(false);
        }

        let event = ClientMessageEvent::new(
            32,
            window,
            self.atoms.WM_PROTOCOLS,
            [protocol, x11rb::CURRENT_TIME, 0, 0, 0],
        );
        self.connection.send_event(false, window, EventMask::NO_EVENT, event)?;
        Ok(true)
    }

    /// Modifier combinations a grab must cover so lock keys do not matter.
    fn lock_variants(&self) -> [u16; 4] {
        let lock = u16::from(KeyButMask::LOCK);
        [0, lock, self.numlock_mask, self.numlock_mask | lock]
    }
}

impl Drop for X11Backend {
    fn drop(&mut self) {
        let _ = self.connection.destroy_window(self.check_window);
        let _ = self.connection.delete_property(self.root, self.atoms._NET_ACTIVE_WINDOW);
        let _ = self.connection.flush();
    }
}

impl WindowSystem for X11Backend {
    fn next_event(&mut self) -> WmResult<WmEvent> {
        loop {
            let event = match self.pending.pop_front() {
                Some(event) => event,
                None => self.connection.wait_for_event()?,
            };
            if let Some(event) = self.translate(event) {
                return Ok(event);
            }
        }
    }

    fn root(&self) -> Window {
        self.root
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screen_size
    }

    fn monitor_geometries(&self) -> Vec<Rect> {
        let active = self
            .connection
            .xinerama_is_active()
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .is_some_and(|reply| reply.state != 0);
        if !active {
            return Vec::new();
        }

        self.connection
            .xinerama_query_screens()
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| {
                reply
                    .screen_info
                    .iter()
                    .map(|info| Rect::new(info.x_org.into(), info.y_org.into(), info.width.into(), info.height.into()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn numlock_mask(&self) -> u16 {
        self.numlock_mask
    }

    fn bar_height(&self) -> i32 {
        self.bar_height
    }

    fn text_width(&self, text: &str) -> i32 {
        self.text.text_width(text)
    }

    fn create_bar(&mut self, geometry: Rect) -> WmResult<Window> {
        let window = self.connection.generate_id()?;
        let gc = self.connection.generate_id()?;

        self.connection.create_window(
            COPY_DEPTH_FROM_PARENT,
            window,
            self.root,
            geometry.x as i16,
            geometry.y as i16,
            extent(geometry.width) as u16,
            extent(geometry.height) as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            self.root_visual,
            &CreateWindowAux::new()
                .background_pixel(self.bar_background)
                .event_mask(EventMask::EXPOSURE | EventMask::BUTTON_PRESS)
                .override_redirect(1)
                .cursor(self.cursors.normal),
        )?;
        self.connection.create_gc(gc, window, &CreateGCAux::new().foreground(self.bar_background))?;
        self.connection.map_window(window)?;
        self.connection
            .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?;
        self.connection.flush()?;

        let surface = BarSurface::new(&self.text, window, gc)?;
        self.bars.insert(window, surface);
        debug!("created bar {:#x} at {:?}", window, geometry);
        Ok(window)
    }

    fn destroy_bar(&mut self, bar: Window) -> WmResult<()> {
        if let Some(surface) = self.bars.remove(&bar) {
            self.connection.free_gc(surface.gc)?;
        }
        self.connection.unmap_window(bar)?;
        self.connection.destroy_window(bar)?;
        Ok(())
    }

    fn draw_bar(&mut self, bar: Window, model: &BarModel) -> WmResult<()> {
        let Some(surface) = self.bars.get(&bar) else {
            return Ok(());
        };
        paint_bar(&self.connection, bar, surface, &self.text, model, self.bar_height)
    }

    fn move_resize_window(&self, window: Window, geometry: Rect, border_width: i32) -> WmResult<()> {
        self.connection.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(geometry.x)
                .y(geometry.y)
                .width(extent(geometry.width))
                .height(extent(geometry.height))
                .border_width(border_width.max(0) as u32),
        )?;
        Ok(())
    }

    fn move_window(&self, window: Window, x: i32, y: i32) -> WmResult<()> {
        self.connection
            .configure_window(window, &ConfigureWindowAux::new().x(x).y(y))?;
        Ok(())
    }

    fn send_configure_notify(&self, window: Window, geometry: Rect, border_width: i32) -> WmResult<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: x11rb::NONE,
            x: geometry.x as i16,
            y: geometry.y as i16,
            width: extent(geometry.width) as u16,
            height: extent(geometry.height) as u16,
            border_width: border_width.max(0) as u16,
            override_redirect: false,
        };
        self.connection
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    fn configure_unmanaged(&self, request: &ConfigureRequest) -> WmResult<()> {
        let mut aux = ConfigureWindowAux::new();
        if request.has(configure_mask::X) {
            aux = aux.x(request.x);
        }
        if request.has(configure_mask::Y) {
            aux = aux.y(request.y);
        }
        if request.has(configure_mask::WIDTH) {
            aux = aux.width(extent(request.width));
        }
        if request.has(configure_mask::HEIGHT) {
            aux = aux.height(extent(request.height));
        }
        if request.has(configure_mask::BORDER_WIDTH) {
            aux = aux.border_width(request.border_width.max(0) as u32);
        }
        if request.has(configure_mask::SIBLING) {
            aux = aux.sibling(request.sibling);
        }
        if request.has(configure_mask::STACK_MODE) {
            aux = aux.stack_mode(StackMode::from(request.stack_mode));
        }
        self.connection.configure_window(request.window, &aux)?;
        Ok(())
    }

    fn set_border_width(&self, window: Window, border_width: i32) -> WmResult<()> {
        self.connection.configure_window(
            window,
            &ConfigureWindowAux::new().border_width(border_width.max(0) as u32),
        )?;
        Ok(())
    }

    fn set_border_color(&self, window: Window, scheme: BorderScheme) -> WmResult<()> {
        let pixel = match scheme {
            BorderScheme::Normal => self.borders.normal,
            BorderScheme::Selected => self.borders.selected,
            BorderScheme::Global => self.borders.global,
        };
        self.connection
            .change_window_attributes(window, &ChangeWindowAttributesAux::new().border_pixel(pixel))?;
        Ok(())
    }

    fn raise_window(&self, window: Window) -> WmResult<()> {
        self.connection
            .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?;
        Ok(())
    }

    fn stack_windows(&self, sibling: Window, windows: &[Window]) -> WmResult<()> {
        let mut above = sibling;
        for &window in windows {
            self.connection.configure_window(
                window,
                &ConfigureWindowAux::new().sibling(above).stack_mode(StackMode::BELOW),
            )?;
            above = window;
        }
        Ok(())
    }

    fn map_window(&self, window: Window) -> WmResult<()> {
        self.connection.map_window(window)?;
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> WmResult<()> {
        self.connection.unmap_window(window)?;
        Ok(())
    }

    fn set_client_state(&self, window: Window, state: WindowState) -> WmResult<()> {
        let value = match state {
            WindowState::Withdrawn => 0,
            WindowState::Normal => 1,
            WindowState::Iconic => 3,
        };
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.WM_STATE,
            self.atoms.WM_STATE,
            &[value, x11rb::NONE],
        )?;
        Ok(())
    }

    fn client_state(&self, window: Window) -> Option<WindowState> {
        match self.property32(window, self.atoms.WM_STATE, self.atoms.WM_STATE, 2).first() {
            Some(0) => Some(WindowState::Withdrawn),
            Some(1) => Some(WindowState::Normal),
            Some(3) => Some(WindowState::Iconic),
            _ => None,
        }
    }

    fn focus_window(&self, window: Option<Window>) -> WmResult<()> {
        let target = window.unwrap_or(self.root);
        self.connection
            .set_input_focus(InputFocus::POINTER_ROOT, target, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn send_take_focus(&self, window: Window) -> WmResult<bool> {
        self.send_protocol(window, self.atoms.WM_TAKE_FOCUS)
    }

    fn send_delete(&self, window: Window) -> WmResult<bool> {
        self.send_protocol(window, self.atoms.WM_DELETE_WINDOW)
    }

    fn kill_client(&self, window: Window) -> WmResult<()> {
        self.connection.grab_server()?;
        self.connection.set_close_down_mode(CloseDown::DESTROY_ALL)?;
        self.connection.kill_client(window)?;
        self.connection.ungrab_server()?;
        Ok(())
    }

    fn grab_buttons(&self, window: Window, focused: bool, buttons: &[(u16, u8)]) -> WmResult<()> {
        self.ungrab_buttons(window)?;
        if !focused {
            self.connection.grab_button(
                false,
                window,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                GrabMode::SYNC,
                GrabMode::SYNC,
                x11rb::NONE,
                x11rb::NONE,
                ButtonIndex::ANY,
                ModMask::ANY,
            )?;
        }
        for &(mask, button) in buttons {
            for variant in self.lock_variants() {
                self.connection.grab_button(
                    false,
                    window,
                    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                    GrabMode::ASYNC,
                    GrabMode::SYNC,
                    x11rb::NONE,
                    x11rb::NONE,
                    ButtonIndex::from(button),
                    ModMask::from(mask | variant),
                )?;
            }
        }
        Ok(())
    }

    fn ungrab_buttons(&self, window: Window) -> WmResult<()> {
        self.connection
            .ungrab_button(ButtonIndex::ANY, window, ModMask::ANY)?;
        Ok(())
    }

    fn grab_keys(&self, keys: &[(u16, Keysym)]) -> WmResult<()> {
        self.connection.ungrab_key(Grab::ANY, self.root, ModMask::ANY)?;
        for &(mask, keysym) in keys {
            let keycodes = self.keymap.keycodes(keysym);
            if keycodes.is_empty() {
                debug!("no keycode for keysym {:#x}", keysym);
            }
            for keycode in keycodes {
                for variant in self.lock_variants() {
                    self.connection.grab_key(
                        true,
                        self.root,
                        ModMask::from(mask | variant),
                        keycode,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn watch_client(&self, window: Window) -> WmResult<()> {
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(client_mask(true)),
        )?;
        Ok(())
    }

    fn window_attributes(&self, window: Window) -> Option<WindowAttributes> {
        let attributes = self.connection.get_window_attributes(window).ok()?.reply().ok()?;
        let geometry = self.connection.get_geometry(window).ok()?.reply().ok()?;
        Some(WindowAttributes {
            geometry: Rect::new(
                geometry.x.into(),
                geometry.y.into(),
                geometry.width.into(),
                geometry.height.into(),
            ),
            border_width: geometry.border_width.into(),
            override_redirect: attributes.override_redirect,
            viewable: attributes.map_state == MapState::VIEWABLE,
        })
    }

    fn window_title(&self, window: Window) -> Option<String> {
        self.text_property(window, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)
            .or_else(|| self.text_property(window, AtomEnum::WM_NAME, AtomEnum::ANY))
    }

    fn window_class(&self, window: Window) -> (String, String) {
        let Some(reply) = self.property(window, AtomEnum::WM_CLASS, AtomEnum::STRING, 1024) else {
            return Default::default();
        };
        let mut parts = reply
            .value
            .split(|&byte| byte == 0)
            .map(|part| String::from_utf8_lossy(part).into_owned());
        let instance = parts.next().unwrap_or_default();
        let class = parts.next().unwrap_or_default();
        (instance, class)
    }

    fn transient_for(&self, window: Window) -> Option<Window> {
        self.property32(window, AtomEnum::WM_TRANSIENT_FOR, AtomEnum::WINDOW, 1)
            .first()
            .copied()
            .filter(|&parent| parent != x11rb::NONE)
    }

    fn size_hints(&self, window: Window) -> Option<SizeHints> {
        let values = self.property32(window, AtomEnum::WM_NORMAL_HINTS, AtomEnum::WM_SIZE_HINTS, 18);
        if values.is_empty() {
            return None;
        }
        Some(SizeHints::from_raw(&values))
    }

    fn wm_hints(&self, window: Window) -> WmHints {
        let values = self.property32(window, AtomEnum::WM_HINTS, AtomEnum::WM_HINTS, 9);
        let Some(&flags) = values.first() else {
            return WmHints::default();
        };
        WmHints {
            urgent: flags & URGENCY_HINT != 0,
            input: (flags & INPUT_HINT != 0).then(|| values.get(1).is_some_and(|&input| input != 0)),
        }
    }

    fn set_urgency(&self, window: Window, urgent: bool) -> WmResult<()> {
        let mut values = self.property32(window, AtomEnum::WM_HINTS, AtomEnum::WM_HINTS, 9);
        let Some(flags) = values.first_mut() else {
            return Ok(());
        };
        if urgent {
            *flags |= URGENCY_HINT;
        } else {
            *flags &= !URGENCY_HINT;
        }
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_HINTS,
            AtomEnum::WM_HINTS,
            &values,
        )?;
        Ok(())
    }

    fn window_type(&self, window: Window) -> WindowType {
        WindowType {
            is_dialog: self.has_atom(
                window,
                self.atoms._NET_WM_WINDOW_TYPE,
                self.atoms._NET_WM_WINDOW_TYPE_DIALOG,
            ),
            is_fullscreen: self.has_atom(window, self.atoms._NET_WM_STATE, self.atoms._NET_WM_STATE_FULLSCREEN),
        }
    }

    fn query_tree(&self) -> Vec<Window> {
        self.connection
            .query_tree(self.root)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| reply.children)
            .unwrap_or_default()
    }

    fn set_fullscreen_state(&self, window: Window, fullscreen: bool) -> WmResult<()> {
        let state: &[u32] = if fullscreen {
            &[self.atoms._NET_WM_STATE_FULLSCREEN]
        } else {
            &[]
        };
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms._NET_WM_STATE,
            AtomEnum::ATOM,
            state,
        )?;
        Ok(())
    }

    fn set_active_window(&self, window: Option<Window>) -> WmResult<()> {
        match window {
            Some(window) => {
                self.connection.change_property32(
                    PropMode::REPLACE,
                    self.root,
                    self.atoms._NET_ACTIVE_WINDOW,
                    AtomEnum::WINDOW,
                    &[window],
                )?;
            }
            None => {
                self.connection
                    .delete_property(self.root, self.atoms._NET_ACTIVE_WINDOW)?;
            }
        }
        Ok(())
    }

    fn update_client_list(&self, windows: &[Window]) -> WmResult<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.atoms._NET_CLIENT_LIST,
            AtomEnum::WINDOW,
            windows,
        )?;
        Ok(())
    }

    fn query_pointer(&self) -> Option<(i32, i32)> {
        let reply = self.connection.query_pointer(self.root).ok()?.reply().ok()?;
        Some((reply.root_x.into(), reply.root_y.into()))
    }

    fn warp_pointer(&self, window: Window, x: i32, y: i32) -> WmResult<()> {
        self.connection
            .warp_pointer(x11rb::NONE, window, 0, 0, 0, 0, x as i16, y as i16)?;
        Ok(())
    }

    fn grab_pointer(&self, cursor: CursorKind) -> WmResult<bool> {
        let reply = self
            .connection
            .grab_pointer(
                false,
                self.root,
                pointer_mask(),
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                self.cursors.get(cursor),
                x11rb::CURRENT_TIME,
            )?
            .reply()?;
        if reply.status != GrabStatus::SUCCESS {
            debug!("pointer grab refused: {:?}", reply.status);
        }
        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn ungrab_pointer(&self) -> WmResult<()> {
        self.connection.ungrab_pointer(x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn allow_events_replay(&self) -> WmResult<()> {
        self.connection
            .allow_events(Allow::REPLAY_POINTER, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn status_text(&self) -> Option<String> {
        self.text_property(self.root, AtomEnum::WM_NAME, AtomEnum::ANY)
    }

    fn mute_structure_events(&self, window: Window) -> WmResult<()> {
        // Held until restore so nothing else changes while the masks are off.
        self.connection.grab_server()?;
        let muted = self
            .connection
            .change_window_attributes(self.root, &ChangeWindowAttributesAux::new().event_mask(root_mask(false)))
            .and_then(|_| {
                self.connection.change_window_attributes(
                    window,
                    &ChangeWindowAttributesAux::new().event_mask(client_mask(false)),
                )
            });
        if let Err(e) = muted {
            self.connection.ungrab_server()?;
            return Err(e.into());
        }
        Ok(())
    }

    fn restore_structure_events(&self, window: Window) -> WmResult<()> {
        let restored = self
            .connection
            .change_window_attributes(window, &ChangeWindowAttributesAux::new().event_mask(client_mask(true)))
            .and_then(|_| {
                self.connection.change_window_attributes(
                    self.root,
                    &ChangeWindowAttributesAux::new().event_mask(root_mask(true)),
                )
            });
        self.connection.ungrab_server()?;
        restored?;
        Ok(())
    }

    fn flush(&self) -> WmResult<()> {
        self.connection.flush()?;
        Ok(())
    }

    fn refresh_keyboard_mapping(&mut self) -> WmResult<()> {
        self.keymap = Keymap::load(&self.connection)?;
        self.numlock_mask = keymap::numlock_mask(&self.connection, &self.keymap)?;
        debug!("keyboard mapping reloaded, numlock mask {:#x}", self.numlock_mask);
        Ok(())
    }

    fn discard_enter_events(&mut self) -> WmResult<()> {
        // A round trip makes every event caused so far readable.
        self.connection.get_input_focus()?.reply()?;
        self.pending
            .retain(|event| !matches!(event, Event::EnterNotify(_)));
        while let Some(event) = self.connection.poll_for_event()? {
            if !matches!(event, Event::EnterNotify(_)) {
                self.pending.push_back(event);
            }
        }
        Ok(())
    }
}
