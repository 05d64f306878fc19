//! Recording stand-ins for the display server and the process launcher.

use crate::bar::BarModel;
use crate::errors::WmResult;
use crate::keyboard::keysyms::Keysym;
use crate::layout::Rect;
use crate::size_hints::SizeHints;
use crate::spawn::Spawner;
use crate::window_system::{
    BorderScheme, ConfigureRequest, CursorKind, WindowAttributes, WindowState, WindowSystem, WindowType,
    WmEvent, WmHints,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use x11rb::protocol::xproto::Window;

pub const ROOT: Window = 1;
pub const BAR_HEIGHT: i32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    MoveResize(Window, Rect, i32),
    Move(Window, i32, i32),
    ConfigureNotify(Window, Rect),
    Map(Window),
    Unmap(Window),
    State(Window, WindowState),
    Focus(Option<Window>),
    Raise(Window),
    /// Windows chained below `sibling`, in order.
    Stack(Window, Vec<Window>),
    Border(Window, BorderScheme),
    Mute(Window),
    Restore(Window),
    Warp(Window, i32, i32),
    GrabPointer(CursorKind),
    UngrabPointer,
    DrawBar(Window),
    Delete(Window),
    Kill(Window),
}

/// Fake server: hands out queued events and logs every command.
pub struct MockWindowSystem {
    pub calls: RefCell<Vec<Call>>,
    pub events: VecDeque<WmEvent>,
    pub pointer: Cell<(i32, i32)>,
    pub screen: (i32, i32),
    pub screens: Vec<Rect>,
    pub geometries: HashMap<Window, Rect>,
    pub titles: HashMap<Window, String>,
    /// `(instance, class)` per window.
    pub classes: HashMap<Window, (String, String)>,
    pub transients: HashMap<Window, Window>,
    pub states: RefCell<HashMap<Window, WindowState>>,
    pub status: Option<String>,
    pub grab_succeeds: bool,
    pub unmap_fails: bool,
    /// Server grab depth taken by muting structure events.
    pub server_grabs: Cell<i32>,
    next_bar: Window,
}

impl MockWindowSystem {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            events: VecDeque::new(),
            pointer: Cell::new((0, 0)),
            screen: (width, height),
            screens: vec![Rect::new(0, 0, width, height)],
            geometries: HashMap::new(),
            titles: HashMap::new(),
            classes: HashMap::new(),
            transients: HashMap::new(),
            states: RefCell::new(HashMap::new()),
            status: None,
            grab_succeeds: true,
            unmap_fails: false,
            server_grabs: Cell::new(0),
            next_bar: 0x1000,
        }
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| matches(call)).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl WindowSystem for MockWindowSystem {
    /// A drained queue reads as the button being released.
    fn next_event(&mut self) -> WmResult<WmEvent> {
        Ok(self
            .events
            .pop_front()
            .unwrap_or(WmEvent::ButtonRelease { window: ROOT }))
    }

    fn root(&self) -> Window {
        ROOT
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screen
    }

    fn monitor_geometries(&self) -> Vec<Rect> {
        self.screens.clone()
    }

    fn numlock_mask(&self) -> u16 {
        0
    }

    fn bar_height(&self) -> i32 {
        BAR_HEIGHT
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * 10
    }

    fn create_bar(&mut self, _geometry: Rect) -> WmResult<Window> {
        self.next_bar += 1;
        Ok(self.next_bar)
    }

    fn destroy_bar(&mut self, _bar: Window) -> WmResult<()> {
        Ok(())
    }

    fn draw_bar(&mut self, bar: Window, _model: &BarModel) -> WmResult<()> {
        self.record(Call::DrawBar(bar));
        Ok(())
    }

    fn move_resize_window(&self, window: Window, geometry: Rect, border_width: i32) -> WmResult<()> {
        self.record(Call::MoveResize(window, geometry, border_width));
        Ok(())
    }

    fn move_window(&self, window: Window, x: i32, y: i32) -> WmResult<()> {
        self.record(Call::Move(window, x, y));
        Ok(())
    }

    fn send_configure_notify(&self, window: Window, geometry: Rect, _border_width: i32) -> WmResult<()> {
        self.record(Call::ConfigureNotify(window, geometry));
        Ok(())
    }

    fn configure_unmanaged(&self, _request: &ConfigureRequest) -> WmResult<()> {
        Ok(())
    }

    fn set_border_width(&self, _window: Window, _border_width: i32) -> WmResult<()> {
        Ok(())
    }

    fn set_border_color(&self, window: Window, scheme: BorderScheme) -> WmResult<()> {
        self.record(Call::Border(window, scheme));
        Ok(())
    }

    fn raise_window(&self, window: Window) -> WmResult<()> {
        self.record(Call::Raise(window));
        Ok(())
    }

    fn stack_windows(&self, sibling: Window, windows: &[Window]) -> WmResult<()> {
        self.record(Call::Stack(sibling, windows.to_vec()));
        Ok(())
    }

    fn map_window(&self, window: Window) -> WmResult<()> {
        self.record(Call::Map(window));
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> WmResult<()> {
        self.record(Call::Unmap(window));
        if self.unmap_fails {
            return Err(std::io::Error::other("unmap failed").into());
        }
        Ok(())
    }

    fn set_client_state(&self, window: Window, state: WindowState) -> WmResult<()> {
        self.states.borrow_mut().insert(window, state);
        self.record(Call::State(window, state));
        Ok(())
    }

    fn client_state(&self, window: Window) -> Option<WindowState> {
        self.states.borrow().get(&window).copied()
    }

    fn focus_window(&self, window: Option<Window>) -> WmResult<()> {
        self.record(Call::Focus(window));
        Ok(())
    }

    fn send_take_focus(&self, _window: Window) -> WmResult<bool> {
        Ok(false)
    }

    fn send_delete(&self, window: Window) -> WmResult<bool> {
        self.record(Call::Delete(window));
        Ok(true)
    }

    fn kill_client(&self, window: Window) -> WmResult<()> {
        self.record(Call::Kill(window));
        Ok(())
    }

    fn grab_buttons(&self, _window: Window, _focused: bool, _buttons: &[(u16, u8)]) -> WmResult<()> {
        Ok(())
    }

    fn ungrab_buttons(&self, _window: Window) -> WmResult<()> {
        Ok(())
    }

    fn grab_keys(&self, _keys: &[(u16, Keysym)]) -> WmResult<()> {
        Ok(())
    }

    fn watch_client(&self, _window: Window) -> WmResult<()> {
        Ok(())
    }

    fn window_attributes(&self, window: Window) -> Option<WindowAttributes> {
        Some(WindowAttributes {
            geometry: self
                .geometries
                .get(&window)
                .copied()
                .unwrap_or(Rect::new(10, 30, 300, 200)),
            border_width: 0,
            override_redirect: false,
            viewable: true,
        })
    }

    fn window_title(&self, window: Window) -> Option<String> {
        Some(
            self.titles
                .get(&window)
                .cloned()
                .unwrap_or_else(|| format!("window {}", window)),
        )
    }

    fn window_class(&self, window: Window) -> (String, String) {
        self.classes.get(&window).cloned().unwrap_or_default()
    }

    fn transient_for(&self, window: Window) -> Option<Window> {
        self.transients.get(&window).copied()
    }

    fn size_hints(&self, _window: Window) -> Option<SizeHints> {
        None
    }

    fn wm_hints(&self, _window: Window) -> WmHints {
        WmHints::default()
    }

    fn set_urgency(&self, _window: Window, _urgent: bool) -> WmResult<()> {
        Ok(())
    }

    fn window_type(&self, _window: Window) -> WindowType {
        WindowType::default()
    }

    fn query_tree(&self) -> Vec<Window> {
        Vec::new()
    }

    fn set_fullscreen_state(&self, _window: Window, _fullscreen: bool) -> WmResult<()> {
        Ok(())
    }

    fn set_active_window(&self, _window: Option<Window>) -> WmResult<()> {
        Ok(())
    }

    fn update_client_list(&self, _windows: &[Window]) -> WmResult<()> {
        Ok(())
    }

    fn query_pointer(&self) -> Option<(i32, i32)> {
        Some(self.pointer.get())
    }

    fn warp_pointer(&self, window: Window, x: i32, y: i32) -> WmResult<()> {
        if window == ROOT {
            self.pointer.set((x, y));
        }
        self.record(Call::Warp(window, x, y));
        Ok(())
    }

    fn grab_pointer(&self, cursor: CursorKind) -> WmResult<bool> {
        self.record(Call::GrabPointer(cursor));
        Ok(self.grab_succeeds)
    }

    fn ungrab_pointer(&self) -> WmResult<()> {
        self.record(Call::UngrabPointer);
        Ok(())
    }

    fn allow_events_replay(&self) -> WmResult<()> {
        Ok(())
    }

    fn status_text(&self) -> Option<String> {
        self.status.clone()
    }

    fn mute_structure_events(&self, window: Window) -> WmResult<()> {
        self.server_grabs.set(self.server_grabs.get() + 1);
        self.record(Call::Mute(window));
        Ok(())
    }

    fn restore_structure_events(&self, window: Window) -> WmResult<()> {
        self.record(Call::Restore(window));
        self.server_grabs.set(self.server_grabs.get() - 1);
        Ok(())
    }

    fn flush(&self) -> WmResult<()> {
        Ok(())
    }

    fn refresh_keyboard_mapping(&mut self) -> WmResult<()> {
        Ok(())
    }

    fn discard_enter_events(&mut self) -> WmResult<()> {
        self.events.retain(|event| !matches!(event, WmEvent::EnterNotify { .. }));
        Ok(())
    }
}

/// Remembers every command instead of running it.
#[derive(Debug, Default)]
pub struct RecordingSpawner {
    pub commands: RefCell<Vec<Vec<String>>>,
}

impl Spawner for RecordingSpawner {
    fn spawn(&self, command: &[String]) {
        self.commands.borrow_mut().push(command.to_vec());
    }
}
