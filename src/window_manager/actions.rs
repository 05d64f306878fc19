use super::WindowManager;
use crate::bar::hit_test;
use crate::client::TagMask;
use crate::errors::WmResult;
use crate::keyboard::{Arg, KeyAction};
use crate::layout::{GapConfig, LayoutType, Rect};
use crate::spawn::{Spawner, shell_command};
use crate::window_system::WindowSystem;
use log::{debug, info};
use std::time::{Duration, Instant};
use x11rb::protocol::xproto::Window;

/// Status clicks closer together than this are dropped.
const STATUS_CLICK_DEBOUNCE: Duration = Duration::from_millis(100);

/// Keyboard move codes carried in `Arg::Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Up),
            1 => Some(Self::Down),
            2 => Some(Self::Left),
            3 => Some(Self::Right),
            _ => None,
        }
    }
}

/// Keyboard resize codes carried in `Arg::Int`. Expanding grows the bottom
/// or right edge, reducing pulls it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    VerticalExpand,
    VerticalReduce,
    HorizontalExpand,
    HorizontalReduce,
}

impl ResizeDirection {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::VerticalExpand),
            1 => Some(Self::VerticalReduce),
            2 => Some(Self::HorizontalExpand),
            3 => Some(Self::HorizontalReduce),
            _ => None,
        }
    }
}

fn int_arg(arg: &Arg, default: i32) -> i32 {
    match arg {
        Arg::Int(value) => *value,
        _ => default,
    }
}

impl<W: WindowSystem, S: Spawner> WindowManager<W, S> {
    /// Mask for a tag index, every tag for a negative index and no tag for
    /// an index past the last tag.
    fn tag_mask(&self, index: i32) -> TagMask {
        match usize::try_from(index) {
            Err(_) => self.all_tags,
            Ok(index) if index < self.config.tags.len() && index < 32 => 1 << index,
            Ok(_) => 0,
        }
    }

    fn window_arg(&self, arg: &Arg) -> Option<Window> {
        match arg {
            Arg::Window(window) => Some(*window),
            _ => self.selected_client(),
        }
    }

    pub(crate) fn dispatch(&mut self, action: KeyAction, arg: &Arg) -> WmResult<()> {
        debug!("dispatch {:?} {:?}", action, arg);

        match action {
            KeyAction::Spawn => {
                match arg {
                    Arg::Array(command) => self.spawner.spawn(command),
                    Arg::Str(command) => self.spawner.spawn(&shell_command(command)),
                    _ => {}
                }
                Ok(())
            }
            KeyAction::KillClient => self.kill_client(),
            KeyAction::ForceKillClient => self.force_kill_client(),
            KeyAction::FocusStack => self.focus_stack(int_arg(arg, 1)),
            KeyAction::FocusMonitor => self.focus_monitor(int_arg(arg, 1)),
            KeyAction::TagMonitor => self.tag_monitor(int_arg(arg, 1)),
            KeyAction::ViewTag => match arg {
                Arg::TagCommand(index, command) => self.view(self.tag_mask(*index), Some(command.as_str())),
                Arg::Int(index) => self.view(self.tag_mask(*index), None),
                _ => self.view(0, None),
            },
            KeyAction::ToggleView => self.toggle_view(self.tag_mask(int_arg(arg, 0))),
            KeyAction::MoveToTag => self.tag(self.tag_mask(int_arg(arg, 0))),
            KeyAction::ToggleTag => self.toggle_tag(self.tag_mask(int_arg(arg, 0))),
            KeyAction::ViewLeft => self.view_left(),
            KeyAction::ViewRight => self.view_right(),
            KeyAction::TagLeft => self.tag_left(),
            KeyAction::TagRight => self.tag_right(),
            KeyAction::IncNumMaster => self.inc_num_master(int_arg(arg, 1)),
            KeyAction::SetMasterFactor => match arg {
                Arg::Float(factor) => self.set_master_factor(*factor),
                _ => Ok(()),
            },
            KeyAction::SetLayout => {
                let layout = self.layout_arg(arg);
                self.set_layout(layout)
            }
            KeyAction::SelectLayout => match self.layout_arg(arg) {
                Some(layout) => self.select_layout(layout),
                None => Ok(()),
            },
            KeyAction::CycleLayout => self.cycle_layout(),
            KeyAction::ToggleFloating => self.toggle_floating(),
            KeyAction::ToggleAllFloating => self.toggle_all_floating(),
            KeyAction::ToggleFullScreen => self.fullscreen(),
            KeyAction::ToggleBar => self.toggle_bar(),
            KeyAction::ToggleGlobal => self.toggle_global(),
            KeyAction::ToggleScratchpad => {
                let command = match arg {
                    Arg::Array(command) => command.clone(),
                    _ => self.config.scratchpad_command.clone(),
                };
                self.toggle_scratchpad(&command)
            }
            KeyAction::ToggleOverview => self.toggle_overview(),
            KeyAction::SetGap => self.set_gap(int_arg(arg, 0)),
            KeyAction::Zoom => self.zoom(),
            KeyAction::HideWindow => match self.selected_client() {
                Some(window) => self.hide(window),
                None => Ok(()),
            },
            KeyAction::RestoreWindow => self.restore_window(),
            KeyAction::HideOtherWindows => match self.window_arg(arg) {
                Some(window) => self.hide_other_windows(window),
                None => Ok(()),
            },
            KeyAction::ShowOnlyOrAll => self.show_only_or_all(),
            KeyAction::ToggleWindow => match self.window_arg(arg) {
                Some(window) => self.toggle_window(window),
                None => Ok(()),
            },
            KeyAction::MoveWindow => match Direction::from_code(int_arg(arg, -1)) {
                Some(direction) => self.move_window(direction),
                None => Ok(()),
            },
            KeyAction::ResizeWindow => match ResizeDirection::from_code(int_arg(arg, -1)) {
                Some(direction) => self.resize_window(direction),
                None => Ok(()),
            },
            KeyAction::MoveMouse => self.move_mouse(),
            KeyAction::ResizeMouse => self.resize_mouse(),
            KeyAction::ClickStatusBar => match arg {
                Arg::StatusClick { offset, button } => self.click_status_bar(*offset, *button),
                _ => Ok(()),
            },
            KeyAction::Quit => {
                info!("quit requested");
                self.running = false;
                Ok(())
            }
            KeyAction::Restart => {
                info!("restart requested");
                self.restart = true;
                self.running = false;
                Ok(())
            }
            KeyAction::None => Ok(()),
        }
    }

    fn layout_arg(&self, arg: &Arg) -> Option<LayoutType> {
        match arg {
            Arg::Str(name) => LayoutType::from_str(name).ok(),
            Arg::Int(index) => usize::try_from(*index)
                .ok()
                .and_then(|index| self.config.layouts.get(index).copied()),
            _ => None,
        }
    }

    /// Asks the selection to close, killing it when it does not speak
    /// `WM_DELETE_WINDOW`.
    fn kill_client(&mut self) -> WmResult<()> {
        let Some(window) = self.selected_client() else {
            return Ok(());
        };
        if !self.ws.send_delete(window)? {
            self.ws.kill_client(window)?;
        }
        if self.shown_clients(self.selected_monitor).len() <= 1 {
            self.focus_stack(1)?;
        }
        Ok(())
    }

    fn force_kill_client(&mut self) -> WmResult<()> {
        let Some(window) = self.selected_client() else {
            return Ok(());
        };
        self.ws.kill_client(window)?;
        self.unmanage(window, true)
    }

    fn tag_monitor(&mut self, direction: i32) -> WmResult<()> {
        let Some(window) = self.selected_client() else {
            return Ok(());
        };
        if self.monitors.len() <= 1 {
            return Ok(());
        }

        let target = self.dir_to_monitor(direction);
        self.send_to_monitor(window, target)?;
        self.selected_monitor = target;
        self.focus(Some(window))?;

        let screen = self.monitors[target].screen;
        if let Some(client) = self.clients.get(&window).filter(|client| client.is_floating) {
            let mut geometry = client.geometry();
            geometry.x = screen.x + (screen.width - client.width) / 2;
            geometry.y = screen.y + (screen.height - client.height) / 2;
            self.resize(window, geometry, false)?;
        }
        self.pointer_focus_window(Some(window))
    }

    /// Grows the master area by `delta`, wrapping back to one once it
    /// reaches three or there is nothing to share it with.
    fn inc_num_master(&mut self, delta: i32) -> WmResult<()> {
        let monitor_index = self.selected_monitor;
        let visible = self.monitors[monitor_index]
            .clients
            .iter()
            .filter(|&&window| self.is_visible(window))
            .count();

        let monitor = &mut self.monitors[monitor_index];
        let mut num_master = monitor.num_master + delta;
        if visible <= 1 || num_master >= 3 {
            num_master = 1;
        }
        monitor.num_master = num_master.max(1);
        monitor.pertag.current_mut().num_master = monitor.num_master;
        self.arrange(Some(monitor_index))
    }

    /// Values below 1.0 adjust the factor, values from 1.0 up set it to
    /// `factor - 1.0`.
    fn set_master_factor(&mut self, factor: f32) -> WmResult<()> {
        let monitor_index = self.selected_monitor;
        let monitor = &mut self.monitors[monitor_index];
        let factor = if factor < 1.0 {
            factor + monitor.master_factor
        } else {
            factor - 1.0
        };
        if !(0.05..=0.95).contains(&factor) {
            return Ok(());
        }
        monitor.master_factor = factor;
        monitor.pertag.current_mut().master_factor = factor;
        self.arrange(Some(monitor_index))
    }

    /// Flips to the other layout slot unless `layout` is already current,
    /// then stores `layout` in the active slot.
    fn set_layout(&mut self, layout: Option<LayoutType>) -> WmResult<()> {
        let monitor_index = self.selected_monitor;
        let monitor = &mut self.monitors[monitor_index];

        if layout != Some(monitor.current_layout()) {
            monitor.selected_layout ^= 1;
            monitor.pertag.current_mut().selected_layout = monitor.selected_layout;
        }
        if let Some(layout) = layout {
            let slot = monitor.selected_layout;
            monitor.layouts[slot] = layout;
            monitor.pertag.current_mut().layouts[slot] = layout;
        }
        self.arrange(Some(monitor_index))
    }

    /// Like [`Self::set_layout`], but choosing the current layout again
    /// returns to the first configured one.
    fn select_layout(&mut self, layout: LayoutType) -> WmResult<()> {
        let current = self.monitors[self.selected_monitor].current_layout();
        let target = if current == layout {
            self.config.layouts.first().copied().unwrap_or(LayoutType::Tiling)
        } else {
            layout
        };
        self.set_layout(Some(target))
    }

    fn cycle_layout(&mut self) -> WmResult<()> {
        let current = self.monitors[self.selected_monitor].current_layout();
        let layouts = &self.config.layouts;
        let next = match layouts.iter().position(|&layout| layout == current) {
            Some(position) => layouts[(position + 1) % layouts.len()],
            None => current.next(),
        };
        self.set_layout(Some(next))
    }

    fn toggle_floating(&mut self) -> WmResult<()> {
        let Some(window) = self.selected_client() else {
            return Ok(());
        };
        if self.clients.get(&window).is_some_and(|client| client.is_fullscreen) {
            self.fullscreen()?;
            if self.is_floating(window) {
                return Ok(());
            }
        }

        let area = self.monitors[self.selected_monitor].work_area;
        let Some(client) = self.clients.get_mut(&window) else {
            return Ok(());
        };
        client.is_floating = !client.is_floating || client.is_fixed;

        if client.is_floating {
            client.x_position = area.x + area.width / 6;
            client.y_position = area.y + area.height / 6;
            self.manage_floating(window);
            if let Some(client) = self.clients.get(&window) {
                let geometry = Rect::new(
                    client.x_position,
                    client.y_position,
                    area.width / 3 * 2,
                    area.height / 3 * 2,
                );
                self.resize(window, geometry, false)?;
            }
        }

        self.arrange(Some(self.selected_monitor))?;
        self.pointer_focus_window(Some(window))
    }

    /// Tiles every shown client when any of them floats, otherwise floats
    /// them all slightly inset.
    fn toggle_all_floating(&mut self) -> WmResult<()> {
        let Some(selected) = self.selected_client() else {
            return Ok(());
        };
        if self.clients.get(&selected).is_some_and(|client| client.is_fullscreen) {
            return Ok(());
        }

        let monitor_index = self.selected_monitor;
        let shown = self.shown_clients(monitor_index);
        let any_floating = shown.iter().any(|&window| self.is_floating(window));
        let snap = self.config.snap;

        if any_floating {
            for &window in &shown {
                if let Some(client) = self.clients.get_mut(&window) {
                    client.is_floating = false;
                }
            }
            self.arrange(Some(monitor_index))?;
        } else {
            for &window in &shown {
                let Some(client) = self.clients.get_mut(&window) else {
                    continue;
                };
                client.is_floating = true;
                let geometry = Rect::new(
                    client.x_position + 2 * snap,
                    client.y_position + 2 * snap,
                    (client.width - 4 * snap).max(snap),
                    (client.height - 4 * snap).max(snap),
                );
                self.resize(window, geometry, false)?;
            }
        }
        self.pointer_focus_window(Some(selected))
    }

    /// Fullscreens the selection together with hiding the bar, or undoes
    /// both.
    fn fullscreen(&mut self) -> WmResult<()> {
        if let Some(window) = self.selected_client() {
            let show_bar = self.monitors[self.selected_monitor].show_bar;
            self.set_fullscreen(window, show_bar)?;
        }
        self.toggle_bar()
    }

    pub(crate) fn set_fullscreen(&mut self, window: Window, fullscreen: bool) -> WmResult<()> {
        let Some(client) = self.clients.get_mut(&window) else {
            return Ok(());
        };

        if fullscreen && !client.is_fullscreen {
            client.is_fullscreen = true;
            client.old_state = client.is_floating;
            client.old_border_width = client.border_width;
            client.border_width = 0;
            client.is_floating = true;
            let screen = self.monitors[client.monitor_index].screen;

            self.ws.set_fullscreen_state(window, true)?;
            self.resize_client(window, screen)?;
            self.ws.raise_window(window)?;
        } else if !fullscreen && client.is_fullscreen {
            client.is_fullscreen = false;
            client.is_floating = client.old_state;
            client.border_width = client.old_border_width;
            let previous = Rect::new(
                client.old_x_position,
                client.old_y_position,
                client.old_width,
                client.old_height,
            );
            let monitor_index = client.monitor_index;

            self.ws.set_fullscreen_state(window, false)?;
            self.resize_client(window, previous)?;
            self.arrange(Some(monitor_index))?;
        }
        Ok(())
    }

    pub(crate) fn toggle_bar(&mut self) -> WmResult<()> {
        let monitor_index = self.selected_monitor;
        let monitor = &mut self.monitors[monitor_index];
        monitor.show_bar = !monitor.show_bar;
        monitor.pertag.current_mut().show_bar = monitor.show_bar;
        monitor.update_bar_position(self.bar_height);

        if let Some(bar) = monitor.bar_window {
            let geometry = monitor.bar_geometry(self.bar_height);
            self.ws.move_resize_window(bar, geometry, 0)?;
        }
        self.arrange(Some(monitor_index))
    }

    /// Grows or shrinks both gaps by `delta`; zero restores the configured
    /// gaps.
    fn set_gap(&mut self, delta: i32) -> WmResult<()> {
        self.gaps = if delta == 0 {
            self.config.gaps
        } else {
            GapConfig {
                inner: (self.gaps.inner + delta).max(0),
                outer: (self.gaps.outer + delta).max(0),
            }
        };
        self.arrange(Some(self.selected_monitor))
    }

    /// Swaps the selection into the master area, or the next tiled client
    /// when the selection already is the master.
    fn zoom(&mut self) -> WmResult<()> {
        let selected = self.selected_client();
        if selected
            .and_then(|window| self.clients.get(&window))
            .is_some_and(|client| client.is_floating || client.is_fullscreen)
        {
            return Ok(());
        }

        let tiled = self.tiled_clients(self.selected_monitor);
        let target = if selected == tiled.first().copied() {
            selected.and_then(|_| tiled.get(1).copied())
        } else {
            selected
        };
        let Some(target) = target else {
            return Ok(());
        };

        self.detach(target);
        let Some(monitor_index) = self.clients.get(&target).map(|client| client.monitor_index) else {
            return Ok(());
        };
        self.monitors[monitor_index].clients.insert(0, target);
        self.focus(Some(target))?;
        self.arrange(Some(monitor_index))?;
        self.pointer_focus_window(Some(target))
    }

    /// Outer rectangles of the other shown floating clients on the monitor.
    fn floating_obstacles(&self, window: Window, monitor_index: usize) -> Vec<Rect> {
        self.monitors[monitor_index]
            .clients
            .iter()
            .filter(|&&other| other != window && self.is_visible(other))
            .filter_map(|other| self.clients.get(other))
            .filter(|other| other.is_floating)
            .map(|other| {
                Rect::new(
                    other.x_position,
                    other.y_position,
                    other.width_with_border(),
                    other.height_with_border(),
                )
            })
            .collect()
    }

    /// Floats the selection if needed and returns its outer rectangle.
    fn prepare_keyboard_drag(&mut self) -> WmResult<Option<(Window, Rect)>> {
        let Some(window) = self.selected_client() else {
            return Ok(None);
        };
        let Some(client) = self.clients.get(&window) else {
            return Ok(None);
        };
        if client.is_fullscreen {
            return Ok(None);
        }
        if !client.is_floating {
            self.toggle_floating()?;
        }
        Ok(self.clients.get(&window).map(|client| {
            (
                window,
                Rect::new(
                    client.x_position,
                    client.y_position,
                    client.width_with_border(),
                    client.height_with_border(),
                ),
            )
        }))
    }

    /// Moves the selection a step, stopping short of other floating
    /// windows in the way and of the gapped work-area edge.
    fn move_window(&mut self, direction: Direction) -> WmResult<()> {
        let Some((window, outer)) = self.prepare_keyboard_drag()? else {
            return Ok(());
        };
        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        let (width, height) = (client.width, client.height);
        let monitor_index = client.monitor_index;
        let area = self.monitors[monitor_index].work_area;
        let obstacles = self.floating_obstacles(window, monitor_index);
        let (inner_gap, outer_gap) = (self.gaps.inner, self.gaps.outer);

        let overlaps_columns = |other: &Rect| !(outer.x + outer.width < other.x || outer.x > other.x + other.width);
        let overlaps_rows = |other: &Rect| !(outer.y + outer.height < other.y || outer.y > other.y + other.height);

        let (mut x, mut y) = (outer.x, outer.y);
        match direction {
            Direction::Up => {
                y -= area.height / 4;
                let stop = obstacles
                    .iter()
                    .filter(|other| overlaps_columns(other))
                    .map(|other| other.y + other.height + inner_gap)
                    .filter(|&bottom| outer.y > bottom && y < bottom)
                    .max();
                y = stop.unwrap_or(y).max(area.y + outer_gap);
            }
            Direction::Down => {
                y += area.height / 4;
                let stop = obstacles
                    .iter()
                    .filter(|other| overlaps_columns(other))
                    .map(|other| other.y - inner_gap)
                    .filter(|&top| outer.y + outer.height < top && y + outer.height > top)
                    .map(|top| top - outer.height)
                    .min();
                y = stop
                    .unwrap_or(y)
                    .min(area.y + area.height - outer_gap - outer.height);
            }
            Direction::Left => {
                x -= area.width / 6;
                let stop = obstacles
                    .iter()
                    .filter(|other| overlaps_rows(other))
                    .map(|other| other.x + other.width + inner_gap)
                    .filter(|&right| outer.x > right && x < right)
                    .max();
                x = stop.unwrap_or(x).max(area.x + outer_gap);
            }
            Direction::Right => {
                x += area.width / 6;
                let stop = obstacles
                    .iter()
                    .filter(|other| overlaps_rows(other))
                    .map(|other| other.x - inner_gap)
                    .filter(|&left| outer.x + outer.width < left && x + outer.width > left)
                    .map(|left| left - outer.width)
                    .min();
                x = stop
                    .unwrap_or(x)
                    .min(area.x + area.width - outer_gap - outer.width);
            }
        }

        self.resize(window, Rect::new(x, y, width, height), true)?;
        self.pointer_focus_window(Some(window))?;
        self.restack(self.selected_monitor)
    }

    /// Resizes the selection a step from its bottom or right edge, stopping
    /// at other floating windows and the gapped work-area edge.
    fn resize_window(&mut self, direction: ResizeDirection) -> WmResult<()> {
        let Some((window, outer)) = self.prepare_keyboard_drag()? else {
            return Ok(());
        };
        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        let (mut width, mut height) = (client.width, client.height);
        let (x, y, border) = (client.x_position, client.y_position, client.border_width);
        let monitor_index = client.monitor_index;
        let area = self.monitors[self.selected_monitor].work_area;
        let obstacles = self.floating_obstacles(window, monitor_index);
        let (inner_gap, outer_gap) = (self.gaps.inner, self.gaps.outer);

        match direction {
            ResizeDirection::HorizontalExpand => {
                width += area.width / 16;
                let right = outer.x + outer.width;
                let stop = obstacles
                    .iter()
                    .filter(|other| !(outer.y + outer.height < other.y || outer.y > other.y + other.height))
                    .map(|other| other.x - inner_gap)
                    .filter(|&left| right < left && x + width > left)
                    .map(|left| left - x - 2 * border)
                    .min();
                width = stop.unwrap_or(width);
                if x + width + outer_gap + 2 * border > area.x + area.width {
                    width = area.x + area.width - x - outer_gap - 2 * border;
                }
            }
            ResizeDirection::HorizontalReduce => {
                width = (width - area.width / 16).max(area.width / 10);
            }
            ResizeDirection::VerticalExpand => {
                height += area.height / 8;
                let bottom = outer.y + outer.height;
                let stop = obstacles
                    .iter()
                    .filter(|other| !(outer.x + outer.width < other.x || outer.x > other.x + other.width))
                    .map(|other| other.y - inner_gap)
                    .filter(|&top| bottom < top && y + height > top)
                    .map(|top| top - y - 2 * border)
                    .min();
                height = stop.unwrap_or(height);
                if y + height + outer_gap + 2 * border > area.y + area.height {
                    height = area.y + area.height - y - outer_gap - 2 * border;
                }
            }
            ResizeDirection::VerticalReduce => {
                height = (height - area.height / 8).max(area.height / 10);
            }
        }

        self.resize(window, Rect::new(x, y, width, height), true)?;
        if let Some(client) = self.clients.get(&window) {
            let corner_x = client.x_position + client.width - 2 * client.border_width;
            let corner_y = client.y_position + client.height - 2 * client.border_width;
            self.ws.warp_pointer(self.ws.root(), corner_x, corner_y)?;
        }
        self.restack(self.selected_monitor)
    }

    /// Runs the status command with the signal under the click and the
    /// button letter.
    fn click_status_bar(&mut self, offset: i32, button: u8) -> WmResult<()> {
        let Some(command) = self.config.status_command.as_deref() else {
            return Ok(());
        };
        if offset < 0 {
            return Ok(());
        }

        let now = Instant::now();
        if self
            .last_status_click
            .is_some_and(|last| now.duration_since(last) < STATUS_CLICK_DEBOUNCE)
        {
            return Ok(());
        }
        self.last_status_click = Some(now);

        let signal = hit_test(&self.status, offset, |text| self.ws.text_width(text))
            .and_then(|hit| hit.signal)
            .unwrap_or_default();
        let button = match button {
            2 => "M",
            3 => "R",
            4 => "U",
            5 => "D",
            _ => "L",
        };

        let line = format!("{} {} {}", command, signal, button);
        debug!("status click: {}", line);
        self.spawner.spawn(&shell_command(&line));
        Ok(())
    }
}
