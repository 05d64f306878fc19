//! The window manager engine.
//!
//! All state lives in [`WindowManager`]: clients are kept in a map keyed by
//! their window, monitors own the tiling and focus orders as window lists.
//! The engine is generic over the display backend and the process
//! launcher so it can run against the X server or a recording fake.

mod actions;
mod bar;
mod drag;
mod events;
mod focus;
mod hide;
mod registry;
mod tags;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

use crate::Config;
use crate::bar::StatusRun;
use crate::client::{Bounds, Client, TagMask};
use crate::errors::WmResult;
use crate::layout::overview::OverviewLayout;
use crate::layout::{GapConfig, LayoutBox, LayoutParams, Rect};
use crate::monitor::{Monitor, unique_geometries};
use crate::spawn::{Spawner, shell_command};
use crate::window_system::{WindowSystem, WmEvent};
use log::{debug, info};
use std::collections::{HashMap, VecDeque};
use std::time::Instant;
use x11rb::protocol::xproto::Window;

/// Capacity of the hidden-window history; the oldest entry is dropped
/// when it overflows.
pub const HIDDEN_STACK_CAPACITY: usize = 100;

pub struct WindowManager<W: WindowSystem, S: Spawner> {
    ws: W,
    spawner: S,
    config: Config,
    clients: HashMap<Window, Client>,
    /// Managed windows in the order they were adopted.
    client_list: Vec<Window>,
    monitors: Vec<Monitor>,
    selected_monitor: usize,
    /// Monitor the pointer was last seen on by root motion events.
    motion_monitor: Option<usize>,
    gaps: GapConfig,
    /// Windows in the order they were hidden, most recent last.
    hidden_stack: Vec<Window>,
    status: Vec<StatusRun>,
    last_status_click: Option<Instant>,
    /// Events set aside by a drag loop, replayed before reading new ones.
    deferred: VecDeque<WmEvent>,
    all_tags: TagMask,
    screen_width: i32,
    screen_height: i32,
    bar_height: i32,
    numlock_mask: u16,
    running: bool,
    restart: bool,
}

impl<W: WindowSystem, S: Spawner> WindowManager<W, S> {
    pub fn new(ws: W, spawner: S, config: Config) -> WmResult<Self> {
        let (screen_width, screen_height) = ws.screen_size();
        let bar_height = ws.bar_height();
        let numlock_mask = ws.numlock_mask();
        let all_tags = config.all_tags();
        let gaps = config.gaps;

        let mut window_manager = Self {
            ws,
            spawner,
            config,
            clients: HashMap::new(),
            client_list: Vec::new(),
            monitors: Vec::new(),
            selected_monitor: 0,
            motion_monitor: None,
            gaps,
            hidden_stack: Vec::new(),
            status: Vec::new(),
            last_status_click: None,
            deferred: VecDeque::new(),
            all_tags,
            screen_width,
            screen_height,
            bar_height,
            numlock_mask,
            running: true,
            restart: false,
        };

        window_manager.update_geometry()?;
        window_manager.update_bars()?;
        window_manager.update_status();
        window_manager.ws.update_client_list(&[])?;
        window_manager.grab_keys()?;
        window_manager.focus(None)?;

        info!(
            "window manager ready: {}x{} with {} monitor(s)",
            screen_width,
            screen_height,
            window_manager.monitors.len()
        );

        Ok(window_manager)
    }

    /// Adopts existing windows, runs autostart commands, then dispatches
    /// events until quit. Returns `true` when a restart was requested.
    pub fn run(&mut self) -> WmResult<bool> {
        self.scan()?;
        self.autostart();
        self.ws.flush()?;

        while self.running {
            let event = self.next_event()?;
            self.handle_event(event)?;
            self.ws.flush()?;
        }

        self.cleanup()?;
        Ok(self.restart)
    }

    fn next_event(&mut self) -> WmResult<WmEvent> {
        match self.deferred.pop_front() {
            Some(event) => Ok(event),
            None => self.ws.next_event(),
        }
    }

    fn autostart(&self) {
        for command in &self.config.autostart {
            debug!("autostart: {}", command);
            self.spawner.spawn(&shell_command(command));
        }
    }

    /// Hands every client back to the server in a state a successor manager
    /// can adopt.
    fn cleanup(&mut self) -> WmResult<()> {
        info!("shutting down, restart={}", self.restart);

        let windows: Vec<Window> = self.client_list.clone();
        for window in windows {
            self.unmanage(window, false)?;
        }

        for monitor_index in 0..self.monitors.len() {
            if let Some(bar) = self.monitors[monitor_index].bar_window.take() {
                self.ws.destroy_bar(bar)?;
            }
        }

        self.ws.focus_window(None)?;
        self.ws.set_active_window(None)?;
        self.ws.flush()
    }

    fn grab_keys(&self) -> WmResult<()> {
        let keys: Vec<_> = self
            .config
            .keybindings
            .iter()
            .map(|binding| (binding.mask(), binding.keysym))
            .collect();
        self.ws.grab_keys(&keys)
    }

    pub(crate) fn selected_client(&self) -> Option<Window> {
        self.monitors[self.selected_monitor].selected_client
    }

    /// Visible on its monitor's current view, hidden or not.
    pub(crate) fn is_visible(&self, window: Window) -> bool {
        self.clients.get(&window).is_some_and(|client| {
            self.monitors
                .get(client.monitor_index)
                .is_some_and(|monitor| monitor.is_visible(client))
        })
    }

    pub(crate) fn is_hidden(&self, window: Window) -> bool {
        self.clients.get(&window).is_some_and(|client| client.is_hidden)
    }

    /// Visible and not hidden.
    pub(crate) fn is_shown(&self, window: Window) -> bool {
        self.is_visible(window) && !self.is_hidden(window)
    }

    pub(crate) fn is_floating(&self, window: Window) -> bool {
        self.clients.get(&window).is_some_and(|client| client.is_floating)
    }

    /// Shown, tiled clients of a monitor in tiling order.
    pub(crate) fn tiled_clients(&self, monitor_index: usize) -> Vec<Window> {
        self.monitors[monitor_index]
            .clients
            .iter()
            .copied()
            .filter(|&window| self.is_shown(window) && !self.is_floating(window))
            .collect()
    }

    /// Clients shown on a monitor, in tiling order.
    pub(crate) fn shown_clients(&self, monitor_index: usize) -> Vec<Window> {
        self.monitors[monitor_index]
            .clients
            .iter()
            .copied()
            .filter(|&window| self.is_shown(window))
            .collect()
    }

    fn bounds_for(&self, client: &Client) -> Bounds {
        let work_area = self
            .monitors
            .get(client.monitor_index)
            .map_or(Rect::new(0, 0, self.screen_width, self.screen_height), |monitor| {
                monitor.work_area
            });
        Bounds {
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            work_area,
            min_size: self.bar_height,
        }
    }

    /// Lays out one monitor, or every monitor when `monitor_index` is `None`.
    /// Only a single-monitor arrange restacks.
    pub(crate) fn arrange(&mut self, monitor_index: Option<usize>) -> WmResult<()> {
        match monitor_index {
            Some(index) => {
                self.show_hide(index)?;
                self.arrange_monitor(index)?;
                self.restack(index)?;
            }
            None => {
                for index in 0..self.monitors.len() {
                    self.show_hide(index)?;
                }
                for index in 0..self.monitors.len() {
                    self.arrange_monitor(index)?;
                }
            }
        }
        Ok(())
    }

    /// Moves visible clients onto the monitor and parks the rest beyond
    /// its nearest horizontal edge.
    fn show_hide(&mut self, monitor_index: usize) -> WmResult<()> {
        let stack = self.monitors[monitor_index].stack.clone();
        let screen = self.monitors[monitor_index].screen;

        for &window in &stack {
            let Some(client) = self.clients.get(&window) else {
                continue;
            };
            if !self.is_visible(window) {
                continue;
            }
            let geometry = client.geometry();
            let needs_resize = client.is_floating && !client.is_fullscreen;
            self.ws.move_window(window, geometry.x, geometry.y)?;
            if needs_resize {
                self.resize(window, geometry, false)?;
            }
        }

        for &window in stack.iter().rev() {
            let Some(client) = self.clients.get(&window) else {
                continue;
            };
            if self.is_visible(window) {
                continue;
            }
            let offset = client.width_with_border() * 3 / 2;
            let x = if screen.x == 0 {
                -offset
            } else {
                screen.x + screen.width + offset
            };
            self.ws.move_window(window, x, client.y_position)?;
        }

        Ok(())
    }

    fn current_layout(&self, monitor_index: usize) -> LayoutBox {
        let monitor = &self.monitors[monitor_index];
        if monitor.is_overview {
            Box::new(OverviewLayout {
                gaps: self.config.overview_gaps,
            })
        } else {
            monitor.current_layout().new()
        }
    }

    fn arrange_monitor(&mut self, monitor_index: usize) -> WmResult<()> {
        let layout = self.current_layout(monitor_index);
        self.monitors[monitor_index].layout_symbol = layout.symbol().to_string();

        let tiled = self.tiled_clients(monitor_index);
        let monitor = &self.monitors[monitor_index];
        let params = LayoutParams {
            screen: monitor.screen,
            work_area: monitor.work_area,
            num_master: monitor.num_master,
            master_factor: monitor.master_factor,
            gaps: self.gaps,
        };

        let geometries = layout.arrange(tiled.len(), &params);
        for (window, geometry) in tiled.into_iter().zip(geometries) {
            let border = self.clients.get(&window).map_or(0, |client| client.border_width);
            let inner = Rect::new(
                geometry.x,
                geometry.y,
                geometry.width - 2 * border,
                geometry.height - 2 * border,
            );
            self.resize(window, inner, false)?;
        }
        Ok(())
    }

    /// Applies size constraints and commits the geometry if it changed.
    pub(crate) fn resize(&mut self, window: Window, requested: Rect, interact: bool) -> WmResult<()> {
        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        let geometry = client.constrain(requested, interact, &self.bounds_for(client));
        if geometry != client.geometry() {
            self.resize_client(window, geometry)?;
        }
        Ok(())
    }

    /// Commits a geometry without constraints. A lone tiled client on its
    /// monitor is drawn over its border.
    pub(crate) fn resize_client(&mut self, window: Window, geometry: Rect) -> WmResult<()> {
        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        let borderless = !client.is_floating
            && !client.is_fullscreen
            && self.tiled_clients(client.monitor_index) == [window];

        let Some(client) = self.clients.get_mut(&window) else {
            return Ok(());
        };
        client.set_geometry(geometry);

        let mut committed = geometry;
        let mut border = client.border_width;
        if borderless {
            committed.width += 2 * border;
            committed.height += 2 * border;
            border = 0;
        }

        self.ws.move_resize_window(window, committed, border)?;
        self.ws.send_configure_notify(window, committed, border)
    }

    /// Rebuilds the monitor list from the backend's screens. Clients of
    /// monitors that disappeared move to the first monitor.
    pub(crate) fn update_geometry(&mut self) -> WmResult<bool> {
        let mut screens = unique_geometries(self.ws.monitor_geometries());
        if screens.is_empty() {
            screens.push(Rect::new(0, 0, self.screen_width, self.screen_height));
        }

        let mut dirty = false;

        for (index, screen) in screens.iter().enumerate() {
            match self.monitors.get_mut(index) {
                Some(monitor) if monitor.screen == *screen => {}
                Some(monitor) => {
                    dirty = true;
                    monitor.screen = *screen;
                    monitor.update_bar_position(self.bar_height);
                }
                None => {
                    dirty = true;
                    let mut monitor = Monitor::new(&self.config, index, *screen);
                    monitor.update_bar_position(self.bar_height);
                    self.monitors.push(monitor);
                }
            }
        }

        while self.monitors.len() > screens.len() {
            dirty = true;
            let Some(removed) = self.monitors.pop() else {
                break;
            };
            info!("monitor {} removed, moving {} client(s)", removed.num, removed.clients.len());

            let tags = self.monitors[0].active_tags();
            for window in removed.clients {
                if let Some(client) = self.clients.get_mut(&window) {
                    client.monitor_index = 0;
                    if !client.is_global {
                        client.tags = tags;
                    }
                }
                self.attach(window);
                self.attach_stack(window);
            }
            if let Some(bar) = removed.bar_window {
                self.ws.destroy_bar(bar)?;
            }
        }

        if dirty {
            if self.selected_monitor >= self.monitors.len() {
                self.selected_monitor = 0;
            }
            self.selected_monitor = self.pointer_monitor();
            debug!("monitor layout changed, selected monitor {}", self.selected_monitor);
        }

        Ok(dirty)
    }

    /// Creates missing bar windows and moves existing ones into place.
    pub(crate) fn update_bars(&mut self) -> WmResult<()> {
        for index in 0..self.monitors.len() {
            let geometry = self.monitors[index].bar_geometry(self.bar_height);
            match self.monitors[index].bar_window {
                Some(bar) => self.ws.move_resize_window(bar, geometry, 0)?,
                None => {
                    let bar = self.ws.create_bar(geometry)?;
                    self.monitors[index].bar_window = Some(bar);
                }
            }
        }
        Ok(())
    }

    /// The monitor whose work area overlaps `rect` most, the selected
    /// monitor when none does.
    pub(crate) fn rect_to_monitor(&self, rect: Rect) -> usize {
        let mut best = self.selected_monitor;
        let mut best_area = 0;
        for (index, monitor) in self.monitors.iter().enumerate() {
            let area = monitor.overlap(&rect);
            if area > best_area {
                best_area = area;
                best = index;
            }
        }
        best
    }

    pub(crate) fn dir_to_monitor(&self, direction: i32) -> usize {
        let count = self.monitors.len();
        if direction > 0 {
            (self.selected_monitor + 1) % count
        } else {
            (self.selected_monitor + count - 1) % count
        }
    }

    fn pointer_monitor(&self) -> usize {
        match self.ws.query_pointer() {
            Some((x, y)) => self.rect_to_monitor(Rect::new(x, y, 1, 1)),
            None => self.selected_monitor,
        }
    }

    pub(crate) fn window_to_monitor(&self, window: Window) -> usize {
        if window == self.ws.root() {
            return self.pointer_monitor();
        }
        if let Some(index) = self
            .monitors
            .iter()
            .position(|monitor| monitor.bar_window == Some(window))
        {
            return index;
        }
        self.clients
            .get(&window)
            .map_or(self.selected_monitor, |client| client.monitor_index)
    }
}
