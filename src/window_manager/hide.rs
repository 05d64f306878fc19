use super::{HIDDEN_STACK_CAPACITY, WindowManager};
use crate::errors::WmResult;
use crate::spawn::Spawner;
use crate::window_system::{WindowState, WindowSystem};
use log::debug;
use x11rb::protocol::xproto::Window;

impl<W: WindowSystem, S: Spawner> WindowManager<W, S> {
    pub(crate) fn push_hidden(&mut self, window: Window) {
        if self.hidden_stack.len() >= HIDDEN_STACK_CAPACITY {
            self.hidden_stack.remove(0);
        }
        self.hidden_stack.push(window);
    }

    /// Iconifies a client without the manager seeing its own unmap, then
    /// focuses what follows it in the focus order.
    pub(crate) fn hide(&mut self, window: Window) -> WmResult<()> {
        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        if client.is_hidden {
            return Ok(());
        }
        let monitor_index = client.monitor_index;

        self.ws.mute_structure_events(window)?;
        let hidden = self
            .ws
            .unmap_window(window)
            .and_then(|()| self.ws.set_client_state(window, WindowState::Iconic));
        let restored = self.ws.restore_structure_events(window);
        hidden?;
        restored?;

        if let Some(client) = self.clients.get_mut(&window) {
            client.is_hidden = true;
        }
        self.push_hidden(window);
        debug!("hid {:#x}", window);

        let stack = &self.monitors[monitor_index].stack;
        let next = stack
            .iter()
            .position(|&w| w == window)
            .and_then(|position| stack.get(position + 1))
            .copied();
        self.focus(next)?;
        self.arrange(Some(monitor_index))
    }

    pub(crate) fn show(&mut self, window: Window) -> WmResult<()> {
        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        if !client.is_hidden {
            return Ok(());
        }
        let monitor_index = client.monitor_index;

        self.ws.map_window(window)?;
        self.ws.set_client_state(window, WindowState::Normal)?;
        if let Some(client) = self.clients.get_mut(&window) {
            client.is_hidden = false;
        }
        if let Some(position) = self.hidden_stack.iter().rposition(|&w| w == window) {
            self.hidden_stack.remove(position);
        }
        debug!("showed {:#x}", window);
        self.arrange(Some(monitor_index))
    }

    /// Brings back the most recently hidden client that is on the current
    /// view.
    pub(crate) fn restore_window(&mut self) -> WmResult<()> {
        let Some(window) = self
            .hidden_stack
            .iter()
            .rev()
            .copied()
            .find(|&window| self.is_hidden(window) && self.is_visible(window))
        else {
            return Ok(());
        };

        self.show(window)?;
        self.focus(Some(window))?;
        self.restack(self.selected_monitor)
    }

    /// Leaves `keep` as the only shown client on the selected monitor.
    pub(crate) fn hide_other_windows(&mut self, keep: Window) -> WmResult<()> {
        let others: Vec<Window> = self.monitors[self.selected_monitor]
            .clients
            .iter()
            .copied()
            .filter(|&window| window != keep && self.is_visible(window))
            .collect();
        for window in others {
            self.hide(window)?;
        }
        self.show(keep)?;
        self.focus(Some(keep))
    }

    pub(crate) fn show_only_or_all(&mut self) -> WmResult<()> {
        match self.selected_client() {
            Some(selected) if !self.is_single_window() => self.hide_other_windows(selected),
            _ => {
                let visible: Vec<Window> = self.monitors[self.selected_monitor]
                    .clients
                    .iter()
                    .copied()
                    .filter(|&window| self.is_visible(window))
                    .collect();
                for window in visible {
                    self.show(window)?;
                }
                Ok(())
            }
        }
    }

    /// At most one client is shown on the selected monitor.
    pub(crate) fn is_single_window(&self) -> bool {
        self.shown_clients(self.selected_monitor).len() <= 1
    }

    /// Task-bar click: hides the selection, otherwise shows and focuses.
    pub(crate) fn toggle_window(&mut self, window: Window) -> WmResult<()> {
        if !self.clients.contains_key(&window) {
            return Ok(());
        }
        if self.selected_client() == Some(window) {
            return self.hide(window);
        }
        self.show(window)?;
        self.focus(Some(window))?;
        self.restack(self.selected_monitor)
    }

    /// Shows or hides the scratchpad, fetching it from another monitor if
    /// needed, and launches it when it does not exist.
    pub(crate) fn toggle_scratchpad(&mut self, command: &[String]) -> WmResult<()> {
        let Some((window, monitor_index)) = self
            .client_list
            .iter()
            .filter_map(|window| self.clients.get(window))
            .find(|client| client.is_scratchpad)
            .map(|client| (client.window, client.monitor_index))
        else {
            debug!("no scratchpad client, spawning {:?}", command);
            self.spawner.spawn(command);
            return Ok(());
        };

        if monitor_index == self.selected_monitor {
            return self.toggle_window(window);
        }

        let target = self.selected_monitor;
        self.send_to_monitor(window, target)?;
        self.show(window)?;
        self.focus(Some(window))?;

        let area = self.monitors[target].screen;
        if let Some(client) = self.clients.get(&window).filter(|client| client.is_floating) {
            let mut geometry = client.geometry();
            geometry.x = area.x + (area.width - client.width_with_border()) / 2;
            geometry.y = area.y + (area.height - client.height_with_border()) / 2;
            self.resize(window, geometry, false)?;
        }
        self.pointer_focus_window(Some(window))
    }
}
