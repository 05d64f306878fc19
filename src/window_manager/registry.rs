use super::WindowManager;
use crate::client::{BROKEN_TITLE, Client};
use crate::errors::WmResult;
use crate::keyboard::ClickTarget;
use crate::rules::apply_rules;
use crate::spawn::Spawner;
use crate::window_system::{BorderScheme, WindowAttributes, WindowState, WindowSystem};
use log::debug;
use x11rb::protocol::xproto::Window;

/// Placement attempts for a new floating client before it is left where
/// it is.
const FLOATING_PLACEMENT_TRIES: i32 = 10;

impl<W: WindowSystem, S: Spawner> WindowManager<W, S> {
    /// Inserts into the owning monitor's tiling order, at the tail unless
    /// configured to attach at the head.
    pub(crate) fn attach(&mut self, window: Window) {
        let Some(monitor_index) = self.clients.get(&window).map(|client| client.monitor_index) else {
            return;
        };
        let clients = &mut self.monitors[monitor_index].clients;
        if self.config.attach_at_head {
            clients.insert(0, window);
        } else {
            clients.push(window);
        }
    }

    pub(crate) fn detach(&mut self, window: Window) {
        let Some(monitor_index) = self.clients.get(&window).map(|client| client.monitor_index) else {
            return;
        };
        self.monitors[monitor_index].clients.retain(|&w| w != window);
    }

    pub(crate) fn attach_stack(&mut self, window: Window) {
        let Some(monitor_index) = self.clients.get(&window).map(|client| client.monitor_index) else {
            return;
        };
        self.monitors[monitor_index].stack.insert(0, window);
    }

    /// Removes from the focus order. A detached selection is replaced by the
    /// first shown client left in the order.
    pub(crate) fn detach_stack(&mut self, window: Window) {
        let Some(monitor_index) = self.clients.get(&window).map(|client| client.monitor_index) else {
            return;
        };
        self.monitors[monitor_index].stack.retain(|&w| w != window);

        if self.monitors[monitor_index].selected_client == Some(window) {
            let next = self.monitors[monitor_index]
                .stack
                .iter()
                .copied()
                .find(|&w| self.is_shown(w));
            self.monitors[monitor_index].selected_client = next;
        }
    }

    fn apply_rules(&self, client: &mut Client) {
        let (mut instance, mut class) = self.ws.window_class(client.window);
        if instance.is_empty() {
            instance = BROKEN_TITLE.to_string();
        }
        if class.is_empty() {
            class = BROKEN_TITLE.to_string();
        }

        let outcome = apply_rules(
            &self.config.rules,
            &class,
            &instance,
            &client.name,
            &self.config.scratchpad_name,
        );
        debug!(
            "rules for {:#x} ({} / {} / {}): {:?}",
            client.window, class, instance, client.name, outcome
        );

        client.is_floating = outcome.is_floating;
        client.is_global = outcome.is_global;
        client.is_no_border = outcome.is_no_border;
        client.is_scratchpad = outcome.is_scratchpad;
        if client.is_no_border {
            client.border_width = 0;
        }
        if let Some(monitor) = outcome.monitor.filter(|&index| index < self.monitors.len()) {
            client.monitor_index = monitor;
        }

        client.tags = match outcome.tags & self.all_tags {
            0 => self.monitors[client.monitor_index].active_tags(),
            tags => tags,
        };
    }

    /// Adopts a window: applies rules, places it and maps it.
    pub(crate) fn manage(&mut self, window: Window, attributes: WindowAttributes) -> WmResult<()> {
        let mut client = Client::new(window, self.selected_monitor, 0);
        let geometry = attributes.geometry;
        client.set_geometry(geometry);
        client.old_x_position = geometry.x;
        client.old_y_position = geometry.y;
        client.old_width = geometry.width;
        client.old_height = geometry.height;
        client.old_border_width = attributes.border_width;
        client.border_width = self.config.border_width;
        client.set_title(&self.ws.window_title(window).unwrap_or_default());

        let transient = self.ws.transient_for(window);
        match transient.and_then(|parent| self.clients.get(&parent)) {
            Some(parent) => {
                client.monitor_index = parent.monitor_index;
                client.tags = parent.tags;
            }
            None => self.apply_rules(&mut client),
        }

        let monitor_index = client.monitor_index;
        let monitor = &self.monitors[monitor_index];
        let screen = monitor.screen;
        let work_area = monitor.work_area;
        let bar_on_top = monitor.show_bar && monitor.bar_y == screen.y;

        if client.x_position + client.width_with_border() > screen.x + screen.width {
            client.x_position = screen.x + screen.width - client.width_with_border();
        }
        if client.y_position + client.height_with_border() > screen.y + screen.height {
            client.y_position = screen.y + screen.height - client.height_with_border();
        }
        client.x_position = client.x_position.max(screen.x);
        let centre_x = client.x_position + client.width / 2;
        let covers_bar = bar_on_top && centre_x >= work_area.x && centre_x < work_area.x + work_area.width;
        let min_y = if covers_bar {
            screen.y + self.bar_height
        } else {
            screen.y
        };
        client.y_position = client.y_position.max(min_y);

        client.is_hidden = self.ws.client_state(window) == Some(WindowState::Iconic);
        let adopted_hidden = client.is_hidden;
        self.clients.insert(window, client);
        if adopted_hidden {
            self.push_hidden(window);
        }

        if self.is_floating(window) {
            if geometry.x == 0 && geometry.y == 0 {
                let area = self.monitors[monitor_index].work_area;
                if let Some(client) = self.clients.get_mut(&window) {
                    client.x_position = area.x + (area.width - client.width) / 2;
                    client.y_position = area.y + (area.height - client.height) / 2;
                }
            }
            self.manage_floating(window);
        }

        let border_width = self.clients.get(&window).map_or(0, |client| client.border_width);
        self.ws.set_border_width(window, border_width)?;
        self.ws.set_border_color(window, BorderScheme::Normal)?;
        if let Some(client) = self.clients.get(&window) {
            self.ws
                .send_configure_notify(window, client.geometry(), client.border_width)?;
        }
        self.update_window_type(window)?;
        self.update_size_hints(window);
        self.update_wm_hints(window)?;
        self.ws.watch_client(window)?;
        self.grab_buttons(window, false)?;

        if let Some(client) = self.clients.get_mut(&window) {
            if !client.is_floating {
                client.is_floating = transient.is_some() || client.is_fixed;
                client.old_state = client.is_floating;
            }
        }
        if self.is_floating(window) {
            self.ws.raise_window(window)?;
        }

        self.attach(window);
        self.attach_stack(window);
        self.client_list.push(window);
        self.ws.update_client_list(&self.client_list)?;

        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        let is_hidden = client.is_hidden;
        let mut parked = client.geometry();
        parked.x += 2 * self.screen_width;
        self.ws.move_resize_window(window, parked, client.border_width)?;

        if !is_hidden {
            self.ws.set_client_state(window, WindowState::Normal)?;
        }
        if monitor_index == self.selected_monitor {
            if let Some(selected) = self.selected_client() {
                self.unfocus(selected, false)?;
            }
        }
        // A client landing off-view on another monitor must not take its
        // selection.
        let selection = if self.is_shown(window) {
            Some(window)
        } else {
            self.monitors[monitor_index]
                .stack
                .iter()
                .copied()
                .find(|&w| self.is_shown(w))
        };
        self.monitors[monitor_index].selected_client = selection;
        self.arrange(Some(monitor_index))?;
        if !is_hidden {
            self.ws.map_window(window)?;
        }
        debug!("managed {:#x} on monitor {}", window, monitor_index);
        self.focus(None)
    }

    /// Nudges a new floating client diagonally in steps of a twentieth of
    /// the work area until it no longer sits exactly on top of another
    /// shown client.
    pub(crate) fn manage_floating(&mut self, window: Window) {
        let Some(client) = self.clients.get(&window) else {
            return;
        };
        let monitor_index = client.monitor_index;
        let area = self.monitors[monitor_index].work_area;
        let (origin_x, origin_y) = (client.x_position, client.y_position);

        let occupied: Vec<(i32, i32)> = self
            .shown_clients(monitor_index)
            .into_iter()
            .filter(|&other| other != window)
            .filter_map(|other| self.clients.get(&other))
            .map(|other| (other.x_position, other.y_position))
            .collect();

        for attempt in 0..FLOATING_PLACEMENT_TRIES {
            let x = origin_x + area.width / 20 * attempt;
            let y = origin_y + area.height / 20 * attempt;
            if !occupied.contains(&(x, y)) {
                if let Some(client) = self.clients.get_mut(&window) {
                    client.x_position = x;
                    client.y_position = y;
                }
                return;
            }
        }
    }

    /// Forgets a client. The window is left alone when the server already
    /// destroyed it.
    pub(crate) fn unmanage(&mut self, window: Window, destroyed: bool) -> WmResult<()> {
        let Some(monitor_index) = self.clients.get(&window).map(|client| client.monitor_index) else {
            return Ok(());
        };

        self.detach(window);
        self.detach_stack(window);

        if !destroyed {
            let old_border_width = self.clients.get(&window).map_or(0, |client| client.old_border_width);
            self.ws.set_border_width(window, old_border_width)?;
            self.ws.ungrab_buttons(window)?;
            self.ws.set_client_state(window, WindowState::Withdrawn)?;
        }

        self.clients.remove(&window);
        self.hidden_stack.retain(|&hidden| hidden != window);
        self.client_list.retain(|&managed| managed != window);
        for monitor in &mut self.monitors {
            if monitor.selected_client == Some(window) {
                monitor.selected_client = None;
            }
        }

        debug!("unmanaged {:#x} (destroyed={})", window, destroyed);
        self.focus(None)?;
        self.ws.update_client_list(&self.client_list)?;
        self.arrange(Some(monitor_index))
    }

    /// Moves a client to another monitor and onto that monitor's view.
    pub(crate) fn send_to_monitor(&mut self, window: Window, target: usize) -> WmResult<()> {
        let Some(current) = self.clients.get(&window).map(|client| client.monitor_index) else {
            return Ok(());
        };
        if current == target {
            return Ok(());
        }

        self.unfocus(window, true)?;
        self.detach(window);
        self.detach_stack(window);

        let tags = self.monitors[target].active_tags();
        if let Some(client) = self.clients.get_mut(&window) {
            client.monitor_index = target;
            if !client.is_global {
                client.tags = tags;
            }
        }

        self.attach(window);
        self.attach_stack(window);
        debug!("sent {:#x} from monitor {} to {}", window, current, target);
        self.focus(None)?;
        self.arrange(None)
    }

    /// Adopts windows that existed before startup, transients last so their
    /// parents are already managed.
    pub(crate) fn scan(&mut self) -> WmResult<()> {
        let windows = self.ws.query_tree();
        let mut transients = Vec::new();

        for window in windows {
            let Some(attributes) = self.ws.window_attributes(window) else {
                continue;
            };
            if attributes.override_redirect || !self.adoptable(window, &attributes) {
                continue;
            }
            if self.ws.transient_for(window).is_some() {
                transients.push((window, attributes));
            } else {
                self.manage(window, attributes)?;
            }
        }

        for (window, attributes) in transients {
            self.manage(window, attributes)?;
        }
        Ok(())
    }

    fn adoptable(&self, window: Window, attributes: &WindowAttributes) -> bool {
        !self.clients.contains_key(&window)
            && (attributes.viewable || self.ws.client_state(window) == Some(WindowState::Iconic))
    }

    pub(crate) fn grab_buttons(&self, window: Window, focused: bool) -> WmResult<()> {
        let buttons: Vec<(u16, u8)> = self
            .config
            .buttonbindings
            .iter()
            .filter(|binding| binding.target == ClickTarget::ClientWindow)
            .map(|binding| (binding.mask(), binding.button))
            .collect();
        self.ws.grab_buttons(window, focused, &buttons)
    }

    pub(crate) fn update_title(&mut self, window: Window) {
        let title = self.ws.window_title(window).unwrap_or_default();
        if let Some(client) = self.clients.get_mut(&window) {
            client.set_title(&title);
        }
    }

    pub(crate) fn update_size_hints(&mut self, window: Window) {
        let hints = self.ws.size_hints(window).unwrap_or_default();
        if let Some(client) = self.clients.get_mut(&window) {
            client.update_size_hints(hints);
        }
    }

    /// Takes over the urgency hint, except on the focused client where it is
    /// cleared instead.
    pub(crate) fn update_wm_hints(&mut self, window: Window) -> WmResult<()> {
        let hints = self.ws.wm_hints(window);
        let is_selected = self.selected_client() == Some(window);

        if is_selected && hints.urgent {
            self.ws.set_urgency(window, false)?;
        }
        if let Some(client) = self.clients.get_mut(&window) {
            client.is_urgent = hints.urgent && !is_selected;
            if let Some(input) = hints.input {
                client.never_focus = !input;
            }
        }
        Ok(())
    }

    pub(crate) fn update_window_type(&mut self, window: Window) -> WmResult<()> {
        let window_type = self.ws.window_type(window);
        if window_type.is_fullscreen {
            self.set_fullscreen(window, true)?;
        }
        if window_type.is_dialog {
            if let Some(client) = self.clients.get_mut(&window) {
                client.is_floating = true;
            }
        }
        Ok(())
    }
}
