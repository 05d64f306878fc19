use super::WindowManager;
use crate::bar::BarHit;
use crate::errors::{WmError, WmResult, is_benign};
use crate::keyboard::handlers::{clean_mask, find_key_binding};
use crate::keyboard::{Arg, ClickTarget};
use crate::layout::Rect;
use crate::spawn::Spawner;
use crate::window_system::{
    ClientMessage, ConfigureRequest, PropertyKind, StateAction, WindowState, WindowSystem, WmEvent,
    configure_mask,
};
use log::{debug, error, warn};
use x11rb::protocol::xproto::Window;

impl<W: WindowSystem, S: Spawner> WindowManager<W, S> {
    pub(crate) fn handle_event(&mut self, event: WmEvent) -> WmResult<()> {
        match event {
            WmEvent::ButtonPress {
                window,
                x,
                button,
                state,
                ..
            } => self.handle_button_press(window, x, button, state),
            WmEvent::ButtonRelease { .. } => Ok(()),
            WmEvent::MotionNotify {
                window, root_x, root_y, ..
            } => self.handle_motion(window, root_x, root_y),
            WmEvent::KeyPress { keysym, state } => {
                let Some(binding) =
                    find_key_binding(&self.config.keybindings, keysym, state, self.numlock_mask)
                else {
                    return Ok(());
                };
                let (func, arg) = (binding.func, binding.arg.clone());
                debug!("key {:#x} -> {:?}", keysym, func);
                self.dispatch(func, &arg)
            }
            WmEvent::MapRequest { window } => {
                let Some(attributes) = self.ws.window_attributes(window) else {
                    return Ok(());
                };
                if attributes.override_redirect || self.clients.contains_key(&window) {
                    return Ok(());
                }
                self.manage(window, attributes)
            }
            WmEvent::UnmapNotify { window, synthetic } => {
                if !self.clients.contains_key(&window) {
                    return Ok(());
                }
                if synthetic {
                    self.ws.set_client_state(window, WindowState::Withdrawn)
                } else {
                    self.unmanage(window, false)
                }
            }
            WmEvent::DestroyNotify { window } => self.unmanage(window, true),
            WmEvent::ConfigureRequest(request) => self.handle_configure_request(&request),
            WmEvent::ConfigureNotify { window, width, height } => {
                self.handle_configure_notify(window, width, height)
            }
            WmEvent::EnterNotify { window, normal } => self.handle_enter(window, normal),
            WmEvent::PropertyNotify {
                window,
                property,
                deleted,
            } => self.handle_property(window, property, deleted),
            WmEvent::ClientMessage { window, message } => self.handle_client_message(window, message),
            WmEvent::Expose { window, count } => {
                if count == 0 {
                    self.draw_bar(self.window_to_monitor(window))?;
                }
                Ok(())
            }
            WmEvent::FocusIn { window } => match self.selected_client() {
                Some(selected) if selected != window => self.set_focus(selected),
                _ => Ok(()),
            },
            WmEvent::MappingNotify { keyboard } => {
                self.ws.refresh_keyboard_mapping()?;
                if keyboard {
                    self.grab_keys()?;
                }
                Ok(())
            }
            WmEvent::ProtocolError { request, error } => {
                if is_benign(request, error) {
                    warn!("ignoring protocol error {:?} from {:?}", error, request);
                    Ok(())
                } else {
                    error!("fatal protocol error {:?} from {:?}", error, request);
                    Err(WmError::FatalProtocol { request, error })
                }
            }
        }
    }

    fn handle_button_press(&mut self, window: Window, x: i32, button: u8, state: u16) -> WmResult<()> {
        let monitor_index = self.window_to_monitor(window);
        if monitor_index != self.selected_monitor {
            if let Some(selected) = self.selected_client() {
                self.unfocus(selected, true)?;
            }
            self.selected_monitor = monitor_index;
            self.focus(None)?;
        }

        let (target, click_arg) = if self.monitors[self.selected_monitor].bar_window == Some(window) {
            match self.bar_model(self.selected_monitor).hit(x) {
                BarHit::Tag(index) => (ClickTarget::TagBar, Arg::Int(index as i32)),
                BarHit::LayoutSymbol => (ClickTarget::LayoutSymbol, Arg::None),
                BarHit::Task(window) => (ClickTarget::WindowTitle, Arg::Window(window)),
                BarHit::Status { offset } => (ClickTarget::StatusText, Arg::StatusClick { offset, button }),
                BarHit::Empty => (ClickTarget::BarEmpty, Arg::None),
            }
        } else if self.clients.contains_key(&window) {
            self.focus(Some(window))?;
            self.restack(self.selected_monitor)?;
            self.ws.allow_events_replay()?;
            (ClickTarget::ClientWindow, Arg::None)
        } else {
            (ClickTarget::RootWindow, Arg::None)
        };

        let state = clean_mask(state, self.numlock_mask);
        let matching: Vec<_> = self
            .config
            .buttonbindings
            .iter()
            .filter(|binding| {
                binding.target == target
                    && binding.button == button
                    && clean_mask(binding.mask(), self.numlock_mask) == state
            })
            .map(|binding| {
                let arg = match binding.arg {
                    Arg::None => click_arg.clone(),
                    ref arg => arg.clone(),
                };
                (binding.func, arg)
            })
            .collect();

        for (func, arg) in matching {
            debug!("button {} on {:?} -> {:?}", button, target, func);
            self.dispatch(func, &arg)?;
        }
        Ok(())
    }

    /// Root motion switches the selected monitor when the pointer crosses
    /// into another one.
    fn handle_motion(&mut self, window: Window, root_x: i32, root_y: i32) -> WmResult<()> {
        if window != self.ws.root() {
            return Ok(());
        }
        let monitor_index = self.rect_to_monitor(Rect::new(root_x, root_y, 1, 1));
        let crossed = self.motion_monitor.is_some_and(|previous| previous != monitor_index);
        self.motion_monitor = Some(monitor_index);

        if crossed {
            if let Some(selected) = self.selected_client() {
                self.unfocus(selected, true)?;
            }
            self.selected_monitor = monitor_index;
            self.focus(None)?;
        }
        Ok(())
    }

    fn handle_enter(&mut self, window: Window, normal: bool) -> WmResult<()> {
        if !normal && window != self.ws.root() {
            return Ok(());
        }
        let managed = self.clients.contains_key(&window);
        let monitor_index = self.window_to_monitor(window);

        if monitor_index != self.selected_monitor {
            if let Some(selected) = self.selected_client() {
                self.unfocus(selected, true)?;
            }
            self.selected_monitor = monitor_index;
        } else if !managed || self.selected_client() == Some(window) {
            return Ok(());
        }
        self.focus(managed.then_some(window))
    }

    /// Floating clients get what they ask for, recentred when they would
    /// leave their monitor. Tiled clients are told their current geometry.
    fn handle_configure_request(&mut self, request: &ConfigureRequest) -> WmResult<()> {
        let window = request.window;
        let Some(client) = self.clients.get(&window) else {
            return self.ws.configure_unmanaged(request);
        };

        if request.has(configure_mask::BORDER_WIDTH) {
            if let Some(client) = self.clients.get_mut(&window) {
                client.border_width = request.border_width;
            }
            return Ok(());
        }
        if !client.is_floating {
            return self
                .ws
                .send_configure_notify(window, client.geometry(), client.border_width);
        }

        let screen = self.monitors[client.monitor_index].screen;
        let visible = self.is_visible(window);
        let Some(client) = self.clients.get_mut(&window) else {
            return Ok(());
        };
        if request.has(configure_mask::X) {
            client.old_x_position = client.x_position;
            client.x_position = screen.x + request.x;
        }
        if request.has(configure_mask::Y) {
            client.old_y_position = client.y_position;
            client.y_position = screen.y + request.y;
        }
        if request.has(configure_mask::WIDTH) {
            client.old_width = client.width;
            client.width = request.width;
        }
        if request.has(configure_mask::HEIGHT) {
            client.old_height = client.height;
            client.height = request.height;
        }
        if client.x_position + client.width > screen.x + screen.width {
            client.x_position = screen.x + (screen.width / 2 - client.width_with_border() / 2);
        }
        if client.y_position + client.height > screen.y + screen.height {
            client.y_position = screen.y + (screen.height / 2 - client.height_with_border() / 2);
        }

        let geometry = client.geometry();
        let border_width = client.border_width;
        let moved = request.has(configure_mask::X) || request.has(configure_mask::Y);
        let resized = request.has(configure_mask::WIDTH) || request.has(configure_mask::HEIGHT);
        if moved && !resized {
            self.ws.send_configure_notify(window, geometry, border_width)?;
        }
        if visible {
            self.ws.move_resize_window(window, geometry, border_width)?;
        }
        Ok(())
    }

    /// Root size changes rebuild the monitors and refit fullscreen clients.
    fn handle_configure_notify(&mut self, window: Window, width: i32, height: i32) -> WmResult<()> {
        if window != self.ws.root() {
            return Ok(());
        }
        let resized = self.screen_width != width || self.screen_height != height;
        self.screen_width = width;
        self.screen_height = height;

        if !(self.update_geometry()? || resized) {
            return Ok(());
        }
        self.update_bars()?;

        let fullscreen: Vec<(Window, Rect)> = self
            .clients
            .values()
            .filter(|client| client.is_fullscreen)
            .filter_map(|client| {
                self.monitors
                    .get(client.monitor_index)
                    .map(|monitor| (client.window, monitor.screen))
            })
            .collect();
        for (window, screen) in fullscreen {
            self.resize_client(window, screen)?;
        }

        self.focus(None)?;
        self.arrange(None)
    }

    fn handle_property(&mut self, window: Window, property: PropertyKind, deleted: bool) -> WmResult<()> {
        if window == self.ws.root() {
            if property == PropertyKind::Name {
                self.update_status();
                self.draw_bars()?;
            }
            return Ok(());
        }
        if deleted {
            return Ok(());
        }
        let Some(monitor_index) = self.clients.get(&window).map(|client| client.monitor_index) else {
            return Ok(());
        };

        match property {
            PropertyKind::TransientFor => {
                let parent_managed = self
                    .ws
                    .transient_for(window)
                    .is_some_and(|parent| self.clients.contains_key(&parent));
                if !self.is_floating(window) && parent_managed {
                    if let Some(client) = self.clients.get_mut(&window) {
                        client.is_floating = true;
                    }
                    self.arrange(Some(monitor_index))?;
                }
            }
            PropertyKind::NormalHints => self.update_size_hints(window),
            PropertyKind::Hints => {
                self.update_wm_hints(window)?;
                self.draw_bars()?;
            }
            PropertyKind::Name => {
                self.update_title(window);
                self.draw_bar(monitor_index)?;
            }
            PropertyKind::WindowType => self.update_window_type(window)?,
            PropertyKind::Other => {}
        }
        Ok(())
    }

    fn handle_client_message(&mut self, window: Window, message: ClientMessage) -> WmResult<()> {
        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };

        match message {
            ClientMessage::Fullscreen(action) => {
                let fullscreen = match action {
                    StateAction::Add => true,
                    StateAction::Remove => false,
                    StateAction::Toggle => !client.is_fullscreen,
                };
                self.set_fullscreen(window, fullscreen)
            }
            ClientMessage::ActiveWindow => {
                let is_urgent = client.is_urgent;
                let monitor_index = client.monitor_index;
                let tags = client.tags;
                if self.selected_client() == Some(window) {
                    return Ok(());
                }
                if !is_urgent {
                    self.set_urgent(window, true)?;
                }
                if monitor_index != self.selected_monitor {
                    self.focus_monitor(1)?;
                }
                if !self.is_visible(window) {
                    self.view(tags, None)?;
                }
                self.draw_bars()
            }
            ClientMessage::Other => Ok(()),
        }
    }
}
