use super::WindowManager;
use crate::errors::WmResult;
use crate::layout::LayoutType;
use crate::spawn::Spawner;
use crate::window_system::{BorderScheme, WindowSystem};
use log::debug;
use x11rb::protocol::xproto::Window;

impl<W: WindowSystem, S: Spawner> WindowManager<W, S> {
    /// Gives input focus to `target`, or to the most recently focused shown
    /// client of the selected monitor when `target` cannot take it.
    pub(crate) fn focus(&mut self, target: Option<Window>) -> WmResult<()> {
        let target = target.filter(|&window| self.is_shown(window)).or_else(|| {
            self.monitors[self.selected_monitor]
                .stack
                .iter()
                .copied()
                .find(|&window| self.is_shown(window))
        });

        if let Some(previous) = self.selected_client().filter(|&previous| Some(previous) != target) {
            self.unfocus(previous, false)?;
        }

        match target {
            Some(window) => {
                let Some(client) = self.clients.get(&window) else {
                    return Ok(());
                };
                let monitor_index = client.monitor_index;
                let is_urgent = client.is_urgent;
                let scheme = if client.is_global {
                    BorderScheme::Global
                } else {
                    BorderScheme::Selected
                };

                self.selected_monitor = monitor_index;
                if is_urgent {
                    self.set_urgent(window, false)?;
                }

                let stack = &mut self.monitors[monitor_index].stack;
                stack.retain(|&w| w != window);
                stack.insert(0, window);

                self.grab_buttons(window, true)?;
                self.ws.set_border_color(window, scheme)?;
                self.set_focus(window)?;
            }
            None => {
                self.ws.focus_window(None)?;
                self.ws.set_active_window(None)?;
            }
        }

        self.monitors[self.selected_monitor].selected_client = target;
        self.draw_bars()
    }

    pub(crate) fn unfocus(&mut self, window: Window, reset_focus: bool) -> WmResult<()> {
        if !self.clients.contains_key(&window) {
            return Ok(());
        }
        self.grab_buttons(window, false)?;
        self.ws.set_border_color(window, BorderScheme::Normal)?;
        if reset_focus {
            self.ws.focus_window(None)?;
            self.ws.set_active_window(None)?;
        }
        Ok(())
    }

    /// Hands input focus to the client unless it refuses input, and always
    /// offers `WM_TAKE_FOCUS`.
    pub(crate) fn set_focus(&mut self, window: Window) -> WmResult<()> {
        let never_focus = self.clients.get(&window).is_some_and(|client| client.never_focus);
        if !never_focus {
            self.ws.focus_window(Some(window))?;
            self.ws.set_active_window(Some(window))?;
        }
        self.ws.send_take_focus(window)?;
        Ok(())
    }

    pub(crate) fn set_urgent(&mut self, window: Window, urgent: bool) -> WmResult<()> {
        if let Some(client) = self.clients.get_mut(&window) {
            client.is_urgent = urgent;
        }
        self.ws.set_urgency(window, urgent)
    }

    /// Reorders the monitor's windows: a floating selection on top, tiled
    /// clients below the bar in focus order.
    pub(crate) fn restack(&mut self, monitor_index: usize) -> WmResult<()> {
        self.draw_bar(monitor_index)?;

        let monitor = &self.monitors[monitor_index];
        if let Some(selected) = monitor.selected_client {
            if self.is_floating(selected) || monitor.current_layout() == LayoutType::Normie {
                self.ws.raise_window(selected)?;
            }
        }

        let tiled: Vec<Window> = monitor
            .stack
            .iter()
            .copied()
            .filter(|&window| !self.is_floating(window) && self.is_visible(window))
            .collect();
        if let Some(bar) = monitor.bar_window {
            self.ws.stack_windows(bar, &tiled)?;
        }

        self.ws.flush()?;
        self.ws.discard_enter_events()
    }

    /// Cycles focus through the selected monitor's clients in tiling order.
    /// While any floating client is shown only floating clients take part.
    /// In single-window mode the target replaces the shown window.
    pub(crate) fn focus_stack(&mut self, direction: i32) -> WmResult<()> {
        let monitor_index = self.selected_monitor;
        let selected = self.selected_client();
        if selected.is_some_and(|window| self.clients.get(&window).is_some_and(|c| c.is_fullscreen)) {
            return Ok(());
        }
        let Some(current) = selected.or_else(|| self.monitors[monitor_index].clients.first().copied())
        else {
            return Ok(());
        };

        let single = self.is_single_window();
        let has_floating = self
            .shown_clients(monitor_index)
            .into_iter()
            .any(|window| self.is_floating(window));

        let candidates: Vec<Window> = self.monitors[monitor_index]
            .clients
            .iter()
            .copied()
            .filter(|&window| self.is_floating(window) == has_floating)
            .filter(|&window| self.is_visible(window) && (single || !self.is_hidden(window)))
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let position = candidates.iter().position(|&window| window == current).unwrap_or(0);
        let next = if direction < 0 {
            candidates[(position + candidates.len() - 1) % candidates.len()]
        } else {
            candidates[(position + 1) % candidates.len()]
        };
        debug!("focus stack {} -> {:#x}", direction, next);

        if single {
            self.hide_other_windows(next)
        } else {
            self.pointer_focus_window(Some(next))?;
            self.restack(monitor_index)
        }
    }

    pub(crate) fn focus_monitor(&mut self, direction: i32) -> WmResult<()> {
        if self.monitors.len() <= 1 {
            return Ok(());
        }
        let target = self.dir_to_monitor(direction);
        if target == self.selected_monitor {
            return Ok(());
        }

        if let Some(selected) = self.selected_client() {
            self.unfocus(selected, false)?;
        }
        self.selected_monitor = target;
        self.focus(None)?;
        self.pointer_focus_window(None)
    }

    /// Warps the pointer to the centre of `window` and focuses it, or to the
    /// selected monitor's work area when there is no window.
    pub(crate) fn pointer_focus_window(&mut self, window: Option<Window>) -> WmResult<()> {
        let root = self.ws.root();
        match window.and_then(|window| self.clients.get(&window)) {
            Some(client) => {
                let window = client.window;
                let x = client.x_position + client.width / 2;
                let y = client.y_position + client.height / 2;
                self.ws.warp_pointer(root, x, y)?;
                self.focus(Some(window))
            }
            None => {
                let area = self.monitors[self.selected_monitor].work_area;
                self.ws.warp_pointer(root, area.x + area.width / 3, area.y + area.height / 2)
            }
        }
    }
}
