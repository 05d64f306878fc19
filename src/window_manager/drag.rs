//! Interactive move and resize.
//!
//! While the button is held the drag loop reads events itself. Only
//! configure requests, exposes and map requests are handled on the spot;
//! everything else is deferred until the drag ends.

use super::WindowManager;
use crate::errors::WmResult;
use crate::layout::Rect;
use crate::spawn::Spawner;
use crate::window_system::{CursorKind, WindowSystem, WmEvent};
use log::{debug, warn};
use x11rb::protocol::xproto::Window;

/// Motion events closer together than this many milliseconds are dropped
/// (120 updates per second).
pub const MOTION_INTERVAL_MS: u32 = 1000 / 120;

/// What one pass of a drag loop produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragStep {
    /// Pointer position in root coordinates.
    Motion { x: i32, y: i32 },
    Released,
    Handled,
}

/// Event kinds a drag loop dispatches while the button is held.
fn is_reentrant(event: &WmEvent) -> bool {
    matches!(
        event,
        WmEvent::ConfigureRequest(_)
            | WmEvent::Expose { .. }
            | WmEvent::MapRequest { .. }
            | WmEvent::ProtocolError { .. }
    )
}

impl<W: WindowSystem, S: Spawner> WindowManager<W, S> {
    fn drag_step(&mut self, last_motion: &mut u32) -> WmResult<DragStep> {
        let event = self.ws.next_event()?;
        match event {
            WmEvent::ButtonRelease { .. } => Ok(DragStep::Released),
            WmEvent::MotionNotify {
                root_x, root_y, time, ..
            } => {
                if time.wrapping_sub(*last_motion) <= MOTION_INTERVAL_MS {
                    return Ok(DragStep::Handled);
                }
                *last_motion = time;
                Ok(DragStep::Motion { x: root_x, y: root_y })
            }
            event if is_reentrant(&event) => {
                self.handle_event(event)?;
                Ok(DragStep::Handled)
            }
            event => {
                self.deferred.push_back(event);
                Ok(DragStep::Handled)
            }
        }
    }

    /// Selection that can be dragged, after bringing it to the top.
    fn drag_target(&mut self) -> WmResult<Option<Window>> {
        let Some(window) = self.selected_client() else {
            return Ok(None);
        };
        if self.clients.get(&window).is_some_and(|client| client.is_fullscreen) {
            return Ok(None);
        }
        self.restack(self.selected_monitor)?;
        Ok(Some(window))
    }

    pub(crate) fn move_mouse(&mut self) -> WmResult<()> {
        let Some(window) = self.drag_target()? else {
            return Ok(());
        };
        let Some(origin) = self.clients.get(&window).map(|client| client.geometry()) else {
            return Ok(());
        };

        if !self.ws.grab_pointer(CursorKind::Move)? {
            warn!("pointer grab failed, move of {:#x} aborted", window);
            return Ok(());
        }
        let Some((start_x, start_y)) = self.ws.query_pointer() else {
            return self.ws.ungrab_pointer();
        };
        debug!("move of {:#x} started at ({}, {})", window, start_x, start_y);

        let mut last_motion = 0;
        loop {
            match self.drag_step(&mut last_motion)? {
                DragStep::Released => break,
                DragStep::Handled => {}
                DragStep::Motion { x, y } => {
                    let position = (origin.x + x - start_x, origin.y + y - start_y);
                    self.drag_move(window, position, (x, y))?;
                }
            }
        }

        self.ws.ungrab_pointer()?;
        self.finish_drag(window)
    }

    /// One move step: snaps to the work-area edges and floats a tiled
    /// client once it leaves its slot.
    fn drag_move(&mut self, window: Window, position: (i32, i32), pointer: (i32, i32)) -> WmResult<()> {
        let area = self.monitors[self.selected_monitor].work_area;
        let snap = self.config.snap;
        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        let (outer_width, outer_height) = (client.width_with_border(), client.height_with_border());

        let (mut x, mut y) = position;
        if (area.x - x).abs() < snap {
            x = area.x;
        } else if (area.x + area.width - (x + outer_width)).abs() < snap {
            x = area.x + area.width - outer_width;
        }
        if (area.y - y).abs() < snap {
            y = area.y;
        } else if (area.y + area.height - (y + outer_height)).abs() < snap {
            y = area.y + area.height - outer_height;
        }

        let left_slot = (x - client.x_position).abs() > snap || (y - client.y_position).abs() > snap;
        if !client.is_floating && left_slot {
            if let Some(client) = self.clients.get_mut(&window) {
                client.is_floating = true;
            }
            self.arrange(Some(self.selected_monitor))?;

            let Some(client) = self.clients.get(&window) else {
                return Ok(());
            };
            let wide = client.width * 2 > area.width;
            let tall = client.height * 2 > area.height;
            let grabbed_near_origin = pointer.0 - x < client.width / 2 && pointer.1 - y < client.height / 2;
            if grabbed_near_origin && (wide || tall) {
                let width = if wide { client.width / 2 } else { client.width };
                let height = if tall { client.height / 2 } else { client.height };
                return self.resize(window, Rect::new(x, y, width, height), false);
            }
        }

        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        if client.is_floating {
            let geometry = Rect::new(x, y, client.width, client.height);
            self.resize(window, geometry, true)?;
        }
        Ok(())
    }

    pub(crate) fn resize_mouse(&mut self) -> WmResult<()> {
        let Some(window) = self.drag_target()? else {
            return Ok(());
        };
        let Some(origin) = self.clients.get(&window).map(|client| client.geometry()) else {
            return Ok(());
        };

        if !self.ws.grab_pointer(CursorKind::Resize)? {
            warn!("pointer grab failed, resize of {:#x} aborted", window);
            return Ok(());
        }
        let Some((pointer_x, pointer_y)) = self.ws.query_pointer() else {
            return self.ws.ungrab_pointer();
        };

        let left = pointer_x - origin.x < origin.width / 2;
        let top = pointer_y - origin.y < origin.height / 2;
        self.warp_to_corner(window, left, top)?;
        debug!("resize of {:#x} started (left={}, top={})", window, left, top);

        let far_x = origin.x + origin.width;
        let far_y = origin.y + origin.height;
        let mut last_motion = 0;
        loop {
            let (x, y) = match self.drag_step(&mut last_motion)? {
                DragStep::Released => break,
                DragStep::Handled => continue,
                DragStep::Motion { x, y } => (x, y),
            };

            let Some(client) = self.clients.get(&window) else {
                break;
            };
            let border = client.border_width;
            let new_x = if left { x } else { client.x_position };
            let new_y = if top { y } else { client.y_position };
            let width = if left { far_x - new_x } else { x - origin.x - 2 * border + 1 }.max(1);
            let height = if top { far_y - new_y } else { y - origin.y - 2 * border + 1 }.max(1);

            let own_area = self.monitors[client.monitor_index].work_area;
            let selected_area = self.monitors[self.selected_monitor].work_area;
            let fits = own_area.x + width >= selected_area.x
                && own_area.x + width <= selected_area.x + selected_area.width
                && own_area.y + height >= selected_area.y
                && own_area.y + height <= selected_area.y + selected_area.height;
            let snap = self.config.snap;
            let past_snap = (width - client.width).abs() > snap || (height - client.height).abs() > snap;

            if fits && !client.is_floating && past_snap {
                if let Some(client) = self.clients.get_mut(&window) {
                    client.is_floating = true;
                }
                self.arrange(Some(self.selected_monitor))?;
            }
            if self.is_floating(window) {
                self.resize(window, Rect::new(new_x, new_y, width, height), true)?;
            }
        }

        self.warp_to_corner(window, left, top)?;
        self.ws.ungrab_pointer()?;
        self.ws.discard_enter_events()?;
        self.deferred
            .retain(|event| !matches!(event, WmEvent::EnterNotify { .. }));
        self.finish_drag(window)
    }

    fn warp_to_corner(&self, window: Window, left: bool, top: bool) -> WmResult<()> {
        let Some(client) = self.clients.get(&window) else {
            return Ok(());
        };
        let border = client.border_width;
        let x = if left { -border } else { client.width + border - 1 };
        let y = if top { -border } else { client.height + border - 1 };
        self.ws.warp_pointer(window, x, y)
    }

    /// Hands the client to the monitor it was dropped on.
    fn finish_drag(&mut self, window: Window) -> WmResult<()> {
        let Some(geometry) = self.clients.get(&window).map(|client| client.geometry()) else {
            return Ok(());
        };
        let target = self.rect_to_monitor(geometry);
        if target != self.selected_monitor {
            self.send_to_monitor(window, target)?;
            self.selected_monitor = target;
            self.focus(None)?;
        }
        Ok(())
    }
}
