use super::WindowManager;
use crate::client::TagMask;
use crate::errors::WmResult;
use crate::monitor::Pertag;
use crate::spawn::{Spawner, shell_command};
use crate::window_system::WindowSystem;
use log::debug;

impl<W: WindowSystem, S: Spawner> WindowManager<W, S> {
    /// Switches the selected monitor to `mask`, or back to the previous
    /// view when `mask` names no tag. The pertag settings of the new view
    /// are restored. `fallback` runs when the new view has no clients of
    /// its own.
    pub(crate) fn view(&mut self, mask: TagMask, fallback: Option<&str>) -> WmResult<()> {
        let monitor_index = self.selected_monitor;
        let all_tags = self.all_tags;
        let monitor = &mut self.monitors[monitor_index];

        monitor.selected_tags_index ^= 1;
        if mask & all_tags != 0 {
            monitor.tagset[monitor.selected_tags_index] = mask & all_tags;
            monitor.pertag.previous_tag = monitor.pertag.current_tag;
            monitor.pertag.current_tag = Pertag::slot_for_mask(mask, all_tags);
        } else {
            std::mem::swap(&mut monitor.pertag.previous_tag, &mut monitor.pertag.current_tag);
        }

        let entry = *monitor.pertag.current();
        monitor.num_master = entry.num_master;
        monitor.master_factor = entry.master_factor;
        monitor.selected_layout = entry.selected_layout;
        monitor.layouts = entry.layouts;
        let toggle_bar = monitor.show_bar != entry.show_bar;
        debug!(
            "view {:#b} on monitor {} (pertag slot {})",
            monitor.active_tags(),
            monitor_index,
            monitor.pertag.current_tag
        );

        if toggle_bar {
            self.toggle_bar()?;
        }

        self.focus(None)?;
        self.arrange(Some(monitor_index))?;

        if let Some(command) = fallback {
            let occupied = self.monitors[monitor_index]
                .clients
                .iter()
                .filter_map(|window| self.clients.get(window))
                .any(|client| client.tags & mask != 0 && !client.is_hidden && !client.is_global);
            if !occupied {
                debug!("view fallback: {}", command);
                self.spawner.spawn(&shell_command(command));
            }
        }
        Ok(())
    }

    /// Adds or removes tags from the view, refusing to leave it empty.
    pub(crate) fn toggle_view(&mut self, mask: TagMask) -> WmResult<()> {
        let monitor_index = self.selected_monitor;
        let monitor = &mut self.monitors[monitor_index];
        let tagset = monitor.active_tags() ^ (mask & self.all_tags);
        if tagset == 0 {
            return Ok(());
        }
        monitor.tagset[monitor.selected_tags_index] = tagset;
        self.focus(None)?;
        self.arrange(Some(monitor_index))
    }

    /// Retags the selection and follows it.
    pub(crate) fn tag(&mut self, mask: TagMask) -> WmResult<()> {
        let retaggable = self
            .selected_client()
            .and_then(|window| self.clients.get(&window))
            .is_some_and(|client| !client.is_global);

        if retaggable && mask & self.all_tags != 0 {
            if let Some(client) = self.selected_client().and_then(|window| self.clients.get_mut(&window)) {
                client.tags = mask & self.all_tags;
            }
            self.focus(None)?;
            self.arrange(Some(self.selected_monitor))?;
        }
        self.view(mask, None)
    }

    pub(crate) fn toggle_tag(&mut self, mask: TagMask) -> WmResult<()> {
        let Some(window) = self.selected_client() else {
            return Ok(());
        };
        let all_tags = self.all_tags;
        let Some(client) = self.clients.get_mut(&window) else {
            return Ok(());
        };
        let tags = client.tags ^ (mask & all_tags);
        if tags == 0 || client.is_global {
            return Ok(());
        }
        client.tags = tags;
        self.focus(None)?;
        self.arrange(Some(self.selected_monitor))
    }

    /// Only single-tag views can move sideways.
    fn single_tag_view(&self) -> Option<TagMask> {
        let tags = self.monitors[self.selected_monitor].active_tags();
        ((tags & self.all_tags).count_ones() == 1).then_some(tags)
    }

    /// Whether any client that is not on every tag carries `mask`.
    fn tag_is_occupied(&self, mask: TagMask) -> bool {
        self.monitors[self.selected_monitor]
            .clients
            .iter()
            .filter_map(|window| self.clients.get(window))
            .filter(|client| !(client.is_global && client.tags == self.all_tags))
            .any(|client| client.tags & mask != 0)
    }

    /// Views the nearest occupied tag to the left.
    pub(crate) fn view_left(&mut self) -> WmResult<()> {
        let Some(mut target) = self.single_tag_view().filter(|&tags| tags > 1) else {
            return Ok(());
        };
        while target > 1 {
            target >>= 1;
            if self.tag_is_occupied(target) {
                return self.view(target, None);
            }
        }
        Ok(())
    }

    /// Views the nearest occupied tag to the right.
    pub(crate) fn view_right(&mut self) -> WmResult<()> {
        let Some(mut target) = self
            .single_tag_view()
            .filter(|&tags| tags & (self.all_tags >> 1) != 0)
        else {
            return Ok(());
        };
        loop {
            target <<= 1;
            if target & self.all_tags == 0 {
                return Ok(());
            }
            if self.tag_is_occupied(target) {
                return self.view(target, None);
            }
        }
    }

    pub(crate) fn tag_left(&mut self) -> WmResult<()> {
        match self.single_tag_view().filter(|&tags| tags > 1) {
            Some(tags) if self.selected_client().is_some() => self.tag(tags >> 1),
            _ => Ok(()),
        }
    }

    pub(crate) fn tag_right(&mut self) -> WmResult<()> {
        match self
            .single_tag_view()
            .filter(|&tags| tags & (self.all_tags >> 1) != 0)
        {
            Some(tags) if self.selected_client().is_some() => self.tag(tags << 1),
            _ => Ok(()),
        }
    }

    /// Enters or leaves the overview. Leaving jumps to the tags of the
    /// window selected while in the overview.
    pub(crate) fn toggle_overview(&mut self) -> WmResult<()> {
        let selected = self.selected_client().and_then(|window| self.clients.get(&window));
        if selected.is_some_and(|client| client.is_fullscreen) {
            return Ok(());
        }

        let target = match selected {
            Some(client) if client.tags != self.all_tags => client.tags,
            _ => self.monitors[self.selected_monitor].active_tags(),
        };

        let monitor = &mut self.monitors[self.selected_monitor];
        monitor.is_overview = !monitor.is_overview;
        debug!("overview {} on monitor {}", monitor.is_overview, monitor.num);

        self.view(target, None)?;
        self.pointer_focus_window(self.selected_client())
    }

    /// Pins the selection to every tag, or back to the current view. The
    /// scratchpad is always global.
    pub(crate) fn toggle_global(&mut self) -> WmResult<()> {
        let Some(window) = self.selected_client() else {
            return Ok(());
        };
        let active_tags = self.monitors[self.selected_monitor].active_tags();
        let all_tags = self.all_tags;
        let Some(client) = self.clients.get_mut(&window) else {
            return Ok(());
        };
        if client.is_scratchpad {
            return Ok(());
        }

        client.is_global = !client.is_global;
        client.tags = if client.is_global { all_tags } else { active_tags };
        debug!("{:#x} global={}", window, client.is_global);

        self.focus(None)?;
        self.arrange(Some(self.selected_monitor))
    }
}
