use super::WindowManager;
use crate::bar::status::DEFAULT_STATUS;
use crate::bar::{BarInput, BarModel, BarSchemes, TaskEntry, TaskState, parse_status};
use crate::errors::WmResult;
use crate::spawn::Spawner;
use crate::window_system::WindowSystem;

impl<W: WindowSystem, S: Spawner> WindowManager<W, S> {
    /// Lays out a monitor's bar. The same model answers click hit-tests.
    pub(crate) fn bar_model(&self, monitor_index: usize) -> BarModel {
        let monitor = &self.monitors[monitor_index];
        let members: Vec<_> = monitor
            .clients
            .iter()
            .filter_map(|window| self.clients.get(window))
            .collect();

        let mut occupied_tags = 0;
        let mut urgent_tags = 0;
        for client in &members {
            if client.tags != self.all_tags {
                occupied_tags |= client.tags;
            }
            if client.is_urgent {
                urgent_tags |= client.tags;
            }
        }

        let tasks = members
            .iter()
            .filter(|client| monitor.is_visible(client))
            .map(|client| TaskEntry {
                window: client.window,
                title: &client.name,
                state: if monitor.selected_client == Some(client.window) {
                    TaskState::Selected
                } else if client.is_hidden {
                    TaskState::Hidden
                } else {
                    TaskState::Normal
                },
            })
            .collect();

        let input = BarInput {
            width: monitor.work_area.width,
            tags: &self.config.tags,
            overview_label: &self.config.overview_tag,
            is_overview: monitor.is_overview,
            active_tags: monitor.active_tags(),
            occupied_tags,
            urgent_tags,
            layout_symbol: &monitor.layout_symbol,
            tasks,
            status: &self.status,
            schemes: BarSchemes {
                normal: self.config.scheme_normal,
                selected: self.config.scheme_selected,
                hidden: self.config.scheme_hidden,
                tag_normal: self.config.scheme_tag_normal,
                tag_selected: self.config.scheme_tag_selected,
            },
        };
        BarModel::build(&input, self.bar_height, |text| self.ws.text_width(text))
    }

    pub(crate) fn draw_bar(&mut self, monitor_index: usize) -> WmResult<()> {
        let Some(monitor) = self.monitors.get(monitor_index) else {
            return Ok(());
        };
        let Some(bar) = monitor.bar_window.filter(|_| monitor.show_bar) else {
            return Ok(());
        };

        let model = self.bar_model(monitor_index);
        for window in &self.monitors[monitor_index].clients {
            if let Some(client) = self.clients.get_mut(window) {
                client.task_width = model.task_width(*window);
            }
        }
        self.ws.draw_bar(bar, &model)
    }

    pub(crate) fn draw_bars(&mut self) -> WmResult<()> {
        for monitor_index in 0..self.monitors.len() {
            self.draw_bar(monitor_index)?;
        }
        Ok(())
    }

    /// Re-reads the status text from the root window name.
    pub(crate) fn update_status(&mut self) {
        let text = self
            .ws
            .status_text()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());
        self.status = parse_status(&text);
    }
}
