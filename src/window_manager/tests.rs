use super::WindowManager;
use super::mock::{BAR_HEIGHT, Call, MockWindowSystem, RecordingSpawner, ROOT};
use crate::Config;
use crate::errors::{ErrorKind, RequestKind, WmError};
use crate::keyboard::{Arg, KeyAction, keysyms};
use crate::layout::{GapConfig, Rect};
use crate::rules::Rule;
use crate::window_system::{CursorKind, PropertyKind, WindowState, WindowSystem, WmEvent};
use x11rb::protocol::xproto::{KeyButMask, Window};

type TestManager = WindowManager<MockWindowSystem, RecordingSpawner>;

fn test_config() -> Config {
    Config {
        border_width: 0,
        gaps: GapConfig { inner: 0, outer: 0 },
        show_bar: false,
        master_factor: 0.5,
        ..Config::default()
    }
}

fn manager_with(ws: MockWindowSystem, config: Config) -> TestManager {
    WindowManager::new(ws, RecordingSpawner::default(), config).unwrap()
}

fn manager() -> TestManager {
    manager_with(MockWindowSystem::new(1000, 800), test_config())
}

fn map(wm: &mut TestManager, window: Window) {
    wm.handle_event(WmEvent::MapRequest { window }).unwrap();
}

fn geometry(wm: &TestManager, window: Window) -> Rect {
    wm.clients[&window].geometry()
}

/// Every monitor with a shown client selects exactly one shown client.
fn assert_focus_invariant(wm: &TestManager) {
    for (index, monitor) in wm.monitors.iter().enumerate() {
        let any_shown = !wm.shown_clients(index).is_empty();
        match monitor.selected_client {
            Some(window) => {
                assert!(wm.clients.contains_key(&window), "selection {:#x} is not managed", window);
                assert!(wm.is_shown(window), "selection {:#x} is not shown", window);
            }
            None => assert!(!any_shown, "monitor {} has shown clients but no selection", index),
        }
    }
}

#[test]
fn three_clients_split_into_master_and_stack() {
    let mut wm = manager();
    for window in [11, 12, 13] {
        map(&mut wm, window);
    }

    assert_eq!(geometry(&wm, 11), Rect::new(0, 0, 500, 800));
    assert_eq!(geometry(&wm, 12), Rect::new(500, 0, 500, 400));
    assert_eq!(geometry(&wm, 13), Rect::new(500, 400, 500, 400));
    assert_focus_invariant(&wm);
}

#[test]
fn newest_client_takes_focus() {
    let mut wm = manager();
    map(&mut wm, 11);
    map(&mut wm, 12);

    assert_eq!(wm.selected_client(), Some(12));
    assert_eq!(wm.monitors[0].stack, vec![12, 11]);
    assert!(wm.ws.calls.borrow().contains(&Call::Focus(Some(12))));
}

#[test]
fn destroyed_selection_falls_back_to_previous_focus() {
    let mut wm = manager();
    for window in [11, 12, 13] {
        map(&mut wm, window);
    }
    wm.handle_event(WmEvent::DestroyNotify { window: 13 }).unwrap();

    assert!(!wm.clients.contains_key(&13));
    assert_eq!(wm.selected_client(), Some(12));
    assert_eq!(wm.monitors[0].clients, vec![11, 12]);
    assert_focus_invariant(&wm);
}

#[test]
fn unmanaging_the_last_client_clears_the_selection() {
    let mut wm = manager();
    map(&mut wm, 11);
    wm.handle_event(WmEvent::UnmapNotify {
        window: 11,
        synthetic: false,
    })
    .unwrap();

    assert!(wm.clients.is_empty());
    assert_eq!(wm.selected_client(), None);
    assert_eq!(wm.ws.client_state(11), Some(WindowState::Withdrawn));
}

#[test]
fn hide_then_restore_keeps_geometry() {
    let mut wm = manager();
    map(&mut wm, 11);
    map(&mut wm, 12);
    let before = geometry(&wm, 12);

    wm.dispatch(KeyAction::HideWindow, &Arg::None).unwrap();
    assert!(wm.clients[&12].is_hidden);
    assert_eq!(wm.ws.client_state(12), Some(WindowState::Iconic));
    assert_eq!(wm.hidden_stack, vec![12]);
    assert_eq!(wm.selected_client(), Some(11));
    assert_eq!(geometry(&wm, 11), Rect::new(0, 0, 1000, 800));
    assert_focus_invariant(&wm);

    let calls = wm.ws.calls.borrow().clone();
    let muted = calls.iter().position(|call| *call == Call::Mute(12)).unwrap();
    let unmapped = calls.iter().position(|call| *call == Call::Unmap(12)).unwrap();
    let restored = calls.iter().position(|call| *call == Call::Restore(12)).unwrap();
    assert!(muted < unmapped && unmapped < restored);

    wm.dispatch(KeyAction::RestoreWindow, &Arg::None).unwrap();
    assert!(!wm.clients[&12].is_hidden);
    assert_eq!(wm.ws.client_state(12), Some(WindowState::Normal));
    assert_eq!(geometry(&wm, 12), before);
    assert_eq!(wm.tiled_clients(0), vec![11, 12]);
    assert_eq!(wm.selected_client(), Some(12));
    assert!(wm.hidden_stack.is_empty());
}

#[test]
fn hidden_history_is_bounded() {
    let mut wm = manager();
    for window in 0..(super::HIDDEN_STACK_CAPACITY as Window + 5) {
        wm.push_hidden(window + 100);
    }
    assert_eq!(wm.hidden_stack.len(), super::HIDDEN_STACK_CAPACITY);
    assert_eq!(wm.hidden_stack[0], 105);
}

#[test]
fn hide_others_leaves_one_window_shown() {
    let mut wm = manager();
    for window in [11, 12, 13] {
        map(&mut wm, window);
    }
    wm.dispatch(KeyAction::HideOtherWindows, &Arg::Window(12)).unwrap();

    assert_eq!(wm.shown_clients(0), vec![12]);
    assert!(wm.is_single_window());
    assert_eq!(wm.selected_client(), Some(12));

    wm.dispatch(KeyAction::ShowOnlyOrAll, &Arg::None).unwrap();
    assert_eq!(wm.shown_clients(0), vec![11, 12, 13]);
}

#[test]
fn returning_to_the_previous_view_restores_its_settings() {
    let mut wm = manager();

    wm.dispatch(KeyAction::ViewTag, &Arg::Int(1)).unwrap();
    wm.dispatch(KeyAction::SetMasterFactor, &Arg::Float(1.25)).unwrap();
    wm.dispatch(KeyAction::SetLayout, &Arg::None).unwrap();
    let snapshot = *wm.monitors[0].pertag.current();

    wm.dispatch(KeyAction::ViewTag, &Arg::Int(2)).unwrap();
    assert_eq!(wm.monitors[0].active_tags(), 1 << 2);
    assert_eq!(wm.monitors[0].master_factor, 0.5);
    assert_eq!(wm.monitors[0].selected_layout, 0);

    wm.dispatch(KeyAction::ViewTag, &Arg::None).unwrap();
    let monitor = &wm.monitors[0];
    assert_eq!(monitor.active_tags(), 1 << 1);
    assert_eq!(monitor.master_factor, 0.25);
    assert_eq!(monitor.selected_layout, 1);
    assert_eq!(monitor.num_master, snapshot.num_master);
    assert_eq!(monitor.layouts, snapshot.layouts);
    assert_eq!(monitor.show_bar, snapshot.show_bar);
}

#[test]
fn empty_view_runs_its_fallback_command() {
    let mut wm = manager();
    map(&mut wm, 11);

    wm.dispatch(KeyAction::ViewTag, &Arg::TagCommand(3, "firefox".to_string()))
        .unwrap();
    wm.dispatch(KeyAction::ViewTag, &Arg::TagCommand(0, "st".to_string()))
        .unwrap();

    assert_eq!(
        *wm.spawner.commands.borrow(),
        vec![vec!["sh".to_string(), "-c".to_string(), "firefox".to_string()]]
    );
}

#[test]
fn rule_without_tags_uses_the_active_view() {
    let mut ws = MockWindowSystem::new(1000, 800);
    ws.classes.insert(30, ("tagless".to_string(), "Tagless".to_string()));
    let config = Config {
        rules: vec![Rule {
            class: Some("Tagless".to_string()),
            is_floating: true,
            ..Rule::default()
        }],
        ..test_config()
    };
    let mut wm = manager_with(ws, config);

    wm.dispatch(KeyAction::ViewTag, &Arg::Int(2)).unwrap();
    map(&mut wm, 30);

    let client = &wm.clients[&30];
    assert_eq!(client.tags, 1 << 2);
    assert!(client.is_floating);
}

#[test]
fn transient_inherits_parent_tags() {
    let mut ws = MockWindowSystem::new(1000, 800);
    ws.transients.insert(41, 40);
    let mut wm = manager_with(ws, test_config());

    wm.dispatch(KeyAction::ViewTag, &Arg::Int(4)).unwrap();
    map(&mut wm, 40);
    wm.dispatch(KeyAction::ViewTag, &Arg::Int(0)).unwrap();
    map(&mut wm, 41);

    assert_eq!(wm.clients[&41].tags, 1 << 4);
    assert!(wm.clients[&41].is_floating);
}

#[test]
fn scratchpad_spawns_then_toggles() {
    let mut ws = MockWindowSystem::new(1000, 800);
    ws.titles.insert(20, "scratchpad".to_string());
    let mut wm = manager_with(ws, test_config());

    wm.dispatch(KeyAction::ToggleScratchpad, &Arg::None).unwrap();
    assert_eq!(wm.spawner.commands.borrow().len(), 1);
    assert_eq!(
        wm.spawner.commands.borrow()[0],
        wm.config.scratchpad_command.clone()
    );

    map(&mut wm, 20);
    assert!(wm.clients[&20].is_scratchpad);
    assert!(wm.clients[&20].is_global);

    wm.dispatch(KeyAction::ToggleScratchpad, &Arg::None).unwrap();
    assert!(wm.clients[&20].is_hidden);

    wm.dispatch(KeyAction::ToggleScratchpad, &Arg::None).unwrap();
    assert!(!wm.clients[&20].is_hidden);
    assert_eq!(wm.selected_client(), Some(20));
    assert_eq!(wm.spawner.commands.borrow().len(), 1);
}

#[test]
fn scratchpad_stays_global() {
    let mut ws = MockWindowSystem::new(1000, 800);
    ws.titles.insert(20, "scratchpad".to_string());
    let mut wm = manager_with(ws, test_config());
    map(&mut wm, 20);

    wm.dispatch(KeyAction::ToggleGlobal, &Arg::None).unwrap();
    assert!(wm.clients[&20].is_global);

    wm.dispatch(KeyAction::ViewTag, &Arg::Int(5)).unwrap();
    assert!(wm.is_shown(20));
}

#[test]
fn toggle_global_pins_and_unpins() {
    let mut wm = manager();
    map(&mut wm, 11);

    wm.dispatch(KeyAction::ToggleGlobal, &Arg::None).unwrap();
    assert!(wm.clients[&11].is_global);
    assert_eq!(wm.clients[&11].tags, wm.all_tags);

    wm.dispatch(KeyAction::ToggleGlobal, &Arg::None).unwrap();
    assert!(!wm.clients[&11].is_global);
    assert_eq!(wm.clients[&11].tags, 1);
}

fn floating_window(wm_ws: &mut MockWindowSystem, window: Window, geometry: Rect) {
    wm_ws
        .classes
        .insert(window, ("float".to_string(), "float".to_string()));
    wm_ws.geometries.insert(window, geometry);
}

#[test]
fn drag_applies_rate_limited_motion_and_defers_other_events() {
    let mut ws = MockWindowSystem::new(1000, 800);
    floating_window(&mut ws, 11, Rect::new(100, 100, 200, 100));
    let mut wm = manager_with(ws, test_config());
    map(&mut wm, 11);
    assert_eq!(geometry(&wm, 11), Rect::new(100, 100, 200, 100));

    wm.ws.pointer.set((150, 150));
    let motion = |x, y, time| WmEvent::MotionNotify {
        window: ROOT,
        root_x: x,
        root_y: y,
        time,
    };
    wm.ws.events.extend([
        motion(200, 200, 100),
        WmEvent::DestroyNotify { window: 11 },
        motion(210, 210, 104),
        WmEvent::Expose { window: ROOT, count: 0 },
        motion(250, 230, 120),
    ]);
    wm.ws.clear();

    wm.dispatch(KeyAction::MoveMouse, &Arg::None).unwrap();

    assert_eq!(geometry(&wm, 11), Rect::new(200, 180, 200, 100));
    let moves = wm
        .ws
        .count(|call| matches!(call, Call::MoveResize(11, _, _)));
    assert_eq!(moves, 2);
    assert_eq!(
        wm.ws
            .count(|call| matches!(call, Call::MoveResize(11, rect, _) if rect.x == 160)),
        0
    );
    assert!(wm.ws.calls.borrow().contains(&Call::GrabPointer(CursorKind::Move)));
    assert!(wm.ws.calls.borrow().contains(&Call::UngrabPointer));

    assert!(wm.clients.contains_key(&11));
    assert_eq!(
        wm.deferred.iter().copied().collect::<Vec<_>>(),
        vec![WmEvent::DestroyNotify { window: 11 }]
    );
    let replayed = wm.next_event().unwrap();
    wm.handle_event(replayed).unwrap();
    assert!(!wm.clients.contains_key(&11));
}

#[test]
fn drag_snaps_to_the_work_area_edge() {
    let mut ws = MockWindowSystem::new(1000, 800);
    floating_window(&mut ws, 11, Rect::new(100, 100, 200, 100));
    let mut wm = manager_with(ws, test_config());
    map(&mut wm, 11);

    wm.ws.pointer.set((150, 150));
    wm.ws.events.push_back(WmEvent::MotionNotify {
        window: ROOT,
        root_x: 56,
        root_y: 150,
        time: 100,
    });
    wm.dispatch(KeyAction::MoveMouse, &Arg::None).unwrap();

    assert_eq!(geometry(&wm, 11).x, 0);
}

#[test]
fn dragging_a_tiled_client_makes_it_float() {
    let mut wm = manager();
    map(&mut wm, 11);
    map(&mut wm, 12);

    wm.ws.pointer.set((700, 400));
    wm.ws.events.push_back(WmEvent::MotionNotify {
        window: ROOT,
        root_x: 640,
        root_y: 450,
        time: 100,
    });
    wm.dispatch(KeyAction::MoveMouse, &Arg::None).unwrap();

    assert!(wm.clients[&12].is_floating);
    assert_eq!(wm.tiled_clients(0), vec![11]);
    assert_eq!(geometry(&wm, 11), Rect::new(0, 0, 1000, 800));
}

#[test]
fn failed_pointer_grab_aborts_the_drag() {
    let mut ws = MockWindowSystem::new(1000, 800);
    floating_window(&mut ws, 11, Rect::new(100, 100, 200, 100));
    ws.grab_succeeds = false;
    let mut wm = manager_with(ws, test_config());
    map(&mut wm, 11);
    wm.ws.events.push_back(WmEvent::MotionNotify {
        window: ROOT,
        root_x: 400,
        root_y: 400,
        time: 100,
    });

    wm.dispatch(KeyAction::ResizeMouse, &Arg::None).unwrap();

    assert_eq!(geometry(&wm, 11), Rect::new(100, 100, 200, 100));
    assert_eq!(wm.ws.events.len(), 1);
    assert!(!wm.ws.calls.borrow().contains(&Call::UngrabPointer));
}

#[test]
fn resize_drag_grows_from_the_far_corner() {
    let mut ws = MockWindowSystem::new(1000, 800);
    floating_window(&mut ws, 11, Rect::new(100, 100, 200, 100));
    let mut wm = manager_with(ws, test_config());
    map(&mut wm, 11);

    wm.ws.pointer.set((280, 180));
    wm.ws.events.push_back(WmEvent::MotionNotify {
        window: ROOT,
        root_x: 399,
        root_y: 249,
        time: 100,
    });
    wm.dispatch(KeyAction::ResizeMouse, &Arg::None).unwrap();

    assert_eq!(geometry(&wm, 11), Rect::new(100, 100, 300, 150));
    assert!(wm.ws.calls.borrow().contains(&Call::Warp(11, 299, 149)));
}

#[test]
fn key_press_runs_the_bound_action() {
    let mut wm = manager();
    wm.handle_event(WmEvent::KeyPress {
        keysym: keysyms::XK_2,
        state: u16::from(KeyButMask::MOD4 | KeyButMask::LOCK),
    })
    .unwrap();

    assert_eq!(wm.monitors[0].active_tags(), 1 << 1);
}

#[test]
fn layout_symbol_click_enters_overview() {
    let config = Config {
        show_bar: true,
        ..test_config()
    };
    let mut wm = manager_with(MockWindowSystem::new(1000, 800), config);
    let bar = wm.monitors[0].bar_window.unwrap();

    // one tag cell of width 10 + padding, then the layout symbol
    let x = 10 + BAR_HEIGHT + 5;
    wm.handle_event(WmEvent::ButtonPress {
        window: bar,
        root_x: x,
        root_y: 5,
        x,
        button: 1,
        state: 0,
    })
    .unwrap();

    assert!(wm.monitors[0].is_overview);
}

#[test]
fn status_click_reports_signal_and_button() {
    let mut ws = MockWindowSystem::new(1000, 800);
    ws.status = Some("^sbattery^BAT 80%".to_string());
    let config = Config {
        status_command: Some("statusctl".to_string()),
        ..test_config()
    };
    let mut wm = manager_with(ws, config);

    wm.dispatch(
        KeyAction::ClickStatusBar,
        &Arg::StatusClick { offset: 15, button: 3 },
    )
    .unwrap();
    // debounced
    wm.dispatch(
        KeyAction::ClickStatusBar,
        &Arg::StatusClick { offset: 15, button: 1 },
    )
    .unwrap();

    assert_eq!(
        *wm.spawner.commands.borrow(),
        vec![vec![
            "sh".to_string(),
            "-c".to_string(),
            "statusctl battery R".to_string()
        ]]
    );
}

#[test]
fn root_name_change_rereads_status() {
    let mut wm = manager();
    wm.ws.status = Some("load 0.42".to_string());
    wm.handle_event(WmEvent::PropertyNotify {
        window: ROOT,
        property: PropertyKind::Name,
        deleted: false,
    })
    .unwrap();

    assert_eq!(wm.status.len(), 1);
    assert_eq!(wm.status[0].text, "load 0.42");
}

#[test]
fn benign_protocol_errors_are_swallowed() {
    let mut wm = manager();
    assert!(
        wm.handle_event(WmEvent::ProtocolError {
            request: RequestKind::ConfigureWindow,
            error: ErrorKind::Window,
        })
        .is_ok()
    );

    let fatal = wm.handle_event(WmEvent::ProtocolError {
        request: RequestKind::Other(1),
        error: ErrorKind::Match,
    });
    assert!(matches!(fatal, Err(WmError::FatalProtocol { .. })));
}

#[test]
fn fullscreen_covers_the_monitor_and_hides_the_bar() {
    let config = Config {
        show_bar: true,
        ..test_config()
    };
    let mut wm = manager_with(MockWindowSystem::new(1000, 800), config);
    map(&mut wm, 11);
    map(&mut wm, 12);
    assert_eq!(geometry(&wm, 12), Rect::new(500, BAR_HEIGHT, 500, 800 - BAR_HEIGHT));

    wm.dispatch(KeyAction::ToggleFullScreen, &Arg::None).unwrap();
    assert!(wm.clients[&12].is_fullscreen);
    assert!(!wm.monitors[0].show_bar);
    assert_eq!(geometry(&wm, 12), Rect::new(0, 0, 1000, 800));
    assert_eq!(geometry(&wm, 11), Rect::new(0, 0, 1000, 800));

    wm.dispatch(KeyAction::ToggleFullScreen, &Arg::None).unwrap();
    assert!(!wm.clients[&12].is_fullscreen);
    assert!(wm.monitors[0].show_bar);
    assert_eq!(geometry(&wm, 12), Rect::new(500, BAR_HEIGHT, 500, 800 - BAR_HEIGHT));
}

#[test]
fn quit_stops_the_loop() {
    let mut wm = manager();
    wm.dispatch(KeyAction::Quit, &Arg::None).unwrap();
    assert!(!wm.running);
    assert!(!wm.restart);

    wm.dispatch(KeyAction::Restart, &Arg::None).unwrap();
    assert!(wm.restart);
}

#[test]
fn hiding_holds_and_releases_the_server_grab() {
    let mut wm = manager();
    map(&mut wm, 11);
    map(&mut wm, 12);

    wm.dispatch(KeyAction::HideWindow, &Arg::None).unwrap();
    assert_eq!(wm.ws.server_grabs.get(), 0);

    wm.ws.unmap_fails = true;
    wm.ws.clear();
    assert!(wm.dispatch(KeyAction::HideWindow, &Arg::None).is_err());
    assert!(wm.ws.calls.borrow().contains(&Call::Restore(11)));
    assert_eq!(wm.ws.server_grabs.get(), 0);
    assert!(!wm.clients[&11].is_hidden);
}

#[test]
fn toggle_view_never_empties_the_view() {
    let mut wm = manager();
    assert_eq!(wm.monitors[0].active_tags(), 0b1);

    wm.dispatch(KeyAction::ToggleView, &Arg::Int(0)).unwrap();
    assert_eq!(wm.monitors[0].active_tags(), 0b1);

    wm.dispatch(KeyAction::ToggleView, &Arg::Int(1)).unwrap();
    assert_eq!(wm.monitors[0].active_tags(), 0b11);
    wm.dispatch(KeyAction::ToggleView, &Arg::Int(0)).unwrap();
    assert_eq!(wm.monitors[0].active_tags(), 0b10);
}

#[test]
fn restack_raises_floating_selection_and_chains_tiled_below_the_bar() {
    let mut wm = manager();
    for window in [11, 12, 13] {
        map(&mut wm, window);
    }
    wm.dispatch(KeyAction::ToggleFloating, &Arg::None).unwrap();
    assert!(wm.clients[&13].is_floating);

    wm.ws.clear();
    wm.restack(0).unwrap();

    let bar = wm.monitors[0].bar_window.unwrap();
    let calls = wm.ws.calls.borrow().clone();
    let raised = calls.iter().position(|call| *call == Call::Raise(13)).unwrap();
    let stacked = calls
        .iter()
        .position(|call| *call == Call::Stack(bar, vec![12, 11]))
        .unwrap();
    assert!(raised < stacked);
}

#[test]
fn overview_lays_out_clients_from_every_tag() {
    let mut wm = manager();
    map(&mut wm, 11);
    map(&mut wm, 12);
    wm.dispatch(KeyAction::MoveToTag, &Arg::Int(2)).unwrap();
    assert_eq!(wm.shown_clients(0), vec![11]);

    wm.dispatch(KeyAction::ToggleOverview, &Arg::None).unwrap();
    assert!(wm.monitors[0].is_overview);
    assert_eq!(wm.tiled_clients(0), vec![11, 12]);

    let (first, second) = (geometry(&wm, 11), geometry(&wm, 12));
    assert_ne!(first, second);
    for rect in [first, second] {
        assert!(rect.x >= 0 && rect.x + rect.width <= 1000, "{:?} leaves the screen", rect);
    }
    assert_focus_invariant(&wm);
}

#[test]
fn restore_skips_stale_history_entries() {
    let mut wm = manager();
    for window in [11, 12, 13] {
        map(&mut wm, window);
    }
    wm.dispatch(KeyAction::HideWindow, &Arg::None).unwrap();
    wm.dispatch(KeyAction::HideWindow, &Arg::None).unwrap();
    assert_eq!(wm.hidden_stack, vec![13, 12]);

    // 12 is hidden on a tag out of view, 11 was never hidden.
    wm.clients.get_mut(&12).unwrap().tags = 0b10;
    wm.push_hidden(11);

    wm.dispatch(KeyAction::RestoreWindow, &Arg::None).unwrap();
    assert!(!wm.clients[&13].is_hidden);
    assert_eq!(wm.selected_client(), Some(13));
    assert_eq!(wm.hidden_stack, vec![12, 11]);

    wm.dispatch(KeyAction::RestoreWindow, &Arg::None).unwrap();
    assert!(wm.clients[&12].is_hidden);
    assert_eq!(wm.hidden_stack, vec![12, 11]);
    assert_focus_invariant(&wm);
}

fn dual_head_manager(config: Config) -> TestManager {
    let mut ws = MockWindowSystem::new(2000, 800);
    ws.screens = vec![Rect::new(0, 0, 1000, 800), Rect::new(1000, 0, 1000, 800)];
    manager_with(ws, config)
}

#[test]
fn rule_sending_an_off_view_client_elsewhere_keeps_that_selection() {
    let mut config = test_config();
    config.rules = vec![Rule {
        class: Some("mail".to_string()),
        tags: 1 << 3,
        monitor: Some(1),
        ..Rule::default()
    }];
    let mut wm = dual_head_manager(config);

    wm.dispatch(KeyAction::FocusMonitor, &Arg::Int(1)).unwrap();
    map(&mut wm, 20);
    wm.dispatch(KeyAction::FocusMonitor, &Arg::Int(-1)).unwrap();
    assert_eq!(wm.selected_monitor, 0);

    wm.ws
        .classes
        .insert(31, ("mail".to_string(), "mail".to_string()));
    map(&mut wm, 31);

    assert_eq!(wm.clients[&31].monitor_index, 1);
    assert_eq!(wm.clients[&31].tags, 1 << 3);
    assert_eq!(wm.monitors[1].selected_client, Some(20));
    assert_focus_invariant(&wm);
}

#[test]
fn floating_rule_client_is_centred_on_its_own_monitor() {
    let mut config = test_config();
    config.rules = vec![Rule {
        class: Some("float".to_string()),
        is_floating: true,
        monitor: Some(1),
        ..Rule::default()
    }];
    let mut wm = dual_head_manager(config);
    wm.ws.geometries.insert(31, Rect::new(0, 0, 400, 200));
    wm.ws
        .classes
        .insert(31, ("float".to_string(), "float".to_string()));
    map(&mut wm, 31);

    let rect = geometry(&wm, 31);
    assert_eq!(rect.x, 1000 + (1000 - 400) / 2);
    assert_eq!(rect.y, (800 - 200) / 2);
}

#[test]
fn tag_monitor_moves_the_client_onto_the_target_view() {
    let mut wm = dual_head_manager(test_config());
    wm.dispatch(KeyAction::FocusMonitor, &Arg::Int(1)).unwrap();
    wm.dispatch(KeyAction::ViewTag, &Arg::Int(2)).unwrap();
    wm.dispatch(KeyAction::FocusMonitor, &Arg::Int(-1)).unwrap();
    map(&mut wm, 11);

    wm.dispatch(KeyAction::TagMonitor, &Arg::Int(1)).unwrap();

    assert!(wm.monitors[0].clients.is_empty());
    assert!(wm.monitors[0].stack.is_empty());
    assert_eq!(wm.monitors[1].clients, vec![11]);
    assert_eq!(wm.clients[&11].monitor_index, 1);
    assert_eq!(wm.clients[&11].tags, 1 << 2);
    assert_eq!(wm.selected_monitor, 1);
    assert_eq!(wm.selected_client(), Some(11));
    assert_eq!(geometry(&wm, 11), Rect::new(1000, 0, 1000, 800));
    assert_focus_invariant(&wm);
}

#[test]
fn removed_monitor_hands_its_clients_to_the_first_view() {
    let mut wm = dual_head_manager(test_config());
    wm.dispatch(KeyAction::FocusMonitor, &Arg::Int(1)).unwrap();
    wm.dispatch(KeyAction::ViewTag, &Arg::Int(4)).unwrap();
    map(&mut wm, 20);
    assert_eq!(wm.clients[&20].tags, 1 << 4);

    wm.ws.screens = vec![Rect::new(0, 0, 1000, 800)];
    wm.handle_event(WmEvent::ConfigureNotify {
        window: ROOT,
        width: 1000,
        height: 800,
    })
    .unwrap();

    assert_eq!(wm.monitors.len(), 1);
    assert_eq!(wm.clients[&20].monitor_index, 0);
    assert_eq!(wm.clients[&20].tags, wm.monitors[0].active_tags());
    assert_eq!(wm.shown_clients(0), vec![20]);
    assert_eq!(wm.selected_client(), Some(20));
    assert_focus_invariant(&wm);
}

#[test]
fn leaving_overview_views_the_tags_of_the_chosen_client() {
    let mut wm = manager();
    map(&mut wm, 11);
    map(&mut wm, 12);
    wm.dispatch(KeyAction::MoveToTag, &Arg::Int(2)).unwrap();

    wm.dispatch(KeyAction::ToggleOverview, &Arg::None).unwrap();
    assert_eq!(wm.monitors[0].active_tags(), 0b1);
    wm.focus(Some(12)).unwrap();

    wm.dispatch(KeyAction::ToggleOverview, &Arg::None).unwrap();
    assert!(!wm.monitors[0].is_overview);
    assert_eq!(wm.monitors[0].active_tags(), 1 << 2);
    assert_eq!(wm.selected_client(), Some(12));
    assert_focus_invariant(&wm);
}

#[test]
fn leaving_overview_on_a_global_client_keeps_the_view() {
    let mut wm = manager();
    map(&mut wm, 11);
    wm.dispatch(KeyAction::ToggleGlobal, &Arg::None).unwrap();

    wm.dispatch(KeyAction::ToggleOverview, &Arg::None).unwrap();
    wm.dispatch(KeyAction::ToggleOverview, &Arg::None).unwrap();

    assert!(!wm.monitors[0].is_overview);
    assert_eq!(wm.monitors[0].active_tags(), 0b1);
    assert_eq!(wm.selected_client(), Some(11));
}
