pub mod bar;
pub mod client;
pub mod config;
pub mod errors;
pub mod keyboard;
pub mod layout;
pub mod monitor;
pub mod rules;
pub mod size_hints;
pub mod spawn;
pub mod window_manager;
pub mod window_system;
pub mod x11;

pub mod prelude {
    pub use crate::ColorScheme;
    pub use crate::Config;
    pub use crate::keyboard::{Arg, ButtonBinding, ClickTarget, KeyAction, KeyBinding, keysyms};
    pub use crate::layout::{GapConfig, LayoutType};
    pub use crate::rules::Rule;
    pub use x11rb::protocol::xproto::KeyButMask;
}

use crate::keyboard::keysyms::{self, Keysym};
use crate::keyboard::{Arg, ButtonBinding, ClickTarget, KeyAction, KeyBinding};
use crate::layout::{GapConfig, LayoutType};
use crate::rules::Rule;
use crate::spawn::shell_command;
use x11rb::protocol::xproto::KeyButMask;

#[derive(Debug, Clone)]
pub struct Config {
    // Appearance
    pub border_width: i32,
    pub snap: i32,
    pub font: String,
    pub gaps: GapConfig,
    pub overview_gaps: GapConfig,

    // Layout
    pub master_factor: f32,
    pub num_master: i32,
    /// The first entry is the default; the first two seed the two layout slots.
    pub layouts: Vec<LayoutType>,
    pub attach_at_head: bool,

    // Bar
    pub show_bar: bool,
    pub top_bar: bool,

    // Tags
    pub tags: Vec<String>,
    pub overview_tag: String,

    // Scratchpad
    pub scratchpad_name: String,
    pub scratchpad_command: Vec<String>,

    // Commands
    /// Receives `<signal> <L|M|R|U|D>` when the status text is clicked.
    pub status_command: Option<String>,
    pub autostart: Vec<String>,

    // Bindings
    pub modkey: KeyButMask,
    pub keybindings: Vec<KeyBinding>,
    pub buttonbindings: Vec<ButtonBinding>,
    pub rules: Vec<Rule>,

    // Colour schemes
    pub scheme_normal: ColorScheme,
    pub scheme_selected: ColorScheme,
    pub scheme_global: ColorScheme,
    pub scheme_hidden: ColorScheme,
    pub scheme_tag_normal: ColorScheme,
    pub scheme_tag_selected: ColorScheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub foreground: u32,
    pub background: u32,
    pub border: u32,
}

impl Config {
    /// Mask covering every configured tag.
    pub fn all_tags(&self) -> u32 {
        match self.tags.len() {
            0 => 0,
            count if count >= 32 => u32::MAX,
            count => (1 << count) - 1,
        }
    }
}

fn tag_keys(modkey: KeyButMask, keysym: Keysym, tag: i32, fallback: Option<&str>) -> Vec<KeyBinding> {
    let view_arg = match fallback {
        Some(command) => Arg::TagCommand(tag, command.to_string()),
        None => Arg::Int(tag),
    };
    vec![
        KeyBinding::new(vec![modkey], keysym, KeyAction::ViewTag, view_arg),
        KeyBinding::new(vec![modkey, KeyButMask::SHIFT], keysym, KeyAction::MoveToTag, Arg::Int(tag)),
        KeyBinding::new(vec![modkey, KeyButMask::CONTROL], keysym, KeyAction::ToggleView, Arg::Int(tag)),
    ]
}

impl Default for Config {
    fn default() -> Self {
        const MODKEY: KeyButMask = KeyButMask::MOD4;
        const SHIFT: KeyButMask = KeyButMask::SHIFT;
        const CONTROL: KeyButMask = KeyButMask::CONTROL;
        const ALT: KeyButMask = KeyButMask::MOD1;

        let spawn = |modifiers: Vec<KeyButMask>, keysym: Keysym, command: &str| {
            KeyBinding::new(modifiers, keysym, KeyAction::Spawn, Arg::Array(shell_command(command)))
        };
        let bind = |modifiers: Vec<KeyButMask>, keysym: Keysym, action: KeyAction, arg: Arg| {
            KeyBinding::new(modifiers, keysym, action, arg)
        };

        let mut keybindings = vec![
            bind(vec![MODKEY], keysyms::XK_TAB, KeyAction::FocusStack, Arg::Int(1)),
            bind(vec![MODKEY, SHIFT], keysyms::XK_TAB, KeyAction::FocusStack, Arg::Int(-1)),
            bind(vec![MODKEY], keysyms::XK_UP, KeyAction::FocusStack, Arg::Int(-1)),
            bind(vec![MODKEY], keysyms::XK_DOWN, KeyAction::FocusStack, Arg::Int(1)),
            bind(vec![MODKEY], keysyms::XK_LEFT, KeyAction::ViewLeft, Arg::None),
            bind(vec![MODKEY], keysyms::XK_RIGHT, KeyAction::ViewRight, Arg::None),
            bind(vec![MODKEY, SHIFT], keysyms::XK_LEFT, KeyAction::TagLeft, Arg::None),
            bind(vec![MODKEY, SHIFT], keysyms::XK_RIGHT, KeyAction::TagRight, Arg::None),
            bind(vec![MODKEY], keysyms::XK_A, KeyAction::ToggleOverview, Arg::None),
            bind(vec![MODKEY], keysyms::XK_COMMA, KeyAction::SetMasterFactor, Arg::Float(-0.05)),
            bind(vec![MODKEY], keysyms::XK_PERIOD, KeyAction::SetMasterFactor, Arg::Float(0.05)),
            bind(vec![MODKEY], keysyms::XK_H, KeyAction::HideWindow, Arg::None),
            bind(vec![MODKEY, SHIFT], keysyms::XK_H, KeyAction::RestoreWindow, Arg::None),
            bind(vec![MODKEY, SHIFT], keysyms::XK_RETURN, KeyAction::Zoom, Arg::None),
            bind(vec![MODKEY], keysyms::XK_T, KeyAction::ToggleFloating, Arg::None),
            bind(vec![MODKEY, SHIFT], keysyms::XK_T, KeyAction::ToggleAllFloating, Arg::None),
            bind(vec![MODKEY], keysyms::XK_F, KeyAction::ToggleFullScreen, Arg::None),
            bind(vec![MODKEY, SHIFT], keysyms::XK_F, KeyAction::ToggleBar, Arg::None),
            bind(vec![MODKEY], keysyms::XK_G, KeyAction::ToggleGlobal, Arg::None),
            bind(vec![MODKEY], keysyms::XK_E, KeyAction::IncNumMaster, Arg::Int(1)),
            bind(vec![MODKEY], keysyms::XK_B, KeyAction::FocusMonitor, Arg::Int(1)),
            bind(vec![MODKEY, SHIFT], keysyms::XK_B, KeyAction::TagMonitor, Arg::Int(1)),
            bind(vec![MODKEY], keysyms::XK_Q, KeyAction::KillClient, Arg::None),
            bind(vec![MODKEY, CONTROL], keysyms::XK_Q, KeyAction::ForceKillClient, Arg::None),
            bind(vec![MODKEY, CONTROL], keysyms::XK_F12, KeyAction::Quit, Arg::None),
            bind(vec![MODKEY, CONTROL], keysyms::XK_F11, KeyAction::Restart, Arg::None),
            bind(vec![MODKEY, SHIFT], keysyms::XK_SPACE, KeyAction::SelectLayout, Arg::Int(1)),
            bind(vec![MODKEY], keysyms::XK_O, KeyAction::ShowOnlyOrAll, Arg::None),
            bind(vec![MODKEY, CONTROL], keysyms::XK_EQUAL, KeyAction::SetGap, Arg::Int(-6)),
            bind(vec![MODKEY, CONTROL], keysyms::XK_MINUS, KeyAction::SetGap, Arg::Int(6)),
            bind(vec![MODKEY, CONTROL], keysyms::XK_SPACE, KeyAction::SetGap, Arg::Int(0)),
            bind(vec![MODKEY, CONTROL], keysyms::XK_UP, KeyAction::MoveWindow, Arg::Int(0)),
            bind(vec![MODKEY, CONTROL], keysyms::XK_DOWN, KeyAction::MoveWindow, Arg::Int(1)),
            bind(vec![MODKEY, CONTROL], keysyms::XK_LEFT, KeyAction::MoveWindow, Arg::Int(2)),
            bind(vec![MODKEY, CONTROL], keysyms::XK_RIGHT, KeyAction::MoveWindow, Arg::Int(3)),
            bind(vec![MODKEY, ALT], keysyms::XK_UP, KeyAction::ResizeWindow, Arg::Int(1)),
            bind(vec![MODKEY, ALT], keysyms::XK_DOWN, KeyAction::ResizeWindow, Arg::Int(0)),
            bind(vec![MODKEY, ALT], keysyms::XK_LEFT, KeyAction::ResizeWindow, Arg::Int(3)),
            bind(vec![MODKEY, ALT], keysyms::XK_RIGHT, KeyAction::ResizeWindow, Arg::Int(2)),
            bind(
                vec![MODKEY],
                keysyms::XK_S,
                KeyAction::ToggleScratchpad,
                Arg::Array(shell_command("st -t scratchpad -c float")),
            ),
            spawn(vec![MODKEY], keysyms::XK_RETURN, "st"),
            spawn(vec![MODKEY], keysyms::XK_MINUS, "st -c FG"),
            spawn(vec![MODKEY], keysyms::XK_SPACE, "st -c float"),
            spawn(vec![MODKEY], keysyms::XK_D, "rofi -show run"),
            spawn(vec![MODKEY, SHIFT], keysyms::XK_D, "rofi -show drun"),
        ];

        let tag_keysyms = [
            keysyms::XK_1,
            keysyms::XK_2,
            keysyms::XK_3,
            keysyms::XK_4,
            keysyms::XK_5,
            keysyms::XK_6,
            keysyms::XK_7,
            keysyms::XK_8,
            keysyms::XK_9,
        ];
        for (tag, keysym) in tag_keysyms.into_iter().enumerate() {
            keybindings.extend(tag_keys(MODKEY, keysym, tag as i32, None));
        }
        keybindings.push(bind(vec![MODKEY], keysyms::XK_0, KeyAction::ViewTag, Arg::Int(-1)));
        keybindings.push(bind(vec![MODKEY, SHIFT], keysyms::XK_0, KeyAction::MoveToTag, Arg::Int(-1)));

        let button = |target: ClickTarget, modifiers: Vec<KeyButMask>, button: u8, action: KeyAction| {
            ButtonBinding::new(target, modifiers, button, action, Arg::None)
        };

        let buttonbindings = vec![
            button(ClickTarget::WindowTitle, vec![], 1, KeyAction::HideOtherWindows),
            button(ClickTarget::WindowTitle, vec![], 3, KeyAction::ToggleWindow),
            button(ClickTarget::ClientWindow, vec![MODKEY], 1, KeyAction::MoveMouse),
            button(ClickTarget::ClientWindow, vec![MODKEY], 3, KeyAction::ResizeMouse),
            button(ClickTarget::TagBar, vec![], 1, KeyAction::ViewTag),
            button(ClickTarget::TagBar, vec![], 3, KeyAction::ToggleView),
            button(ClickTarget::TagBar, vec![MODKEY], 1, KeyAction::MoveToTag),
            button(ClickTarget::TagBar, vec![], 4, KeyAction::ViewLeft),
            button(ClickTarget::TagBar, vec![], 5, KeyAction::ViewRight),
            button(ClickTarget::LayoutSymbol, vec![], 1, KeyAction::ToggleOverview),
            button(ClickTarget::StatusText, vec![], 1, KeyAction::ClickStatusBar),
            button(ClickTarget::StatusText, vec![], 2, KeyAction::ClickStatusBar),
            button(ClickTarget::StatusText, vec![], 3, KeyAction::ClickStatusBar),
            button(ClickTarget::StatusText, vec![], 4, KeyAction::ClickStatusBar),
            button(ClickTarget::StatusText, vec![], 5, KeyAction::ClickStatusBar),
        ];

        let rule = |class: &str, tags: u32, is_floating: bool, is_global: bool, is_no_border: bool| Rule {
            class: Some(class.to_string()),
            tags,
            is_floating,
            is_global,
            is_no_border,
            ..Rule::default()
        };
        let all_tags = (1 << 9) - 1;

        Self {
            border_width: 2,
            snap: 10,
            font: "monospace:size=12".to_string(),
            gaps: GapConfig { inner: 12, outer: 12 },
            overview_gaps: GapConfig { inner: 24, outer: 60 },
            master_factor: 0.6,
            num_master: 1,
            layouts: vec![LayoutType::Tiling, LayoutType::Grid, LayoutType::Monocle, LayoutType::Normie],
            attach_at_head: false,
            show_bar: true,
            top_bar: true,
            tags: (1..=9).map(|tag| tag.to_string()).collect(),
            overview_tag: "OVERVIEW".to_string(),
            scratchpad_name: "scratchpad".to_string(),
            scratchpad_command: shell_command("st -t scratchpad -c float"),
            status_command: None,
            autostart: vec![],
            modkey: MODKEY,
            keybindings,
            buttonbindings,
            rules: vec![
                Rule {
                    title: Some("broken".to_string()),
                    is_floating: true,
                    ..Rule::default()
                },
                rule("flameshot", 0, true, false, false),
                rule("float", 0, true, false, false),
                rule("global", all_tags, false, true, false),
                rule("noborder", 0, false, false, true),
                rule("FG", all_tags, true, true, true),
            ],
            scheme_normal: ColorScheme {
                foreground: 0xbbbbbb,
                background: 0x333333,
                border: 0x444444,
            },
            scheme_selected: ColorScheme {
                foreground: 0xffffff,
                background: 0x37474f,
                border: 0x42a5f5,
            },
            scheme_global: ColorScheme {
                foreground: 0xffffff,
                background: 0x37474f,
                border: 0xffc0cb,
            },
            scheme_hidden: ColorScheme {
                foreground: 0xdddddd,
                background: 0x333333,
                border: 0x444444,
            },
            scheme_tag_normal: ColorScheme {
                foreground: 0xbbbbbb,
                background: 0x333333,
                border: 0x444444,
            },
            scheme_tag_selected: ColorScheme {
                foreground: 0xeeeeee,
                background: 0x333333,
                border: 0x7799aa,
            },
        }
    }
}
