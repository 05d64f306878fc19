use crate::keyboard::keysyms::Keysym;
use serde::Deserialize;
use x11rb::protocol::xproto::{KeyButMask, Window};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum KeyAction {
    Spawn,
    KillClient,
    ForceKillClient,
    FocusStack,
    FocusMonitor,
    TagMonitor,
    ViewTag,
    ToggleView,
    MoveToTag,
    ToggleTag,
    ViewLeft,
    ViewRight,
    TagLeft,
    TagRight,
    IncNumMaster,
    SetMasterFactor,
    SetLayout,
    SelectLayout,
    CycleLayout,
    ToggleFloating,
    ToggleAllFloating,
    ToggleFullScreen,
    ToggleBar,
    ToggleGlobal,
    ToggleScratchpad,
    ToggleOverview,
    SetGap,
    Zoom,
    HideWindow,
    RestoreWindow,
    HideOtherWindows,
    ShowOnlyOrAll,
    ToggleWindow,
    MoveWindow,
    ResizeWindow,
    MoveMouse,
    ResizeMouse,
    ClickStatusBar,
    Quit,
    Restart,
    None,
}

/// Argument carried by a binding.
///
/// `Int` is a tag index for the tag actions (`-1` meaning every tag), a
/// direction for stack and monitor focus, and a direction code
/// (up, down, left, right) for keyboard move and resize.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    None,
    Int(i32),
    Float(f32),
    Str(String),
    Array(Vec<String>),
    /// A tag index plus a command spawned when the tag turns out empty.
    TagCommand(i32, String),
    /// Filled in by the bar for clicks on a task cell.
    Window(Window),
    /// Filled in by the bar for clicks on the status text.
    StatusClick { offset: i32, button: u8 },
}

impl Arg {
    pub const fn none() -> Self {
        Arg::None
    }
}

#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub modifiers: Vec<KeyButMask>,
    pub keysym: Keysym,
    pub func: KeyAction,
    pub arg: Arg,
}

impl KeyBinding {
    pub fn new(modifiers: Vec<KeyButMask>, keysym: Keysym, func: KeyAction, arg: Arg) -> Self {
        Self {
            modifiers,
            keysym,
            func,
            arg,
        }
    }

    pub fn mask(&self) -> u16 {
        modifiers_to_mask(&self.modifiers)
    }
}

/// Bar region or window a button binding applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum ClickTarget {
    TagBar,
    LayoutSymbol,
    StatusText,
    WindowTitle,
    BarEmpty,
    ClientWindow,
    RootWindow,
}

#[derive(Debug, Clone)]
pub struct ButtonBinding {
    pub target: ClickTarget,
    pub modifiers: Vec<KeyButMask>,
    pub button: u8,
    pub func: KeyAction,
    pub arg: Arg,
}

impl ButtonBinding {
    pub fn new(
        target: ClickTarget,
        modifiers: Vec<KeyButMask>,
        button: u8,
        func: KeyAction,
        arg: Arg,
    ) -> Self {
        Self {
            target,
            modifiers,
            button,
            func,
            arg,
        }
    }

    pub fn mask(&self) -> u16 {
        modifiers_to_mask(&self.modifiers)
    }
}

pub fn modifiers_to_mask(modifiers: &[KeyButMask]) -> u16 {
    modifiers
        .iter()
        .fold(0u16, |acc, &modifier| acc | u16::from(modifier))
}

/// Strips lock modifiers and mouse button bits so bindings match whatever
/// the state of caps lock and num lock.
pub fn clean_mask(mask: u16, numlock_mask: u16) -> u16 {
    let modifiers = u16::from(
        KeyButMask::SHIFT
            | KeyButMask::CONTROL
            | KeyButMask::MOD1
            | KeyButMask::MOD2
            | KeyButMask::MOD3
            | KeyButMask::MOD4
            | KeyButMask::MOD5,
    );
    mask & !(numlock_mask | u16::from(KeyButMask::LOCK)) & modifiers
}

pub fn find_key_binding<'a>(
    bindings: &'a [KeyBinding],
    keysym: Keysym,
    state: u16,
    numlock_mask: u16,
) -> Option<&'a KeyBinding> {
    let state = clean_mask(state, numlock_mask);
    bindings
        .iter()
        .find(|binding| binding.keysym == keysym && clean_mask(binding.mask(), numlock_mask) == state)
}
