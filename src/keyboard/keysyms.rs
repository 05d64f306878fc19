//! X keysym values used by the default bindings and by key names in the
//! config file. Latin letters and digits share their lowercase ASCII code.

pub type Keysym = u32;

pub const XK_0: Keysym = 0x0030;
pub const XK_1: Keysym = 0x0031;
pub const XK_2: Keysym = 0x0032;
pub const XK_3: Keysym = 0x0033;
pub const XK_4: Keysym = 0x0034;
pub const XK_5: Keysym = 0x0035;
pub const XK_6: Keysym = 0x0036;
pub const XK_7: Keysym = 0x0037;
pub const XK_8: Keysym = 0x0038;
pub const XK_9: Keysym = 0x0039;

pub const XK_A: Keysym = 0x0061;
pub const XK_B: Keysym = 0x0062;
pub const XK_D: Keysym = 0x0064;
pub const XK_E: Keysym = 0x0065;
pub const XK_F: Keysym = 0x0066;
pub const XK_G: Keysym = 0x0067;
pub const XK_H: Keysym = 0x0068;
pub const XK_J: Keysym = 0x006a;
pub const XK_K: Keysym = 0x006b;
pub const XK_O: Keysym = 0x006f;
pub const XK_Q: Keysym = 0x0071;
pub const XK_S: Keysym = 0x0073;
pub const XK_T: Keysym = 0x0074;

pub const XK_SPACE: Keysym = 0x0020;
pub const XK_COMMA: Keysym = 0x002c;
pub const XK_MINUS: Keysym = 0x002d;
pub const XK_PERIOD: Keysym = 0x002e;
pub const XK_EQUAL: Keysym = 0x003d;

pub const XK_TAB: Keysym = 0xff09;
pub const XK_RETURN: Keysym = 0xff0d;
pub const XK_LEFT: Keysym = 0xff51;
pub const XK_UP: Keysym = 0xff52;
pub const XK_RIGHT: Keysym = 0xff53;
pub const XK_DOWN: Keysym = 0xff54;
pub const XK_NUM_LOCK: Keysym = 0xff7f;
pub const XK_F11: Keysym = 0xffc8;
pub const XK_F12: Keysym = 0xffc9;

/// Named keys accepted in the config, matched case-insensitively.
const NAMED: &[(&str, Keysym)] = &[
    ("return", XK_RETURN),
    ("enter", XK_RETURN),
    ("escape", 0xff1b),
    ("space", XK_SPACE),
    ("tab", XK_TAB),
    ("backspace", 0xff08),
    ("delete", 0xffff),
    ("left", XK_LEFT),
    ("right", XK_RIGHT),
    ("up", XK_UP),
    ("down", XK_DOWN),
    ("home", 0xff50),
    ("end", 0xff57),
    ("pageup", 0xff55),
    ("pagedown", 0xff56),
    ("insert", 0xff63),
    ("print", 0xff61),
    ("minus", XK_MINUS),
    ("equal", XK_EQUAL),
    ("comma", XK_COMMA),
    ("period", XK_PERIOD),
    ("slash", 0x002f),
    ("semicolon", 0x003b),
    ("apostrophe", 0x0027),
    ("grave", 0x0060),
    ("backslash", 0x005c),
    ("bracketleft", 0x005b),
    ("bracketright", 0x005d),
    ("audioraisevolume", 0x1008ff13),
    ("audiolowervolume", 0x1008ff11),
    ("audiomute", 0x1008ff12),
    ("monbrightnessup", 0x1008ff02),
    ("monbrightnessdown", 0x1008ff03),
];

/// Keysym for a config key name: a single letter or digit, `F1` to `F12`,
/// or one of the named keys such as `Return` or `PageUp`.
pub fn from_name(name: &str) -> Option<Keysym> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c
            .is_ascii_alphanumeric()
            .then(|| Keysym::from(c.to_ascii_lowercase()));
    }

    let lower = name.to_ascii_lowercase();
    if let Some(number) = lower.strip_prefix('f').and_then(|n| n.parse::<Keysym>().ok()) {
        // F1 is 0xffbe and the rest follow consecutively.
        return (1..=12).contains(&number).then(|| 0xffbe + number - 1);
    }

    NAMED
        .iter()
        .find(|(named, _)| *named == lower)
        .map(|&(_, keysym)| keysym)
}
