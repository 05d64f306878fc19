//! Status text markup.
//!
//! The root window name is split into literal runs separated by `^...^`
//! codes:
//!
//! * `^c#RRGGBB^` / `^c#RRGGBBAA^` sets the foreground colour,
//! * `^b#RRGGBB^` / `^b#RRGGBBAA^` sets the background colour,
//! * `^d^` resets both to the bar defaults,
//! * `^s<name>^` marks the following text with a click signal.
//!
//! Unknown codes are dropped and an unterminated `^` is kept as text.

pub const DEFAULT_STATUS: &str = "^c#2D1B46^^b#335566^:) ^d^";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusColor {
    pub rgb: u32,
    pub alpha: u8,
}

impl StatusColor {
    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    pub fn parse(code: &str) -> Option<Self> {
        let hex = code.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => Some(Self {
                rgb: u32::from_str_radix(hex, 16).ok()?,
                alpha: 0xff,
            }),
            8 => Some(Self {
                rgb: u32::from_str_radix(&hex[..6], 16).ok()?,
                alpha: u8::from_str_radix(&hex[6..], 16).ok()?,
            }),
            _ => None,
        }
    }
}

/// A literal piece of status text with the styling in effect where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRun {
    pub text: String,
    /// `None` means the bar's normal colour.
    pub foreground: Option<StatusColor>,
    pub background: Option<StatusColor>,
    /// Most recent `^s...^` signal before this run.
    pub signal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusHit<'a> {
    pub run: usize,
    pub text: &'a str,
    pub signal: Option<&'a str>,
}

pub fn parse_status(input: &str) -> Vec<StatusRun> {
    let mut runs = Vec::new();
    let mut foreground = None;
    let mut background = None;
    let mut signal: Option<String> = None;
    let mut rest = input;

    loop {
        let Some(start) = rest.find('^') else {
            push_run(&mut runs, rest, foreground, background, &signal);
            break;
        };
        let Some(length) = rest[start + 1..].find('^') else {
            push_run(&mut runs, rest, foreground, background, &signal);
            break;
        };

        push_run(&mut runs, &rest[..start], foreground, background, &signal);

        let code = &rest[start + 1..start + 1 + length];
        match code.split_at_checked(1) {
            Some(("c", color)) => {
                if let Some(color) = StatusColor::parse(color) {
                    foreground = Some(color);
                }
            }
            Some(("b", color)) => {
                if let Some(color) = StatusColor::parse(color) {
                    background = Some(color);
                }
            }
            Some(("d", _)) => {
                foreground = None;
                background = None;
            }
            Some(("s", name)) => signal = Some(name.to_string()),
            _ => {}
        }

        rest = &rest[start + length + 2..];
    }

    runs
}

fn push_run(
    runs: &mut Vec<StatusRun>,
    text: &str,
    foreground: Option<StatusColor>,
    background: Option<StatusColor>,
    signal: &Option<String>,
) {
    if text.is_empty() {
        return;
    }
    runs.push(StatusRun {
        text: text.to_string(),
        foreground,
        background,
        signal: signal.clone(),
    });
}

pub fn status_width(runs: &[StatusRun], measure: impl Fn(&str) -> i32) -> i32 {
    runs.iter().map(|run| measure(&run.text)).sum()
}

/// Finds the run under `offset` pixels from the left edge of the status
/// text. Offsets past the end resolve to the last run.
pub fn hit_test(runs: &[StatusRun], offset: i32, measure: impl Fn(&str) -> i32) -> Option<StatusHit<'_>> {
    if offset < 0 {
        return None;
    }

    let mut right_edge = 0;
    let mut hit = None;
    for (index, run) in runs.iter().enumerate() {
        hit = Some(StatusHit {
            run: index,
            text: &run.text,
            signal: run.signal.as_deref(),
        });
        right_edge += measure(&run.text);
        if right_edge > offset {
            break;
        }
    }
    hit
}
