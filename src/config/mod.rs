//! RON configuration files.
//!
//! Every top-level field is optional and falls back to [`Config::default`];
//! optional values may be written bare, without `Some(..)`.
//! Lines of the form `#DEFINE $name = value` declare textual variables that
//! are substituted before parsing.

use crate::errors::ConfigError;
use crate::keyboard::keysyms;
use crate::keyboard::{Arg, ButtonBinding, ClickTarget, KeyAction, KeyBinding};
use crate::layout::{GapConfig, LayoutType};
use crate::rules::Rule;
use crate::spawn::shell_command;
use crate::{ColorScheme, Config};
use ron::extensions::Extensions;
use serde::Deserialize;
use x11rb::protocol::xproto::KeyButMask;

/// The commented default configuration written by `--init`.
pub const TEMPLATE: &str = include_str!("../../templates/config.ron");

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum ModKey {
    /// Whatever `modkey` is set to.
    Mod,
    Mod1,
    Mod2,
    Mod3,
    Mod4,
    Mod5,
    Shift,
    Control,
}

impl ModKey {
    fn to_keybut_mask(self, modkey: KeyButMask) -> KeyButMask {
        match self {
            ModKey::Mod => modkey,
            ModKey::Mod1 => KeyButMask::MOD1,
            ModKey::Mod2 => KeyButMask::MOD2,
            ModKey::Mod3 => KeyButMask::MOD3,
            ModKey::Mod4 => KeyButMask::MOD4,
            ModKey::Mod5 => KeyButMask::MOD5,
            ModKey::Shift => KeyButMask::SHIFT,
            ModKey::Control => KeyButMask::CONTROL,
        }
    }
}

fn parse_color(text: &str) -> Result<u32, ConfigError> {
    text.strip_prefix('#')
        .filter(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .ok_or_else(|| ConfigError::InvalidColor(text.to_string()))
}

/// Characters of `line` that are neither inside a double-quoted string nor
/// part of a trailing `//` comment.
fn code_chars(line: &str) -> Vec<char> {
    let mut in_string = false;
    let mut escaped = false;
    let mut code = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        } else if c == '/' && chars.peek() == Some(&'/') {
            break;
        } else {
            code.push(c);
        }
    }
    code
}

fn preprocess_variables(input: &str) -> Result<String, ConfigError> {
    let mut variables: Vec<(String, String)> = Vec::new();
    let mut result = String::new();

    for line in input.lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("#DEFINE") {
            let Some((name, value)) = rest.split_once('=') else {
                return Err(ConfigError::InvalidDefine(trimmed.to_string()));
            };
            let name = name.trim();
            let value = value.trim().trim_end_matches(',');

            let valid = name
                .strip_prefix('$')
                .is_some_and(|ident| !ident.is_empty() && ident.chars().all(|c| c.is_alphanumeric() || c == '_'));
            if !valid {
                return Err(ConfigError::InvalidVariableName(name.to_string()));
            }

            variables.retain(|(existing, _)| existing != name);
            variables.push((name.to_string(), value.to_string()));
            // Longest names first so `$mod` never eats the start of `$modkey`.
            variables.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for (name, value) in &variables {
            processed_line = processed_line.replace(name.as_str(), value);
        }

        let code = code_chars(&processed_line);
        if let Some(position) = code.iter().position(|&c| c == '$') {
            let name: String = std::iter::once('$')
                .chain(
                    code[position + 1..]
                        .iter()
                        .copied()
                        .take_while(|c| c.is_alphanumeric() || *c == '_'),
                )
                .collect();
            return Err(ConfigError::UndefinedVariable(name));
        }

        result.push_str(&processed_line);
        result.push('\n');
    }

    Ok(result)
}

pub fn parse_config(input: &str) -> Result<Config, ConfigError> {
    let preprocessed = preprocess_variables(input)?;
    let config_data: ConfigData = ron::Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str(&preprocessed)?;
    config_data_to_config(config_data)
}

#[derive(Debug, Deserialize)]
struct GapData {
    inner: i32,
    outer: i32,
}

impl From<GapData> for GapConfig {
    fn from(data: GapData) -> Self {
        GapConfig {
            inner: data.inner,
            outer: data.outer,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ColorSchemeData {
    foreground: String,
    background: String,
    border: String,
}

impl ColorSchemeData {
    fn to_scheme(&self) -> Result<ColorScheme, ConfigError> {
        Ok(ColorScheme {
            foreground: parse_color(&self.foreground)?,
            background: parse_color(&self.background)?,
            border: parse_color(&self.border)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SchemesData {
    normal: Option<ColorSchemeData>,
    selected: Option<ColorSchemeData>,
    global: Option<ColorSchemeData>,
    hidden: Option<ColorSchemeData>,
    tag_normal: Option<ColorSchemeData>,
    tag_selected: Option<ColorSchemeData>,
}

#[derive(Debug, Default, Deserialize)]
enum ArgData {
    #[default]
    None,
    Int(i32),
    Float(f32),
    Str(String),
    Array(Vec<String>),
}

impl From<ArgData> for Arg {
    fn from(data: ArgData) -> Self {
        match data {
            ArgData::None => Arg::None,
            ArgData::Int(n) => Arg::Int(n),
            ArgData::Float(f) => Arg::Float(f),
            ArgData::Str(s) => Arg::Str(s),
            ArgData::Array(arr) => Arg::Array(arr),
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeybindingData {
    #[serde(default)]
    modifiers: Vec<ModKey>,
    key: String,
    action: KeyAction,
    #[serde(default)]
    arg: ArgData,
    /// For `ViewTag`: spawned when the tag has no clients.
    #[serde(default)]
    fallback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ButtonBindingData {
    target: ClickTarget,
    #[serde(default)]
    modifiers: Vec<ModKey>,
    button: u8,
    action: KeyAction,
    #[serde(default)]
    arg: ArgData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigData {
    border_width: Option<i32>,
    snap: Option<i32>,
    font: Option<String>,
    gaps: Option<GapData>,
    overview_gaps: Option<GapData>,

    master_factor: Option<f32>,
    num_master: Option<i32>,
    layouts: Option<Vec<String>>,
    attach_at_head: Option<bool>,

    show_bar: Option<bool>,
    top_bar: Option<bool>,

    tags: Option<Vec<String>>,
    overview_tag: Option<String>,

    scratchpad_name: Option<String>,
    scratchpad_command: Option<String>,
    status_command: Option<String>,
    autostart: Option<Vec<String>>,

    modkey: Option<ModKey>,
    keybindings: Option<Vec<KeybindingData>>,
    buttonbindings: Option<Vec<ButtonBindingData>>,
    rules: Option<Vec<Rule>>,

    schemes: SchemesData,
}

fn modifier_masks(modifiers: &[ModKey], modkey: KeyButMask) -> Vec<KeyButMask> {
    modifiers
        .iter()
        .map(|modifier| modifier.to_keybut_mask(modkey))
        .collect()
}

fn config_data_to_config(data: ConfigData) -> Result<Config, ConfigError> {
    let defaults = Config::default();
    let modkey = data
        .modkey
        .map_or(defaults.modkey, |modkey| modkey.to_keybut_mask(KeyButMask::MOD4));

    let keybindings = match data.keybindings {
        Some(bindings) => {
            let mut keybindings = Vec::with_capacity(bindings.len());
            for kb_data in bindings {
                let keysym =
                    keysyms::from_name(&kb_data.key).ok_or_else(|| ConfigError::UnknownKey(kb_data.key.clone()))?;
                let arg = match (kb_data.action, kb_data.arg, kb_data.fallback) {
                    (KeyAction::ViewTag, ArgData::Int(tag), Some(command)) => Arg::TagCommand(tag, command),
                    (_, arg, _) => arg.into(),
                };
                keybindings.push(KeyBinding::new(
                    modifier_masks(&kb_data.modifiers, modkey),
                    keysym,
                    kb_data.action,
                    arg,
                ));
            }
            keybindings
        }
        None => defaults.keybindings,
    };

    let buttonbindings = match data.buttonbindings {
        Some(bindings) => bindings
            .into_iter()
            .map(|bb_data| {
                ButtonBinding::new(
                    bb_data.target,
                    modifier_masks(&bb_data.modifiers, modkey),
                    bb_data.button,
                    bb_data.action,
                    bb_data.arg.into(),
                )
            })
            .collect(),
        None => defaults.buttonbindings,
    };

    let layouts = match data.layouts {
        Some(names) => names
            .iter()
            .map(|name| LayoutType::from_str(name).map_err(ConfigError::ValidationError))
            .collect::<Result<Vec<_>, _>>()?,
        None => defaults.layouts,
    };
    if layouts.is_empty() {
        return Err(ConfigError::ValidationError("layouts must not be empty".to_string()));
    }

    let tags = data.tags.unwrap_or(defaults.tags);
    if tags.is_empty() || tags.len() > 31 {
        return Err(ConfigError::ValidationError(format!(
            "between 1 and 31 tags are supported, got {}",
            tags.len()
        )));
    }

    let master_factor = data.master_factor.unwrap_or(defaults.master_factor);
    if !(0.05..=0.95).contains(&master_factor) {
        return Err(ConfigError::ValidationError(format!(
            "master_factor {} is outside 0.05..=0.95",
            master_factor
        )));
    }

    let scheme = |data: &Option<ColorSchemeData>, fallback: ColorScheme| match data {
        Some(data) => data.to_scheme(),
        None => Ok(fallback),
    };
    let schemes = &data.schemes;

    Ok(Config {
        border_width: data.border_width.unwrap_or(defaults.border_width).max(0),
        snap: data.snap.unwrap_or(defaults.snap),
        font: data.font.unwrap_or(defaults.font),
        gaps: data.gaps.map_or(defaults.gaps, GapConfig::from),
        overview_gaps: data.overview_gaps.map_or(defaults.overview_gaps, GapConfig::from),
        master_factor,
        num_master: data.num_master.unwrap_or(defaults.num_master).max(0),
        layouts,
        attach_at_head: data.attach_at_head.unwrap_or(defaults.attach_at_head),
        show_bar: data.show_bar.unwrap_or(defaults.show_bar),
        top_bar: data.top_bar.unwrap_or(defaults.top_bar),
        tags,
        overview_tag: data.overview_tag.unwrap_or(defaults.overview_tag),
        scratchpad_name: data.scratchpad_name.unwrap_or(defaults.scratchpad_name),
        scratchpad_command: data
            .scratchpad_command
            .as_deref()
            .map_or(defaults.scratchpad_command, shell_command),
        status_command: data.status_command.or(defaults.status_command),
        autostart: data.autostart.unwrap_or(defaults.autostart),
        modkey,
        keybindings,
        buttonbindings,
        rules: data.rules.unwrap_or(defaults.rules),
        scheme_normal: scheme(&schemes.normal, defaults.scheme_normal)?,
        scheme_selected: scheme(&schemes.selected, defaults.scheme_selected)?,
        scheme_global: scheme(&schemes.global, defaults.scheme_global)?,
        scheme_hidden: scheme(&schemes.hidden, defaults.scheme_hidden)?,
        scheme_tag_normal: scheme(&schemes.tag_normal, defaults.scheme_tag_normal)?,
        scheme_tag_selected: scheme(&schemes.tag_selected, defaults.scheme_tag_selected)?,
    })
}
