use thiserror::Error;

pub type WmResult<T> = Result<T, WmError>;

#[derive(Debug, Error)]
pub enum WmError {
    #[error(transparent)]
    X11(#[from] X11Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("another window manager is already running")]
    OtherWmRunning,
    #[error("fatal protocol error: request code={request:?}, error code={error:?}")]
    FatalProtocol {
        request: RequestKind,
        error: ErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum X11Error {
    #[error(transparent)]
    ConnectError(#[from] x11rb::errors::ConnectError),
    #[error(transparent)]
    ConnectionError(#[from] x11rb::errors::ConnectionError),
    #[error(transparent)]
    ReplyError(#[from] x11rb::errors::ReplyError),
    #[error(transparent)]
    ReplyOrIdError(#[from] x11rb::errors::ReplyOrIdError),
    #[error("failed to open X11 display")]
    DisplayOpenFailed,
    #[error("failed to load Xft font: {0}")]
    FontLoadFailed(String),
    #[error("failed to create XftDraw")]
    DrawCreateFailed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse RON config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    #[error("Unknown key: {0}")]
    UnknownKey(String),
    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),
    #[error("Invalid variable name '{0}': must start with $")]
    InvalidVariableName(String),
    #[error("Invalid #DEFINE syntax: '{0}'. Expected: #DEFINE $var_name = value")]
    InvalidDefine(String),
    #[error("Undefined variable '{0}': define it with #DEFINE before use")]
    UndefinedVariable(String),
    #[error("{0}")]
    ValidationError(String),
}

impl From<x11rb::errors::ConnectError> for WmError {
    fn from(value: x11rb::errors::ConnectError) -> Self {
        Self::X11(value.into())
    }
}

impl From<x11rb::errors::ConnectionError> for WmError {
    fn from(value: x11rb::errors::ConnectionError) -> Self {
        Self::X11(value.into())
    }
}

impl From<x11rb::errors::ReplyError> for WmError {
    fn from(value: x11rb::errors::ReplyError) -> Self {
        Self::X11(value.into())
    }
}

impl From<x11rb::errors::ReplyOrIdError> for WmError {
    fn from(value: x11rb::errors::ReplyOrIdError) -> Self {
        Self::X11(value.into())
    }
}

/// Request that produced an asynchronous protocol error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    SetInputFocus,
    PolyText8,
    PolyFillRectangle,
    PolySegment,
    ConfigureWindow,
    GrabButton,
    GrabKey,
    CopyArea,
    Other(u8),
}

/// Protocol error class reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Window,
    Match,
    Drawable,
    Access,
    Other(u8),
}

/// Errors caused by racing against a client that destroyed its own window.
/// Everything outside this list is fatal.
pub fn is_benign(request: RequestKind, error: ErrorKind) -> bool {
    use ErrorKind as E;
    use RequestKind as R;

    matches!(
        (request, error),
        (_, E::Window)
            | (R::SetInputFocus, E::Match)
            | (R::PolyText8, E::Drawable)
            | (R::PolyFillRectangle, E::Drawable)
            | (R::PolySegment, E::Drawable)
            | (R::ConfigureWindow, E::Match)
            | (R::GrabButton, E::Access)
            | (R::GrabKey, E::Access)
            | (R::CopyArea, E::Drawable)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_window_is_always_swallowed() {
        assert!(is_benign(RequestKind::Other(8), ErrorKind::Window));
        assert!(is_benign(RequestKind::ConfigureWindow, ErrorKind::Window));
    }

    #[test]
    fn listed_pairs_are_swallowed() {
        assert!(is_benign(RequestKind::SetInputFocus, ErrorKind::Match));
        assert!(is_benign(RequestKind::GrabKey, ErrorKind::Access));
        assert!(is_benign(RequestKind::CopyArea, ErrorKind::Drawable));
    }

    #[test]
    fn unlisted_pairs_are_fatal() {
        assert!(!is_benign(RequestKind::SetInputFocus, ErrorKind::Access));
        assert!(!is_benign(RequestKind::Other(1), ErrorKind::Match));
        assert!(!is_benign(RequestKind::GrabButton, ErrorKind::Other(11)));
    }
}
