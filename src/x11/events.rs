use super::X11Backend;
use crate::errors::{ErrorKind, RequestKind};
use crate::window_system::{ClientMessage, ConfigureRequest, PropertyKind, StateAction, WmEvent};
use x11rb::protocol::Event;
use x11rb::protocol::xproto::{AtomEnum, Mapping, NotifyDetail, NotifyMode, Property};

mod opcode {
    pub const CONFIGURE_WINDOW: u8 = 12;
    pub const GRAB_BUTTON: u8 = 28;
    pub const GRAB_KEY: u8 = 33;
    pub const SET_INPUT_FOCUS: u8 = 42;
    pub const COPY_AREA: u8 = 62;
    pub const POLY_SEGMENT: u8 = 66;
    pub const POLY_FILL_RECTANGLE: u8 = 70;
    pub const POLY_TEXT8: u8 = 74;
}

pub fn request_kind(major_opcode: u8) -> RequestKind {
    match major_opcode {
        opcode::CONFIGURE_WINDOW => RequestKind::ConfigureWindow,
        opcode::GRAB_BUTTON => RequestKind::GrabButton,
        opcode::GRAB_KEY => RequestKind::GrabKey,
        opcode::SET_INPUT_FOCUS => RequestKind::SetInputFocus,
        opcode::COPY_AREA => RequestKind::CopyArea,
        opcode::POLY_SEGMENT => RequestKind::PolySegment,
        opcode::POLY_FILL_RECTANGLE => RequestKind::PolyFillRectangle,
        opcode::POLY_TEXT8 => RequestKind::PolyText8,
        other => RequestKind::Other(other),
    }
}

pub fn error_kind(error_code: u8) -> ErrorKind {
    match error_code {
        3 => ErrorKind::Window,
        8 => ErrorKind::Match,
        9 => ErrorKind::Drawable,
        10 => ErrorKind::Access,
        other => ErrorKind::Other(other),
    }
}

/// `_NET_WM_STATE` action field.
fn state_action(action: u32) -> Option<StateAction> {
    match action {
        0 => Some(StateAction::Remove),
        1 => Some(StateAction::Add),
        2 => Some(StateAction::Toggle),
        _ => None,
    }
}

impl X11Backend {
    /// Maps a server event onto the engine's vocabulary. Events the engine
    /// has no use for come back as `None`.
    pub(super) fn translate(&self, event: Event) -> Option<WmEvent> {
        let event = match event {
            Event::ButtonPress(e) => WmEvent::ButtonPress {
                window: e.event,
                root_x: e.root_x.into(),
                root_y: e.root_y.into(),
                x: e.event_x.into(),
                button: e.detail,
                state: u16::from(e.state),
            },
            Event::ButtonRelease(e) => WmEvent::ButtonRelease { window: e.event },
            Event::MotionNotify(e) => WmEvent::MotionNotify {
                window: e.event,
                root_x: e.root_x.into(),
                root_y: e.root_y.into(),
                time: e.time,
            },
            Event::KeyPress(e) => WmEvent::KeyPress {
                keysym: self.keymap.keysym(e.detail),
                state: u16::from(e.state),
            },
            Event::MapRequest(e) => WmEvent::MapRequest { window: e.window },
            Event::UnmapNotify(e) => WmEvent::UnmapNotify {
                window: e.window,
                synthetic: e.response_type & 0x80 != 0,
            },
            Event::DestroyNotify(e) => WmEvent::DestroyNotify { window: e.window },
            Event::ConfigureRequest(e) => WmEvent::ConfigureRequest(ConfigureRequest {
                window: e.window,
                x: e.x.into(),
                y: e.y.into(),
                width: e.width.into(),
                height: e.height.into(),
                border_width: e.border_width.into(),
                sibling: e.sibling,
                stack_mode: u32::from(e.stack_mode),
                value_mask: u16::from(e.value_mask),
            }),
            Event::ConfigureNotify(e) => WmEvent::ConfigureNotify {
                window: e.window,
                width: e.width.into(),
                height: e.height.into(),
            },
            Event::EnterNotify(e) => WmEvent::EnterNotify {
                window: e.event,
                normal: e.mode == NotifyMode::NORMAL && e.detail != NotifyDetail::INFERIOR,
            },
            Event::PropertyNotify(e) => WmEvent::PropertyNotify {
                window: e.window,
                property: self.property_kind(e.atom),
                deleted: e.state == Property::DELETE,
            },
            Event::ClientMessage(e) => WmEvent::ClientMessage {
                window: e.window,
                message: self.client_message(e.type_, e.data.as_data32()),
            },
            Event::Expose(e) => WmEvent::Expose {
                window: e.window,
                count: e.count,
            },
            Event::FocusIn(e) => WmEvent::FocusIn { window: e.event },
            Event::MappingNotify(e) => WmEvent::MappingNotify {
                keyboard: e.request == Mapping::KEYBOARD,
            },
            Event::Error(e) => WmEvent::ProtocolError {
                request: request_kind(e.major_opcode),
                error: error_kind(e.error_code),
            },
            _ => return None,
        };
        Some(event)
    }

    fn property_kind(&self, atom: u32) -> PropertyKind {
        if atom == u32::from(AtomEnum::WM_NAME) || atom == self.atoms._NET_WM_NAME {
            PropertyKind::Name
        } else if atom == u32::from(AtomEnum::WM_NORMAL_HINTS) {
            PropertyKind::NormalHints
        } else if atom == u32::from(AtomEnum::WM_HINTS) {
            PropertyKind::Hints
        } else if atom == u32::from(AtomEnum::WM_TRANSIENT_FOR) {
            PropertyKind::TransientFor
        } else if atom == self.atoms._NET_WM_WINDOW_TYPE {
            PropertyKind::WindowType
        } else {
            PropertyKind::Other
        }
    }

    fn client_message(&self, message_type: u32, data: [u32; 5]) -> ClientMessage {
        let fullscreen = self.atoms._NET_WM_STATE_FULLSCREEN;
        if message_type == self.atoms._NET_WM_STATE && (data[1] == fullscreen || data[2] == fullscreen) {
            return state_action(data[0]).map_or(ClientMessage::Other, ClientMessage::Fullscreen);
        }
        if message_type == self.atoms._NET_ACTIVE_WINDOW {
            return ClientMessage::ActiveWindow;
        }
        ClientMessage::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::is_benign;

    #[test]
    fn racing_focus_errors_are_benign() {
        let request = request_kind(42);
        let error = error_kind(8);
        assert_eq!(request, RequestKind::SetInputFocus);
        assert!(is_benign(request, error));
    }

    #[test]
    fn unknown_codes_are_preserved() {
        assert_eq!(request_kind(1), RequestKind::Other(1));
        assert_eq!(error_kind(11), ErrorKind::Other(11));
        assert!(!is_benign(request_kind(1), error_kind(11)));
    }

    #[test]
    fn state_actions_follow_ewmh_numbering() {
        assert_eq!(state_action(0), Some(StateAction::Remove));
        assert_eq!(state_action(1), Some(StateAction::Add));
        assert_eq!(state_action(2), Some(StateAction::Toggle));
        assert_eq!(state_action(3), None);
    }
}
