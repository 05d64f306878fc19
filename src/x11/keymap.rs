use crate::errors::WmResult;
use crate::keyboard::keysyms::{Keysym, XK_NUM_LOCK};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt, Keycode};

/// Keycode to keysym table fetched from the server.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    min_keycode: Keycode,
    keysyms_per_keycode: usize,
    keysyms: Vec<Keysym>,
}

impl Keymap {
    pub fn load(connection: &impl Connection) -> WmResult<Self> {
        let setup = connection.setup();
        let (min_keycode, max_keycode) = (setup.min_keycode, setup.max_keycode);
        let reply = connection
            .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)?
            .reply()?;

        Ok(Self::from_table(
            min_keycode,
            usize::from(reply.keysyms_per_keycode),
            reply.keysyms,
        ))
    }

    pub fn from_table(min_keycode: Keycode, keysyms_per_keycode: usize, keysyms: Vec<Keysym>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode,
            keysyms,
        }
    }

    /// Unshifted keysym of `keycode`, 0 when unmapped.
    pub fn keysym(&self, keycode: Keycode) -> Keysym {
        if keycode < self.min_keycode || self.keysyms_per_keycode == 0 {
            return 0;
        }
        let index = usize::from(keycode - self.min_keycode) * self.keysyms_per_keycode;
        self.keysyms.get(index).copied().unwrap_or(0)
    }

    /// Every keycode whose unshifted keysym is `keysym`.
    pub fn keycodes(&self, keysym: Keysym) -> Vec<Keycode> {
        if self.keysyms_per_keycode == 0 || keysym == 0 {
            return Vec::new();
        }
        self.keysyms
            .chunks(self.keysyms_per_keycode)
            .enumerate()
            .filter(|(_, syms)| syms.first() == Some(&keysym))
            .filter_map(|(offset, _)| Keycode::try_from(usize::from(self.min_keycode) + offset).ok())
            .collect()
    }
}

/// Modifier bit that num lock is bound to, 0 when it is not bound.
pub fn numlock_mask(connection: &impl Connection, keymap: &Keymap) -> WmResult<u16> {
    let reply = connection.get_modifier_mapping()?.reply()?;
    Ok(modifier_bit(&reply.keycodes, &keymap.keycodes(XK_NUM_LOCK)))
}

/// `modifier_keycodes` is the server's eight equal-sized modifier rows.
fn modifier_bit(modifier_keycodes: &[Keycode], targets: &[Keycode]) -> u16 {
    let per_modifier = modifier_keycodes.len() / 8;
    if per_modifier == 0 {
        return 0;
    }
    modifier_keycodes
        .chunks(per_modifier)
        .position(|row| row.iter().any(|keycode| *keycode != 0 && targets.contains(keycode)))
        .map_or(0, |modifier| 1 << modifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::keysyms;

    fn keymap() -> Keymap {
        // keycodes 8..=11, two columns each
        Keymap::from_table(
            8,
            2,
            vec![
                keysyms::XK_A,
                0x41,
                XK_NUM_LOCK,
                0,
                keysyms::XK_RETURN,
                0,
                keysyms::XK_A,
                0x41,
            ],
        )
    }

    #[test]
    fn keysym_reads_the_first_column() {
        let keymap = keymap();
        assert_eq!(keymap.keysym(8), keysyms::XK_A);
        assert_eq!(keymap.keysym(10), keysyms::XK_RETURN);
        assert_eq!(keymap.keysym(7), 0);
        assert_eq!(keymap.keysym(40), 0);
    }

    #[test]
    fn keycodes_finds_every_binding_of_a_keysym() {
        let keymap = keymap();
        assert_eq!(keymap.keycodes(keysyms::XK_A), vec![8, 11]);
        assert!(keymap.keycodes(keysyms::XK_SPACE).is_empty());
    }

    #[test]
    fn numlock_bit_follows_the_modifier_row() {
        let keymap = keymap();
        let rows = [0, 0, 0, 0, 9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(modifier_bit(&rows, &keymap.keycodes(XK_NUM_LOCK)), 1 << 2);
        assert_eq!(modifier_bit(&[0; 16], &[9]), 0);
        assert_eq!(modifier_bit(&[], &[9]), 0);
    }
}
