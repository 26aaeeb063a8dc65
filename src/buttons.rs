//! Button state decoding for status frames.
//!
//! A status frame carries three payload bytes after its tag. The neck wires
//! its buttons into those bytes as follows:
//!
//! | Color  | Fret (byte, mask) | Touch (byte, mask) |
//! |--------|-------------------|--------------------|
//! | Green  | 2, `0x40`         | 1, `0x08`          |
//! | Red    | 2, `0x01`         | 1, `0x04`          |
//! | Yellow | 2, `0x02`         | 1, `0x02`          |
//! | Blue   | 2, `0x10`         | 1, `0x01`          |
//! | Orange | 2, `0x20`         | 2, `0x80`          |
//!
//! Byte 0 of the payload is reserved. Bits that aren't listed are ignored.

use bitflags::bitflags;

use crate::decode::{Decode, DecodeError};

bitflags! {
    /// Button bits carried by payload byte 1.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TouchBits: u8 {
        const BLUE = 0x01;
        const YELLOW = 0x02;
        const RED = 0x04;
        const GREEN = 0x08;
    }
}

bitflags! {
    /// Button bits carried by payload byte 2.
    ///
    /// This byte holds every fret as well as the orange touch sensor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FretBits: u8 {
        const RED = 0x01;
        const YELLOW = 0x02;
        const BLUE = 0x10;
        const ORANGE = 0x20;
        const GREEN = 0x40;
        const TOUCH_ORANGE = 0x80;
    }
}

/// One of the five colored inputs on the neck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    Green,
    Red,
    Yellow,
    Blue,
    Orange,
}

impl Color {
    /// Every color, in fret order from the headstock.
    pub const ALL: [Color; 5] = [
        Color::Green,
        Color::Red,
        Color::Yellow,
        Color::Blue,
        Color::Orange,
    ];
}

/// Instantaneous state of every fret and touch sensor on the neck.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonState {
    pub fret_green: bool,
    pub fret_red: bool,
    pub fret_yellow: bool,
    pub fret_blue: bool,
    pub fret_orange: bool,
    pub touch_green: bool,
    pub touch_red: bool,
    pub touch_yellow: bool,
    pub touch_blue: bool,
    pub touch_orange: bool,
}

impl ButtonState {
    /// Decodes the three payload bytes that follow a status frame's tag.
    ///
    /// This is total: every input produces a state.
    pub fn from_payload(payload: [u8; 3]) -> Self {
        let touch = TouchBits::from_bits_truncate(payload[1]);
        let fret = FretBits::from_bits_truncate(payload[2]);

        Self {
            fret_green: fret.contains(FretBits::GREEN),
            fret_red: fret.contains(FretBits::RED),
            fret_yellow: fret.contains(FretBits::YELLOW),
            fret_blue: fret.contains(FretBits::BLUE),
            fret_orange: fret.contains(FretBits::ORANGE),
            touch_green: touch.contains(TouchBits::GREEN),
            touch_red: touch.contains(TouchBits::RED),
            touch_yellow: touch.contains(TouchBits::YELLOW),
            touch_blue: touch.contains(TouchBits::BLUE),
            touch_orange: fret.contains(FretBits::TOUCH_ORANGE),
        }
    }

    /// Whether the fret of the given color is pressed.
    pub const fn fret(&self, color: Color) -> bool {
        match color {
            Color::Green => self.fret_green,
            Color::Red => self.fret_red,
            Color::Yellow => self.fret_yellow,
            Color::Blue => self.fret_blue,
            Color::Orange => self.fret_orange,
        }
    }

    /// Whether the touch sensor of the given color is in contact.
    pub const fn touch(&self, color: Color) -> bool {
        match color {
            Color::Green => self.touch_green,
            Color::Red => self.touch_red,
            Color::Yellow => self.touch_yellow,
            Color::Blue => self.touch_blue,
            Color::Orange => self.touch_orange,
        }
    }

    /// Returns `true` if no fret is pressed and no sensor is touched.
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

impl Decode for ButtonState {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self::from_payload(<[u8; 3]>::decode(data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::{ButtonState, Color};
    use crate::decode::Decode;

    fn only(f: impl FnOnce(&mut ButtonState)) -> ButtonState {
        let mut state = ButtonState::default();
        f(&mut state);
        state
    }

    #[test]
    fn single_bits() {
        let cases: [([u8; 3], ButtonState); 10] = [
            ([0, 0, 0x40], only(|s| s.fret_green = true)),
            ([0, 0, 0x01], only(|s| s.fret_red = true)),
            ([0, 0, 0x02], only(|s| s.fret_yellow = true)),
            ([0, 0, 0x10], only(|s| s.fret_blue = true)),
            ([0, 0, 0x20], only(|s| s.fret_orange = true)),
            ([0, 0x08, 0], only(|s| s.touch_green = true)),
            ([0, 0x04, 0], only(|s| s.touch_red = true)),
            ([0, 0x02, 0], only(|s| s.touch_yellow = true)),
            ([0, 0x01, 0], only(|s| s.touch_blue = true)),
            ([0, 0, 0x80], only(|s| s.touch_orange = true)),
        ];

        for (payload, expected) in cases {
            assert_eq!(ButtonState::from_payload(payload), expected, "{payload:x?}");
        }
    }

    #[test]
    fn all_zero() {
        let state = ButtonState::from_payload([0, 0, 0]);
        assert!(state.is_idle());
    }

    #[test]
    fn all_ones() {
        let state = ButtonState::from_payload([0xFF, 0xFF, 0xFF]);
        for color in Color::ALL {
            assert!(state.fret(color), "{color:?} fret");
            assert!(state.touch(color), "{color:?} touch");
        }
    }

    #[test]
    fn unmapped_bits_ignored() {
        // Byte 0 is reserved, 0xF0 of byte 1 and 0x0C of byte 2 are unused.
        let state = ButtonState::from_payload([0xFF, 0xF0, 0x0C]);
        assert!(state.is_idle());
    }

    #[test]
    fn touch_byte_does_not_leak_into_frets() {
        // 0x01 and 0x02 mean blue/yellow touch in byte 1 but red/yellow fret in byte 2.
        let state = ButtonState::from_payload([0, 0x03, 0]);
        assert!(state.touch_blue && state.touch_yellow);
        assert!(!state.fret_red && !state.fret_yellow);
    }

    #[test]
    fn decode_consumes_payload() {
        let data = [0x00, 0x08, 0x41, 0xAA];
        let mut slice = data.as_slice();
        let state = ButtonState::decode(&mut slice).unwrap();

        assert!(state.touch_green && state.fret_green && state.fret_red);
        assert_eq!(slice, &[0xAA]);
    }
}
