/// Single pad state machine and its colour rule
use super::drums::DrumSound;
use super::grid::{id_of, Coords, PadId};

/// Logical LED state of a pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Off,
    /// Active step, audible
    Active,
    /// Active step in a muted row
    Dimmed,
    /// Highlight while the pad's column is playing
    Blink,
}

/// Palette indices sent to the device for each logical colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub active: u8,
    pub dimmed: u8,
    pub blink: u8,
}

impl Palette {
    /// Device colour code, `None` meaning the LED is switched off.
    pub fn code(&self, color: Color) -> Option<u8> {
        match color {
            Color::Off => None,
            Color::Active => Some(self.active),
            Color::Dimmed => Some(self.dimmed),
            Color::Blink => Some(self.blink),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        // green, dimmed green, pink
        Self {
            active: 87,
            dimmed: 19,
            blink: 107,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pad {
    coords: Coords,
    id: PadId,
    active: bool,
    muted: bool,
    sound: Option<DrumSound>,
}

impl Pad {
    pub fn new(x: u8, y: u8) -> Self {
        Self {
            coords: Coords::new(x, y),
            id: id_of(x, y),
            active: false,
            muted: false,
            sound: DrumSound::for_row(y),
        }
    }

    pub fn x(&self) -> u8 {
        self.coords.x
    }

    pub fn y(&self) -> u8 {
        self.coords.y
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn id(&self) -> PadId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn sound(&self) -> Option<DrumSound> {
        self.sound
    }

    /// Flip step membership and return the new steady colour.
    pub fn toggle_active(&mut self) -> Color {
        self.active = !self.active;
        self.rendered_color()
    }

    /// Flip the mute flag and return the new steady colour.
    ///
    /// Only visible when the pad is active.
    pub fn toggle_muted(&mut self) -> Color {
        self.muted = !self.muted;
        self.rendered_color()
    }

    pub fn rendered_color(&self) -> Color {
        match (self.active, self.muted) {
            (false, _) => Color::Off,
            (true, false) => Color::Active,
            (true, true) => Color::Dimmed,
        }
    }

    pub fn blink_color(&self) -> Color {
        Color::Blink
    }

    pub fn should_sound(&self, running: bool) -> bool {
        running && self.active && !self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pad_is_off() {
        let pad = Pad::new(2, 5);
        assert_eq!(pad.id(), PadId(63));
        assert!(!pad.is_active());
        assert!(!pad.is_muted());
        assert_eq!(pad.rendered_color(), Color::Off);
        assert_eq!(pad.sound(), Some(DrumSound::Clap));
    }

    #[test]
    fn test_colour_rule() {
        let mut pad = Pad::new(0, 0);
        assert_eq!(pad.toggle_active(), Color::Active);
        assert_eq!(pad.toggle_muted(), Color::Dimmed);
        assert_eq!(pad.toggle_active(), Color::Off);
        // muted but inactive stays dark
        assert_eq!(pad.rendered_color(), Color::Off);
        assert_eq!(pad.blink_color(), Color::Blink);
    }

    #[test]
    fn test_double_toggle_restores_state() {
        let mut pad = Pad::new(4, 4);
        let before = (pad.is_active(), pad.rendered_color());
        pad.toggle_active();
        pad.toggle_active();
        assert_eq!((pad.is_active(), pad.rendered_color()), before);

        pad.toggle_active();
        let before = (pad.is_muted(), pad.rendered_color());
        pad.toggle_muted();
        pad.toggle_muted();
        assert_eq!((pad.is_muted(), pad.rendered_color()), before);
    }

    #[test]
    fn test_should_sound() {
        let mut pad = Pad::new(1, 1);
        assert!(!pad.should_sound(true));
        pad.toggle_active();
        assert!(pad.should_sound(true));
        assert!(!pad.should_sound(false));
        pad.toggle_muted();
        assert!(!pad.should_sound(true));
    }

    #[test]
    fn test_function_row_has_no_sound() {
        assert_eq!(Pad::new(3, 8).sound(), None);
    }

    #[test]
    fn test_palette_codes() {
        let palette = Palette::default();
        assert_eq!(palette.code(Color::Off), None);
        assert_eq!(palette.code(Color::Active), Some(87));
        assert_eq!(palette.code(Color::Dimmed), Some(19));
        assert_eq!(palette.code(Color::Blink), Some(107));
    }
}
