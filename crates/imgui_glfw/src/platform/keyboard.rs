//! Toolkit key codes
//!
//! Discriminants are the indices written into `Io::keys_down`.

/// Physical keys reported by the windowing toolkit
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    A = 0,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Escape,
    LControl,
    LShift,
    LAlt,
    LSystem,
    RControl,
    RShift,
    RAlt,
    RSystem,
    Menu,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Period,
    Quote,
    Slash,
    Backslash,
    Tilde,
    Equal,
    Hyphen,
    Space,
    Enter,
    Backspace,
    Tab,
    PageUp,
    PageDown,
    End,
    Home,
    Insert,
    Delete,
    Add,
    Subtract,
    Multiply,
    Divide,
    Left,
    Right,
    Up,
    Down,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    Pause,
}

impl Key {
    /// Number of key codes
    pub const COUNT: usize = 101;

    /// Index into `Io::keys_down`
    pub const fn code(self) -> usize {
        self as usize
    }

    /// Left and right variants of a modifier pair
    pub const CONTROL: [Self; 2] = [Self::LControl, Self::RControl];
    /// Left and right shift
    pub const SHIFT: [Self; 2] = [Self::LShift, Self::RShift];
    /// Left and right alt
    pub const ALT: [Self; 2] = [Self::LAlt, Self::RAlt];
    /// Left and right system/super
    pub const SYSTEM: [Self; 2] = [Self::LSystem, Self::RSystem];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::io::KEYS_DOWN_COUNT;

    #[test]
    fn test_key_codes_fit_the_keys_down_table() {
        assert_eq!(Key::Pause.code() + 1, Key::COUNT);
        assert!(Key::COUNT <= KEYS_DOWN_COUNT);
    }

    #[test]
    fn test_key_codes_follow_declaration_order() {
        assert_eq!(Key::A.code(), 0);
        assert_eq!(Key::Num0.code(), 26);
        assert_eq!(Key::Escape.code(), 36);
        assert_eq!(Key::Tab.code(), 60);
    }
}
