//! Stock combo patterns.
//!
//! The classic fighting-game gestures shipped as defaults, mapped onto face
//! buttons: direction inputs ride on Y/X/B and the punch lands on A.

use openpad_device_types::{ComboToken, PadButton};

use crate::pattern::ComboPattern;

fn tokens(buttons: &[PadButton]) -> Vec<ComboToken> {
    buttons.iter().copied().map(ComboToken::Button).collect()
}

/// Fireball motion: Down, Down-Right, Right, punch.
pub fn hadoken() -> ComboPattern {
    ComboPattern::preset(
        "Hadoken",
        tokens(&[PadButton::Y, PadButton::X, PadButton::B, PadButton::A]),
        1500,
    )
}

/// Rising punch: Right, Down, Down-Right, punch.
pub fn shoryuken() -> ComboPattern {
    ComboPattern::preset(
        "Shoryuken",
        tokens(&[PadButton::B, PadButton::X, PadButton::Y, PadButton::A]),
        1500,
    )
}

/// Up, Up, Down, Down, Left, Right, Left, Right.
pub fn konami_code() -> ComboPattern {
    ComboPattern::preset(
        "KonamiCode",
        tokens(&[
            PadButton::Y,
            PadButton::Y,
            PadButton::X,
            PadButton::X,
            PadButton::Back,
            PadButton::B,
            PadButton::Back,
            PadButton::B,
        ]),
        5000,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hadoken_shape() {
        let p = hadoken();
        assert_eq!(p.name(), "Hadoken");
        assert_eq!(p.tokens().len(), 4);
        assert_eq!(p.timeout_ms(), 1500);
        assert!(p.is_enabled());
    }

    #[test]
    fn test_shoryuken_shape() {
        let p = shoryuken();
        assert_eq!(p.tokens().len(), 4);
        assert_eq!(
            p.tokens().first().copied(),
            Some(ComboToken::Button(PadButton::B))
        );
    }

    #[test]
    fn test_konami_code_shape() {
        let p = konami_code();
        assert_eq!(p.tokens().len(), 8);
        assert_eq!(p.timeout_ms(), 5000);
    }
}
