//! Reference recipes for GOES-R ABI.
//!
//! Band numbers are ABI channels: C01 blue (0.47 µm), C02 red (0.64 µm),
//! C03 "veggie" (0.86 µm), C08/C10 water vapor, C11 8.4 µm, C12 ozone,
//! C13 clean longwave (10.3 µm), C14 11.2 µm, C15 dirty longwave (12.3 µm).
//!
//! ABI has no green band, so true color synthesizes one from red, blue and
//! near-IR reflectance.

use crate::recipe::{CompositeRecipe, LayerRecipe, SourceExpression};

pub const TRUE_COLOR: &str = "true_color";
pub const TRUE_COLOR_GAMMA: &str = "true_color_gamma";
pub const DUST: &str = "dust";
pub const AIRMASS: &str = "airmass";

/// Gamma used by the corrected true-color variant.
pub const TRUE_COLOR_GAMMA_VALUE: f64 = 2.2;

fn synthetic_green() -> SourceExpression {
    SourceExpression::weighted(&[(2, 0.45), (3, 0.1), (1, 0.45)])
}

/// Red = C02, green = 0.45·C02 + 0.1·C03 + 0.45·C01, blue = C01, each
/// clamped to `[0, 1]`.
pub fn true_color() -> CompositeRecipe {
    CompositeRecipe::new(
        TRUE_COLOR,
        "True Color: R = C02, G = 0.45*C02 + 0.1*C03 + 0.45*C01, B = C01",
        LayerRecipe::new(SourceExpression::band(2)).with_clip(0.0, 1.0),
        LayerRecipe::new(synthetic_green()).with_clip(0.0, 1.0),
        LayerRecipe::new(SourceExpression::band(1)).with_clip(0.0, 1.0),
    )
}

/// [`true_color`] with gamma 2.2 on every layer.
pub fn true_color_gamma() -> CompositeRecipe {
    let base = true_color();
    CompositeRecipe::new(
        TRUE_COLOR_GAMMA,
        "True Color (gamma 2.2): R = C02, G = 0.45*C02 + 0.1*C03 + 0.45*C01, B = C01",
        base.red.with_gamma(TRUE_COLOR_GAMMA_VALUE),
        base.green.with_gamma(TRUE_COLOR_GAMMA_VALUE),
        base.blue.with_gamma(TRUE_COLOR_GAMMA_VALUE),
    )
}

pub fn dust() -> CompositeRecipe {
    CompositeRecipe::new(
        DUST,
        "Dust RGB: R = C15 - C13, G = C14 - C11, B = C13",
        LayerRecipe::new(SourceExpression::difference(15, 13)).with_clip(-6.7, 2.6),
        LayerRecipe::new(SourceExpression::difference(14, 11))
            .with_clip(-0.5, 20.0)
            .with_gamma(2.5),
        LayerRecipe::new(SourceExpression::band(13)).with_clip(261.2, 288.7),
    )
}

/// Blue runs from 243.9 K (dark) to 208.5 K (bright), hence the inversion.
pub fn airmass() -> CompositeRecipe {
    CompositeRecipe::new(
        AIRMASS,
        "Air Mass RGB: R = C08 - C10, G = C12 - C13, B = C08",
        LayerRecipe::new(SourceExpression::difference(8, 10)).with_clip(-26.2, 0.6),
        LayerRecipe::new(SourceExpression::difference(12, 13)).with_clip(-43.2, 6.7),
        LayerRecipe::new(SourceExpression::band(8))
            .with_clip(208.5, 243.9)
            .inverted(),
    )
}

/// Names accepted by [`preset`].
pub fn preset_names() -> &'static [&'static str] {
    &[TRUE_COLOR, TRUE_COLOR_GAMMA, DUST, AIRMASS]
}

/// Look up a reference recipe by name.
///
/// Matching is case-insensitive and treats `-` like `_`.
pub fn preset(name: &str) -> Option<CompositeRecipe> {
    let key = name.trim().to_ascii_lowercase().replace('-', "_");
    match key.as_str() {
        TRUE_COLOR => Some(true_color()),
        TRUE_COLOR_GAMMA => Some(true_color_gamma()),
        DUST => Some(dust()),
        AIRMASS => Some(airmass()),
        _ => None,
    }
}
