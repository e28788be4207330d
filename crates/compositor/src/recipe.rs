//! Declarative composite recipes.

use std::collections::BTreeSet;
use std::fmt;

use sat_common::BandIndex;
use serde::{Deserialize, Serialize};

use crate::error::{CompositeError, CompositeResult};

/// Output color layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Position along the trailing axis of a composite image.
    pub fn offset(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        f.write_str(name)
    }
}

fn unit_weight() -> f64 {
    1.0
}

fn unit_gamma() -> f64 {
    1.0
}

/// One band scaled by a fixed coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandTerm {
    pub band: BandIndex,
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

impl BandTerm {
    pub fn new(band: BandIndex, weight: f64) -> Self {
        Self { band, weight }
    }
}

/// Weighted sum of bands.
///
/// A raw band is `{+1}`, a difference is `{+1, -1}`; weights need not sum to 1.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceExpression {
    terms: Vec<BandTerm>,
}

impl SourceExpression {
    pub fn new(terms: Vec<BandTerm>) -> Self {
        Self { terms }
    }

    /// A single band passed through unchanged.
    pub fn band(index: BandIndex) -> Self {
        Self::new(vec![BandTerm::new(index, 1.0)])
    }

    /// `minuend - subtrahend`.
    pub fn difference(minuend: BandIndex, subtrahend: BandIndex) -> Self {
        Self::new(vec![
            BandTerm::new(minuend, 1.0),
            BandTerm::new(subtrahend, -1.0),
        ])
    }

    /// Linear blend from `(band, weight)` pairs.
    pub fn weighted(terms: &[(BandIndex, f64)]) -> Self {
        Self::new(
            terms
                .iter()
                .map(|&(band, weight)| BandTerm::new(band, weight))
                .collect(),
        )
    }

    pub fn terms(&self) -> &[BandTerm] {
        &self.terms
    }

    pub fn bands(&self) -> impl Iterator<Item = BandIndex> + '_ {
        self.terms.iter().map(|t| t.band)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Display for SourceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            let magnitude = term.weight.abs();
            let sign = if term.weight < 0.0 { "-" } else { "+" };
            match (i, sign) {
                (0, "-") => f.write_str("-")?,
                (0, _) => {}
                _ => write!(f, " {} ", sign)?,
            }
            if magnitude != 1.0 {
                write!(f, "{}*", magnitude)?;
            }
            write!(f, "C{:02}", term.band)?;
        }
        Ok(())
    }
}

/// Valid data range of a layer before normalization.
///
/// `lower` maps to 0 and `upper` to 1. Reversed bounds give a descending
/// ramp; equal bounds are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ClipBounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// `[0, 1]`, for reflectances that only need clamping.
    pub fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Closed interval spanned by the bounds, smallest first.
    pub fn interval(&self) -> (f64, f64) {
        (self.lower.min(self.upper), self.lower.max(self.upper))
    }

    /// `(upper - lower) / 2`, finite for any pair of finite bounds.
    pub fn half_span(&self) -> f64 {
        self.upper / 2.0 - self.lower / 2.0
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.lower.is_finite() && self.upper.is_finite()) || self.half_span() == 0.0
    }
}

/// How to produce one output layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecipe {
    pub source: SourceExpression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip: Option<ClipBounds>,
    #[serde(default = "unit_gamma")]
    pub gamma: f64,
    #[serde(default)]
    pub invert: bool,
}

impl LayerRecipe {
    /// Layer without clipping, gamma or inversion.
    pub fn new(source: SourceExpression) -> Self {
        Self {
            source,
            clip: None,
            gamma: 1.0,
            invert: false,
        }
    }

    pub fn with_clip(mut self, lower: f64, upper: f64) -> Self {
        self.clip = Some(ClipBounds::new(lower, upper));
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// Check the layer can be evaluated without undefined numeric behavior.
    pub fn validate(&self, channel: Channel) -> CompositeResult<()> {
        if self.source.is_empty() {
            return Err(CompositeError::EmptyExpression { channel });
        }
        if let Some(bounds) = self.clip {
            if bounds.is_degenerate() {
                return Err(CompositeError::DegenerateRange {
                    channel,
                    lower: bounds.lower,
                    upper: bounds.upper,
                });
            }
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(CompositeError::InvalidGammaConfiguration {
                channel,
                gamma: self.gamma,
                reason: "gamma must be finite and positive",
            });
        }
        // Negative bases have no real power; clipping is what rules them out
        if self.gamma != 1.0 && self.clip.is_none() {
            return Err(CompositeError::InvalidGammaConfiguration {
                channel,
                gamma: self.gamma,
                reason: "gamma correction requires clip bounds",
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        let mut text = self.source.to_string();
        if let Some(bounds) = self.clip {
            text.push_str(&format!(" [{}, {}]", bounds.lower, bounds.upper));
        }
        if self.gamma != 1.0 {
            text.push_str(&format!(" gamma={}", self.gamma));
        }
        if self.invert {
            text.push_str(" inverted");
        }
        text
    }
}

/// Red, green and blue layer recipes plus a name and a formula description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRecipe {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub red: LayerRecipe,
    pub green: LayerRecipe,
    pub blue: LayerRecipe,
}

impl CompositeRecipe {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        red: LayerRecipe,
        green: LayerRecipe,
        blue: LayerRecipe,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            red,
            green,
            blue,
        }
    }

    /// Layers in stacking order.
    pub fn layers(&self) -> [(Channel, &LayerRecipe); 3] {
        [
            (Channel::Red, &self.red),
            (Channel::Green, &self.green),
            (Channel::Blue, &self.blue),
        ]
    }

    pub fn layer(&self, channel: Channel) -> &LayerRecipe {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    /// Distinct band indices referenced by any layer, ascending.
    pub fn required_bands(&self) -> Vec<BandIndex> {
        self.layers()
            .iter()
            .flat_map(|(_, layer)| layer.source.bands())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn validate(&self) -> CompositeResult<()> {
        for (channel, layer) in self.layers() {
            layer.validate(channel)?;
        }
        Ok(())
    }

    /// The description if one was given, otherwise a formula built from the layers.
    pub fn formula(&self) -> String {
        if !self.description.is_empty() {
            return self.description.clone();
        }
        format!(
            "R: {}; G: {}; B: {}",
            self.red.describe(),
            self.green.describe(),
            self.blue.describe()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_display() {
        assert_eq!(SourceExpression::band(2).to_string(), "C02");
        assert_eq!(SourceExpression::difference(15, 13).to_string(), "C15 - C13");
        assert_eq!(
            SourceExpression::weighted(&[(2, 0.45), (3, 0.1), (1, 0.45)]).to_string(),
            "0.45*C02 + 0.1*C03 + 0.45*C01"
        );
        assert_eq!(SourceExpression::weighted(&[(8, -1.0)]).to_string(), "-C08");
    }

    #[test]
    fn test_required_bands_are_distinct_and_sorted() {
        let recipe = CompositeRecipe::new(
            "test",
            "",
            LayerRecipe::new(SourceExpression::difference(8, 10)),
            LayerRecipe::new(SourceExpression::difference(12, 13)),
            LayerRecipe::new(SourceExpression::band(8)),
        );
        assert_eq!(recipe.required_bands(), vec![8, 10, 12, 13]);
    }

    #[test]
    fn test_gamma_without_clip_is_rejected() {
        let layer = LayerRecipe::new(SourceExpression::band(1)).with_gamma(2.2);
        assert_eq!(
            layer.validate(Channel::Green),
            Err(CompositeError::InvalidGammaConfiguration {
                channel: Channel::Green,
                gamma: 2.2,
                reason: "gamma correction requires clip bounds",
            })
        );
        assert!(layer.with_clip(0.0, 1.0).validate(Channel::Green).is_ok());
    }

    #[test]
    fn test_non_positive_gamma_is_rejected() {
        for gamma in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let layer = LayerRecipe::new(SourceExpression::band(1))
                .with_clip(0.0, 1.0)
                .with_gamma(gamma);
            assert!(matches!(
                layer.validate(Channel::Red),
                Err(CompositeError::InvalidGammaConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_degenerate_bounds() {
        assert!(ClipBounds::new(2.0, 2.0).is_degenerate());
        assert!(ClipBounds::new(f64::NAN, 2.0).is_degenerate());
        assert!(!ClipBounds::new(243.9, 208.5).is_degenerate());
        assert_eq!(ClipBounds::new(243.9, 208.5).interval(), (208.5, 243.9));
    }

    #[test]
    fn test_empty_expression_is_rejected() {
        let layer = LayerRecipe::new(SourceExpression::default());
        assert_eq!(
            layer.validate(Channel::Blue),
            Err(CompositeError::EmptyExpression {
                channel: Channel::Blue
            })
        );
    }

    #[test]
    fn test_formula_fallback() {
        let recipe = CompositeRecipe::new(
            "custom",
            "",
            LayerRecipe::new(SourceExpression::difference(15, 13)).with_clip(-6.7, 2.6),
            LayerRecipe::new(SourceExpression::band(14))
                .with_clip(0.0, 1.0)
                .with_gamma(2.5),
            LayerRecipe::new(SourceExpression::band(13))
                .with_clip(261.2, 288.7)
                .inverted(),
        );
        assert_eq!(
            recipe.formula(),
            "R: C15 - C13 [-6.7, 2.6]; G: C14 [0, 1] gamma=2.5; B: C13 [261.2, 288.7] inverted"
        );
    }
}
