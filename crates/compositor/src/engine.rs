//! Recipe evaluation.
//!
//! Every function here is pure: inputs are borrowed, outputs freshly
//! allocated (or, for the in-place steps, owned by the caller).

use sat_common::{BandArray, BandIndex, BandLookup, GridShape};
use tracing::debug;

use crate::error::{CompositeError, CompositeResult};
use crate::image::CompositeImage;
use crate::recipe::{Channel, ClipBounds, CompositeRecipe, LayerRecipe, SourceExpression};

/// Evaluate a recipe against a set of bands.
///
/// The recipe is validated and all referenced bands are resolved and
/// shape-checked before any arithmetic, so a failing composite allocates
/// nothing.
pub fn compose<L>(recipe: &CompositeRecipe, bands: &L) -> CompositeResult<CompositeImage>
where
    L: BandLookup + ?Sized,
{
    recipe.validate()?;
    let shape = common_shape(recipe, bands)?;

    debug!(
        recipe = %recipe.name,
        rows = shape.rows,
        cols = shape.cols,
        bands = ?recipe.required_bands(),
        "Composing"
    );

    let red = evaluate_layer(Channel::Red, &recipe.red, bands)?;
    let green = evaluate_layer(Channel::Green, &recipe.green, bands)?;
    let blue = evaluate_layer(Channel::Blue, &recipe.blue, bands)?;

    Ok(CompositeImage::from_layers(shape, [red, green, blue]))
}

/// Evaluate one layer: expression, clip/normalize, gamma, invert.
pub fn evaluate_layer<L>(
    channel: Channel,
    layer: &LayerRecipe,
    bands: &L,
) -> CompositeResult<Vec<f64>>
where
    L: BandLookup + ?Sized,
{
    layer.validate(channel)?;

    let mut values = evaluate_expression(channel, &layer.source, bands)?;
    if let Some(bounds) = layer.clip {
        normalize(channel, &mut values, bounds)?;
    }
    if layer.gamma != 1.0 {
        apply_gamma(&mut values, layer.gamma);
    }
    if layer.invert {
        invert(&mut values);
    }
    Ok(values)
}

/// Weighted sum of the expression's bands, element by element.
pub fn evaluate_expression<L>(
    channel: Channel,
    expression: &SourceExpression,
    bands: &L,
) -> CompositeResult<Vec<f64>>
where
    L: BandLookup + ?Sized,
{
    let mut terms = expression.terms().iter();
    let first = terms
        .next()
        .ok_or(CompositeError::EmptyExpression { channel })?;

    let reference = resolve(bands, first.band)?;
    let mut values: Vec<f64> = reference
        .values()
        .iter()
        .map(|v| v * first.weight)
        .collect();

    for term in terms {
        let band = resolve(bands, term.band)?;
        ensure_same_shape(reference, band)?;
        for (acc, v) in values.iter_mut().zip(band.values()) {
            *acc += v * term.weight;
        }
    }

    Ok(values)
}

/// Clamp every value into the bounds' interval and rescale so that
/// `lower ↦ 0` and `upper ↦ 1`. `NaN` stays `NaN`.
pub fn normalize(channel: Channel, values: &mut [f64], bounds: ClipBounds) -> CompositeResult<()> {
    if bounds.is_degenerate() {
        return Err(CompositeError::DegenerateRange {
            channel,
            lower: bounds.lower,
            upper: bounds.upper,
        });
    }

    let (min, max) = bounds.interval();
    // Halved terms keep bounds near ±f64::MAX from overflowing
    let half_lower = bounds.lower / 2.0;
    let half_span = bounds.half_span();
    for v in values.iter_mut() {
        // f64::clamp keeps NaN
        *v = (v.clamp(min, max) / 2.0 - half_lower) / half_span;
    }
    Ok(())
}

/// Raise every value to `1 / gamma`.
///
/// Callers must have confined values to `[0, 1]` first; see
/// [`LayerRecipe::validate`].
pub fn apply_gamma(values: &mut [f64], gamma: f64) {
    let exponent = 1.0 / gamma;
    for v in values.iter_mut() {
        *v = v.powf(exponent);
    }
}

/// Replace every value `v` with `1 - v`.
pub fn invert(values: &mut [f64]) {
    for v in values.iter_mut() {
        *v = 1.0 - *v;
    }
}

fn resolve<L>(bands: &L, index: BandIndex) -> CompositeResult<&BandArray>
where
    L: BandLookup + ?Sized,
{
    bands
        .band(index)
        .ok_or(CompositeError::MissingBand { band: index })
}

fn ensure_same_shape(first: &BandArray, second: &BandArray) -> CompositeResult<()> {
    if first.shape() != second.shape() {
        return Err(CompositeError::ShapeMismatch {
            first: first.index(),
            first_shape: first.shape(),
            second: second.index(),
            second_shape: second.shape(),
        });
    }
    Ok(())
}

/// Shape shared by every band the recipe references.
fn common_shape<L>(recipe: &CompositeRecipe, bands: &L) -> CompositeResult<GridShape>
where
    L: BandLookup + ?Sized,
{
    let mut reference: Option<&BandArray> = None;
    for (_, layer) in recipe.layers() {
        for index in layer.source.bands() {
            let band = resolve(bands, index)?;
            match reference {
                None => reference = Some(band),
                Some(first) => ensure_same_shape(first, band)?,
            }
        }
    }
    reference
        .map(BandArray::shape)
        .ok_or(CompositeError::EmptyExpression {
            channel: Channel::Red,
        })
}
