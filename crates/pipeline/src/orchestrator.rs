//! Composite batch orchestration.

use std::time::{Duration, Instant};

use abi_reader::{BandSource, SourceMetadata};
use compositor::{compose, CompositeImage, CompositeRecipe};
use projection::{derive_projection, ImageExtent, ProjectionDescriptor};
use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// A finished composite together with the georeference shared by its batch.
#[derive(Debug, Clone)]
pub struct CompositeProduct {
    pub recipe_name: String,
    /// Formula text for titles and captions
    pub description: String,
    pub image: CompositeImage,
    pub projection: ProjectionDescriptor,
    pub extent: ImageExtent,
    pub metadata: SourceMetadata,
}

/// Destination for finished composites (renderer, file writer, collector).
///
/// Sinks are shared across worker threads when recipes run in parallel.
pub trait CompositeSink: Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn accept(&self, product: &CompositeProduct) -> Result<(), Self::Error>;
}

/// What a successful composite produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSummary {
    pub rows: usize,
    pub cols: usize,
    pub missing_pixels: usize,
    pub elapsed: Duration,
}

/// Result of one recipe within a batch.
#[derive(Debug)]
pub struct CompositeOutcome {
    pub recipe: String,
    pub result: PipelineResult<CompositeSummary>,
}

impl CompositeOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-recipe outcomes of a batch, in recipe order.
#[derive(Debug)]
pub struct BatchReport {
    pub projection: ProjectionDescriptor,
    pub extent: ImageExtent,
    pub outcomes: Vec<CompositeOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, recipe: &str) -> Option<&CompositeOutcome> {
        self.outcomes.iter().find(|o| o.recipe == recipe)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &PipelineError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.recipe.as_str(), e)))
    }
}

/// Runs a set of recipes against one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    parallel: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl Pipeline {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.parallel)
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Produce every recipe from `source` and hand the results to `sink`.
    ///
    /// Returns `Err` only when the shared projection cannot be derived;
    /// per-composite failures are reported in the [`BatchReport`].
    pub fn run<S, K>(
        &self,
        source: &S,
        recipes: &[CompositeRecipe],
        sink: &K,
    ) -> PipelineResult<BatchReport>
    where
        S: BandSource + ?Sized,
        K: CompositeSink + ?Sized,
    {
        let started = Instant::now();
        let (projection, extent) = derive_shared_projection(source).map_err(|e| {
            error!(error = %e, "Cannot derive projection, aborting batch");
            e
        })?;
        let metadata = source.metadata();

        info!(
            recipes = recipes.len(),
            parallel = self.parallel,
            platform = metadata.platform_id.as_deref().unwrap_or("unknown"),
            proj = %projection.proj_string(),
            "Starting composite batch"
        );

        let shared = Shared {
            projection: &projection,
            extent,
            metadata: &metadata,
        };
        let run_one = |recipe: &CompositeRecipe| CompositeOutcome {
            recipe: recipe.name.clone(),
            result: produce(source, recipe, sink, &shared),
        };

        let outcomes: Vec<CompositeOutcome> = if self.parallel {
            recipes.par_iter().map(run_one).collect()
        } else {
            recipes.iter().map(run_one).collect()
        };

        let report = BatchReport {
            projection,
            extent,
            outcomes,
        };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Composite batch finished"
        );
        Ok(report)
    }
}

struct Shared<'a> {
    projection: &'a ProjectionDescriptor,
    extent: ImageExtent,
    metadata: &'a SourceMetadata,
}

fn derive_shared_projection<S>(source: &S) -> PipelineResult<(ProjectionDescriptor, ImageExtent)>
where
    S: BandSource + ?Sized,
{
    let scalars = source.projection_scalars()?;
    let coordinates = source.scan_coordinates()?;
    Ok(derive_projection(&scalars, &coordinates.x, &coordinates.y)?)
}

fn produce<S, K>(
    source: &S,
    recipe: &CompositeRecipe,
    sink: &K,
    shared: &Shared<'_>,
) -> PipelineResult<CompositeSummary>
where
    S: BandSource + ?Sized,
    K: CompositeSink + ?Sized,
{
    info!(recipe = %recipe.name, "Producing composite");

    let result = compose_and_deliver(source, recipe, sink, shared);
    match &result {
        Ok(summary) => info!(
            recipe = %recipe.name,
            rows = summary.rows,
            cols = summary.cols,
            missing_pixels = summary.missing_pixels,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Composite complete"
        ),
        Err(e) => warn!(recipe = %recipe.name, error = %e, "Composite failed"),
    }
    result
}

fn compose_and_deliver<S, K>(
    source: &S,
    recipe: &CompositeRecipe,
    sink: &K,
    shared: &Shared<'_>,
) -> PipelineResult<CompositeSummary>
where
    S: BandSource + ?Sized,
    K: CompositeSink + ?Sized,
{
    let started = Instant::now();
    let bands = source.bands(&recipe.required_bands())?;
    let image = compose(recipe, &bands)?;

    let product = CompositeProduct {
        recipe_name: recipe.name.clone(),
        description: recipe.formula(),
        image,
        projection: shared.projection.clone(),
        extent: shared.extent,
        metadata: shared.metadata.clone(),
    };
    sink.accept(&product).map_err(|e| PipelineError::Sink {
        recipe: recipe.name.clone(),
        source: Box::new(e),
    })?;

    Ok(CompositeSummary {
        rows: product.image.rows(),
        cols: product.image.cols(),
        missing_pixels: product.image.missing_pixels(),
        elapsed: started.elapsed(),
    })
}
