use std::time::Instant;

use super::blob::Blob;
use super::color::ColorSpec;
use super::config::{EffectParameters, PlacementMode};
use super::filter::{Filter, FilterChain};
use super::paint::{paint_blob, Placement};
use super::rand::Random;
use super::raster::Raster;

/// A point in the render at which the raster is handed to the observer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Stage {
    /// The raster holds only the background color.
    Background,
    /// The `index`th foreground color has just been painted.
    Blob { index: usize, color: ColorSpec },
    /// The `index`th filter of the chain has just run.
    Filter { index: usize, filter: Filter },
}

pub struct Render {
    pub raster: Raster,
    /// The outline filled for each foreground color, in paint order.
    pub blobs: Vec<Blob>,
    /// The parameters actually used, after clamping.
    pub params: EffectParameters,
}

/// Renders a mesh gradient.
///
/// Fills the background, paints one blob per foreground color in list order, then runs the
/// [`FilterChain`]. `on_stage` sees the raster after every step; pass `|_, _| {}` to ignore it.
///
/// Numeric parameters are clamped first (see [`EffectParameters::sanitized`]). Returns `None`,
/// without touching `rng`, if the canvas has no pixels.
pub fn render(
    params: &EffectParameters,
    mode: PlacementMode,
    rng: &mut impl Random,
    mut on_stage: impl FnMut(Stage, &Raster),
) -> Option<Render> {
    let params = params.sanitized();
    let Some(mut raster) = Raster::new(params.width, params.height) else {
        tracing::warn!(
            width = params.width,
            height = params.height,
            "nothing to render into"
        );
        return None;
    };
    let _span = tracing::debug_span!(
        "render",
        width = params.width,
        height = params.height,
        ?mode
    )
    .entered();
    let started = Instant::now();

    raster.fill(params.background);
    on_stage(Stage::Background, &raster);

    let mut blobs = Vec::with_capacity(params.colors.len());
    for (index, &color) in params.colors.iter().enumerate() {
        let placement = Placement::choose(mode, params.width, params.height, params.scale, rng);
        let blob = paint_blob(&mut raster, color, placement, rng);
        tracing::debug!(
            index,
            %color,
            points = blob.num_points(),
            radius = placement.end_radius,
            "painted blob"
        );
        blobs.push(blob);
        on_stage(Stage::Blob { index, color }, &raster);
    }

    for (index, filter) in FilterChain::for_params(&params).iter().enumerate() {
        let stage_started = Instant::now();
        filter.apply(&mut raster, rng);
        tracing::debug!(
            stage = filter.name(),
            elapsed_ms = stage_started.elapsed().as_millis() as u64,
            "applied filter"
        );
        on_stage(
            Stage::Filter {
                index,
                filter: *filter,
            },
            &raster,
        );
    }

    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "render finished"
    );
    Some(Render {
        raster,
        blobs,
        params,
    })
}
