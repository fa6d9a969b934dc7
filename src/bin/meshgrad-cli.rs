use core::fmt::Debug;
use std::path::{Path, PathBuf};
use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use meshgrad::config::{
    AspectRatio, EffectParameters, PlacementMode, DEFAULT_LONG_EDGE, MAX_LONG_EDGE,
};
use meshgrad::preset::PresetDb;
use meshgrad::rand::Rng;

const DEFAULT_NAME: &str = "mesh-gradient-wallpaper";

/// Renders a mesh gradient wallpaper to a PNG file.
#[derive(Parser)]
struct Opts {
    /// 32-byte seed as hex, optionally `0x`-prefixed. Drawn at random (and logged) if omitted.
    #[clap(long)]
    seed: Option<Seed>,

    #[clap(long, value_enum, default_value_t = PlacementMode::Centered)]
    mode: PlacementMode,

    /// Named preset supplying the background and colors, e.g. "Ocean Breeze".
    #[clap(long)]
    preset: Option<String>,

    /// JSON file of additional presets, in the same format as the bundled ones.
    #[clap(long)]
    presets: Option<PathBuf>,

    /// JSON file of effect parameters. Replaces the effect flags below when given.
    #[clap(long)]
    params: Option<PathBuf>,

    /// `W:H`, or one of widescreen, classic, square, ultrawide, portrait.
    #[clap(long, default_value = "16:9")]
    aspect: AspectRatio,

    /// Length of the canvas's longer side, in pixels.
    #[clap(
        long,
        default_value_t = DEFAULT_LONG_EDGE,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_LONG_EDGE))
    )]
    long_edge: u32,

    /// Output name; `.png` is appended.
    #[clap(short, long, default_value = DEFAULT_NAME)]
    name: String,

    /// Print the available presets and exit.
    #[clap(long)]
    list_presets: bool,

    #[clap(flatten)]
    effects: EffectParameters,
}

#[derive(Copy, Clone)]
struct Seed(pub [u8; 32]);
impl Seed {
    fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}
impl FromStr for Seed {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes: Vec<u8> = hex::decode(s)?;
        let bytes: [u8; 32] = <[u8; 32]>::try_from(bytes)
            .map_err(|v| anyhow::anyhow!("seed must be 32 bytes, got {}", v.len()))?;
        Ok(Seed(bytes))
    }
}
impl Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
impl Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

/// `<name>.png`, without doubling an extension the user already typed.
fn png_path(name: &str) -> PathBuf {
    let name = if name.is_empty() { DEFAULT_NAME } else { name };
    if Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{}.png", name))
    }
}

fn load_presets(extra: Option<&Path>) -> anyhow::Result<Vec<PresetDb>> {
    let mut dbs = vec![PresetDb::from_bundle()];
    if let Some(path) = extra {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read presets at {}", path.display()))?;
        let db = PresetDb::from_json(&json)
            .with_context(|| format!("Invalid presets in {}", path.display()))?;
        // User presets shadow the bundled ones.
        dbs.insert(0, db);
    }
    Ok(dbs)
}

fn resolve_params(opts: &Opts, presets: &[PresetDb]) -> anyhow::Result<EffectParameters> {
    let mut params = match &opts.params {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read parameters at {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Invalid parameters in {}", path.display()))?
        }
        None => opts.effects.clone(),
    };
    if let Some(name) = &opts.preset {
        let preset = presets
            .iter()
            .find_map(|db| db.get(name))
            .with_context(|| format!("No preset named {:?}; try --list-presets", name))?;
        preset.apply(&mut params);
    }
    Ok(params.with_aspect(opts.aspect, opts.long_edge))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let presets = load_presets(opts.presets.as_deref())?;

    if opts.list_presets {
        for preset in presets.iter().flat_map(PresetDb::iter) {
            let colors: Vec<String> = preset.colors.iter().map(|c| c.hex()).collect();
            println!("{}: {} on {}", preset.name, colors.join(" "), preset.background);
        }
        return Ok(());
    }

    let params = resolve_params(&opts, &presets)?;
    let seed = match opts.seed {
        Some(seed) => seed,
        None => Seed(Rng::from_entropy().0),
    };
    tracing::info!(%seed, mode = ?opts.mode, width = params.width, height = params.height, "rendering");

    let mut rng = Rng::from_seed(seed.as_bytes());
    let render = meshgrad::pipeline::render(&params, opts.mode, &mut rng, |_, _| {})
        .context("Canvas has no pixels; check --aspect and --long-edge")?;

    let filename = png_path(&opts.name);
    render.raster.write_png(&filename)?;
    tracing::info!(file = %filename.display(), %seed, "wrote png");
    Ok(())
}
