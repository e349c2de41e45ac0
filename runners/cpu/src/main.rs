use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use glyph_runner_cpu::{
    draw, glyph_quad, DrawCall, FilterMode, GlyphAtlas, GlyphBitmap, Rect, RunnerError, Sampler,
    Scissor, Target,
};
use shared::{DrawConstants, QuadInstance};
use spirv_std::glam::{vec2, Vec4};

const BACKGROUND: Vec4 = Vec4::new(0.45, 0.55, 0.60, 1.00);

const PALETTE: [Vec4; 6] = [
    Vec4::new(1.0, 1.0, 1.0, 1.0),
    Vec4::new(0.9, 0.2, 0.2, 1.0),
    Vec4::new(0.2, 0.8, 0.3, 0.8),
    Vec4::new(0.2, 0.3, 0.9, 0.6),
    Vec4::new(0.95, 0.85, 0.1, 1.0),
    Vec4::new(0.0, 0.0, 0.0, 0.5),
];

#[derive(Debug, Parser)]
#[command(about = "Rust GPU - CPU glyph shader evaluation")]
struct Options {
    #[arg(long, default_value_t = 760)]
    width: u32,

    #[arg(long, default_value_t = 760)]
    height: u32,

    /// Filter used when sampling the glyph cache
    #[arg(short, long, default_value_t = FilterMode::Linear)]
    filter: FilterMode,

    /// Number of glyphs to lay out
    #[arg(short, long, default_value_t = 400)]
    glyphs: usize,

    /// Starting size of the glyph cache, grown when the glyphs do not fit
    #[arg(long, default_value = "64x64", value_parser = parse_size)]
    initial_mask_size: (u32, u32),

    /// Only draw inside `x,y,width,height`
    #[arg(long, value_parser = parse_scissor)]
    scissor: Option<Scissor>,

    /// Write the result as a binary PPM image
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (width, height) = s
        .split_once('x')
        .ok_or_else(|| format!("expected `WIDTHxHEIGHT`, got `{s}`"))?;
    let parse = |v: &str| v.trim().parse::<u32>().map_err(|e| format!("`{v}`: {e}"));
    Ok((parse(width)?, parse(height)?))
}

fn parse_scissor(s: &str) -> Result<Scissor, RunnerError> {
    let invalid = || RunnerError::InvalidScissor(s.to_owned());
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    match values[..] {
        [x, y, width, height] => Ok(Scissor {
            x,
            y,
            width,
            height,
        }),
        _ => Err(invalid()),
    }
}

fn glyph_shapes() -> Vec<GlyphBitmap> {
    [4.0, 6.0, 9.0, 13.0]
        .into_iter()
        .flat_map(|radius: f32| {
            [
                GlyphBitmap::disc(radius),
                GlyphBitmap::ring(radius, (radius / 3.0).max(1.5)),
            ]
        })
        .collect()
}

/// Lays the glyphs out on a grid, cutting the last row in half.
fn layout(options: &Options, atlas: &GlyphAtlas, shapes: &[GlyphBitmap]) -> Vec<QuadInstance> {
    let cell = shapes.iter().map(|g| g.width.max(g.height)).max().unwrap_or(0) + 6;
    let columns = (options.width / cell).max(1) as usize;
    let rows = options.glyphs.div_ceil(columns);
    let bounds = Rect::new(
        vec2(0.0, 0.0),
        vec2(
            options.width as f32,
            (rows.saturating_sub(1) as u32 * cell + cell / 2) as f32,
        ),
    );

    (0..options.glyphs)
        .filter_map(|i| {
            let shape = i % shapes.len();
            let glyph = &shapes[shape];
            let col = (i % columns) as u32;
            let row = (i / columns) as u32;
            let min = vec2(
                (col * cell + (cell - glyph.width) / 2) as f32,
                (row * cell + (cell - glyph.height) / 2) as f32,
            );
            let pixel = Rect::new(min, min + vec2(glyph.width as f32, glyph.height as f32));
            glyph_quad(pixel, atlas.tex_rect(shape), bounds, 0.0, PALETTE[i % PALETTE.len()])
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = Options::parse();

    let shapes = glyph_shapes();
    let atlas = GlyphAtlas::build(&shapes, options.initial_mask_size)?;
    let quads = layout(&options, &atlas, &shapes);

    let mut call = DrawCall::new(DrawConstants::orthographic(options.width, options.height));
    if let Some(scissor) = options.scissor {
        call = call.with_scissor(scissor);
    }
    let sampler = Sampler {
        filter: options.filter,
    };

    let mut target = Target::new(options.width, options.height);
    target.clear(BACKGROUND);

    let start_time = Instant::now();
    let stats = draw(&mut target, atlas.mask(), &sampler, &call, &quads);
    log::info!(
        "Evaluating {} quads ({} triangles, {} fragments, {} discarded) took {} ms",
        quads.len(),
        stats.triangles,
        stats.fragments,
        stats.discarded,
        start_time.elapsed().as_millis()
    );

    if let Some(path) = &options.output {
        let mut out = BufWriter::new(File::create(path)?);
        target.write_ppm(&mut out)?;
        out.flush()?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}
