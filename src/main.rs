//! perlin_terrain CLI - Perlin-noise heightmap and terrain mesh generator.
//!
//! Generates a normalized height field from fractal Perlin noise and exports
//! it as an image or RAW heightmap, optionally with the triangle-strip mesh.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use perlin_terrain::export::{
    expected_file_size, export_height_field_png, export_height_field_raw, export_mesh_obj,
    PngExportOptions, RawFormat,
};
use perlin_terrain::noise::{FractalNoise, FractalNoiseConfig, GradientKind, Interpolation};
use perlin_terrain::terrain::{generate_height_field, StripLayout, TerrainMesh};

/// Perlin-noise heightmap and terrain mesh generator.
#[derive(Parser)]
#[command(name = "perlin_terrain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a height field and export it.
    Generate(GenerateArgs),

    /// Display memory and file size estimates for a grid.
    Info {
        /// Grid width in cells.
        #[arg(long, default_value = "400")]
        width: u32,

        /// Grid height in cells.
        #[arg(long, default_value = "400")]
        height: u32,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Grid width in cells.
    #[arg(long, default_value = "400")]
    width: u32,

    /// Grid height in cells.
    #[arg(long, default_value = "400")]
    height: u32,

    /// Cells spanned by one base-frequency noise cell.
    #[arg(short, long, default_value = "400")]
    grid_size: f64,

    /// Random seed for reproducible generation (default: current time).
    #[arg(short, long)]
    seed: Option<u64>,

    /// Load the noise configuration from a JSON file; noise flags below are ignored.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use the rough preset (permutation table, persistence 1.7, z = 0.5).
    #[arg(long)]
    rough: bool,

    /// Gradient strategy.
    #[arg(long, default_value = "hashed")]
    gradient: GradientArg,

    /// Interpolation between lattice corners.
    #[arg(long, default_value = "linear")]
    interpolation: InterpolationArg,

    /// Number of noise octaves.
    #[arg(long, default_value = "12")]
    octaves: u8,

    /// Frequency multiplier per octave (lacunarity).
    #[arg(long, default_value = "2.0")]
    lacunarity: f64,

    /// Amplitude divisor per octave (persistence).
    #[arg(long, default_value = "2.0")]
    persistence: f64,

    /// Contrast applied before clamping.
    #[arg(long, default_value = "1.2")]
    contrast: f64,

    /// Sample a z slice of 3D noise instead of 2D noise.
    #[arg(long)]
    z_slice: Option<f64>,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Base name for output files.
    #[arg(short, long, default_value = "terrain")]
    name: String,

    /// Height field export format.
    #[arg(short, long, default_value = "png")]
    format: ExportFormat,

    /// Also export the triangle-strip mesh as OBJ.
    #[arg(long)]
    mesh: bool,

    /// Mesh height scale.
    #[arg(long, default_value = "64.0")]
    vertical_scale: f32,

    /// Mesh height offset subtracted after scaling.
    #[arg(long, default_value = "16.0")]
    vertical_shift: f32,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG (universal compatibility).
    Png,
    /// 16-bit RAW little-endian (Unity).
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
}

#[derive(Clone, Copy, ValueEnum)]
enum GradientArg {
    /// Table-free hashed gradients.
    Hashed,
    /// Seeded permutation table.
    Permutation,
}

#[derive(Clone, Copy, ValueEnum)]
enum InterpolationArg {
    Linear,
    Cubic,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Info { width, height } => run_info(width, height),
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("Error {}: {}", context, err);
    process::exit(1);
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn load_config(path: &Path) -> Result<FractalNoiseConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

fn noise_config(args: &GenerateArgs, seed: u64) -> FractalNoiseConfig {
    if let Some(path) = &args.config {
        let mut config = load_config(path)
            .unwrap_or_else(|e| fail(&format!("reading config {}", path.display()), e));
        if args.seed.is_some() {
            config.seed = seed;
        }
        println!("Config: {}", path.display());
        return config;
    }

    if args.rough {
        println!("Preset: rough");
        return FractalNoiseConfig::rough(seed);
    }

    FractalNoiseConfig {
        octaves: args.octaves,
        frequency: 1.0,
        lacunarity: args.lacunarity,
        persistence: args.persistence,
        contrast: args.contrast,
        z_slice: args.z_slice,
        gradient: match args.gradient {
            GradientArg::Hashed => GradientKind::Hashed,
            GradientArg::Permutation => GradientKind::Permutation,
        },
        interpolation: match args.interpolation {
            InterpolationArg::Linear => Interpolation::Linear,
            InterpolationArg::Cubic => Interpolation::CubicHermite,
        },
        seed,
    }
}

fn run_generate(args: GenerateArgs) {
    let seed = args.seed.unwrap_or_else(time_seed);
    let config = noise_config(&args, seed);
    log::trace!("noise config: {:?}", config);

    println!("perlin_terrain - Heightmap Generator");
    println!("====================================");
    println!("Grid: {}x{} (grid size {})", args.width, args.height, args.grid_size);
    println!("Seed: {}", config.seed);
    println!(
        "Noise: {:?} gradients, {} octaves, persistence {}",
        config.gradient, config.octaves, config.persistence
    );
    println!("Output: {}", args.output.display());

    let start = Instant::now();

    let noise = FractalNoise::from_config(&config).unwrap_or_else(|e| fail("in noise config", e));
    let field = generate_height_field(args.width, args.height, args.grid_size, &noise)
        .unwrap_or_else(|e| fail("during generation", e));

    println!("Generation completed in {:.2?}", start.elapsed());
    let (min_h, max_h) = field.value_range();
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);

    std::fs::create_dir_all(&args.output)
        .unwrap_or_else(|e| fail("creating output directory", e));

    println!("\nExporting...");
    let name = &args.name;
    match args.format {
        ExportFormat::Png => {
            let path = args.output.join(format!("{}.png", name));
            export_height_field_png(&field, &path, &PngExportOptions::default())
                .unwrap_or_else(|e| fail("exporting PNG", e));
            println!("  Exported PNG (16-bit): {}", path.display());
        }
        ExportFormat::Raw => {
            let path = args.output.join(format!("{}.raw", name));
            export_height_field_raw(&field, &path, RawFormat::R16LittleEndian, 0.0, 1.0)
                .unwrap_or_else(|e| fail("exporting RAW", e));
            println!("  Exported RAW (R16): {}", path.display());
        }
        ExportFormat::RawFloat => {
            let path = args.output.join(format!("{}.raw", name));
            export_height_field_raw(&field, &path, RawFormat::R32Float, 0.0, 1.0)
                .unwrap_or_else(|e| fail("exporting RAW", e));
            println!("  Exported RAW (R32 float): {}", path.display());
        }
    }

    if args.mesh {
        let mesh = TerrainMesh::build(&field, args.vertical_scale, args.vertical_shift)
            .unwrap_or_else(|e| fail("building mesh", e));
        let path = args.output.join(format!("{}.obj", name));
        export_mesh_obj(&mesh, &path).unwrap_or_else(|e| fail("exporting mesh", e));
        println!(
            "  Exported mesh: {} ({} vertices, {} strips)",
            path.display(),
            mesh.vertex_count(),
            mesh.layout().num_strips()
        );
    }

    println!("\nDone!");
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

fn run_info(width: u32, height: u32) {
    let layout = StripLayout::new(width, height).unwrap_or_else(|e| fail("in grid size", e));

    let cells = (width as u64) * (height as u64);
    let bytes_heights = cells * 4;
    let bytes_positions = cells * 12;
    let bytes_indices = layout.index_count() as u64 * 4;

    println!("perlin_terrain - Grid Info");
    println!("==========================");
    println!();
    println!("Grid: {}x{} ({} cells)", width, height, cells);
    println!();
    println!("Triangle strips:");
    println!("  Strips:            {:>12}", layout.num_strips());
    println!("  Indices per strip: {:>12}", layout.vertices_per_strip());
    println!("  Total indices:     {:>12}", layout.index_count());
    println!();
    println!("Memory usage (in-memory):");
    println!("  Heights:   {:>12} bytes ({:.2} MB)", bytes_heights, mb(bytes_heights));
    println!("  Positions: {:>12} bytes ({:.2} MB)", bytes_positions, mb(bytes_positions));
    println!("  Indices:   {:>12} bytes ({:.2} MB)", bytes_indices, mb(bytes_indices));
    println!();
    println!("Export file sizes:");
    for (label, format) in [
        ("RAW (R16)", RawFormat::R16LittleEndian),
        ("RAW (R32)", RawFormat::R32Float),
    ] {
        let bytes = expected_file_size(width, height, format);
        println!("  {:<10} {:>12} bytes ({:.2} MB)", label, bytes, mb(bytes));
    }
}
