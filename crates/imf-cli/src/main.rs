use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use imf_lib::{
    config::read_config,
    io::{raw::read_raw_csv, table::read_feature_table, RowPolicy},
    label::MotionLabel,
    metrics::{features::FeatureRow, summary::summarize_by_label},
    pipeline::{process_file, run, FileLabel, PipelineConfig},
    plot::{box_figures, figure_from_conditioned, figure_from_raw, BoxFigure, Figure, Series},
    signal::condition_with_spec,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "imf",
    version,
    about = "IMF: IMU motion feature extraction tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Shared by the extraction commands; unset values keep the run-file or
// built-in defaults.
#[derive(Args)]
struct SignalArgs {
    /// Sample rate of the raw recordings (Hz)
    #[arg(long)]
    fs: Option<f64>,
    /// Window length (seconds)
    #[arg(long)]
    window_s: Option<f64>,
    /// Low-pass cutoff (Hz)
    #[arg(long)]
    cutoff_hz: Option<f64>,
    /// Butterworth order
    #[arg(long)]
    order: Option<usize>,
    /// Fail on rows that do not have exactly three fields instead of dropping them
    #[arg(long)]
    strict_rows: bool,
}

impl SignalArgs {
    fn apply(&self, cfg: &mut PipelineConfig) {
        if let Some(fs) = self.fs {
            cfg.sample_rate_hz = fs;
        }
        if let Some(window_s) = self.window_s {
            cfg.window_seconds = window_s;
        }
        if let Some(cutoff_hz) = self.cutoff_hz {
            cfg.cutoff_hz = cutoff_hz;
        }
        if let Some(order) = self.order {
            cfg.filter_order = order;
        }
        if self.strict_rows {
            cfg.row_policy = RowPolicy::Reject;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over a file→label mapping and write the feature table
    Extract {
        /// TOML run file
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        signal: SignalArgs,
        /// Directory the mapped files are resolved against
        #[arg(long)]
        input_dir: Option<PathBuf>,
        /// Output feature table
        #[arg(long)]
        out: Option<PathBuf>,
        /// FILE=LABEL, repeatable; replaces the configured mapping
        #[arg(long = "map", value_parser = parse_mapping)]
        map: Vec<FileLabel>,
    },
    /// Print one JSON feature row per window of a single raw recording
    Features {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_parser = parse_label)]
        label: MotionLabel,
        #[command(flatten)]
        signal: SignalArgs,
    },
    /// Per-label box statistics of every feature column
    Summarize {
        #[arg(long)]
        input: PathBuf,
        /// Also draw one `<feature>.png` box plot per column into this directory
        #[arg(long)]
        png_dir: Option<PathBuf>,
    },
    /// Render a raw recording's accel and gyro magnitudes to a PNG
    PlotRaw {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    /// Render raw against mean-removed, low-passed magnitudes to a two-panel PNG
    PlotFiltered {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        signal: SignalArgs,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Extract {
            config,
            signal,
            input_dir,
            out,
            map,
        } => cmd_extract(config.as_deref(), &signal, input_dir, out, map)?,
        Commands::Features {
            input,
            label,
            signal,
        } => cmd_features(&input, label, &signal)?,
        Commands::Summarize { input, png_dir } => cmd_summarize(&input, png_dir.as_deref())?,
        Commands::PlotRaw { input, out, title } => cmd_plot_raw(&input, &out, title)?,
        Commands::PlotFiltered {
            input,
            out,
            title,
            signal,
        } => cmd_plot_filtered(&input, &out, title, &signal)?,
    }
    Ok(())
}

fn parse_label(value: &str) -> Result<MotionLabel, String> {
    value.parse::<MotionLabel>().map_err(|e| e.to_string())
}

fn parse_mapping(value: &str) -> Result<FileLabel, String> {
    let (file, label) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FILE=LABEL, got '{}'", value))?;
    if file.trim().is_empty() {
        return Err(format!("missing file name in '{}'", value));
    }
    Ok(FileLabel::new(file.trim(), parse_label(label)?))
}

fn cmd_extract(
    config: Option<&Path>,
    signal: &SignalArgs,
    input_dir: Option<PathBuf>,
    out: Option<PathBuf>,
    map: Vec<FileLabel>,
) -> Result<()> {
    let mut cfg = match config {
        Some(path) => read_config(path).context("loading run config")?,
        None => PipelineConfig::default(),
    };
    signal.apply(&mut cfg);
    if let Some(dir) = input_dir {
        cfg.input_dir = dir;
    }
    if let Some(out) = out {
        cfg.output = out;
    }
    if !map.is_empty() {
        cfg.files = map;
    }
    let summary = run(&cfg).context("feature extraction failed")?;
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn cmd_features(input: &Path, label: MotionLabel, signal: &SignalArgs) -> Result<()> {
    let mut cfg = PipelineConfig::default();
    signal.apply(&mut cfg);
    cfg.validate()?;
    let features = process_file(input, label, &cfg)
        .with_context(|| format!("extracting features from {}", input.display()))?;
    for row in &features.rows {
        println!("{}", serde_json::to_string(&FeatureRow::from(row))?);
    }
    Ok(())
}

fn cmd_summarize(input: &Path, png_dir: Option<&Path>) -> Result<()> {
    let rows = read_feature_table(input)
        .with_context(|| format!("reading feature table {}", input.display()))?;
    let summary = summarize_by_label(&rows);
    if let Some(dir) = png_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        for fig in box_figures(&summary) {
            let path = dir.join(format!("{}.png", fig.feature));
            draw_box_figure(&path, &fig)
                .with_context(|| format!("drawing {}", path.display()))?;
        }
    }
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn plot_title(input: &Path, title: Option<String>) -> String {
    title.unwrap_or_else(|| {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Motion".into())
    })
}

fn cmd_plot_raw(input: &Path, out: &Path, title: Option<String>) -> Result<()> {
    let parsed = read_raw_csv(input, RowPolicy::Skip)?;
    if parsed.series.is_empty() {
        return Err(anyhow!("{} has no samples to plot", input.display()));
    }
    let fig = figure_from_raw(&plot_title(input, title), &parsed.series, 4096);
    draw_plotters_figures(out, &[fig])?;
    Ok(())
}

fn cmd_plot_filtered(
    input: &Path,
    out: &Path,
    title: Option<String>,
    signal: &SignalArgs,
) -> Result<()> {
    let mut cfg = PipelineConfig::default();
    signal.apply(&mut cfg);
    let spec = cfg.filter_spec();
    spec.validate()?;
    let parsed = read_raw_csv(input, cfg.row_policy)?;
    let conditioned = condition_with_spec(&parsed.series, &spec)
        .with_context(|| format!("conditioning {}", input.display()))?;
    let title = plot_title(input, title);
    let figs = figure_from_conditioned(&title, &parsed.series, &conditioned, 4096);
    draw_plotters_figures(out, &figs)?;
    Ok(())
}

/// Stack `figs` vertically into one PNG.
fn draw_plotters_figures(path: &Path, figs: &[Figure]) -> Result<()> {
    let height = 500 * figs.len().max(1) as u32;
    let root = BitMapBackend::new(path, (1000, height)).into_drawing_area();
    root.fill(&WHITE)?;
    for (area, fig) in root.split_evenly((figs.len().max(1), 1)).iter().zip(figs) {
        draw_panel(area, fig)?;
    }
    root.present()?;
    Ok(())
}

fn draw_panel(area: &DrawingArea<BitMapBackend<'_>, Shift>, fig: &Figure) -> Result<()> {
    let (x_min, mut x_max, y_min, mut y_max) =
        fig.bounds().ok_or_else(|| anyhow!("figure has no points"))?;
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(
            fig.title.clone().unwrap_or_else(|| "Plot".into()),
            ("sans-serif", 24),
        )
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    let mut mesh = chart.configure_mesh();
    if let Some(label) = &fig.x.label {
        mesh.x_desc(label.as_str());
    }
    if let Some(label) = &fig.y.label {
        mesh.y_desc(label.as_str());
    }
    mesh.draw()?;
    for series in &fig.series {
        match series {
            Series::Line(line) => {
                let (r, g, b) = line.style.color.rgb();
                let style = RGBColor(r, g, b).stroke_width(line.style.width.ceil() as u32);
                chart
                    .draw_series(LineSeries::new(
                        line.points.iter().map(|p| (p[0], p[1])),
                        style,
                    ))?
                    .label(line.name.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
            }
        }
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_box_figure(path: &Path, fig: &BoxFigure) -> Result<()> {
    let (lo, mut hi) = fig
        .y_range()
        .ok_or_else(|| anyhow!("no labels to draw for {}", fig.feature))?;
    if hi <= lo {
        hi = lo + 1.0;
    }
    let pad = 0.05 * (hi - lo);
    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let groups = fig.groups.len();
    let names: Vec<&str> = fig.groups.iter().map(|g| g.name.as_str()).collect();
    let label_of = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 {
            names.get(idx as usize).map(|s| s.to_string()).unwrap_or_default()
        } else {
            String::new()
        }
    };
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(fig.title.as_str(), ("sans-serif", 22))
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..groups as f64 - 0.5, lo - pad..hi + pad)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups)
        .x_label_formatter(&label_of)
        .y_desc(fig.feature.as_str())
        .draw()?;

    let color = RGBColor(0x1F, 0x77, 0xB4);
    chart.draw_series(fig.groups.iter().enumerate().map(|(i, g)| {
        let x = i as f64;
        Rectangle::new([(x - 0.3, g.stats.q1), (x + 0.3, g.stats.q3)], color.mix(0.3).filled())
    }))?;
    chart.draw_series(fig.groups.iter().enumerate().flat_map(|(i, g)| {
        let (x, s) = (i as f64, g.stats);
        let (left, right) = (x - 0.3, x + 0.3);
        [
            vec![(left, s.q1), (right, s.q1), (right, s.q3), (left, s.q3), (left, s.q1)],
            vec![(left, s.median), (right, s.median)],
            vec![(x, s.min), (x, s.q1)],
            vec![(x, s.q3), (x, s.max)],
            vec![(x - 0.15, s.min), (x + 0.15, s.min)],
            vec![(x - 0.15, s.max), (x + 0.15, s.max)],
        ]
        .into_iter()
        .map(move |points| PathElement::new(points, color.stroke_width(2)))
    }))?;
    root.present()?;
    Ok(())
}
