use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use watershed_fx::capture::{FrameSource, ImageSequence};
use watershed_fx::dispatch;
use watershed_fx::output::{ImageDirectoryOutput, OutputSink};
use watershed_fx::segmentation::{self, ObjectCategory, WatershedSegmenter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input frame image, or directory of frame images (read in name order)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving the segmented frames
    #[arg(short, long, default_value = "segmented")]
    output: PathBuf,

    /// Index of the recorded object; 1 (Toucan) uses a fixed threshold
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    category: i32,

    /// Linear contrast gain applied to the gray frame
    #[arg(long)]
    contrast_gain: Option<f32>,

    /// Fraction of the maximum distance above which pixels are sure foreground
    #[arg(long)]
    sure_foreground_ratio: Option<f32>,

    /// Fixed threshold level, overriding the category's threshold policy
    #[arg(long)]
    manual_threshold: Option<u8>,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Frames decoded and segmented per batch
    #[arg(long, default_value_t = 64)]
    batch_size: usize,

    /// Save a grid of every pipeline stage for the first frame to this PNG
    #[arg(long)]
    plot_stages: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("watershed-fx starting");
    tracing::info!("Object category: {}", args.category);

    let mut source = ImageSequence::open(&args.input)
        .with_context(|| format!("Failed to open frames at {}", args.input.display()))?;

    let mut output = ImageDirectoryOutput::new(&args.output)
        .context("Failed to initialize frame output")?;

    let segmenter = segmentation::create_segmenter(
        ObjectCategory(args.category),
        args.contrast_gain,
        args.sure_foreground_ratio,
        args.manual_threshold,
    );
    tracing::info!("Threshold policy: {:?}", segmenter.config().threshold);

    run_pipeline(&mut source, &mut output, &segmenter, &args)?;

    Ok(())
}

fn run_pipeline<C, O>(
    source: &mut C,
    output: &mut O,
    segmenter: &WatershedSegmenter,
    args: &Args,
) -> Result<()>
where
    C: FrameSource,
    O: OutputSink,
{
    let batch_size = args.batch_size.max(1);
    let mut plot_path = args.plot_stages.clone();
    let mut total_decode_time = Duration::ZERO;
    let mut total_segment_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!(
        "Segmenting {} frames in batches of {}",
        source.frame_count(),
        batch_size
    );

    loop {
        // Decode a batch
        let decode_start = Instant::now();
        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match source.next_frame().context("Failed to read frame")? {
                Some(frame) => batch.push(frame),
                None => break,
            }
        }
        total_decode_time += decode_start.elapsed();

        if batch.is_empty() {
            break;
        }

        if let Some(path) = plot_path.take() {
            let trace = segmenter.segment_traced(batch[0].clone());
            trace
                .plot_stages(&path)
                .with_context(|| format!("Failed to plot stages to {}", path.display()))?;
            tracing::info!("Saved pipeline stages to {}", path.display());
        }

        // Segmentation
        let segment_start = Instant::now();
        let segmented = match args.threads {
            Some(threads) => dispatch::segment_frames_with_threads(batch, segmenter, threads)?,
            None => dispatch::segment_frames(batch, segmenter),
        };
        total_segment_time += segment_start.elapsed();

        // Output frames
        let output_start = Instant::now();
        for frame in &segmented {
            output
                .write_frame(frame)
                .context("Failed to write frame")?;
        }
        total_output_time += output_start.elapsed();

        let frame_count = output.frames_written();
        let per_frame_ms = |total: Duration| total.as_secs_f64() * 1000.0 / frame_count as f64;
        tracing::info!(
            "Frame {}: decode={:.1}ms, segment={:.1}ms, output={:.1}ms per frame",
            frame_count,
            per_frame_ms(total_decode_time),
            per_frame_ms(total_segment_time),
            per_frame_ms(total_output_time)
        );
    }

    tracing::info!("Wrote {} segmented frames", output.frames_written());
    Ok(())
}
