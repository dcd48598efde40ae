mod bar;
mod pcm;
mod screen;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use recept_core::{note, ConfigManager, PeriodArray, Settings};

use bar::{Bar, Orientation, Scale};
use pcm::PcmSampler;
use screen::Screen;

/// Real-time terminal receptor: turns a raw PCM stream into a ladder of
/// period sensors, one row per sensor, redrawn every frame.
#[derive(Parser, Debug)]
#[command(name = "recept")]
#[command(about = "Terminal pitch and rhythm receptor display")]
#[group(required = true, multiple = false, id = "source")]
struct Args {
    /// Terminal width, in columns (overrides the loaded config for this run)
    #[arg(short = 'c', long)]
    columns: Option<u16>,

    /// Terminal height, in rows, one row reserved for status text (overrides
    /// the loaded config for this run)
    #[arg(short = 'l', long)]
    lines: Option<u16>,

    /// Input sample rate, in Hz (overrides the loaded config for this run)
    #[arg(short = 'r', long)]
    sample_rate: Option<u32>,

    /// Display refresh rate, in frames per second (overrides the loaded
    /// config for this run)
    #[arg(short = 'f', long)]
    fps: Option<u32>,

    /// Settings file to load and reuse (written out with defaults on first
    /// run if it doesn't exist yet)
    #[arg(short = 'g', long, default_value = "config.json")]
    config: PathBuf,

    /// Read raw PCM from this already-open file descriptor
    #[arg(short = 'd', long, group = "source")]
    fd: Option<i32>,

    /// Read raw PCM from this file
    #[arg(short = 'p', long, group = "source")]
    path: Option<PathBuf>,
}

fn open_source(args: &Args) -> anyhow::Result<Box<dyn io::Read + Send>> {
    if let Some(path) = &args.path {
        return Ok(Box::new(File::open(path)?));
    }
    if let Some(fd) = args.fd {
        #[cfg(unix)]
        {
            use std::os::unix::io::FromRawFd;
            // SAFETY: the caller (per the CLI contract) hands us an fd it
            // owns and promises stays open and valid for our lifetime.
            return Ok(Box::new(unsafe { File::from_raw_fd(fd) }));
        }
        #[cfg(not(unix))]
        {
            anyhow::bail!("-d/--fd is only supported on unix targets");
        }
    }
    anyhow::bail!("one of -d/--fd or -p/--path is required")
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("recept: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let source = open_source(&args)?;

    let mut config = ConfigManager::new(Some(args.config.clone()));
    let loaded = config.load().map_err(|e| anyhow::anyhow!("{e}"))?;

    // -c/-l/-r/-f override the loaded settings for this run only; they are
    // never written back through `config`.
    let settings = Settings {
        columns: args.columns.unwrap_or(loaded.columns),
        lines: args.lines.unwrap_or(loaded.lines),
        fps: args.fps.unwrap_or(loaded.fps),
        sample_rate: args.sample_rate.unwrap_or(loaded.sample_rate),
        ..loaded
    };

    let rows = (settings.lines.max(2) - 1) as usize;
    let columns = settings.columns as usize;

    let mut sampler = PcmSampler::new(source, settings.sample_rate, rows.max(1));
    let mut array = PeriodArray::new(
        settings.base_field(),
        1.0 / settings.period_response_hz,
        settings.octave_bandwidth,
        settings.scale_factor,
    );
    array.populate(settings.octaves, settings.bandwidth_factor)?;

    let mut screen = Screen::new(columns, settings.lines as usize);
    let bar = Bar::new(Orientation::Positive, Scale::Log);

    // Sample-per-row throttling from the legacy console demo: the display
    // only needs to repaint `fps` times a second, far slower than the
    // sample rate, so only every `modulus`-th row triggers a redraw.
    let modulus = ((settings.sample_rate as f64 / rows as f64 / settings.fps as f64).floor() as usize).max(1);
    let effective_fps = settings.sample_rate as f64 / rows as f64 / modulus as f64;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", Screen::clear())?;

    // Raw mode suppresses line buffering/echo so the redraw below owns the
    // whole terminal; always paired with disable_raw_mode on every exit
    // path, including the early-return on EOF below.
    enable_raw_mode()?;
    let result = render_loop(&mut out, &mut sampler, &mut array, &mut screen, &bar, &settings, rows, columns, modulus, effective_fps);
    disable_raw_mode()?;
    result
}

#[allow(clippy::too_many_arguments)]
fn render_loop(
    out: &mut impl Write,
    sampler: &mut PcmSampler,
    array: &mut PeriodArray,
    screen: &mut Screen,
    bar: &Bar,
    settings: &Settings,
    rows: usize,
    columns: usize,
    modulus: usize,
    effective_fps: f64,
) -> anyhow::Result<()> {
    let mut frame: u64 = 0;
    'outer: loop {
        for row in 0..rows {
            let sample = sampler.demand_next()?;
            if sample.eof {
                break 'outer;
            }
            array.sample(sampler.sample_time(), sample.value);

            if frame % modulus as u64 == 0 {
                render_row(screen, array, bar, row, columns, settings.sample_rate as f64, settings.a4_hz);
            }
        }

        if frame % modulus as u64 == 0 {
            screen.nprintf(
                0,
                rows,
                columns,
                None,
                &format!(
                    "sample_rate={} fps={} frame={} samples={} effective_fps={:.1}",
                    settings.sample_rate, settings.fps, frame, sampler.sample_count(), effective_fps
                ),
            );
            write!(out, "{}", screen.draw())?;
            out.flush()?;
        }

        frame += 1;
    }

    Ok(())
}

/// One receptor row: a note-name/octave/cents label from the sensor's
/// target period, followed by a bar showing that period's current
/// lifecycle envelope.
fn render_row(
    screen: &mut Screen,
    array: &PeriodArray,
    bar: &Bar,
    row: usize,
    columns: usize,
    sample_rate: f64,
    a4_hz: f64,
) {
    let sensors = array.sensors();
    if row >= sensors.len() {
        return;
    }

    let sensor = &sensors[row];
    let value = array.values()[row];

    let label_width = 12.min(columns / 3).max(1);
    let bar_width = columns.saturating_sub(label_width);

    let note_label = match note(sample_rate, sensor.field.period, a4_hz) {
        Ok(n) => format!("{:2}{}{:>3.0}", n.octave, n.name, n.cents),
        Err(_) => "  --  ".to_string(),
    };
    screen.nprintf(0, row, label_width, Some(' '), &note_label);

    let energy = value.period_lifecycle.r;
    bar.set(&mut screen.pos(label_width, row)[..bar_width], energy);
}
