use std::{
    cell::RefCell,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    rc::Rc,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reeltime", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved state at one or more instants, one JSON object per line.
    State(StateArgs),
    /// Export every frame of the timeline as JSON lines.
    Export(ExportArgs),
    /// Render a single frame through the export path and print it.
    Inspect(InspectArgs),
    /// Run the timeline engine at a fixed step and print its change events.
    Events(EventsArgs),
}

#[derive(Parser, Debug)]
struct SpecArgs {
    /// Timeline JSON. The built-in timeline is used when omitted.
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Fail on an invalid timeline instead of falling back to the built-in one.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct StateArgs {
    #[command(flatten)]
    spec: SpecArgs,

    /// Elapsed time in milliseconds (repeatable).
    #[arg(long = "at", required = true)]
    at: Vec<f64>,

    /// Pretty-print each state.
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    spec: SpecArgs,

    /// Output path; `-` writes to stdout.
    #[arg(long, default_value = "-")]
    out: PathBuf,

    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    #[arg(long, default_value_t = 1920)]
    width: u32,

    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Export length in milliseconds; defaults to the timeline duration.
    #[arg(long)]
    duration: Option<f64>,

    #[arg(long, value_enum, default_value_t = QualityChoice::Standard)]
    quality: QualityChoice,

    #[arg(long, value_enum, default_value_t = BackendChoice::DisplayList)]
    backend: BackendChoice,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    #[command(flatten)]
    spec: SpecArgs,

    /// Elapsed time in milliseconds.
    #[arg(long)]
    at: f64,

    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    #[arg(long, value_enum, default_value_t = BackendChoice::DisplayList)]
    backend: BackendChoice,
}

#[derive(Parser, Debug)]
struct EventsArgs {
    #[command(flatten)]
    spec: SpecArgs,

    /// Polling rate of the fixed-step clock.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    DisplayList,
    Null,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityChoice {
    Draft,
    Standard,
    High,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::State(args) => cmd_state(args),
        Command::Export(args) => cmd_export(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Events(args) => cmd_events(args),
    }
}

fn read_spec(args: &SpecArgs) -> anyhow::Result<reeltime::TimelineSpec> {
    let Some(path) = &args.spec else {
        return Ok(reeltime::default_spec());
    };
    if !args.strict {
        return Ok(reeltime::SpecLoader::load_from_path(path));
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open timeline '{}'", path.display()))?;
    reeltime::SpecLoader::try_load(&text)
        .with_context(|| format!("load timeline '{}'", path.display()))
}

fn make_program(spec: &reeltime::TimelineSpec) -> Arc<dyn reeltime::Program> {
    Arc::new(reeltime::SequenceProgram::single(
        reeltime::Scene::from_spec("main", spec),
    ))
}

fn make_backend(choice: BackendChoice) -> Box<dyn reeltime::ElementBackend> {
    let kind = match choice {
        BackendChoice::DisplayList => reeltime::BackendKind::DisplayList,
        BackendChoice::Null => reeltime::BackendKind::Null,
    };
    reeltime::create_backend(kind)
}

fn quality(choice: QualityChoice) -> reeltime::QualityPreset {
    match choice {
        QualityChoice::Draft => reeltime::QualityPreset::Draft,
        QualityChoice::Standard => reeltime::QualityPreset::Standard,
        QualityChoice::High => reeltime::QualityPreset::High,
    }
}

fn open_output(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(std::io::stdout().lock())));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create output '{}'", path.display()))?;
    Ok(Box::new(BufWriter::new(f)))
}

fn cmd_state(args: StateArgs) -> anyhow::Result<()> {
    let spec = read_spec(&args.spec)?;
    let resolver = reeltime::StateResolver::from_spec(&spec);

    let mut out = BufWriter::new(std::io::stdout().lock());
    for ms in args.at {
        let state = resolver.state_at(ms);
        if args.pretty {
            serde_json::to_writer_pretty(&mut out, &state)?;
        } else {
            serde_json::to_writer(&mut out, &state)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let spec = read_spec(&args.spec)?;
    let opts = reeltime::ExportOpts {
        width: args.width,
        height: args.height,
        fps: args.fps,
        duration_ms: args.duration,
        quality: quality(args.quality),
    };

    let mut backend = make_backend(args.backend);
    let mut session =
        reeltime::ExportSession::for_program(make_program(&spec), backend.as_mut(), opts)?;

    let mut sink = reeltime::JsonLinesSink::new(open_output(&args.out)?);
    let stats = session.run(&mut sink)?;
    sink.into_inner()
        .flush()
        .with_context(|| format!("flush '{}'", args.out.display()))?;

    eprintln!(
        "exported {} frames ({} static) to '{}'",
        stats.frames_total,
        stats.frames_static,
        args.out.display()
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let spec = read_spec(&args.spec)?;
    let opts = reeltime::ExportOpts {
        fps: args.fps,
        ..reeltime::ExportOpts::default()
    };

    let mut backend = make_backend(args.backend);
    let mut session =
        reeltime::ExportSession::for_program(make_program(&spec), backend.as_mut(), opts)?;

    let pipeline = session.pipeline();
    for id in pipeline.scene_ids() {
        let labels: Vec<&str> = pipeline
            .element_kinds(id)
            .unwrap_or_default()
            .into_iter()
            .map(reeltime::ElementKind::label)
            .collect();
        eprintln!("scene '{id}': {}", labels.join(", "));
    }

    let record = session
        .seek(args.at)
        .with_context(|| format!("render frame at {} ms", args.at))?;
    let mut out = BufWriter::new(std::io::stdout().lock());
    serde_json::to_writer_pretty(&mut out, &record)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn cmd_events(args: EventsArgs) -> anyhow::Result<()> {
    let spec = read_spec(&args.spec)?;
    let resolver = reeltime::StateResolver::from_spec(&spec);
    let source = reeltime::FixedStepTimeSource::new(args.fps, resolver.compiled().duration())?;

    let pending: Rc<RefCell<Vec<reeltime::TimelineEvent>>> = Rc::default();
    let mut engine = reeltime::TimelineEngine::new(resolver, source);
    let sink = Rc::clone(&pending);
    engine.on_event(move |e| sink.borrow_mut().push(e.clone()));
    engine.start();

    let mut out = BufWriter::new(std::io::stdout().lock());
    loop {
        let elapsed_ms = engine.tick().map_or(0.0, |s| s.elapsed_ms);
        for event in pending.borrow_mut().drain(..) {
            let line = serde_json::json!({ "elapsedMs": elapsed_ms, "event": event });
            serde_json::to_writer(&mut out, &line)?;
            writeln!(out)?;
        }
        if !engine.source_mut().next() {
            break;
        }
    }
    engine.stop();
    out.flush()?;
    Ok(())
}
