use std::io::{self, BufRead, Write};
use std::time::Instant;

use clap::Parser;
use stikqr::cli::{Cli, Command, ExportArgs, GenerateArgs, WatchArgs};
use stikqr::config::{self, Config};
use stikqr::error::{Error, Result};
use stikqr::platform::{self, OpenWith, PrintPath, ShareSink};
use stikqr::report::export::{ExportFormatter, Exporter};
use stikqr::report::{self, json, table};
use stikqr::scan;
use stikqr::scan::frames::DirectoryFrames;
use stikqr::scan::live::LiveFeed;
use stikqr::store::settings::{MemorySettings, SettingsStore, SqliteSettings};
use stikqr::store::CodeStore;

type History = CodeStore<Box<dyn SettingsStore>>;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Opens the history. An unusable database leaves a working in-memory history.
fn open_history(config: &Config) -> History {
    let settings: Box<dyn SettingsStore> = match config
        .database_path()
        .and_then(|path| SqliteSettings::open(&path))
    {
        Ok(settings) => Box::new(settings),
        Err(e) => {
            log::error!("history will not be saved: {e}");
            Box::new(MemorySettings::new())
        }
    };

    CodeStore::open(settings)
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

fn scan_images(config: &Config, history: &mut History, images: &[std::path::PathBuf]) -> Result<()> {
    let mut errors = Vec::new();

    for path in images {
        match scan::read_image(path, config.max_scan_dimension) {
            Ok(Some(payload)) => match history.append(&payload) {
                Some(code) => println!("added    {}  {}", code.short_id(), code.content),
                None => println!("already scanned: {payload}"),
            },
            Ok(None) => println!("no QR code found in {}", path.display()),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    eprintln!("\nerrors encountered:");
    for error in &errors {
        eprintln!("  {error}");
    }
    Err(Error::ScanFailed(errors.len()))
}

fn watch(config: &Config, history: &mut History, args: WatchArgs) -> Result<()> {
    let mut options = config.feed_options();
    if let Some(interval) = &args.interval {
        options.poll_interval = config::parse_duration(interval)?;
    }
    let deadline = match &args.duration {
        Some(duration) => Some(Instant::now() + config::parse_duration(duration)?),
        None => None,
    };

    let source = DirectoryFrames::new(&args.dir, args.follow);
    let mut feed = LiveFeed::new(source, options);
    feed.set_torch(args.torch);

    let Some(subscription) = feed.start() else {
        return Ok(());
    };
    eprintln!("watching {} for QR codes...", args.dir.display());

    let mut added = 0;
    subscription.dispatch_until(deadline, |payload| {
        if let Some(code) = history.append(&payload) {
            println!("added    {}  {}", code.short_id(), code.content);
            added += 1;
        }
    });
    drop(subscription);
    feed.stop();

    eprintln!("{added} new code(s), {} in history", history.len());
    Ok(())
}

fn generate(config: &Config, args: GenerateArgs) -> Result<()> {
    let mut generator = config.generator;
    if let Some(scale) = args.scale {
        generator.module_size = scale;
    }

    if args.text.trim().is_empty() {
        return Err(Error::EmptyText);
    }

    match &args.out {
        Some(out) => {
            generator.save(&args.text, out)?;
            println!("{}", out.display());
        }
        None => {
            let rendered = generator.render_text(&args.text).ok_or(Error::TextTooLong)?;
            print!("{rendered}");
        }
    }

    Ok(())
}

fn export(config: &Config, history: &History, args: ExportArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| config.export_dir.clone());
    let exporter = Exporter::new(ExportFormatter::local(), dir);
    let sink: Box<dyn ShareSink> = if args.open {
        Box::new(OpenWith)
    } else {
        Box::new(PrintPath)
    };

    let now = chrono::Utc::now();
    let path = match &args.id {
        Some(id) => exporter.export_single(history.resolve(id)?, now)?,
        None if history.is_empty() => {
            println!("No codes to export.");
            return Ok(());
        }
        None => exporter.export_all(history.codes(), now)?,
    };

    sink.share(&path)
}

fn list(history: &History, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", json::render(history.recent())?);
    } else {
        print!("{}", table::render(history.recent(), report::local_offset()));
    }
    Ok(())
}

fn open_code(history: &History, id: &str) -> Result<()> {
    let code = history.resolve(id)?;
    if !platform::is_openable_url(&code.content) {
        return Err(Error::NotAUrl(code.content.clone()));
    }
    platform::open(&code.content)
}

fn delete(history: &mut History, id: &str) -> Result<()> {
    let id = history.resolve(id)?.id;
    if let Some(code) = history.remove(id) {
        println!("deleted  {}  {}", code.short_id(), code.content);
    }
    Ok(())
}

fn clear(history: &mut History, skip_confirm: bool) -> Result<()> {
    if history.is_empty() {
        println!("No codes to clear.");
        return Ok(());
    }

    let prompt = format!(
        "Remove all {} scanned codes? This cannot be undone.",
        history.len()
    );
    if skip_confirm || confirm(&prompt) {
        history.clear_all();
        println!("cleared");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = Some(database);
    }

    // generate is the only command that leaves the history closed
    match cli.command {
        Command::Generate(args) => generate(&config, args),
        Command::Scan(args) => scan_images(&config, &mut open_history(&config), &args.images),
        Command::Watch(args) => watch(&config, &mut open_history(&config), args),
        Command::List(args) => list(&open_history(&config), args.json),
        Command::Show(args) => {
            println!("{}", open_history(&config).resolve(&args.id)?.content);
            Ok(())
        }
        Command::Open(args) => open_code(&open_history(&config), &args.id),
        Command::Delete(args) => delete(&mut open_history(&config), &args.id),
        Command::Clear(args) => clear(&mut open_history(&config), args.yes),
        Command::Export(args) => export(&config, &open_history(&config), args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
