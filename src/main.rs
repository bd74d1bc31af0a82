//! sayall main entry point
//!
//! Reads a text file aloud from the caret, the review cursor or down one
//! table column. The main loop monitors two sources:
//! 1. stdin (any keypress stops reading)
//! 2. the playback waker (markers reached by the speech thread)

use anyhow::{bail, Context};
use log::{debug, error, info};
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token, Waker};
use sayall::config::Config;
use sayall::content::{ObjectId, TextDocument};
use sayall::reading::{ContinuousReader, DeferredQueue, ReadRequest, ReaderMessage};
use sayall::speech::{create_synth, PauseCoalescer, Player, TextSequenceBuilder};
use sayall::terminal::{is_tty, TermiosGuard};
use std::io::{self, Read};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

/// Token for stdin in mio poll
const STDIN: Token = Token(0);
/// Token for the playback thread's waker
const WAKER: Token = Token(1);

const USAGE: &str = "Usage: sayall [--debug] [--review] [--table COLUMN] [--line N] FILE";

/// Where to start reading and how
#[derive(Debug, Default)]
struct Options {
    debug: bool,
    review: bool,
    table: Option<usize>,
    line: Option<usize>,
    file: Option<PathBuf>,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut opts = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" | "-d" => opts.debug = true,
                "--review" | "-r" => opts.review = true,
                "--table" | "-t" => {
                    let value = args.next().context("--table needs a column number")?;
                    let column: usize = value
                        .parse()
                        .with_context(|| format!("invalid column: {}", value))?;
                    if column == 0 {
                        bail!("columns are numbered from 1");
                    }
                    opts.table = Some(column - 1);
                }
                "--line" | "-l" => {
                    let value = args.next().context("--line needs a line number")?;
                    opts.line = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid line: {}", value))?,
                    );
                }
                "--help" | "-h" => {
                    println!("{}", USAGE);
                    process::exit(0);
                }
                _ if arg.starts_with('-') => bail!("unknown option: {}", arg),
                _ => {
                    if opts.file.is_some() {
                        bail!("only one file can be read");
                    }
                    opts.file = Some(PathBuf::from(arg));
                }
            }
        }

        if opts.review && opts.table.is_some() {
            bail!("--review and --table cannot be combined");
        }
        Ok(opts)
    }
}

fn main() {
    let opts = match Options::parse(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    // Initialize logger
    if opts.debug {
        // Debug mode: write to sayall.log
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("sayall.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open sayall.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "sayall version {} starting (debug mode, logging to sayall.log)",
            sayall::VERSION
        );
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    if let Err(e) = run(opts) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(opts: Options) -> anyhow::Result<()> {
    let Some(path) = opts.file.as_deref() else {
        bail!("no file given\n{}", USAGE);
    };

    let mut doc = TextDocument::from_file(ObjectId(1), path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if let Some(line) = opts.line {
        doc.move_to_line(line);
    }
    info!("Loaded {} lines from {:?}", doc.line_count(), path);
    let request = read_request(&opts, &doc)?;

    let config = Config::load().context("failed to load configuration")?;
    info!("Config loaded from {:?}", config.path());

    let mut poll = Poll::new().context("failed to create poll")?;
    let waker = Arc::new(Waker::new(poll.registry(), WAKER)?);

    // Only a terminal gets raw mode and key handling; piped stdin is ignored
    let stdin_fd = io::stdin().as_raw_fd();
    let guard = if is_tty(stdin_fd) {
        poll.registry()
            .register(&mut SourceFd(&stdin_fd), STDIN, Interest::READABLE)?;
        Some(TermiosGuard::raw(stdin_fd).context("failed to set raw mode")?)
    } else {
        debug!("stdin is not a terminal, reading until the end");
        None
    };

    let synth = create_synth(&config).context("failed to start speech")?;
    let (events_tx, events_rx) = mpsc::channel();
    let player = Player::spawn(
        synth,
        events_tx,
        Some(Arc::clone(&waker)),
        config.words_per_minute(),
    )?;

    let mut reader = ContinuousReader::new(
        TextSequenceBuilder::from_config(&config),
        PauseCoalescer::new(player),
        DeferredQueue::new(),
        config.reading(),
    );

    reader.start_read(request, &mut doc)?;

    let mut events = Events::with_capacity(16);
    'outer: loop {
        reader.run_deferred(&mut doc);
        if !reader.is_reading() {
            break;
        }

        // Continuations queued by a marker still need a pass before sleeping
        let timeout = if reader.scheduler().is_empty() {
            None
        } else {
            Some(Duration::ZERO)
        };
        if let Err(e) = poll.poll(&mut events, timeout) {
            if e.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(e).context("poll failed");
        }

        for event in events.iter() {
            if event.token() == STDIN {
                let mut buf = [0u8; 64];
                let n = io::stdin().read(&mut buf)?;
                debug!("Read {} bytes from stdin, stopping", n);
                reader.stop();
                reader.queue_mut().sink_mut().cancel();
                break 'outer;
            }
        }

        dispatch_events(&mut reader, &events_rx, &mut doc);
    }

    info!("Reading ended: {:?}", reader.last_end_reason());
    drop(reader);
    drop(guard);

    let caret = doc.caret_offset();
    let line = doc.line_number(caret);
    let text = doc.text_content()[doc.line_start(line)..]
        .lines()
        .next()
        .unwrap_or("");
    println!("{}:{}: {}", path.display(), line, text);
    Ok(())
}

/// What to read, given the command line
///
/// A table read needs a cell in that column at or after the caret's row;
/// otherwise the caret's own cell, from some other column, would be read.
fn read_request(opts: &Options, doc: &TextDocument) -> anyhow::Result<ReadRequest> {
    let request = match opts.table {
        Some(column) => {
            let (start, next_cell) = doc.column_walker(column);
            let Some(start) = start else {
                bail!("column {} has no cells to read", column + 1);
            };
            ReadRequest::Table {
                start: Some(start),
                next_cell,
                update_caret: true,
            }
        }
        None if opts.review => ReadRequest::Review,
        None => ReadRequest::Caret,
    };
    Ok(request)
}

/// Hand every marker the playback thread has reached to the reader
fn dispatch_events(
    reader: &mut ContinuousReader<TextSequenceBuilder, PauseCoalescer<Player>, DeferredQueue>,
    events: &Receiver<ReaderMessage>,
    doc: &mut TextDocument,
) {
    while let Ok(message) = events.try_recv() {
        reader.dispatch(message, doc);
    }
}
