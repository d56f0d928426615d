use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::panic;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use livemark::channel::Channel;
use livemark::{app, logging, Error, Result};

#[derive(Parser)]
#[command(name = "livemark", version, about = "Live markdown preview driven by your editor")]
struct Cli {
    /// Editor plugin address to connect to (HOST:PORT)
    #[arg(long, env = "LIVEMARK_CONNECT")]
    connect: String,

    /// Buffer number sent in the hello handshake
    #[arg(long, env = "LIVEMARK_BUFNR", default_value_t = 0)]
    bufnr: u64,

    /// Log file or directory (defaults to the user data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Window title used when the editor sends none; `${name}` is replaced
    /// with the document name
    #[arg(long, default_value = "${name}")]
    title: String,
}

fn main() {
    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.log_file.clone()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {e}");
            None
        }
    };

    livemark::markdown::code_highlight::ensure_loaded();

    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let addr = resolve(&cli.connect)?;
    tracing::info!(%addr, bufnr = cli.bufnr, "starting preview");
    let channel = Channel::connect(addr, cli.bufnr)?;

    // Setup panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &channel, cli.title);

    restore_terminal()?;
    result
}

fn resolve(target: &str) -> Result<SocketAddr> {
    target
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Resolve(target.to_string()))
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    channel: &Channel,
    title_template: String,
) -> Result<()> {
    let mut app = app::App::new(title_template);
    let mut shown_title = String::new();

    loop {
        for ev in channel.drain() {
            app.handle_channel_event(ev);
        }
        if app.should_quit {
            break;
        }

        let title = app.title();
        if title != shown_title {
            execute!(terminal.backend_mut(), SetTitle(&title))?;
            shown_title = title;
        }

        app.render_frame(terminal)?;

        // Block up to 100ms waiting for input; channel events are picked up
        // at the top of the next iteration.
        if event::poll(Duration::from_millis(100))? {
            loop {
                let ev = event::read()?;
                app.handle_event(ev);
                if app.should_quit {
                    break;
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    tracing::info!("session ended");
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}
