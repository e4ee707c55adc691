#![allow(clippy::exit)]

mod config;
mod interactive;
mod output;
mod preview;
mod timing;

use std::io::{IsTerminal as _, Read as _, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{CommandFactory as _, Parser, Subcommand};
use clap_complete::{Generator, Shell};
use qrbolt_business::{
    DirectoryDownloader, ErrorLevel, ExportService, PngFramer, QrCodeEncoder, QrSession,
    SettingChange, Settings,
};
use qrbolt_clipboard::{ClipboardProvider, NoClipboard, SystemClipboard};
use tracing::{info, instrument};

use crate::config::Config;
use crate::output::{Output, render_summary};

#[derive(Parser)]
#[command(name = "qr-bolt")]
#[command(about = "Generate QR codes from text or URLs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Text or URL to encode (read from stdin when omitted and input is piped)
    text: Option<String>,

    /// Output width in pixels, clamped to 180-520
    #[arg(long, short = 's', env = "QR_BOLT_SIZE", allow_negative_numbers = true)]
    size: Option<i64>,

    /// Quiet zone in modules, clamped to 0-10
    #[arg(long, short = 'm', env = "QR_BOLT_MARGIN", allow_negative_numbers = true)]
    margin: Option<i64>,

    /// Error correction level: L, M, Q or H
    #[arg(long, short = 'l', env = "QR_BOLT_LEVEL")]
    level: Option<ErrorLevel>,

    /// Swap the dark and light colors
    #[arg(long)]
    invert: bool,

    /// Directory to save qr-bolt.png into
    #[arg(long, short = 'o', env = "QR_BOLT_OUT")]
    out: Option<PathBuf>,

    /// Copy the PNG data URL to the clipboard
    #[arg(long, short = 'c')]
    copy: bool,

    /// Do not save a PNG file
    #[arg(long)]
    no_download: bool,

    /// Never access the system clipboard
    #[arg(long)]
    no_clipboard: bool,

    /// Print the code to the terminal
    #[arg(long, short = 'p')]
    preview: bool,

    /// Edit settings in a prompt loop
    #[arg(long, short = 'i')]
    interactive: bool,

    /// Show timing/latency information
    #[arg(long, global = true)]
    timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print the configuration file location
    ConfigPath,
}

impl Cli {
    /// Edits requested by flags. Applied after the config file, so flags win.
    fn setting_changes(&self) -> Vec<SettingChange> {
        [
            self.size.map(SettingChange::Size),
            self.margin.map(SettingChange::Margin),
            self.level.map(SettingChange::Level),
            self.invert.then_some(SettingChange::Inverted(true)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    timing::init_tracing(cli.verbose, cli.timing);

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(*shell);
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            println!("{}", Config::config_path()?.display());
            return Ok(());
        }
        None => {}
    }

    let config = Config::load()?;
    let text = if cli.interactive || cli.text.is_some() {
        cli.text.clone()
    } else {
        read_stdin_text()?
    };

    let initial = config
        .setting_changes()
        .into_iter()
        .chain(cli.setting_changes())
        .chain(text.map(SettingChange::Text))
        .fold(Settings::default(), |settings, change| settings.apply(change));
    info!(
        size = initial.size,
        margin = initial.margin,
        level = %initial.level,
        inverted = initial.inverted,
        "starting session"
    );

    let out = Output::new();
    let mut session = QrSession::new(initial, Arc::new(QrCodeEncoder), build_export(&cli, &config));

    if cli.interactive {
        return interactive::run(&mut session, &out).await;
    }

    if !run_once(&cli, &mut session, &out).await {
        std::process::exit(1);
    }
    Ok(())
}

fn build_export(cli: &Cli, config: &Config) -> ExportService {
    let dir = cli
        .out
        .clone()
        .or_else(|| config.export.directory.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let clipboard: Arc<dyn ClipboardProvider> = if cli.no_clipboard || !config.clipboard_enabled()
    {
        Arc::new(NoClipboard)
    } else {
        Arc::new(SystemClipboard)
    };

    ExportService::new(
        Arc::new(PngFramer),
        Arc::new(DirectoryDownloader::new(dir)),
        clipboard,
    )
}

/// Renders once and performs the requested exports. Returns `false` when the run failed.
#[instrument(skip_all, name = "run_once", fields(download = !cli.no_download, copy = cli.copy))]
async fn run_once(cli: &Cli, session: &mut QrSession, out: &Output) -> bool {
    session.settle().await;

    let result = session.render_result();
    if !result.is_ready() {
        out.error(render_summary(&result));
        return false;
    }
    out.success(render_summary(&result));

    if cli.preview {
        match preview::render(&session.settings()) {
            Ok(rows) => out.print(rows),
            Err(e) => out.error(format!("Preview unavailable: {e}")),
        }
    }

    let mut ok = true;
    if !cli.no_download {
        ok = out.download(&session.request_download().await);
    }
    if cli.copy {
        out.copy(session.request_copy().await);
    }
    ok
}

/// Reads the text to encode from piped stdin. Trailing newlines are dropped.
fn read_stdin_text() -> Result<Option<String>> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .context("Failed to read text from stdin")?;
    let text = buffer.trim_end_matches(['\r', '\n']);
    Ok((!text.is_empty()).then(|| text.to_owned()))
}

fn generate_completions<G: Generator>(generator: G) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_owned();
    clap_complete::generate(generator, &mut cmd, bin_name, &mut std::io::stdout());
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_become_setting_changes() {
        let cli = Cli::parse_from([
            "qr-bolt", "hello", "--size", "1000", "--level", "q", "--invert",
        ]);

        assert_eq!(cli.text.as_deref(), Some("hello"));
        assert_eq!(
            cli.setting_changes(),
            vec![
                SettingChange::Size(1000),
                SettingChange::Level(ErrorLevel::Q),
                SettingChange::Inverted(true),
            ]
        );
    }

    #[test]
    fn test_negative_margin_is_accepted() {
        let cli = Cli::parse_from(["qr-bolt", "--margin", "-3", "hello"]);
        assert_eq!(cli.setting_changes(), vec![SettingChange::Margin(-3)]);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        assert!(Cli::try_parse_from(["qr-bolt", "--level", "Z"]).is_err());
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::parse_from(["qr-bolt", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Completions { shell: Shell::Bash })
        ));

        let cli = Cli::parse_from(["qr-bolt", "config-path"]);
        assert!(matches!(cli.command, Some(Commands::ConfigPath)));
    }
}
