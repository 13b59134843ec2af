use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use beatlist::{
    cli::{self, DataInput, Source, SourceKind},
    config, error,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Show debug logs of the API layer
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Store the client ID and secret of your Spotify application
    Credentials(CredentialsOptions),

    /// Fetch audio features of a track collection
    Tracks(TracksOptions),

    /// List your playlists
    Playlists,

    /// Show mean and standard deviation of every audio feature
    Stats(InputOptions),

    #[clap(about = "Create a playlist from tracks within a feature band")]
    Generate(GenerateOptions),

    /// Handle saved tables of the local database
    Tables(TablesOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CredentialsOptions {
    #[clap(long)]
    pub client_id: String,
    #[clap(long)]
    pub client_secret: String,
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOptions {
    /// Collection to fetch tracks from
    #[clap(long, value_enum)]
    pub source: SourceKind,

    /// Playlist to read when --source is playlist
    #[clap(long)]
    pub playlist_id: Option<String>,

    /// Save the fetched features to the local database
    #[clap(long)]
    pub save: bool,

    /// Table to save to (defaults to a name derived from the source)
    #[clap(long, requires = "save")]
    pub table: Option<String>,

    /// Flush an existing table before saving
    #[clap(long, requires = "save")]
    pub replace: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InputOptions {
    /// Read track data from a saved table
    #[clap(long, conflicts_with = "source")]
    pub table: Option<String>,

    /// Fetch track data from Spotify
    #[clap(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Playlist to read when --source is playlist
    #[clap(long)]
    pub playlist_id: Option<String>,
}

impl InputOptions {
    fn into_input(self) -> Result<DataInput, String> {
        match (self.table, self.source) {
            (Some(table), _) => Ok(DataInput::Table(table)),
            (None, Some(kind)) => Source::from_kind(kind, self.playlist_id).map(DataInput::Spotify),
            (None, None) => Err("Choose a data source with --table or --source".to_string()),
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateOptions {
    #[command(flatten)]
    pub input: InputOptions,

    /// Audio feature to select tracks by
    #[clap(long, default_value = "tempo")]
    pub parameter: String,

    /// Target value of the feature
    #[clap(long)]
    pub value: f64,

    /// Relative tolerance around the target value
    #[clap(long, default_value_t = 0.1)]
    pub tolerance: f64,

    /// Name of the playlist to create
    #[clap(long)]
    pub name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct TablesOptions {
    #[command(subcommand)]
    pub command: Option<TablesSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TablesSubcommand {
    /// Delete a saved table
    Drop { name: String },
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("beatlist=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Credentials(opt) => cli::credentials(opt.client_id, opt.client_secret).await,
        Command::Tracks(opt) => {
            let source = match Source::from_kind(opt.source, opt.playlist_id) {
                Ok(source) => source,
                Err(e) => error!("{}", e),
            };
            cli::tracks(source, opt.save, opt.table, opt.replace).await
        }
        Command::Playlists => cli::playlists().await,
        Command::Stats(opt) => match opt.into_input() {
            Ok(input) => cli::stats(input).await,
            Err(e) => error!("{}", e),
        },
        Command::Generate(opt) => {
            let input = match opt.input.into_input() {
                Ok(input) => input,
                Err(e) => error!("{}", e),
            };
            cli::generate(input, opt.parameter, opt.value, opt.tolerance, opt.name).await
        }
        Command::Tables(opt) => match opt.command {
            Some(TablesSubcommand::Drop { name }) => cli::drop_table(name).await,
            None => cli::list_tables().await,
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
