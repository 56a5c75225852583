use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use releasebot::{cli, config, error, filter::ReleaseType};

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
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Handle tracked artists
    Artists(ArtistsOptions),

    /// List your playlists or select the target playlist
    Playlists(PlaylistsOptions),

    /// Add the full catalog of all tracked artists to the playlist
    AddAll(AddAllOptions),

    /// Add every missing track of all tracked artists to the playlist
    Sync,

    /// Run one scan for new releases
    Scan,

    /// Shuffle the target playlist
    Shuffle,

    /// Scan on a schedule until stopped
    Bot,

    /// Named snapshots of the artist list
    Presets(PresetsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
#[command(
    about = "Handle tracked artists",
    args_conflicts_with_subcommands = true // disallow mixing --search with subcommands
)]
pub struct ArtistsOptions {
    /// Filter tracked artists by name
    #[clap(long)]
    pub search: Option<String>,

    #[command(subcommand)]
    pub command: Option<ArtistsSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ArtistsSubcommand {
    /// Search Spotify and track an artist
    Add {
        query: String,
        /// Result number to track without asking
        #[clap(long)]
        pick: Option<usize>,
    },
    /// Stop tracking an artist
    Remove { id: String },
    /// Track every artist you follow on Spotify
    Import,
}

#[derive(Parser, Debug, Clone)]
#[command(args_conflicts_with_subcommands = true)]
pub struct PlaylistsOptions {
    #[command(subcommand)]
    pub command: Option<PlaylistsSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlaylistsSubcommand {
    /// Make a playlist the target for new tracks
    Select { id: String },
}

#[derive(Parser, Debug, Clone)]
pub struct AddAllOptions {
    /// Release types to include
    #[clap(long = "type", value_enum, default_value_t = ReleaseType::Everything)]
    pub release_type: ReleaseType,

    /// Earliest release date (YYYY-MM-DD)
    #[clap(long)]
    pub from: Option<String>,

    /// Latest release date (YYYY-MM-DD)
    #[clap(long)]
    pub to: Option<String>,

    /// Do not ask for confirmation
    #[clap(long, short)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(args_conflicts_with_subcommands = true)]
pub struct PresetsOptions {
    #[command(subcommand)]
    pub command: Option<PresetsSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PresetsSubcommand {
    /// List saved presets
    List,
    /// Save the current artist list
    Save { name: String },
    /// Replace the artist list with a preset
    Load {
        name: String,
        /// Do not ask for confirmation
        #[clap(long, short)]
        yes: bool,
    },
    /// Delete a preset
    Delete { name: String },
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Artists(opt) => match opt.command {
            Some(ArtistsSubcommand::Add { query, pick }) => cli::add_artist(query, pick).await,
            Some(ArtistsSubcommand::Remove { id }) => cli::remove_artist(id).await,
            Some(ArtistsSubcommand::Import) => cli::import_artists().await,
            None => cli::list_artists(opt.search).await,
        },
        Command::Playlists(opt) => match opt.command {
            Some(PlaylistsSubcommand::Select { id }) => cli::select_playlist(id).await,
            None => cli::list_playlists().await,
        },
        Command::AddAll(opt) => cli::add_all(opt.release_type, opt.from, opt.to, opt.yes).await,
        Command::Sync => cli::sync().await,
        Command::Scan => cli::scan().await,
        Command::Shuffle => cli::shuffle().await,
        Command::Bot => cli::bot().await,
        Command::Presets(opt) => match opt.command {
            Some(PresetsSubcommand::List) | None => cli::list_presets().await,
            Some(PresetsSubcommand::Save { name }) => cli::save_preset(name).await,
            Some(PresetsSubcommand::Load { name, yes }) => cli::load_preset(name, yes).await,
            Some(PresetsSubcommand::Delete { name }) => cli::delete_preset(name).await,
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
