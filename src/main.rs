use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sporlsync::{cli, config, error};

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
    /// Sync followed artists and their new releases
    Followed(FollowedOptions),

    /// Update this week's release playlists
    Playlists(PlaylistsOptions),

    /// Update the liked-from-year playlists
    Liked(LikedOptions),

    #[clap(about = "Run follows, playlists and liked sync in sequence")]
    FullRun(FullRunOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct FollowedOptions {
    /// Only sync this user
    #[clap(long)]
    pub user: Option<String>,

    /// Force release refresh (skip the staleness guard)
    #[clap(long)]
    pub force: bool,

    /// Fetch and report without persisting anything
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Only update this user
    #[clap(long)]
    pub user: Option<String>,

    /// Send chat notifications about the result
    #[clap(long)]
    pub notify: bool,

    /// Compute and report without touching any playlist
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct LikedOptions {
    /// Only update this user
    #[clap(long)]
    pub user: Option<String>,

    /// Target year (defaults to the current one)
    #[clap(long)]
    pub year: Option<i32>,

    /// Send chat notifications about the result
    #[clap(long)]
    pub notify: bool,

    /// Compute and report without touching any playlist
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct FullRunOptions {
    /// Force release refresh (skip the staleness guard)
    #[clap(long)]
    pub force: bool,

    /// Send chat notifications about the result
    #[clap(long)]
    pub notify: bool,

    /// Fetch and report without persisting anything
    #[clap(long)]
    pub dry_run: bool,
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
        Command::Followed(opt) => cli::sync_followed(opt.user, opt.force, opt.dry_run).await,
        Command::Playlists(opt) => cli::sync_playlists(opt.user, opt.notify, opt.dry_run).await,
        Command::Liked(opt) => {
            cli::sync_liked(opt.user, opt.year, opt.notify, opt.dry_run).await
        }
        Command::FullRun(opt) => cli::full_run(opt.force, opt.notify, opt.dry_run).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
