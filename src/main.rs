mod analysis;
mod config;
mod github;
mod report;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;

use analysis::{
    Analysis, AnalysisRequest, FileChangesAnalysis, LocAnalysis, PrAnalysis, DEFAULT_START_DATE,
};
use github::pulls::PullFilter;
use github::{GitHubClient, RepoRef, StateFilter};
use report::Summary;

const TOKEN_HELP: &str = "\
GitHub personal access token:
  Create one at https://github.com/settings/tokens with the 'repo' scope
  (private repositories) or 'public_repo' (public only), then pass it with
  --token, put it in .gh-activity.toml under [github] token, or export
  GITHUB_TOKEN. Without a token GitHub allows 60 requests per hour.";

/// gh-activity — summarise an author's pull requests, commits and file
/// changes in a GitHub repository.
#[derive(Parser, Debug)]
#[command(name = "gh-activity", version, about, after_help = TOKEN_HELP)]
struct Cli {
    /// Config file (defaults to .gh-activity.toml in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pull request counts by state, with merge rate
    Prs {
        #[command(flatten)]
        common: CommonArgs,

        /// Filter PRs by state
        #[arg(long, value_enum, default_value_t = StateFilter::All)]
        state: StateFilter,
    },

    /// Lines added and deleted by the author's commits
    Loc {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Files changed by the author's pull requests, grouped by extension
    Files {
        #[command(flatten)]
        common: CommonArgs,

        /// Filter PRs by state
        #[arg(long, value_enum, default_value_t = StateFilter::All)]
        state: StateFilter,

        /// Include diff/patch content in the JSON output (much larger)
        #[arg(long)]
        include_patch: bool,

        /// Analyze at most this many of the most recent PRs
        #[arg(long)]
        limit: Option<usize>,

        /// Include draft PRs (excluded by default)
        #[arg(long)]
        get_draft: bool,

        /// Include PRs regardless of merge status (merged only by default)
        #[arg(long)]
        all_prs: bool,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Repository owner
    repo_owner: String,

    /// Repository name
    repo_name: String,

    /// Author login to analyze
    author: String,

    /// Start date in YYYY-MM-DD format
    #[arg(long, default_value = DEFAULT_START_DATE)]
    start_date: String,

    /// GitHub personal access token (falls back to the config file, then GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Save the full results as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!("Analysis failed or returned no results.");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Prs { common, state } => {
            execute(PrAnalysis::new(state), &common, config_path).await
        }
        Command::Loc { common } => execute(LocAnalysis::new(), &common, config_path).await,
        Command::Files {
            common,
            state,
            include_patch,
            limit,
            get_draft,
            all_prs,
        } => {
            let filter = PullFilter {
                state,
                merged_only: !all_prs,
                include_draft: get_draft,
            };
            execute(
                FileChangesAnalysis::new(filter, include_patch, limit),
                &common,
                config_path,
            )
            .await
        }
    }
}

/// Validate input, run one analysis against GitHub, then print and save it.
async fn execute<A>(
    analysis: A,
    args: &CommonArgs,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>>
where
    A: Analysis,
    A::Report: Summary,
{
    // A bad start date must fail before any request is made.
    let request = AnalysisRequest::new(
        RepoRef::new(&args.repo_owner, &args.repo_name),
        &args.author,
        &args.start_date,
    )?;
    debug!(since = %request.since.to_rfc3339(), "parsed start date");

    let config = config::Config::load(config_path)?;
    let token = config.resolve_token(args.token.as_deref());
    if token.is_none() {
        warn!(
            "no GitHub personal access token provided; limited to 60 requests/hour and no \
             private repositories (use --token or GITHUB_TOKEN)"
        );
    }
    let client = GitHubClient::new(config.api_url(), token.as_deref())?;

    let report = analysis
        .run(&client, &request)
        .instrument(info_span!("analysis", name = analysis.name()))
        .await;

    report::print_summary(&report)?;

    if let Some(path) = &args.output {
        report::write_json(&report, path)?;
        info!(path = %path.display(), "saved detailed results");
        println!("Detailed results saved to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_files_defaults() {
        let cli =
            Cli::try_parse_from(["gh-activity", "files", "octo", "widgets", "alice"]).unwrap();
        match cli.command {
            Command::Files {
                common,
                state,
                include_patch,
                limit,
                get_draft,
                all_prs,
            } => {
                assert_eq!(common.start_date, "2025-01-01");
                assert_eq!(state, StateFilter::All);
                assert!(!include_patch);
                assert_eq!(limit, None);
                assert!(!get_draft);
                assert!(!all_prs);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_prs_options() {
        let cli = Cli::try_parse_from([
            "gh-activity",
            "prs",
            "octo",
            "widgets",
            "alice",
            "--state",
            "closed",
            "--start-date",
            "2024-06-01",
            "--output",
            "out.json",
        ])
        .unwrap();
        match cli.command {
            Command::Prs { common, state } => {
                assert_eq!(state, StateFilter::Closed);
                assert_eq!(common.start_date, "2024-06-01");
                assert_eq!(common.output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_loc_rejects_state() {
        let result = Cli::try_parse_from([
            "gh-activity",
            "loc",
            "octo",
            "widgets",
            "alice",
            "--state",
            "open",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_state_value_is_validated() {
        let result =
            Cli::try_parse_from(["gh-activity", "prs", "o", "r", "a", "--state", "merged"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_start_date_fails_before_any_request() {
        let args = CommonArgs {
            repo_owner: "octo".to_string(),
            repo_name: "widgets".to_string(),
            author: "alice".to_string(),
            start_date: "01/02/2025".to_string(),
            token: None,
            output: None,
        };
        // Loading this config would fail, so reaching it would change the error.
        let missing_config = Path::new("/definitely/not/here.toml");
        let err = execute(LocAnalysis::new(), &args, Some(missing_config))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid date format '01/02/2025'"));
    }
}
