use clap::{Parser, Subcommand};
use ldl_search::{
    error::{Error, Result},
    policy_search::{
        learn_policy, score_policies, EditOperatorName, HeuristicName, PolicySearchConfig,
        SearchMethod,
    },
    structs::{Domain, LiftedDecisionList, Task},
    Verbosity,
};
use serde_json::json;
use std::{fs, path::Path, path::PathBuf, process::ExitCode, time::Duration};
use tracing::{error, info};

#[derive(Parser)]
#[command(version)]
/// Learn and score lifted decision list policies for PDDL domains.
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(help = "The PDDL domain file")]
    domain: PathBuf,
    #[arg(
        help = "A PDDL training problem file, repeat for several problems",
        long = "problem",
        id = "PROBLEM",
        required = true
    )]
    problems: Vec<PathBuf>,
    #[arg(
        help = "A TOML policy search configuration, command line options \
        take precedence over it",
        long = "config",
        id = "CONFIG"
    )]
    config: Option<PathBuf>,
    #[arg(
        help = "Demonstration plan files, one per problem, used by the \
        demo-plan-comparison heuristic",
        long = "demo",
        id = "DEMO"
    )]
    demos: Vec<PathBuf>,
    #[arg(
        help = "Policy files to start the search from, or to score",
        short = 'p',
        long = "policy",
        id = "POLICY"
    )]
    policies: Vec<PathBuf>,
    #[arg(value_enum, help = "The heuristic to score policies with", long = "heuristic")]
    heuristic: Option<HeuristicName>,
    #[arg(value_enum, help = "The policy search method", long = "search-method")]
    search_method: Option<SearchMethod>,
    #[arg(
        value_enum,
        help = "The edit operators used to generate neighbouring policies",
        long = "edit-operator",
        id = "EDIT_OPERATOR"
    )]
    edit_operators: Vec<EditOperatorName>,
    #[arg(help = "The number of steps a policy is run for", long = "horizon")]
    horizon: Option<usize>,
    #[arg(
        help = "The time limit of each planner call, e.g. `30s`",
        long = "planner-timeout",
        value_parser = humantime::parse_duration
    )]
    planner_timeout: Option<Duration>,
    #[arg(
        value_enum,
        help = "The verbosity level",
        short = 'v',
        long = "verbosity",
        id = "VERBOSITY",
        default_value_t = Verbosity::Normal
    )]
    verbosity: Verbosity,
    #[arg(help = "Whether to use coloured output", short = 'c', long = "colour")]
    colour: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the best policy and print it together with the number of
    /// policies that were scored.
    Learn {
        #[arg(help = "Also write the learned policy to this file", short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Print the score of every given policy, or of the empty policy if none
    /// is given.
    Score,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level: tracing::Level = cli.verbosity.into();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(cli.colour)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let domain = Domain::from_path(&cli.domain)?;
    let problems = cli
        .problems
        .iter()
        .map(|path| Task::from_path(path, &domain))
        .collect::<Result<Vec<_>>>()?;
    info!(num_problems = problems.len(), "loaded training problems");

    let demos = if cli.demos.is_empty() {
        None
    } else {
        Some(
            cli.demos
                .iter()
                .map(|path| read_demo(path))
                .collect::<Result<Vec<_>>>()?,
        )
    };
    let policies = if cli.policies.is_empty() {
        None
    } else {
        Some(
            cli.policies
                .iter()
                .map(|path| {
                    let text = read(path)?;
                    Ok(LiftedDecisionList::parse(&text, &domain)?)
                })
                .collect::<Result<Vec<_>>>()?,
        )
    };

    match cli.command {
        Commands::Learn { output } => {
            let outcome = learn_policy(
                &domain,
                &problems,
                demos.as_deref(),
                &config,
                policies.as_deref(),
            )?;
            let policy = outcome.policy.to_string();
            if let Some(path) = output {
                fs::write(&path, &policy).map_err(|e| Error::io(&path, e))?;
                info!(path = %path.display(), "wrote policy");
            }
            println!(
                "{}",
                json!({
                    "policy": policy,
                    "num_heuristic_calls": outcome.num_heuristic_calls,
                })
            );
        }
        Commands::Score => {
            let scores = score_policies(
                &domain,
                &problems,
                demos.as_deref(),
                &config,
                policies.as_deref(),
            )?;
            println!("{}", json!({ "scores": scores }));
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<PolicySearchConfig> {
    let mut config = match &cli.config {
        Some(path) => PolicySearchConfig::from_toml(&read(path)?)?,
        None => PolicySearchConfig::default(),
    };
    if let Some(heuristic) = cli.heuristic {
        config.heuristic = heuristic;
    }
    if let Some(search_method) = cli.search_method {
        config.search_method = search_method;
    }
    if !cli.edit_operators.is_empty() {
        config.edit_operators = cli.edit_operators.clone();
    }
    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }
    if let Some(timeout) = cli.planner_timeout {
        config.planner_budget = config.planner_budget.with_timeout(Some(timeout));
    }
    Ok(config)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// One `(operator object ...)` step per non-empty line, `;` starts a comment.
fn read_demo(path: &Path) -> Result<Vec<String>> {
    Ok(read(path)?
        .lines()
        .map(|line| line.split(';').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}
