use crate::clock::Clock;
use crate::error::TaskError;
use crate::repository::{TaskRepository, find_by_id};
use crate::task::{Status, StatusFilter, Task};
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Track tasks in a local JSON file
#[derive(Parser, Debug)]
#[command(name = "task-cli", version, arg_required_else_help = true)]
pub struct Cli {
    /// Tasks file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Log more detail to stderr, repeat for even more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Create a task with a status of todo, in-progress or done
    Create { description: String, status: String },
    /// Change the description and/or status of a task
    Update {
        id: u32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a task
    Delete { id: u32 },
    /// Show a single task
    Show { id: u32 },
    /// List all tasks
    List,
    /// List tasks that are done
    ListCompleted,
    /// List tasks that are not done
    ListUncompleted,
    /// List tasks that are in progress
    ListInProgress,
}

/// One change requested by `update`, kept in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Description(String),
    Status(Status),
}

/// Parsed command line plus the order `update` flags were given in.
#[derive(Debug)]
pub struct Request {
    pub cli: Cli,
    status_first: bool,
}

impl Request {
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Cli::command().try_get_matches_from(args)?;
        let cli = Cli::from_arg_matches(&matches)?;
        let status_first = matches
            .subcommand_matches("update")
            .is_some_and(status_before_description);
        Ok(Self { cli, status_first })
    }

    /// Edits for an `update` command in the order they appeared.
    ///
    /// Fails with `InvalidStatus` before any edit is produced, so nothing gets applied.
    pub fn edits(&self) -> Result<Vec<Edit>, TaskError> {
        let Commands::Update {
            description,
            status,
            ..
        } = &self.cli.command
        else {
            return Ok(Vec::new());
        };
        let description = description.clone().map(Edit::Description);
        let status = status
            .as_deref()
            .map(str::parse::<Status>)
            .transpose()?
            .map(Edit::Status);
        let ordered = if self.status_first {
            [status, description]
        } else {
            [description, status]
        };
        Ok(ordered.into_iter().flatten().collect())
    }
}

fn status_before_description(matches: &ArgMatches) -> bool {
    match (matches.index_of("status"), matches.index_of("description")) {
        (Some(status), Some(description)) => status < description,
        _ => false,
    }
}

/// Runs the request against `repo`.
///
/// Unknown ids and invalid statuses are reported on `err` and turn into a failing exit code. Any
/// other error is returned.
pub fn execute<C: Clock>(
    request: &Request,
    repo: &TaskRepository<C>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<ExitCode> {
    match dispatch(request, repo, out) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(error) => match error.downcast_ref::<TaskError>() {
            Some(user_error @ (TaskError::NotFound(_) | TaskError::InvalidStatus(_))) => {
                writeln!(err, "{}", user_error)?;
                Ok(ExitCode::FAILURE)
            }
            _ => Err(error),
        },
    }
}

fn dispatch<C: Clock>(
    request: &Request,
    repo: &TaskRepository<C>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match &request.cli.command {
        Commands::Create {
            description,
            status,
        } => {
            let status: Status = status.parse()?;
            let id = repo.create(description.as_str(), status)?;
            writeln!(out, "Task added! (ID: {})", id)?;
        }
        Commands::Update { id, .. } => {
            let edits = request.edits()?;
            if edits.is_empty() {
                writeln!(
                    out,
                    "Nothing to update. Pass --description and/or --status."
                )?;
            }
            for edit in edits {
                match edit {
                    Edit::Description(description) => repo.update_description(*id, description)?,
                    Edit::Status(status) => repo.update_status(*id, status)?,
                }
                writeln!(out, "Task {} successfully updated.", id)?;
            }
        }
        Commands::Delete { id } => {
            repo.delete(*id)?;
            writeln!(out, "Task {} has successfully been deleted.", id)?;
        }
        Commands::Show { id } => {
            let tasks = repo.load()?;
            let task = find_by_id(&tasks, *id).ok_or(TaskError::NotFound(*id))?;
            writeln!(out, "{}", task)?;
        }
        Commands::List => print_tasks(out, &repo.list_all()?, StatusFilter::All)?,
        Commands::ListCompleted => {
            print_tasks(out, &repo.list(StatusFilter::Completed)?, StatusFilter::Completed)?
        }
        Commands::ListUncompleted => print_tasks(
            out,
            &repo.list(StatusFilter::Uncompleted)?,
            StatusFilter::Uncompleted,
        )?,
        Commands::ListInProgress => print_tasks(
            out,
            &repo.list(StatusFilter::InProgress)?,
            StatusFilter::InProgress,
        )?,
    }
    Ok(())
}

fn print_tasks(out: &mut impl Write, tasks: &[Task], filter: StatusFilter) -> std::io::Result<()> {
    let label = match filter {
        StatusFilter::All => "",
        StatusFilter::Completed => "completed ",
        StatusFilter::Uncompleted => "uncompleted ",
        StatusFilter::InProgress => "in-progress ",
    };
    if tasks.is_empty() {
        return writeln!(out, "No {}tasks found.", label);
    }
    writeln!(out, "Listing all {}tasks:", label)?;
    writeln!(out)?;
    for task in tasks {
        writeln!(out, "{}", task)?;
        writeln!(out)?;
    }
    Ok(())
}
