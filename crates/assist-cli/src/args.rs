use std::error::Error;
use std::path::PathBuf;

use assist_core::actions::HabitDraft;
use assist_core::actions::TaskDraft;
use assist_core::actions::UserAction;
use assist_core::state::Priority;
use assist_core::state::RecordId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub simulate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    Messages { favorites_only: bool },
    Texts { favorites_only: bool },
    Tasks,
    Habits,
}

#[derive(Debug, Clone)]
pub enum CliCommand {
    Help,
    Version,
    List(ListTarget),
    Dispatch(UserAction),
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub options: GlobalOptions,
    pub command: CliCommand,
}

pub fn parse_args(args: Vec<String>) -> Result<Invocation, Box<dyn Error>> {
    let (options, rest) = split_global_options(args)?;
    let mut rest = rest.into_iter();
    let Some(command) = rest.next() else {
        return Ok(Invocation {
            options,
            command: CliCommand::Help,
        });
    };
    let rest: Vec<String> = rest.collect();

    let command = match command.as_str() {
        "--help" | "-h" | "help" => CliCommand::Help,
        "--version" | "-V" | "version" => CliCommand::Version,
        "chat" => CliCommand::Dispatch(UserAction::SendChat {
            content: rest.join(" "),
        }),
        "generate" => CliCommand::Dispatch(UserAction::RequestGeneration {
            prompt: rest.join(" "),
        }),
        "messages" => parse_messages(&rest)?,
        "texts" => parse_texts(&rest)?,
        "tasks" => parse_tasks(&rest)?,
        "habits" => parse_habits(&rest)?,
        other => return Err(format!("unknown command: {other}").into()),
    };
    Ok(Invocation { options, command })
}

fn split_global_options(args: Vec<String>) -> Result<(GlobalOptions, Vec<String>), Box<dyn Error>> {
    let mut options = GlobalOptions::default();
    let mut rest = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let Some(value) = args.next() else {
                    return Err("--data-dir requires a path".into());
                };
                options.data_dir = Some(PathBuf::from(value));
            }
            "--config" => {
                let Some(value) = args.next() else {
                    return Err("--config requires a path".into());
                };
                options.config = Some(PathBuf::from(value));
            }
            "--simulate" => options.simulate = true,
            _ => rest.push(arg),
        }
    }
    Ok((options, rest))
}

fn parse_messages(args: &[String]) -> Result<CliCommand, Box<dyn Error>> {
    match args {
        [] => Ok(CliCommand::List(ListTarget::Messages {
            favorites_only: false,
        })),
        [flag] if flag == "--favorites" => Ok(CliCommand::List(ListTarget::Messages {
            favorites_only: true,
        })),
        [verb, id] if verb == "favorite" => Ok(CliCommand::Dispatch(
            UserAction::ToggleMessageFavorite { id: record_id(id) },
        )),
        [verb, id] if verb == "delete" => Ok(CliCommand::Dispatch(UserAction::DeleteMessage {
            id: record_id(id),
        })),
        _ => Err(usage_error("messages [--favorites] | messages favorite|delete <id>")),
    }
}

fn parse_texts(args: &[String]) -> Result<CliCommand, Box<dyn Error>> {
    match args {
        [] => Ok(CliCommand::List(ListTarget::Texts {
            favorites_only: false,
        })),
        [flag] if flag == "--favorites" => Ok(CliCommand::List(ListTarget::Texts {
            favorites_only: true,
        })),
        [verb, id] if verb == "favorite" => Ok(CliCommand::Dispatch(
            UserAction::ToggleTextFavorite { id: record_id(id) },
        )),
        [verb, id] if verb == "delete" => Ok(CliCommand::Dispatch(UserAction::DeleteText {
            id: record_id(id),
        })),
        _ => Err(usage_error("texts [--favorites] | texts favorite|delete <id>")),
    }
}

fn parse_tasks(args: &[String]) -> Result<CliCommand, Box<dyn Error>> {
    match args {
        [] => Ok(CliCommand::List(ListTarget::Tasks)),
        [verb, rest @ ..] if verb == "add" => {
            let mut draft = TaskDraft::default();
            for (flag, value) in flag_pairs(rest)? {
                match flag {
                    "--title" => draft.title = value.to_string(),
                    "--date" => draft.date = value.to_string(),
                    "--time" => draft.time = value.to_string(),
                    "--priority" => {
                        draft.priority = Priority::parse(value)
                            .ok_or_else(|| format!("unknown priority: {value}"))?;
                    }
                    other => return Err(format!("unsupported argument: {other}").into()),
                }
            }
            Ok(CliCommand::Dispatch(UserAction::AddTask(draft)))
        }
        [verb, id] if verb == "toggle" => Ok(CliCommand::Dispatch(UserAction::ToggleTaskComplete {
            id: record_id(id),
        })),
        [verb, id] if verb == "delete" => Ok(CliCommand::Dispatch(UserAction::DeleteTask {
            id: record_id(id),
        })),
        _ => Err(usage_error(
            "tasks | tasks add --title T --date YYYY-MM-DD [--time HH:MM] [--priority P] | tasks toggle|delete <id>",
        )),
    }
}

fn parse_habits(args: &[String]) -> Result<CliCommand, Box<dyn Error>> {
    match args {
        [] => Ok(CliCommand::List(ListTarget::Habits)),
        [verb, rest @ ..] if verb == "add" => {
            let mut draft = HabitDraft::default();
            for (flag, value) in flag_pairs(rest)? {
                match flag {
                    "--name" => draft.name = value.to_string(),
                    "--goal" => draft.goal = value.to_string(),
                    other => return Err(format!("unsupported argument: {other}").into()),
                }
            }
            Ok(CliCommand::Dispatch(UserAction::AddHabit(draft)))
        }
        [verb, id] if verb == "complete" => Ok(CliCommand::Dispatch(UserAction::CompleteHabit {
            id: record_id(id),
        })),
        [verb, id] if verb == "delete" => Ok(CliCommand::Dispatch(UserAction::DeleteHabit {
            id: record_id(id),
        })),
        _ => Err(usage_error(
            "habits | habits add --name N --goal G | habits complete|delete <id>",
        )),
    }
}

fn flag_pairs(args: &[String]) -> Result<Vec<(&str, &str)>, Box<dyn Error>> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let Some(value) = args.get(i + 1) else {
            return Err(format!("{flag} requires a value").into());
        };
        pairs.push((flag, value.as_str()));
        i += 2;
    }
    Ok(pairs)
}

fn record_id(raw: &str) -> RecordId {
    RecordId::new(raw.trim())
}

fn usage_error(usage: &str) -> Box<dyn Error> {
    format!("usage: assist {usage}").into()
}
