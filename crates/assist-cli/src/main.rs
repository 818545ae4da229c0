mod args;
mod render;
mod settings;

use std::env;
use std::io;
use std::io::Write;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use assist_core::actions::RuntimeAction;
use assist_core::actions::UserAction;
use assist_core::calendar::Clock;
use assist_core::calendar::SystemClock;
use assist_core::persistence::DurableStore;
use assist_core::persistence::FileMedium;
use assist_core::persistence::StorageMedium;
use assist_core::reducer::AssistEffect;
use assist_core::session::DispatchOutcome;
use assist_core::session::Session;
use assist_exec::adapters::ProviderGateway;
use assist_exec::contracts::GatewayRequest;
use assist_exec::gateway::spawn_request;
use assist_exec::gateway::RequestGateway;
use assist_exec::gateway::SimulatedGateway;

use crate::args::parse_args;
use crate::args::CliCommand;
use crate::args::ListTarget;

type Gateway = Arc<dyn RequestGateway + Send + Sync>;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let invocation = parse_args(env::args().skip(1).collect())?;
    match invocation.command {
        CliCommand::Help => {
            print_help();
            return Ok(());
        }
        CliCommand::Version => {
            println!("assist {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let options = invocation.options;
    let config = settings::load_config(options.config.as_deref())?;
    settings::init_logging(&config.log);

    let data_dir = settings::resolve_data_dir(options.data_dir.as_deref(), &config.storage)?;
    let medium = FileMedium::open(&data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), "opened data directory");
    let mut session = Session::open(DurableStore::new(medium), SystemClock, config.calendar.zone);
    eprint!("{}", render::notices(session.notices()));

    match invocation.command {
        CliCommand::List(target) => {
            print!("{}", list(&session, target));
            Ok(())
        }
        CliCommand::Dispatch(action) => {
            let gateway: Gateway = if options.simulate {
                Arc::new(SimulatedGateway)
            } else {
                Arc::new(ProviderGateway::new(
                    config.model.default_provider.as_deref(),
                    config.model.default_model.as_deref(),
                ))
            };
            dispatch(&mut session, &gateway, action)
        }
        CliCommand::Help | CliCommand::Version => Ok(()),
    }
}

fn list<M: StorageMedium, C: Clock>(session: &Session<M, C>, target: ListTarget) -> String {
    let state = session.state();
    match target {
        ListTarget::Messages { favorites_only } => render::messages(&state.messages, favorites_only),
        ListTarget::Texts { favorites_only } => render::texts(&state.generated_texts, favorites_only),
        ListTarget::Tasks => render::tasks(&state.tasks),
        ListTarget::Habits => render::habits(&state.habits, session.today()),
    }
}

fn dispatch<M: StorageMedium, C: Clock>(
    session: &mut Session<M, C>,
    gateway: &Gateway,
    action: UserAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = list_target_for(&action);
    let outcome = session.dispatch(action);
    report_failures(&outcome);
    let DispatchOutcome::Applied(applied) = outcome else {
        return Ok(());
    };

    for request in applied.requests {
        match request {
            AssistEffect::RequestChat { message } => {
                let reply = wait_for(gateway, GatewayRequest::chat(&message))?;
                let outcome = session.resolve(RuntimeAction::ChatAnswered {
                    reply: reply.clone(),
                });
                report_failures(&outcome);
                println!("{reply}");
            }
            AssistEffect::RequestGeneration { prompt } => {
                let result = wait_for(gateway, GatewayRequest::generate(&prompt))?;
                let outcome = session.resolve(RuntimeAction::GenerationFinished {
                    prompt,
                    result: result.clone(),
                });
                report_failures(&outcome);
                println!("{result}");
            }
            AssistEffect::Commit(_) => {}
        }
    }

    if let Some(target) = target {
        print!("{}", list(session, target));
    }
    Ok(())
}

/// Collection to re-render after a non-gateway intent.
fn list_target_for(action: &UserAction) -> Option<ListTarget> {
    match action {
        UserAction::SendChat { .. } | UserAction::RequestGeneration { .. } => None,
        UserAction::ToggleMessageFavorite { .. } | UserAction::DeleteMessage { .. } => {
            Some(ListTarget::Messages {
                favorites_only: false,
            })
        }
        UserAction::ToggleTextFavorite { .. } | UserAction::DeleteText { .. } => {
            Some(ListTarget::Texts {
                favorites_only: false,
            })
        }
        UserAction::AddTask(_)
        | UserAction::ToggleTaskComplete { .. }
        | UserAction::DeleteTask { .. } => Some(ListTarget::Tasks),
        UserAction::AddHabit(_) | UserAction::CompleteHabit { .. } | UserAction::DeleteHabit { .. } => {
            Some(ListTarget::Habits)
        }
    }
}

fn wait_for(gateway: &Gateway, request: GatewayRequest) -> io::Result<String> {
    let rx = spawn_request(Arc::clone(gateway), request);
    let mut stderr = io::stderr();
    let mut waited = false;
    let reply = loop {
        match rx.recv_timeout(Duration::from_millis(500)) {
            Ok(reply) => break Some(reply),
            Err(RecvTimeoutError::Timeout) => {
                write!(stderr, ".")?;
                stderr.flush()?;
                waited = true;
            }
            Err(RecvTimeoutError::Disconnected) => break None,
        }
    };
    if waited {
        writeln!(stderr)?;
    }
    Ok(match reply {
        Some(reply) => reply.text,
        None => assist_exec::contracts::CONNECTION_FALLBACK.to_string(),
    })
}

fn report_failures(outcome: &DispatchOutcome) {
    for failure in outcome.persist_failures() {
        eprintln!("warning: could not save {}: {}", failure.key.label(), failure.error);
    }
}

fn print_help() {
    println!("assist {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  assist chat MESSAGE...");
    println!("  assist generate PROMPT...");
    println!("  assist messages [--favorites]");
    println!("  assist messages favorite|delete ID");
    println!("  assist texts [--favorites]");
    println!("  assist texts favorite|delete ID");
    println!("  assist tasks");
    println!("  assist tasks add --title TITLE --date YYYY-MM-DD [--time HH:MM] [--priority low|medium|high]");
    println!("  assist tasks toggle|delete ID");
    println!("  assist habits");
    println!("  assist habits add --name NAME --goal GOAL");
    println!("  assist habits complete|delete ID");
    println!("  assist --help");
    println!("  assist --version");
    println!("Options:");
    println!("  --data-dir PATH   where collections are stored");
    println!("  --config PATH     config file (default: <config dir>/assist/config.toml)");
    println!("  --simulate        answer chat and generation offline");
    println!("Environment:");
    println!("  {}  log filter, e.g. assist_core=debug", settings::LOG_ENV);
}

#[cfg(test)]
mod tests {
    use assist_core::calendar::FixedClock;
    use assist_core::calendar::ZonePolicy;
    use assist_core::persistence::MemoryMedium;
    use assist_core::state::Role;
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn session() -> Session<MemoryMedium, FixedClock> {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        Session::open(DurableStore::new(MemoryMedium::new()), clock, ZonePolicy::Utc)
    }

    #[test]
    fn chat_dispatch_records_both_sides() {
        let mut session = session();
        let gateway: Gateway = Arc::new(SimulatedGateway);
        dispatch(
            &mut session,
            &gateway,
            UserAction::SendChat {
                content: "hello".to_string(),
            },
        )
        .expect("dispatch");
        let roles: Vec<Role> = session.state().messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(session.state().messages[1].content, "(simulated) You said: hello");
        assert!(!session.state().pending.chat);
    }

    #[test]
    fn generation_dispatch_prepends_text() {
        let mut session = session();
        let gateway: Gateway = Arc::new(SimulatedGateway);
        for prompt in ["first", "second"] {
            dispatch(
                &mut session,
                &gateway,
                UserAction::RequestGeneration {
                    prompt: prompt.to_string(),
                },
            )
            .expect("dispatch");
        }
        let prompts: Vec<&str> = session
            .state()
            .generated_texts
            .iter()
            .map(|t| t.prompt.as_str())
            .collect();
        assert_eq!(prompts, vec!["second", "first"]);
    }

    #[test]
    fn rejected_intent_leaves_store_untouched() {
        let mut session = session();
        let gateway: Gateway = Arc::new(SimulatedGateway);
        dispatch(
            &mut session,
            &gateway,
            UserAction::SendChat {
                content: "   ".to_string(),
            },
        )
        .expect("dispatch");
        assert!(session.state().messages.is_empty());
        assert!(session.store().medium().write_log().is_empty());
    }

    #[test]
    fn list_targets_follow_the_collection() {
        assert_eq!(
            list_target_for(&UserAction::DeleteTask {
                id: "1".into()
            }),
            Some(ListTarget::Tasks)
        );
        assert_eq!(
            list_target_for(&UserAction::SendChat {
                content: "x".to_string()
            }),
            None
        );
    }
}
