//! Line-oriented console over a [`PollService`].
//!
//! One command per line; arguments are whitespace separated and may be
//! double-quoted. Poll ids can be shortened to any unique prefix.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::polls::{NewPoll, Poll, PollResults};
use crate::service::PollService;

const HELP: &str = "\
commands:
  create \"<question>\" <option> <option>... [--window N]
  launch <id>            make a poll the active one
  stop [id]              stop a poll (default: the active one)
  delete <id>
  vote <id> <option> <voter>
  list                   all polls
  show <id>              poll record as JSON
  results [id]           results for one poll, or all
  active                 the poll currently accepting votes
  stats
  help
  quit";

/// Parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Create {
        question: String,
        options: Vec<String>,
        window: Option<u32>,
    },
    Launch(String),
    Stop(Option<String>),
    Delete(String),
    Vote {
        id: String,
        option: String,
        voter: String,
    },
    List,
    Show(String),
    Results(Option<String>),
    Active,
    Stats,
    Help,
    Quit,
}

/// Split a line into arguments, honouring double quotes and `\"`.
pub fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => match chars.next() {
                Some(next) => current.push(next),
                None => return Err("dangling escape".to_string()),
            },
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

/// Parse one console line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let args = split_args(line)?;
    let Some((name, rest)) = args.split_first() else {
        return Ok(None);
    };

    let one = |what: &str| -> Result<String, String> {
        match rest {
            [arg] => Ok(arg.clone()),
            _ => Err(format!("usage: {name} <{what}>")),
        }
    };

    let command = match name.to_lowercase().as_str() {
        "create" | "new" => parse_create(rest)?,
        "launch" | "start" => ConsoleCommand::Launch(one("id")?),
        "stop" => match rest {
            [] => ConsoleCommand::Stop(None),
            [id] => ConsoleCommand::Stop(Some(id.clone())),
            _ => return Err("usage: stop [id]".to_string()),
        },
        "delete" | "rm" => ConsoleCommand::Delete(one("id")?),
        "vote" => match rest {
            [id, option, voter] => ConsoleCommand::Vote {
                id: id.clone(),
                option: option.clone(),
                voter: voter.clone(),
            },
            _ => return Err("usage: vote <id> <option> <voter>".to_string()),
        },
        "list" | "ls" => ConsoleCommand::List,
        "show" => ConsoleCommand::Show(one("id")?),
        "results" => match rest {
            [] => ConsoleCommand::Results(None),
            [id] => ConsoleCommand::Results(Some(id.clone())),
            _ => return Err("usage: results [id]".to_string()),
        },
        "active" => ConsoleCommand::Active,
        "stats" => ConsoleCommand::Stats,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

fn parse_create(args: &[String]) -> Result<ConsoleCommand, String> {
    let mut window = None;
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--window" || arg == "-w" {
            let value = iter.next().ok_or("--window needs a value")?;
            let seconds = value
                .parse::<u32>()
                .map_err(|_| format!("invalid window: {value}"))?;
            window = Some(seconds);
        } else {
            positional.push(arg.clone());
        }
    }

    if positional.is_empty() {
        return Err("usage: create \"<question>\" <option> <option>... [--window N]".to_string());
    }
    let question = positional.remove(0);
    Ok(ConsoleCommand::Create {
        question,
        options: positional,
        window,
    })
}

/// Map an id or unique id prefix to a full poll id
pub fn resolve_id(service: &PollService, prefix: &str) -> Result<String, String> {
    let ids: Vec<String> = service.list().into_iter().map(|p| p.id).collect();
    if ids.iter().any(|id| id == prefix) {
        return Ok(prefix.to_string());
    }
    let matches: Vec<&String> = ids.iter().filter(|id| id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => Err(format!("no poll matches {prefix}")),
        _ => Err(format!("{prefix} matches {} polls", matches.len())),
    }
}

/// Short form of a poll id for display
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// One-line poll summary
pub fn format_poll_line(poll: &Poll) -> String {
    let timer = if poll.is_active() {
        format!("{:>3}s left", poll.remaining_seconds)
    } else {
        format!("{:>3}s     ", poll.window_seconds)
    };
    format!(
        "{}  {:<6}  {}  {:>4} votes  {} [{}]",
        short_id(&poll.id),
        poll.state.as_str(),
        timer,
        poll.total_votes(),
        poll.question,
        poll.options.join(", ")
    )
}

/// Multi-line results block with a bar per option
pub fn format_results(results: &PollResults) -> String {
    let width = results
        .options
        .iter()
        .map(|o| o.option.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{}  {}  ({}, {} votes)\n",
        short_id(&results.poll_id),
        results.question,
        results.state,
        results.total_votes
    );
    if results.total_votes == 0 {
        out.push_str("  no votes yet\n");
        return out;
    }
    for line in &results.options {
        let bar = "#".repeat((line.percentage / 5) as usize);
        out.push_str(&format!(
            "  {:<width$}  {:>4} votes ({:>3}%) {:<20}{}\n",
            line.option,
            line.votes,
            line.percentage,
            bar,
            if line.is_winner { " winner" } else { "" },
        ));
    }
    out
}

/// Execute one command, returning the text to print.
pub async fn execute(service: &PollService, command: ConsoleCommand) -> Result<String, String> {
    let text = |e: crate::polls::PollError| e.to_string();

    match command {
        ConsoleCommand::Create {
            question,
            options,
            window,
        } => {
            let mut request = NewPoll::new(question).with_options(options);
            request.window_seconds = window;
            let poll = service.create_poll(request).await.map_err(text)?;
            Ok(format!("created {}", format_poll_line(&poll)))
        }
        ConsoleCommand::Launch(id) => {
            let id = resolve_id(service, &id)?;
            let poll = service.launch(&id).map_err(text)?;
            Ok(format!("launched {}", format_poll_line(&poll)))
        }
        ConsoleCommand::Stop(None) => match service.stop_active() {
            Some(poll) => Ok(format!("stopped {}", format_poll_line(&poll))),
            None => Ok("no active poll".to_string()),
        },
        ConsoleCommand::Stop(Some(id)) => {
            let id = resolve_id(service, &id)?;
            let poll = service.stop(&id).map_err(text)?;
            Ok(format_poll_line(&poll))
        }
        ConsoleCommand::Delete(id) => {
            let id = resolve_id(service, &id)?;
            let poll = service.delete(&id).map_err(text)?;
            Ok(format!("deleted {}", short_id(&poll.id)))
        }
        ConsoleCommand::Vote { id, option, voter } => {
            let id = resolve_id(service, &id)?;
            let receipt = service.cast_vote(&id, &option, &voter).await.map_err(text)?;
            Ok(format!(
                "{} voted {} ({} of {} votes)",
                receipt.voter, receipt.option, receipt.option_votes, receipt.total_votes
            ))
        }
        ConsoleCommand::List => {
            let polls = service.list();
            if polls.is_empty() {
                return Ok("no polls".to_string());
            }
            Ok(polls
                .iter()
                .map(format_poll_line)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        ConsoleCommand::Show(id) => {
            let id = resolve_id(service, &id)?;
            let poll = service
                .registry()
                .get(&id)
                .ok_or_else(|| format!("poll not found: {id}"))?;
            serde_json::to_string_pretty(&poll).map_err(|e| e.to_string())
        }
        ConsoleCommand::Results(Some(id)) => {
            let id = resolve_id(service, &id)?;
            let results = service
                .results(&id)
                .ok_or_else(|| format!("poll not found: {id}"))?;
            Ok(format_results(&results).trim_end().to_string())
        }
        ConsoleCommand::Results(None) => {
            let all = service.all_results();
            if all.is_empty() {
                return Ok("no polls".to_string());
            }
            Ok(all
                .iter()
                .map(format_results)
                .collect::<String>()
                .trim_end()
                .to_string())
        }
        ConsoleCommand::Active => match service.current_poll() {
            Some(poll) => Ok(format_poll_line(&poll)),
            None => Ok("no active poll".to_string()),
        },
        ConsoleCommand::Stats => {
            let stats = service.registry().stats();
            let metrics = service.metrics().snapshot();
            let value = serde_json::json!({ "registry": stats, "metrics": metrics });
            serde_json::to_string_pretty(&value).map_err(|e| e.to_string())
        }
        ConsoleCommand::Help => Ok(HELP.to_string()),
        ConsoleCommand::Quit => Ok(String::new()),
    }
}

/// Read commands from `input` until `quit` or end of input.
pub async fn run<R, W>(
    service: &PollService,
    input: R,
    mut output: W,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    output.write_all(b"> ").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_line(&line) {
            Ok(None) => None,
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => Some(match execute(service, command).await {
                Ok(text) => text,
                Err(e) => format!("error: {e}"),
            }),
            Err(e) => Some(format!("error: {e}")),
        };
        if let Some(reply) = reply {
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
        output.write_all(b"> ").await?;
        output.flush().await?;
    }

    output.flush().await?;
    Ok(())
}
