//! Shell command parser for tavola

//! Line-oriented commands; one command per line, words separated by whitespace.

use crate::search::Algorithm;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    Variant(String),
    New,
    Show,
    Moves,
    Play(String),
    Undo,
    Go {
        depth: Option<u8>,
        algorithm: Option<Algorithm>,
    },
    Status,
    Save(String),
    Load(String),
    RulesSave(String),
    RulesLoad(String),
    Trace(String),
    Quit,
    /// Known command with missing or bad arguments
    Invalid(String),
    Unknown(String),
}

/// Parse a shell command from a line
pub fn parse_command(line: &str) -> Command {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = parts.first() else {
        return Command::Unknown(String::new());
    };
    let arg = parts.get(1).map(|s| s.to_string());
    let needs = |usage: &str, make: fn(String) -> Command| match &arg {
        Some(value) => make(value.clone()),
        None => Command::Invalid(format!("usage: {usage}")),
    };

    match head {
        "variant" => needs("variant <name>", Command::Variant),
        "new" => Command::New,
        "show" => Command::Show,
        "moves" => Command::Moves,
        "play" => needs("play <move>", Command::Play),
        "undo" => Command::Undo,
        "status" => Command::Status,
        "save" => needs("save <path>", Command::Save),
        "load" => needs("load <path>", Command::Load),
        "trace" => needs("trace <path>", Command::Trace),
        "quit" | "exit" => Command::Quit,
        "rules" => match (parts.get(1), parts.get(2)) {
            (Some(&"save"), Some(path)) => Command::RulesSave(path.to_string()),
            (Some(&"load"), Some(path)) => Command::RulesLoad(path.to_string()),
            _ => Command::Invalid("usage: rules save|load <path>".to_string()),
        },
        "go" => {
            // go [depth N] [minimax|negamax]
            let mut depth = None;
            let mut algorithm = None;
            let mut i = 1usize;
            while i < parts.len() {
                match parts[i] {
                    "depth" => {
                        match parts.get(i + 1).and_then(|v| v.parse::<u8>().ok()) {
                            Some(d) if d > 0 => depth = Some(d),
                            _ => return Command::Invalid("usage: go [depth N] [minimax|negamax]".to_string()),
                        }
                        i += 2;
                    }
                    word => {
                        match word.parse::<Algorithm>() {
                            Ok(a) => algorithm = Some(a),
                            Err(_) => return Command::Invalid(format!("unknown go option '{word}'")),
                        }
                        i += 1;
                    }
                }
            }
            Command::Go { depth, algorithm }
        }
        other => Command::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_options_in_any_order() {
        assert_eq!(
            parse_command("go minimax depth 3"),
            Command::Go {
                depth: Some(3),
                algorithm: Some(Algorithm::Minimax)
            }
        );
        assert_eq!(
            parse_command("go"),
            Command::Go {
                depth: None,
                algorithm: None
            }
        );
        assert!(matches!(parse_command("go depth x"), Command::Invalid(_)));
    }

    #[test]
    fn missing_arguments_are_invalid() {
        assert!(matches!(parse_command("play"), Command::Invalid(_)));
        assert!(matches!(parse_command("rules save"), Command::Invalid(_)));
        assert_eq!(parse_command("  rules load r.json "), Command::RulesLoad("r.json".into()));
        assert_eq!(parse_command("frobnicate"), Command::Unknown("frobnicate".into()));
    }
}
