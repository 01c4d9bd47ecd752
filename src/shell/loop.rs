//! Shell event loop and state for tavola

use std::io::{self, BufRead, Write};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::parser::{parse_command, Command};
use crate::error::GameResult;
use crate::game::Game;
use crate::rules::{Rules, Variant};
use crate::search::{self, SearchParams, TraceNode};

pub struct Shell {
    game: Game,
    params: SearchParams,
    rng: StdRng,
    /// Tree of the last `go`, kept for `trace`
    last_trace: Option<TraceNode>,
    running: bool,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(Variant::Chess, SearchParams::default(), 0)
    }
}

impl Shell {
    pub fn new(variant: Variant, params: SearchParams, seed: u64) -> Self {
        let mut game = Game::with_variant(variant);
        game.new_game();
        Self {
            game,
            params,
            rng: StdRng::seed_from_u64(seed),
            last_trace: None,
            running: true,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn handle_command(&mut self, cmd: Command) -> Vec<String> {
        match self.execute(cmd) {
            Ok(lines) => lines,
            Err(e) => vec![format!("error: {e}")],
        }
    }

    fn execute(&mut self, cmd: Command) -> GameResult<Vec<String>> {
        let mut res = Vec::new();
        match cmd {
            Command::Variant(name) => {
                let variant: Variant = name.parse()?;
                self.game.set_rules(Rules::new(variant));
                self.game.new_game();
                res.push(format!("variant {variant}"));
            }
            Command::New => {
                self.game.new_game();
                res.push("ok".to_string());
            }
            Command::Show => {
                res.extend(self.game.to_string().lines().map(str::to_string));
            }
            Command::Moves => {
                let moves = self.game.compute_moves();
                let texts: Vec<String> = moves.iter().map(|m| self.game.move_to_string(m)).collect();
                res.push(format!("moves {}", texts.join(" ")));
            }
            Command::Play(text) => {
                let mv = self.game.play(&text)?;
                let board = self.game.board();
                let played = self.game.rules().move_to_string(board, &mv);
                res.push(format!("played {played}"));
                res.push(self.status_line());
            }
            Command::Undo => {
                self.game.undo_move()?;
                res.push("ok".to_string());
            }
            Command::Go { depth, algorithm } => {
                let mut params = self.params.clone();
                if let Some(d) = depth {
                    params = params.max_depth(d);
                }
                if let Some(a) = algorithm {
                    params = params.algorithm(a);
                }
                let outcome = search::best_move(&self.game, params, &mut self.rng)?;
                let stats = &outcome.stats;
                res.push(format!(
                    "info depth {} score {} nodes {} evaluations {} cutoffs {} time {}",
                    stats.depth,
                    outcome.score,
                    stats.nodes,
                    stats.evaluations,
                    stats.cutoffs,
                    stats.search_time.as_millis()
                ));
                match &outcome.best_move {
                    Some(mv) => res.push(format!("bestmove {}", self.game.move_to_string(mv))),
                    None => res.push("bestmove none".to_string()),
                }
                self.last_trace = outcome.trace;
            }
            Command::Status => {
                res.push(self.status_line());
            }
            Command::Save(path) => {
                self.game.save(&path)?;
                res.push(format!("saved {path}"));
            }
            Command::Load(path) => {
                self.game = Game::load(&path)?;
                res.push(format!("loaded {path}"));
            }
            Command::RulesSave(path) => {
                self.game.rules().save_to_file(&path)?;
                res.push(format!("saved {path}"));
            }
            Command::RulesLoad(path) => {
                let rules = Rules::load_from_file(&path)?;
                self.game.set_rules(rules);
                self.game.new_game();
                res.push(format!("variant {}", self.game.rules().variant()));
            }
            Command::Trace(path) => match &self.last_trace {
                Some(trace) => {
                    trace.write_json(&path)?;
                    res.push(format!("trace {} nodes written to {path}", trace.node_count()));
                }
                None => {
                    self.params = self.params.clone().trace(true);
                    res.push("tracing enabled, run go first".to_string());
                }
            },
            Command::Quit => {
                self.running = false;
            }
            Command::Invalid(usage) => {
                res.push(usage);
            }
            Command::Unknown(s) => {
                res.push(format!("unknown command: {s}"));
            }
        }
        Ok(res)
    }

    fn status_line(&self) -> String {
        format!(
            "status {} turn {} ply {}",
            self.game.state(),
            self.game.turn(),
            self.game.board().ply
        )
    }
}

pub fn run_shell_loop(shell: &mut Shell) -> io::Result<()> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    let mut buf = String::new();

    while shell.is_running() {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        debug!(command = line, "shell command");

        for r in process_line(line, shell) {
            writeln!(writer, "{r}")?;
        }
        writer.flush()?;
    }

    Ok(())
}

pub fn process_line(line: &str, shell: &mut Shell) -> Vec<String> {
    let cmd = parse_command(line);
    shell.handle_command(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_and_undo_round_trip() {
        let mut shell = Shell::default();
        let shown = process_line("show", &mut shell);
        let out = process_line("play e2e4", &mut shell);
        assert_eq!(out[0], "played e2-e4");
        assert_eq!(process_line("undo", &mut shell), vec!["ok"]);
        assert_eq!(process_line("show", &mut shell), shown);
    }

    #[test]
    fn errors_are_reported_not_fatal() {
        let mut shell = Shell::default();
        let out = process_line("play e2e5", &mut shell);
        assert!(out[0].starts_with("error:"));
        let out = process_line("variant go", &mut shell);
        assert!(out[0].starts_with("error:"));
        assert!(shell.is_running());
        process_line("quit", &mut shell);
        assert!(!shell.is_running());
    }

    #[test]
    fn go_reports_a_best_move() {
        let mut shell = Shell::default();
        process_line("variant checkers", &mut shell);
        let out = process_line("go depth 2 minimax", &mut shell);
        assert!(out[0].starts_with("info depth 2"));
        assert!(out[1].starts_with("bestmove "));
        assert_ne!(out[1], "bestmove none");
    }
}
