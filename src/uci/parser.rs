//! UCI command parser for Alfiere

//! Minimal but practical UCI parser covering the commands the engine answers.

use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum UciCommand {
    Uci,
    IsReady,
    SetOption {
        name: String,
        value: Option<String>,
    },
    UciNewGame,
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go(GoParams),
    Stop,
    Quit,
    Unknown(String),
}

/// Limits attached to a `go` command
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movetime: Option<u64>,
    pub depth: Option<u8>,
    pub movestogo: Option<u64>,
}

impl GoParams {
    /// True when any clock or fixed move time was given
    pub fn has_clock(&self) -> bool {
        self.movetime.is_some() || self.wtime.is_some() || self.btime.is_some()
    }
}

/// Value following a keyword, `None` if missing or unparsable
fn value_after<T: FromStr>(parts: &[&str], i: usize) -> Option<T> {
    parts.get(i + 1).and_then(|v| v.parse::<T>().ok())
}

/// Parse a UCI command from a string (simple tokenizer)
pub fn parse_uci_command(line: &str) -> UciCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return UciCommand::Unknown("".to_string());
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    match parts[0] {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "stop" => UciCommand::Stop,
        "quit" => UciCommand::Quit,
        "setoption" => {
            // expected: setoption name <name> [value <val>]
            let mut name = String::new();
            let mut value: Option<String> = None;
            let mut i = 1usize;
            while i < parts.len() {
                match parts[i] {
                    "name" => {
                        i += 1;
                        let mut vals = Vec::new();
                        while i < parts.len() && parts[i] != "value" {
                            vals.push(parts[i]);
                            i += 1;
                        }
                        name = vals.join(" ");
                    }
                    "value" => {
                        value = Some(parts[i + 1..].join(" "));
                        break;
                    }
                    _ => {
                        i += 1;
                    }
                }
            }
            UciCommand::SetOption { name, value }
        }
        "position" => {
            // position [fen <fenstring> | startpos ]  moves <move1> ...
            let mut fen: Option<String> = None;
            let mut moves: Vec<String> = Vec::new();
            if parts.len() >= 2 && parts[1] == "startpos" {
                if let Some(pos) = parts.iter().position(|&s| s == "moves") {
                    moves.extend(parts[pos + 1..].iter().map(|m| m.to_string()));
                }
            } else if parts.len() >= 2 && parts[1] == "fen" {
                // collect until "moves" or end
                let mut i = 2usize;
                let mut fen_parts = Vec::new();
                while i < parts.len() && parts[i] != "moves" {
                    fen_parts.push(parts[i]);
                    i += 1;
                }
                fen = Some(fen_parts.join(" "));
                if i < parts.len() {
                    moves.extend(parts[i + 1..].iter().map(|m| m.to_string()));
                }
            }
            UciCommand::Position { fen, moves }
        }
        "go" => {
            let mut go = GoParams::default();
            let mut i = 1usize;
            while i < parts.len() {
                let step = match parts[i] {
                    "wtime" => {
                        go.wtime = value_after(&parts, i);
                        2
                    }
                    "btime" => {
                        go.btime = value_after(&parts, i);
                        2
                    }
                    "winc" => {
                        go.winc = value_after(&parts, i);
                        2
                    }
                    "binc" => {
                        go.binc = value_after(&parts, i);
                        2
                    }
                    "movetime" => {
                        go.movetime = value_after(&parts, i);
                        2
                    }
                    "depth" => {
                        go.depth = value_after(&parts, i);
                        2
                    }
                    "movestogo" => {
                        go.movestogo = value_after(&parts, i);
                        2
                    }
                    _ => 1,
                };
                i += step;
            }
            UciCommand::Go(go)
        }
        other => UciCommand::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_skips_unknown_tokens() {
        let cmd = parse_uci_command("go infinite depth 4 nodes 1000");
        let UciCommand::Go(go) = cmd else {
            panic!("expected go");
        };
        assert_eq!(go.depth, Some(4));
        assert!(!go.has_clock());
    }
}
