//! Log line classification and kill-event extraction

use thiserror::Error;

/// Action token for a kill event
const ACTION_KILL: &str = "Kill:";
/// Action token for a scoreboard line
const ACTION_SCORE: &str = "score:";
/// Action token for a map change
const ACTION_SERVER: &str = "Server:";

/// Sentinel attacker name used by the server for environmental deaths
pub const WORLD: &str = "<world>";

/// Backspace echo the game console occasionally leaves in a line
const CONSOLE_ARTIFACT: &str = "]\u{8} \u{8}";

/// Token index where player names start on a kill line, immediately after
/// `<date> <time> Kill: <id> <id> <modid>:`
const KILL_NAME_OFFSET: usize = 6;

/// Errors for a single log line. Every variant is recoverable: the offending
/// line is discarded and the stream continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid log line format: expected at least 3 parts, got {parts}: {line:?}")]
    MalformedLine { parts: usize, line: String },

    #[error("invalid kill event: line contains \"killed\" {occurrences} times: {line:?}")]
    AmbiguousKillLine { occurrences: usize, line: String },

    #[error("invalid kill event: empty player names (attacker: {attacker:?}, victim: {victim:?})")]
    EmptyParticipant { attacker: String, victim: String },
}

/// Weapon classes tracked per player. Everything outside the three tracked
/// mods collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weapon {
    Rocket,
    Railgun,
    Gauntlet,
    Other,
}

impl Weapon {
    pub fn from_mod(mod_name: &str) -> Self {
        match mod_name {
            "MOD_ROCKET" | "MOD_ROCKET_SPLASH" => Weapon::Rocket,
            "MOD_RAILGUN" => Weapon::Railgun,
            "MOD_GAUNTLET" => Weapon::Gauntlet,
            _ => Weapon::Other,
        }
    }
}

/// A classified log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Kill {
        attacker: String,
        victim: String,
        weapon: Weapon,
    },
    MapChange {
        map: String,
        timestamp: String,
    },
    ScoreReport,
    /// Anything the tracker does not care about; consumed without effect
    Unrecognized,
}

/// Classify one raw log line.
///
/// Lines are split on single spaces, so consecutive spaces produce empty
/// tokens and multi-word player names survive as token runs. The first two
/// tokens are the timestamp, the third is the action.
pub fn classify(raw: &str) -> Result<Event, ParseError> {
    let line = raw.replacen(CONSOLE_ARTIFACT, "", 1);
    let tokens: Vec<&str> = line.split(' ').collect();

    if tokens.len() < 3 {
        return Err(ParseError::MalformedLine {
            parts: tokens.len(),
            line: line.clone(),
        });
    }

    let timestamp = format!("{} {}", tokens[0], tokens[1]);

    match tokens[2] {
        ACTION_KILL => classify_kill(&line, &tokens),
        ACTION_SERVER => {
            if tokens.len() >= 4 {
                Ok(Event::MapChange {
                    map: tokens[3].to_string(),
                    timestamp,
                })
            } else {
                Ok(Event::Unrecognized)
            }
        }
        ACTION_SCORE => Ok(Event::ScoreReport),
        _ => Ok(Event::Unrecognized),
    }
}

/// Extract attacker, victim and weapon from a kill line.
///
/// Grammar: `<date> <time> Kill: <id> <id> <modid>: <attacker...> killed
/// <victim...> by <WEAPON>`. The word "killed" must occur exactly once;
/// a player name containing the substring "killed" therefore rejects the
/// whole line. Known limitation, kept deliberately: disambiguating such
/// names is not possible with a token-based split.
fn classify_kill(line: &str, tokens: &[&str]) -> Result<Event, ParseError> {
    let occurrences = line.matches("killed").count();
    if occurrences > 1 {
        return Err(ParseError::AmbiguousKillLine {
            occurrences,
            line: line.to_string(),
        });
    }

    let killed_index = tokens.iter().position(|t| *t == "killed");

    let (attacker, victim, weapon) = match killed_index {
        Some(idx) => {
            // Weapon is always the final token
            let weapon = tokens[tokens.len() - 1];
            let attacker = if idx > KILL_NAME_OFFSET {
                tokens[KILL_NAME_OFFSET..idx].join(" ")
            } else {
                String::new()
            };
            // Victim runs up to (not including) the trailing `by <WEAPON>`
            let victim = if idx + 1 < tokens.len() - 2 {
                tokens[idx + 1..tokens.len() - 2].join(" ")
            } else {
                String::new()
            };
            (attacker, victim, weapon)
        }
        None => (String::new(), String::new(), ""),
    };

    if attacker.is_empty() || victim.is_empty() {
        return Err(ParseError::EmptyParticipant { attacker, victim });
    }

    Ok(Event::Kill {
        attacker,
        victim,
        weapon: Weapon::from_mod(weapon),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kill(attacker: &str, victim: &str, weapon: Weapon) -> Event {
        Event::Kill {
            attacker: attacker.to_string(),
            victim: victim.to_string(),
            weapon,
        }
    }

    #[test]
    fn test_classify_kill_single_word_names() {
        let line = "2024-04-19 16:01:49 Kill: 1 6 10: miniFURI killed BetterLuckThanGood by MOD_RAILGUN";
        assert_eq!(
            classify(line).unwrap(),
            kill("miniFURI", "BetterLuckThanGood", Weapon::Railgun)
        );
    }

    #[test]
    fn test_classify_kill_multi_word_names() {
        let line = "2024-04-19 16:02:05 Kill: 7 1 2: The Great One killed Mr. Chinaman Jr by MOD_GAUNTLET";
        assert_eq!(
            classify(line).unwrap(),
            kill("The Great One", "Mr. Chinaman Jr", Weapon::Gauntlet)
        );
    }

    #[test]
    fn test_classify_kill_punctuated_names() {
        let line = "2024-04-19 16:01:39 Kill: 4 3 9: Triple-H killed Mr.Chinaman by MOD_PLASMA_SPLASH";
        assert_eq!(
            classify(line).unwrap(),
            kill("Triple-H", "Mr.Chinaman", Weapon::Other)
        );
    }

    #[test]
    fn test_classify_world_kill() {
        let line = "2024-04-19 16:14:43 Kill: 1022 2 16: <world> killed cmester by MOD_LAVA";
        assert_eq!(classify(line).unwrap(), kill(WORLD, "cmester", Weapon::Other));
    }

    #[test]
    fn test_classify_suicide() {
        let line = "2024-04-19 16:01:33 Kill: 5 5 20: fjerlv killed fjerlv by MOD_SUICIDE";
        assert_eq!(classify(line).unwrap(), kill("fjerlv", "fjerlv", Weapon::Other));
    }

    #[test]
    fn test_weapon_mapping() {
        assert_eq!(Weapon::from_mod("MOD_ROCKET"), Weapon::Rocket);
        assert_eq!(Weapon::from_mod("MOD_ROCKET_SPLASH"), Weapon::Rocket);
        assert_eq!(Weapon::from_mod("MOD_RAILGUN"), Weapon::Railgun);
        assert_eq!(Weapon::from_mod("MOD_GAUNTLET"), Weapon::Gauntlet);
        assert_eq!(Weapon::from_mod("MOD_PLASMA"), Weapon::Other);
        assert_eq!(Weapon::from_mod("MOD_FALLING"), Weapon::Other);
    }

    #[test]
    fn test_missing_killed_word_is_rejected() {
        let line = "2024-04-19 16:01:33 Kill: 5 5 20: fjerlv fragged victim by MOD_RAILGUN";
        assert_eq!(
            classify(line),
            Err(ParseError::EmptyParticipant {
                attacker: String::new(),
                victim: String::new(),
            })
        );
    }

    #[test]
    fn test_player_name_containing_killed_is_rejected() {
        let line = "2024-04-19 16:01:33 Kill: 5 3 10: killedmachine killed fjerlv by MOD_RAILGUN";
        match classify(line) {
            Err(ParseError::AmbiguousKillLine { occurrences, .. }) => {
                assert_eq!(occurrences, 2);
            }
            other => panic!("expected AmbiguousKillLine, got {other:?}"),
        }
    }

    #[test]
    fn test_too_few_tokens_is_malformed() {
        match classify("2024-04-19 16:01:33") {
            Err(ParseError::MalformedLine { parts, .. }) => assert_eq!(parts, 2),
            other => panic!("expected MalformedLine, got {other:?}"),
        }
        assert!(matches!(
            classify(""),
            Err(ParseError::MalformedLine { .. })
        ));
    }

    #[test]
    fn test_map_change() {
        let line = "2024-04-19 16:00:00 Server: q3dm6";
        assert_eq!(
            classify(line).unwrap(),
            Event::MapChange {
                map: "q3dm6".to_string(),
                timestamp: "2024-04-19 16:00:00".to_string(),
            }
        );
    }

    #[test]
    fn test_map_change_without_name_is_ignored() {
        let line = "2024-04-19 16:00:00 Server:";
        assert_eq!(classify(line).unwrap(), Event::Unrecognized);
    }

    #[test]
    fn test_score_line() {
        let line = "2024-04-19 16:20:11 score: 10  ping: 40  client: 2 fjerlv";
        assert_eq!(classify(line).unwrap(), Event::ScoreReport);
    }

    #[test]
    fn test_unknown_action_is_ignored() {
        let line = "2024-04-19 16:00:01 ClientConnect: 4";
        assert_eq!(classify(line).unwrap(), Event::Unrecognized);
    }

    #[test]
    fn test_console_artifact_is_stripped() {
        let line = "2024-04-19 16:01:49 Kill: 1 6 10: mini]\u{8} \u{8}FURI killed cmester by MOD_RAILGUN";
        assert_eq!(
            classify(line).unwrap(),
            kill("miniFURI", "cmester", Weapon::Railgun)
        );
    }
}
