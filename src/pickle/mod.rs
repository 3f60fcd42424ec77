use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::matches::{self, Court, NotEnoughPlayers};

pub mod embed;

/// Problems with the parameters of a session. These are shown to the user in
/// the embed and never abort the interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("<number of courts not an integer>: invalid court count {0:?}")]
    InvalidCourtCount(String),
    #[error("<too many matches>: {singles} + {doubles} > {max}")]
    TooManyCourts {
        singles: usize,
        doubles: usize,
        max: usize,
    },
    #[error("<not enough players>: {0}")]
    NotEnoughPlayers(#[from] NotEnoughPlayers),
}

/// Splits a comma separated list of names, trimming and case folding each one.
/// Empty and duplicate names are kept.
pub fn parse_players(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|name| name.trim().to_lowercase())
        .collect()
}

fn parse_court_count(raw: &str) -> Result<usize, SessionError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| SessionError::InvalidCourtCount(raw.to_string()))
}

/// The last parameters submitted for one interactive message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    singles: String,
    doubles: String,
    players: Vec<String>,
}

impl Session {
    pub fn new(singles: impl Into<String>, doubles: impl Into<String>, players: Vec<String>) -> Self {
        Session {
            singles: singles.into(),
            doubles: doubles.into(),
            players,
        }
    }

    /// Builds a session from the raw text of the edit modal
    pub fn from_input(singles: &str, doubles: &str, players: &str) -> Self {
        Session::new(singles.trim(), doubles.trim(), parse_players(players))
    }

    pub fn singles(&self) -> &str {
        &self.singles
    }

    pub fn doubles(&self) -> &str {
        &self.doubles
    }

    #[cfg(test)]
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// The roster as it would be typed back into the edit modal
    pub fn players_input(&self) -> String {
        self.players.join(", ")
    }

    pub fn court_counts(&self, max_courts: usize) -> Result<(usize, usize), SessionError> {
        let singles = parse_court_count(&self.singles)?;
        let doubles = parse_court_count(&self.doubles)?;
        if singles.saturating_add(doubles) > max_courts {
            return Err(SessionError::TooManyCourts {
                singles,
                doubles,
                max: max_courts,
            });
        }
        Ok((singles, doubles))
    }

    pub fn summary(&self) -> String {
        let underlined = self
            .players
            .iter()
            .map(|name| format!("__{}__", name))
            .collect::<Vec<_>>()
            .join(", ");
        [
            format!("**Player(s)**: {} [{}]", underlined, self.players.len()),
            format!("**Singles court(s)**: {}", self.singles),
            format!("**Doubles court(s)**: {}", self.doubles),
        ]
        .join("\n")
    }

    /// Draws a fresh set of courts. Any problem with the parameters ends up in
    /// the board's error instead of being returned.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, max_courts: usize) -> Board {
        let courts = self.court_counts(max_courts).and_then(|(singles, doubles)| {
            info!(
                "Generating matches for ({}, {}, {:?})",
                singles, doubles, self.players
            );
            Ok(matches::generate(rng, singles, doubles, &self.players)?)
        });

        match courts {
            Ok(courts) => Board {
                summary: self.summary(),
                error: None,
                courts: courts.into_iter().map(|c| (c, Outcome::Tie)).collect(),
            },
            Err(error) => {
                info!("Could not generate matches: {}", error);
                Board {
                    summary: self.summary(),
                    error: Some(error),
                    courts: Vec::new(),
                }
            }
        }
    }
}

/// Which team of a court
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    LeftWon,
    #[default]
    Tie,
    RightWon,
}

impl Outcome {
    fn win_for(side: Side) -> Self {
        match side {
            Side::Left => Outcome::LeftWon,
            Side::Right => Outcome::RightWon,
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::LeftWon => Some(Side::Left),
            Outcome::Tie => None,
            Outcome::RightWon => Some(Side::Right),
        }
    }
}

/// A rendered session: what the interactive message currently shows
#[derive(Debug, Clone)]
pub struct Board {
    summary: String,
    error: Option<SessionError>,
    courts: Vec<(Court, Outcome)>,
}

impl Board {
    pub fn can_generate(&self) -> bool {
        self.error.is_none()
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn courts(&self) -> &[(Court, Outcome)] {
        &self.courts
    }

    /// Marks `side` as the winner of a court, or clears the result if that
    /// side had already won. Returns false for an unknown court.
    pub fn record(&mut self, court: usize, side: Side) -> bool {
        let Some((_, outcome)) = self.courts.get_mut(court) else {
            return false;
        };
        let win = Outcome::win_for(side);
        *outcome = if *outcome == win { Outcome::Tie } else { win };
        true
    }

    pub fn description(&self) -> String {
        let mut lines = vec![self.summary.clone(), String::new()];
        match &self.error {
            Some(error) => {
                lines.push("__**Errors**__".to_string());
                lines.push("```".to_string());
                lines.push(error.to_string());
                lines.push("```".to_string());
            }
            None => {
                let courts: Vec<Court> = self.courts.iter().map(|(c, _)| c.clone()).collect();
                lines.push("**Matches**".to_string());
                lines.push(matches::describe(&courts));
            }
        }
        lines.join("\n")
    }
}

/// What a button press on a session message asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Generate,
    Edit,
    Team { court: usize, side: Side },
}

impl Action {
    pub fn custom_id(self, session_id: u64) -> String {
        match self {
            Action::Generate => format!("{}:generate", session_id),
            Action::Edit => format!("{}:edit", session_id),
            Action::Team { court, side } => {
                format!("{}:team:{}:{}", session_id, court, side.as_str())
            }
        }
    }

    /// Parses a component custom id, ignoring ids that belong to another session
    pub fn parse(session_id: u64, custom_id: &str) -> Option<Self> {
        let mut parts = custom_id.split(':');
        if parts.next()?.parse::<u64>().ok()? != session_id {
            return None;
        }
        let action = match (parts.next()?, parts.next(), parts.next()) {
            ("generate", None, None) => Action::Generate,
            ("edit", None, None) => Action::Edit,
            ("team", Some(court), Some(side)) => Action::Team {
                court: court.parse().ok()?,
                side: Side::parse(side)?,
            },
            _ => return None,
        };
        match parts.next() {
            Some(_) => None,
            None => Some(action),
        }
    }
}
