use std::fmt;
use std::iter;

use rand::seq::{index, SliceRandom};
use rand::Rng;
use thiserror::Error;

/// What is shown in place of the court list when no courts were requested
pub const NO_COURTS: &str = "<none>";

/// The kind of court a match is played on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourtKind {
    Singles,
    Doubles,
}

impl CourtKind {
    /// Number of players needed to fill a court of this kind
    pub const fn size(self) -> usize {
        match self {
            CourtKind::Singles => 2,
            CourtKind::Doubles => 4,
        }
    }
}

/// A single court with its players, already shuffled.
///
/// The first half of `players` is one team and the second half the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Court {
    kind: CourtKind,
    players: Vec<String>,
}

impl Court {
    #[cfg(test)]
    pub fn kind(&self) -> CourtKind {
        self.kind
    }

    #[cfg(test)]
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// Splits the court into (left team, right team)
    pub fn teams(&self) -> (&[String], &[String]) {
        self.players.split_at(self.kind.size() / 2)
    }
}

impl fmt::Display for Court {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (left, right) = self.teams();
        write!(f, "{} VS {}", left.join(" and "), right.join(" and "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Can't make matches with {} < {singles} * {} + {doubles} * {}",
    .players.len(),
    CourtKind::Singles.size(),
    CourtKind::Doubles.size()
)]
pub struct NotEnoughPlayers {
    pub singles: usize,
    pub doubles: usize,
    pub players: Vec<String>,
}

/// Total number of players needed for the requested courts
pub fn required_players(singles: usize, doubles: usize) -> usize {
    singles
        .saturating_mul(CourtKind::Singles.size())
        .saturating_add(doubles.saturating_mul(CourtKind::Doubles.size()))
}

/// Randomly assigns players to `singles` singles courts followed by `doubles`
/// doubles courts.
///
/// Every court draws uniformly from the players not yet assigned, so nobody
/// (by roster position) plays on two courts. The drawn players are shuffled
/// again before being split into teams.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    singles: usize,
    doubles: usize,
    players: &[String],
) -> Result<Vec<Court>, NotEnoughPlayers> {
    if players.len() < required_players(singles, doubles) {
        return Err(NotEnoughPlayers {
            singles,
            doubles,
            players: players.to_vec(),
        });
    }

    let demand = iter::repeat(CourtKind::Singles)
        .take(singles)
        .chain(iter::repeat(CourtKind::Doubles).take(doubles));

    let mut pool = players.to_vec();
    let mut courts = Vec::with_capacity(singles + doubles);

    for kind in demand {
        let mut drawn = index::sample(rng, pool.len(), kind.size()).into_vec();
        // remove from the back so earlier indices stay valid
        drawn.sort_unstable_by(|a, b| b.cmp(a));
        let mut court_players: Vec<String> = drawn.into_iter().map(|i| pool.remove(i)).collect();
        court_players.shuffle(rng);

        courts.push(Court {
            kind,
            players: court_players,
        });
    }

    Ok(courts)
}

/// One line per court, or [`NO_COURTS`] if there are none
pub fn describe(courts: &[Court]) -> String {
    if courts.is_empty() {
        return NO_COURTS.to_string();
    }
    courts
        .iter()
        .map(|court| court.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn court(kind: CourtKind, names: &[&str]) -> Court {
        Court {
            kind,
            players: roster(names),
        }
    }

    #[test]
    fn test_court_sizes() {
        assert_eq!(CourtKind::Singles.size(), 2);
        assert_eq!(CourtKind::Doubles.size(), 4);
        assert_eq!(required_players(3, 2), 14);
    }

    #[test]
    fn test_generate_orders_singles_before_doubles() {
        let players = roster(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let courts = generate(&mut rng, 2, 1, &players).unwrap();

            let kinds: Vec<_> = courts.iter().map(Court::kind).collect();
            assert_eq!(
                kinds,
                vec![CourtKind::Singles, CourtKind::Singles, CourtKind::Doubles]
            );
        }
    }

    #[test]
    fn test_generate_uses_distinct_players_from_roster() {
        let players = roster(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
        let known: HashSet<_> = players.iter().cloned().collect();

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let courts = generate(&mut rng, 1, 2, &players).unwrap();

            let assigned: Vec<_> = courts.iter().flat_map(|c| c.players().to_vec()).collect();
            let unique: HashSet<_> = assigned.iter().cloned().collect();

            assert_eq!(assigned.len(), required_players(1, 2));
            assert_eq!(unique.len(), assigned.len(), "player repeated: {assigned:?}");
            assert!(unique.is_subset(&known));
        }
    }

    #[test]
    fn test_team_split() {
        let players = roster(&["a", "b", "c", "d", "e", "f"]);
        let mut rng = StdRng::seed_from_u64(7);
        let courts = generate(&mut rng, 1, 1, &players).unwrap();

        let (left, right) = courts[0].teams();
        assert_eq!((left.len(), right.len()), (1, 1));

        let (left, right) = courts[1].teams();
        assert_eq!((left.len(), right.len()), (2, 2));
    }

    #[test]
    fn test_six_players_fill_one_singles_and_one_doubles() {
        let players = roster(&["a", "b", "c", "d", "e", "f"]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let courts = generate(&mut rng, 1, 1, &players).unwrap();

            assert_eq!(courts.len(), 2);
            let mut assigned: Vec<_> = courts.iter().flat_map(|c| c.players().to_vec()).collect();
            assigned.sort();
            assert_eq!(assigned, players);
        }
    }

    #[test]
    fn test_not_enough_players() {
        let players = roster(&["a", "b", "c", "d", "e"]);
        let mut rng = StdRng::seed_from_u64(1);

        let err = generate(&mut rng, 1, 1, &players).unwrap_err();
        assert_eq!(err.singles, 1);
        assert_eq!(err.doubles, 1);
        assert_eq!(err.players, players);
        assert_eq!(err.to_string(), "Can't make matches with 5 < 1 * 2 + 1 * 4");
    }

    #[test]
    fn test_huge_request_does_not_overflow() {
        let players = roster(&["a", "b"]);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(generate(&mut rng, usize::MAX, usize::MAX, &players).is_err());
    }

    #[test]
    fn test_no_courts_requested() {
        let mut rng = StdRng::seed_from_u64(1);

        let courts = generate(&mut rng, 0, 0, &[]).unwrap();
        assert!(courts.is_empty());
        assert_eq!(describe(&courts), "<none>");
    }

    #[test]
    fn test_same_seed_same_courts() {
        let players = roster(&["a", "b", "c", "d", "e", "f", "g", "h"]);

        let first = generate(&mut StdRng::seed_from_u64(42), 2, 1, &players).unwrap();
        let second = generate(&mut StdRng::seed_from_u64(42), 2, 1, &players).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_names_are_separate_entries() {
        let players = roster(&["sam", "sam", "sam", "sam"]);
        let mut rng = StdRng::seed_from_u64(3);

        let courts = generate(&mut rng, 2, 0, &players).unwrap();
        assert_eq!(courts.len(), 2);
        assert!(courts.iter().all(|c| c.players() == ["sam", "sam"]));
    }

    #[test]
    fn test_every_player_gets_drawn_eventually() {
        let players = roster(&["a", "b", "c", "d", "e"]);
        let mut seen = HashSet::new();

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let courts = generate(&mut rng, 1, 0, &players).unwrap();
            seen.extend(courts[0].players().iter().cloned());
        }

        assert_eq!(seen.len(), players.len());
    }

    #[test]
    fn test_display() {
        let singles = court(CourtKind::Singles, &["x", "y"]);
        let doubles = court(CourtKind::Doubles, &["a", "b", "c", "d"]);

        assert_eq!(singles.to_string(), "x VS y");
        assert_eq!(doubles.to_string(), "a and b VS c and d");
        assert_eq!(
            describe(&[singles, doubles]),
            "x VS y\na and b VS c and d"
        );
    }
}
