//! Local leaderboard and player identity
//!
//! One entry per player id holding that player's best score. Only the top
//! ten are shown; a few more are kept so a player's personal best survives
//! dropping off the board.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Entries shown on the leaderboard
pub const MAX_HIGH_SCORES: usize = 10;
/// Entries kept in storage
pub const MAX_STORED_PLAYERS: usize = 50;
/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 20;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub player_id: String,
    pub player_name: String,
    /// Best score of this player
    pub score: u32,
    /// Unix timestamp (ms) of the last improvement
    pub timestamp: f64,
}

/// Result of submitting a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    /// The player's stored best changed
    pub updated: bool,
    /// 1-indexed rank on the visible board, if any
    pub rank: Option<usize>,
}

/// Where finished runs are reported
pub trait Leaderboard {
    /// Record `score` for `player`; keeps the player's best only
    fn submit(&mut self, player: &PlayerProfile, score: u32, timestamp: f64) -> Submission;
    /// Best entries, highest first, at most `n` (and never more than the board size)
    fn top(&self, n: usize) -> &[HighScoreEntry];
    /// Best score recorded for a player id, 0 if unknown
    fn best_for(&self, player_id: &str) -> u32;
}

/// Leaderboard kept in local storage
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    /// Sorted descending by score
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "ninjaSlingLeaderboard";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the visible board
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .get(MAX_HIGH_SCORES - 1)
            .map(|e| score > e.score)
            .unwrap_or(true)
    }

    /// 1-indexed position of a player on the visible board
    pub fn rank_of(&self, player_id: &str) -> Option<usize> {
        self.top(MAX_HIGH_SCORES)
            .iter()
            .position(|e| e.player_id == player_id)
            .map(|i| i + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    fn sort(&mut self) {
        // Stable: earlier entries win ties
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_STORED_PLAYERS);
    }

    /// Stored leaderboard, empty if missing or unreadable
    pub fn load(store: &impl KeyValueStore) -> Self {
        match load_json::<HighScores>(store, Self::STORAGE_KEY) {
            Ok(Some(mut scores)) => {
                scores.sort();
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding stored high scores: {}", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<()> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl Leaderboard for HighScores {
    fn submit(&mut self, player: &PlayerProfile, score: u32, timestamp: f64) -> Submission {
        if score == 0 {
            return Submission {
                updated: false,
                rank: self.rank_of(&player.id),
            };
        }

        let updated = match self.entries.iter_mut().find(|e| e.player_id == player.id) {
            Some(entry) if score > entry.score => {
                entry.score = score;
                entry.player_name = player.name.clone();
                entry.timestamp = timestamp;
                true
            }
            Some(_) => false,
            None => {
                self.entries.push(HighScoreEntry {
                    player_id: player.id.clone(),
                    player_name: player.name.clone(),
                    score,
                    timestamp,
                });
                true
            }
        };

        if updated {
            self.sort();
        }
        Submission {
            updated,
            rank: self.rank_of(&player.id),
        }
    }

    fn top(&self, n: usize) -> &[HighScoreEntry] {
        let n = n.min(MAX_HIGH_SCORES).min(self.entries.len());
        &self.entries[..n]
    }

    fn best_for(&self, player_id: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.player_id == player_id)
            .map(|e| e.score)
            .unwrap_or(0)
    }
}

/// Name and stable id of the person playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub id: String,
}

impl PlayerProfile {
    const STORAGE_KEY: &'static str = "ninjaSlingPlayerData";

    /// Trims the name; it must be non-empty and at most [`MAX_NAME_LEN`] characters
    pub fn new(name: &str, id: impl Into<String>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(Error::InvalidPlayerName);
        }
        Ok(Self {
            name: name.to_string(),
            id: id.into(),
        })
    }

    /// Same player under a new name
    pub fn rename(&self, name: &str) -> Result<Self> {
        Self::new(name, self.id.clone())
    }

    pub fn load(store: &impl KeyValueStore) -> Result<Option<Self>> {
        load_json(store, Self::STORAGE_KEY)
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<()> {
        save_json(store, Self::STORAGE_KEY, self)
    }

    /// Forget the stored identity; the next profile gets a fresh id
    pub fn forget(store: &mut impl KeyValueStore) -> Result<()> {
        store.remove(Self::STORAGE_KEY)
    }
}

/// New player id: base-36 timestamp followed by base-36 random digits
pub fn generate_player_id(now_ms: u64, rng: &mut impl Rng) -> String {
    let mut id = to_base36(now_ms);
    id.push_str(&to_base36(rng.random::<u64>()));
    id
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Format a timestamp as a date relative to `now` (both Unix ms)
pub fn format_relative(now: f64, timestamp: f64) -> String {
    let diff_mins = (now - timestamp) / 60_000.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        match days {
            1 => "Yesterday".to_string(),
            2..=6 => format!("{} days ago", days),
            _ => format!("{} weeks ago", days / 7),
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn player(name: &str) -> PlayerProfile {
        PlayerProfile::new(name, format!("id-{name}")).unwrap()
    }

    #[test]
    fn test_keeps_best_per_player() {
        let mut scores = HighScores::new();
        let ana = player("ana");

        let first = scores.submit(&ana, 12, 1.0);
        assert_eq!(first, Submission { updated: true, rank: Some(1) });

        let worse = scores.submit(&ana, 5, 2.0);
        assert!(!worse.updated);
        assert_eq!(scores.best_for(&ana.id), 12);
        assert_eq!(scores.entries.len(), 1);
        assert_eq!(scores.entries[0].timestamp, 1.0);

        let better = scores.submit(&ana.rename("Ana B").unwrap(), 30, 3.0);
        assert!(better.updated);
        assert_eq!(scores.best_for(&ana.id), 30);
        assert_eq!(scores.entries[0].player_name, "Ana B");
    }

    #[test]
    fn test_zero_score_not_recorded() {
        let mut scores = HighScores::new();
        let s = scores.submit(&player("zed"), 0, 1.0);
        assert!(!s.updated);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_top_ten_ordering() {
        let mut scores = HighScores::new();
        for i in 1..=15u32 {
            scores.submit(&player(&format!("p{i}")), i * 10, i as f64);
        }
        let top = scores.top(100);
        assert_eq!(top.len(), MAX_HIGH_SCORES);
        assert_eq!(top[0].score, 150);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(scores.top(3).len(), 3);

        // Off the board but still remembered
        assert_eq!(scores.rank_of("id-p1"), None);
        assert_eq!(scores.best_for("id-p1"), 10);
        assert!(!scores.qualifies(50));
        assert!(scores.qualifies(61));
        assert_eq!(scores.top_score(), Some(150));
    }

    #[test]
    fn test_leaderboard_persistence() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::load(&store);
        assert!(scores.is_empty());

        scores.submit(&player("a"), 4, 1.0);
        scores.submit(&player("b"), 9, 2.0);
        scores.save(&mut store).unwrap();

        let loaded = HighScores::load(&store);
        assert_eq!(loaded.entries, scores.entries);
        assert_eq!(loaded.top(1)[0].player_name, "b");
    }

    #[test]
    fn test_player_name_validation() {
        assert!(matches!(PlayerProfile::new("   ", "x"), Err(Error::InvalidPlayerName)));
        assert!(PlayerProfile::new(&"n".repeat(21), "x").is_err());
        let p = PlayerProfile::new("  Kai  ", "x").unwrap();
        assert_eq!(p.name, "Kai");
    }

    #[test]
    fn test_player_profile_storage() {
        let mut store = MemoryStore::new();
        assert_eq!(PlayerProfile::load(&store).unwrap(), None);
        let p = player("kai");
        p.save(&mut store).unwrap();
        assert_eq!(PlayerProfile::load(&store).unwrap(), Some(p));
        PlayerProfile::forget(&mut store).unwrap();
        assert_eq!(PlayerProfile::load(&store).unwrap(), None);
    }

    #[test]
    fn test_player_ids() {
        let mut rng = Pcg32::seed_from_u64(1);
        let a = generate_player_id(1_700_000_000_000, &mut rng);
        let b = generate_player_id(1_700_000_000_000, &mut rng);
        assert_ne!(a, b);
        assert!(a.starts_with(&to_base36(1_700_000_000_000)));
        assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_format_relative() {
        let now = 10.0 * 86_400_000.0;
        assert_eq!(format_relative(now, now - 10_000.0), "Just now");
        assert_eq!(format_relative(now, now - 5.0 * 60_000.0), "5 mins ago");
        assert_eq!(format_relative(now, now - 3_600_000.0), "1 hour ago");
        assert_eq!(format_relative(now, now - 86_400_000.0), "Yesterday");
        assert_eq!(format_relative(now, now - 3.0 * 86_400_000.0), "3 days ago");
    }
}
