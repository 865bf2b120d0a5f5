//! Cross-game leaderboards and presence.
//!
//! Per-game score tables kept sorted descending, plus a global
//! online/offline map keyed by display name. Entries are never deleted;
//! disconnected players stay ranked and only their presence flag flips.

use protocol::ScoreRow;
use std::collections::{BTreeMap, HashMap};

/// Ranked score tables for every game, plus the presence map.
#[derive(Debug, Default)]
pub struct Leaderboard {
    boards: HashMap<String, Vec<ScoreRow>>,
    online: BTreeMap<String, bool>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert `(game, name)` with `score`, overwriting unconditionally:
    /// later updates always win. Marks the name online.
    pub fn record_score(&mut self, game: &str, name: &str, score: f64) {
        let board = self.boards.entry(game.to_string()).or_default();
        match board.iter().position(|row| row.name == name) {
            Some(index) => board[index].score = score,
            None => board.push(ScoreRow {
                name: name.to_string(),
                score,
            }),
        }
        sort_board(board);
        self.online.insert(name.to_string(), true);
    }

    /// Add a zero-score entry if `name` is not on the board yet, so new
    /// players appear before their first score. Marks the name online.
    pub fn ensure_joined(&mut self, game: &str, name: &str) {
        let board = self.boards.entry(game.to_string()).or_default();
        if !board.iter().any(|row| row.name == name) {
            board.push(ScoreRow {
                name: name.to_string(),
                score: 0.0,
            });
            sort_board(board);
        }
        self.online.insert(name.to_string(), true);
    }

    /// Move `old_name`'s entry to `new_name`. If `new_name` already has
    /// an entry the two merge, keeping the higher score. The old name's
    /// presence flag is removed entirely; the new name is marked online.
    pub fn rename(&mut self, game: &str, old_name: &str, new_name: &str) {
        let board = self.boards.entry(game.to_string()).or_default();

        let carried = match board.iter().position(|row| row.name == old_name) {
            Some(index) => board.remove(index).score,
            None => 0.0,
        };
        self.online.remove(old_name);

        match board.iter().position(|row| row.name == new_name) {
            Some(index) => board[index].score = board[index].score.max(carried),
            None => board.push(ScoreRow {
                name: new_name.to_string(),
                score: carried,
            }),
        }
        sort_board(board);
        self.online.insert(new_name.to_string(), true);
    }

    /// Mark a display name online.
    pub fn set_online(&mut self, name: &str) {
        self.online.insert(name.to_string(), true);
    }

    /// Mark a display name offline. Scores are untouched.
    pub fn set_offline(&mut self, name: &str) {
        self.online.insert(name.to_string(), false);
    }

    /// Make sure a game has a (possibly empty) table.
    pub fn ensure_board(&mut self, game: &str) {
        self.boards.entry(game.to_string()).or_default();
    }

    /// The ranked rows for one game, highest score first.
    pub fn rows(&self, game: &str) -> Vec<ScoreRow> {
        self.boards.get(game).cloned().unwrap_or_default()
    }

    /// The full presence map.
    pub fn presence(&self) -> BTreeMap<String, bool> {
        self.online.clone()
    }
}

fn sort_board(board: &mut [ScoreRow]) {
    // Stable: ties keep their insertion order.
    board.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rows: &[ScoreRow]) -> Vec<&str> {
        rows.iter().map(|row| row.name.as_str()).collect()
    }

    #[test]
    fn record_score_overwrites_and_resorts() {
        let mut lb = Leaderboard::new();
        lb.record_score("tag", "Alice", 10.0);
        lb.record_score("tag", "Bob", 5.0);
        assert_eq!(names(&lb.rows("tag")), ["Alice", "Bob"]);

        // Later updates always win, even when lower.
        lb.record_score("tag", "Alice", 1.0);
        assert_eq!(names(&lb.rows("tag")), ["Bob", "Alice"]);
        assert_eq!(lb.rows("tag")[1].score, 1.0);
    }

    #[test]
    fn ensure_joined_is_idempotent_and_keeps_scores() {
        let mut lb = Leaderboard::new();
        lb.record_score("tag", "Alice", 7.0);
        lb.ensure_joined("tag", "Alice");
        assert_eq!(lb.rows("tag")[0].score, 7.0);

        lb.ensure_joined("tag", "Bob");
        lb.ensure_joined("tag", "Bob");
        assert_eq!(lb.rows("tag").len(), 2);
        assert_eq!(lb.rows("tag")[1].score, 0.0);
    }

    #[test]
    fn boards_are_independent_per_game() {
        let mut lb = Leaderboard::new();
        lb.record_score("tag", "Alice", 3.0);
        lb.record_score("maze", "Alice", 9.0);
        assert_eq!(lb.rows("tag")[0].score, 3.0);
        assert_eq!(lb.rows("maze")[0].score, 9.0);
        assert!(lb.rows("unknown").is_empty());
    }

    #[test]
    fn rename_carries_score_to_fresh_name() {
        let mut lb = Leaderboard::new();
        lb.record_score("tag", "Alice", 4.0);
        lb.rename("tag", "Alice", "Alicia");

        let rows = lb.rows("tag");
        assert_eq!(names(&rows), ["Alicia"]);
        assert_eq!(rows[0].score, 4.0);
        assert!(!lb.presence().contains_key("Alice"));
        assert_eq!(lb.presence()["Alicia"], true);
    }

    #[test]
    fn rename_merges_by_taking_the_maximum() {
        // The scenario from the cross-game tracker: Alice joins "tag"
        // at 0, Bob scores 5, then Alice renames to Bob.
        let mut lb = Leaderboard::new();
        lb.ensure_joined("tag", "Alice");
        assert_eq!(names(&lb.rows("tag")), ["Alice"]);
        assert_eq!(lb.presence()["Alice"], true);

        lb.record_score("tag", "Bob", 5.0);
        assert_eq!(names(&lb.rows("tag")), ["Bob", "Alice"]);

        lb.rename("tag", "Alice", "Bob");
        let rows = lb.rows("tag");
        assert_eq!(names(&rows), ["Bob"]);
        assert_eq!(rows[0].score, 5.0);
        assert!(!lb.presence().contains_key("Alice"));
        assert_eq!(lb.presence()["Bob"], true);
    }

    #[test]
    fn rename_never_loses_the_higher_score() {
        let mut lb = Leaderboard::new();
        lb.record_score("tag", "Alice", 12.0);
        lb.record_score("tag", "Bob", 5.0);
        lb.rename("tag", "Alice", "Bob");
        assert_eq!(lb.rows("tag")[0].score, 12.0);
    }

    #[test]
    fn rename_of_absent_name_creates_zero_entry() {
        let mut lb = Leaderboard::new();
        lb.rename("tag", "Ghost", "Casper");
        let rows = lb.rows("tag");
        assert_eq!(names(&rows), ["Casper"]);
        assert_eq!(rows[0].score, 0.0);
    }

    #[test]
    fn set_offline_keeps_the_ranking() {
        let mut lb = Leaderboard::new();
        lb.record_score("tag", "Alice", 8.0);
        lb.set_offline("Alice");
        assert_eq!(lb.presence()["Alice"], false);
        assert_eq!(lb.rows("tag")[0].score, 8.0);
    }
}
