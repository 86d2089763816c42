//! Online leaderboard
//!
//! Reads and writes go through a `Transport`; when the service is unreachable
//! the board falls back to a fixed sample list flagged as offline.

pub mod client;
pub mod transport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use client::{RankingClient, placement};
pub use transport::{HttpRequest, HttpResponse, Method, OfflineTransport, Transport};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Banner shown above the sample board
pub const OFFLINE_BANNER: &str = "Offline ranking (sample data)";
/// Hint shown below the sample board
pub const OFFLINE_HINT: &str = "Connect to the internet to see the real ranking";

/// Sample board used when the service cannot be reached
pub const SAMPLE_ENTRIES: [(&str, u32); 5] = [
    ("Sandro", 34),
    ("João", 28),
    ("Maria", 23),
    ("Luiz", 20),
    ("Ana", 18),
];

/// A validated leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub score: u32,
}

impl RankingEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// A leaderboard record as sent by the service, not yet validated.
///
/// The service uses `nome`/`rebate`; `name`/`score` are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default, rename = "nome", alias = "name")]
    pub name: Option<Value>,
    #[serde(default, rename = "rebate", alias = "score")]
    pub score: Option<Value>,
}

impl RawEntry {
    pub fn new(name: &str, score: u32) -> Self {
        Self {
            name: Some(Value::from(name)),
            score: Some(Value::from(score)),
        }
    }

    /// Validated entry; `None` for a missing name or a non-numeric score
    pub fn parse(&self) -> Option<RankingEntry> {
        let name = parse_name(self.name.as_ref()?)?;
        let score = parse_score(self.score.as_ref()?)?;
        Some(RankingEntry::new(name, score))
    }
}

/// Any present name is shown as text; null, `""`, `false` and `0` count as missing
fn parse_name(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Scores arrive as numbers or numeric strings; negatives count as 0
fn parse_score(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    raw.is_finite().then(|| raw.clamp(0.0, u32::MAX as f64) as u32)
}

/// Rank marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    Gold,
    Silver,
    Bronze,
    Plain,
}

impl Marker {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => Marker::Gold,
            2 => Marker::Silver,
            3 => Marker::Bronze,
            _ => Marker::Plain,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Marker::Gold => "🥇",
            Marker::Silver => "🥈",
            Marker::Bronze => "🥉",
            Marker::Plain => "🔹",
        }
    }
}

/// One display-ready row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRow {
    /// 1-based
    pub rank: usize,
    pub marker: Marker,
    pub name: String,
    pub score: u32,
}

impl RankedRow {
    pub fn line(&self) -> String {
        format!(
            "{} {}º {}: {} rallies",
            self.marker.glyph(),
            self.rank,
            self.name,
            self.score
        )
    }
}

/// Result of a leaderboard fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    pub rows: Vec<RankedRow>,
    /// Rows come from the sample list, not the service
    pub offline: bool,
    /// Top entry of a live board, offered as the current record
    pub leader: Option<RankingEntry>,
}

impl Leaderboard {
    pub fn live(rows: Vec<RankedRow>) -> Self {
        let leader = rows
            .first()
            .map(|row| RankingEntry::new(row.name.clone(), row.score));
        Self {
            rows,
            offline: false,
            leader,
        }
    }

    /// The sample board
    pub fn offline(n: usize) -> Self {
        Self {
            rows: render_list(&sample_entries(), n),
            offline: true,
            leader: None,
        }
    }

    /// Display lines, including the offline banner and hint
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        if self.offline {
            lines.push(OFFLINE_BANNER.to_string());
        }
        lines.extend(self.rows.iter().map(RankedRow::line));
        if self.offline {
            lines.push(OFFLINE_HINT.to_string());
        }
        lines
    }
}

/// Sample entries as raw records
pub fn sample_entries() -> Vec<RawEntry> {
    SAMPLE_ENTRIES
        .iter()
        .map(|&(name, score)| RawEntry::new(name, score))
        .collect()
}

/// Valid entries sorted by descending score (stable for ties)
pub fn sorted_entries(entries: &[RawEntry]) -> Vec<RankingEntry> {
    let mut valid: Vec<RankingEntry> = entries.iter().filter_map(RawEntry::parse).collect();
    valid.sort_by(|a, b| b.score.cmp(&a.score));
    valid
}

/// Drop invalid entries, sort descending and keep the top `n` with markers
pub fn render_list(entries: &[RawEntry], n: usize) -> Vec<RankedRow> {
    sorted_entries(entries)
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, entry)| RankedRow {
            rank: i + 1,
            marker: Marker::for_rank(i + 1),
            name: entry.name,
            score: entry.score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Vec<RawEntry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_render_sorts_and_marks() {
        let entries = raw(json!([
            { "nome": "Ana", "rebate": 18 },
            { "nome": "Sandro", "rebate": 34 },
            { "nome": "Luiz", "rebate": 20 },
            { "nome": "Maria", "rebate": 23 },
        ]));
        let rows = render_list(&entries, 10);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Sandro", "Maria", "Luiz", "Ana"]);
        let markers: Vec<_> = rows.iter().map(|r| r.marker).collect();
        assert_eq!(
            markers,
            [Marker::Gold, Marker::Silver, Marker::Bronze, Marker::Plain]
        );
        assert_eq!(rows[0].line(), "🥇 1º Sandro: 34 rallies");
    }

    #[test]
    fn test_render_skips_invalid_entries() {
        let entries = raw(json!([
            { "nome": "Ana", "rebate": "lots" },
            { "rebate": 50 },
            { "nome": "", "rebate": 40 },
            { "nome": null, "rebate": 40 },
            { "nome": "Bia", "rebate": null },
            { "nome": "Caio", "rebate": "12" },
            { "name": "Duda", "score": 9 },
        ]));
        let rows = render_list(&entries, 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Caio");
        assert_eq!(rows[0].score, 12);
        assert_eq!(rows[1].name, "Duda");
    }

    #[test]
    fn test_render_keeps_odd_but_present_entries() {
        let entries = raw(json!([
            { "nome": "Neg", "rebate": -3 },
            { "nome": 7, "rebate": 4 },
            { "nome": " ", "rebate": 2 },
        ]));
        let rows = render_list(&entries, 10);
        let kept: Vec<_> = rows.iter().map(|r| (r.name.as_str(), r.score)).collect();
        assert_eq!(kept, [("7", 4), (" ", 2), ("Neg", 0)]);
    }

    #[test]
    fn test_render_takes_top_n() {
        let entries: Vec<_> = (0..15).map(|i| RawEntry::new("P", i)).collect();
        let rows = render_list(&entries, 10);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].score, 14);
        assert_eq!(rows[9].rank, 10);
    }

    #[test]
    fn test_offline_board() {
        let board = Leaderboard::offline(10);
        assert!(board.offline);
        assert_eq!(board.leader, None);
        assert_eq!(board.rows, render_list(&sample_entries(), 10));
        let lines = board.lines();
        assert_eq!(lines.first().map(String::as_str), Some(OFFLINE_BANNER));
        assert_eq!(lines.last().map(String::as_str), Some(OFFLINE_HINT));
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_live_board_leader() {
        let board = Leaderboard::live(render_list(&[RawEntry::new("Ana", 3)], 10));
        assert!(!board.offline);
        assert_eq!(board.leader, Some(RankingEntry::new("Ana", 3)));
        assert_eq!(board.lines().len(), 1);
    }
}
