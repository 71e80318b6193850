//! Placing leaderboards directly after the quiz they rank.
//!
//! Identifiers reach us in several spellings (`ObjectId("…")`, quoted,
//! mixed case). [`SlideId::new`] normalises them once, so matching is plain
//! equality.

use super::model::{ReportUnit, SlideType};
use std::collections::HashMap;
use std::fmt;

/// A normalised slide identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlideId(String);

impl SlideId {
    /// Normalise a raw identifier: trim, unwrap `ObjectId("...")`, strip
    /// surrounding quotes, lowercase.
    pub fn new(raw: &str) -> Self {
        let mut id = raw.trim();
        if let Some(inner) = id
            .strip_prefix("ObjectId(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            id = inner.trim();
        }
        let id = id.trim_matches(|c: char| c == '"' || c == '\'').trim();
        SlideId(id.to_lowercase())
    }

    /// The normalised text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether nothing is left after normalising.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlideId {
    fn from(raw: &str) -> Self {
        SlideId::new(raw)
    }
}

/// What a slide is, as far as ordering is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideKind {
    /// A quiz that leaderboards may link to
    Quiz,
    /// A leaderboard, optionally linked to a quiz
    Leaderboard {
        /// The quiz it ranks
        linked: Option<SlideId>,
    },
    /// Anything else
    Other,
}

/// One slide to order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    /// Primary identifier
    pub id: Option<SlideId>,
    /// Other spellings the slide is known by
    pub aliases: Vec<SlideId>,
    /// Kind of slide
    pub kind: SlideKind,
}

impl OrderEntry {
    /// Entry with a primary id and no aliases.
    pub fn new(id: Option<SlideId>, kind: SlideKind) -> Self {
        Self {
            id,
            aliases: Vec::new(),
            kind,
        }
    }

    /// Add an alternative identifier.
    pub fn with_alias(mut self, alias: impl Into<SlideId>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Entry for a report unit.
    pub fn from_unit(unit: &ReportUnit) -> Self {
        let id = unit
            .slide_id
            .as_deref()
            .map(SlideId::new)
            .filter(|id| !id.is_empty());
        let kind = match unit.data.slide_type {
            SlideType::Quiz => SlideKind::Quiz,
            SlideType::Leaderboard => SlideKind::Leaderboard {
                linked: unit
                    .linked_quiz_id
                    .as_deref()
                    .map(SlideId::new)
                    .filter(|id| !id.is_empty()),
            },
            _ => SlideKind::Other,
        };
        Self::new(id, kind)
    }
}

/// Order slides so that each leaderboard follows the quiz it links to.
///
/// Non-leaderboard entries keep their relative order. Every leaderboard
/// linked to a quiz is emitted right after it, in input order. Leaderboards
/// without a link, or whose link matches no quiz, go last in input order.
/// Returns indices into `entries`.
pub fn order_slides(entries: &[OrderEntry]) -> Vec<usize> {
    let mut quiz_by_id: HashMap<&SlideId, usize> = HashMap::new();
    for (index, entry) in entries.iter().enumerate() {
        if entry.kind == SlideKind::Quiz {
            for id in entry.id.iter().chain(&entry.aliases) {
                quiz_by_id.entry(id).or_insert(index);
            }
        }
    }

    let mut followers: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut unlinked = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let SlideKind::Leaderboard { linked } = &entry.kind else {
            continue;
        };
        match linked.as_ref().map(|id| (id, quiz_by_id.get(id))) {
            Some((_, Some(&quiz))) => followers.entry(quiz).or_default().push(index),
            Some((id, None)) => {
                log::warn!("leaderboard {} links to unknown quiz {}", index, id);
                unlinked.push(index);
            },
            None => unlinked.push(index),
        }
    }

    let mut order = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if matches!(entry.kind, SlideKind::Leaderboard { .. }) {
            continue;
        }
        order.push(index);
        if let Some(boards) = followers.get(&index) {
            order.extend(boards);
        }
    }
    order.extend(unlinked);
    order
}

/// Reorder report units with [`order_slides`].
pub fn order_units(units: &[ReportUnit]) -> Vec<ReportUnit> {
    let entries: Vec<OrderEntry> = units.iter().map(OrderEntry::from_unit).collect();
    order_slides(&entries)
        .into_iter()
        .map(|i| units[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(id: &str) -> OrderEntry {
        OrderEntry::new(Some(SlideId::new(id)), SlideKind::Quiz)
    }

    fn board(linked: Option<&str>) -> OrderEntry {
        OrderEntry::new(
            None,
            SlideKind::Leaderboard {
                linked: linked.map(SlideId::new),
            },
        )
    }

    fn other() -> OrderEntry {
        OrderEntry::new(None, SlideKind::Other)
    }

    #[test]
    fn test_slide_id_normalises() {
        assert_eq!(SlideId::new("  ObjectId(\"65AbC\") "), SlideId::new("65abc"));
        assert_eq!(SlideId::new("'65abc'").as_str(), "65abc");
        assert!(SlideId::new(" \"\" ").is_empty());
    }

    #[test]
    fn test_leaderboard_follows_quiz() {
        let entries = vec![board(Some("q1")), other(), quiz("Q1"), other()];
        assert_eq!(order_slides(&entries), vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_multiple_leaderboards_keep_input_order() {
        let entries = vec![quiz("a"), board(Some("a")), other(), board(Some("A"))];
        assert_eq!(order_slides(&entries), vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_unlinked_and_unresolved_go_last() {
        let entries = vec![board(None), quiz("a"), board(Some("missing")), other()];
        assert_eq!(order_slides(&entries), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_alias_resolution() {
        let entries = vec![
            board(Some("ObjectId('legacy-7')")),
            quiz("new-id").with_alias("legacy-7"),
        ];
        assert_eq!(order_slides(&entries), vec![1, 0]);
    }

    #[test]
    fn test_order_is_a_permutation() {
        let entries = vec![other(), board(Some("x")), quiz("x"), board(None), quiz("y")];
        let mut order = order_slides(&entries);
        order.sort_unstable();
        assert_eq!(order, (0..entries.len()).collect::<Vec<_>>());
    }
}
