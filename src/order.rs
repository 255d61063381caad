use std::cmp::Ordering;

use crate::formats::ChapterRecord;

/// Download position of a chapter.
///
/// Variants order by tag first: every numeric chapter precedes every literal one,
/// and literal chapters precede those with no chapter number at all.
#[derive(Debug, Clone)]
pub enum ChapterKey {
    Numeric(f64),
    Literal(String),
    Fallback(String),
}

impl ChapterKey {
    fn rank(&self) -> u8 {
        match self {
            ChapterKey::Numeric(_) => 0,
            ChapterKey::Literal(_) => 1,
            ChapterKey::Fallback(_) => 2,
        }
    }
}

impl PartialEq for ChapterKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ChapterKey {}

impl Ord for ChapterKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ChapterKey::Numeric(a), ChapterKey::Numeric(b)) => a.total_cmp(b),
            (ChapterKey::Literal(a), ChapterKey::Literal(b))
            | (ChapterKey::Fallback(a), ChapterKey::Fallback(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ChapterKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn sort_key(record: &ChapterRecord) -> ChapterKey {
    match record.chapter_number.as_deref() {
        Some(number) => match number.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => ChapterKey::Numeric(value),
            _ => ChapterKey::Literal(number.to_owned()),
        },
        None => ChapterKey::Fallback(record.id.clone()),
    }
}

/// Stable: chapters with equal keys keep their listing order.
pub fn sort_chapters(chapters: &mut [ChapterRecord]) {
    chapters.sort_by_cached_key(sort_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, chapter: Option<&str>) -> ChapterRecord {
        ChapterRecord {
            id: id.to_owned(),
            chapter_number: chapter.map(str::to_owned),
            title: None,
            language: "en".to_owned(),
            content_hash: String::new(),
            raw_attributes: Default::default(),
        }
    }

    fn labels(chapters: &[ChapterRecord]) -> Vec<String> {
        chapters
            .iter()
            .map(|c| c.chapter_number.clone().unwrap_or_else(|| c.id.clone()))
            .collect()
    }

    #[test]
    fn numeric_first_then_literal_then_id() {
        let mut chapters = vec![
            record("c10", Some("10")),
            record("c2", Some("2")),
            record("z", None),
            record("a", Some("abc")),
        ];
        sort_chapters(&mut chapters);
        assert_eq!(labels(&chapters), vec!["2", "10", "abc", "z"]);
    }

    #[test]
    fn decimals_sort_numerically() {
        let mut chapters = vec![
            record("x", Some("Extra")),
            record("b", Some("1.5")),
            record("a", Some("1")),
            record("c", Some("11")),
        ];
        sort_chapters(&mut chapters);
        assert_eq!(labels(&chapters), vec!["1", "1.5", "11", "Extra"]);
    }

    #[test]
    fn non_finite_numbers_are_literal() {
        assert_eq!(
            sort_key(&record("a", Some("inf"))),
            ChapterKey::Literal("inf".to_owned())
        );
        assert_eq!(
            sort_key(&record("a", Some("NaN"))),
            ChapterKey::Literal("NaN".to_owned())
        );
    }

    #[test]
    fn equal_keys_keep_listing_order() {
        let mut chapters = vec![record("en-1", Some("1")), record("pt-1", Some("1.0"))];
        sort_chapters(&mut chapters);
        assert_eq!(chapters[0].id, "en-1");
        assert_eq!(chapters[1].id, "pt-1");
    }

    #[test]
    fn key_is_stable_for_equal_inputs() {
        let a = record("a", Some("3"));
        assert_eq!(sort_key(&a), sort_key(&a.clone()));
    }
}
