//! Bone mapping produced by the matcher.

/// Confidence grade of a match, for review triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchGrade {
    /// Confidence at least 0.85; safe to apply without review.
    High,
    /// Confidence at least 0.5; review recommended.
    Medium,
    /// Confidence at least 0.3; likely wrong.
    Low,
    /// No acceptable match was found.
    None,
}

impl MatchGrade {
    /// Grade corresponding to a confidence score.
    #[must_use]
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.85 {
            Self::High
        } else if confidence >= 0.5 {
            Self::Medium
        } else if confidence >= 0.3 {
            Self::Low
        } else {
            Self::None
        }
    }
}

/// How a mapping entry was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatchReason {
    /// Supplied by the caller and honored verbatim.
    ManualOverride,
    /// Case-insensitive name equality.
    Exact,
    /// Equality after stripping rig prefixes and suffixes.
    Normalized,
    /// Both names belong to the same canonical-alias group.
    Alias,
    /// Best scoring fuzzy candidate.
    Fuzzy,
    /// No candidate reached the confidence cutoff.
    Unmatched,
}

/// One source bone's resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapEntry {
    /// Index of the source bone.
    pub source: u16,
    /// Index of the matched target bone, or `None` when unresolved.
    pub target: Option<u16>,
    /// Match confidence in `[0, 1]`.
    pub confidence: f64,
    /// Confidence grade derived from the score.
    pub grade: MatchGrade,
    /// How the entry was decided.
    pub reason: MatchReason,
}

/// Per-grade entry counts, for the caller's confidence table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeCounts {
    /// Entries graded [`MatchGrade::High`].
    pub high: usize,
    /// Entries graded [`MatchGrade::Medium`].
    pub medium: usize,
    /// Entries graded [`MatchGrade::Low`].
    pub low: usize,
    /// Unresolved entries.
    pub none: usize,
}

/// The complete source-to-target bone mapping.
///
/// Holds one entry per source bone, in source declaration order, so
/// `entries[i].source == i`. Every source bone appears, resolved or not;
/// unresolved bones are explicit, never silently dropped. No two entries
/// share a target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneMapping {
    /// Entries in source declaration order.
    pub entries: Vec<MapEntry>,
}

impl BoneMapping {
    /// Number of source bones covered.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping covers no bones.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Target bone for a source bone, if resolved.
    #[must_use]
    pub fn target_of(&self, source: u16) -> Option<u16> {
        self.entries.get(source as usize)?.target
    }

    /// Indices of source bones with no target.
    pub fn unresolved(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries
            .iter()
            .filter(|e| e.target.is_none())
            .map(|e| e.source)
    }

    /// Count entries per grade.
    #[must_use]
    pub fn grade_counts(&self) -> GradeCounts {
        let mut counts = GradeCounts::default();
        for entry in &self.entries {
            match entry.grade {
                MatchGrade::High => counts.high += 1,
                MatchGrade::Medium => counts.medium += 1,
                MatchGrade::Low => counts.low += 1,
                MatchGrade::None => counts.none += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn grade_thresholds() {
        assert_eq!(MatchGrade::from_confidence(1.0), MatchGrade::High);
        assert_eq!(MatchGrade::from_confidence(0.85), MatchGrade::High);
        assert_eq!(MatchGrade::from_confidence(0.84), MatchGrade::Medium);
        assert_eq!(MatchGrade::from_confidence(0.5), MatchGrade::Medium);
        assert_eq!(MatchGrade::from_confidence(0.49), MatchGrade::Low);
        assert_eq!(MatchGrade::from_confidence(0.3), MatchGrade::Low);
        assert_eq!(MatchGrade::from_confidence(0.29), MatchGrade::None);
    }

    #[test]
    fn lookup_and_unresolved() {
        let mapping = BoneMapping {
            entries: vec![
                MapEntry {
                    source: 0,
                    target: Some(2),
                    confidence: 1.0,
                    grade: MatchGrade::High,
                    reason: MatchReason::Exact,
                },
                MapEntry {
                    source: 1,
                    target: None,
                    confidence: 0.0,
                    grade: MatchGrade::None,
                    reason: MatchReason::Unmatched,
                },
            ],
        };
        assert_eq!(mapping.target_of(0), Some(2));
        assert_eq!(mapping.target_of(1), None);
        assert_eq!(mapping.target_of(9), None);
        assert_eq!(mapping.unresolved().collect::<Vec<_>>(), vec![1]);

        let counts = mapping.grade_counts();
        assert_eq!(counts.high, 1);
        assert_eq!(counts.none, 1);
    }
}
