//! Named subsets of the assembled collection.

use lessonmap_shared::{ContentType, Record};

use crate::classify::in_lesson_dir;

/// A semantic slice of the collection, exported under its own file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subset {
    /// Track-level containers.
    Programs,
    /// Skill-level containers.
    Skills,
    /// Module-level containers outside activities/topics directories.
    Modules,
    Activities,
    Topics,
}

impl Subset {
    /// Every subset, in export order.
    pub const ALL: [Subset; 5] = [
        Self::Programs,
        Self::Skills,
        Self::Modules,
        Self::Activities,
        Self::Topics,
    ];

    /// File stem used for this subset's exports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Programs => "programs",
            Self::Skills => "skills",
            Self::Modules => "modules",
            Self::Activities => "activities",
            Self::Topics => "topics",
        }
    }

    pub fn matches(self, record: &Record) -> bool {
        let container = record.content_type == ContentType::Container;
        match self {
            Self::Programs => {
                container
                    && record.track.is_some()
                    && record.skill.is_none()
                    && record.module.is_none()
            }
            Self::Skills => {
                container
                    && record.track.is_some()
                    && record.skill.is_some()
                    && record.module.is_none()
            }
            Self::Modules => {
                container
                    && record.track.is_some()
                    && record.skill.is_some()
                    && record.module.is_some()
                    && !in_lesson_dir(&record.path)
            }
            Self::Activities => record.content_type == ContentType::Activity,
            Self::Topics => record.content_type == ContentType::Topic,
        }
    }

    /// Matching records, in collection order.
    pub fn filter(self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

impl std::fmt::Display for Subset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
