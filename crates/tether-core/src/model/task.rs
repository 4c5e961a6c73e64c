//! Task record: the attributes the engine reads and the two edge lists it
//! writes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A unit of work as seen by the dependency engine.
///
/// Only the attributes the engine reads (grouping, kind, labels, archive
/// flag) and the two edge lists it writes are modelled explicitly. Every
/// other field the task store keeps (title, dates, status, ...) round-trips
/// untouched through [`Task::extra`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<String>,
    pub etiquettes: Vec<String>,
    pub archived: bool,
    /// Ids of the tasks that block this one.
    pub depends_on: Vec<String>,
    /// Ids of the tasks this one blocks.
    pub blocks: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: String::new(),
            domain: None,
            kind: None,
            epic_id: None,
            etiquettes: Vec::new(),
            archived: false,
            depends_on: Vec::new(),
            blocks: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl Task {
    /// Create a bare task with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_epic(mut self, epic_id: impl Into<String>) -> Self {
        self.epic_id = Some(epic_id.into());
        self
    }

    #[must_use]
    pub fn with_etiquettes<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.etiquettes = labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn archived(mut self) -> Self {
        self.archived = true;
        self
    }

    /// Domain, treating an empty string as undeclared.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        non_empty(self.domain.as_deref())
    }

    /// Kind as declared. Unlike domain and epic, an empty kind is still a
    /// defined kind and matches another empty kind.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Epic id, treating an empty string as undeclared.
    #[must_use]
    pub fn epic_id(&self) -> Option<&str> {
        non_empty(self.epic_id.as_deref())
    }

    /// A task is blocked while it depends on at least one other task.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        !self.depends_on.is_empty()
    }

    #[must_use]
    pub fn blocks_id(&self, id: &str) -> bool {
        self.blocks.iter().any(|b| b == id)
    }

    #[must_use]
    pub fn depends_on_id(&self, id: &str) -> bool {
        self.depends_on.iter().any(|d| d == id)
    }

    /// Deduplicate both edge lists, dropping self references and empty ids.
    /// First occurrence wins, so ordering is stable. Nothing outside the
    /// edge lists is touched.
    pub fn normalize_edges(&mut self) {
        dedup_ids(&mut self.blocks, &self.id);
        dedup_ids(&mut self.depends_on, &self.id);
    }

    /// Copy of this task with normalized edge lists.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut copy = self.clone();
        copy.normalize_edges();
        copy
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn dedup_ids(ids: &mut Vec<String>, own_id: &str) {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.retain(|id| !id.is_empty() && id != own_id && seen.insert(id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_duplicates_self_and_empty() {
        let mut task = Task::new("a");
        task.blocks = vec!["b".into(), "a".into(), "b".into(), String::new(), "c".into()];
        task.depends_on = vec!["x".into(), "x".into(), "a".into()];
        task.etiquettes = vec!["ui".into(), "ui".into(), "perf".into()];

        task.normalize_edges();

        assert_eq!(task.blocks, vec!["b", "c"]);
        assert_eq!(task.depends_on, vec!["x"]);
        assert_eq!(task.etiquettes, vec!["ui", "ui", "perf"]);
    }

    #[test]
    fn normalized_leaves_original_untouched() {
        let mut task = Task::new("a");
        task.blocks = vec!["b".into(), "b".into()];
        let copy = task.normalized();
        assert_eq!(task.blocks.len(), 2);
        assert_eq!(copy.blocks, vec!["b"]);
    }

    #[test]
    fn empty_domain_and_epic_count_as_undeclared() {
        let task = Task::new("a").with_domain("").with_kind("").with_epic("");
        assert!(task.domain().is_none());
        assert!(task.epic_id().is_none());
    }

    #[test]
    fn empty_kind_is_still_defined() {
        assert_eq!(Task::new("a").with_kind("").kind(), Some(""));
        assert!(Task::new("a").kind().is_none());
    }

    #[test]
    fn deserializes_camel_case_and_keeps_unknown_fields() {
        let json = r#"{
            "id": "t1",
            "title": "Ship it",
            "epicId": "E1",
            "dependsOn": ["t0"],
            "etiquettes": ["ui"]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.epic_id(), Some("E1"));
        assert_eq!(task.depends_on, vec!["t0"]);
        assert!(task.blocks.is_empty());
        assert!(!task.archived);
        assert_eq!(task.extra["title"], "Ship it");

        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back["title"], "Ship it");
        assert_eq!(back["dependsOn"][0], "t0");
        assert!(back.get("domain").is_none());
    }

    #[test]
    fn blocked_iff_depends_on_non_empty() {
        let mut task = Task::new("a");
        assert!(!task.is_blocked());
        task.depends_on.push("b".into());
        assert!(task.is_blocked());
    }
}
