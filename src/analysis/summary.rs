// Aggregate documentation coverage of a scan

use crate::model::DocumentationItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coverage figures for one group of items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupCoverage {
    pub name: String,
    pub total: usize,
    pub documented: usize,
    pub average_coverage: f64,
}

impl GroupCoverage {
    /// Share of items carrying a docstring, in percent
    pub fn documented_percent(&self) -> f64 {
        percent(self.documented, self.total)
    }
}

/// Coverage summary of a whole scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub total_items: usize,
    pub documented_items: usize,
    pub documented_percent: f64,
    pub average_coverage: f64,
    pub average_quality: f64,
    /// Per report kind label, sorted by label
    pub by_kind: Vec<GroupCoverage>,
    /// Per module, sorted by module name
    pub by_module: Vec<GroupCoverage>,
    /// Items with at least one completeness issue
    pub items_with_issues: usize,
}

impl CoverageSummary {
    /// Metadata items are left out of every figure
    pub fn from_items(items: &[DocumentationItem]) -> Self {
        let items: Vec<&DocumentationItem> = items.iter().filter(|i| i.kind.is_documentable()).collect();
        let total_items = items.len();
        let documented_items = items.iter().filter(|i| i.has_docstring()).count();

        Self {
            total_items,
            documented_items,
            documented_percent: percent(documented_items, total_items),
            average_coverage: average(items.iter().map(|i| i.coverage_score)),
            average_quality: average(items.iter().map(|i| i.quality_score)),
            by_kind: group(&items, |i| i.method_label()),
            by_module: group(&items, |i| i.module.clone()),
            items_with_issues: items.iter().filter(|i| !i.completeness_issues.is_empty()).count(),
        }
    }
}

fn group<F>(items: &[&DocumentationItem], key: F) -> Vec<GroupCoverage>
where
    F: Fn(&DocumentationItem) -> String,
{
    let mut groups: BTreeMap<String, Vec<&DocumentationItem>> = BTreeMap::new();
    for &item in items {
        groups.entry(key(item)).or_default().push(item);
    }

    groups
        .into_iter()
        .map(|(name, members)| GroupCoverage {
            total: members.len(),
            documented: members.iter().filter(|i| i.has_docstring()).count(),
            average_coverage: average(members.iter().map(|i| i.coverage_score)),
            name,
        })
        .collect()
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 * 100.0 / total as f64)
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        round1(sum / count as f64)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;
    use std::path::PathBuf;

    fn item(module: &str, qualname: &str, kind: ItemKind, doc: Option<&str>, coverage: f64) -> DocumentationItem {
        let mut item = DocumentationItem::new(module, qualname, kind, PathBuf::from("x.py"), 1);
        item.docstring = doc.map(str::to_string);
        item.coverage_score = coverage;
        if doc.is_none() {
            item.completeness_issues.push("Missing docstring".to_string());
        }
        item
    }

    #[test]
    fn test_empty_summary() {
        let summary = CoverageSummary::from_items(&[]);
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.documented_percent, 0.0);
        assert!(summary.by_kind.is_empty());
    }

    #[test]
    fn test_summary_groups() {
        let items = vec![
            item("app.main", "root", ItemKind::Function, Some("Root."), 90.0),
            item("app.main", "get_user", ItemKind::Function, None, 30.0),
            item("app.models", "User", ItemKind::Model, Some("A user."), 70.0),
        ];
        let summary = CoverageSummary::from_items(&items);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.documented_items, 2);
        assert_eq!(summary.documented_percent, 66.7);
        assert_eq!(summary.average_coverage, 63.3);
        assert_eq!(summary.items_with_issues, 1);

        let kinds: Vec<&str> = summary.by_kind.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(kinds, vec!["function", "model"]);
        assert_eq!(summary.by_kind[0].total, 2);
        assert_eq!(summary.by_kind[0].documented_percent(), 50.0);

        let modules: Vec<&str> = summary.by_module.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(modules, vec!["app.main", "app.models"]);
        assert_eq!(summary.by_module[0].average_coverage, 60.0);
    }

    #[test]
    fn test_metadata_not_counted() {
        let mut title = item("app.main", "app.title", ItemKind::Metadata, Some("Users API"), 100.0);
        title.completeness_issues.clear();
        let items = vec![title, item("app.main", "get_user", ItemKind::Function, None, 30.0)];
        let summary = CoverageSummary::from_items(&items);
        assert_eq!(summary.total_items, 1);
        assert_eq!(summary.documented_items, 0);
        assert_eq!(summary.average_coverage, 30.0);
        let kinds: Vec<&str> = summary.by_kind.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(kinds, vec!["function"]);
    }
}
