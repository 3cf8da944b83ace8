// Coverage and quality scoring of documentation items

use crate::error::{Error, Result};
use crate::model::{DocumentationItem, ItemKind};
use serde::{Deserialize, Serialize};

/// Points awarded once a docstring is longer than `min_chars`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthTier {
    pub min_chars: usize,
    pub points: f64,
}

impl LengthTier {
    pub const fn new(min_chars: usize, points: f64) -> Self {
        Self { min_chars, points }
    }
}

/// Scoring rubric. Every weight is configurable through `[scoring]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    // Callable coverage
    pub docstring_points: f64,
    pub params_points: f64,
    pub return_points: f64,
    pub type_hint_points: f64,

    // Callable quality
    pub quality_tiers: Vec<LengthTier>,
    pub all_params_bonus: f64,
    pub some_params_bonus: f64,
    pub return_doc_bonus: f64,

    // Classes and models
    pub class_docstring_points: f64,
    pub class_detail_points: f64,
    pub class_detail_min_chars: usize,
    pub class_quality_tiers: Vec<LengthTier>,
    pub class_description_bonus: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            docstring_points: 30.0,
            params_points: 40.0,
            return_points: 20.0,
            type_hint_points: 10.0,
            quality_tiers: vec![
                LengthTier::new(100, 50.0),
                LengthTier::new(50, 30.0),
                LengthTier::new(20, 15.0),
            ],
            all_params_bonus: 30.0,
            some_params_bonus: 15.0,
            return_doc_bonus: 20.0,
            class_docstring_points: 70.0,
            class_detail_points: 30.0,
            class_detail_min_chars: 20,
            class_quality_tiers: vec![
                LengthTier::new(100, 70.0),
                LengthTier::new(50, 50.0),
                LengthTier::new(20, 30.0),
                LengthTier::new(0, 15.0),
            ],
            class_description_bonus: 30.0,
        }
    }
}

/// Scores and issues computed for one item
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub coverage: f64,
    pub quality: f64,
    pub issues: Vec<String>,
}

impl ScoringPolicy {
    /// Reject negative or non-finite weights
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("docstring_points", self.docstring_points),
            ("params_points", self.params_points),
            ("return_points", self.return_points),
            ("type_hint_points", self.type_hint_points),
            ("all_params_bonus", self.all_params_bonus),
            ("some_params_bonus", self.some_params_bonus),
            ("return_doc_bonus", self.return_doc_bonus),
            ("class_docstring_points", self.class_docstring_points),
            ("class_detail_points", self.class_detail_points),
            ("class_description_bonus", self.class_description_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::config_validation(format!(
                    "scoring.{} must be a non-negative number",
                    name
                )));
            }
        }
        let tiers = self.quality_tiers.iter().chain(self.class_quality_tiers.iter());
        for tier in tiers {
            if !tier.points.is_finite() || tier.points < 0.0 {
                return Err(Error::config_validation(
                    "scoring tier points must be non-negative numbers",
                ));
            }
        }
        Ok(())
    }

    /// Assess an item according to its kind
    pub fn assess(&self, item: &DocumentationItem) -> Assessment {
        match item.kind {
            ItemKind::Module | ItemKind::Metadata => Assessment {
                coverage: 100.0,
                quality: 100.0,
                issues: Vec::new(),
            },
            ItemKind::Class | ItemKind::Model => self.assess_class(item),
            ItemKind::Function | ItemKind::Property | ItemKind::Endpoint => self.assess_callable(item),
        }
    }

    /// Fill in the score fields of an item
    pub fn apply(&self, item: &mut DocumentationItem) {
        let assessment = self.assess(item);
        item.coverage_score = assessment.coverage;
        item.quality_score = assessment.quality;
        item.completeness_issues = assessment.issues;
    }

    fn assess_callable(&self, item: &DocumentationItem) -> Assessment {
        let doc_len = item.docstring.as_deref().map_or(0, |d| d.trim().chars().count());
        let has_doc = item.has_docstring();
        let total = item.actual_params.len();
        let documented = total - item.missing_params.len();

        let param_fraction = if total == 0 {
            1.0
        } else {
            documented as f64 / total as f64
        };
        let return_trivial = item
            .return_type
            .as_deref()
            .map_or(true, |t| t.trim() == "None");

        let mut coverage = 0.0;
        if has_doc {
            coverage += self.docstring_points;
        }
        coverage += self.params_points * param_fraction;
        if item.has_return_doc || return_trivial {
            coverage += self.return_points;
        }
        if item.has_type_hints {
            coverage += self.type_hint_points;
        }

        let mut quality = tier_points(&self.quality_tiers, doc_len);
        if total == 0 || documented == total {
            quality += self.all_params_bonus;
        } else if documented > 0 {
            quality += self.some_params_bonus;
        }
        if item.has_return_doc {
            quality += self.return_doc_bonus;
        }

        let mut issues = Vec::new();
        if !has_doc {
            issues.push("Missing docstring".to_string());
        }
        if !item.missing_params.is_empty() {
            issues.push(format!(
                "Missing parameter documentation: {}",
                item.missing_params.join(", ")
            ));
        }
        if !item.extra_params.is_empty() {
            issues.push(format!(
                "Documents unknown parameters: {}",
                item.extra_params.join(", ")
            ));
        }
        if !item.has_type_hints {
            issues.push("Missing type hints".to_string());
        }
        if !return_trivial && !item.has_return_doc {
            issues.push("Missing return documentation".to_string());
        }
        let undocumented: Vec<&str> = item
            .raised_exceptions
            .iter()
            .filter(|e| !item.documented_raises.iter().any(|d| same_exception(d, e)))
            .map(String::as_str)
            .collect();
        if has_doc && !undocumented.is_empty() {
            issues.push(format!("Undocumented exceptions: {}", undocumented.join(", ")));
        }

        Assessment {
            coverage: finish(coverage),
            quality: finish(quality),
            issues,
        }
    }

    fn assess_class(&self, item: &DocumentationItem) -> Assessment {
        let doc = item.docstring.as_deref().map(str::trim).unwrap_or("");
        let doc_len = doc.chars().count();

        let mut coverage = 0.0;
        if !doc.is_empty() {
            coverage += self.class_docstring_points;
        }
        if doc_len > self.class_detail_min_chars {
            coverage += self.class_detail_points;
        }

        let mut quality = tier_points(&self.class_quality_tiers, doc_len);
        if doc.lines().count() > 1 {
            quality += self.class_description_bonus;
        }

        let issues = if doc.is_empty() {
            vec!["Missing docstring".to_string()]
        } else {
            Vec::new()
        };

        Assessment {
            coverage: finish(coverage),
            quality: finish(quality),
            issues,
        }
    }
}

/// Points of the first tier the length exceeds; tiers are checked longest first
fn tier_points(tiers: &[LengthTier], len: usize) -> f64 {
    let mut sorted: Vec<&LengthTier> = tiers.iter().collect();
    sorted.sort_by(|a, b| b.min_chars.cmp(&a.min_chars));
    sorted
        .into_iter()
        .find(|t| len > t.min_chars)
        .map_or(0.0, |t| t.points)
}

/// Exceptions match on their last dotted segment
fn same_exception(documented: &str, raised: &str) -> bool {
    let last = |s: &str| s.rsplit('.').next().unwrap_or(s).to_string();
    last(documented) == last(raised)
}

/// Clamp to [0, 100] and round to one decimal
pub fn finish(score: f64) -> f64 {
    let clamped = if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 };
    (clamped * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn callable(params: &[&str], missing: &[&str]) -> DocumentationItem {
        let mut item = DocumentationItem::new("app", "f", ItemKind::Function, PathBuf::from("app.py"), 1);
        item.actual_params = params.iter().map(|p| p.to_string()).collect();
        item.missing_params = missing.iter().map(|p| p.to_string()).collect();
        item.documented_params = params
            .iter()
            .filter(|p| !missing.contains(p))
            .map(|p| p.to_string())
            .collect();
        item
    }

    #[test]
    fn test_fully_documented_callable_scores_100() {
        let mut item = callable(&["user_id"], &[]);
        item.docstring = Some("Get a user.\n\nArgs:\n    user_id: The ID.\n\nReturns:\n    The user.".into());
        item.return_type = Some("User".into());
        item.has_return_doc = true;
        item.has_type_hints = true;

        let result = ScoringPolicy::default().assess(&item);
        assert_eq!(result.coverage, 100.0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_undocumented_function_issues() {
        let mut item = callable(&["user_id"], &["user_id"]);
        item.param_types.insert("user_id".into(), "int".into());
        item.has_type_hints = true;

        let result = ScoringPolicy::default().assess(&item);
        // return trivial (20) + type hints (10)
        assert_eq!(result.coverage, 30.0);
        assert_eq!(result.quality, 0.0);
        assert_eq!(
            result.issues,
            vec!["Missing docstring", "Missing parameter documentation: user_id"]
        );
    }

    #[test]
    fn test_documented_root_beats_undocumented_get_user() {
        let policy = ScoringPolicy::default();

        let mut root = callable(&[], &[]);
        root.docstring = Some("Root endpoint.".into());
        let mut get_user = callable(&["user_id"], &["user_id"]);
        get_user.has_type_hints = true;

        let root_score = policy.assess(&root);
        let get_user_score = policy.assess(&get_user);
        assert!(root_score.coverage > get_user_score.coverage);
        assert!(get_user_score.issues.contains(&"Missing docstring".to_string()));
    }

    #[test]
    fn test_partial_params() {
        let mut item = callable(&["a", "b"], &["b"]);
        item.docstring = Some("Add a and b.\n\nArgs:\n    a: First.".into());
        let result = ScoringPolicy::default().assess(&item);
        // 30 doc + 20 params + 20 trivial return
        assert_eq!(result.coverage, 70.0);
        // 15 length + 15 partial
        assert_eq!(result.quality, 30.0);
        assert_eq!(result.issues[0], "Missing parameter documentation: b");
        assert_eq!(result.issues[1], "Missing type hints");
    }

    #[test]
    fn test_missing_return_documentation() {
        let mut item = callable(&[], &[]);
        item.docstring = Some("Compute.".into());
        item.return_type = Some("int".into());
        item.has_type_hints = true;
        let result = ScoringPolicy::default().assess(&item);
        assert_eq!(result.coverage, 80.0);
        assert_eq!(result.issues, vec!["Missing return documentation"]);
    }

    #[test]
    fn test_undocumented_exceptions() {
        let mut item = callable(&[], &[]);
        item.docstring = Some("Load.\n\nRaises:\n    KeyError: Missing.".into());
        item.has_type_hints = true;
        item.raised_exceptions = vec!["KeyError".into(), "errors.NotFound".into()];
        item.documented_raises = vec!["KeyError".into()];
        let result = ScoringPolicy::default().assess(&item);
        assert_eq!(result.issues, vec!["Undocumented exceptions: errors.NotFound"]);
    }

    #[test]
    fn test_class_scores() {
        let policy = ScoringPolicy::default();
        let mut class = DocumentationItem::new("app", "User", ItemKind::Class, PathBuf::from("app.py"), 1);
        let missing = policy.assess(&class);
        assert_eq!(missing.coverage, 0.0);
        assert_eq!(missing.quality, 0.0);
        assert_eq!(missing.issues, vec!["Missing docstring"]);

        class.docstring = Some("User model.".into());
        let short = policy.assess(&class);
        assert_eq!(short.coverage, 70.0);
        assert_eq!(short.quality, 15.0);

        class.docstring = Some("User account model.\n\nHolds profile data for one person.".into());
        let long = policy.assess(&class);
        assert_eq!(long.coverage, 100.0);
        // 55 chars (50) + multi-line (30)
        assert_eq!(long.quality, 80.0);
    }

    #[test]
    fn test_module_scores() {
        let module = DocumentationItem::new("app", "app", ItemKind::Module, PathBuf::from("app.py"), 1);
        let result = ScoringPolicy::default().assess(&module);
        assert_eq!(result.coverage, 100.0);
        assert_eq!(result.quality, 100.0);
    }

    #[test]
    fn test_finish_clamps_and_rounds() {
        assert_eq!(finish(120.0), 100.0);
        assert_eq!(finish(-5.0), 0.0);
        assert_eq!(finish(33.333), 33.3);
        assert_eq!(finish(f64::NAN), 0.0);
    }

    #[test]
    fn test_validate_rejects_negative_weights() {
        let policy = ScoringPolicy {
            params_points: -1.0,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
        assert!(ScoringPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_custom_policy() {
        let policy = ScoringPolicy {
            docstring_points: 100.0,
            params_points: 0.0,
            return_points: 0.0,
            type_hint_points: 0.0,
            ..Default::default()
        };
        let mut item = callable(&["a"], &["a"]);
        item.docstring = Some("Do it.".into());
        assert_eq!(policy.assess(&item).coverage, 100.0);
    }
}
