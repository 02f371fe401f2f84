use crate::classifier::GroupClassifier;
use crate::error::GroupingError;
use core_types::Step;
use regex::Regex;
use std::collections::BTreeMap;

/// One entry of a group definition.
///
/// A register matches when the pattern, read as a regular expression, finds a
/// match anywhere in the register name, or when the register name contains
/// the pattern text. Text that does not compile as a regex matches by
/// substring only.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    regex: Option<Regex>,
}

impl Pattern {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let regex = match Regex::new(&text) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!(pattern = %text, error = %e, "Group pattern is not a valid regex; matching by substring only.");
                None
            }
        };
        Self { text, regex }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, register: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(register)) || register.contains(&self.text)
    }
}

/// A named group and the ordered patterns that claim registers for it.
#[derive(Debug, Clone)]
pub struct GroupRule {
    pub name: String,
    pub patterns: Vec<Pattern>,
    pub steps: Vec<Step>,
}

impl GroupRule {
    pub fn new(name: impl Into<String>, patterns: &[&str], steps: &[Step]) -> Self {
        Self {
            name: name.into(),
            patterns: patterns.iter().map(|p| Pattern::new(*p)).collect(),
            steps: steps.to_vec(),
        }
    }

    pub fn applies_to(&self, step: Step) -> bool {
        self.steps.contains(&step)
    }
}

/// The parsed contents of one group-definition file.
#[derive(Debug, Clone)]
pub struct RuleFile {
    pub origin: String,
    pub steps: Vec<Step>,
    pub rules: Vec<GroupRule>,
}

impl RuleFile {
    /// Parses group-definition text.
    ///
    /// Blank lines and lines starting with `#` are ignored. The first remaining
    /// line may list the steps the file applies to (`PGSRT,HSRT,CFIN` or just
    /// `BURN`); without it the file applies to every step. Every other line is
    /// `group,pattern1,pattern2,...`. A group named twice keeps its first
    /// position but only the patterns of its last line.
    pub fn parse(origin: &str, text: &str) -> Result<Self, GroupingError> {
        let mut steps: Option<Vec<Step>> = None;
        let mut rules: Vec<GroupRule> = Vec::new();
        let mut first = true;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first {
                first = false;
                if let Some(listed) = parse_step_list(line) {
                    tracing::debug!(origin, steps = ?listed, "Group file declares applicable steps");
                    steps = Some(listed);
                    continue;
                }
            }

            let (name, patterns) = parse_rule_line(origin, line_no, line)?;
            match rules.iter_mut().find(|r| r.name == name) {
                Some(existing) => {
                    tracing::warn!(origin, line = line_no, group = %name, "Group defined more than once; the later patterns replace the earlier ones.");
                    existing.patterns = patterns;
                }
                None => rules.push(GroupRule {
                    name,
                    patterns,
                    steps: Vec::new(),
                }),
            }
        }

        let steps = steps.unwrap_or_else(|| Step::ALL.to_vec());
        for rule in &mut rules {
            rule.steps = steps.clone();
        }

        Ok(Self {
            origin: origin.to_string(),
            steps,
            rules,
        })
    }
}

/// Returns the steps when every comma-separated token is a step name.
fn parse_step_list(line: &str) -> Option<Vec<Step>> {
    let mut steps = Vec::new();
    for token in line.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let step = token.parse::<Step>().ok()?;
        if !steps.contains(&step) {
            steps.push(step);
        }
    }
    (!steps.is_empty()).then_some(steps)
}

fn parse_rule_line(origin: &str, line_no: usize, line: &str) -> Result<(String, Vec<Pattern>), GroupingError> {
    let malformed = |reason: &str| GroupingError::MalformedRule {
        origin: origin.to_string(),
        line: line_no,
        reason: reason.to_string(),
    };

    let (name, definitions) = line
        .split_once(',')
        .ok_or_else(|| malformed("expected `group,pattern[,pattern...]`"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(malformed("group name is empty"));
    }

    let patterns: Vec<Pattern> = definitions
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(Pattern::new)
        .collect();
    if patterns.is_empty() {
        return Err(malformed("group has no patterns"));
    }

    Ok((name.to_string(), patterns))
}

/// The group rules of a run, per step.
///
/// Each step takes its rules from the last file that lists it; an earlier
/// file's groups for that step are replaced, not extended.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    by_step: BTreeMap<Step, (String, Vec<GroupRule>)>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a file's rules for every step it applies to.
    pub fn add_file(&mut self, file: RuleFile) {
        tracing::info!(origin = %file.origin, groups = file.rules.len(), steps = ?file.steps, "Loaded group definitions");
        for &step in &file.steps {
            let rules = file.rules.clone();
            if let Some((previous, _)) = self.by_step.insert(step, (file.origin.clone(), rules)) {
                tracing::warn!(%step, previous = %previous, origin = %file.origin, "Group definitions for step replaced by a later file.");
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_step.values().all(|(_, rules)| rules.is_empty())
    }

    /// Number of distinct group names across all steps.
    pub fn len(&self) -> usize {
        let mut names: Vec<&str> = self
            .by_step
            .values()
            .flat_map(|(_, rules)| rules.iter().map(|r| r.name.as_str()))
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    pub fn has_rules_for(&self, step: Step) -> bool {
        self.by_step.get(&step).is_some_and(|(_, rules)| !rules.is_empty())
    }

    /// The file the rules of `step` come from.
    pub fn origin_for(&self, step: Step) -> Option<&str> {
        self.by_step.get(&step).map(|(origin, _)| origin.as_str())
    }

    /// The ordered rules that apply to `step`.
    pub fn rules_for(&self, step: Step) -> Vec<GroupRule> {
        self.by_step
            .get(&step)
            .map(|(_, rules)| rules.clone())
            .unwrap_or_default()
    }

    /// Builds the classifier for one step, or `None` if no group applies to it.
    pub fn classifier_for(&self, step: Step) -> Option<GroupClassifier> {
        let rules = self.rules_for(step);
        (!rules.is_empty()).then(|| GroupClassifier::new(rules))
    }
}
