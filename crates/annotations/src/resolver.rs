use crate::error::AnnotationError;
use crate::parser::{parse_header, parse_line, Annotation};
use core_types::{Configuration, Step};
use std::collections::HashMap;

/// The parsed contents of one annotation file, indexed by key.
///
/// Resolution for a (key, step, configuration) query considers every entry for
/// the key whose scope matches. The most specific scope wins; among equally
/// specific entries the one declared last wins.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    origin: String,
    columns: Vec<String>,
    entries: Vec<Annotation>,
    index: HashMap<String, Vec<usize>>,
}

impl AnnotationSet {
    /// Parses annotation text.
    ///
    /// The first line is always the `^`-separated column header, even when a
    /// comment or blank line would otherwise be skipped; it fixes how many
    /// values every following line must carry. A blank first line declares no
    /// columns. After it, blank lines and lines starting with `#` are ignored.
    pub fn parse(origin: &str, text: &str) -> Result<Self, AnnotationError> {
        let mut set = Self {
            origin: origin.to_string(),
            ..Self::default()
        };
        let mut lines = text.lines().enumerate();

        match lines.next().map(|(_, header)| header.trim()) {
            Some(header) if !header.is_empty() => set.columns = parse_header(header),
            _ => tracing::warn!(origin, "Annotation file has no header line; no columns defined."),
        }

        for (idx, raw) in lines {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let annotation = parse_line(origin, line_no, line, set.columns.len())?;
            set.push(annotation);
        }

        tracing::info!(
            origin,
            columns = set.columns.len(),
            entries = set.entries.len(),
            "Loaded annotations"
        );

        Ok(set)
    }

    fn push(&mut self, annotation: Annotation) {
        self.index
            .entry(annotation.key.clone())
            .or_default()
            .push(self.entries.len());
        self.entries.push(annotation);
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn entries(&self) -> &[Annotation] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The winning annotation for `key` at (step, configuration), if any.
    pub fn resolve(&self, key: &str, step: Step, configuration: Configuration) -> Option<&Annotation> {
        self.index
            .get(key)?
            .iter()
            .map(|&idx| &self.entries[idx])
            .filter(|a| a.scope.matches(step, configuration))
            .enumerate()
            .max_by_key(|(position, a)| (a.scope.specificity(), *position))
            .map(|(_, a)| a)
    }

    /// Column values for `key`, or one empty string per column when unmatched.
    pub fn values_for(&self, key: &str, step: Step, configuration: Configuration) -> Vec<String> {
        match self.resolve(key, step, configuration) {
            Some(annotation) => annotation.values.clone(),
            None => vec![String::new(); self.columns.len()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn unscoped_entry_resolves_everywhere() {
        let set = AnnotationSet::parse("comments.txt", "COMMENTS^OWNER\nGroupX^hi^bob\n").unwrap();
        assert_eq!(set.columns(), &["COMMENTS".to_string(), "OWNER".to_string()]);
        for step in Step::ALL {
            for configuration in [Configuration::X4, Configuration::X8, Configuration::X16, Configuration::Combo] {
                assert_eq!(set.values_for("GroupX", step, configuration), vec!["hi", "bob"]);
            }
        }
    }

    #[test]
    fn unmatched_key_gets_empty_columns() {
        let set = AnnotationSet::parse("comments.txt", "COMMENTS^OWNER^ETA\nGroupX^hi^bob^ww30\n").unwrap();
        assert_eq!(set.values_for("Other", Step::Burn, Configuration::X8), vec!["", "", ""]);
    }

    #[test]
    fn most_specific_scope_wins_regardless_of_order() {
        let text = indoc! {"
            COMMENTS^OWNER
            TRIM$x8*CFIN^x8 cfin^ann
            TRIM*CFIN^cfin^cal
            TRIM^default^bob
            TRIM$x8^x8^dee
        "};
        let set = AnnotationSet::parse("comments.txt", text).unwrap();

        assert_eq!(set.values_for("TRIM", Step::Cfin, Configuration::X8), vec!["x8 cfin", "ann"]);
        assert_eq!(set.values_for("TRIM", Step::Cfin, Configuration::X16), vec!["cfin", "cal"]);
        assert_eq!(set.values_for("TRIM", Step::Burn, Configuration::X16), vec!["default", "bob"]);
        assert_eq!(set.values_for("TRIM", Step::Burn, Configuration::X8), vec!["x8", "dee"]);
    }

    #[test]
    fn equally_specific_entries_resolve_to_the_last_declared() {
        let text = indoc! {"
            COMMENTS
            TRIM^first
            TRIM*HSRT^step only
            TRIM$x16^config only
            TRIM^second
        "};
        let set = AnnotationSet::parse("comments.txt", text).unwrap();

        assert_eq!(set.values_for("TRIM", Step::Pgsrt, Configuration::X8), vec!["second"]);
        assert_eq!(set.values_for("TRIM", Step::Hsrt, Configuration::X16), vec!["config only"]);
        assert_eq!(set.values_for("TRIM", Step::Hsrt, Configuration::X8), vec!["step only"]);
    }

    #[test]
    fn short_line_fails_with_its_line_number() {
        let text = indoc! {"
            COMMENTS^OWNER^ETA
            # owners pending
            GroupX^hi^bob^ww30
            GroupY^only one
        "};
        let err = AnnotationSet::parse("comments.txt", text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "comments.txt:4: 'GroupY' has 1 value(s) but the header declares 3 column(s)"
        );
    }

    #[test]
    fn header_is_the_literal_first_line() {
        let text = indoc! {"
            # COMMENTS^OWNER
            # pending owners
            GroupX^hi^bob
        "};
        let set = AnnotationSet::parse("comments.txt", text).unwrap();
        assert_eq!(set.columns(), &["# COMMENTS".to_string(), "OWNER".to_string()]);
        assert_eq!(set.entries().len(), 1);
        assert_eq!(set.entries()[0].line, 3);

        // A blank first line leaves no columns; the would-be header is an entry.
        let set = AnnotationSet::parse("comments.txt", "\nCOMMENTS^OWNER\nGroupX^hi\n").unwrap();
        assert!(set.columns().is_empty());
        assert_eq!(set.entries().len(), 2);
        assert!(set.resolve("COMMENTS", Step::Burn, Configuration::X8).is_some());
    }

    #[test]
    fn empty_file_has_no_columns() {
        let set = AnnotationSet::parse("comments.txt", "\n\n").unwrap();
        assert!(set.columns().is_empty());
        assert!(set.values_for("X", Step::Burn, Configuration::X8).is_empty());
    }
}
