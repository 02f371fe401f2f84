use crate::error::ParetoError;
use annotations::AnnotationSet;
use grouping::{RuleBook, RuleFile};

/// Text of one definition file, with the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub origin: String,
    pub text: String,
}

impl SourceText {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }
}

/// The user definitions a run is enriched with, loaded once and shared by
/// reference with every step.
#[derive(Debug, Clone, Default)]
pub struct ParetoContext {
    pub rules: RuleBook,
    pub group_notes: AnnotationSet,
    pub register_notes: AnnotationSet,
}

impl ParetoContext {
    /// A context with no groups and no annotations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the context from definition text.
    ///
    /// Absent sources simply leave that enrichment out. A group-definition
    /// file that does not parse is skipped with a warning; a malformed
    /// annotation file fails the load.
    pub fn load(
        rule_sources: &[SourceText],
        group_notes: Option<&SourceText>,
        register_notes: Option<&SourceText>,
    ) -> Result<Self, ParetoError> {
        let mut rules = RuleBook::new();
        for source in rule_sources {
            match RuleFile::parse(&source.origin, &source.text) {
                Ok(file) => rules.add_file(file),
                Err(e) => tracing::warn!(origin = %source.origin, error = %e, "Skipping group definitions."),
            }
        }

        let group_notes = match group_notes {
            Some(source) => AnnotationSet::parse(&source.origin, &source.text)?,
            None => AnnotationSet::default(),
        };
        let register_notes = match register_notes {
            Some(source) => AnnotationSet::parse(&source.origin, &source.text)?,
            None => AnnotationSet::default(),
        };

        Ok(Self {
            rules,
            group_notes,
            register_notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Step;

    #[test]
    fn unparseable_rule_file_is_skipped() {
        let sources = [
            SourceText::new("bad.txt", "GROUP_WITHOUT_PATTERNS\n"),
            SourceText::new("good.txt", "A,REG1\n"),
        ];
        let context = ParetoContext::load(&sources, None, None).unwrap();
        assert_eq!(context.rules.len(), 1);
        assert!(context.rules.has_rules_for(Step::Burn));
        assert!(context.group_notes.is_empty());
    }

    #[test]
    fn malformed_annotations_fail_the_load() {
        let notes = SourceText::new("comments.txt", "COMMENTS^OWNER\nGroupX^hi\n");
        let err = ParetoContext::load(&[], Some(&notes), None).unwrap_err();
        assert!(matches!(err, ParetoError::Annotation(_)));
    }
}
