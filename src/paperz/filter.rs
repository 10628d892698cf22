//! Client-side secondary filters.
//!
//! These predicates run after materialization because the server's query
//! language cannot express them: substring matching on titles, and exact
//! or any-of tag membership by name. Documents failing an active filter
//! are dropped; the order of survivors is preserved.

use crate::model::{Document, Identifier};

#[derive(Debug, Default, Clone)]
pub struct SecondaryFilter {
    /// Comma-separated substrings that must ALL appear in the title,
    /// case-insensitively.
    pub title_labels: Option<String>,
    /// Every one of these tags must be present (AND).
    pub has_tags: Vec<Identifier>,
    /// At least one of these tags must be present (OR).
    pub has_any_tags: Vec<Identifier>,
}

impl SecondaryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.title_labels.is_none() && self.has_tags.is_empty() && self.has_any_tags.is_empty()
    }

    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        if self.is_empty() {
            return docs;
        }
        docs.into_iter().filter(|d| self.matches(d)).collect()
    }

    fn matches(&self, doc: &Document) -> bool {
        if let Some(labels) = &self.title_labels {
            if !doc.has_title_labels(labels) {
                return false;
            }
        }
        if !self.has_tags.is_empty() && !doc.has_tags(&self.has_tags) {
            return false;
        }
        if !self.has_any_tags.is_empty() && !doc.has_any_tags(&self.has_any_tags) {
            return false;
        }
        true
    }
}

impl Document {
    /// True when every comma-separated label appears in the title,
    /// case-insensitively.
    pub fn has_title_labels(&self, labels: &str) -> bool {
        let title = self.title.to_lowercase();
        labels
            .split(',')
            .all(|label| title.contains(&label.to_lowercase()))
    }

    pub fn has_tag(&self, ident: &Identifier) -> bool {
        match ident {
            Identifier::Id(id) => self.tags.iter().any(|t| t.id() == *id),
            Identifier::Name(name) => self.tags.iter().any(|t| t.name() == Some(name.as_str())),
        }
    }

    /// AND membership: every requested tag is on the document.
    pub fn has_tags(&self, idents: &[Identifier]) -> bool {
        idents.iter().all(|ident| self.has_tag(ident))
    }

    /// OR membership: at least one requested tag is on the document.
    pub fn has_any_tags(&self, idents: &[Identifier]) -> bool {
        idents.iter().any(|ident| self.has_tag(ident))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, RawDocument};
    use crate::registry::Registry;
    use crate::model::{Entity, RawEntity};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        let tags = [(1, "A"), (2, "B")]
            .iter()
            .map(|&(id, name)| {
                Entity::from_raw(
                    RawEntity {
                        id,
                        name: name.into(),
                        slug: name.to_lowercase(),
                        document_count: 0,
                    },
                    EntityKind::Tag,
                )
            })
            .collect();
        registry.replace(EntityKind::Tag, tags);
        registry
    }

    fn doc(id: u32, title: &str, tags: Vec<u32>) -> Document {
        Document::from_raw(
            RawDocument {
                id,
                title: title.into(),
                correspondent: None,
                document_type: None,
                tags,
                created: "2020-01-01".into(),
                added: String::new(),
                archive_serial_number: None,
                original_file_name: None,
                archived_file_name: None,
                content: None,
            },
            &registry(),
            false,
        )
    }

    #[test]
    fn title_labels_are_all_required() {
        let d = doc(1, "TD Bank Statement 2017", vec![]);
        assert!(d.has_title_labels("Bank,2017,TD"));
        assert!(d.has_title_labels("bank"));
        assert!(!d.has_title_labels("Bank,Visa"));
    }

    #[test]
    fn has_tags_is_and_has_any_tags_is_or() {
        let d = doc(1, "x", vec![1]);
        let both = vec![Identifier::Name("A".into()), Identifier::Name("B".into())];
        assert!(!d.has_tags(&both));
        assert!(d.has_any_tags(&both));
    }

    #[test]
    fn tag_membership_matches_by_id_or_name() {
        let d = doc(1, "x", vec![2]);
        assert!(d.has_tag(&Identifier::Id(2)));
        assert!(d.has_tag(&Identifier::Name("B".into())));
        assert!(!d.has_tag(&Identifier::Name("b".into())));
    }

    #[test]
    fn apply_drops_failures_and_preserves_order() {
        let docs = vec![
            doc(1, "Bank A", vec![1]),
            doc(2, "Visa", vec![1]),
            doc(3, "Bank B", vec![2]),
            doc(4, "Bank C", vec![1]),
        ];
        let filter = SecondaryFilter {
            title_labels: Some("bank".into()),
            has_tags: vec![Identifier::Id(1)],
            has_any_tags: vec![],
        };
        let survivors = filter.apply(docs);
        let ids: Vec<u32> = survivors.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let docs = vec![doc(1, "a", vec![]), doc(2, "b", vec![])];
        assert_eq!(SecondaryFilter::new().apply(docs).len(), 2);
    }
}
