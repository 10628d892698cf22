//! Entity registry: the resolved snapshots of tags, correspondents and
//! document types for one client session.
//!
//! A kind must be fully refreshed before name-based resolution is
//! attempted; resolving against an unrefreshed kind fails closed with
//! `MissingRegistry` rather than guessing. Refreshes replace a kind's
//! snapshot atomically — readers never observe a partial set.

use crate::error::{PaperzError, Result};
use crate::model::{Entity, EntityKind, EntityRef, Identifier};

#[derive(Debug, Default, Clone)]
pub struct Registry {
    tags: Option<Vec<Entity>>,
    correspondents: Option<Vec<Entity>>,
    doc_types: Option<Vec<Entity>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: EntityKind) -> &Option<Vec<Entity>> {
        match kind {
            EntityKind::Tag => &self.tags,
            EntityKind::Correspondent => &self.correspondents,
            EntityKind::DocType => &self.doc_types,
        }
    }

    /// Replace the whole snapshot for a kind.
    pub fn replace(&mut self, kind: EntityKind, entities: Vec<Entity>) {
        let slot = match kind {
            EntityKind::Tag => &mut self.tags,
            EntityKind::Correspondent => &mut self.correspondents,
            EntityKind::DocType => &mut self.doc_types,
        };
        *slot = Some(entities);
    }

    pub fn is_refreshed(&self, kind: EntityKind) -> bool {
        self.slot(kind).is_some()
    }

    pub fn entities(&self, kind: EntityKind) -> Option<&[Entity]> {
        self.slot(kind).as_deref()
    }

    /// Resolve an identifier to a canonical server id.
    ///
    /// Ids pass through unchanged. Names match case-sensitively against
    /// entity names, then case-insensitively against slugs; first match
    /// wins.
    pub fn resolve(&self, kind: EntityKind, ident: &Identifier) -> Result<u32> {
        match ident {
            Identifier::Id(id) => Ok(*id),
            Identifier::Name(name) => {
                let entities = self
                    .entities(kind)
                    .ok_or(PaperzError::MissingRegistry(kind))?;
                let lowered = name.to_lowercase();
                entities
                    .iter()
                    .find(|e| e.name == *name || e.slug.to_lowercase() == lowered)
                    .map(|e| e.id)
                    .ok_or_else(|| PaperzError::NotFound {
                        kind,
                        name: name.clone(),
                    })
            }
        }
    }

    /// Build a document's reference for a raw id: resolved when the kind
    /// has been refreshed and the id is known, raw otherwise.
    pub fn reference(&self, kind: EntityKind, id: u32) -> EntityRef {
        match self.entities(kind) {
            Some(entities) => entities
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .map(EntityRef::Resolved)
                .unwrap_or(EntityRef::Raw(id)),
            None => EntityRef::Raw(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawEntity;

    fn tag(id: u32, name: &str, slug: &str) -> Entity {
        Entity::from_raw(
            RawEntity {
                id,
                name: name.into(),
                slug: slug.into(),
                document_count: 0,
            },
            EntityKind::Tag,
        )
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.replace(
            EntityKind::Tag,
            vec![tag(1, "Bank", "bank"), tag(2, "Statement", "statement")],
        );
        registry
    }

    #[test]
    fn resolve_id_is_identity() {
        let registry = registry();
        let id = registry
            .resolve(EntityKind::Tag, &Identifier::Id(42))
            .unwrap();
        assert_eq!(id, 42);
    }

    #[test]
    fn resolve_matches_name_then_slug() {
        let registry = registry();
        assert_eq!(
            registry
                .resolve(EntityKind::Tag, &Identifier::Name("Bank".into()))
                .unwrap(),
            1
        );
        // slug match is case-insensitive
        assert_eq!(
            registry
                .resolve(EntityKind::Tag, &Identifier::Name("STATEMENT".into()))
                .unwrap(),
            2
        );
    }

    #[test]
    fn resolve_is_idempotent() {
        let registry = registry();
        let ident = Identifier::Name("Bank".into());
        let first = registry.resolve(EntityKind::Tag, &ident).unwrap();
        let second = registry.resolve(EntityKind::Tag, &ident).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn resolve_unknown_name_is_not_found() {
        let registry = registry();
        let err = registry
            .resolve(EntityKind::Tag, &Identifier::Name("visa".into()))
            .unwrap_err();
        assert!(matches!(err, PaperzError::NotFound { .. }));
    }

    #[test]
    fn resolve_without_refresh_fails_closed() {
        let registry = registry();
        let err = registry
            .resolve(
                EntityKind::Correspondent,
                &Identifier::Name("Alice".into()),
            )
            .unwrap_err();
        assert!(matches!(err, PaperzError::MissingRegistry(_)));
    }

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let mut registry = registry();
        registry.replace(EntityKind::Tag, vec![tag(9, "Visa", "visa")]);
        assert!(registry
            .resolve(EntityKind::Tag, &Identifier::Name("Bank".into()))
            .is_err());
        assert_eq!(
            registry
                .resolve(EntityKind::Tag, &Identifier::Name("visa".into()))
                .unwrap(),
            9
        );
    }

    #[test]
    fn reference_resolves_known_ids() {
        let registry = registry();
        assert_eq!(
            registry.reference(EntityKind::Tag, 1).name(),
            Some("Bank")
        );
        assert_eq!(registry.reference(EntityKind::Tag, 99).name(), None);
        assert_eq!(registry.reference(EntityKind::Correspondent, 1).name(), None);
    }
}
