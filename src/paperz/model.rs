use serde::Deserialize;
use std::fmt;

use crate::registry::Registry;

/// The three entity kinds the server manages alongside documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tag,
    Correspondent,
    DocType,
}

pub const ENTITY_KINDS: [EntityKind; 3] =
    [EntityKind::Tag, EntityKind::Correspondent, EntityKind::DocType];

impl EntityKind {
    /// Server list endpoint for this kind.
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityKind::Tag => "tags",
            EntityKind::Correspondent => "correspondents",
            EntityKind::DocType => "document_types",
        }
    }

    /// Display label and whether the long form includes the slug.
    fn display_style(&self) -> (&'static str, bool) {
        match self {
            EntityKind::Tag => ("Tag", false),
            EntityKind::Correspondent => ("Correspondent", true),
            EntityKind::DocType => ("Doc Type", true),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Tag => "tag",
            EntityKind::Correspondent => "correspondent",
            EntityKind::DocType => "document type",
        };
        write!(f, "{}", name)
    }
}

/// A tag, correspondent or document type as held by the server.
///
/// Entities are immutable snapshots; a registry refresh replaces them
/// wholesale rather than mutating fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: u32,
    pub name: String,
    pub slug: String,
    pub document_count: u32,
    pub kind: EntityKind,
}

impl Entity {
    pub fn from_raw(raw: RawEntity, kind: EntityKind) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            slug: raw.slug,
            document_count: raw.document_count,
            kind,
        }
    }

    /// Long one-line form, e.g. `Correspondent: 2 'Alice' (alice) 9 documents`.
    pub fn describe(&self) -> String {
        let (label, with_slug) = self.kind.display_style();
        if with_slug {
            format!(
                "{}: {} '{}' ({}) {} documents",
                label, self.id, self.name, self.slug, self.document_count
            )
        } else {
            format!(
                "{}: {} '{}' {} documents",
                label, self.id, self.name, self.document_count
            )
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// User input naming an entity: either a canonical id or a name/slug to
/// be resolved against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Id(u32),
    Name(String),
}

impl Identifier {
    /// All-digit strings are taken as ids, everything else as names.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<u32>() {
            Ok(n) => Identifier::Id(n),
            Err(_) => Identifier::Name(s.to_string()),
        }
    }

    /// Parse a comma-separated list, e.g. `bank,statement,2019`.
    pub fn parse_list(s: &str) -> Vec<Self> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Identifier::parse)
            .collect()
    }
}

impl From<u32> for Identifier {
    fn from(id: u32) -> Self {
        Identifier::Id(id)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::parse(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(id) => write!(f, "{}", id),
            Identifier::Name(name) => write!(f, "{}", name),
        }
    }
}

/// A document's reference to an entity.
///
/// References resolve to full `Entity` values when the registry for the
/// kind has been refreshed; without a registry they stay raw server ids
/// (a degraded mode, visible to display code as `#id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Resolved(Entity),
    Raw(u32),
}

impl EntityRef {
    pub fn id(&self) -> u32 {
        match self {
            EntityRef::Resolved(entity) => entity.id,
            EntityRef::Raw(id) => *id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            EntityRef::Resolved(entity) => Some(&entity.name),
            EntityRef::Raw(_) => None,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            EntityRef::Resolved(entity) => entity.name.clone(),
            EntityRef::Raw(id) => format!("#{}", id),
        }
    }
}

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Date components derived from a document's `created` timestamp.
///
/// Consistent with `created` at the moment of last derivation; re-derived
/// by `Document::set_created` whenever the date changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateParts {
    pub year: String,
    pub month: String,
    pub day: String,
    pub month_name: String,
}

impl DateParts {
    /// Derive from the `YYYY-MM-DD` prefix of an ISO-8601 timestamp.
    pub fn derive(created: &str) -> Self {
        let date = created.get(..10).unwrap_or(created);
        let mut parts = date.splitn(3, '-');
        let year = parts.next().unwrap_or("").to_string();
        let month = parts.next().unwrap_or("").to_string();
        let day = parts.next().unwrap_or("").to_string();
        let month_name = month
            .parse::<usize>()
            .ok()
            .and_then(|m| MONTH_ABBREV.get(m.wrapping_sub(1)))
            .copied()
            .unwrap_or("")
            .to_string();
        Self {
            year,
            month,
            day,
            month_name,
        }
    }
}

/// A fully materialized document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: u32,
    pub title: String,
    pub correspondent: Option<EntityRef>,
    pub doc_type: Option<EntityRef>,
    pub tags: Vec<EntityRef>,
    /// Authoritative document date, ISO-8601.
    pub created: String,
    /// Server ingestion time, read-only.
    pub added: String,
    pub asn: Option<u32>,
    pub original_file_name: String,
    pub archived_file_name: String,
    /// Only populated when the caller asked for content; fetching it is
    /// expensive server-side.
    pub content: Option<String>,
    pub dates: DateParts,
}

impl Document {
    /// Materialize a raw record, resolving entity references against the
    /// registry where the kind has been refreshed.
    pub fn from_raw(raw: RawDocument, registry: &Registry, with_content: bool) -> Self {
        let correspondent = raw
            .correspondent
            .map(|id| registry.reference(EntityKind::Correspondent, id));
        let doc_type = raw
            .document_type
            .map(|id| registry.reference(EntityKind::DocType, id));
        let tags = raw
            .tags
            .iter()
            .map(|&id| registry.reference(EntityKind::Tag, id))
            .collect();
        let dates = DateParts::derive(&raw.created);
        Self {
            id: raw.id,
            title: raw.title,
            correspondent,
            doc_type,
            tags,
            created: raw.created,
            added: raw.added,
            asn: raw.archive_serial_number,
            original_file_name: raw.original_file_name.unwrap_or_default(),
            archived_file_name: raw.archived_file_name.unwrap_or_default(),
            content: if with_content { raw.content } else { None },
            dates,
        }
    }

    /// Change the created date and re-derive the date components.
    pub fn set_created(&mut self, created: String) {
        self.created = created;
        self.dates = DateParts::derive(&self.created);
    }

    pub fn correspondent_name(&self) -> Option<&str> {
        self.correspondent.as_ref().and_then(|r| r.name())
    }

    pub fn doc_type_name(&self) -> Option<&str> {
        self.doc_type.as_ref().and_then(|r| r.name())
    }

    /// The `YYYY-MM-DD` part of the created timestamp.
    pub fn created_date(&self) -> &str {
        self.created.get(..10).unwrap_or(&self.created)
    }
}

/// Entity record as returned by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub document_count: u32,
}

/// Document record as returned by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    pub correspondent: Option<u32>,
    pub document_type: Option<u32>,
    #[serde(default)]
    pub tags: Vec<u32>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub added: String,
    pub archive_serial_number: Option<u32>,
    #[serde(default)]
    pub original_file_name: Option<String>,
    #[serde(default)]
    pub archived_file_name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One page of a paginated list response.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_date_parts_from_created_prefix() {
        let parts = DateParts::derive("2020-02-15T10:30:00+00:00");
        assert_eq!(parts.year, "2020");
        assert_eq!(parts.month, "02");
        assert_eq!(parts.day, "15");
        assert_eq!(parts.month_name, "Feb");
    }

    #[test]
    fn derives_empty_parts_from_garbage() {
        let parts = DateParts::derive("");
        assert_eq!(parts.year, "");
        assert_eq!(parts.month_name, "");

        let parts = DateParts::derive("not a date");
        assert_eq!(parts.month_name, "");
    }

    #[test]
    fn set_created_rederives_parts() {
        let raw = RawDocument {
            id: 1,
            title: "Statement".into(),
            correspondent: None,
            document_type: None,
            tags: vec![],
            created: "2019-07-01T00:00:00Z".into(),
            added: String::new(),
            archive_serial_number: None,
            original_file_name: None,
            archived_file_name: None,
            content: None,
        };
        let mut doc = Document::from_raw(raw, &Registry::default(), false);
        assert_eq!(doc.dates.month_name, "Jul");

        doc.set_created("2021-12-24".into());
        assert_eq!(doc.dates.year, "2021");
        assert_eq!(doc.dates.month_name, "Dec");
        assert_eq!(doc.dates.day, "24");
    }

    #[test]
    fn identifier_parses_digits_as_id() {
        assert_eq!(Identifier::parse("300"), Identifier::Id(300));
        assert_eq!(Identifier::parse("bank"), Identifier::Name("bank".into()));
        assert_eq!(
            Identifier::parse_list("bank,2018,statement"),
            vec![
                Identifier::Name("bank".into()),
                Identifier::Id(2018),
                Identifier::Name("statement".into()),
            ]
        );
    }

    #[test]
    fn unresolved_refs_keep_raw_ids() {
        let raw = RawDocument {
            id: 7,
            title: "Bill".into(),
            correspondent: Some(4),
            document_type: Some(2),
            tags: vec![1, 9],
            created: "2020-01-01".into(),
            added: String::new(),
            archive_serial_number: None,
            original_file_name: None,
            archived_file_name: None,
            content: Some("body".into()),
        };
        let doc = Document::from_raw(raw, &Registry::default(), false);
        assert_eq!(doc.correspondent.as_ref().unwrap().id(), 4);
        assert_eq!(doc.correspondent.as_ref().unwrap().name(), None);
        assert_eq!(doc.tags[1].display_name(), "#9");
        // content was not requested
        assert_eq!(doc.content, None);
    }
}
