use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PaperzError, Result};
use crate::model::{Document, EntityKind, Identifier};
use crate::registry::Registry;
use crate::remote::{RemoteClient, Transport};

/// One field change to apply to a document.
#[derive(Debug, Clone)]
pub enum Mutation {
    Correspondent(Identifier),
    DocType(Identifier),
    Title(String),
    Created(String),
    AddTags(Vec<Identifier>),
    RemoveTags(Vec<Identifier>),
}

/// Apply mutations to one document via a single partial PATCH.
///
/// Unresolvable identifiers degrade to warnings and the corresponding
/// field is left unchanged. With `dry_run` the call short-circuits before
/// the PATCH and returns the unmodified document. A PATCH failure also
/// returns no updated document: the mutation must be treated as
/// not-applied.
pub fn run<T: Transport>(
    client: &RemoteClient<T>,
    registry: &Registry,
    doc_id: u32,
    mutations: &[Mutation],
    dry_run: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let Some(raw) = client.fetch_document(doc_id)? else {
        result.add_message(CmdMessage::warning(format!(
            "Could not find document {}",
            doc_id
        )));
        return Ok(result);
    };
    let doc = Document::from_raw(raw, registry, false);

    let mut body = Map::new();
    let mut tag_ids: Vec<u32> = doc.tags.iter().map(|t| t.id()).collect();
    let mut tags_changed = false;

    for mutation in mutations {
        match mutation {
            Mutation::Correspondent(ident) => {
                entity_field(
                    registry,
                    EntityKind::Correspondent,
                    ident,
                    "correspondent",
                    &mut body,
                    &mut result,
                );
            }
            Mutation::DocType(ident) => {
                entity_field(
                    registry,
                    EntityKind::DocType,
                    ident,
                    "document_type",
                    &mut body,
                    &mut result,
                );
            }
            Mutation::Title(title) => {
                body.insert("title".into(), json!(title));
            }
            Mutation::Created(created) => {
                let date = created.get(..10).unwrap_or(created);
                if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() {
                    body.insert("created".into(), json!(created));
                } else {
                    result.add_message(CmdMessage::warning(format!(
                        "Invalid created date '{}', expected YYYY-MM-DD",
                        created
                    )));
                }
            }
            Mutation::AddTags(idents) => {
                for ident in idents {
                    match registry.resolve(EntityKind::Tag, ident) {
                        Ok(id) if tag_ids.contains(&id) => {
                            result.add_message(CmdMessage::warning(format!(
                                "Document {} already has tag {}",
                                doc_id, ident
                            )));
                        }
                        Ok(id) => {
                            tag_ids.push(id);
                            tags_changed = true;
                        }
                        Err(err) => result.add_message(CmdMessage::warning(err.to_string())),
                    }
                }
            }
            Mutation::RemoveTags(idents) => {
                for ident in idents {
                    match registry.resolve(EntityKind::Tag, ident) {
                        Ok(id) => {
                            let before = tag_ids.len();
                            tag_ids.retain(|&t| t != id);
                            if tag_ids.len() != before {
                                tags_changed = true;
                            }
                        }
                        Err(err) => result.add_message(CmdMessage::warning(err.to_string())),
                    }
                }
            }
        }
    }

    if tags_changed {
        body.insert("tags".into(), json!(tag_ids));
    }

    if body.is_empty() {
        result.add_message(CmdMessage::info("No applicable changes."));
        return Ok(result.with_documents(vec![doc]));
    }

    if dry_run {
        result.add_message(CmdMessage::info(format!(
            "Dry-run: document {} left unmodified.",
            doc_id
        )));
        return Ok(result.with_documents(vec![doc]));
    }

    match client.patch_document(doc_id, &Value::Object(body)) {
        Ok(updated) => {
            result.add_message(CmdMessage::success(format!("Updated document {}.", doc_id)));
            Ok(result.with_documents(vec![Document::from_raw(updated, registry, false)]))
        }
        Err(PaperzError::Remote { status, url }) => {
            warn!(status, url = %url, "patch rejected");
            result.add_message(CmdMessage::warning(format!(
                "Update of document {} failed with status {}; no changes applied.",
                doc_id, status
            )));
            Ok(result)
        }
        Err(err) => Err(err),
    }
}

fn entity_field(
    registry: &Registry,
    kind: EntityKind,
    ident: &Identifier,
    field: &str,
    body: &mut Map<String, Value>,
    result: &mut CmdResult,
) {
    match registry.resolve(kind, ident) {
        Ok(id) => {
            body.insert(field.into(), json!(id));
        }
        Err(err) => result.add_message(CmdMessage::warning(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, RawEntity};
    use crate::remote::memory::InMemoryTransport;

    const DOC_URL: &str = "https://paper.example/api/documents/7/";

    fn doc_body(tags: &str) -> String {
        format!(
            r#"{{"id": 7, "title": "Bill", "correspondent": null, "document_type": null,
                 "tags": {}, "created": "2020-01-01", "added": "",
                 "archive_serial_number": null}}"#,
            tags
        )
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.replace(
            EntityKind::Tag,
            vec![
                entity(1, "bank", EntityKind::Tag),
                entity(2, "statement", EntityKind::Tag),
            ],
        );
        registry.replace(
            EntityKind::Correspondent,
            vec![entity(5, "Alice", EntityKind::Correspondent)],
        );
        registry.replace(EntityKind::DocType, vec![]);
        registry
    }

    fn entity(id: u32, name: &str, kind: EntityKind) -> Entity {
        Entity::from_raw(
            RawEntity {
                id,
                name: name.into(),
                slug: name.to_lowercase(),
                document_count: 0,
            },
            kind,
        )
    }

    #[test]
    fn add_tags_patches_the_full_tag_list() {
        let transport = InMemoryTransport::new()
            .with_response(DOC_URL, 200, &doc_body("[1]"))
            .with_patch_response(DOC_URL, 200, &doc_body("[1, 2]"));
        let client = RemoteClient::new(transport, "https://paper.example/api");

        let result = run(
            &client,
            &registry(),
            7,
            &[Mutation::AddTags(vec![Identifier::Name("statement".into())])],
            false,
        )
        .unwrap();

        assert_eq!(result.documents.len(), 1);
        let patches = client.transport().patch_log();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].1, json!({"tags": [1, 2]}));
    }

    #[test]
    fn adding_present_tag_warns_and_skips_patch() {
        let transport =
            InMemoryTransport::new().with_response(DOC_URL, 200, &doc_body("[1]"));
        let client = RemoteClient::new(transport, "https://paper.example/api");

        let result = run(
            &client,
            &registry(),
            7,
            &[Mutation::AddTags(vec![Identifier::Name("bank".into())])],
            false,
        )
        .unwrap();

        assert!(client.transport().patch_log().is_empty());
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("already has tag")));
    }

    #[test]
    fn dry_run_short_circuits_before_patch() {
        let transport =
            InMemoryTransport::new().with_response(DOC_URL, 200, &doc_body("[1]"));
        let client = RemoteClient::new(transport, "https://paper.example/api");

        let result = run(
            &client,
            &registry(),
            7,
            &[Mutation::Correspondent(Identifier::Name("Alice".into()))],
            true,
        )
        .unwrap();

        assert!(client.transport().patch_log().is_empty());
        // the unmodified document is returned
        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.documents[0].title, "Bill");
    }

    #[test]
    fn remove_tags_and_set_correspondent_in_one_patch() {
        let transport = InMemoryTransport::new()
            .with_response(DOC_URL, 200, &doc_body("[1, 2]"))
            .with_patch_response(DOC_URL, 200, &doc_body("[2]"));
        let client = RemoteClient::new(transport, "https://paper.example/api");

        run(
            &client,
            &registry(),
            7,
            &[
                Mutation::RemoveTags(vec![Identifier::Id(1)]),
                Mutation::Correspondent(Identifier::Name("Alice".into())),
            ],
            false,
        )
        .unwrap();

        let patches = client.transport().patch_log();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].1, json!({"correspondent": 5, "tags": [2]}));
    }

    #[test]
    fn patch_failure_returns_no_document() {
        let transport = InMemoryTransport::new()
            .with_response(DOC_URL, 200, &doc_body("[]"))
            .with_patch_response(DOC_URL, 403, "");
        let client = RemoteClient::new(transport, "https://paper.example/api");

        let result = run(
            &client,
            &registry(),
            7,
            &[Mutation::Title("New".into())],
            false,
        )
        .unwrap();

        assert!(result.documents.is_empty());
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("failed with status 403")));
    }

    #[test]
    fn invalid_created_date_is_rejected_client_side() {
        let transport =
            InMemoryTransport::new().with_response(DOC_URL, 200, &doc_body("[]"));
        let client = RemoteClient::new(transport, "https://paper.example/api");

        let result = run(
            &client,
            &registry(),
            7,
            &[Mutation::Created("last tuesday".into())],
            false,
        )
        .unwrap();

        assert!(client.transport().patch_log().is_empty());
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("Invalid created date")));
    }
}
