//! API facade.
//!
//! `PaperApi` is the single entry point for all operations, a thin
//! dispatch layer over the command modules. It owns the session state —
//! the remote client plus the entity registry snapshot — and is generic
//! over the transport:
//!
//! - Production: `PaperApi<HttpTransport>`
//! - Testing: `PaperApi<InMemoryTransport>`
//!
//! Query results are always returned to the caller, never stored as
//! hidden instance state; the registry is the only thing a refresh
//! mutates.

use crate::commands;
use crate::error::Result;
use crate::filter::SecondaryFilter;
use crate::model::{Document, EntityKind, ENTITY_KINDS};
use crate::query::DocumentQuery;
use crate::registry::Registry;
use crate::remote::{RemoteClient, Transport};

pub struct PaperApi<T: Transport> {
    client: RemoteClient<T>,
    registry: Registry,
}

impl<T: Transport> PaperApi<T> {
    pub fn new(client: RemoteClient<T>) -> Self {
        Self {
            client,
            registry: Registry::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Refresh one entity kind and return its entities.
    pub fn refresh(&mut self, kind: EntityKind) -> Result<commands::CmdResult> {
        commands::list::run(&self.client, &mut self.registry, kind)
    }

    /// Refresh all three entity kinds.
    pub fn refresh_all(&mut self) -> Result<()> {
        for kind in ENTITY_KINDS {
            self.refresh(kind)?;
        }
        Ok(())
    }

    pub fn find_documents(
        &self,
        query: &DocumentQuery,
        filter: &SecondaryFilter,
        with_content: bool,
    ) -> Result<commands::CmdResult> {
        commands::find::run(&self.client, &self.registry, query, filter, with_content)
    }

    pub fn get_documents(&self, ids: &[u32], with_content: bool) -> Result<commands::CmdResult> {
        commands::get::run(&self.client, &self.registry, ids, with_content)
    }

    pub fn modify_document(
        &self,
        id: u32,
        mutations: &[commands::modify::Mutation],
        dry_run: bool,
    ) -> Result<commands::CmdResult> {
        commands::modify::run(&self.client, &self.registry, id, mutations, dry_run)
    }

    pub fn export_documents(
        &self,
        docs: &[Document],
        options: &commands::export::ExportOptions,
    ) -> Result<commands::CmdResult> {
        commands::export::run(&self.client, docs, options)
    }
}

pub use crate::commands::export::ExportOptions;
pub use crate::commands::modify::Mutation;
pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identifier;
    use crate::remote::memory::InMemoryTransport;

    #[test]
    fn refresh_then_find_resolves_names() {
        let transport = InMemoryTransport::new()
            .with_response(
                "https://paper.example/api/tags/",
                200,
                r#"{"results": [{"id": 1, "name": "bank", "slug": "bank", "document_count": 1}],
                    "next": null}"#,
            )
            .with_response(
                "https://paper.example/api/correspondents/",
                200,
                r#"{"results": [], "next": null}"#,
            )
            .with_response(
                "https://paper.example/api/document_types/",
                200,
                r#"{"results": [], "next": null}"#,
            )
            .with_response(
                "https://paper.example/api/documents/?tags__id=1",
                200,
                r#"{"results": [{"id": 9, "title": "S", "correspondent": null,
                                 "document_type": null, "tags": [1],
                                 "created": "2020-01-01", "added": "",
                                 "archive_serial_number": null}],
                    "next": null}"#,
            );
        let mut api = PaperApi::new(RemoteClient::new(transport, "https://paper.example/api"));
        api.refresh_all().unwrap();

        let query = DocumentQuery::new().tags(vec![Identifier::Name("bank".into())]);
        let result = api
            .find_documents(&query, &SecondaryFilter::new(), false)
            .unwrap();
        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.documents[0].tags[0].name(), Some("bank"));
    }
}
