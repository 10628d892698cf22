use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Document;
use crate::registry::Registry;
use crate::remote::{RemoteClient, Transport};

/// Fetch explicit document ids, one GET per id, preserving the
/// caller-supplied order. A document that cannot be fetched is reported
/// and absent from the result.
pub fn run<T: Transport>(
    client: &RemoteClient<T>,
    registry: &Registry,
    ids: &[u32],
    with_content: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut documents = Vec::with_capacity(ids.len());
    for &id in ids {
        match client.fetch_document(id)? {
            Some(raw) => documents.push(Document::from_raw(raw, registry, with_content)),
            None => result.add_message(CmdMessage::warning(format!(
                "Could not fetch document {}",
                id
            ))),
        }
    }
    Ok(result.with_documents(documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::InMemoryTransport;

    fn doc_body(id: u32, title: &str) -> String {
        format!(
            r#"{{"id": {}, "title": "{}", "correspondent": null, "document_type": null,
                 "tags": [], "created": "2020-01-01", "added": "",
                 "archive_serial_number": null, "content": "text of {}"}}"#,
            id, title, id
        )
    }

    #[test]
    fn fetches_in_caller_order() {
        let transport = InMemoryTransport::new()
            .with_response(
                "https://paper.example/api/documents/300/",
                200,
                &doc_body(300, "C"),
            )
            .with_response(
                "https://paper.example/api/documents/200/",
                200,
                &doc_body(200, "A"),
            );
        let client = RemoteClient::new(transport, "https://paper.example/api");

        let result = run(&client, &Registry::default(), &[300, 200], true).unwrap();
        let ids: Vec<u32> = result.documents.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![300, 200]);
        assert_eq!(result.documents[0].content.as_deref(), Some("text of 300"));
    }

    #[test]
    fn missing_document_warns_and_is_absent() {
        let transport = InMemoryTransport::new().with_response(
            "https://paper.example/api/documents/1/",
            200,
            &doc_body(1, "A"),
        );
        let client = RemoteClient::new(transport, "https://paper.example/api");

        let result = run(&client, &Registry::default(), &[1, 999], false).unwrap();
        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.messages.len(), 1);
        // content was not requested this time
        assert_eq!(result.documents[0].content, None);
    }
}
