use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::{Entity, EntityKind, RawEntity};
use crate::registry::Registry;
use crate::remote::{RemoteClient, Transport};

/// Refresh one entity kind from the server and list it.
///
/// The registry snapshot for the kind is replaced wholesale; readers
/// never see a partially refreshed set.
pub fn run<T: Transport>(
    client: &RemoteClient<T>,
    registry: &mut Registry,
    kind: EntityKind,
) -> Result<CmdResult> {
    let raw: Vec<RawEntity> = client.fetch_all(kind.endpoint())?;
    let entities: Vec<Entity> = raw
        .into_iter()
        .map(|r| Entity::from_raw(r, kind))
        .collect();
    registry.replace(kind, entities.clone());
    Ok(CmdResult::default().with_entities(entities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identifier;
    use crate::remote::memory::InMemoryTransport;

    #[test]
    fn refresh_populates_registry_for_resolution() {
        let transport = InMemoryTransport::new().with_response(
            "https://paper.example/api/tags/",
            200,
            r#"{"results": [{"id": 4, "name": "bank", "slug": "bank", "document_count": 12}],
                "next": null}"#,
        );
        let client = RemoteClient::new(transport, "https://paper.example/api");
        let mut registry = Registry::new();

        let result = run(&client, &mut registry, EntityKind::Tag).unwrap();
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].name, "bank");
        assert_eq!(
            registry
                .resolve(EntityKind::Tag, &Identifier::Name("bank".into()))
                .unwrap(),
            4
        );
    }
}
