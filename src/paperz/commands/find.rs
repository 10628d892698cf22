use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::SecondaryFilter;
use crate::model::{Document, RawDocument};
use crate::query::DocumentQuery;
use crate::registry::Registry;
use crate::remote::{RemoteClient, Transport};

/// Run a compound document query: compose, paginate, materialize, then
/// apply the client-side secondary filter.
pub fn run<T: Transport>(
    client: &RemoteClient<T>,
    registry: &Registry,
    query: &DocumentQuery,
    filter: &SecondaryFilter,
    with_content: bool,
) -> Result<CmdResult> {
    let (params, warnings) = query.to_params(registry);
    let endpoint = if params.is_empty() {
        "documents".to_string()
    } else {
        format!("documents/?{}", params.render())
    };

    let raw: Vec<RawDocument> = client.fetch_all(&endpoint)?;
    let documents: Vec<Document> = raw
        .into_iter()
        .map(|r| Document::from_raw(r, registry, with_content))
        .collect();
    let documents = filter.apply(documents);

    let mut result = CmdResult::default().with_documents(documents);
    for warning in warnings {
        result.add_message(CmdMessage::warning(warning));
    }
    Ok(result)
}
