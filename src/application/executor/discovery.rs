//! Index discovery: the ARDF index when the server has one, per-kind
//! listings otherwise.

use super::models::IndexSource;
use crate::application::client::{ClientError, ProtocolClient};
use crate::application::protocol::ReadResourceParams;
use crate::constants::ARDF_INDEX_URI;
use crate::domain::{Descriptor, Index, IndexError, ResourceType};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("ARDF index body is empty")]
    EmptyBody,
    #[error(transparent)]
    Parse(#[from] IndexError),
    #[error("ARDF index cursor '{cursor}' was returned twice")]
    CursorLoop { cursor: String },
}

#[derive(Debug, Clone)]
pub struct Discovery {
    pub source: IndexSource,
    pub items: Vec<Descriptor>,
}

pub async fn discover(client: &dyn ProtocolClient, use_ardf: bool) -> Discovery {
    if use_ardf {
        match read_index(client).await {
            Ok(index) => {
                debug!(items = index.len(), "Discovered capabilities from ARDF index");
                return Discovery {
                    source: IndexSource::Ardf,
                    items: index.items,
                };
            }
            Err(error) => {
                warn!(%error, "ARDF index unavailable; falling back to per-kind listings");
            }
        }
    }
    Discovery {
        source: IndexSource::Fallback,
        items: list_capabilities(client).await,
    }
}

/// Reads `ardf://index`, following cursors until the last page.
pub async fn read_index(client: &dyn ProtocolClient) -> Result<Index, DiscoveryError> {
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut seen = HashSet::new();

    loop {
        let params = ReadResourceParams::uri(ARDF_INDEX_URI).with_cursor(cursor.clone());
        let result = client.read_resource_page(params).await?;
        let body = result
            .first_text()
            .filter(|body| !body.trim().is_empty())
            .ok_or(DiscoveryError::EmptyBody)?;
        let page = Index::parse(body)?;
        items.extend(page.items);

        match page.cursor.filter(|next| !next.is_empty()) {
            Some(next) => {
                if !seen.insert(next.clone()) {
                    return Err(DiscoveryError::CursorLoop { cursor: next });
                }
                cursor = Some(next);
            }
            None => break,
        }
    }

    let index = Index::new(items);
    index.validate()?;
    Ok(index)
}

/// Degraded descriptors from `tools/list`, `prompts/list` and
/// `resources/list`, issued concurrently. A failing listing contributes
/// nothing.
pub async fn list_capabilities(client: &dyn ProtocolClient) -> Vec<Descriptor> {
    let (tools, prompts, resources) = tokio::join!(
        client.list_tools(),
        client.list_prompts(),
        client.list_resources()
    );

    let mut items = Vec::new();
    match tools {
        Ok(result) => items.extend(result.tools.into_iter().map(|tool| {
            Descriptor::new(tool.name, ResourceType::Tool).with_description(tool.description)
        })),
        Err(error) => warn!(%error, "tools/list failed during discovery"),
    }
    match prompts {
        Ok(result) => items.extend(result.prompts.into_iter().map(|prompt| {
            Descriptor::new(prompt.name, ResourceType::Prompt).with_description(prompt.description)
        })),
        Err(error) => warn!(%error, "prompts/list failed during discovery"),
    }
    match resources {
        Ok(result) => items.extend(
            result
                .resources
                .into_iter()
                .filter(|resource| resource.uri != ARDF_INDEX_URI)
                .map(|resource| {
                    let id = if resource.uri.trim().is_empty() {
                        resource.name
                    } else {
                        resource.uri
                    };
                    Descriptor::new(id, ResourceType::Resource)
                }),
        ),
        Err(error) => warn!(%error, "resources/list failed during discovery"),
    }
    debug!(items = items.len(), "Synthesized descriptors from listings");
    items
}
