//! Serving the ARDF index: the `ardf.list` method and paged reads of the
//! `ardf://index` resource.

use super::{ProtocolRouter, RouterError};
use crate::application::protocol::{ArdfListing, ContentBlock, ReadResourceResult};
use crate::application::registry::{DescriptorFilter, filter};
use crate::constants::{ARDF_INDEX_URI, ARDF_MEDIA_TYPE, ARDF_VERSION};
use crate::domain::Index;
use chrono::{SecondsFormat, Utc};

impl ProtocolRouter {
    pub fn ardf_list(&self, criteria: &DescriptorFilter) -> ArdfListing {
        let index = filter(&self.registry.build_index(), criteria);
        ArdfListing {
            index_uri: ARDF_INDEX_URI.to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: ARDF_VERSION.to_string(),
            total: index.len(),
            items: index.items,
        }
    }

    pub(super) fn read_index(
        &self,
        criteria: &DescriptorFilter,
        cursor: Option<&str>,
    ) -> Result<ReadResourceResult, RouterError> {
        let index = filter(&self.registry.build_index(), criteria);
        let page = paginate(index, cursor, self.settings.page_size)?;
        let body = serde_json::to_string(&page)
            .map_err(|err| RouterError::invalid_response(ARDF_INDEX_URI, err.to_string()))?;
        Ok(ReadResourceResult {
            contents: vec![ContentBlock::text(body)],
            mime_type: Some(ARDF_MEDIA_TYPE.to_string()),
            description: Some("ARDF index".to_string()),
        })
    }
}

/// Cuts one page out of `index`. The cursor is the offset of the first item
/// on the page; the returned cursor is set while items remain.
fn paginate(
    index: Index,
    cursor: Option<&str>,
    page_size: Option<usize>,
) -> Result<Index, RouterError> {
    let total = index.len();
    let start = match cursor.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => 0,
        Some(raw) => match raw.parse::<usize>() {
            Ok(offset) if offset <= total => offset,
            _ => {
                return Err(RouterError::invalid_argument(
                    ARDF_INDEX_URI,
                    format!("unknown cursor '{raw}'"),
                ));
            }
        },
    };

    let Some(size) = page_size else {
        let mut items = index.items;
        items.drain(..start);
        return Ok(Index::new(items));
    };

    let end = start.saturating_add(size).min(total);
    let items = index.items.into_iter().skip(start).take(end - start).collect();
    Ok(Index {
        items,
        cursor: (end < total).then(|| end.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::DescriptorRegistry;
    use crate::domain::{Descriptor, ResourceType};
    use std::sync::Arc;

    fn index(count: usize) -> Index {
        Index::new(
            (0..count)
                .map(|n| Descriptor::new(format!("tool_{n}"), ResourceType::Tool))
                .collect(),
        )
    }

    fn ids(page: &Index) -> Vec<&str> {
        page.items.iter().map(|d| d.resource_id.as_str()).collect()
    }

    #[test]
    fn pages_follow_cursors_to_the_end() {
        let first = paginate(index(5), None, Some(2)).expect("first page");
        assert_eq!(ids(&first), vec!["tool_0", "tool_1"]);
        assert_eq!(first.cursor.as_deref(), Some("2"));

        let last = paginate(index(5), Some("4"), Some(2)).expect("last page");
        assert_eq!(ids(&last), vec!["tool_4"]);
        assert!(last.cursor.is_none());
    }

    #[test]
    fn no_page_size_returns_everything() {
        let page = paginate(index(3), None, None).expect("whole index");
        assert_eq!(page.len(), 3);
        assert!(page.cursor.is_none());
    }

    #[test]
    fn unknown_cursors_are_rejected() {
        for cursor in ["abc", "9", "-1"] {
            assert!(matches!(
                paginate(index(3), Some(cursor), Some(2)),
                Err(RouterError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn generated_at_is_utc_rfc3339() {
        let registry = DescriptorRegistry::new(Default::default()).expect("empty registry");
        let router = ProtocolRouter::new(Arc::new(registry), Default::default());
        let listing = router.ardf_list(&DescriptorFilter::default());
        assert!(listing.generated_at.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&listing.generated_at).is_ok());
        assert_eq!(listing.total, 0);
        assert_eq!(listing.version, ARDF_VERSION);
    }
}
