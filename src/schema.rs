//! Schema assembly

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};

use crate::config::AppConfig;
use crate::media::{BaseUri, ImageAdjuster, ThumbnailAdjuster};
use crate::mutations::MutationRoot;
use crate::objects::NavigationType;
use crate::query::QueryRoot;
use crate::store::Store;

pub type DirectorySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the directory schema over `store`
///
/// Schema-wide data holds the store, the image adjuster and a fallback
/// [`BaseUri`] from configuration; the HTTP handler overrides the latter per
/// request with the origin the client used.
pub fn build_schema(store: Store, config: &AppConfig) -> DirectorySchema {
    let adjuster: Arc<dyn ImageAdjuster> = Arc::new(ThumbnailAdjuster::new(config.media.thumbnail_dir.clone()));

    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(store)
        .data(adjuster)
        .data(BaseUri::from_config(&config.media))
        .register_output_type::<NavigationType>()
        .limit_depth(config.graphql.depth_limit)
        .limit_complexity(config.graphql.complexity_limit)
        .finish()
}

/// SDL of the schema, for clients and schema registries
pub fn export_sdl(config: &AppConfig) -> String {
    build_schema(Store::in_memory(), config).sdl()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdl_exposes_whitelisted_names() {
        let sdl = export_sdl(&AppConfig::default());
        assert!(sdl.contains("scalar GlobalID"));
        assert!(sdl.contains("type CompanyConnection"));
        assert!(sdl.contains("enum MessageStatusEnum"));
        assert!(sdl.contains("enum NavigationType"));
        assert!(sdl.contains("companyBulkDelete"));
        assert!(sdl.contains("scalar Array"));
    }
}
