//! GraphQL authentication context and the axum handler
//!
//! Authentication itself happens upstream. The auth middleware forwards the
//! resolved identity in headers:
//! - `x-user-id`: numeric id of the signed-in user
//! - `x-user-capabilities`: comma-separated capability names
//!
//! The handler turns those into a [`Viewer`], attaches it together with the
//! request origin and a fresh set of loaders to the GraphQL request, and
//! executes it.

use std::collections::HashSet;

use async_graphql::{Context, Request, Response};
use axum::{extract::Extension, http::HeaderMap, Json};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::dataloaders::Loaders;
use crate::media::BaseUri;
use crate::server::AppState;
use crate::store::{Company, Store};

/// Capability granting write access to every company profile
pub const MANAGE_COMPANIES: &str = "manage_companies";

/// Capability required by catalog and moderation mutations
pub const ADMIN: &str = "admin";

/// Who is asking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<i64>,
    pub capabilities: HashSet<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: i64) -> Self {
        Self { user_id: Some(user_id), capabilities: HashSet::new() }
    }

    pub fn with_capability(mut self, capability: &str) -> Self {
        self.capabilities.insert(capability.to_string());
        self
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self { user_id: extract_user_id(headers), capabilities: extract_capabilities(headers) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn has(&self, capability: &str) -> bool {
        // admin implies every other capability
        self.capabilities.contains(capability) || self.capabilities.contains(ADMIN)
    }

    pub fn is_admin(&self) -> bool {
        self.capabilities.contains(ADMIN)
    }

    /// Staff see unpublished profiles and every contact message
    pub fn is_staff(&self) -> bool {
        self.has(MANAGE_COMPANIES)
    }

    pub fn owns(&self, company: &Company) -> bool {
        self.user_id.is_some() && company.owner_id == self.user_id
    }

    pub fn can_manage_company(&self, company: &Company) -> bool {
        self.owns(company) || self.is_staff()
    }

    pub fn can_see_company(&self, company: &Company) -> bool {
        company.is_published || self.can_manage_company(company)
    }
}

/// Correlation id of the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

/// Extract user_id from x-user-id header
pub fn extract_user_id(headers: &HeaderMap) -> Option<i64> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
}

/// Extract capabilities from x-user-capabilities header
pub fn extract_capabilities(headers: &HeaderMap) -> HashSet<String> {
    headers
        .get("x-user-capabilities")
        .and_then(|v| v.to_str().ok())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Origin the client used, falling back to the configured public URL
pub fn extract_base_uri(headers: &HeaderMap, media: &MediaConfig) -> BaseUri {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    match header("x-forwarded-host").or_else(|| header("host")) {
        Some(host) if !host.is_empty() => {
            let scheme = header("x-forwarded-proto")
                .and_then(|p| p.split(',').next())
                .map(str::trim)
                .unwrap_or("http");
            BaseUri::new(format!("{}://{}", scheme, host), media.url_prefix.clone())
        }
        _ => BaseUri::from_config(media),
    }
}

/// Attach the per-request context a GraphQL execution needs
///
/// Loaders are created here and dropped with the request, so their caches
/// never outlive a single response.
pub fn scoped_request(request: Request, store: &Store, viewer: Viewer, base: BaseUri) -> Request {
    request.data(viewer).data(base).data(Loaders::new(store))
}

/// GraphQL handler with viewer context injection
///
/// # Example
///
/// ```rust,no_run
/// use axum::{Router, routing::post, Extension};
/// use company_directory_graphql::{auth::graphql_handler, server::AppState};
///
/// # fn example(state: AppState) {
/// let app: Router = Router::new()
///     .route("/graphql", post(graphql_handler))
///     .layer(Extension(state));
/// # }
/// ```
pub async fn graphql_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    req: Json<Request>,
) -> Json<Response> {
    let viewer = Viewer::from_headers(&headers);
    let base = extract_base_uri(&headers, &state.config.media);
    let request_id = Uuid::new_v4();

    let span = tracing::info_span!(
        "graphql",
        %request_id,
        operation = req.operation_name.as_deref().unwrap_or("anonymous"),
        user_id = ?viewer.user_id,
    );

    let request = scoped_request(req.0, &state.store, viewer, base).data(RequestId(request_id));
    let response = state.schema.execute(request).instrument(span).await;

    Json(response)
}

/// Get the viewer from GraphQL context; anonymous when none was attached
pub fn get_viewer(ctx: &Context<'_>) -> Viewer {
    ctx.data_opt::<Viewer>().cloned().unwrap_or_default()
}

/// Get the request correlation id, minting one outside a handler
pub fn get_request_id(ctx: &Context<'_>) -> Uuid {
    ctx.data_opt::<RequestId>().map(|id| id.0).unwrap_or_else(Uuid::new_v4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_viewer_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("42"));
        headers.insert("x-user-capabilities", HeaderValue::from_static("manage_companies, ,export"));

        let viewer = Viewer::from_headers(&headers);
        assert_eq!(viewer.user_id, Some(42));
        assert!(viewer.is_staff());
        assert!(viewer.has("export"));
        assert!(!viewer.is_admin());
    }

    #[test]
    fn test_garbage_user_id_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("not-a-number"));
        assert_eq!(Viewer::from_headers(&headers), Viewer::anonymous());
    }

    #[test]
    fn test_admin_implies_other_capabilities() {
        let admin = Viewer::user(1).with_capability(ADMIN);
        assert!(admin.has(MANAGE_COMPANIES));
        assert!(admin.is_staff());
    }

    #[test]
    fn test_company_access() {
        let mut company = Company::draft("Acme", "acme", Some(7));
        assert!(Viewer::user(7).can_manage_company(&company));
        assert!(!Viewer::user(8).can_see_company(&company));
        assert!(!Viewer::anonymous().owns(&company));

        company.is_published = true;
        assert!(Viewer::anonymous().can_see_company(&company));
        assert!(!Viewer::user(8).can_manage_company(&company));
    }

    #[test]
    fn test_base_uri_prefers_forwarded_headers() {
        let media = MediaConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("internal:8000"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("directory.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(extract_base_uri(&headers, &media).origin(), "https://directory.example.com");

        assert_eq!(extract_base_uri(&HeaderMap::new(), &media).origin(), "http://localhost:8000");
    }
}
