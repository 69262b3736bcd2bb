//! End-to-end scenarios executed against the schema over the in-memory store

use async_graphql::Request;
use chrono::{DateTime, Utc};
use company_directory_graphql::{
    auth::{ADMIN, MANAGE_COMPANIES},
    build_schema,
    media::BaseUri,
    scoped_request,
    store::{self, Store},
    AppConfig, DirectorySchema, GlobalId, Viewer,
};
use serde_json::{json, Value};

struct Harness {
    store: Store,
    schema: DirectorySchema,
}

impl Harness {
    fn new() -> Self {
        let store = Store::in_memory();
        let schema = build_schema(store.clone(), &AppConfig::default());
        Self { store, schema }
    }

    async fn run(&self, viewer: Viewer, query: &str) -> Value {
        let base = BaseUri::new("http://testserver", "/media/");
        let request = scoped_request(Request::new(query), &self.store, viewer, base);
        let response = self.schema.execute(request).await;
        assert!(response.errors.is_empty(), "unexpected errors: {:?}", response.errors);
        response.data.into_json().unwrap()
    }

    async fn company(&self, name: &str, owner: i64, published: bool) -> store::Company {
        let mut row = store::Company::draft(name, name.to_lowercase(), Some(owner));
        row.is_active = published;
        row.is_published = published;
        self.store.companies.insert(row).await.unwrap()
    }
}

fn gid<T: store::Record>(id: i64) -> String {
    GlobalId::of::<T>(id).encode()
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

const COMPANY_FIELDS: &str = "company { id isActive isPublished creationDate publicationDate updateDate } errors { field code message }";

#[tokio::test]
async fn create_activate_and_publish_company() {
    let h = Harness::new();
    let owner = Viewer::user(1);

    let created = h
        .run(
            owner.clone(),
            &format!(
                r#"mutation {{ companyCreate(input: {{name: "Acme", slug: "acme", type: "manufacturer"}}) {{ {} }} }}"#,
                COMPANY_FIELDS
            ),
        )
        .await;
    let payload = &created["companyCreate"];
    assert_eq!(payload["errors"], json!([]));
    assert_eq!(payload["company"]["isActive"], json!(false));
    assert_eq!(payload["company"]["isPublished"], json!(false));
    let id = payload["company"]["id"].as_str().unwrap().to_string();

    let activated = h
        .run(owner.clone(), &format!(r#"mutation {{ companyActivate(id: "{}") {{ {} }} }}"#, id, COMPANY_FIELDS))
        .await;
    assert_eq!(activated["companyActivate"]["company"]["isActive"], json!(true));

    let published = h
        .run(owner.clone(), &format!(r#"mutation {{ companyPublish(id: "{}") {{ {} }} }}"#, id, COMPANY_FIELDS))
        .await;
    let company = &published["companyPublish"]["company"];
    assert_eq!(company["isActive"], json!(true));
    assert_eq!(company["isPublished"], json!(true));
    assert!(timestamp(&company["creationDate"]) <= timestamp(&company["publicationDate"]));

    let row = h.store.companies.get_by_slug("acme").await.unwrap().unwrap();
    assert_eq!(row.owner_id, Some(1));
}

#[tokio::test]
async fn duplicate_slug_is_reported_as_unique() {
    let h = Harness::new();
    let query = r#"mutation { companyCreate(input: {name: "Acme", slug: "acme"}) { company { id } errors { field code } } }"#;

    let first = h.run(Viewer::user(1), query).await;
    assert_eq!(first["companyCreate"]["errors"], json!([]));

    let second = h.run(Viewer::user(2), query).await;
    assert_eq!(second["companyCreate"]["company"], Value::Null);
    assert_eq!(second["companyCreate"]["errors"], json!([{"field": "slug", "code": "UNIQUE"}]));
}

#[tokio::test]
async fn nested_company_fetches_are_batched() {
    let h = Harness::new();
    let acme = h.company("Acme", 1, true).await;
    let mut ids = Vec::new();
    for n in 0..5 {
        let row = store::Certificate {
            id: 0,
            company_id: acme.id,
            name: format!("Certificate {}", n),
            description: None,
            sort_order: n,
            certificate: None,
            type_id: None,
            created_at: Utc::now(),
        };
        ids.push(h.store.certificates.insert(row).await.unwrap().id);
    }

    let fields: Vec<String> = ids
        .iter()
        .enumerate()
        .map(|(n, id)| format!(r#"c{}: certificate(id: "{}") {{ company {{ name }} }}"#, n, gid::<store::Certificate>(*id)))
        .collect();
    let query = format!("{{ {} }}", fields.join(" "));

    let before = h.store.companies.lookups();
    let staff = Viewer::user(9).with_capability(MANAGE_COMPANIES);
    let data = h.run(staff, &query).await;

    for n in 0..5 {
        assert_eq!(data[format!("c{}", n)]["company"]["name"], json!("Acme"));
    }
    assert_eq!(h.store.companies.lookups() - before, 1);
}

#[tokio::test]
async fn anonymous_child_listing_fetches_companies_once() {
    let h = Harness::new();
    let acme = h.company("Acme", 1, true).await;
    let draft = h.company("Draft", 2, false).await;
    for (n, company) in [&acme, &acme, &acme, &acme, &acme, &draft, &draft].into_iter().enumerate() {
        let row = store::Certificate {
            id: 0,
            company_id: company.id,
            name: format!("Certificate {}", n),
            description: None,
            sort_order: n as i32,
            certificate: None,
            type_id: None,
            created_at: Utc::now(),
        };
        h.store.certificates.insert(row).await.unwrap();
    }

    let before = h.store.companies.lookups();
    let data = h
        .run(Viewer::anonymous(), "{ certificates(first: 10) { totalCount edges { node { company { name } } } } }")
        .await;

    let edges = data["certificates"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 5);
    assert!(edges.iter().all(|edge| edge["node"]["company"]["name"] == json!("Acme")));
    assert_eq!(data["certificates"]["totalCount"], json!(5));
    assert_eq!(h.store.companies.lookups() - before, 1);
}

#[tokio::test]
async fn sort_order_after_the_largest_value_does_not_overflow() {
    let h = Harness::new();
    let acme = h.company("Acme", 1, true).await;
    let id = gid::<store::Company>(acme.id);
    let create = |sort: &str| {
        format!(
            r#"mutation {{ certificateCreate(input: {{company: "{}", name: "ISO"{}}}) {{ certificate {{ sortOrder }} errors {{ code }} }} }}"#,
            id, sort
        )
    };

    let top = h.run(Viewer::user(1), &create(", sortOrder: 2147483647")).await;
    assert_eq!(top["certificateCreate"]["certificate"]["sortOrder"], json!(i32::MAX));

    let next = h.run(Viewer::user(1), &create("")).await;
    assert_eq!(next["certificateCreate"]["errors"], json!([]));
    assert_eq!(next["certificateCreate"]["certificate"]["sortOrder"], json!(i32::MAX));
}

#[tokio::test]
async fn bulk_contact_delete_reports_forbidden_items() {
    let h = Harness::new();
    let mine = h.company("Mine", 1, true).await;
    let theirs = h.company("Theirs", 2, true).await;

    let contact = |company: &store::Company| store::Contact {
        id: 0,
        company_id: company.id,
        seller_id: company.owner_id,
        user_id: Some(5),
        name: "Buyer".into(),
        email: "buyer@example.com".into(),
        country: None,
        subject: "Prices".into(),
        contact: "Please send a price list.".into(),
        submission_date: Utc::now(),
        ask_for_reference: false,
        status: store::MessageStatus::New,
        message_type: store::MessageType::Inquiry,
    };
    let a = h.store.contacts.insert(contact(&mine)).await.unwrap();
    let b = h.store.contacts.insert(contact(&theirs)).await.unwrap();
    let c = h.store.contacts.insert(contact(&mine)).await.unwrap();

    let (a_id, b_id, c_id) =
        (gid::<store::Contact>(a.id), gid::<store::Contact>(b.id), gid::<store::Contact>(c.id));
    let query = format!(
        r#"mutation {{ contactBulkDelete(ids: ["{}", "{}", "{}"]) {{ count errors {{ id code }} }} }}"#,
        a_id, b_id, c_id
    );
    let data = h.run(Viewer::user(1), &query).await;

    assert_eq!(data["contactBulkDelete"]["count"], json!(2));
    assert_eq!(data["contactBulkDelete"]["errors"], json!([{"id": b_id, "code": "FORBIDDEN"}]));
    assert!(h.store.contacts.get(a.id).await.unwrap().is_none());
    assert!(h.store.contacts.get(b.id).await.unwrap().is_some());
    assert!(h.store.contacts.get(c.id).await.unwrap().is_none());
}

#[tokio::test]
async fn logo_rendition_is_absolute() {
    let h = Harness::new();
    let mut row = store::Company::draft("Acme", "acme", Some(1));
    row.is_active = true;
    row.is_published = true;
    row.logo = Some("logos/acme.png".into());
    row.logo_alt = "Acme logo".into();
    h.store.companies.insert(row).await.unwrap();

    let data = h.run(Viewer::anonymous(), r#"{ company(slug: "acme") { logo(size: 256) { url alt size } } }"#).await;
    let logo = &data["company"]["logo"];
    assert!(logo["url"].as_str().unwrap().starts_with("http"));
    assert!(logo["url"].as_str().unwrap().ends_with("acme_thumbnail_256.png"));
    assert_eq!(logo["size"], json!(256));
    assert_eq!(logo["alt"], json!("Acme logo"));
}

#[tokio::test]
async fn success_story_tags_round_trip() {
    let h = Harness::new();
    let admin = Viewer::user(1).with_capability(ADMIN);

    let created = h
        .run(
            admin.clone(),
            r#"mutation { successStoryCreate(input: {title: "From Izmir", tags: ["organic", "turkey"]}) { successStory { id slug } errors { code } } }"#,
        )
        .await;
    let payload = &created["successStoryCreate"];
    assert_eq!(payload["errors"], json!([]));
    assert_eq!(payload["successStory"]["slug"], json!("from-izmir"));
    let id = payload["successStory"]["id"].as_str().unwrap();

    let fetched = h.run(admin, &format!(r#"{{ successStory(id: "{}") {{ tags }} }}"#, id)).await;
    assert_eq!(fetched["successStory"]["tags"], json!(["organic", "turkey"]));

    // inactive stories stay hidden from the public
    let public = h.run(Viewer::anonymous(), &format!(r#"{{ successStory(id: "{}") {{ tags }} }}"#, id)).await;
    assert_eq!(public["successStory"], Value::Null);
}

#[tokio::test]
async fn unpublished_companies_are_visible_to_owner_only() {
    let h = Harness::new();
    h.company("Public", 1, true).await;
    h.company("Draft", 2, false).await;
    let query = "{ companies(sortBy: {field: NAME}) { totalCount edges { node { name } } } }";

    let anonymous = h.run(Viewer::anonymous(), query).await;
    assert_eq!(anonymous["companies"]["edges"], json!([{"node": {"name": "Public"}}]));

    let owner = h.run(Viewer::user(2), query).await;
    assert_eq!(owner["companies"]["totalCount"], json!(2));

    let draft = h.run(Viewer::user(3), r#"{ company(slug: "draft") { name } }"#).await;
    assert_eq!(draft["company"], Value::Null);

    let mine = h.run(Viewer::user(2), "{ userCompanies { edges { node { name } } } }").await;
    assert_eq!(mine["userCompanies"]["edges"], json!([{"node": {"name": "Draft"}}]));
}

#[tokio::test]
async fn pagination_boundaries() {
    let h = Harness::new();
    for name in ["Alpha", "Beta", "Gamma"] {
        h.company(name, 1, true).await;
    }

    let empty = h.run(Viewer::anonymous(), "{ companies(first: 0) { edges { cursor } pageInfo { hasNextPage } } }").await;
    assert_eq!(empty["companies"]["edges"], json!([]));
    assert_eq!(empty["companies"]["pageInfo"]["hasNextPage"], json!(true));

    let all = h
        .run(Viewer::anonymous(), "{ companies(first: 10) { edges { cursor } pageInfo { hasNextPage endCursor } } }")
        .await;
    assert_eq!(all["companies"]["edges"].as_array().unwrap().len(), 3);
    assert_eq!(all["companies"]["pageInfo"]["hasNextPage"], json!(false));
    let last = all["companies"]["pageInfo"]["endCursor"].as_str().unwrap();

    let after = h
        .run(
            Viewer::anonymous(),
            &format!(r#"{{ companies(first: 10, after: "{}") {{ edges {{ cursor }} pageInfo {{ hasNextPage }} }} }}"#, last),
        )
        .await;
    assert_eq!(after["companies"]["edges"], json!([]));
    assert_eq!(after["companies"]["pageInfo"]["hasNextPage"], json!(false));

    let unknown = h
        .run(
            Viewer::anonymous(),
            &format!(r#"{{ companies(filter: {{industry: "{}"}}) {{ totalCount }} }}"#, gid::<store::Industry>(999)),
        )
        .await;
    assert_eq!(unknown["companies"]["totalCount"], json!(0));
}

#[tokio::test]
async fn company_state_transitions_are_idempotent() {
    let h = Harness::new();
    let owner = Viewer::user(1);
    let acme = h.company("Acme", 1, false).await;
    let id = gid::<store::Company>(acme.id);

    let noop = h
        .run(owner.clone(), &format!(r#"mutation {{ companyUpdate(id: "{}", input: {{}}) {{ {} }} }}"#, id, COMPANY_FIELDS))
        .await;
    assert_eq!(timestamp(&noop["companyUpdate"]["company"]["updateDate"]), acme.update_date);

    let rejected = h
        .run(owner.clone(), &format!(r#"mutation {{ companyPublish(id: "{}") {{ {} }} }}"#, id, COMPANY_FIELDS))
        .await;
    assert_eq!(rejected["companyPublish"]["errors"][0]["field"], json!("is_active"));
    assert_eq!(rejected["companyPublish"]["errors"][0]["code"], json!("INVALID"));

    h.run(owner.clone(), &format!(r#"mutation {{ companyActivate(id: "{}") {{ {} }} }}"#, id, COMPANY_FIELDS))
        .await;
    let first = h
        .run(owner.clone(), &format!(r#"mutation {{ companyPublish(id: "{}") {{ {} }} }}"#, id, COMPANY_FIELDS))
        .await;
    let second = h
        .run(owner.clone(), &format!(r#"mutation {{ companyPublish(id: "{}") {{ {} }} }}"#, id, COMPANY_FIELDS))
        .await;
    assert_eq!(
        first["companyPublish"]["company"]["publicationDate"],
        second["companyPublish"]["company"]["publicationDate"]
    );

    let deactivated = h
        .run(owner, &format!(r#"mutation {{ companyDeactivate(id: "{}") {{ {} }} }}"#, id, COMPANY_FIELDS))
        .await;
    let company = &deactivated["companyDeactivate"]["company"];
    assert_eq!(company["isActive"], json!(false));
    assert_eq!(company["isPublished"], json!(false));
    assert_ne!(company["publicationDate"], Value::Null);
}

#[tokio::test]
async fn company_delete_cascades_and_checks_permission() {
    let h = Harness::new();
    let acme = h.company("Acme", 1, true).await;
    let id = gid::<store::Company>(acme.id);

    let created = h
        .run(
            Viewer::user(1),
            &format!(
                r#"mutation {{ certificateCreate(input: {{company: "{}", name: "ISO 9001"}}) {{ certificate {{ id sortOrder }} errors {{ code }} }} }}"#,
                id
            ),
        )
        .await;
    assert_eq!(created["certificateCreate"]["certificate"]["sortOrder"], json!(0));

    let denied = h
        .run(Viewer::user(2), &format!(r#"mutation {{ companyDelete(id: "{}") {{ deletedId errors {{ code }} }} }}"#, id))
        .await;
    assert_eq!(denied["companyDelete"]["errors"], json!([{"code": "FORBIDDEN"}]));

    let deleted = h
        .run(Viewer::user(1), &format!(r#"mutation {{ companyDelete(id: "{}") {{ deletedId errors {{ code }} }} }}"#, id))
        .await;
    assert_eq!(deleted["companyDelete"]["deletedId"], json!(id));
    assert!(h.store.companies.get(acme.id).await.unwrap().is_none());
    assert!(h.store.certificates.for_company(acme.id).await.unwrap().is_empty());
}
