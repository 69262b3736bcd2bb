//! Input validation shared by the mutations
//!
//! Syntax and bounds come from `validator` derives on the input objects;
//! [`Checks`] folds those together with the directory-specific rules (slugs,
//! company types, country codes, string arrays, typed ids) into one error
//! list.

use chrono::{Datelike, Utc};
use validator::{Validate, ValidationError, ValidationErrors};

use super::errors::{Failure, MutationError, Outcome};
use crate::store::{Record, Repo, StoreResult};
use crate::types::{country_name, GlobalId, JsonArray};

pub const COMPANY_TYPES: &[&str] = &[
    "manufacturer",
    "wholesaler",
    "distributor",
    "exporter",
    "importer",
    "retailer",
    "service_provider",
];

/// Accumulated validation errors of one input
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<MutationError>,
}

impl Checks {
    /// Start from the input's derived `validator` rules
    pub fn of<T: Validate>(input: &T) -> Self {
        let mut checks = Self::default();
        if let Err(errors) = input.validate() {
            checks.errors = from_validation(&errors);
        }
        checks
    }

    pub fn push(&mut self, error: MutationError) {
        self.errors.push(error);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Non-blank required text, trimmed
    pub fn required(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(value) if !value.is_empty() => Some(value.to_string()),
            _ => {
                self.push(MutationError::required(field));
                None
            }
        }
    }

    pub fn slug(&mut self, field: &str, value: &str) {
        if !is_slug(value) {
            self.push(MutationError::invalid(
                field,
                "Enter a valid slug consisting of lowercase letters, numbers and hyphens.",
            ));
        }
    }

    pub fn company_type(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            if !COMPANY_TYPES.contains(&value) {
                self.push(MutationError::invalid(field, format!("'{}' is not a valid company type.", value)));
            }
        }
    }

    /// Upper-cased country codes, rejecting unknown ones
    pub fn countries(&mut self, field: &str, codes: &[String]) -> Vec<String> {
        let mut valid = Vec::with_capacity(codes.len());
        for code in codes {
            let code = code.trim().to_ascii_uppercase();
            if country_name(&code).is_some() {
                valid.push(code);
            } else {
                self.push(MutationError::invalid(field, format!("'{}' is not a known country code.", code)));
            }
        }
        valid
    }

    pub fn country(&mut self, field: &str, code: Option<&str>) -> Option<String> {
        let code = code.map(str::trim).filter(|c| !c.is_empty())?;
        self.countries(field, &[code.to_string()]).pop()
    }

    /// Items of an untyped array, all of which must be strings
    pub fn strings(&mut self, field: &str, array: Option<&JsonArray>) -> Option<Vec<String>> {
        match array.map(JsonArray::strings) {
            None => None,
            Some(Ok(items)) => Some(items),
            Some(Err(index)) => {
                self.push(MutationError::invalid(field, format!("Item {} is not a string.", index)));
                None
            }
        }
    }

    /// Primary key of a global id that must name rows of type `T`
    pub fn pk<T: Record>(&mut self, field: &str, id: Option<&GlobalId>) -> Option<i64> {
        match id.map(GlobalId::pk_of::<T>) {
            None => None,
            Some(Ok(pk)) => Some(pk),
            Some(Err(e)) => {
                self.push(MutationError::invalid(field, e.to_string()));
                None
            }
        }
    }

    pub fn year(&mut self, field: &str, year: Option<i32>) {
        if let Some(year) = year {
            let latest = Utc::now().year() + 1;
            if !(1800..=latest).contains(&year) {
                self.push(MutationError::invalid(field, format!("Year must be between 1800 and {}.", latest)));
            }
        }
    }

    pub fn finish(self) -> Outcome<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Failure::Rejected(self.errors))
        }
    }
}

/// Primary key of an id argument, `INVALID` on `id` when it names another type
pub fn pk<T: Record>(id: &GlobalId) -> Result<i64, MutationError> {
    id.pk_of::<T>().map_err(|e| MutationError::invalid("id", e.to_string()))
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "url" => "Enter a valid URL.".to_string(),
        "email" => "Enter a valid email address.".to_string(),
        "length" => "Ensure this value has a valid length.".to_string(),
        "range" => "Ensure this value is within the allowed range.".to_string(),
        other => format!("Invalid value ({}).", other),
    }
}

fn from_validation(errors: &ValidationErrors) -> Vec<MutationError> {
    let mut out = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            out.push(MutationError::invalid(&field.to_string(), describe(error)));
        }
    }
    // field_errors() is a hash map
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// URL-safe slug: lowercase ASCII letters, digits and single hyphens
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

pub fn is_slug(text: &str) -> bool {
    !text.is_empty()
        && text.len() <= 255
        && !text.starts_with('-')
        && !text.ends_with('-')
        && text.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// `base`, or `base-2`, `base-3`, ... whichever is still free
pub async fn unique_slug<T: Record>(repo: &Repo<T>, base: &str) -> StoreResult<String> {
    let base = if base.is_empty() { T::TYPE_NAME.to_ascii_lowercase() } else { base.to_string() };
    if repo.get_by_slug(&base).await?.is_none() {
        return Ok(base);
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if repo.get_by_slug(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Whether a row other than `id` already holds `slug`
pub async fn slug_taken<T: Record>(repo: &Repo<T>, slug: &str, id: i64) -> StoreResult<bool> {
    Ok(repo.get_by_slug(slug).await?.map_or(false, |existing| existing.id() != id))
}

/// Trimmed optional text; blank clears the field
pub fn text(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Overwrite optional text when the input carries it
pub fn assign_text(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *slot = text(value);
    }
}

/// Position after the current last item
pub fn next_sort_order(existing: impl Iterator<Item = i32>) -> i32 {
    existing.max().map_or(0, |last| last.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::errors::ErrorCode;
    use crate::store::{Company, Contact, Store};

    #[derive(Validate)]
    struct Sample {
        #[validate(url)]
        website: Option<String>,
        #[validate(email)]
        email: String,
        #[validate(length(max = 3))]
        code: Option<String>,
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Acme Foods & Co."), "acme-foods-co");
        assert_eq!(slugify("  --Türk Tekstil--  "), "t-rk-tekstil");
        assert_eq!(slugify("!!!"), "");
        assert!(is_slug(&slugify("Acme Foods")));
        assert!(!is_slug("Acme"));
        assert!(!is_slug("-acme"));
    }

    #[test]
    fn test_derived_rules_become_invalid_errors() {
        let sample = Sample {
            website: Some("not a url".into()),
            email: "nobody".into(),
            code: Some("toolong".into()),
        };
        let checks = Checks::of(&sample);
        let fields: Vec<_> = checks.errors.iter().filter_map(|e| e.field.clone()).collect();
        assert_eq!(fields, vec!["code", "email", "website"]);
        assert!(checks.errors.iter().all(|e| e.code == ErrorCode::Invalid));

        let fine = Sample { website: None, email: "buyer@example.com".into(), code: None };
        assert!(Checks::of(&fine).is_clean());
    }

    #[test]
    fn test_required_and_company_type() {
        let mut checks = Checks::default();
        assert_eq!(checks.required("name", Some("  Acme ")), Some("Acme".to_string()));
        assert_eq!(checks.required("name", Some("   ")), None);
        checks.company_type("type", Some("manufacturer"));
        checks.company_type("type", Some("pirate"));
        let codes: Vec<_> = checks.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::Required, ErrorCode::Invalid]);
    }

    #[test]
    fn test_strings_rejects_non_string_items() {
        let mut checks = Checks::default();
        let ok = JsonArray(vec![serde_json::json!("organic"), serde_json::json!("organic")]);
        assert_eq!(checks.strings("tags", Some(&ok)), Some(vec!["organic".into(), "organic".into()]));
        assert!(checks.is_clean());

        let bad = JsonArray(vec![serde_json::json!({"nested": true})]);
        assert_eq!(checks.strings("tags", Some(&bad)), None);
        assert!(!checks.is_clean());
    }

    #[test]
    fn test_countries_and_typed_ids() {
        let mut checks = Checks::default();
        assert_eq!(checks.countries("export_countries", &["tr".into(), "de".into()]), vec!["TR", "DE"]);
        let small = ["LU", "mt", "IS", "AF"].map(String::from);
        assert_eq!(checks.countries("export_countries", &small), vec!["LU", "MT", "IS", "AF"]);
        assert!(checks.is_clean());
        assert!(checks.countries("export_countries", &["XX".into()]).is_empty());
        assert!(!checks.is_clean());

        let mut checks = Checks::default();
        assert_eq!(checks.pk::<Company>("company", Some(&GlobalId::of::<Company>(3))), Some(3));
        assert_eq!(checks.pk::<Company>("company", Some(&GlobalId::of::<Contact>(3))), None);
        assert!(!checks.is_clean());
    }

    #[tokio::test]
    async fn test_unique_slug_appends_counter() {
        let store = Store::in_memory();
        assert_eq!(unique_slug(&store.companies, "acme").await.unwrap(), "acme");
        store.companies.insert(Company::draft("Acme", "acme", None)).await.unwrap();
        store.companies.insert(Company::draft("Acme", "acme-2", None)).await.unwrap();
        assert_eq!(unique_slug(&store.companies, "acme").await.unwrap(), "acme-3");

        let first = store.companies.get_by_slug("acme").await.unwrap().unwrap();
        assert!(!slug_taken(&store.companies, "acme", first.id).await.unwrap());
        assert!(slug_taken(&store.companies, "acme", 0).await.unwrap());
        assert!(!slug_taken(&store.companies, "fresh", 0).await.unwrap());
    }

    #[test]
    fn test_next_sort_order() {
        assert_eq!(next_sort_order([].into_iter()), 0);
        assert_eq!(next_sort_order([3, 1, 7].into_iter()), 8);
        assert_eq!(next_sort_order([i32::MAX].into_iter()), i32::MAX);
    }
}
