//! GraphQL entity types
//!
//! Every type wraps a store row and exposes an explicit list of fields; row
//! attributes without a resolver here are invisible to clients. Media fields
//! resolve to absolute URLs or rendition descriptors, and back-references go
//! through the request's loaders.

mod catalog;
mod company;
mod content;
mod media;

pub use catalog::{Category, CertificateType, Industry, NavigationType, Product, Rosetter, User};
pub use company::Company;
pub use content::{Contact, Representative, SuccessStory, TradeShow};
pub use media::{Brochure, Certificate, Image, SocialResponsibility, Video};
