//! Application use cases / business logic

pub mod classify;
pub mod publish;
pub mod resolve;

pub use classify::{RuleClassifier, TaxonomyConstraint, classify};
pub use publish::{PublishError, PublishedTaxonomy, TaxonomyPublisher};
pub use resolve::{ResolverConfig, TaxonomyResolver};
