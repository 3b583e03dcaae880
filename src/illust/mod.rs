//! Illust records, listing sources and the query builder.
//!
//! - [`illust`] - The [`Illust`] record and its derived attributes
//! - [`query`] - [`Q`] predicates, [`OrderBy`] keys and the [`Query`] pipeline
//! - [`source`] - The [`IllustStream`] listing type and its constructors
//!
//! Talking to the gallery API itself (authentication, endpoints) is left to
//! an external client; it only has to hand over its results as an
//! [`IllustStream`], typically through [`paginate`].

pub mod illust;
pub mod query;
pub mod source;

pub use illust::{AgeLimit, Illust, IllustType};
pub use query::{sort_illusts, Field, OrderBy, Query, Q};
pub use source::{chain, from_iter, paginate, until, IllustStream, Page};
