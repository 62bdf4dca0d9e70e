//! `#[derive(Queryable)]` for dynquery entities.
//!
//! The derive implements `dynquery_core::reflect::Reflect` and
//! `dynquery_core::reflect::Record` for a struct with named fields. Field
//! attributes:
//!
//! - `#[query(rename = "Name")]` exposes the member under another name
//! - `#[query(skip)]` hides the member from field paths; it keeps its
//!   default value in projections

use proc_macro::TokenStream;

mod queryable;

#[proc_macro_derive(Queryable, attributes(query))]
pub fn derive_queryable(input: TokenStream) -> TokenStream {
    queryable::derive_queryable(input.into()).into()
}
