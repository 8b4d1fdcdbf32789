//! Todo domain logic with no database or HTTP dependencies.
//!
//! The query pipeline is split into independent stages:
//! [`filter`] (what matches), [`sort`] (in which order), and
//! [`pagination`] (which slice), composed by [`engine::TodoQueryEngine`]
//! over any [`store::TodoStore`].

pub mod category;
pub mod engine;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod sort;
pub mod stats;
pub mod store;
pub mod todo;
pub mod types;
