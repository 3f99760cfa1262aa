//! Core library for the steel-ingest command line application.
//!
//! Supplier workbooks are read under [`steel::ingest::io`], split into tables
//! by [`steel::ingest::segment`], turned into order-info and metadata records
//! by the per-supplier extractors in [`steel::ingest::sources`], and joined on
//! their content-derived material identifier in [`steel::ingest::merge`].
//! [`steel::ingest::pipeline`] strings the stages together.

pub mod steel;

pub use steel::ingest::{
    IngestError, Result, descriptor, error, identity, io, merge, model, pipeline, segment,
    sources,
};
