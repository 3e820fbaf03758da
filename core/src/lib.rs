//! Discovery, capture and topology engines of lanscope.

pub mod capture;
pub mod discovery;
pub mod resolver;
pub mod topology;
