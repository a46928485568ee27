#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod entities;
pub mod fields;
pub mod framework;
pub mod pagination;
pub mod repository;
pub mod storage;
pub mod upload;
