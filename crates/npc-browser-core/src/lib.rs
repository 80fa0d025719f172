// Library root: the fetch-normalize-filter-publish pipeline plus the host
// port traits it is wired through.

pub mod browser;
pub mod campaigns;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod host;
pub mod model;
pub mod publish;
pub mod session;
pub mod template;
