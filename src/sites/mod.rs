//! Site registry: per-publisher search configuration
//!
//! Each supported publisher is described by a [`SiteProfile`]: which
//! [`Strategy`] fetches its search page, how multi-word keywords are joined,
//! the search URL template, and where the article links sit in the response.
//! Every per-site difference is data in this table; the crawl loop itself has
//! no per-site branches.
//!
//! # Example
//!
//! ```
//! use press_trawl::sites::{SiteRegistry, TimeFilter};
//!
//! let registry = SiteRegistry::builtin();
//! let nypost = registry.profile("nypost").unwrap();
//! let keyword = nypost.encode_keyword("gun policy");
//! assert_eq!(
//!     nypost.search_url(2, &keyword, &TimeFilter::unbounded()),
//!     "https://nypost.com/search/gun+policy/page/2/"
//! );
//! ```

mod profile;
mod registry;
mod template;
mod time_filter;

pub use profile::{ContentLocator, JsonItems, SiteProfile, Strategy};
pub use registry::SiteRegistry;
pub use template::{UrlTemplate, PLACEHOLDERS};
pub use time_filter::TimeFilter;
