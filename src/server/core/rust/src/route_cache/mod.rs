/* src/server/core/rust/src/route_cache/mod.rs */

// Per-session static path store. Each dynamic route's getStaticPaths() runs at
// most once per session; concurrent first requests share one in-flight call.

mod cache;
mod entry;
mod paginate;
mod static_paths;


pub use cache::RouteCache;
pub use entry::{Diagnostic, RouteCacheEntry, StaticPathEntry};
pub(crate) use paginate::PAGE_PARAM;
pub use paginate::{PaginateOptions, StaticPathsContext, paginate};
pub use static_paths::call_get_static_paths;
