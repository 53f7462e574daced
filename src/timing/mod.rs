/*!
 * Time resolution for annotations.
 *
 * - `resolver`: concrete intervals through reference chains
 * - `siblings`: sibling order from predecessor pointers
 * - `cache`: memoized intervals for one loaded document
 * - `format`: time display helpers
 */

pub mod cache;
pub mod format;
pub mod resolver;
pub mod siblings;

pub use cache::IntervalCache;
pub use format::{format_min_sec, format_timestamp, parse_timestamp, TimeFormat};
pub use resolver::TimeResolver;
pub use siblings::SiblingOrderer;
