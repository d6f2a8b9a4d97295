// Pagination engine: segmentation, page fitting, oversized-entry and list splitting.
// Measurement is synchronous; callers on the async side go through `paginate_blocking`.

pub mod block;
pub mod entry_split;
pub mod font_metrics;
pub mod list_split;
pub mod measure;
pub mod page;
pub mod page_fill;
pub mod paginate;
pub mod segment;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the API consumed by the handlers, export, and startup.
pub use measure::{Measurer, TextMetricsMeasurer};
pub use page::{ContentRoot, ContinuationHeader, Page, PageSetup, PaginationOptions};
pub use page_fill::{analyze_pages, PageFillAnalysis};
pub use paginate::{paginate_blocking, Fallback, LayoutError};
