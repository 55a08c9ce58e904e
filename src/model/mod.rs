//! Records passed between the pipeline stages
//!
//! - `Link`: one discovered listing entry, or the end-of-listing marker
//! - `Detail`: the resolved record for one `Link`

mod detail;
mod link;

pub use detail::Detail;
pub use link::Link;
