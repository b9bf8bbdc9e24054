/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  data.json (file or URL)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse object-of-objects → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  Dataset  │ ◄──► │  schema   │  typed input keys, drift check
///   └──────────┘      └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  range predicates → matching IDs
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ aggregate │  per-property means, rounded to 3 places
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  CSV hand-off to the renderer
///   └──────────┘
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
