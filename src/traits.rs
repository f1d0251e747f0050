mod entities;
mod provider;
mod roadmap;
mod state_store;

pub use entities::*;
pub use provider::*;
pub use roadmap::*;
pub use state_store::*;

/// Import this in modules that call store-trait methods on concrete types.
///
/// `StateStore` is a facade (supertrait) used for trait objects, but Rust still
/// requires the defining trait to be in scope for method-call syntax.
pub mod store_prelude {
    #![allow(unused_imports)]
    pub use super::{DashboardStore, ProgressStore, ReflectionStore, RoadmapStore, StateStore, UserStore};
}
