//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, TrialRegistry)
//! but are themselves concrete structs, not traits.

mod lookup;
mod registry;
mod trials;

pub use lookup::{
    HeatLevel, PhaseBreakdown, StudyListing, SweepEntry, SweepOutcome, SweepTicket,
    TrialLookupService,
};
pub use registry::{
    LoadReport, RegisteredTree, RegistryLoader, SkippedDocument, TreeRegistry, GRAPH_SUFFIX,
    MANIFEST_FILE,
};
pub use trials::TrialTableService;
