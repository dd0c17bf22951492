//! schema-compare
//!
//! Checks that an ORM's logical model matches the structure of a real
//! database, catching drift that would otherwise only show up at runtime as
//! a missing column, a wrong type or a broken foreign key.
//!
//! The comparison runs in two stages:
//!
//! - **Stage 1** walks the logical model and looks up every mapped entity,
//!   property, key, foreign key and index in the physical model.
//! - **Stage 2** walks the physical model and reports tables, columns and
//!   indexes that nothing in the logical model accounts for. By default it
//!   only runs once Stage 1 is clean.
//!
//! Results are a tree of [`CompareLog`] records. Each difference renders as
//! one line, and those lines parse back into [`IgnoreRule`]s so known
//! differences can be suppressed.
//!
//! # Example
//!
//! ```ignore
//! use schema_compare::{CompareConfig, SchemaComparer};
//!
//! let mut config = CompareConfig::new();
//! config.ignore_these_errors(
//!     "DIFFERENT: Book->Property 'Price', column type. Expected = decimal(9,2), found = money",
//! )?;
//!
//! let mut comparer = SchemaComparer::new(config);
//! if comparer.compare(&[&model], &database)? {
//!     eprintln!("{}", comparer.errors_text());
//! }
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod ignore;
pub mod literal;
pub mod log;
pub mod model;
pub mod normalize;
pub mod provider;

pub use compare::{
    ComparePhase, SchemaComparer, Stage1Comparer, Stage1Output, Stage2Comparer, Stage2Output,
};
pub use config::{CompareConfig, TableFilter};
pub use error::{CompareError, CompareResult};
pub use ignore::{IgnoreList, IgnoreRule, RuleValue};
pub use log::{
    CompareAttribute, CompareLog, CompareState, CompareType, all_errors, all_results_indented,
};
pub use model::{
    ClrType, DatabaseColumn, DatabaseForeignKey, DatabaseIndex, DatabaseModel,
    DatabasePrimaryKey, DatabaseTable, DefaultValue, DeleteBehavior, EntityForeignKey,
    EntityIndex, EntityKey, EntityMapping, EntityProperty, EntityType, LogicalModel,
    ReferentialAction, RelationKind, TargetKind, ValueGenerated,
};
pub use normalize::NameMatch;
pub use provider::{
    DatabaseEngine, DatabaseModelFactory, FactoryOptions, ProviderRegistry, SchemaSnapshot,
    SnapshotFactory,
};
