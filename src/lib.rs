//! Pallet loading optimizer.
//!
//! Assigns box-shaped items to as few fixed-size pallets as possible while
//! respecting weight limits, support and balance, and keeping the pallets
//! dense:
//!
//! - **Decoders**: deterministic shelf and maximal-rectangles packers that
//!   turn an item ordering into closed pallets.
//! - **Tiling**: a layer solver for homogeneous product families; families
//!   that pack densely enough get dedicated pallets.
//! - **Fitness**: a multi-term score whose physical violation penalties
//!   dominate every reward, with explicit versioned weight snapshots.
//! - **Genetic Algorithm (GA)**: searches item orderings (and optionally
//!   orientations) with OX crossover, elitism, stagnation shocks, local
//!   search and adaptive reweighting.
//! - **Planner**: the full pipeline from items to a validated plan.
//!
//! # Example
//!
//! ```
//! use u_palletize::fitness::StackingModel;
//! use u_palletize::model::{ContainerProfile, Item};
//! use u_palletize::planner::{Planner, PlannerConfig};
//! use u_palletize::validate::validate_plan;
//!
//! let items: Vec<Item> = (0..20)
//!     .map(|i| {
//!         Item::new(format!("crate-{i}"), 40.0, 50.0, 60.0)
//!             .with_product_code("CRATE")
//!             .with_weight(12.0)
//!     })
//!     .collect();
//!
//! let planner = Planner::new(PlannerConfig::new(ContainerProfile::default()));
//! let plan = planner.plan(&items).unwrap();
//! assert_eq!(plan.pallet_count(), 2);
//! validate_plan(&plan, &items, StackingModel::Supported).unwrap();
//! ```

pub mod decoder;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod model;
pub mod planner;
pub mod tiling;
pub mod validate;

pub use error::{Error, Result};
