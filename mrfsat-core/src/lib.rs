//! MRFSAT Core - Measurement Records and Feature Vectors
//!
//! This crate turns the output of the MRFSAT structural analyzer into
//! classifier input:
//! - **Schemas**: declared analyzer layouts ([`RecordSchema`]) and classifier
//!   inputs ([`FeatureSchema`]), validated once at startup
//! - **Parsing**: one analyzer line becomes a typed [`MeasurementRecord`]
//!   with its cluster ratios computed
//! - **Vectors**: records become finite, fixed-order [`FeatureVector`]s
//!
//! # Examples
//!
//! ```
//! use mrfsat_core::{FeatureSchema, FeatureVectorBuilder, RecordParser, RecordSchema};
//!
//! let parser = RecordParser::new(RecordSchema::canonical());
//! let builder =
//!     FeatureVectorBuilder::new(FeatureSchema::canonical(), parser.schema()).expect("valid schema");
//!
//! let record = parser
//!     .parse_line("inst1,3,10,50,20,0.5,0.1,2.0,0.3")
//!     .expect("well-formed line");
//! assert_eq!(record.ratio(), 0.3);
//!
//! let vector = builder.build(&record).expect("finite features");
//! assert_eq!(vector.len(), 5);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod label;
pub mod name;
pub mod parser;
pub mod record;
pub mod schema;
pub mod vector;

pub use error::{FeatureError, FeatureResult};
pub use label::Label;
pub use name::normalize_instance_name;
pub use parser::RecordParser;
pub use record::{DegenerateClusterPolicy, FieldValue, MeasurementRecord};
pub use schema::{DERIVED_FIELDS, FeatureSchema, FieldDescriptor, FieldKind, RecordSchema, fields};
pub use vector::{FeatureVector, FeatureVectorBuilder};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
