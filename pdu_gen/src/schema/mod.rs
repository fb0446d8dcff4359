pub mod catalog;
pub mod file;
pub mod model;
pub mod order;
pub mod resolver;


pub use catalog::PrimitiveType;
pub use file::{SchemaLoader, load_alias_table, parse_schema_file};
pub use model::{
    AttrIndex, Attribute, BitField, ClassDecl, ElementKind, EnumDecl, FieldKind, InitialValue,
    ListLength, PadWidth, SchemaModel, StorageType,
};
pub use order::{EmissionOrderPlanner, EmissionOrdering};
pub use resolver::{CrossReferenceResolver, LiteralFormat, ResolvedInitialValue, ResolvedSchema};
