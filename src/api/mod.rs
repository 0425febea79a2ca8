//! Public facade: configuration, the exporter-backed composer, JSON
//! contracts and batch composition.

mod batch;
mod compose_config;
mod figure_composer;
mod json_contract;

pub use batch::compose_many;
pub use compose_config::ComposeConfig;
pub use figure_composer::FigureComposer;
pub use json_contract::{
    AutoLabels, COMPOSED_FIGURE_JSON_SCHEMA_V1, COMPOSITION_DECLARATION_JSON_SCHEMA_V1,
    ChildDeclaration, ComposedFigureJsonContractV1, CompositionDeclarationJsonContractV1,
    GridDeclaration, NodeDeclaration,
};
