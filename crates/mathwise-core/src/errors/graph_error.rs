/// State-graph configuration errors, raised by `compile`.
///
/// These are the only errors allowed to reach a caller of the pipeline; they
/// are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("graph has no entry point")]
    NoEntryPoint,

    #[error("node declared twice: {0}")]
    DuplicateNode(String),

    #[error("'{referenced_by}' references unknown node '{node}'")]
    UnknownNode { node: String, referenced_by: String },

    #[error("conditional edge from '{from}' has no route for label '{label}'")]
    UnroutedLabel { from: String, label: String },

    #[error("node '{0}' declares more than one outgoing edge")]
    ConflictingEdges(String),

    #[error("node name '{0}' is reserved")]
    ReservedName(String),
}
