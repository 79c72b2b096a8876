use thiserror::Error;

/// Errors returned by tree mutation and by the [`Inflater`](crate::Inflater).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The description names a widget type that was never registered.
    #[error("unknown widget type \"{name}\"")]
    UnknownWidgetType { name: String },

    #[error("parse error at byte {offset}: {message}")]
    Parse { message: String, offset: usize },

    #[error("{widget}: missing required property \"{property}\"")]
    MissingProperty { widget: String, property: String },

    #[error("{widget}: invalid value \"{value}\" for property \"{property}\"")]
    InvalidProperty {
        widget: String,
        property: String,
        value: String,
    },

    #[error("widget is not added to a parent")]
    NoParent,

    #[error("widget already has a parent")]
    AlreadyParented,

    #[error("widget is not a container")]
    NotAContainer,

    /// Lists own their children through their items provider.
    #[error("children of a list are managed by its items provider")]
    ListChildren,

    #[error("widget is not a child of this container")]
    NotAChild,
}

pub type Result<T> = std::result::Result<T, Error>;
