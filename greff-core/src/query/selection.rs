use crate::schema::{FieldDescriptor, TypeDescriptor};
use std::{fmt, sync::Arc};

/// The kind of an [`Operation`] node, used to report where an operation is misplaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Argument,
    On,
    Fragment,
    FragmentRef,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Argument => "ARGUMENT",
            OperationKind::On => "ON",
            OperationKind::Fragment => "FRAGMENT",
            OperationKind::FragmentRef => "FRAGMENT_REF",
        };
        f.write_str(name)
    }
}

/// What an argument list is attached to.
#[derive(Debug, Clone)]
pub enum ArgumentTarget {
    Type(Arc<TypeDescriptor>),
    Field(Arc<FieldDescriptor>),
}

impl From<Arc<TypeDescriptor>> for ArgumentTarget {
    fn from(descriptor: Arc<TypeDescriptor>) -> Self {
        ArgumentTarget::Type(descriptor)
    }
}

impl From<Arc<FieldDescriptor>> for ArgumentTarget {
    fn from(descriptor: Arc<FieldDescriptor>) -> Self {
        ArgumentTarget::Field(descriptor)
    }
}

/// A tagged marker embedded in a selection tree.
#[derive(Debug, Clone)]
pub enum Operation {
    /// `<name>(<key>:"<value>",...)`. Values are always rendered as quoted strings, in the
    /// given order.
    Argument {
        target: ArgumentTarget,
        arguments: Vec<(String, String)>,
    },
    /// `... on <Typename>`: narrows the selection to one concrete variant.
    On(Arc<TypeDescriptor>),
    /// `fragment <name> on <Typename>`: only valid as the key of a [`Fragment`].
    Fragment {
        name: String,
        on: Arc<TypeDescriptor>,
    },
    /// `...<name>`: only valid inside a field list.
    FragmentRef(String),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Argument { .. } => OperationKind::Argument,
            Operation::On(_) => OperationKind::On,
            Operation::Fragment { .. } => OperationKind::Fragment,
            Operation::FragmentRef(_) => OperationKind::FragmentRef,
        }
    }
}

pub fn argument<K, V>(
    target: impl Into<ArgumentTarget>,
    arguments: impl IntoIterator<Item = (K, V)>,
) -> Operation
where
    K: Into<String>,
    V: Into<String>,
{
    Operation::Argument {
        target: target.into(),
        arguments: arguments
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    }
}

pub fn on(descriptor: Arc<TypeDescriptor>) -> Operation {
    Operation::On(descriptor)
}

pub fn fragment(name: impl Into<String>, on: Arc<TypeDescriptor>) -> Operation {
    Operation::Fragment {
        name: name.into(),
        on,
    }
}

pub fn fragment_ref(name: impl Into<String>) -> Operation {
    Operation::FragmentRef(name.into())
}

/// The first element of a selection: what the field list that follows applies to.
///
/// Which variants are legal depends on the position. A root selection takes a type (or an
/// argument/inline-fragment operation). A nested selection takes a field referencing an object
/// type (or an argument/inline-fragment operation).
#[derive(Debug, Clone)]
pub enum Head {
    Type(Arc<TypeDescriptor>),
    Field(Arc<FieldDescriptor>),
    Name(String),
    Operation(Operation),
}

impl From<Arc<TypeDescriptor>> for Head {
    fn from(descriptor: Arc<TypeDescriptor>) -> Self {
        Head::Type(descriptor)
    }
}

impl From<Arc<FieldDescriptor>> for Head {
    fn from(descriptor: Arc<FieldDescriptor>) -> Self {
        Head::Field(descriptor)
    }
}

impl From<Operation> for Head {
    fn from(operation: Operation) -> Self {
        Head::Operation(operation)
    }
}

impl From<&str> for Head {
    fn from(name: &str) -> Self {
        Head::Name(name.to_string())
    }
}

/// One member of a field list.
#[derive(Debug, Clone)]
pub enum Item {
    Field(Arc<FieldDescriptor>),
    /// A field given by its wire name.
    Name(String),
    Selection(Selection),
    Operation(Operation),
}

impl From<Arc<FieldDescriptor>> for Item {
    fn from(descriptor: Arc<FieldDescriptor>) -> Self {
        Item::Field(descriptor)
    }
}

impl From<&str> for Item {
    fn from(name: &str) -> Self {
        Item::Name(name.to_string())
    }
}

impl From<String> for Item {
    fn from(name: String) -> Self {
        Item::Name(name)
    }
}

impl From<Selection> for Item {
    fn from(selection: Selection) -> Self {
        Item::Selection(selection)
    }
}

impl From<Operation> for Item {
    fn from(operation: Operation) -> Self {
        Item::Operation(operation)
    }
}

/// A head followed by its field list.
#[derive(Debug, Clone)]
pub struct Selection {
    pub head: Head,
    pub items: Vec<Item>,
}

impl Selection {
    pub fn new(head: impl Into<Head>, items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            head: head.into(),
            items: items.into_iter().collect(),
        }
    }
}

/// A fragment definition appended after the root block.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Must be an [`Operation::Fragment`].
    pub key: Operation,
    pub items: Vec<Item>,
}

impl Fragment {
    pub fn new(key: Operation, items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            key,
            items: items.into_iter().collect(),
        }
    }
}
