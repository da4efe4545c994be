use super::{ArgumentTarget, Fragment, Head, Item, Operation, OperationKind, QueryError, Selection};
use crate::{
    DISCRIMINATOR,
    schema::{FieldDescriptor, TargetKind, TypeDescriptor},
};
use serde_json::Value;

const HEAD_OPERATIONS: &[OperationKind] = &[OperationKind::Argument, OperationKind::On];
const FIELD_LIST_OPERATIONS: &[OperationKind] = &[OperationKind::FragmentRef];
const FRAGMENT_KEY_OPERATIONS: &[OperationKind] = &[OperationKind::Fragment];

/// The kind of document to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
}

impl OperationType {
    fn keyword(self) -> &'static str {
        match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
        }
    }
}

/// Compiles a selection tree and its fragments into a `query{...}` document.
pub fn compile(selections: &[Selection], fragments: &[Fragment]) -> Result<String, QueryError> {
    Compiler::new(OperationType::Query).compile(selections, fragments)
}

/// Compiles a selection tree and its fragments into a `mutation{...}` document.
///
/// Root types are named by their mutation root; everything nested uses query names.
pub fn compile_mutation(
    selections: &[Selection],
    fragments: &[Fragment],
) -> Result<String, QueryError> {
    Compiler::new(OperationType::Mutation).compile(selections, fragments)
}

/// Walks a selection tree depth-first, left to right, writing the document as it goes.
///
/// The output always follows the input order, so compiling the same tree twice yields the same
/// text.
#[derive(Debug)]
pub struct Compiler {
    operation: OperationType,
    out: String,
}

impl Compiler {
    pub fn new(operation: OperationType) -> Self {
        Self {
            operation,
            out: String::new(),
        }
    }

    pub fn compile(
        mut self,
        selections: &[Selection],
        fragments: &[Fragment],
    ) -> Result<String, QueryError> {
        if selections.is_empty() {
            return Err(QueryError::InvalidQuerySpecification(
                "a document needs at least one root selection".to_string(),
            ));
        }

        self.out.push_str(self.operation.keyword());
        self.out.push('{');
        for selection in selections {
            self.root_selection(selection)?;
        }
        self.out.push('}');

        for fragment in fragments {
            self.fragment(fragment)?;
        }

        tracing::debug!(
            document = %self.out,
            "compiled {} document",
            self.operation.keyword()
        );

        Ok(self.out)
    }

    fn root_selection(&mut self, selection: &Selection) -> Result<(), QueryError> {
        match &selection.head {
            Head::Type(descriptor) => {
                let root = self.root_name(descriptor)?;
                self.out.push_str(root);
            }
            Head::Operation(operation) => self.head_operation(operation, true)?,
            Head::Field(field) => {
                return Err(invalid(format!(
                    "field '{}' cannot be the root of a selection",
                    field.name()
                )));
            }
            Head::Name(name) => {
                return Err(invalid(format!(
                    "'{name}' cannot be the root of a selection, use a declared type"
                )));
            }
        }

        self.field_list(&selection.items)
    }

    fn nested_selection(&mut self, selection: &Selection) -> Result<(), QueryError> {
        match &selection.head {
            Head::Field(field) => {
                let name = object_field_name(field)?;
                self.out.push_str(name);
            }
            Head::Operation(operation) => self.head_operation(operation, false)?,
            Head::Type(descriptor) => {
                return Err(invalid(format!(
                    "type '{}' cannot head a nested selection, use an object field, an argument or an inline fragment",
                    descriptor.name()
                )));
            }
            Head::Name(name) => {
                return Err(invalid(format!(
                    "'{name}' cannot head a nested selection, use an object field, an argument or an inline fragment"
                )));
            }
        }

        self.field_list(&selection.items)
    }

    fn head_operation(&mut self, operation: &Operation, root: bool) -> Result<(), QueryError> {
        match operation {
            Operation::Argument { target, arguments } => {
                let name = match target {
                    ArgumentTarget::Type(descriptor) if root => self.root_name(descriptor)?,
                    ArgumentTarget::Type(descriptor) => {
                        descriptor.query_root_name().ok_or_else(|| {
                            invalid(format!("type '{}' has no query root", descriptor.name()))
                        })?
                    }
                    ArgumentTarget::Field(field) if root => {
                        return Err(invalid(format!(
                            "field '{}' cannot be the root of a selection",
                            field.name()
                        )));
                    }
                    ArgumentTarget::Field(field) => field.wire_query_name(),
                };

                self.out.push_str(name);
                self.arguments(arguments);
            }
            Operation::On(descriptor) => {
                self.out.push_str("... on ");
                self.out.push_str(descriptor.typename());
            }
            operation => return Err(illegal(operation.kind(), HEAD_OPERATIONS)),
        }

        Ok(())
    }

    fn arguments(&mut self, arguments: &[(String, String)]) {
        self.out.push('(');
        for (index, (key, value)) in arguments.iter().enumerate() {
            if index > 0 {
                self.out.push(',');
            }
            self.out.push_str(key);
            self.out.push(':');
            // JSON string escaping matches GraphQL string literals.
            self.out.push_str(&Value::from(value.as_str()).to_string());
        }
        self.out.push(')');
    }

    fn field_list(&mut self, items: &[Item]) -> Result<(), QueryError> {
        if items.is_empty() {
            return Err(invalid("a field list cannot be empty".to_string()));
        }

        self.out.push('{');
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.out.push(',');
            }

            match item {
                Item::Field(field) => self.out.push_str(field.wire_query_name()),
                Item::Name(name) => self.out.push_str(name),
                Item::Selection(selection) => self.nested_selection(selection)?,
                Item::Operation(Operation::FragmentRef(name)) => {
                    self.out.push_str("...");
                    self.out.push_str(name);
                }
                Item::Operation(operation) => {
                    return Err(illegal(operation.kind(), FIELD_LIST_OPERATIONS));
                }
            }
        }
        self.out.push(',');
        self.out.push_str(DISCRIMINATOR);
        self.out.push('}');

        Ok(())
    }

    fn fragment(&mut self, fragment: &Fragment) -> Result<(), QueryError> {
        let Operation::Fragment { name, on } = &fragment.key else {
            return Err(illegal(fragment.key.kind(), FRAGMENT_KEY_OPERATIONS));
        };

        self.out.push_str("fragment ");
        self.out.push_str(name);
        self.out.push_str(" on ");
        self.out.push_str(on.typename());
        self.field_list(&fragment.items)
    }

    fn root_name<'d>(&self, descriptor: &'d TypeDescriptor) -> Result<&'d str, QueryError> {
        let root = match self.operation {
            OperationType::Query => descriptor.query_root_name(),
            OperationType::Mutation => descriptor.mutate_root_name(),
        };

        root.ok_or_else(|| {
            invalid(format!(
                "type '{}' has no {} root",
                descriptor.name(),
                self.operation.keyword()
            ))
        })
    }
}

fn object_field_name(field: &FieldDescriptor) -> Result<&str, QueryError> {
    match field.target() {
        TargetKind::ObjectReference(_) => Ok(field.wire_query_name()),
        _ => Err(invalid(format!(
            "field '{}' does not reference an object type and cannot have a field list",
            field.name()
        ))),
    }
}

fn invalid(reason: String) -> QueryError {
    QueryError::InvalidQuerySpecification(reason)
}

fn illegal(kind: OperationKind, allowed: &'static [OperationKind]) -> QueryError {
    QueryError::IllegalOperationContext { kind, allowed }
}
