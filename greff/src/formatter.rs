use colored::*;
use greff_core::{
    query::QueryError,
    response::{DecodeError, QueryResults},
    schema::{FieldDefault, FieldDescriptor, Registry, TargetKind, TypeDescriptor},
};
use serde_json::{Map, Value};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

/// Every declared type of a registry, in declaration order.
pub struct TypeList<'r>(pub &'r Registry);

/// One type together with the registry it was declared in, so its implementers can be listed.
pub struct TypeDescription<'r> {
    pub registry: &'r Registry,
    pub descriptor: &'r TypeDescriptor,
}

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<Value> for FormattedString {
    fn from(value: Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<QueryResults> for FormattedString {
    fn from(results: QueryResults) -> Self {
        if results.is_empty() {
            return FormattedString("No data returned.".yellow().to_string());
        }

        let data: Map<String, Value> = results
            .into_groups()
            .into_iter()
            .map(|(root, instances)| {
                let instances = instances.iter().map(|i| i.to_json()).collect();
                (root, Value::Array(instances))
            })
            .collect();

        FormattedString::from(Value::Object(data))
    }
}

impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        FormattedString(format!("{}\n\n'{:#}'", "Error:".red().bold(), err))
    }
}

impl From<QueryError> for FormattedString {
    fn from(err: QueryError) -> Self {
        FormattedString(format!(
            "{}\n\n'{}'",
            "Invalid Selection:".red().bold(),
            err
        ))
    }
}

impl From<DecodeError> for FormattedString {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::RemoteOperationFailed { errors, .. } => {
                let mut out = format!("{}\n", "Remote Operation Failed:".red().bold());
                for error in errors {
                    out.push_str(&format!("\n  - {}", error.message));
                    for location in error.locations {
                        out.push_str(&format!(
                            " {}",
                            format!("({}:{})", location.line, location.column).dimmed()
                        ));
                    }
                }
                FormattedString(out)
            }
            err => FormattedString(format!("{}\n\n'{}'", "Decode Failed:".red().bold(), err)),
        }
    }
}

impl From<TypeList<'_>> for FormattedString {
    fn from(TypeList(registry): TypeList<'_>) -> Self {
        let mut types = registry.types().peekable();

        if types.peek().is_none() {
            return FormattedString("No types declared.".yellow().to_string());
        }

        let described: Vec<String> = types
            .map(|descriptor| {
                FormattedString::from(TypeDescription {
                    registry,
                    descriptor,
                })
                .0
            })
            .collect();

        FormattedString(described.join("\n\n"))
    }
}

impl From<TypeDescription<'_>> for FormattedString {
    fn from(TypeDescription { registry, descriptor }: TypeDescription<'_>) -> Self {
        let mut out = format!("{} {}", "type".cyan(), descriptor.name().green());

        if descriptor.typename() != descriptor.name() {
            out.push_str(&format!(" {} {}", "as".cyan(), descriptor.typename().yellow()));
        }
        if let Some(parent) = descriptor.parent() {
            out.push_str(&format!(" {} {}", "extends".cyan(), parent.green()));
        }
        out.push_str(" {\n");

        if let Some(root) = descriptor.query_root_name() {
            out.push_str(&format!("  # query root: {}\n", root.purple()));
        }
        if let Some(root) = descriptor.mutate_root_name() {
            out.push_str(&format!("  # mutation root: {}\n", root.purple()));
        }
        for (typename, concrete) in registry.implementers(descriptor) {
            out.push_str(&format!(
                "  # implementer: {} -> {}\n",
                typename.yellow(),
                concrete.name().green()
            ));
        }

        for field in descriptor.fields() {
            out.push_str("  ");
            out.push_str(&field_line(field));
            out.push('\n');
        }
        out.push('}');

        FormattedString(out)
    }
}

fn field_line(field: &FieldDescriptor) -> String {
    let target = match field.target() {
        TargetKind::Scalar => "scalar".to_string(),
        TargetKind::ObjectReference(name) => name.clone(),
        TargetKind::RawMapping => "mapping".to_string(),
    };
    let target = if field.is_collection() {
        format!("[{target}]")
    } else {
        target
    };

    let mut line = format!("{}: {}", field.name(), target.yellow());

    if field.wire_query_name() != field.name() {
        line.push_str(&format!(" {} {}", "query".cyan(), field.wire_query_name()));
    }
    if field.wire_mutate_name() != field.name() {
        line.push_str(&format!(" {} {}", "mutate".cyan(), field.wire_mutate_name()));
    }
    if let FieldDefault::Value(default) = field.default_value() {
        line.push_str(&format!(" = {default}"));
    }
    if !field.is_mutable() {
        line.push_str(&format!(" {}", "(read-only)".dimmed()));
    }

    line
}
