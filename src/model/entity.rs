//! Input entity graph supplied by the parsing collaborator
//!
//! Classes reference other classes through typed references (fields,
//! parameters, return types, supertypes). The graph is read-only for the
//! duration of an analysis; everything derived from it is newly allocated.

use serde::{Deserialize, Serialize};

/// Kind of type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// Declared member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

/// How one class refers to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Field,
    Parameter,
    Return,
    Extends,
    Implements,
    Other,
}

/// An explicit typed reference that the collaborator resolved beyond
/// fields and signatures (local variables, casts, annotations, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeReference {
    pub kind: ReferenceKind,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldEntity {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntity {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodEntity {
    pub name: String,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterEntity>,
    /// Raw body text, when the collaborator kept it
    #[serde(default)]
    pub body: Option<String>,
    /// Explicit line count; falls back to the body's line count
    #[serde(default)]
    pub line_count: Option<u32>,
    /// Names of the owning class's fields this method reads or writes
    #[serde(default)]
    pub accessed_fields: Vec<String>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub annotations: Vec<String>,
}

impl MethodEntity {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn constructor(class_name: &str) -> Self {
        Self {
            name: class_name.to_string(),
            is_constructor: true,
            ..Default::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_annotation(mut self, annotation: &str) -> Self {
        self.annotations.push(annotation.to_string());
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn with_param(mut self, name: &str, type_name: &str) -> Self {
        self.parameters.push(ParameterEntity {
            name: name.to_string(),
            type_name: type_name.to_string(),
        });
        self
    }

    pub fn with_return(mut self, type_name: &str) -> Self {
        self.return_type = Some(type_name.to_string());
        self
    }

    pub fn with_lines(mut self, lines: u32) -> Self {
        self.line_count = Some(lines);
        self
    }

    pub fn accessing(mut self, fields: &[&str]) -> Self {
        self.accessed_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// `(T1,T2)` parameter-type signature
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self
            .parameters
            .iter()
            .map(|p| p.type_name.as_str())
            .collect();
        format!("({})", types.join(","))
    }

    /// Unique identifier within a project: `pkg.Class.name(T1,T2)`
    pub fn id(&self, class_qualified: &str) -> String {
        format!("{}.{}{}", class_qualified, self.name, self.signature())
    }

    /// Overload-insensitive key used to match call edges: `pkg.Class.name`
    pub fn key(&self, class_qualified: &str) -> String {
        format!("{}.{}", class_qualified, self.name)
    }

    /// Lines of code for this method
    pub fn loc(&self) -> u32 {
        self.line_count.unwrap_or_else(|| {
            self.body
                .as_deref()
                .map(|b| b.lines().filter(|l| !l.trim().is_empty()).count() as u32)
                .unwrap_or(0)
        })
    }

    pub fn is_main(&self) -> bool {
        self.name == "main" && self.is_static
    }

    /// Annotated `@Test`
    pub fn is_test(&self) -> bool {
        self.annotations.iter().any(|a| annotation_name(a) == "Test")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_package_private: bool,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldEntity>,
    #[serde(default)]
    pub methods: Vec<MethodEntity>,
    #[serde(default)]
    pub references: Vec<TypeReference>,
}

impl ClassEntity {
    pub fn new(package: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            package: package.to_string(),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_field(mut self, name: &str, type_name: &str) -> Self {
        self.fields.push(FieldEntity {
            name: name.to_string(),
            type_name: type_name.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn with_static_field(mut self, name: &str, type_name: &str) -> Self {
        self.fields.push(FieldEntity {
            name: name.to_string(),
            type_name: type_name.to_string(),
            is_static: true,
            ..Default::default()
        });
        self
    }

    pub fn with_annotation(mut self, annotation: &str) -> Self {
        self.annotations.push(annotation.to_string());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_package_private(mut self, is_package_private: bool) -> Self {
        self.is_package_private = is_package_private;
        self
    }

    pub fn with_method(mut self, method: MethodEntity) -> Self {
        self.methods.push(method);
        self
    }

    pub fn extending(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    pub fn implementing(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn referencing(mut self, kind: ReferenceKind, target: &str) -> Self {
        self.references.push(TypeReference {
            kind,
            target: target.to_string(),
        });
        self
    }

    /// Package-qualified identity (`pkg.Name`, or `Name` in the default package)
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    /// Named `*Test`/`*Tests`, or carrying a test annotation (`@SpringBootTest`, ...)
    pub fn is_test_class(&self) -> bool {
        self.name.ends_with("Test")
            || self.name.ends_with("Tests")
            || self
                .annotations
                .iter()
                .any(|a| annotation_name(a).contains("Test"))
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodEntity> {
        self.methods.iter().filter(|m| m.is_constructor)
    }

    /// Every raw type string this class mentions, tagged by reference kind
    pub fn raw_references(&self) -> Vec<(ReferenceKind, &str)> {
        let mut refs = Vec::new();
        for field in &self.fields {
            refs.push((ReferenceKind::Field, field.type_name.as_str()));
        }
        for method in &self.methods {
            if let Some(ret) = method.return_type.as_deref() {
                refs.push((ReferenceKind::Return, ret));
            }
            for param in &method.parameters {
                refs.push((ReferenceKind::Parameter, param.type_name.as_str()));
            }
        }
        if let Some(sup) = self.superclass.as_deref() {
            refs.push((ReferenceKind::Extends, sup));
        }
        for iface in &self.interfaces {
            refs.push((ReferenceKind::Implements, iface.as_str()));
        }
        for r in &self.references {
            refs.push((r.kind, r.target.as_str()));
        }
        refs
    }
}

/// A resolved call from one method to another (`pkg.Class.method`, an
/// optional `(..)` signature suffix is ignored)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    pub caller: String,
    pub callee: String,
}

impl MethodCall {
    pub fn new(caller: &str, callee: &str) -> Self {
        Self {
            caller: caller.to_string(),
            callee: callee.to_string(),
        }
    }
}

/// The complete input of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityGraph {
    #[serde(default)]
    pub classes: Vec<ClassEntity>,
    /// Method-level call graph; `None` when the collaborator did not resolve calls
    #[serde(default)]
    pub method_calls: Option<Vec<MethodCall>>,
}

impl EntityGraph {
    pub fn new(classes: Vec<ClassEntity>) -> Self {
        Self {
            classes,
            method_calls: None,
        }
    }

    pub fn with_calls(mut self, calls: Vec<MethodCall>) -> Self {
        self.method_calls = Some(calls);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }

    /// Parse a graph handed over as JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// `@org.junit.Test(timeout = 5)` -> `Test`
pub fn annotation_name(annotation: &str) -> &str {
    let bare = annotation.trim().trim_start_matches('@');
    let bare = bare.split('(').next().unwrap_or(bare).trim();
    bare.rsplit('.').next().unwrap_or(bare)
}

/// Strip a trailing `(..)` signature from a method identifier
pub fn method_key(id: &str) -> &str {
    match id.find('(') {
        Some(idx) => &id[..idx],
        None => id,
    }
}

/// Split a type expression into the identifiers it mentions.
///
/// `Map<String, List<Foo>>[]` yields `Map`, `String`, `List`, `Foo`.
/// Qualified names stay intact (`a.b.Foo`). Wildcards and `extends`/`super`
/// bounds keywords are dropped.
pub fn type_identifiers(type_name: &str) -> Vec<&str> {
    type_name
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '$'))
        .map(|s| s.trim_matches('.'))
        .filter(|s| !s.is_empty())
        .filter(|s| !matches!(*s, "extends" | "super" | "final" | "var"))
        .filter(|s| !s.starts_with(|c: char| c.is_ascii_digit()))
        .collect()
}
