use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use parser::{
    types::{
        self,
        BaseType,
        DirectiveDefinition,
        DirectiveLocation,
        FieldDefinition,
        OperationType,
        SchemaDefinition,
        ServiceDocument,
        Type,
        TypeDefinition,
        TypeSystemDefinition,
    },
    Positioned,
};
use tracing::instrument;
use value::Name;

use crate::SchemaError;

#[derive(Debug, Eq, PartialEq)]
pub struct MetaField {
    pub name: Name,
    pub ty: Type,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

#[derive(Debug, Eq, PartialEq)]
pub struct MetaType {
    pub name: Name,
    pub kind: TypeKind,
    pub implements: IndexSet<Name>,
    pub fields: IndexMap<Name, MetaField>,
    pub possible_types: IndexSet<Name>,
}

impl MetaType {
    fn new(name: Name, kind: TypeKind) -> Self {
        Self {
            name,
            kind,
            implements: IndexSet::new(),
            fields: IndexMap::new(),
            possible_types: IndexSet::new(),
        }
    }

    #[inline]
    pub fn field_by_name(&self, name: &str) -> Option<&MetaField> {
        self.fields.get(name)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, TypeKind::Enum | TypeKind::Scalar)
    }

    /// Returns `true` if every value of `ty` is also a value of this type.
    ///
    /// A fragment whose type condition is assignable from the enclosing type
    /// never narrows the selection and can be inlined.
    pub fn is_assignable_from(&self, ty: &MetaType) -> bool {
        if self.name == ty.name {
            return true;
        }

        match self.kind {
            TypeKind::Interface => ty.implements.contains(&self.name) || self.possible_types.contains(&ty.name),
            TypeKind::Union => ty.kind == TypeKind::Object && self.possible_types.contains(&ty.name),
            _ => false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MetaDirective {
    pub name: Name,
    pub locations: Vec<DirectiveLocation>,
}

impl MetaDirective {
    #[inline]
    pub fn has_location(&self, location: DirectiveLocation) -> bool {
        self.locations.contains(&location)
    }
}

/// The type system an operation is rewritten against. Read-only once built.
#[derive(Debug, Default)]
pub struct ComposedSchema {
    pub query_type: Option<Name>,
    pub mutation_type: Option<Name>,
    pub subscription_type: Option<Name>,
    pub types: IndexMap<Name, MetaType>,
    pub directives: HashMap<Name, MetaDirective>,
}

impl ComposedSchema {
    #[instrument(err(Debug), skip(document), level = "trace")]
    pub fn parse(document: &str) -> Result<ComposedSchema, SchemaError> {
        Self::new(parser::parse_schema(document)?)
    }

    pub fn new(document: ServiceDocument) -> Result<ComposedSchema, SchemaError> {
        let mut schema = ComposedSchema::default();

        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Schema(definition) => schema.set_root_types(definition.node),
                TypeSystemDefinition::Type(definition) => {
                    let extend = definition.node.extend;
                    let ty = convert_type_definition(definition.node);
                    match schema.types.get_mut(&ty.name) {
                        Some(existing) if extend => {
                            existing.implements.extend(ty.implements);
                            existing.fields.extend(ty.fields);
                            existing.possible_types.extend(ty.possible_types);
                        },
                        _ => {
                            schema.types.insert(ty.name.clone(), ty);
                        },
                    }
                },
                TypeSystemDefinition::Directive(definition) => {
                    let directive = convert_directive_definition(definition.node);
                    schema.directives.insert(directive.name.clone(), directive);
                },
            }
        }

        schema.add_builtins()?;
        schema.check_root_types()?;
        schema.add_introspection_fields();
        schema.compute_possible_types();
        Ok(schema)
    }

    #[inline]
    pub fn query_type(&self) -> &str {
        self.query_type.as_ref().map(|name| name.as_str()).unwrap_or("Query")
    }

    #[inline]
    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_ref().map(|name| name.as_str())
    }

    #[inline]
    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_ref().map(|name| name.as_str())
    }

    /// Returns the root type serving the given operation type.
    pub fn root_type(&self, operation_type: OperationType) -> Option<&MetaType> {
        let name = match operation_type {
            OperationType::Query => Some(self.query_type()),
            OperationType::Mutation => self.mutation_type(),
            OperationType::Subscription => self.subscription_type(),
        };
        name.and_then(|name| self.types.get(name))
    }

    #[inline]
    pub fn type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// Returns the named type wrapped by `ty`.
    #[inline]
    pub fn get_type(&self, ty: &Type) -> Option<&MetaType> {
        match &ty.base {
            BaseType::Named(name) => self.types.get(name.as_str()),
            BaseType::List(ty) => self.get_type(ty),
        }
    }

    #[inline]
    pub fn directive(&self, name: &str) -> Option<&MetaDirective> {
        self.directives.get(name)
    }

    fn set_root_types(&mut self, definition: SchemaDefinition) {
        if let Some(query) = definition.query {
            self.query_type = Some(query.node);
        }
        if let Some(mutation) = definition.mutation {
            self.mutation_type = Some(mutation.node);
        }
        if let Some(subscription) = definition.subscription {
            self.subscription_type = Some(subscription.node);
        }
    }

    /// Adds the builtin scalars, directives and introspection types the
    /// document does not define itself.
    fn add_builtins(&mut self) -> Result<(), SchemaError> {
        for definition in parser::parse_schema(include_str!("builtin.graphql"))?.definitions {
            match definition {
                TypeSystemDefinition::Type(definition) => {
                    let ty = convert_type_definition(definition.node);
                    self.types.entry(ty.name.clone()).or_insert(ty);
                },
                TypeSystemDefinition::Directive(definition) => {
                    let directive = convert_directive_definition(definition.node);
                    self.directives.entry(directive.name.clone()).or_insert(directive);
                },
                TypeSystemDefinition::Schema(_) => {},
            }
        }
        Ok(())
    }

    fn check_root_types(&mut self) -> Result<(), SchemaError> {
        if self.mutation_type.is_none() && self.types.contains_key("Mutation") {
            self.mutation_type = Some(Name::new("Mutation"));
        }
        if self.subscription_type.is_none() && self.types.contains_key("Subscription") {
            self.subscription_type = Some(Name::new("Subscription"));
        }

        let type_name = self.query_type();
        match self.types.get(type_name) {
            None => Err(SchemaError::MissingQueryType {
                type_name: type_name.to_string(),
            }),
            Some(ty) if ty.kind != TypeKind::Object => Err(SchemaError::RootTypeNotObject {
                type_name: type_name.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn add_introspection_fields(&mut self) {
        let type_name = self.query_type().to_string();
        if let Some(query_type) = self.types.get_mut(type_name.as_str()) {
            for (field, ty, nullable) in [("__type", "__Type", true), ("__schema", "__Schema", false)] {
                let name = Name::new(field);
                query_type.fields.insert(name.clone(), MetaField {
                    name,
                    ty: Type {
                        base: BaseType::Named(Name::new(ty)),
                        nullable,
                    },
                });
            }
        }
    }

    /// Interfaces are possible for every object implementing them, unions
    /// already carry their members.
    fn compute_possible_types(&mut self) {
        let mut possible_types: HashMap<Name, IndexSet<Name>> = HashMap::new();
        for ty in self.types.values().filter(|ty| ty.kind == TypeKind::Object) {
            for implement in &ty.implements {
                possible_types
                    .entry(implement.clone())
                    .or_default()
                    .insert(ty.name.clone());
            }
        }
        for (name, types) in possible_types {
            if let Some(ty) = self.types.get_mut(&name) {
                ty.possible_types = types;
            }
        }
    }
}

fn convert_type_definition(definition: TypeDefinition) -> MetaType {
    let name = definition.name.node;
    match definition.kind {
        types::TypeKind::Scalar => MetaType::new(name, TypeKind::Scalar),
        types::TypeKind::Enum(_) => MetaType::new(name, TypeKind::Enum),
        types::TypeKind::InputObject(_) => MetaType::new(name, TypeKind::InputObject),
        types::TypeKind::Object(object) => MetaType {
            implements: object.implements.into_iter().map(|name| name.node).collect(),
            fields: convert_fields(object.fields),
            ..MetaType::new(name, TypeKind::Object)
        },
        types::TypeKind::Interface(interface) => MetaType {
            implements: interface.implements.into_iter().map(|name| name.node).collect(),
            fields: convert_fields(interface.fields),
            ..MetaType::new(name, TypeKind::Interface)
        },
        types::TypeKind::Union(union_type) => MetaType {
            possible_types: union_type.members.into_iter().map(|name| name.node).collect(),
            ..MetaType::new(name, TypeKind::Union)
        },
    }
}

fn convert_fields(fields: Vec<Positioned<FieldDefinition>>) -> IndexMap<Name, MetaField> {
    fields
        .into_iter()
        .map(|field| {
            let name = field.node.name.node;
            (name.clone(), MetaField {
                name,
                ty: field.node.ty.node,
            })
        })
        .collect()
}

fn convert_directive_definition(definition: DirectiveDefinition) -> MetaDirective {
    MetaDirective {
        name: definition.name.node,
        locations: definition.locations.into_iter().map(|location| location.node).collect(),
    }
}
