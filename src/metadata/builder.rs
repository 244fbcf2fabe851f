//! Turns the event stream of a [`ClassReader`] into a [`ClassInfo`].
//!
//! [`ClassInfoBuilder`] consumes [`ClassEvent`]s one at a time through [`ClassInfoBuilder::visit`]
//! and produces the sealed record with [`ClassInfoBuilder::finish`]. A record only comes into
//! existence once the whole class file has been walked; an error at any point leaves nothing
//! behind.
//!
//! # Parameter names
//!
//! Parameter names are recovered from the `LocalVariableTable` records that follow each method.
//! The table is keyed by local variable slot, so positions are derived from the descriptor:
//! non-static methods reserve slot 0 for `this`, and `long`/`double` parameters take two slots.
//! For `(JI)V` on an instance method the parameters live in slots 1 and 3.
//!
//! Records for slots beyond the parameters (ordinary locals) are ignored, as are duplicates for
//! a slot that already has a name. Without debug information each parameter is reported with an
//! empty name.

use log::trace;

use crate::{
    classfile::{
        class_descriptor, java_class_name, parse_field_descriptor, parse_method_descriptor,
        AccessFlags, ClassEvent, ClassReader, FieldConstant, MethodDescriptor, Primitive,
    },
    metadata::{
        class::{ClassInfo, ClassKind, ClassShape},
        hash::MemberHash,
        member::{FieldInfo, MethodInfo, MethodKind, CONSTRUCTOR_NAME, STATIC_INITIALIZER_NAME},
        repository::ResolutionContext,
    },
    Result,
};

/// Maps local variable slots to parameter positions for one method
struct ParameterNames {
    /// Indexed by slot; `None` for `this` and the upper half of wide parameters
    positions: Vec<Option<usize>>,
    names: Vec<Option<String>>,
}

impl ParameterNames {
    fn new(descriptor: &MethodDescriptor, is_static: bool) -> Self {
        let mut positions = Vec::with_capacity(descriptor.register_depth() + 1);
        if !is_static {
            positions.push(None);
        }
        for (position, param) in descriptor.params.iter().enumerate() {
            positions.push(Some(position));
            for _ in 1..param.register_width() {
                positions.push(None);
            }
        }

        ParameterNames {
            positions,
            names: vec![None; descriptor.params.len()],
        }
    }

    fn record(&mut self, index: u16, name: &str) {
        let Some(&Some(position)) = self.positions.get(usize::from(index)) else {
            return;
        };
        let slot = &mut self.names[position];
        if slot.is_none() {
            *slot = Some(name.to_string());
        }
    }

    fn finish(self) -> Vec<String> {
        self.names.into_iter().map(Option::unwrap_or_default).collect()
    }
}

/// A method whose local variable records may still be arriving
struct PendingMethod {
    method: MethodInfo,
    parameters: Option<ParameterNames>,
}

/// Incrementally assembles a [`ClassInfo`] from reader events
pub struct ClassInfoBuilder {
    context: ResolutionContext,
    collect_parameter_names: bool,
    shape: Option<ClassShape>,
    pending: Option<PendingMethod>,
    ended: bool,
}

impl ClassInfoBuilder {
    pub(crate) fn new(context: ResolutionContext, collect_parameter_names: bool) -> Self {
        ClassInfoBuilder {
            context,
            collect_parameter_names,
            shape: None,
            pending: None,
            ended: false,
        }
    }

    /// Create a builder for a record outside of any repository.
    ///
    /// The resulting record answers questions about its own shape, but every attempt to
    /// resolve a supertype fails with [`crate::Error::ScopeGone`].
    #[must_use]
    pub fn standalone(collect_parameter_names: bool) -> Self {
        Self::new(ResolutionContext::detached(), collect_parameter_names)
    }

    /// Parse `data` and build its record in one go
    pub(crate) fn build(
        data: &[u8],
        context: ResolutionContext,
        collect_parameter_names: bool,
    ) -> Result<ClassInfo> {
        let reader = ClassReader::new(data)?;
        let mut builder = ClassInfoBuilder::new(context, collect_parameter_names);
        reader.accept(&mut |event| builder.visit(event))?;
        builder.finish()
    }

    /// Consume one event.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for events out of order, duplicate members, or
    /// anything after [`ClassEvent::End`], and [`crate::Error::InvalidDescriptor`] for
    /// undecodable descriptors.
    pub fn visit(&mut self, event: ClassEvent<'_>) -> Result<()> {
        if self.ended {
            return Err(malformed_error!("Event after the end of the class"));
        }

        match event {
            ClassEvent::Header {
                name,
                access,
                super_name,
                interfaces,
            } => self.visit_header(name, access, super_name, &interfaces),
            ClassEvent::Field {
                name,
                descriptor,
                access,
                constant,
            } => self.visit_field(name, descriptor, access, constant),
            ClassEvent::Member {
                name,
                descriptor,
                access,
                exceptions,
            } => self.visit_member(name, descriptor, access, &exceptions),
            ClassEvent::LocalVariable { name, index, .. } => {
                if let Some(parameters) = self
                    .pending
                    .as_mut()
                    .and_then(|pending| pending.parameters.as_mut())
                {
                    parameters.record(index, name);
                }
                Ok(())
            }
            ClassEvent::End => {
                self.seal_pending()?;
                self.ended = true;
                Ok(())
            }
        }
    }

    /// Seal the record.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the header or the end of the class was never seen.
    pub fn finish(mut self) -> Result<ClassInfo> {
        if !self.ended {
            return Err(malformed_error!("Class file ended before its end event"));
        }
        let Some(shape) = self.shape.take() else {
            return Err(malformed_error!("Class file has no header"));
        };
        Ok(ClassInfo::from_shape(shape, self.context))
    }

    fn visit_header(
        &mut self,
        name: &str,
        access: AccessFlags,
        super_name: Option<&str>,
        interfaces: &[&str],
    ) -> Result<()> {
        if self.shape.is_some() {
            return Err(malformed_error!("Duplicate class header for {}", name));
        }

        let name = java_class_name(name)?;
        let kind = if access.is_interface() {
            ClassKind::Interface
        } else if let Some(primitive) = Primitive::from_java_name(&name) {
            ClassKind::Primitive(primitive)
        } else {
            ClassKind::Class
        };

        let mut shape = ClassShape::empty(name.clone(), class_descriptor(&name), access, kind);
        shape.super_name = super_name.map(java_class_name).transpose()?;
        shape.interface_names = interfaces
            .iter()
            .map(|interface| java_class_name(interface))
            .collect::<Result<_>>()?;

        trace!("Visiting class {name}");
        self.shape = Some(shape);
        Ok(())
    }

    fn visit_field(
        &mut self,
        name: &str,
        descriptor: &str,
        access: AccessFlags,
        constant: Option<FieldConstant>,
    ) -> Result<()> {
        self.seal_pending()?;
        let shape = self.shape_mut()?;

        let field = FieldInfo {
            declaring_type: shape.name.clone(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            field_type: parse_field_descriptor(descriptor)?,
            flags: access,
            hash: MemberHash::of(name, descriptor),
            constant,
        };
        shape.fields.insert(field)
    }

    fn visit_member(
        &mut self,
        name: &str,
        descriptor: &str,
        access: AccessFlags,
        exceptions: &[&str],
    ) -> Result<()> {
        self.seal_pending()?;
        let collect_parameter_names = self.collect_parameter_names;
        let shape = self.shape_mut()?;

        if name == STATIC_INITIALIZER_NAME {
            shape.has_static_initializer = true;
            return Ok(());
        }

        let signature = parse_method_descriptor(descriptor)?;
        let parameter_count = signature.params.len();
        let parameters = (collect_parameter_names && parameter_count > 0)
            .then(|| ParameterNames::new(&signature, access.is_static()));

        let method = MethodInfo {
            declaring_type: shape.name.clone(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature,
            flags: access,
            hash: MemberHash::of(name, descriptor),
            kind: if name == CONSTRUCTOR_NAME {
                MethodKind::Constructor
            } else {
                MethodKind::Method
            },
            parameter_names: vec![String::new(); parameter_count],
            exceptions: exceptions
                .iter()
                .map(|exception| java_class_name(exception))
                .collect::<Result<_>>()?,
        };

        self.pending = Some(PendingMethod { method, parameters });
        Ok(())
    }

    fn seal_pending(&mut self) -> Result<()> {
        let Some(PendingMethod {
            mut method,
            parameters,
        }) = self.pending.take()
        else {
            return Ok(());
        };

        if let Some(parameters) = parameters {
            method.parameter_names = parameters.finish();
        }

        let shape = self.shape_mut()?;
        match method.kind {
            MethodKind::Constructor => shape.constructors.insert(method),
            MethodKind::Method => shape.methods.insert(method),
        }
    }

    fn shape_mut(&mut self) -> Result<&mut ClassShape> {
        self.shape
            .as_mut()
            .ok_or_else(|| malformed_error!("Member declared before the class header"))
    }
}
