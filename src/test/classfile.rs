//! In-memory class file assembler for tests.
//!
//! Produces byte-exact class files with just enough structure for the reader: a deduplicated
//! constant pool, fields with optional `ConstantValue`, and methods with an optional
//! `Exceptions` attribute and a `Code` attribute carrying a `LocalVariableTable`.
//!
//! This file only depends on `std` so integration tests can pull it in with `#[path]`.

#![allow(dead_code)]

use std::collections::HashMap;

const ACC_ABSTRACT: u16 = 0x0400;
const ACC_NATIVE: u16 = 0x0100;

/// A method declaration to be emitted by [`ClassFileBuilder`]
#[derive(Debug, Clone)]
pub struct MethodSpec {
    access: u16,
    name: String,
    descriptor: String,
    exceptions: Vec<String>,
    locals: Vec<(String, String, u16)>,
}

impl MethodSpec {
    pub fn new(access: u16, name: &str, descriptor: &str) -> Self {
        MethodSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            exceptions: Vec::new(),
            locals: Vec::new(),
        }
    }

    /// Add a `LocalVariableTable` record
    pub fn local(mut self, name: &str, descriptor: &str, index: u16) -> Self {
        self.locals
            .push((name.to_string(), descriptor.to_string(), index));
        self
    }

    /// Add an entry to the `Exceptions` attribute
    pub fn throws(mut self, class: &str) -> Self {
        self.exceptions.push(class.to_string());
        self
    }
}

#[derive(Debug, Clone)]
struct FieldSpec {
    access: u16,
    name: String,
    descriptor: String,
    constant: Option<i32>,
}

/// Builder for a complete class file
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    major: u16,
    access: u16,
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<FieldSpec>,
    methods: Vec<MethodSpec>,
}

impl ClassFileBuilder {
    /// A public class extending `java/lang/Object`, version 52
    pub fn new(internal_name: &str) -> Self {
        ClassFileBuilder {
            major: 52,
            access: 0x0021,
            name: internal_name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// A public interface extending `java/lang/Object`
    pub fn interface_type(internal_name: &str) -> Self {
        Self::new(internal_name).access(0x0601)
    }

    pub fn version(mut self, major: u16) -> Self {
        self.major = major;
        self
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_name = Some(internal_name.to_string());
        self
    }

    /// Emit `super_class = 0`, as only `java/lang/Object` does
    pub fn no_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.fields.push(FieldSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            constant: None,
        });
        self
    }

    /// A field with an integer `ConstantValue`
    pub fn constant_field(mut self, access: u16, name: &str, descriptor: &str, value: i32) -> Self {
        self.fields.push(FieldSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            constant: Some(value),
        });
        self
    }

    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    /// Shorthand for a public no-argument constructor
    pub fn default_constructor(self) -> Self {
        self.method(MethodSpec::new(0x0001, "<init>", "()V"))
    }

    /// Shorthand for a static initializer
    pub fn static_initializer(self) -> Self {
        self.method(MethodSpec::new(0x0008, "<clinit>", "()V"))
    }

    /// Assemble the class file
    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        put_u16(&mut body, self.access);
        let this_class = pool.class(&self.name);
        put_u16(&mut body, this_class);
        let super_class = self.super_name.as_deref().map_or(0, |s| pool.class(s));
        put_u16(&mut body, super_class);

        put_u16(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            let index = pool.class(interface);
            put_u16(&mut body, index);
        }

        put_u16(&mut body, self.fields.len() as u16);
        for field in &self.fields {
            put_u16(&mut body, field.access);
            let name = pool.utf8(&field.name);
            put_u16(&mut body, name);
            let descriptor = pool.utf8(&field.descriptor);
            put_u16(&mut body, descriptor);
            match field.constant {
                Some(value) => {
                    put_u16(&mut body, 1);
                    let attr = pool.utf8("ConstantValue");
                    put_u16(&mut body, attr);
                    put_u32(&mut body, 2);
                    let index = pool.integer(value);
                    put_u16(&mut body, index);
                }
                None => put_u16(&mut body, 0),
            }
        }

        put_u16(&mut body, self.methods.len() as u16);
        for method in &self.methods {
            put_u16(&mut body, method.access);
            let name = pool.utf8(&method.name);
            put_u16(&mut body, name);
            let descriptor = pool.utf8(&method.descriptor);
            put_u16(&mut body, descriptor);

            let has_code = method.access & (ACC_ABSTRACT | ACC_NATIVE) == 0;
            let has_exceptions = !method.exceptions.is_empty();
            put_u16(&mut body, u16::from(has_code) + u16::from(has_exceptions));

            if has_exceptions {
                let attr = pool.utf8("Exceptions");
                put_u16(&mut body, attr);
                put_u32(&mut body, 2 + 2 * method.exceptions.len() as u32);
                put_u16(&mut body, method.exceptions.len() as u16);
                for exception in &method.exceptions {
                    let index = pool.class(exception);
                    put_u16(&mut body, index);
                }
            }

            if has_code {
                let code = code_attribute(&mut pool, method);
                let attr = pool.utf8("Code");
                put_u16(&mut body, attr);
                put_u32(&mut body, code.len() as u32);
                body.extend_from_slice(&code);
            }
        }

        // One opaque class attribute so readers have to skip it
        let attr = pool.utf8("SourceFile");
        put_u16(&mut body, 1);
        put_u16(&mut body, attr);
        put_u32(&mut body, 2);
        let source = pool.utf8("Test.java");
        put_u16(&mut body, source);

        let mut out = Vec::with_capacity(body.len() + 256);
        put_u32(&mut out, 0xCAFE_BABE);
        put_u16(&mut out, 0);
        put_u16(&mut out, self.major);
        pool.write(&mut out);
        out.extend_from_slice(&body);
        out
    }
}

fn code_attribute(pool: &mut Pool, method: &MethodSpec) -> Vec<u8> {
    let mut code = Vec::new();
    put_u16(&mut code, 4);
    put_u16(&mut code, 8);
    // `return`
    put_u32(&mut code, 1);
    code.push(0xB1);
    put_u16(&mut code, 0);

    if method.locals.is_empty() {
        put_u16(&mut code, 0);
        return code;
    }

    put_u16(&mut code, 1);
    let attr = pool.utf8("LocalVariableTable");
    put_u16(&mut code, attr);
    put_u32(&mut code, 2 + 10 * method.locals.len() as u32);
    put_u16(&mut code, method.locals.len() as u16);
    for (name, descriptor, index) in &method.locals {
        put_u16(&mut code, 0);
        put_u16(&mut code, 1);
        let name = pool.utf8(name);
        put_u16(&mut code, name);
        let descriptor = pool.utf8(descriptor);
        put_u16(&mut code, descriptor);
        put_u16(&mut code, *index);
    }
    code
}

#[derive(Default)]
struct Pool {
    entries: Vec<Vec<u8>>,
    lookup: HashMap<Vec<u8>, u16>,
}

impl Pool {
    fn intern(&mut self, entry: Vec<u8>) -> u16 {
        if let Some(index) = self.lookup.get(&entry) {
            return *index;
        }
        self.entries.push(entry.clone());
        let index = self.entries.len() as u16;
        self.lookup.insert(entry, index);
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut entry = vec![1];
        put_u16(&mut entry, value.len() as u16);
        entry.extend_from_slice(value.as_bytes());
        self.intern(entry)
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8(internal_name);
        let mut entry = vec![7];
        put_u16(&mut entry, name);
        self.intern(entry)
    }

    fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&value.to_be_bytes());
        self.intern(entry)
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u16(out, self.entries.len() as u16 + 1);
        for entry in &self.entries {
            out.extend_from_slice(entry);
        }
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
