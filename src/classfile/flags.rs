//! Access and property flags shared by classes, fields and methods.
//!
//! The class file format reuses the same 16-bit mask for all three kinds of declarations, with a
//! few bits carrying a different meaning depending on the context (`0x0020` is `ACC_SUPER` on a
//! class and `ACC_SYNCHRONIZED` on a method, `0x0040` is `ACC_VOLATILE` on a field and
//! `ACC_BRIDGE` on a method, and so on).

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// All possible flags for class, field and method `access_flags`
    pub struct AccessFlags: u16 {
        /// Declared public; may be accessed from outside its package
        const PUBLIC = 0x0001;
        /// Declared private; accessible only within the defining class
        const PRIVATE = 0x0002;
        /// Declared protected; may be accessed within subclasses
        const PROTECTED = 0x0004;
        /// Declared static
        const STATIC = 0x0008;
        /// Declared final; no subclasses, overrides or assignments after initialization
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by `invokespecial` (classes)
        const SUPER = 0x0020;
        /// Invocation is wrapped by a monitor (methods)
        const SYNCHRONIZED = 0x0020;
        /// Declared volatile; cannot be cached (fields)
        const VOLATILE = 0x0040;
        /// A bridge method, generated by the compiler (methods)
        const BRIDGE = 0x0040;
        /// Declared transient; not written or read by a persistent object manager (fields)
        const TRANSIENT = 0x0080;
        /// Declared with variable number of arguments (methods)
        const VARARGS = 0x0080;
        /// Declared native; implemented in a language other than Java (methods)
        const NATIVE = 0x0100;
        /// Is an interface, not a class
        const INTERFACE = 0x0200;
        /// Declared abstract; must not be instantiated / no implementation provided
        const ABSTRACT = 0x0400;
        /// Declared strictfp; floating-point mode is FP-strict (methods)
        const STRICT = 0x0800;
        /// Declared synthetic; not present in the source code
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface
        const ANNOTATION = 0x2000;
        /// Declared as an enum class or enum constant
        const ENUM = 0x4000;
        /// Is a module, not a class or interface
        const MODULE = 0x8000;
    }
}

impl AccessFlags {
    /// Keep every bit of a raw `access_flags` value, including ones without a named constant.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        Self::from_bits_retain(raw)
    }

    /// `true` if the declaration is static
    #[must_use]
    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    /// `true` if the class flags denote an interface
    #[must_use]
    pub fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }

    /// `true` if the declaration is abstract
    #[must_use]
    pub fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    /// `true` if the declaration is final
    #[must_use]
    pub fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_bits_are_retained() {
        let flags = AccessFlags::from_raw(0x0421);
        assert!(flags.contains(AccessFlags::PUBLIC));
        assert!(flags.contains(AccessFlags::SUPER));
        assert!(flags.is_abstract());
        assert!(!flags.is_interface());
        assert_eq!(flags.bits(), 0x0421);
    }

    #[test]
    fn context_dependent_aliases() {
        assert_eq!(AccessFlags::SUPER, AccessFlags::SYNCHRONIZED);
        assert_eq!(AccessFlags::VOLATILE, AccessFlags::BRIDGE);
        assert_eq!(AccessFlags::TRANSIENT, AccessFlags::VARARGS);
    }
}
