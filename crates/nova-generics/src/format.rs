//! Java-like rendering of type descriptors, e.g. `Map<String, List<? extends T>>`.
//!
//! Classes are printed by simple name (`java.util.Map$Entry` becomes `Entry`).

use std::fmt;

use crate::{Type, TypeEnv};

pub struct TypeDisplay<'a> {
    env: &'a dyn TypeEnv,
    ty: &'a Type,
}

pub fn display_type<'a>(env: &'a dyn TypeEnv, ty: &'a Type) -> TypeDisplay<'a> {
    TypeDisplay { env, ty }
}

pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    display_type(env, ty).to_string()
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(self.env, self.ty, f)
    }
}

fn write_type(env: &dyn TypeEnv, ty: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match ty {
        Type::Raw(id) => write_class_name(env, *id, f),
        Type::Parameterized(p) => {
            write_class_name(env, p.raw, f)?;
            f.write_str("<")?;
            for (idx, arg) in p.args.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write_type(env, arg, f)?;
            }
            f.write_str(">")
        }
        Type::Var(var) => f.write_str(&var.name),
        Type::Wildcard(w) => {
            if let Some(lower) = &w.lower {
                f.write_str("? super ")?;
                return write_type(env, lower, f);
            }
            if *w.upper == Type::Raw(env.well_known().object) {
                return f.write_str("?");
            }
            f.write_str("? extends ")?;
            write_type(env, &w.upper, f)
        }
        Type::Array(elem) => {
            write_type(env, elem, f)?;
            f.write_str("[]")
        }
    }
}

fn write_class_name(env: &dyn TypeEnv, id: crate::ClassId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Some(name) = env.class_name(id) else {
        return write!(f, "{id:?}");
    };
    let simple = name.rsplit(['.', '$']).next().unwrap_or(name);
    f.write_str(simple)
}
