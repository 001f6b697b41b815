//! # Data-Constructor Compilation
//!
//! A `data` declaration introduces constructors that the rest of the system
//! treats like ordinary named definitions: the evaluator resolves a
//! constructor name to a definition whose body is the bare constructor
//! atom, and the inferencer sees a scheme built by folding `Arr` over the
//! constructor's parameter types into the declared `TypeCons`.
//!
//! ```text
//! data Maybe a = Nothing | Just a
//!
//! Nothing : Maybe a          Nothing = Nothing
//! Just    : a -> Maybe a     Just = Just
//! ```

use crate::ast::expression::Expr;
use crate::ast::{AdtDef, DataConstr, Def};

use super::error::TypeError;
use super::ty::{Type, TypeScheme, TypeVar};

/// The type variable a `data`-declaration parameter names.
pub fn adt_param_var(name: &str) -> TypeVar {
    TypeVar::with_name(0, name)
}

/// Compile every constructor of every declaration into an evaluator
/// definition plus a name/scheme pair for the type environment.
pub fn compile_adts(adts: &[AdtDef]) -> Result<(Vec<Def<()>>, Vec<(String, TypeScheme)>), TypeError> {
    let mut defs = Vec::new();
    let mut schemes = Vec::new();
    for adt in adts {
        for constr in &adt.constructors {
            let (def, scheme) = compile_constructor(adt, constr)?;
            defs.push(def);
            schemes.push((constr.name().to_string(), scheme));
        }
    }
    Ok((defs, schemes))
}

fn compile_constructor(adt: &AdtDef, constr: &DataConstr) -> Result<(Def<()>, TypeScheme), TypeError> {
    let params: Vec<Type> = match constr {
        DataConstr::Prefix { params, .. } => params.clone(),
        DataConstr::Infix { left, right, .. } => vec![left.clone(), right.clone()],
    };

    let vars: Vec<TypeVar> = adt.params.iter().map(|p| adt_param_var(p)).collect();
    let result = Type::TypeCons(
        adt.name.clone(),
        vars.iter().map(|v| Type::Var(v.clone())).collect(),
    );
    let ty = Type::arr_chain(params, result);

    // Every variable mentioned by the constructor must be a declared
    // parameter of the type, otherwise it would escape quantification.
    for free in ty.free_type_vars() {
        if !vars.contains(&free) {
            return Err(TypeError::unknown(format!(
                "type variable '{}' not in scope in declaration of {}",
                free.name.as_deref().unwrap_or("?"),
                adt.name
            )));
        }
    }

    let def = Def::new(constr.name(), vec![], Expr::constr(constr.name()));
    Ok((def, TypeScheme::polymorphic(vars, ty)))
}
