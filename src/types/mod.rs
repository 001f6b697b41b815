pub mod adt;
pub mod env;
pub mod error;
pub mod index;
pub mod infer;
pub mod subst;
pub mod ty;
pub mod unify;

pub use env::TypeEnv;
pub use error::TypeError;
pub use infer::{build_type_env, expr_scheme, generalize, type_tree, type_tree_partial};
pub use subst::{Substitutable, Substitution};
pub use ty::{Type, TypeScheme, TypeVar};
