//! Pure access rules: who sees whom, which roles may be handed out, and how
//! free-form attributes fold into an account record.

pub mod extra_fields;
pub mod groups;
pub mod visibility;

pub use extra_fields::{ExtraField, merge_extra_fields, merge_preserving};
pub use visibility::{Scope, assignable_roles, can_view, resolve_scope, visible_accounts};
