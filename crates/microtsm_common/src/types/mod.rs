pub mod import_kind;
pub mod import_record;
pub mod specifier_kind;
